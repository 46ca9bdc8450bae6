use anyhow::Result;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use showmigrate_models::{DestinationSeason, DestinationShow};
use tracing::{info, warn};
use crate::join_url;

pub const SITE_URL: &str = "https://www.serializd.com";
pub const CREDENTIALS_COOKIE: &str = "tvproject_credentials";

#[derive(Debug, Deserialize)]
struct SerializdSeasonSummary {
    id: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct SerializdShow {
    id: Option<u32>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    seasons: Vec<SerializdSeasonSummary>,
}

#[derive(Debug, Deserialize)]
struct SerializdSeason {
    #[serde(rename = "seasonId")]
    season_id: Option<u64>,
    #[serde(rename = "seasonNumber")]
    season_number: Option<u32>,
    #[serde(default)]
    episodes: Vec<serde_json::Value>,
}

#[derive(Debug, Serialize)]
struct EpisodeLogRequest<'a> {
    episode_numbers: &'a [u32],
    season_id: u64,
    show_id: u32,
    should_get_next_episode: bool,
}

#[derive(Debug, Serialize)]
struct WatchedSeasonsRequest<'a> {
    season_ids: &'a [u64],
    show_id: u32,
}

/// Headers the Serializd web API expects on every request
pub(crate) fn with_site_headers(request: RequestBuilder) -> RequestBuilder {
    request
        .header("Content-Type", "application/json")
        .header("Origin", SITE_URL)
        .header("Referer", SITE_URL)
        .header("X-Requested-With", "serializd_vercel")
}

fn authed(request: RequestBuilder, token: &str) -> RequestBuilder {
    with_site_headers(request).header("Cookie", format!("{}={}", CREDENTIALS_COOKIE, token))
}

fn is_write_success(status: reqwest::StatusCode) -> bool {
    matches!(status.as_u16(), 200 | 201)
}

/// Look a show up by its TMDB id; `None` when the destination doesn't have it
pub async fn get_show(client: &Client, base_url: &str, token: &str, tmdb_id: u32) -> Result<Option<DestinationShow>> {
    let url = join_url(base_url, &format!("/show/{}", tmdb_id));
    let response = authed(client.get(&url), token).send().await?;

    if response.status().as_u16() != 200 {
        warn!(tmdb_id, status = %response.status(), "Show not found on Serializd");
        return Ok(None);
    }

    let show: SerializdShow = response.json().await?;
    Ok(Some(DestinationShow {
        tmdb_id: show.id.unwrap_or(tmdb_id),
        name: show.name,
        season_ids: show.seasons.into_iter().filter_map(|s| s.id).collect(),
    }))
}

/// Fetch one season; `None` when missing or when the payload carries no season id
pub async fn get_season(
    client: &Client,
    base_url: &str,
    token: &str,
    tmdb_id: u32,
    season_number: u32,
) -> Result<Option<DestinationSeason>> {
    let url = join_url(base_url, &format!("/show/{}/season/{}", tmdb_id, season_number));
    let response = authed(client.get(&url), token).send().await?;

    if response.status().as_u16() != 200 {
        warn!(tmdb_id, season = season_number, status = %response.status(), "Season not found on Serializd");
        return Ok(None);
    }

    let season: SerializdSeason = response.json().await?;
    match season.season_id.filter(|&id| id > 0) {
        Some(season_id) => Ok(Some(DestinationSeason {
            season_id,
            season_number: season.season_number.unwrap_or(season_number),
            episode_count: season.episodes.len() as u32,
        })),
        None => {
            warn!(tmdb_id, season = season_number, "Empty season data from Serializd");
            Ok(None)
        }
    }
}

/// POST /episode_log/add
pub async fn log_episodes(
    client: &Client,
    base_url: &str,
    token: &str,
    tmdb_id: u32,
    season_id: u64,
    episode_numbers: &[u32],
) -> Result<bool> {
    let payload = EpisodeLogRequest {
        episode_numbers,
        season_id,
        show_id: tmdb_id,
        should_get_next_episode: false,
    };

    let response = authed(client.post(join_url(base_url, "/episode_log/add")), token)
        .json(&payload)
        .send()
        .await?;

    if is_write_success(response.status()) {
        info!("Successfully logged {} episodes for show {}", episode_numbers.len(), tmdb_id);
        Ok(true)
    } else {
        warn!(tmdb_id, season_id, status = %response.status(), "Failed to log episodes");
        Ok(false)
    }
}

/// POST /watched_v2
pub async fn log_seasons(client: &Client, base_url: &str, token: &str, tmdb_id: u32, season_ids: &[u64]) -> Result<bool> {
    let payload = WatchedSeasonsRequest {
        season_ids,
        show_id: tmdb_id,
    };

    let response = authed(client.post(join_url(base_url, "/watched_v2")), token)
        .json(&payload)
        .send()
        .await?;

    if is_write_success(response.status()) {
        info!("Successfully logged {} seasons as watched for show {}", season_ids.len(), tmdb_id);
        Ok(true)
    } else {
        warn!(tmdb_id, status = %response.status(), "Failed to log seasons");
        Ok(false)
    }
}
