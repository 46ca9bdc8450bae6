use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use showmigrate_models::{ShowIds, WatchedEpisode, WatchedSeason, WatchedShow};
use tracing::{debug, info};
use crate::join_url;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraktIds {
    pub trakt: Option<u64>,
    pub slug: Option<String>,
    pub tvdb: Option<u32>,
    pub imdb: Option<String>,
    pub tmdb: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct TraktShow {
    title: String,
    year: Option<u32>,
    ids: TraktIds,
}

#[derive(Debug, Serialize, Deserialize)]
struct TraktWatchedEpisode {
    number: u32,
    #[serde(default)]
    plays: u32,
    last_watched_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct TraktWatchedSeason {
    number: u32,
    #[serde(default)]
    episodes: Vec<TraktWatchedEpisode>,
}

#[derive(Debug, Serialize, Deserialize)]
struct TraktWatchedShow {
    #[serde(default)]
    plays: u32,
    last_watched_at: Option<DateTime<Utc>>,
    show: TraktShow,
    #[serde(default)]
    seasons: Vec<TraktWatchedSeason>,
}

#[derive(Debug, Deserialize)]
struct TraktSettings {
    user: TraktUser,
}

#[derive(Debug, Deserialize)]
struct TraktUser {
    username: String,
}

/// Trakt answered 401 for the access token
#[derive(Debug, thiserror::Error)]
#[error("Trakt rejected the access token")]
pub struct TokenRejected;

/// Remove slashes from IMDB ID (Trakt sometimes includes them)
fn remove_slashes(s: &str) -> String {
    s.replace('/', "")
}

fn show_ids_from_trakt_ids(trakt_ids: TraktIds) -> ShowIds {
    ShowIds {
        trakt: trakt_ids.trakt,
        slug: trakt_ids.slug,
        tmdb: trakt_ids.tmdb,
        tvdb: trakt_ids.tvdb,
        imdb: trakt_ids.imdb.as_deref().map(remove_slashes).filter(|s| !s.is_empty()),
    }
}

impl From<TraktWatchedShow> for WatchedShow {
    fn from(item: TraktWatchedShow) -> Self {
        WatchedShow {
            title: item.show.title,
            year: item.show.year,
            ids: show_ids_from_trakt_ids(item.show.ids),
            plays: item.plays,
            last_watched_at: item.last_watched_at,
            seasons: item
                .seasons
                .into_iter()
                .map(|season| WatchedSeason {
                    number: season.number,
                    episodes: season
                        .episodes
                        .into_iter()
                        .map(|ep| WatchedEpisode {
                            number: ep.number,
                            plays: ep.plays,
                            last_watched_at: ep.last_watched_at,
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

/// Attach the headers every authenticated Trakt call needs
fn authed(request: RequestBuilder, access_token: &str, client_id: &str) -> RequestBuilder {
    request
        .header("Authorization", format!("Bearer {}", access_token))
        .header("trakt-api-version", "2")
        .header("trakt-api-key", client_id)
        .header("Content-Type", "application/json")
        .header("Accept", "application/json")
}

/// Get the authenticated user's name from /users/settings
pub async fn get_username(client: &Client, base_url: &str, access_token: &str, client_id: &str) -> Result<String> {
    let response = authed(client.get(join_url(base_url, "/users/settings")), access_token, client_id)
        .send()
        .await?;

    if response.status() == StatusCode::UNAUTHORIZED {
        return Err(TokenRejected.into());
    }

    if !response.status().is_success() {
        let status = response.status();
        let error_text = response.text().await.unwrap_or_default();
        return Err(anyhow!("Failed to get user info: {} - {}", status, error_text));
    }

    let settings: TraktSettings = response.json().await?;
    Ok(settings.user.username)
}

/// Fetch every watched show with its seasons and episodes
pub async fn get_watched_shows(
    client: &Client,
    base_url: &str,
    access_token: &str,
    client_id: &str,
) -> Result<Vec<WatchedShow>> {
    let response = authed(client.get(join_url(base_url, "/sync/watched/shows")), access_token, client_id)
        .send()
        .await?;

    if !response.status().is_success() {
        let status = response.status();
        let error_text = response.text().await.unwrap_or_default();
        return Err(anyhow!("Failed to get watched shows: {} - {}", status, error_text));
    }

    let items: Vec<TraktWatchedShow> = response.json().await?;
    info!("Retrieved {} watched shows from Trakt", items.len());

    let shows: Vec<WatchedShow> = items.into_iter().map(WatchedShow::from).collect();
    for show in &shows {
        debug!(
            show = %show.title,
            seasons = show.seasons.len(),
            episodes = show.watched_episode_count(),
            "Watched show"
        );
    }

    Ok(shows)
}
