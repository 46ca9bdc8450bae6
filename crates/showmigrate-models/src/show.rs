use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use crate::show_ids::ShowIds;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WatchedEpisode {
    pub number: u32,
    #[serde(default)]
    pub plays: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_watched_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WatchedSeason {
    pub number: u32,
    #[serde(default)]
    pub episodes: Vec<WatchedEpisode>,
}

impl WatchedSeason {
    /// Watched episode numbers, unique, positive and ascending.
    ///
    /// Episode 0 and repeated numbers are dropped so the count compared against
    /// the destination's season length can't be inflated by bad source data.
    pub fn episode_numbers(&self) -> Vec<u32> {
        self.episodes
            .iter()
            .map(|ep| ep.number)
            .filter(|&n| n > 0)
            .collect::<BTreeSet<u32>>()
            .into_iter()
            .collect()
    }

    pub fn watched_count(&self) -> usize {
        self.episode_numbers().len()
    }

    pub fn has_watched_episodes(&self) -> bool {
        self.episodes.iter().any(|ep| ep.number > 0)
    }
}

/// A show from the source's watched catalogue
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WatchedShow {
    pub title: String,
    pub year: Option<u32>,
    pub ids: ShowIds,
    #[serde(default)]
    pub plays: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_watched_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub seasons: Vec<WatchedSeason>,
}

impl WatchedShow {
    /// TMDB id used to look the show up on the destination
    pub fn tmdb_id(&self) -> Option<u32> {
        self.ids.tmdb.filter(|&id| id > 0)
    }

    pub fn display_name(&self) -> String {
        match self.year {
            Some(year) => format!("{} ({})", self.title, year),
            None => self.title.clone(),
        }
    }

    /// Total number of distinct watched episodes across all seasons
    pub fn watched_episode_count(&self) -> usize {
        self.seasons.iter().map(WatchedSeason::watched_count).sum()
    }
}
