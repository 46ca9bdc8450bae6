use serde::{Deserialize, Serialize};

/// What the migration does with one watched season on the destination
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum SeasonAction {
    /// Whole season marked watched (batched per show)
    MarkSeason { season_number: u32, season_id: u64 },
    /// Individual episodes logged in one call for the season
    LogEpisodes {
        season_number: u32,
        season_id: u64,
        episode_numbers: Vec<u32>,
    },
}

impl SeasonAction {
    pub fn season_number(&self) -> u32 {
        match self {
            SeasonAction::MarkSeason { season_number, .. } => *season_number,
            SeasonAction::LogEpisodes { season_number, .. } => *season_number,
        }
    }

    pub fn season_id(&self) -> u64 {
        match self {
            SeasonAction::MarkSeason { season_id, .. } => *season_id,
            SeasonAction::LogEpisodes { season_id, .. } => *season_id,
        }
    }

    pub fn is_whole_season(&self) -> bool {
        matches!(self, SeasonAction::MarkSeason { .. })
    }
}
