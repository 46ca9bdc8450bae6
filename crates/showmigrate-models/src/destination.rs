use serde::{Deserialize, Serialize};

/// A show as the destination knows it, addressed by TMDB id
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DestinationShow {
    pub tmdb_id: u32,
    pub name: String,
    #[serde(default)]
    pub season_ids: Vec<u64>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DestinationSeason {
    pub season_id: u64,
    pub season_number: u32,
    /// Number of episodes the destination lists for this season
    pub episode_count: u32,
}
