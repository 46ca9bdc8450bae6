use async_trait::async_trait;
use showmigrate_models::{DestinationSeason, DestinationShow, WatchedShow};

/// A service the watched catalogue is read from
#[async_trait]
pub trait WatchHistorySource: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    fn source_name(&self) -> &str;

    /// Name of the authenticated account (used for logging only)
    async fn username(&self) -> Result<String, Self::Error>;

    /// Every show the account has watched, with its watched seasons and episodes
    async fn watched_shows(&self) -> Result<Vec<WatchedShow>, Self::Error>;
}

/// A service watched seasons and episodes are replayed into
///
/// Lookups return `Ok(None)` when the destination doesn't know the item, and
/// writes return `Ok(false)` when the destination rejects them. `Err` is kept
/// for transport and decoding failures.
#[async_trait]
pub trait WatchLogDestination: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    fn destination_name(&self) -> &str;

    async fn find_show(&self, tmdb_id: u32) -> Result<Option<DestinationShow>, Self::Error>;

    async fn find_season(
        &self,
        tmdb_id: u32,
        season_number: u32,
    ) -> Result<Option<DestinationSeason>, Self::Error>;

    /// Mark individual episodes of one season as watched
    async fn log_episodes(
        &self,
        tmdb_id: u32,
        season_id: u64,
        episode_numbers: &[u32],
    ) -> Result<bool, Self::Error>;

    /// Mark whole seasons of one show as watched in a single call
    async fn log_seasons(&self, tmdb_id: u32, season_ids: &[u64]) -> Result<bool, Self::Error>;
}
