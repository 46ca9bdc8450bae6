use showmigrate_models::{DestinationSeason, SeasonAction, WatchedSeason};

/// A season counts as complete when the destination lists at least one episode
/// and the source has watched at least that many.
pub fn is_season_complete(watched_count: usize, total_episodes: u32) -> bool {
    total_episodes > 0 && watched_count >= total_episodes as usize
}

/// Decide how one watched season is replayed on the destination.
///
/// Returns `None` when the season has no valid watched episodes.
pub fn plan_season(watched: &WatchedSeason, destination: &DestinationSeason) -> Option<SeasonAction> {
    let episode_numbers = watched.episode_numbers();
    if episode_numbers.is_empty() {
        return None;
    }

    if is_season_complete(episode_numbers.len(), destination.episode_count) {
        Some(SeasonAction::MarkSeason {
            season_number: watched.number,
            season_id: destination.season_id,
        })
    } else {
        Some(SeasonAction::LogEpisodes {
            season_number: watched.number,
            season_id: destination.season_id,
            episode_numbers,
        })
    }
}

/// Season ids to mark watched in a single call for the show
pub fn complete_season_ids(actions: &[SeasonAction]) -> Vec<u64> {
    actions
        .iter()
        .filter(|a| a.is_whole_season())
        .map(SeasonAction::season_id)
        .collect()
}
