use crate::error::MigrationError;
use crate::pace::Pacer;
use crate::plan::{complete_season_ids, plan_season};
use chrono::Utc;
use showmigrate_models::{MigrationReport, SeasonAction, ShowOutcome, ShowReport, WatchedShow};
use showmigrate_sources::{WatchHistorySource, WatchLogDestination};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

pub const DEFAULT_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct MigrateOptions {
    /// Plan everything but send no writes to the destination
    pub dry_run: bool,
    /// Pause after every season and every show
    pub delay: Duration,
}

impl Default for MigrateOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            delay: DEFAULT_DELAY,
        }
    }
}

/// Hooks for following a run show by show
pub trait MigrationObserver: Send + Sync {
    fn on_catalog(&self, _total_shows: usize) {}
    fn on_show_start(&self, _index: usize, _show: &WatchedShow) {}
    fn on_show_finish(&self, _index: usize, _report: &ShowReport) {}
}

/// Walks the source's watched catalogue and replays it on the destination
pub struct Migrator<S, D> {
    source: S,
    destination: D,
    options: MigrateOptions,
    pacer: Pacer,
    observer: Option<Arc<dyn MigrationObserver>>,
}

/// Per-show bookkeeping while its seasons are walked
#[derive(Default)]
struct ShowProgress {
    actions: Vec<SeasonAction>,
    complete_seasons: Vec<u32>,
    logged_seasons: Vec<u32>,
    failed_seasons: Vec<u32>,
    missing_seasons: Vec<u32>,
}

impl ShowProgress {
    fn into_outcome(self) -> (ShowOutcome, Vec<SeasonAction>) {
        let outcome = ShowOutcome::Migrated {
            complete_seasons: self.complete_seasons,
            logged_seasons: self.logged_seasons,
            failed_seasons: self.failed_seasons,
            missing_seasons: self.missing_seasons,
        };
        (outcome, self.actions)
    }
}

impl<S, D> Migrator<S, D>
where
    S: WatchHistorySource,
    D: WatchLogDestination,
{
    pub fn new(source: S, destination: D, options: MigrateOptions) -> Self {
        let pacer = Pacer::new(options.delay);
        Self {
            source,
            destination,
            options,
            pacer,
            observer: None,
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn MigrationObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn destination(&self) -> &D {
        &self.destination
    }

    pub async fn run(&self) -> Result<MigrationReport, MigrationError> {
        let username = self.source.username().await.map_err(|e| self.source_error(e))?;
        info!("Starting migration for user: {}", username);

        let shows = self.source.watched_shows().await.map_err(|e| self.source_error(e))?;
        info!("Found {} watched shows on {}", shows.len(), self.source.source_name());
        if self.options.dry_run {
            info!("Dry run: nothing will be written to {}", self.destination.destination_name());
        }

        if let Some(observer) = &self.observer {
            observer.on_catalog(shows.len());
        }

        let mut report = MigrationReport::new(username, self.options.dry_run);

        for (index, show) in shows.iter().enumerate() {
            if let Some(observer) = &self.observer {
                observer.on_show_start(index, show);
            }

            let show_report = self.migrate_show(show).await;

            if let Some(observer) = &self.observer {
                observer.on_show_finish(index, &show_report);
            }
            report.shows.push(show_report);

            self.pacer.pause().await;
        }

        report.finished_at = Utc::now();
        info!("Migration completed!");
        info!("Successful: {}", report.successful());
        info!("Failed: {}", report.failed());

        Ok(report)
    }

    fn source_error(&self, e: S::Error) -> MigrationError {
        MigrationError::Source {
            source_name: self.source.source_name().to_string(),
            message: e.to_string(),
        }
    }

    #[instrument(skip(self, show), fields(show = %show.title))]
    async fn migrate_show(&self, show: &WatchedShow) -> ShowReport {
        let tmdb_id = show.tmdb_id();

        let (outcome, actions) = match tmdb_id {
            None => {
                warn!(ids = ?show.ids.primary_id(), "No TMDB ID for {}, skipping", show.title);
                (ShowOutcome::Skipped { reason: "no TMDB id".to_string() }, Vec::new())
            }
            Some(tmdb_id) => {
                info!("Processing: {} - TMDB ID: {}", show.display_name(), tmdb_id);
                match self.replay_show(show, tmdb_id).await {
                    Ok(Some(progress)) => progress.into_outcome(),
                    Ok(None) => (
                        ShowOutcome::Skipped { reason: "not found on destination".to_string() },
                        Vec::new(),
                    ),
                    Err(e) => {
                        error!("Error processing {}: {}", show.title, e);
                        (ShowOutcome::Failed { reason: e.to_string() }, Vec::new())
                    }
                }
            }
        };

        ShowReport {
            title: show.title.clone(),
            year: show.year,
            tmdb_id,
            outcome,
            actions,
        }
    }

    /// A failed write counts the same as one the destination refused
    fn accepted(&self, result: Result<bool, D::Error>) -> bool {
        result.unwrap_or_else(|e| {
            warn!("{} write failed: {}", self.destination.destination_name(), e);
            false
        })
    }

    /// Replay one show's seasons. `Ok(None)` when the destination doesn't know the show;
    /// only the show lookup can fail the whole show.
    async fn replay_show(&self, show: &WatchedShow, tmdb_id: u32) -> Result<Option<ShowProgress>, D::Error> {
        if self.destination.find_show(tmdb_id).await?.is_none() {
            warn!("Show not found on {}: {}", self.destination.destination_name(), show.title);
            return Ok(None);
        }

        let mut progress = ShowProgress::default();

        for season in show.seasons.iter().filter(|s| s.has_watched_episodes()) {
            info!(
                "Processing {} S{:02} - {} episodes",
                show.title,
                season.number,
                season.watched_count()
            );

            let destination_season = match self.destination.find_season(tmdb_id, season.number).await {
                Ok(Some(destination_season)) => destination_season,
                Ok(None) => {
                    warn!("Season {} not found for {}", season.number, show.title);
                    progress.missing_seasons.push(season.number);
                    continue;
                }
                Err(e) => {
                    warn!("Failed to look up season {} for {}: {}", season.number, show.title, e);
                    progress.failed_seasons.push(season.number);
                    continue;
                }
            };

            let Some(action) = plan_season(season, &destination_season) else {
                continue;
            };

            match &action {
                SeasonAction::MarkSeason { season_number, .. } => {
                    info!("Marking complete season {} as watched", season_number);
                }
                SeasonAction::LogEpisodes { season_number, season_id, episode_numbers } => {
                    debug!(
                        "Season {} partially watched: {}/{} episodes",
                        season_number,
                        episode_numbers.len(),
                        destination_season.episode_count
                    );
                    if self.options.dry_run
                        || self.accepted(self.destination.log_episodes(tmdb_id, *season_id, episode_numbers).await)
                    {
                        progress.logged_seasons.push(*season_number);
                    } else {
                        warn!("Failed to log episodes for {} season {}", show.title, season_number);
                        progress.failed_seasons.push(*season_number);
                    }
                }
            }
            progress.actions.push(action);

            self.pacer.pause().await;
        }

        let season_ids = complete_season_ids(&progress.actions);
        if !season_ids.is_empty() {
            let season_numbers: Vec<u32> = progress
                .actions
                .iter()
                .filter(|a| a.is_whole_season())
                .map(SeasonAction::season_number)
                .collect();

            if self.options.dry_run || self.accepted(self.destination.log_seasons(tmdb_id, &season_ids).await) {
                info!("Marked {} complete seasons for {}", season_ids.len(), show.title);
                progress.complete_seasons = season_numbers;
            } else {
                warn!("Failed to mark complete seasons for {}", show.title);
                progress.failed_seasons.extend(season_numbers);
            }
        }

        Ok(Some(progress))
    }
}

#[cfg(test)]
mod tests;
