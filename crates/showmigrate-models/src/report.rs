use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::action::SeasonAction;

/// Result of migrating a single show
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ShowOutcome {
    Migrated {
        /// Season numbers marked watched as a whole
        complete_seasons: Vec<u32>,
        /// Season numbers whose episodes were logged individually
        logged_seasons: Vec<u32>,
        /// Season numbers the destination rejected
        failed_seasons: Vec<u32>,
        /// Season numbers the destination doesn't know about
        missing_seasons: Vec<u32>,
    },
    /// Show could not be addressed on the destination (no TMDB id, not found)
    Skipped { reason: String },
    /// Show aborted part way through because a call errored
    Failed { reason: String },
}

impl ShowOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ShowOutcome::Migrated { .. })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShowReport {
    pub title: String,
    pub year: Option<u32>,
    pub tmdb_id: Option<u32>,
    pub outcome: ShowOutcome,
    #[serde(default)]
    pub actions: Vec<SeasonAction>,
}

/// Summary of a whole migration run (also the dry-run plan format)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationReport {
    pub username: String,
    pub dry_run: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub shows: Vec<ShowReport>,
}

impl MigrationReport {
    pub fn new(username: String, dry_run: bool) -> Self {
        let now = Utc::now();
        Self {
            username,
            dry_run,
            started_at: now,
            finished_at: now,
            shows: Vec::new(),
        }
    }

    pub fn successful(&self) -> usize {
        self.shows.iter().filter(|s| s.outcome.is_success()).count()
    }

    /// Skipped shows count as failures, same as a show that errored
    pub fn failed(&self) -> usize {
        self.shows.len() - self.successful()
    }

    pub fn skipped(&self) -> usize {
        self.shows
            .iter()
            .filter(|s| matches!(s.outcome, ShowOutcome::Skipped { .. }))
            .count()
    }

    pub fn seasons_marked(&self) -> usize {
        self.shows
            .iter()
            .map(|s| match &s.outcome {
                ShowOutcome::Migrated { complete_seasons, .. } => complete_seasons.len(),
                _ => 0,
            })
            .sum()
    }

    /// Episodes sent through per-episode logging (whole seasons excluded)
    pub fn episodes_logged(&self) -> usize {
        self.shows
            .iter()
            .filter_map(|s| match &s.outcome {
                ShowOutcome::Migrated { logged_seasons, .. } => Some((s, logged_seasons)),
                _ => None,
            })
            .map(|(s, logged)| {
                s.actions
                    .iter()
                    .filter_map(|a| match a {
                        SeasonAction::LogEpisodes { season_number, episode_numbers, .. }
                            if logged.contains(season_number) =>
                        {
                            Some(episode_numbers.len())
                        }
                        _ => None,
                    })
                    .sum::<usize>()
            })
            .sum()
    }

    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn migrated(title: &str, actions: Vec<SeasonAction>, complete: Vec<u32>, logged: Vec<u32>) -> ShowReport {
        ShowReport {
            title: title.to_string(),
            year: None,
            tmdb_id: Some(1),
            outcome: ShowOutcome::Migrated {
                complete_seasons: complete,
                logged_seasons: logged,
                failed_seasons: vec![],
                missing_seasons: vec![],
            },
            actions,
        }
    }

    #[test]
    fn test_report_tallies() {
        let mut report = MigrationReport::new("alice".to_string(), false);
        report.shows.push(migrated(
            "A",
            vec![
                SeasonAction::MarkSeason { season_number: 1, season_id: 10 },
                SeasonAction::LogEpisodes { season_number: 2, season_id: 11, episode_numbers: vec![1, 2, 3] },
            ],
            vec![1],
            vec![2],
        ));
        report.shows.push(ShowReport {
            title: "B".to_string(),
            year: None,
            tmdb_id: None,
            outcome: ShowOutcome::Skipped { reason: "no TMDB id".to_string() },
            actions: vec![],
        });
        report.shows.push(ShowReport {
            title: "C".to_string(),
            year: None,
            tmdb_id: Some(3),
            outcome: ShowOutcome::Failed { reason: "connection reset".to_string() },
            actions: vec![],
        });

        assert_eq!(report.successful(), 1);
        assert_eq!(report.failed(), 2);
        assert_eq!(report.skipped(), 1);
        assert_eq!(report.seasons_marked(), 1);
        assert_eq!(report.episodes_logged(), 3);
    }

    #[test]
    fn test_rejected_episode_log_not_counted() {
        let mut report = MigrationReport::new("bob".to_string(), false);
        let mut show = migrated(
            "A",
            vec![SeasonAction::LogEpisodes { season_number: 1, season_id: 10, episode_numbers: vec![1, 2] }],
            vec![],
            vec![],
        );
        if let ShowOutcome::Migrated { failed_seasons, .. } = &mut show.outcome {
            failed_seasons.push(1);
        }
        report.shows.push(show);

        assert_eq!(report.successful(), 1);
        assert_eq!(report.episodes_logged(), 0);
    }

    #[test]
    fn test_outcome_serializes_with_status_tag() {
        let outcome = ShowOutcome::Skipped { reason: "not found on destination".to_string() };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "skipped");
        assert_eq!(json["reason"], "not found on destination");
    }
}
