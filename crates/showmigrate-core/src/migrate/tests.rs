use super::*;
use async_trait::async_trait;
use showmigrate_models::{DestinationSeason, DestinationShow, ShowIds, WatchedEpisode, WatchedSeason};
use showmigrate_sources::SourceError;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

struct FakeSource {
    shows: Vec<WatchedShow>,
    fail_catalog: bool,
}

#[async_trait]
impl WatchHistorySource for FakeSource {
    type Error = SourceError;

    fn source_name(&self) -> &str {
        "fake-source"
    }

    async fn username(&self) -> Result<String, Self::Error> {
        Ok("alice".to_string())
    }

    async fn watched_shows(&self) -> Result<Vec<WatchedShow>, Self::Error> {
        if self.fail_catalog {
            return Err(SourceError::new("catalogue unavailable"));
        }
        Ok(self.shows.clone())
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Call {
    LogEpisodes { tmdb_id: u32, season_id: u64, episodes: Vec<u32> },
    LogSeasons { tmdb_id: u32, season_ids: Vec<u64> },
}

#[derive(Default)]
struct FakeDestination {
    shows: HashSet<u32>,
    seasons: HashMap<(u32, u32), DestinationSeason>,
    broken_shows: HashSet<u32>,
    broken_seasons: HashSet<(u32, u32)>,
    reject_writes: bool,
    fail_episode_writes: bool,
    fail_season_writes: bool,
    calls: Mutex<Vec<Call>>,
}

impl FakeDestination {
    fn with_season(mut self, tmdb_id: u32, season_number: u32, season_id: u64, episode_count: u32) -> Self {
        self.shows.insert(tmdb_id);
        self.seasons.insert(
            (tmdb_id, season_number),
            DestinationSeason { season_id, season_number, episode_count },
        );
        self
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl WatchLogDestination for FakeDestination {
    type Error = SourceError;

    fn destination_name(&self) -> &str {
        "fake-destination"
    }

    async fn find_show(&self, tmdb_id: u32) -> Result<Option<DestinationShow>, Self::Error> {
        if self.broken_shows.contains(&tmdb_id) {
            return Err(SourceError::new("connection reset"));
        }
        Ok(self.shows.contains(&tmdb_id).then(|| DestinationShow {
            tmdb_id,
            name: format!("show {}", tmdb_id),
            season_ids: Vec::new(),
        }))
    }

    async fn find_season(&self, tmdb_id: u32, season_number: u32) -> Result<Option<DestinationSeason>, Self::Error> {
        if self.broken_seasons.contains(&(tmdb_id, season_number)) {
            return Err(SourceError::new("season decode error"));
        }
        Ok(self.seasons.get(&(tmdb_id, season_number)).copied())
    }

    async fn log_episodes(&self, tmdb_id: u32, season_id: u64, episode_numbers: &[u32]) -> Result<bool, Self::Error> {
        self.calls.lock().unwrap().push(Call::LogEpisodes {
            tmdb_id,
            season_id,
            episodes: episode_numbers.to_vec(),
        });
        if self.fail_episode_writes {
            return Err(SourceError::new("timed out"));
        }
        Ok(!self.reject_writes)
    }

    async fn log_seasons(&self, tmdb_id: u32, season_ids: &[u64]) -> Result<bool, Self::Error> {
        self.calls.lock().unwrap().push(Call::LogSeasons {
            tmdb_id,
            season_ids: season_ids.to_vec(),
        });
        if self.fail_season_writes {
            return Err(SourceError::new("timed out"));
        }
        Ok(!self.reject_writes)
    }
}

fn season(number: u32, episodes: impl IntoIterator<Item = u32>) -> WatchedSeason {
    WatchedSeason {
        number,
        episodes: episodes
            .into_iter()
            .map(|n| WatchedEpisode { number: n, plays: 1, last_watched_at: None })
            .collect(),
    }
}

fn show(title: &str, tmdb: Option<u32>, seasons: Vec<WatchedSeason>) -> WatchedShow {
    WatchedShow {
        title: title.to_string(),
        year: Some(2020),
        ids: ShowIds { tmdb, ..Default::default() },
        plays: 0,
        last_watched_at: None,
        seasons,
    }
}

fn options(dry_run: bool) -> MigrateOptions {
    MigrateOptions { dry_run, delay: Duration::ZERO }
}

fn migrator(shows: Vec<WatchedShow>, destination: FakeDestination, dry_run: bool) -> Migrator<FakeSource, FakeDestination> {
    Migrator::new(FakeSource { shows, fail_catalog: false }, destination, options(dry_run))
}

#[tokio::test]
async fn test_complete_and_partial_seasons() {
    let destination = FakeDestination::default()
        .with_season(100, 1, 1001, 3)
        .with_season(100, 2, 1002, 3)
        .with_season(100, 3, 1003, 5);
    let shows = vec![show(
        "Dark",
        Some(100),
        vec![season(1, [1, 2, 3]), season(2, [1, 2, 3]), season(3, [1, 2])],
    )];

    let migrator = migrator(shows, destination, false);
    let report = migrator.run().await.unwrap();

    assert_eq!(report.username, "alice");
    assert_eq!(report.successful(), 1);
    assert_eq!(report.failed(), 0);
    assert_eq!(report.seasons_marked(), 2);
    assert_eq!(report.episodes_logged(), 2);
    assert_eq!(
        migrator.destination().calls(),
        vec![
            Call::LogEpisodes { tmdb_id: 100, season_id: 1003, episodes: vec![1, 2] },
            Call::LogSeasons { tmdb_id: 100, season_ids: vec![1001, 1002] },
        ]
    );
}

#[tokio::test]
async fn test_show_without_tmdb_id_is_skipped() {
    let shows = vec![show("Obscure", None, vec![season(1, [1])])];
    let migrator = migrator(shows, FakeDestination::default(), false);
    let report = migrator.run().await.unwrap();

    assert_eq!(report.successful(), 0);
    assert_eq!(report.failed(), 1);
    assert_eq!(report.skipped(), 1);
    assert_eq!(
        report.shows[0].outcome,
        ShowOutcome::Skipped { reason: "no TMDB id".to_string() }
    );
    assert!(migrator.destination().calls().is_empty());
}

#[tokio::test]
async fn test_show_missing_on_destination_is_skipped() {
    let shows = vec![show("Unknown", Some(7), vec![season(1, [1])])];
    let migrator = migrator(shows, FakeDestination::default(), false);
    let report = migrator.run().await.unwrap();

    assert_eq!(
        report.shows[0].outcome,
        ShowOutcome::Skipped { reason: "not found on destination".to_string() }
    );
    assert_eq!(report.failed(), 1);
}

#[tokio::test]
async fn test_missing_season_does_not_stop_show() {
    let destination = FakeDestination::default().with_season(200, 1, 2001, 2);
    let shows = vec![show("Fargo", Some(200), vec![season(1, [1, 2]), season(2, [1])])];

    let migrator = migrator(shows, destination, false);
    let report = migrator.run().await.unwrap();

    match &report.shows[0].outcome {
        ShowOutcome::Migrated { complete_seasons, missing_seasons, .. } => {
            assert_eq!(complete_seasons, &vec![1]);
            assert_eq!(missing_seasons, &vec![2]);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(report.successful(), 1);
}

#[tokio::test]
async fn test_seasons_without_episodes_are_ignored() {
    let destination = FakeDestination::default().with_season(300, 1, 3001, 2);
    let shows = vec![show("Specials", Some(300), vec![season(0, [0]), season(1, [])])];

    let migrator = migrator(shows, destination, false);
    let report = migrator.run().await.unwrap();

    assert!(report.shows[0].actions.is_empty());
    assert!(migrator.destination().calls().is_empty());
    assert!(report.shows[0].outcome.is_success());
}

#[tokio::test]
async fn test_rejected_writes_are_failed_seasons() {
    let mut destination = FakeDestination::default()
        .with_season(400, 1, 4001, 1)
        .with_season(400, 2, 4002, 4);
    destination.reject_writes = true;
    let shows = vec![show("Lost", Some(400), vec![season(1, [1]), season(2, [1])])];

    let migrator = migrator(shows, destination, false);
    let report = migrator.run().await.unwrap();

    match &report.shows[0].outcome {
        ShowOutcome::Migrated { complete_seasons, logged_seasons, failed_seasons, .. } => {
            assert!(complete_seasons.is_empty());
            assert!(logged_seasons.is_empty());
            assert_eq!(failed_seasons, &vec![2, 1]);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(report.episodes_logged(), 0);
}

#[tokio::test]
async fn test_destination_error_fails_only_that_show() {
    let mut destination = FakeDestination::default().with_season(600, 1, 6001, 1);
    destination.broken_shows.insert(500);
    let shows = vec![
        show("Broken", Some(500), vec![season(1, [1])]),
        show("Fine", Some(600), vec![season(1, [1])]),
    ];

    let migrator = migrator(shows, destination, false);
    let report = migrator.run().await.unwrap();

    assert_eq!(
        report.shows[0].outcome,
        ShowOutcome::Failed { reason: "connection reset".to_string() }
    );
    assert!(report.shows[1].outcome.is_success());
    assert_eq!(report.successful(), 1);
    assert_eq!(report.failed(), 1);
}

#[tokio::test]
async fn test_season_lookup_error_skips_only_that_season() {
    let mut destination = FakeDestination::default()
        .with_season(900, 1, 9001, 2)
        .with_season(900, 2, 9002, 2)
        .with_season(900, 3, 9003, 2);
    destination.broken_seasons.insert((900, 2));
    let shows = vec![show(
        "Severance",
        Some(900),
        vec![season(1, [1, 2]), season(2, [1, 2]), season(3, [1])],
    )];

    let migrator = migrator(shows, destination, false);
    let report = migrator.run().await.unwrap();

    match &report.shows[0].outcome {
        ShowOutcome::Migrated { complete_seasons, logged_seasons, failed_seasons, missing_seasons } => {
            assert_eq!(complete_seasons, &vec![1]);
            assert_eq!(logged_seasons, &vec![3]);
            assert_eq!(failed_seasons, &vec![2]);
            assert!(missing_seasons.is_empty());
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(report.successful(), 1);
    assert_eq!(report.shows[0].actions.len(), 2);
    assert_eq!(
        migrator.destination().calls(),
        vec![
            Call::LogEpisodes { tmdb_id: 900, season_id: 9003, episodes: vec![1] },
            Call::LogSeasons { tmdb_id: 900, season_ids: vec![9001] },
        ]
    );
}

#[tokio::test]
async fn test_episode_write_error_still_marks_complete_seasons() {
    let mut destination = FakeDestination::default()
        .with_season(910, 1, 9101, 4)
        .with_season(910, 2, 9102, 1);
    destination.fail_episode_writes = true;
    let shows = vec![show("Andor", Some(910), vec![season(1, [1, 2]), season(2, [1])])];

    let migrator = migrator(shows, destination, false);
    let report = migrator.run().await.unwrap();

    match &report.shows[0].outcome {
        ShowOutcome::Migrated { complete_seasons, logged_seasons, failed_seasons, .. } => {
            assert_eq!(complete_seasons, &vec![2]);
            assert!(logged_seasons.is_empty());
            assert_eq!(failed_seasons, &vec![1]);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(
        migrator.destination().calls(),
        vec![
            Call::LogEpisodes { tmdb_id: 910, season_id: 9101, episodes: vec![1, 2] },
            Call::LogSeasons { tmdb_id: 910, season_ids: vec![9102] },
        ]
    );
}

#[tokio::test]
async fn test_season_write_error_fails_complete_seasons_only() {
    let mut destination = FakeDestination::default()
        .with_season(920, 1, 9201, 1)
        .with_season(920, 2, 9202, 3);
    destination.fail_season_writes = true;
    let shows = vec![show("Loki", Some(920), vec![season(1, [1]), season(2, [2])])];

    let migrator = migrator(shows, destination, false);
    let report = migrator.run().await.unwrap();

    match &report.shows[0].outcome {
        ShowOutcome::Migrated { complete_seasons, logged_seasons, failed_seasons, .. } => {
            assert!(complete_seasons.is_empty());
            assert_eq!(logged_seasons, &vec![2]);
            assert_eq!(failed_seasons, &vec![1]);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert!(report.shows[0].outcome.is_success());
    assert_eq!(report.episodes_logged(), 1);
}

#[tokio::test]
async fn test_source_failure_is_fatal() {
    let migrator = Migrator::new(
        FakeSource { shows: Vec::new(), fail_catalog: true },
        FakeDestination::default(),
        options(false),
    );

    let err = migrator.run().await.unwrap_err();
    match err {
        MigrationError::Source { source_name, message } => {
            assert_eq!(source_name, "fake-source");
            assert_eq!(message, "catalogue unavailable");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_dry_run_plans_without_writing() {
    let destination = FakeDestination::default()
        .with_season(700, 1, 7001, 2)
        .with_season(700, 2, 7002, 10);
    let shows = vec![show("Halt", Some(700), vec![season(1, [1, 2]), season(2, [1, 2, 3])])];

    let migrator = migrator(shows, destination, true);
    let report = migrator.run().await.unwrap();

    assert!(report.dry_run);
    assert!(migrator.destination().calls().is_empty());
    assert_eq!(report.seasons_marked(), 1);
    assert_eq!(report.episodes_logged(), 3);
    assert_eq!(report.shows[0].actions.len(), 2);
}

#[derive(Default)]
struct RecordingObserver {
    events: Mutex<Vec<String>>,
}

impl MigrationObserver for RecordingObserver {
    fn on_catalog(&self, total_shows: usize) {
        self.events.lock().unwrap().push(format!("catalog {}", total_shows));
    }

    fn on_show_start(&self, index: usize, show: &WatchedShow) {
        self.events.lock().unwrap().push(format!("start {} {}", index, show.title));
    }

    fn on_show_finish(&self, index: usize, report: &ShowReport) {
        self.events
            .lock()
            .unwrap()
            .push(format!("finish {} {}", index, report.outcome.is_success()));
    }
}

#[tokio::test]
async fn test_observer_sees_every_show() {
    let destination = FakeDestination::default().with_season(800, 1, 8001, 1);
    let shows = vec![
        show("One", Some(800), vec![season(1, [1])]),
        show("Two", None, vec![]),
    ];
    let observer = Arc::new(RecordingObserver::default());

    let migrator = migrator(shows, destination, false).with_observer(observer.clone());
    migrator.run().await.unwrap();

    assert_eq!(
        *observer.events.lock().unwrap(),
        vec![
            "catalog 2".to_string(),
            "start 0 One".to_string(),
            "finish 0 true".to_string(),
            "start 1 Two".to_string(),
            "finish 1 false".to_string(),
        ]
    );
}
