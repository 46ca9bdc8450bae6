pub mod action;
pub mod destination;
pub mod report;
pub mod show;
pub mod show_ids;

pub use action::SeasonAction;
pub use destination::{DestinationSeason, DestinationShow};
pub use report::{MigrationReport, ShowOutcome, ShowReport};
pub use show::{WatchedEpisode, WatchedSeason, WatchedShow};
pub use show_ids::ShowIds;
