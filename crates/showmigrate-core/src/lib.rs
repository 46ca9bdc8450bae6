pub mod error;
pub mod migrate;
pub mod pace;
pub mod plan;
pub mod report;

pub use error::MigrationError;
pub use migrate::{MigrateOptions, MigrationObserver, Migrator, DEFAULT_DELAY};
pub use pace::Pacer;
pub use plan::{complete_season_ids, is_season_complete, plan_season};
pub use report::write_report;
