use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    /// Watch history could not be read; nothing was migrated
    #[error("Failed to read watch history from {source_name}: {message}")]
    Source { source_name: String, message: String },

    #[error("Failed to write migration report to {}: {message}", path.display())]
    Report { path: PathBuf, message: String },
}
