use crate::error::MigrationError;
use showmigrate_models::MigrationReport;
use std::path::Path;
use tracing::info;

/// Write the report as pretty JSON, creating parent directories as needed
pub fn write_report(report: &MigrationReport, path: &Path) -> Result<(), MigrationError> {
    let to_error = |message: String| MigrationError::Report {
        path: path.to_path_buf(),
        message,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| to_error(e.to_string()))?;
    }

    let json = serde_json::to_string_pretty(report).map_err(|e| to_error(e.to_string()))?;
    std::fs::write(path, json).map_err(|e| to_error(e.to_string()))?;

    info!("Migration report written to {} ({} shows)", path.display(), report.shows.len());
    Ok(())
}
