use crate::output::Output;
use color_eyre::Result;
use showmigrate_config::PathManager;
use std::fs;
use std::path::Path;

pub fn run_clear(all: bool, credentials: bool, logs: bool, log_file: &Path, output: &Output) -> Result<()> {
    let path_manager = PathManager::default();

    if all {
        clear_credentials(&path_manager, output)?;
        clear_logs(log_file, output)?;
        output.success("All credentials and logs cleared");
        return Ok(());
    }

    if credentials {
        clear_credentials(&path_manager, output)?;
    }

    if logs {
        clear_logs(log_file, output)?;
    }

    if !credentials && !logs {
        output.warn("No clear option specified. Use --credentials, --logs, or --all");
        output.println("\nExample: showmigrate clear --credentials");
    }

    Ok(())
}

fn clear_credentials(path_manager: &PathManager, output: &Output) -> Result<()> {
    let credentials_file = path_manager.credentials_file();

    if credentials_file.exists() {
        fs::remove_file(&credentials_file)
            .map_err(|e| color_eyre::eyre::eyre!("Failed to remove credentials file at {}: {}", credentials_file.display(), e))?;
        output.success(format!("Cleared credentials: {}", credentials_file.display()));
    } else {
        output.info("No credentials file found to clear");
    }

    Ok(())
}

/// Truncates the log file in place
fn clear_logs(log_file: &Path, output: &Output) -> Result<()> {
    if log_file.exists() {
        fs::write(log_file, b"")
            .map_err(|e| color_eyre::eyre::eyre!("Failed to clear log file at {}: {}", log_file.display(), e))?;
        output.success(format!("Cleared migration log: {}", log_file.display()));
    } else {
        output.info("No migration log found to clear");
    }

    Ok(())
}
