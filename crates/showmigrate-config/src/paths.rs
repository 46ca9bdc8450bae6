use anyhow::Result;
use std::path::{Path, PathBuf};

/// Get the base path override from environment variable, defaulting to "/app"
pub fn container_base_path() -> PathBuf {
    std::env::var("SHOWMIGRATE_BASE_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/app"))
}

pub struct PathManager {
    config_dir: PathBuf,
    data_dir: PathBuf,
    log_dir: PathBuf,
}

impl PathManager {
    pub fn new() -> Result<Self> {
        let base_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
            .join("showmigrate");

        Ok(Self::with_base(base_dir))
    }

    /// Lay the directories out under an explicit base (config files at base level)
    pub fn with_base(base: PathBuf) -> Self {
        Self {
            config_dir: base.clone(),
            data_dir: base.join("data"),
            log_dir: base.join("logs"),
        }
    }

    pub fn from_env() -> Self {
        Self::with_base(container_base_path())
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    pub fn credentials_file(&self) -> PathBuf {
        self.config_dir.join("credentials.toml")
    }

    pub fn migration_log_file(&self) -> PathBuf {
        self.log_dir.join("migration.log")
    }

    /// Default location for a dry-run plan, stamped so runs don't overwrite each other
    pub fn dry_run_file(&self, stamp: &str) -> PathBuf {
        self.data_dir.join(format!("dry-run-{}.json", stamp))
    }

    pub fn ensure_directories(&self) -> Result<()> {
        std::fs::create_dir_all(&self.config_dir)?;
        std::fs::create_dir_all(&self.data_dir)?;
        std::fs::create_dir_all(&self.log_dir)?;
        Ok(())
    }
}

impl Default for PathManager {
    fn default() -> Self {
        // An explicit override always wins
        if std::env::var_os("SHOWMIGRATE_BASE_PATH").is_some() {
            return Self::from_env();
        }

        let base = container_base_path();
        if base.exists() {
            return Self::from_env();
        }

        // Otherwise, use platform-specific paths (e.g., ~/.config/showmigrate on Linux)
        Self::new().unwrap_or_else(|_| Self::from_env())
    }
}
