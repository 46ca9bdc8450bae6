use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_TRAKT_BASE_URL: &str = "https://api.trakt.tv";
pub const DEFAULT_SERIALIZD_BASE_URL: &str = "https://www.serializd.com/api";

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub trakt: Option<TraktConfig>,
    #[serde(default)]
    pub serializd: Option<SerializdConfig>,
    #[serde(default)]
    pub migration: MigrationConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TraktConfig {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_trakt_base_url")]
    pub base_url: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SerializdConfig {
    pub email: String,
    #[serde(default = "default_serializd_base_url")]
    pub base_url: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MigrationConfig {
    /// Fixed pause between outbound calls, in milliseconds
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
    /// Overrides the default `migration.log` location
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl MigrationConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            delay_ms: default_delay_ms(),
            log_file: None,
        }
    }
}

impl TraktConfig {
    pub fn new(client_id: String, client_secret: String) -> Self {
        Self {
            client_id,
            client_secret,
            base_url: default_trakt_base_url(),
        }
    }
}

impl SerializdConfig {
    pub fn new(email: String) -> Self {
        Self {
            email,
            base_url: default_serializd_base_url(),
        }
    }
}

fn default_trakt_base_url() -> String {
    DEFAULT_TRAKT_BASE_URL.to_string()
}

fn default_serializd_base_url() -> String {
    DEFAULT_SERIALIZD_BASE_URL.to_string()
}

fn default_delay_ms() -> u64 {
    1000 // 1 second between calls
}

impl Config {
    pub fn load_from_file(path: &PathBuf) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load the config if it exists, otherwise start from defaults
    pub fn load_or_default(path: &PathBuf) -> anyhow::Result<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save_to_file(&self, path: &PathBuf) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let trakt = self.trakt.as_ref()
            .ok_or_else(|| anyhow::anyhow!("Trakt is not configured"))?;
        if trakt.client_id.is_empty() || trakt.client_id == "YOUR_CLIENT_ID" {
            return Err(anyhow::anyhow!("Trakt client_id is not configured"));
        }
        if trakt.client_secret.is_empty() || trakt.client_secret == "YOUR_CLIENT_SECRET" {
            return Err(anyhow::anyhow!("Trakt client_secret is not configured"));
        }
        if trakt.base_url.is_empty() {
            return Err(anyhow::anyhow!("Trakt base_url cannot be empty"));
        }

        let serializd = self.serializd.as_ref()
            .ok_or_else(|| anyhow::anyhow!("Serializd is not configured"))?;
        if serializd.email.trim().is_empty() {
            return Err(anyhow::anyhow!("Serializd email is not configured"));
        }
        if serializd.base_url.is_empty() {
            return Err(anyhow::anyhow!("Serializd base_url cannot be empty"));
        }

        Ok(())
    }

    pub fn is_trakt_configured(&self) -> bool {
        self.trakt.as_ref().map_or(false, |t| {
            !t.client_id.is_empty()
                && t.client_id != "YOUR_CLIENT_ID"
                && !t.client_secret.is_empty()
                && t.client_secret != "YOUR_CLIENT_SECRET"
        })
    }

    pub fn is_serializd_configured(&self) -> bool {
        self.serializd.as_ref().map_or(false, |s| !s.email.trim().is_empty())
    }
}
