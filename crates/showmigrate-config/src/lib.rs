pub mod config;
pub mod credentials;
pub mod paths;

pub use config::{Config, MigrationConfig, SerializdConfig, TraktConfig, DEFAULT_SERIALIZD_BASE_URL, DEFAULT_TRAKT_BASE_URL};
pub use credentials::CredentialStore;
pub use paths::{PathManager, container_base_path};
