pub mod error;
pub mod serializd;
pub mod trakt;
pub mod traits;

pub use error::SourceError;
pub use serializd::SerializdClient;
pub use trakt::{trakt_authenticate, TraktClient};
pub use traits::{WatchHistorySource, WatchLogDestination};

/// Create a reqwest Client identifying this tool
pub(crate) fn create_http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent(concat!("showmigrate/", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

/// Join a configured base URL and an API path without doubling slashes
pub(crate) fn join_url(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path.trim_start_matches('/'))
}
