use serde::{Deserialize, Serialize};

/// Identifiers a source attaches to a show
///
/// Only `tmdb` is used to address the show on the destination side; the rest
/// are carried along so log lines and dry-run plans can point at the source record.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ShowIds {
    pub trakt: Option<u64>,
    pub slug: Option<String>,
    pub tmdb: Option<u32>,
    pub tvdb: Option<u32>,
    pub imdb: Option<String>,
}

impl ShowIds {
    /// Get the primary identifier for display (prefer tmdb, fallback to others)
    pub fn primary_id(&self) -> Option<String> {
        self.tmdb.map(|id| format!("tmdb:{}", id))
            .or_else(|| self.imdb.clone())
            .or_else(|| self.trakt.map(|id| format!("trakt:{}", id)))
            .or_else(|| self.tvdb.map(|id| format!("tvdb:{}", id)))
            .or_else(|| self.slug.clone())
    }
}
