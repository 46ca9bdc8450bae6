use crate::error::SourceError;
use crate::serializd::{api, auth};
use crate::traits::WatchLogDestination;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use showmigrate_config::{CredentialStore, DEFAULT_SERIALIZD_BASE_URL};
use showmigrate_models::{DestinationSeason, DestinationShow};
use std::sync::Arc;

#[derive(Clone)]
pub struct SerializdClient {
    client: Arc<Client>,
    base_url: String,
    token: Option<String>,
}

impl SerializdClient {
    pub fn new() -> Self {
        Self {
            client: Arc::new(crate::create_http_client()),
            base_url: DEFAULT_SERIALIZD_BASE_URL.to_string(),
            token: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub async fn login(&mut self, email: &str, password: &str) -> Result<()> {
        let token = auth::login(&self.client, &self.base_url, email, password).await?;
        self.token = Some(token);
        Ok(())
    }

    /// Log in with the password saved in the credential store
    pub async fn authenticate(&mut self, email: &str, cred_store: &CredentialStore) -> Result<()> {
        let password = cred_store
            .get_serializd_password()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| anyhow!("Serializd password not found in credentials"))?
            .clone();
        self.login(email, &password).await
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    fn token(&self) -> Result<&str, SourceError> {
        self.token
            .as_deref()
            .ok_or_else(|| SourceError::new("Not authenticated to Serializd"))
    }
}

impl Default for SerializdClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WatchLogDestination for SerializdClient {
    type Error = SourceError;

    fn destination_name(&self) -> &str {
        "serializd"
    }

    async fn find_show(&self, tmdb_id: u32) -> Result<Option<DestinationShow>, Self::Error> {
        let token = self.token()?;
        Ok(api::get_show(&self.client, &self.base_url, token, tmdb_id).await?)
    }

    async fn find_season(
        &self,
        tmdb_id: u32,
        season_number: u32,
    ) -> Result<Option<DestinationSeason>, Self::Error> {
        let token = self.token()?;
        Ok(api::get_season(&self.client, &self.base_url, token, tmdb_id, season_number).await?)
    }

    async fn log_episodes(
        &self,
        tmdb_id: u32,
        season_id: u64,
        episode_numbers: &[u32],
    ) -> Result<bool, Self::Error> {
        let token = self.token()?;
        Ok(api::log_episodes(&self.client, &self.base_url, token, tmdb_id, season_id, episode_numbers).await?)
    }

    async fn log_seasons(&self, tmdb_id: u32, season_ids: &[u64]) -> Result<bool, Self::Error> {
        let token = self.token()?;
        Ok(api::log_seasons(&self.client, &self.base_url, token, tmdb_id, season_ids).await?)
    }
}
