use crate::error::SourceError;
use crate::traits::WatchHistorySource;
use crate::trakt::{api, auth};
use anyhow::Result;
use async_trait::async_trait;
use chrono::Duration;
use reqwest::Client;
use showmigrate_config::{CredentialStore, DEFAULT_TRAKT_BASE_URL};
use showmigrate_models::WatchedShow;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
pub struct TraktClient {
    client: Arc<Client>,
    base_url: String,
    client_id: String,
    client_secret: String,
    access_token: Option<String>,
}

impl TraktClient {
    pub fn new(client_id: String, client_secret: String) -> Self {
        Self {
            client: Arc::new(crate::create_http_client()),
            base_url: DEFAULT_TRAKT_BASE_URL.to_string(),
            client_id,
            client_secret,
            access_token: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_access_token(mut self, access_token: impl Into<String>) -> Self {
        self.access_token = Some(access_token.into());
        self
    }

    /// Reuse a saved, unexpired access token or run the device flow
    ///
    /// An expired token is never refreshed; the device flow runs again instead.
    /// The saved token is dropped only when Trakt rejects it.
    pub async fn authenticate(&mut self, cred_store: &mut CredentialStore) -> Result<()> {
        if let Some(saved_token) = cred_store.valid_trakt_access_token(Duration::minutes(5)).cloned() {
            match api::get_username(&self.client, &self.base_url, &saved_token, &self.client_id).await {
                Ok(username) => {
                    self.access_token = Some(saved_token);
                    info!("Using saved Trakt access token for {}", username);
                    return Ok(());
                }
                Err(e) if e.downcast_ref::<api::TokenRejected>().is_some() => {
                    info!("Saved Trakt token was rejected, starting device authorization");
                    cred_store.clear_trakt_tokens();
                    cred_store.save()?;
                }
                Err(e) => {
                    warn!("Could not verify saved Trakt token: {:#}", e);
                    return Err(e.context("Failed to reach Trakt with the saved token"));
                }
            }
        }

        let token_info = auth::authenticate(&self.base_url, &self.client_id, &self.client_secret).await?;
        self.access_token = Some(token_info.access_token.clone());

        cred_store.set_trakt_access_token(token_info.access_token);
        cred_store.set_trakt_token_expires(token_info.expires_at);
        cred_store.save()?;

        info!("Authenticated to Trakt");
        Ok(())
    }

    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    fn access_token(&self) -> Result<&str, SourceError> {
        self.access_token
            .as_deref()
            .ok_or_else(|| SourceError::new("Not authenticated to Trakt"))
    }
}

#[async_trait]
impl WatchHistorySource for TraktClient {
    type Error = SourceError;

    fn source_name(&self) -> &str {
        "trakt"
    }

    async fn username(&self) -> Result<String, Self::Error> {
        let access_token = self.access_token()?;
        Ok(api::get_username(&self.client, &self.base_url, access_token, &self.client_id).await?)
    }

    async fn watched_shows(&self) -> Result<Vec<WatchedShow>, Self::Error> {
        let access_token = self.access_token()?;
        Ok(api::get_watched_shows(&self.client, &self.base_url, access_token, &self.client_id).await?)
    }
}
