use anyhow::{anyhow, Result};
use reqwest::Client;
use serde::Deserialize;
use tracing::info;
use crate::join_url;
use crate::serializd::api::with_site_headers;

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: Option<String>,
}

/// Log in with email and password, returning the session token
///
/// The token is later sent as the `tvproject_credentials` cookie.
pub async fn login(client: &Client, base_url: &str, email: &str, password: &str) -> Result<String> {
    let response = with_site_headers(client.post(join_url(base_url, "/login")))
        .json(&serde_json::json!({
            "email": email,
            "password": password,
        }))
        .send()
        .await?;

    let status = response.status();
    if status.as_u16() != 200 {
        let error_text = response.text().await.unwrap_or_default();
        return Err(anyhow!("Login failed: {} - {}", status, error_text));
    }

    let login_response: LoginResponse = response.json().await?;
    let token = login_response
        .token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| anyhow!("No access token received from Serializd"))?;

    info!("Serializd authentication successful");
    Ok(token)
}
