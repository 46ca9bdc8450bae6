use anyhow::{anyhow, Result};
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration as StdDuration;
use tokio::time::sleep;
use tracing::{debug, info};
use crate::{create_http_client, join_url};

#[derive(Debug, Serialize, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    7_776_000 // Trakt tokens last 3 months
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceCode {
    pub device_code: String,
    pub user_code: String,
    pub verification_url: String,
    pub expires_in: u64,
    /// Polling interval in seconds
    pub interval: u64,
}

#[derive(Debug)]
pub struct TokenInfo {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
}

/// `now + seconds`, or an error when the server sends a lifetime chrono can't represent
fn expiry_after(seconds: u64) -> Result<DateTime<Utc>> {
    i64::try_from(seconds)
        .ok()
        .and_then(Duration::try_seconds)
        .and_then(|lifetime| Utc::now().checked_add_signed(lifetime))
        .ok_or_else(|| anyhow!("Trakt returned an out-of-range expiry of {} seconds", seconds))
}

/// Run the full device flow: request a code, show it, poll until authorized
pub async fn authenticate(base_url: &str, client_id: &str, client_secret: &str) -> Result<TokenInfo> {
    let client = create_http_client();

    let device_code = request_device_code(&client, base_url, client_id).await?;

    eprintln!("\n╔══════════════════════════════════════════════════════════════╗");
    eprintln!("║           Trakt Device Authorization Required               ║");
    eprintln!("╚══════════════════════════════════════════════════════════════╝");
    eprintln!("\n1. Visit this URL in your browser:");
    eprintln!("   {}\n", device_code.verification_url);
    eprintln!("2. Enter this code when prompted:");
    eprintln!("   {}\n", device_code.user_code);
    eprintln!("3. You have {} seconds to complete this.", device_code.expires_in);
    eprintln!("   (This window will automatically continue once you authorize)\n");

    let token_info = poll_for_token(&client, base_url, client_id, client_secret, &device_code).await?;
    eprintln!("\n✓ Authorization successful!\n");
    info!("Trakt authentication successful");
    Ok(token_info)
}

/// POST /oauth/device/code
pub async fn request_device_code(client: &Client, base_url: &str, client_id: &str) -> Result<DeviceCode> {
    let response = client
        .post(join_url(base_url, "/oauth/device/code"))
        .json(&serde_json::json!({ "client_id": client_id }))
        .header("Content-Type", "application/json")
        .send()
        .await?;

    if !response.status().is_success() {
        let status = response.status();
        let error_text = response.text().await.unwrap_or_default();
        return Err(anyhow!("Failed to get device code: {} - {}", status, error_text));
    }

    let response_text = response.text().await?;
    serde_json::from_str(&response_text).map_err(|e| {
        tracing::error!("Failed to parse device code response: {}. Raw response: {}", e, response_text);
        anyhow!("Failed to parse device code response: {}", e)
    })
}

/// Poll POST /oauth/device/token until the user approves, denies, or the code expires
pub async fn poll_for_token(
    client: &Client,
    base_url: &str,
    client_id: &str,
    client_secret: &str,
    device_code: &DeviceCode,
) -> Result<TokenInfo> {
    let expires_at = expiry_after(device_code.expires_in)?;
    let mut poll_interval = device_code.interval;
    let payload = serde_json::json!({
        "code": device_code.device_code,
        "client_id": client_id,
        "client_secret": client_secret,
    });

    while Utc::now() < expires_at {
        sleep(StdDuration::from_secs(poll_interval)).await;

        let response = client
            .post(join_url(base_url, "/oauth/device/token"))
            .json(&payload)
            .header("Content-Type", "application/json")
            .send()
            .await?;

        let status = response.status();
        match status.as_u16() {
            200 => {
                let token_response: TokenResponse = response.json().await?;
                let expires_at = expiry_after(token_response.expires_in.saturating_sub(120))?;
                return Ok(TokenInfo {
                    access_token: token_response.access_token,
                    refresh_token: token_response.refresh_token,
                    expires_at,
                });
            }
            400 => {
                debug!("Authorization pending");
            }
            429 => {
                poll_interval += 1;
                debug!(interval = poll_interval, "Polling too fast, slowing down");
            }
            404 => return Err(anyhow!("Invalid device code")),
            409 => return Err(anyhow!("Device code already used")),
            410 => return Err(anyhow!("Device code expired. Please try again.")),
            418 => return Err(anyhow!("Authorization denied by user")),
            _ => {
                let error_text = response.text().await.unwrap_or_default();
                return Err(anyhow!("Authentication error: {} - {}", status, error_text));
            }
        }
    }

    Err(anyhow!("Authentication timed out - please try again"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn device_code(expires_in: u64) -> DeviceCode {
        DeviceCode {
            device_code: "dev-123".to_string(),
            user_code: "ABCD1234".to_string(),
            verification_url: "https://trakt.tv/activate".to_string(),
            expires_in,
            interval: 0,
        }
    }

    #[tokio::test]
    async fn test_request_device_code() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/device/code"))
            .and(body_partial_json(serde_json::json!({ "client_id": "cid" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "device_code": "dev-123",
                "user_code": "ABCD1234",
                "verification_url": "https://trakt.tv/activate",
                "expires_in": 600,
                "interval": 5
            })))
            .expect(1)
            .mount(&server)
            .await;

        let code = request_device_code(&Client::new(), &server.uri(), "cid").await.unwrap();
        assert_eq!(code.user_code, "ABCD1234");
        assert_eq!(code.interval, 5);
        assert_eq!(code.expires_in, 600);
    }

    #[tokio::test]
    async fn test_request_device_code_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/device/code"))
            .respond_with(ResponseTemplate::new(403).set_body_string("invalid api key"))
            .mount(&server)
            .await;

        let err = request_device_code(&Client::new(), &server.uri(), "bad").await.unwrap_err();
        assert!(err.to_string().contains("403"));
    }

    #[tokio::test]
    async fn test_poll_pending_then_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/device/token"))
            .respond_with(ResponseTemplate::new(400))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/oauth/device/token"))
            .and(body_partial_json(serde_json::json!({
                "code": "dev-123",
                "client_id": "cid",
                "client_secret": "secret"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "access",
                "refresh_token": "refresh",
                "expires_in": 7200,
                "token_type": "bearer"
            })))
            .mount(&server)
            .await;

        let token = poll_for_token(&Client::new(), &server.uri(), "cid", "secret", &device_code(30))
            .await
            .unwrap();
        assert_eq!(token.access_token, "access");
        assert_eq!(token.refresh_token.as_deref(), Some("refresh"));
        assert!(token.expires_at > Utc::now());
    }

    #[tokio::test]
    async fn test_poll_denied() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/device/token"))
            .respond_with(ResponseTemplate::new(418))
            .mount(&server)
            .await;

        let err = poll_for_token(&Client::new(), &server.uri(), "cid", "secret", &device_code(30))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("denied"));
    }

    #[tokio::test]
    async fn test_poll_expired_code() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/device/token"))
            .respond_with(ResponseTemplate::new(410))
            .mount(&server)
            .await;

        let err = poll_for_token(&Client::new(), &server.uri(), "cid", "secret", &device_code(30))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("expired"));
    }

    #[tokio::test]
    async fn test_poll_rejects_huge_token_lifetime() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/device/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "access",
                "expires_in": u64::MAX
            })))
            .mount(&server)
            .await;

        let err = poll_for_token(&Client::new(), &server.uri(), "cid", "secret", &device_code(30))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("out-of-range"));
    }

    #[tokio::test]
    async fn test_poll_rejects_huge_code_lifetime() {
        let server = MockServer::start().await;

        let err = poll_for_token(&Client::new(), &server.uri(), "cid", "secret", &device_code(u64::MAX / 2))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("out-of-range"));
    }

    #[test]
    fn test_expiry_after_short_lifetime() {
        let expires_at = expiry_after(60).unwrap();
        assert!(expires_at > Utc::now());
        assert!(expires_at <= Utc::now() + Duration::seconds(60));
    }

    #[tokio::test]
    async fn test_poll_times_out() {
        let server = MockServer::start().await;

        let err = poll_for_token(&Client::new(), &server.uri(), "cid", "secret", &device_code(0))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("timed out"));
    }
}
