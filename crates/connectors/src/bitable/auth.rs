//! Tenant access token cache
//!
//! Every Bitable call needs a tenant access token derived from the app id and
//! secret. Tokens live for about two hours; the cache refreshes one when it is
//! missing or close to expiry. Concurrent callers queue on the cache lock so a
//! refresh happens once.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::types::{TokenRequest, TokenResponse};
use crate::cancel::with_cancel;
use crate::error::ConnectorError;
use crate::http::decode_envelope;

/// Refresh this long before the token actually expires
const REFRESH_MARGIN: Duration = Duration::from_secs(5 * 60);

#[derive(Debug)]
struct CachedToken {
    value: String,
    refresh_at: Instant,
}

/// Lazily refreshed tenant access token
#[derive(Debug)]
pub struct TenantTokenCache {
    url: String,
    app_id: String,
    app_secret: String,
    cached: Mutex<Option<CachedToken>>,
}

impl TenantTokenCache {
    pub fn new(base_url: &str, app_id: &str, app_secret: &str) -> Self {
        Self {
            url: format!("{}/open-apis/auth/v3/tenant_access_token/internal", base_url),
            app_id: app_id.to_string(),
            app_secret: app_secret.to_string(),
            cached: Mutex::new(None),
        }
    }

    /// A valid token, fetching a new one if needed
    pub async fn token(
        &self,
        client: &reqwest::Client,
        cancel: &CancellationToken,
    ) -> Result<String, ConnectorError> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref()
            && Instant::now() < token.refresh_at
        {
            return Ok(token.value.clone());
        }

        let fresh = self.fetch(client, cancel).await?;
        let value = fresh.value.clone();
        *cached = Some(fresh);
        Ok(value)
    }

    async fn fetch(
        &self,
        client: &reqwest::Client,
        cancel: &CancellationToken,
    ) -> Result<CachedToken, ConnectorError> {
        let body = TokenRequest {
            app_id: &self.app_id,
            app_secret: &self.app_secret,
        };

        let response: TokenResponse = with_cancel(cancel, async {
            let response = client.post(&self.url).json(&body).send().await?;
            decode_envelope(response).await
        })
        .await?;

        parse_token(response, Instant::now())
    }
}

fn parse_token(response: TokenResponse, now: Instant) -> Result<CachedToken, ConnectorError> {
    if response.code != 0 {
        return Err(ConnectorError::AuthFailed(format!(
            "tenant token request returned code {}: {}",
            response.code, response.msg
        )));
    }

    let value = response
        .tenant_access_token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ConnectorError::AuthFailed("tenant token missing from response".into()))?;

    let lifetime = Duration::from_secs(response.expire);
    debug!(expires_in_secs = response.expire, "obtained tenant access token");

    Ok(CachedToken {
        value,
        refresh_at: now + lifetime.saturating_sub(REFRESH_MARGIN),
    })
}
