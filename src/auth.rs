//! OAuth password-grant authentication.
//!
//! The provider issues a single bearer token per credential exchange; the
//! client acquires it once at construction and holds it for its lifetime.

use crate::config::GatewayConfig;
use crate::error::{GatewayError, GatewayResult};
use serde::Deserialize;
use tracing::{debug, error};

pub(crate) const OAUTH_PATH: &str = "/api/v1/oauth/token";

/// Scope the provider expects from merchant-side clients.
const OAUTH_SCOPE: &str = "online-merchant";

/// Default message when the provider rejects the credential exchange.
const AUTH_FAILED_MESSAGE: &str = "خطا در احراز هویت درگاه پرداخت";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Exchanges the configured credentials for a bearer token. One shot, no
/// retry; a rejected exchange leaves the caller without a usable client.
pub(crate) async fn authenticate(
    http: &reqwest::Client,
    config: &GatewayConfig,
) -> GatewayResult<String> {
    let url = format!("{}{}", config.base_url.trim_end_matches('/'), OAUTH_PATH);
    debug!("Requesting OAuth token from {}", url);

    let response = http
        .post(&url)
        .basic_auth(&config.client_id, Some(&config.client_secret))
        .form(&[
            ("grant_type", "password"),
            ("scope", OAUTH_SCOPE),
            ("username", config.username.as_str()),
            ("password", config.password.as_str()),
        ])
        .send()
        .await
        .map_err(|e| {
            GatewayError::authentication_failed(format!("{}: {}", AUTH_FAILED_MESSAGE, e))
        })?;

    if !response.status().is_success() {
        error!("OAuth exchange rejected with HTTP {}", response.status());
        return Err(GatewayError::authentication_failed(AUTH_FAILED_MESSAGE));
    }

    let token: TokenResponse = response
        .json()
        .await
        .map_err(|e| GatewayError::invalid_response(format!("OAuth token body: {}", e)))?;

    debug!("OAuth token acquired");
    Ok(token.access_token)
}
