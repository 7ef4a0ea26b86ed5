use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;

/// Currency unit the merchant states amounts in.
///
/// The provider itself always bills in Rials; Toman amounts are converted
/// on the way out (see [`crate::normalize::normalize_amount`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurrencyUnit {
    Rial,
    Toman,
}

impl CurrencyUnit {
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "rial" | "irr" => Ok(Self::Rial),
            "toman" | "irt" => Ok(Self::Toman),
            other => Err(anyhow!(
                "Currency unit must be 'rial' or 'toman', got {}",
                other
            )),
        }
    }
}

/// Credentials and endpoints for one gateway client instance.
///
/// Immutable for the lifetime of the client. Construction validates every
/// required field so a misconfigured merchant fails fast instead of midway
/// through a purchase.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    pub base_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub username: String,
    pub password: String,
    pub callback_url: String,
    pub currency_unit: CurrencyUnit,
}

impl GatewayConfig {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        base_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        callback_url: impl Into<String>,
        currency_unit: CurrencyUnit,
    ) -> Result<Self> {
        let config = Self {
            base_url: base_url.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            username: username.into(),
            password: password.into(),
            callback_url: callback_url.into(),
            currency_unit,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn from_env() -> Result<Self> {
        let currency_unit = CurrencyUnit::parse(
            &env::var("QISTPAY_CURRENCY_UNIT").unwrap_or_else(|_| "rial".to_string()),
        )?;

        let config = Self {
            base_url: env::var("QISTPAY_BASE_URL").context("QISTPAY_BASE_URL not set")?,
            client_id: env::var("QISTPAY_CLIENT_ID").context("QISTPAY_CLIENT_ID not set")?,
            client_secret: env::var("QISTPAY_CLIENT_SECRET")
                .context("QISTPAY_CLIENT_SECRET not set")?,
            username: env::var("QISTPAY_USERNAME").context("QISTPAY_USERNAME not set")?,
            password: env::var("QISTPAY_PASSWORD").context("QISTPAY_PASSWORD not set")?,
            callback_url: env::var("QISTPAY_CALLBACK_URL")
                .context("QISTPAY_CALLBACK_URL not set")?,
            currency_unit,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(anyhow!("Gateway base URL cannot be empty"));
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(anyhow!(
                "Gateway base URL must start with http:// or https://, got {}",
                self.base_url
            ));
        }

        if self.client_id.trim().is_empty() {
            return Err(anyhow!("OAuth client id cannot be empty"));
        }

        if self.client_secret.trim().is_empty() {
            return Err(anyhow!("OAuth client secret cannot be empty"));
        }

        if self.username.trim().is_empty() {
            return Err(anyhow!("Merchant username cannot be empty"));
        }

        if self.password.trim().is_empty() {
            return Err(anyhow!("Merchant password cannot be empty"));
        }

        if self.callback_url.trim().is_empty() {
            return Err(anyhow!("Callback URL cannot be empty"));
        }

        Ok(())
    }
}
