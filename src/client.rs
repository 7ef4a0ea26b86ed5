//! Qistpay gateway client.
//!
//! Issues each protocol operation with the bearer token acquired at
//! construction and classifies provider responses into typed failures.
//! Responses are never trusted to be well formed: HTTP status and the
//! `successful` flag are inspected explicitly so provider error messages
//! survive to the caller.

use crate::auth;
use crate::config::GatewayConfig;
use crate::error::{GatewayError, GatewayResult};
use crate::normalize::{normalize_amount, normalize_cart_list, resolve_phone};
use crate::traits::InstallmentGateway;
use crate::types::{
    CancelConfirmation, Invoice, PaymentSession, PaymentStatus, Receipt, RedirectAction,
    RevertConfirmation, SettleConfirmation, UpdateConfirmation,
};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, error, info};

// Purchase and verification share the token path; the provider tells the
// operations apart by the request body.
const PAYMENT_TOKEN_PATH: &str = "/api/v1/payment/token";
const ELIGIBLE_PATH: &str = "/api/v1/offer/eligible";
const SETTLE_PATH: &str = "/api/v1/payment/settle";
const REVERT_PATH: &str = "/api/v1/payment/revert";
const STATUS_PATH: &str = "/api/v1/payment/status";
const CANCEL_PATH: &str = "/api/v1/payment/cancel";
const UPDATE_PATH: &str = "/api/v1/payment/update";

/// Installment purchases are the only method this provider offers.
const PAYMENT_METHOD: &str = "INSTALLMENT";

const PURCHASE_FAILED_MESSAGE: &str = "خرید از درگاه پرداخت ناموفق بود";
const PAYMENT_FAILED_MESSAGE: &str = "پرداخت مورد تایید درگاه نیست";
const AMOUNT_REQUIRED_MESSAGE: &str = "amount is required";
const NOT_PURCHASED_MESSAGE: &str = "ابتدا باید توکن پرداخت ایجاد شود";

/// Provider response envelope shared by every JSON operation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Envelope {
    successful: Option<bool>,
    response: Option<Value>,
    error_data: Option<ErrorData>,
}

#[derive(Debug, Deserialize)]
struct ErrorData {
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PaymentTokenResponse {
    payment_token: String,
    payment_page_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VerifyResponse {
    transaction_id: String,
}

/// Which failure kind a rejected envelope maps to.
#[derive(Debug, Clone, Copy)]
enum FailureKind {
    Purchase,
    Payment,
}

impl FailureKind {
    fn default_message(self) -> &'static str {
        match self {
            FailureKind::Purchase => PURCHASE_FAILED_MESSAGE,
            FailureKind::Payment => PAYMENT_FAILED_MESSAGE,
        }
    }

    fn error(self, message: String, status: StatusCode) -> GatewayError {
        match self {
            FailureKind::Purchase => GatewayError::purchase_failed(message),
            FailureKind::Payment => GatewayError::invalid_payment(message, Some(status.as_u16())),
        }
    }
}

/// Applies the shared success rule to a raw response: the call succeeded
/// only when the HTTP status is 200 and `successful` is not explicitly
/// `false`. A rejected call surfaces `errorData.message` when the provider
/// sent one, else the default for the failure kind.
fn classify(kind: FailureKind, status: StatusCode, body: &str) -> GatewayResult<Value> {
    let envelope: Envelope = serde_json::from_str(body)?;

    if status != StatusCode::OK || envelope.successful == Some(false) {
        let message = envelope
            .error_data
            .and_then(|data| data.message)
            .unwrap_or_else(|| kind.default_message().to_string());
        return Err(kind.error(message, status));
    }

    envelope
        .response
        .ok_or_else(|| GatewayError::invalid_response("missing `response` payload"))
}

fn reference_of(response: &Value) -> Option<String> {
    response
        .get("transactionId")
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Client for the Qistpay installment payment gateway.
///
/// Construction authenticates once; the resulting bearer token is held for
/// the client's lifetime and shared by every operation. Use
/// [`QistpayClient::reauthenticate`] for long-lived clients whose token has
/// been invalidated provider-side.
#[derive(Debug)]
pub struct QistpayClient {
    config: GatewayConfig,
    http: Client,
    token: String,
}

impl QistpayClient {
    /// Authenticates against the provider and returns a ready client.
    pub async fn connect(config: GatewayConfig) -> GatewayResult<Self> {
        Self::connect_with(Client::new(), config).await
    }

    /// Like [`QistpayClient::connect`], with a caller-supplied transport.
    pub async fn connect_with(http: Client, config: GatewayConfig) -> GatewayResult<Self> {
        let token = auth::authenticate(&http, &config).await?;
        info!("Gateway client authenticated");

        Ok(Self {
            config,
            http,
            token,
        })
    }

    /// Replaces the cached bearer token with a freshly acquired one.
    /// Explicit: the client never refreshes behind the caller's back.
    pub async fn reauthenticate(&mut self) -> GatewayResult<()> {
        self.token = auth::authenticate(&self.http, &self.config).await?;
        info!("Gateway client re-authenticated");
        Ok(())
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// POSTs a JSON body with bearer authorization and classifies the
    /// response. Non-2xx statuses do not raise at the transport; the body
    /// is decoded either way so provider messages are not lost.
    async fn post_classified(
        &self,
        path: &str,
        body: &Value,
        kind: FailureKind,
    ) -> GatewayResult<Value> {
        let response = self
            .http
            .post(self.endpoint(path))
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        debug!("Gateway replied to {} with HTTP {}", path, status);

        classify(kind, status, &text).map_err(|err| {
            error!("Gateway rejected {}: {}", path, err);
            err
        })
    }

    /// Builds the purchase request body from the invoice and configuration.
    fn purchase_payload(&self, invoice: &Invoice) -> GatewayResult<Value> {
        let amount = invoice
            .amount
            .ok_or_else(|| GatewayError::purchase_failed(AMOUNT_REQUIRED_MESSAGE))?;
        let unit = self.config.currency_unit;

        let mut payload = json!({
            "amount": normalize_amount(amount, unit),
            "paymentMethodTypeDto": PAYMENT_METHOD,
            "transactionId": invoice.uuid,
            "returnURL": self.config.callback_url,
        });

        if let Some(phone) = resolve_phone(&invoice.details) {
            payload["mobile"] = Value::String(phone);
        }

        if let Some(discount) = invoice.get_detail("discountAmount").and_then(Value::as_u64) {
            payload["discountAmount"] = Value::from(normalize_amount(discount, unit));
        }

        // Not covered by the minor-unit rule.
        if let Some(external) = invoice.get_detail("externalSourceAmount") {
            payload["externalSourceAmount"] = external.clone();
        }

        if let Some(cart) = invoice.get_detail("cartList") {
            payload["cartList"] = normalize_cart_list(cart, unit);
        }

        Ok(payload)
    }

    /// Body shared by the token-keyed lifecycle operations.
    fn token_payload(&self, session: &PaymentSession) -> GatewayResult<Value> {
        let token = session
            .payment_token
            .as_deref()
            .ok_or_else(|| GatewayError::purchase_failed(NOT_PURCHASED_MESSAGE))?;
        Ok(json!({ "paymentToken": token }))
    }
}

#[async_trait]
impl InstallmentGateway for QistpayClient {
    async fn purchase(
        &self,
        invoice: &mut Invoice,
        session: &mut PaymentSession,
    ) -> GatewayResult<String> {
        let payload = self.purchase_payload(invoice)?;

        info!("Creating payment token for transaction {}", invoice.uuid);
        let response = self
            .post_classified(PAYMENT_TOKEN_PATH, &payload, FailureKind::Purchase)
            .await?;

        let token: PaymentTokenResponse = serde_json::from_value(response)?;
        invoice.transaction_id = Some(token.payment_token.clone());
        session.payment_token = Some(token.payment_token.clone());
        session.payment_url = Some(token.payment_page_url);

        info!("Payment token issued for transaction {}", invoice.uuid);
        Ok(token.payment_token)
    }

    fn pay(&self, session: &PaymentSession) -> GatewayResult<RedirectAction> {
        let url = session
            .payment_url
            .clone()
            .ok_or_else(|| GatewayError::purchase_failed(NOT_PURCHASED_MESSAGE))?;
        Ok(RedirectAction::get(url))
    }

    async fn verify(&self, session: &PaymentSession) -> GatewayResult<Receipt> {
        let payload = self.token_payload(session)?;

        let response = self
            .post_classified(PAYMENT_TOKEN_PATH, &payload, FailureKind::Payment)
            .await?;

        let confirmation: VerifyResponse = serde_json::from_value(response.clone())?;
        info!("Payment verified: reference={}", confirmation.transaction_id);

        Ok(Receipt {
            reference_id: confirmation.transaction_id,
            provider_data: Some(response),
        })
    }

    async fn eligible(&self, invoice: &Invoice) -> GatewayResult<Value> {
        let amount = invoice
            .amount
            .ok_or_else(|| GatewayError::purchase_failed(AMOUNT_REQUIRED_MESSAGE))?;
        let amount = normalize_amount(amount, self.config.currency_unit);

        debug!("Checking installment eligibility for amount {}", amount);
        let response = self
            .http
            .get(self.endpoint(ELIGIBLE_PATH))
            .bearer_auth(&self.token)
            .query(&[("amount", amount)])
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            error!("Eligibility check rejected with HTTP {}", status);
            return Err(GatewayError::invalid_payment(
                format!("{} (HTTP {})", PAYMENT_FAILED_MESSAGE, status.as_u16()),
                Some(status.as_u16()),
            ));
        }

        let text = response.text().await?;
        let offer: Value = serde_json::from_str(&text)?;
        Ok(offer)
    }

    async fn settle(&self, session: &PaymentSession) -> GatewayResult<SettleConfirmation> {
        let payload = self.token_payload(session)?;
        let response = self
            .post_classified(SETTLE_PATH, &payload, FailureKind::Payment)
            .await?;

        info!("Payment settled");
        Ok(SettleConfirmation {
            transaction_id: reference_of(&response),
            provider_data: Some(response),
        })
    }

    async fn revert(&self, session: &PaymentSession) -> GatewayResult<RevertConfirmation> {
        let payload = self.token_payload(session)?;
        let response = self
            .post_classified(REVERT_PATH, &payload, FailureKind::Payment)
            .await?;

        info!("Payment reverted");
        Ok(RevertConfirmation {
            transaction_id: reference_of(&response),
            provider_data: Some(response),
        })
    }

    async fn status(&self, session: &PaymentSession) -> GatewayResult<PaymentStatus> {
        let payload = self.token_payload(session)?;
        let response = self
            .post_classified(STATUS_PATH, &payload, FailureKind::Payment)
            .await?;

        let raw = response
            .get("transactionStatus")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let reason = response
            .get("failureReason")
            .and_then(Value::as_str)
            .map(str::to_string);

        Ok(PaymentStatus::from_provider(raw, reason))
    }

    async fn cancel(&self, session: &PaymentSession) -> GatewayResult<CancelConfirmation> {
        let payload = self.token_payload(session)?;
        let response = self
            .post_classified(CANCEL_PATH, &payload, FailureKind::Payment)
            .await?;

        info!("Payment cancelled");
        Ok(CancelConfirmation {
            transaction_id: reference_of(&response),
            provider_data: Some(response),
        })
    }

    async fn update(
        &self,
        invoice: &Invoice,
        session: &PaymentSession,
    ) -> GatewayResult<UpdateConfirmation> {
        let mut payload = self.token_payload(session)?;
        let amount = invoice
            .amount
            .ok_or_else(|| GatewayError::purchase_failed(AMOUNT_REQUIRED_MESSAGE))?;
        let unit = self.config.currency_unit;

        payload["amount"] = Value::from(normalize_amount(amount, unit));
        if let Some(cart) = invoice.get_detail("cartList") {
            payload["cartList"] = normalize_cart_list(cart, unit);
        }

        let response = self
            .post_classified(UPDATE_PATH, &payload, FailureKind::Payment)
            .await?;

        info!("Order updated for transaction {}", invoice.uuid);
        Ok(UpdateConfirmation {
            transaction_id: reference_of(&response),
            provider_data: Some(response),
        })
    }
}
