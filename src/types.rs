//! Invoice, session, and result types shared across gateway operations.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Invoice data for one purchase attempt.
///
/// Owned by the caller; the gateway client reads the details and writes the
/// transaction-id slot once a payment token has been issued.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    /// Amount in the merchant's configured currency unit.
    pub amount: Option<u64>,
    /// Unique transaction identifier sent to the provider.
    pub uuid: String,
    /// Payment token slot, written when `purchase` succeeds.
    pub transaction_id: Option<String>,
    /// Named details: payer phone number (`phone`, `cellphone`, or
    /// `mobile`), `discountAmount`, `externalSourceAmount`, `cartList`.
    pub details: Map<String, Value>,
}

impl Invoice {
    /// Creates an invoice with a freshly generated transaction uuid.
    pub fn new(amount: u64) -> Self {
        Self {
            amount: Some(amount),
            ..Self::default()
        }
    }

    /// Attaches a named detail, consuming and returning the invoice so
    /// details can be chained at construction.
    pub fn detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    pub fn get_detail(&self, key: &str) -> Option<&Value> {
        self.details.get(key)
    }
}

impl Default for Invoice {
    fn default() -> Self {
        Self {
            amount: None,
            uuid: Uuid::new_v4().to_string(),
            transaction_id: None,
            details: Map::new(),
        }
    }
}

/// Mutable state produced across gateway calls for one payment flow.
///
/// Both fields are unset until `purchase` succeeds and persist afterwards;
/// every post-purchase operation requires the payment token.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentSession {
    /// Opaque token identifying this purchase attempt at the provider.
    pub payment_token: Option<String>,
    /// Hosted payment page the payer must be redirected to.
    pub payment_url: Option<String>,
}

/// Redirect target handed to the host after a successful purchase.
///
/// The provider's hosted flow expects a plain GET with no extra parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedirectAction {
    pub url: String,
    pub method: String,
}

impl RedirectAction {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: "GET".to_string(),
        }
    }
}

/// Confirmation returned by a successful verification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Receipt {
    /// Provider confirmation/reference identifier.
    pub reference_id: String,
    /// Raw provider payload for auditing.
    pub provider_data: Option<Value>,
}

/// Current state of a payment as reported by the status operation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum PaymentStatus {
    /// Token issued, payer has not completed the hosted flow.
    InProgress,
    /// Payment verified by the merchant.
    Verified,
    /// Funds settled to the merchant.
    Settled,
    /// Settlement reverted.
    Reverted,
    /// Purchase cancelled before completion.
    Cancelled,
    /// Payment failed.
    Failed { reason: Option<String> },
    /// Status string not recognized.
    Unknown,
}

impl PaymentStatus {
    /// Maps the provider's status string onto the enum. Unrecognized
    /// strings collapse into `Unknown` rather than failing the call.
    pub(crate) fn from_provider(status: &str, reason: Option<String>) -> Self {
        match status {
            "IN_PROGRESS" => Self::InProgress,
            "VERIFY" | "VERIFIED" => Self::Verified,
            "SETTLE" | "SETTLED" => Self::Settled,
            "REVERT" | "REVERTED" => Self::Reverted,
            "CANCEL" | "CANCELED" | "CANCELLED" => Self::Cancelled,
            "FAILED" => Self::Failed { reason },
            _ => Self::Unknown,
        }
    }
}

/// Confirmation returned by a successful settlement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettleConfirmation {
    pub transaction_id: Option<String>,
    pub provider_data: Option<Value>,
}

/// Confirmation returned by a successful revert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevertConfirmation {
    pub transaction_id: Option<String>,
    pub provider_data: Option<Value>,
}

/// Confirmation returned by a successful cancellation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelConfirmation {
    pub transaction_id: Option<String>,
    pub provider_data: Option<Value>,
}

/// Confirmation returned by a successful order update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateConfirmation {
    pub transaction_id: Option<String>,
    pub provider_data: Option<Value>,
}
