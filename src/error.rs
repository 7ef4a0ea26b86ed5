use thiserror::Error;

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Failure kinds surfaced by the gateway client.
///
/// Remote failures are detected by explicit inspection of the HTTP status
/// and the `successful` flag of the decoded body, so the provider's own
/// error messages can be carried verbatim to the caller. Nothing here is
/// retried internally.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The OAuth credential exchange was rejected by the provider.
    #[error("{message}")]
    AuthenticationFailed { message: String },

    /// The purchase request was rejected, a required field was missing
    /// before the request could be built, or the provider was unreachable.
    #[error("{message}")]
    PurchaseFailed { message: String },

    /// Verification, eligibility, or a lifecycle operation was rejected.
    #[error("{message}")]
    InvalidPayment {
        message: String,
        status: Option<u16>,
    },

    /// The provider returned a body that could not be decoded, or one that
    /// claims success while missing the expected payload.
    #[error("Malformed gateway response: {message}")]
    InvalidResponse { message: String },
}

impl GatewayError {
    pub fn authentication_failed(message: impl Into<String>) -> Self {
        Self::AuthenticationFailed {
            message: message.into(),
        }
    }

    pub fn purchase_failed(message: impl Into<String>) -> Self {
        Self::PurchaseFailed {
            message: message.into(),
        }
    }

    pub fn invalid_payment(message: impl Into<String>, status: Option<u16>) -> Self {
        Self::InvalidPayment {
            message: message.into(),
            status,
        }
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }

    /// HTTP status attached to the failure, where one was available.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::InvalidPayment { status, .. } => *status,
            _ => None,
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        // A response that arrived is always classified explicitly; only
        // transport-level unreachability lands here.
        Self::PurchaseFailed {
            message: format!("درگاه پرداخت در دسترس نیست: {}", err),
        }
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidResponse {
            message: err.to_string(),
        }
    }
}
