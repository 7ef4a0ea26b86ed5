//! Client for the Qistpay installment payment gateway.
//!
//! Drives the provider's multi-step protocol: authenticate with a password
//! grant, check installment eligibility, create a payment token, redirect
//! the payer to the hosted page, verify the returning payer, and settle,
//! revert, cancel, update, or query the payment afterwards.
//!
//! Amounts are normalized into the provider's Rial minor unit on the way
//! out, so merchants can configure either `Rial` or `Toman` pricing.
//!
//! ```rust,no_run
//! use qistpay::{
//!     CurrencyUnit, GatewayConfig, InstallmentGateway, Invoice, PaymentSession, QistpayClient,
//! };
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = GatewayConfig::new(
//!     "https://api.qistpay.example",
//!     "client-id",
//!     "client-secret",
//!     "merchant",
//!     "secret",
//!     "https://shop.example/callback",
//!     CurrencyUnit::Toman,
//! )?;
//!
//! let client = QistpayClient::connect(config).await?;
//!
//! let mut invoice = Invoice::new(120_000).detail("phone", "09012345678");
//! let mut session = PaymentSession::default();
//!
//! client.purchase(&mut invoice, &mut session).await?;
//! let redirect = client.pay(&session)?;
//! // Hand `redirect.url` to the payer; once they return via the callback:
//! let receipt = client.verify(&session).await?;
//! println!("confirmed as {}", receipt.reference_id);
//! # Ok(())
//! # }
//! ```

mod auth;

pub mod client;
pub mod config;
pub mod error;
pub mod normalize;
pub mod traits;
pub mod types;

pub use client::QistpayClient;
pub use config::{CurrencyUnit, GatewayConfig};
pub use error::{GatewayError, GatewayResult};
pub use traits::InstallmentGateway;
pub use types::{
    CancelConfirmation, Invoice, PaymentSession, PaymentStatus, Receipt, RedirectAction,
    RevertConfirmation, SettleConfirmation, UpdateConfirmation,
};
