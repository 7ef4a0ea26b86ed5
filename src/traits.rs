//! Gateway interface definition.
//!
//! Defines the operations an installment gateway client exposes to a host
//! application, decoupled from any specific host framework.

use crate::error::GatewayResult;
use crate::types::{
    CancelConfirmation, Invoice, PaymentSession, PaymentStatus, Receipt, RedirectAction,
    RevertConfirmation, SettleConfirmation, UpdateConfirmation,
};
use async_trait::async_trait;
use serde_json::Value;

/// Interface for the installment payment flow.
///
/// The flow is: `purchase` to obtain a payment token and redirect URL,
/// `pay` to hand the payer off to the hosted page, `verify` once the payer
/// returns, then `settle`/`revert`/`status`/`cancel`/`update` against the
/// same token as the order progresses.
#[async_trait]
pub trait InstallmentGateway: Send + Sync {
    /// Create a payment token for the invoice.
    ///
    /// On success the token is stored on the invoice's transaction-id slot
    /// and on the session together with the redirect URL, and returned.
    ///
    /// # Arguments
    /// * `invoice` - Invoice carrying the amount and named details
    /// * `session` - Session the token and payment URL are written to
    async fn purchase(
        &self,
        invoice: &mut Invoice,
        session: &mut PaymentSession,
    ) -> GatewayResult<String>;

    /// Redirect target for handing the payer to the provider's hosted
    /// page. Requires a prior successful `purchase` on the session.
    fn pay(&self, session: &PaymentSession) -> GatewayResult<RedirectAction>;

    /// Exchange the session's payment token for a final confirmation.
    ///
    /// # Returns
    /// * `Receipt` - Carries the provider's reference identifier
    async fn verify(&self, session: &PaymentSession) -> GatewayResult<Receipt>;

    /// Ask the provider whether the invoice amount qualifies for
    /// installment payment. The decoded offer is returned verbatim.
    async fn eligible(&self, invoice: &Invoice) -> GatewayResult<Value>;

    /// Settle a verified payment.
    async fn settle(&self, session: &PaymentSession) -> GatewayResult<SettleConfirmation>;

    /// Revert a settled payment.
    async fn revert(&self, session: &PaymentSession) -> GatewayResult<RevertConfirmation>;

    /// Current provider-side state of the payment.
    async fn status(&self, session: &PaymentSession) -> GatewayResult<PaymentStatus>;

    /// Cancel a purchase before settlement.
    async fn cancel(&self, session: &PaymentSession) -> GatewayResult<CancelConfirmation>;

    /// Update the order behind an issued payment token with the invoice's
    /// current amount and cart.
    async fn update(
        &self,
        invoice: &Invoice,
        session: &PaymentSession,
    ) -> GatewayResult<UpdateConfirmation>;
}
