use super::gateway::{PaymentOutcome, PaymentRequest, RefundReceipt, VerificationReport};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Port for an external card payment processor.
///
/// Callers depend only on this trait; `SimulatedGateway` is the one
/// implementation today, with room for a real processor behind the same
/// surface.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Runs validation and settlement for one card payment. Always resolves
    /// to a terminal [`PaymentOutcome`]; declines are data, not errors.
    async fn process_card_payment(&self, request: PaymentRequest) -> PaymentOutcome;

    /// Idempotent status lookup for a previously issued transaction id.
    async fn verify_transaction(&self, transaction_id: &str) -> VerificationReport;

    /// Issues a refund receipt. `amount = None` means a full refund.
    async fn refund_transaction(
        &self,
        transaction_id: &str,
        amount: Option<u64>,
    ) -> Result<RefundReceipt>;
}

/// Source of transaction/refund ids and authorization codes.
///
/// Injectable so tests can pin deterministic ids; the system implementation
/// uses timestamp + random suffix, unique per process lifetime.
pub trait IdSource: Send + Sync {
    fn transaction_id(&self) -> Result<String>;
    fn refund_id(&self) -> Result<String>;
    fn authorization_code(&self) -> Result<String>;
}

pub type PaymentGatewayBox = Box<dyn PaymentGateway>;
pub type IdSourceArc = Arc<dyn IdSource>;
