use crate::domain::card::{self, CardNetwork};
use crate::domain::gateway::{
    DeclineCode, PaymentOutcome, PaymentRequest, RefundReceipt, VerificationReport,
};
use crate::domain::ports::{IdSourceArc, PaymentGateway};
use crate::error::Result;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashSet;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Reserved test numbers and the outcomes they force.
pub const TEST_CARD_VISA_APPROVED: &str = "4242424242424242";
pub const TEST_CARD_MASTERCARD_APPROVED: &str = "5555555555554444";
pub const TEST_CARD_DECLINED: &str = "4000000000000002";
pub const TEST_CARD_INSUFFICIENT_FUNDS: &str = "4000000000009995";
/// Listed for expired-card test flows; the caller-supplied expiry governs,
/// so a valid expiry on this number still approves.
pub const TEST_CARD_EXPIRED: &str = "4000000000000069";

/// Deterministic stand-in for an external card processor.
///
/// Validation failures return immediately; everything past validation sits
/// behind an artificial latency suspension that never blocks other in-flight
/// payments. Every issued transaction id is remembered for
/// [`PaymentGateway::verify_transaction`].
pub struct SimulatedGateway {
    ids: IdSourceArc,
    latency: Duration,
    issued: RwLock<HashSet<String>>,
}

impl SimulatedGateway {
    pub const DEFAULT_LATENCY: Duration = Duration::from_millis(2000);

    pub fn new(ids: IdSourceArc) -> Self {
        Self {
            ids,
            latency: Self::DEFAULT_LATENCY,
            issued: RwLock::new(HashSet::new()),
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    fn failure_outcome(
        request: &PaymentRequest,
        network: CardNetwork,
        last4: String,
        code: DeclineCode,
        message: &str,
    ) -> PaymentOutcome {
        PaymentOutcome {
            success: false,
            transaction_id: None,
            authorization_code: None,
            network,
            last4,
            amount: request.amount,
            currency: request.currency.clone(),
            message: message.to_string(),
            error_code: Some(code),
            timestamp: Utc::now(),
            metadata: request.metadata.clone(),
        }
    }

    /// Settlement phase, after local validation has passed. Fallible so an
    /// internal failure can be mapped to `PROCESSING_ERROR` by the caller.
    async fn settle(
        &self,
        request: &PaymentRequest,
        digits: &str,
        network: CardNetwork,
        last4: &str,
    ) -> Result<PaymentOutcome> {
        tokio::time::sleep(self.latency).await;

        if digits == TEST_CARD_DECLINED || digits == TEST_CARD_INSUFFICIENT_FUNDS {
            let (code, message) = if digits == TEST_CARD_INSUFFICIENT_FUNDS {
                (DeclineCode::InsufficientFunds, "Insufficient funds")
            } else {
                (DeclineCode::CardDeclined, "Card declined by issuer")
            };

            let transaction_id = self.ids.transaction_id()?;
            self.issued.write().await.insert(transaction_id.clone());
            warn!(%transaction_id, %network, %last4, ?code, "card payment declined");

            return Ok(PaymentOutcome {
                success: false,
                transaction_id: Some(transaction_id),
                authorization_code: None,
                network,
                last4: last4.to_string(),
                amount: request.amount,
                currency: request.currency.clone(),
                message: message.to_string(),
                error_code: Some(code),
                timestamp: Utc::now(),
                metadata: request.metadata.clone(),
            });
        }

        let transaction_id = self.ids.transaction_id()?;
        let authorization_code = self.ids.authorization_code()?;
        self.issued.write().await.insert(transaction_id.clone());
        info!(%transaction_id, %network, %last4, amount = request.amount, "card payment approved");

        Ok(PaymentOutcome {
            success: true,
            transaction_id: Some(transaction_id),
            authorization_code: Some(authorization_code),
            network,
            last4: last4.to_string(),
            amount: request.amount,
            currency: request.currency.clone(),
            message: "Payment approved".to_string(),
            error_code: None,
            timestamp: Utc::now(),
            metadata: request.metadata.clone(),
        })
    }
}

#[async_trait]
impl PaymentGateway for SimulatedGateway {
    async fn process_card_payment(&self, request: PaymentRequest) -> PaymentOutcome {
        let digits = card::strip(&request.card.number);
        let network = card::detect_network(&digits);
        let last4 = card::last4(&digits);

        // Local validation fails fast, before the latency suspension.
        if !card::validate_number(&digits) {
            return Self::failure_outcome(
                &request,
                network,
                last4,
                DeclineCode::InvalidCardNumber,
                "Invalid card number",
            );
        }
        if !card::validate_expiry(request.card.expiry_month, request.card.expiry_year) {
            return Self::failure_outcome(
                &request,
                network,
                last4,
                DeclineCode::ExpiredCard,
                "Card has expired or invalid expiry date",
            );
        }
        if !card::validate_cvv(&request.card.cvv, network) {
            return Self::failure_outcome(
                &request,
                network,
                last4,
                DeclineCode::InvalidCvv,
                "Invalid CVV",
            );
        }

        match self.settle(&request, &digits, network, &last4).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(error = %e, "simulated settlement failed");
                Self::failure_outcome(
                    &request,
                    network,
                    last4,
                    DeclineCode::ProcessingError,
                    "Payment could not be processed",
                )
            }
        }
    }

    async fn verify_transaction(&self, transaction_id: &str) -> VerificationReport {
        // No pending state exists to reconcile: anything this simulator
        // issued is reported approved.
        let verified = self.issued.read().await.contains(transaction_id);
        VerificationReport {
            transaction_id: transaction_id.to_string(),
            status: "approved".to_string(),
            verified,
        }
    }

    async fn refund_transaction(
        &self,
        transaction_id: &str,
        amount: Option<u64>,
    ) -> Result<RefundReceipt> {
        tokio::time::sleep(self.latency).await;

        let refund_id = self.ids.refund_id()?;
        info!(%refund_id, transaction_id, ?amount, "refund issued");

        Ok(RefundReceipt {
            refund_id,
            transaction_id: transaction_id.to_string(),
            amount,
            status: "refunded".to_string(),
            timestamp: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::card::CardDetails;
    use crate::error::PaymentError;
    use crate::infrastructure::ids::SequenceIdSource;
    use std::sync::Arc;
    use std::time::Instant;

    fn gateway() -> SimulatedGateway {
        SimulatedGateway::new(Arc::new(SequenceIdSource::new()))
            .with_latency(Duration::ZERO)
    }

    fn card(number: &str) -> CardDetails {
        CardDetails {
            number: number.to_string(),
            holder: "Jane Doe".to_string(),
            expiry_month: 12,
            expiry_year: 2099,
            cvv: "123".to_string(),
        }
    }

    fn request(number: &str) -> PaymentRequest {
        PaymentRequest::new(card(number), 50_000, "Consultation")
    }

    #[tokio::test]
    async fn test_approved_visa() {
        let gateway = gateway();
        let outcome = gateway.process_card_payment(request(TEST_CARD_VISA_APPROVED)).await;

        assert!(outcome.success);
        assert_eq!(outcome.network, CardNetwork::Visa);
        assert_eq!(outcome.last4, "4242");
        assert_eq!(outcome.amount, 50_000);
        assert_eq!(outcome.currency, "UGX");
        assert!(outcome.error_code.is_none());
        assert_eq!(outcome.transaction_id.as_deref(), Some("TXN-000001"));
        assert!(outcome.authorization_code.is_some());
    }

    #[tokio::test]
    async fn test_approved_mastercard() {
        let outcome = gateway()
            .process_card_payment(request(TEST_CARD_MASTERCARD_APPROVED))
            .await;
        assert!(outcome.success);
        assert_eq!(outcome.network, CardNetwork::Mastercard);
        assert_eq!(outcome.last4, "4444");
    }

    #[tokio::test]
    async fn test_declined_card_still_gets_transaction_id() {
        let outcome = gateway().process_card_payment(request(TEST_CARD_DECLINED)).await;

        assert!(!outcome.success);
        assert_eq!(outcome.error_code, Some(DeclineCode::CardDeclined));
        assert!(outcome.message.contains("declined"));
        assert!(outcome.transaction_id.is_some());
        assert!(outcome.authorization_code.is_none());
        assert_eq!(outcome.network, CardNetwork::Visa);
        assert_eq!(outcome.last4, "0002");
    }

    #[tokio::test]
    async fn test_insufficient_funds_card() {
        let outcome = gateway()
            .process_card_payment(request(TEST_CARD_INSUFFICIENT_FUNDS))
            .await;

        assert!(!outcome.success);
        assert_eq!(outcome.error_code, Some(DeclineCode::InsufficientFunds));
        assert!(outcome.transaction_id.is_some());
        assert_eq!(outcome.last4, "9995");
    }

    #[tokio::test]
    async fn test_expired_test_number_with_valid_expiry_approves() {
        // The caller-supplied expiry governs; the number itself forces nothing.
        let outcome = gateway().process_card_payment(request(TEST_CARD_EXPIRED)).await;
        assert!(outcome.success);
    }

    #[tokio::test]
    async fn test_invalid_number_fails_before_latency() {
        // Deliberately long latency: a fast failure proves validation runs first.
        let gateway = SimulatedGateway::new(Arc::new(SequenceIdSource::new()))
            .with_latency(Duration::from_secs(30));

        let started = Instant::now();
        let outcome = gateway.process_card_payment(request("1234")).await;

        assert!(started.elapsed() < Duration::from_secs(1));
        assert!(!outcome.success);
        assert_eq!(outcome.error_code, Some(DeclineCode::InvalidCardNumber));
        assert!(outcome.transaction_id.is_none());
    }

    #[tokio::test]
    async fn test_expired_card_rejected() {
        let mut details = card(TEST_CARD_VISA_APPROVED);
        details.expiry_year = 2020;
        let outcome = gateway()
            .process_card_payment(PaymentRequest::new(details, 1_000, "old card"))
            .await;

        assert!(!outcome.success);
        assert_eq!(outcome.error_code, Some(DeclineCode::ExpiredCard));
        assert!(outcome.transaction_id.is_none());
    }

    #[tokio::test]
    async fn test_cvv_checked_against_network() {
        // 3-digit CVV on an Amex number is rejected.
        let mut details = card("378282246310005");
        details.cvv = "123".to_string();
        let outcome = gateway()
            .process_card_payment(PaymentRequest::new(details, 1_000, "amex"))
            .await;
        assert!(!outcome.success);
        assert_eq!(outcome.error_code, Some(DeclineCode::InvalidCvv));

        // 4-digit CVV passes.
        let mut details = card("378282246310005");
        details.cvv = "1234".to_string();
        let outcome = gateway()
            .process_card_payment(PaymentRequest::new(details, 1_000, "amex"))
            .await;
        assert!(outcome.success);
    }

    #[tokio::test]
    async fn test_verify_known_and_unknown_ids() {
        let gateway = gateway();
        let outcome = gateway.process_card_payment(request(TEST_CARD_VISA_APPROVED)).await;
        let id = outcome.transaction_id.unwrap();

        let report = gateway.verify_transaction(&id).await;
        assert!(report.verified);
        assert_eq!(report.status, "approved");
        // Idempotent.
        assert_eq!(gateway.verify_transaction(&id).await, report);

        let unknown = gateway.verify_transaction("TXN-NOPE").await;
        assert!(!unknown.verified);
    }

    #[tokio::test]
    async fn test_refund_always_succeeds() {
        let gateway = gateway();
        let receipt = gateway.refund_transaction("TXN-000001", Some(10_000)).await.unwrap();

        assert!(receipt.refund_id.starts_with("REF-"));
        assert_eq!(receipt.transaction_id, "TXN-000001");
        assert_eq!(receipt.amount, Some(10_000));
        assert_eq!(receipt.status, "refunded");

        let full = gateway.refund_transaction("TXN-000001", None).await.unwrap();
        assert_eq!(full.amount, None);
        assert_ne!(full.refund_id, receipt.refund_id);
    }

    struct FailingIdSource;

    impl crate::domain::ports::IdSource for FailingIdSource {
        fn transaction_id(&self) -> crate::error::Result<String> {
            Err(PaymentError::IdGeneration("id backend offline".to_string()))
        }
        fn refund_id(&self) -> crate::error::Result<String> {
            Err(PaymentError::IdGeneration("id backend offline".to_string()))
        }
        fn authorization_code(&self) -> crate::error::Result<String> {
            Err(PaymentError::IdGeneration("id backend offline".to_string()))
        }
    }

    #[tokio::test]
    async fn test_internal_failure_maps_to_processing_error() {
        let gateway =
            SimulatedGateway::new(Arc::new(FailingIdSource)).with_latency(Duration::ZERO);
        let outcome = gateway.process_card_payment(request(TEST_CARD_VISA_APPROVED)).await;

        assert!(!outcome.success);
        assert_eq!(outcome.error_code, Some(DeclineCode::ProcessingError));
        assert!(outcome.transaction_id.is_none());
    }

    #[tokio::test]
    async fn test_payments_in_flight_do_not_block_each_other() {
        let gateway = Arc::new(
            SimulatedGateway::new(Arc::new(SequenceIdSource::new()))
                .with_latency(Duration::from_millis(50)),
        );

        let started = Instant::now();
        let mut handles = Vec::new();
        for _ in 0..10 {
            let gateway = Arc::clone(&gateway);
            handles.push(tokio::spawn(async move {
                gateway.process_card_payment(request(TEST_CARD_VISA_APPROVED)).await
            }));
        }
        for handle in handles {
            assert!(handle.await.unwrap().success);
        }

        // Ten payments with 50ms latency each, run concurrently, finish in
        // far less than 500ms of serial time.
        assert!(started.elapsed() < Duration::from_millis(400));
    }
}
