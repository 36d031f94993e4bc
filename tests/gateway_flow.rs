use medipay::application::gateway::{
    SimulatedGateway, TEST_CARD_DECLINED, TEST_CARD_VISA_APPROVED,
};
use medipay::domain::card::CardDetails;
use medipay::domain::gateway::{DeclineCode, PaymentRequest};
use medipay::domain::ports::{PaymentGateway, PaymentGatewayBox};
use medipay::infrastructure::ids::SequenceIdSource;
use std::sync::Arc;
use std::time::Duration;

fn request(number: &str) -> PaymentRequest {
    PaymentRequest::new(
        CardDetails {
            number: number.to_string(),
            holder: "Jane Doe".to_string(),
            expiry_month: 12,
            expiry_year: 2099,
            cvv: "123".to_string(),
        },
        75_000,
        "Pharmacy",
    )
}

fn boxed_gateway() -> PaymentGatewayBox {
    Box::new(
        SimulatedGateway::new(Arc::new(SequenceIdSource::new())).with_latency(Duration::ZERO),
    )
}

#[tokio::test]
async fn test_gateway_behind_trait_object() {
    // Callers hold the port, not the simulator; verify Send + Sync by
    // driving it from a spawned task.
    let gateway = boxed_gateway();

    let handle = tokio::spawn(async move {
        let outcome = gateway.process_card_payment(request(TEST_CARD_VISA_APPROVED)).await;
        let id = outcome.transaction_id.clone().unwrap();
        let report = gateway.verify_transaction(&id).await;
        (outcome, report)
    });

    let (outcome, report) = handle.await.unwrap();
    assert!(outcome.success);
    assert!(report.verified);
    assert_eq!(report.status, "approved");
}

#[tokio::test]
async fn test_decline_then_refund_flow() {
    let gateway = boxed_gateway();

    let declined = gateway.process_card_payment(request(TEST_CARD_DECLINED)).await;
    assert!(!declined.success);
    assert_eq!(declined.error_code, Some(DeclineCode::CardDeclined));
    let id = declined.transaction_id.unwrap();

    // Refunds succeed regardless; reconciliation is the caller's concern.
    let receipt = gateway.refund_transaction(&id, None).await.unwrap();
    assert_eq!(receipt.transaction_id, id);
    assert_eq!(receipt.status, "refunded");
}

#[tokio::test]
async fn test_metadata_echoed_on_approval() {
    let gateway = boxed_gateway();

    let mut metadata = serde_json::Map::new();
    metadata.insert("bill_id".to_string(), serde_json::json!("BILL-42"));
    let outcome = gateway
        .process_card_payment(request(TEST_CARD_VISA_APPROVED).with_metadata(metadata.clone()))
        .await;

    assert!(outcome.success);
    assert_eq!(outcome.metadata, metadata);
    assert_eq!(outcome.amount, 75_000);
    assert_eq!(outcome.currency, "UGX");
}
