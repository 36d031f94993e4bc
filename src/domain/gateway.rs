use crate::domain::card::{CardDetails, CardNetwork};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single card settlement request.
///
/// Card details live only for the duration of the call; the outcome echoes
/// amount, currency and metadata but never the card number.
#[derive(Debug, Clone)]
pub struct PaymentRequest {
    pub card: CardDetails,
    pub amount: u64,
    pub currency: String,
    pub description: String,
    pub metadata: Map<String, Value>,
}

impl PaymentRequest {
    pub fn new(card: CardDetails, amount: u64, description: impl Into<String>) -> Self {
        Self {
            card,
            amount,
            currency: "UGX".to_string(),
            description: description.into(),
            metadata: Map::new(),
        }
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    pub fn with_metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Why a settlement attempt did not approve.
///
/// The first three are local validation failures (the user can re-enter the
/// card), the next two are issuer-reported, and `ProcessingError` covers any
/// internal failure after validation passed.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeclineCode {
    InvalidCardNumber,
    ExpiredCard,
    InvalidCvv,
    CardDeclined,
    InsufficientFunds,
    ProcessingError,
}

/// Terminal outcome of a settlement attempt. Immutable once returned; the
/// caller decides whether and where to persist it.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct PaymentOutcome {
    pub success: bool,
    /// Absent for local validation failures; present for issuer declines and
    /// approvals alike.
    pub transaction_id: Option<String>,
    pub authorization_code: Option<String>,
    pub network: CardNetwork,
    pub last4: String,
    pub amount: u64,
    pub currency: String,
    pub message: String,
    pub error_code: Option<DeclineCode>,
    pub timestamp: DateTime<Utc>,
    pub metadata: Map<String, Value>,
}

/// Status lookup for a previously issued transaction id.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct VerificationReport {
    pub transaction_id: String,
    pub status: String,
    /// Whether this simulator actually issued the id.
    pub verified: bool,
}

/// Receipt for a refund request. The original transaction and any wallet
/// balance are untouched; reflecting the refund is the caller's job.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct RefundReceipt {
    pub refund_id: String,
    pub transaction_id: String,
    /// `None` means a full refund.
    pub amount: Option<u64>,
    pub status: String,
    pub timestamp: DateTime<Utc>,
}
