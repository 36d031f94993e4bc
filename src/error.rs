use thiserror::Error;

pub type Result<T, E = PaymentError> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum PaymentError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Non-positive amount handed to a ledger operation. A caller bug,
    /// not a settlement outcome.
    #[error("amount must be a positive integer")]
    InvalidAmount,
    #[error("insufficient wallet balance: available {available}, required {required}")]
    InsufficientFunds { available: u64, required: u64 },
    #[error("wallet balance overflow for subject {subject}")]
    BalanceOverflow { subject: String },
    #[error("id generation failed: {0}")]
    IdGeneration(String),
    #[error("ledger snapshot is inconsistent: {0}")]
    CorruptSnapshot(String),
}
