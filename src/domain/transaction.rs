use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Credit,
    Debit,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Credit => write!(f, "credit"),
            Self::Debit => write!(f, "debit"),
        }
    }
}

/// One append-only row of a subject's wallet history.
///
/// Created exactly once per successful credit or debit and never mutated or
/// deleted afterwards. Serializes to a plain record so any key-value or
/// document store can hold it.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct LedgerTransaction {
    pub id: String,
    pub subject: String,
    pub kind: EntryKind,
    pub amount: u64,
    pub method: String,
    pub reference: String,
    pub description: String,
    pub timestamp: DateTime<Utc>,
    /// Subject balance immediately after this row was applied.
    pub balance_after: u64,
}

/// Result of a wallet settlement attempt, shaped for the billing caller.
#[derive(Debug, Clone, PartialEq)]
pub struct WalletPayment {
    pub success: bool,
    pub transaction: Option<LedgerTransaction>,
    pub message: String,
}

/// Aggregate view over the whole ledger.
///
/// `total_balance` always equals `total_credits - total_debits`; the ledger
/// tests hold that as a global invariant. Totals are `u128` because they sum
/// over every subject and can legitimately exceed any single `u64` balance.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
pub struct LedgerStats {
    pub subjects: usize,
    pub total_balance: u128,
    pub transactions: usize,
    pub total_credits: u128,
    pub total_debits: u128,
}

/// Lossless serialized shape of the ledger: balances plus the full log.
///
/// Restoring verifies that every balance matches the sum of its subject's
/// credits minus debits, so a corrupt snapshot is rejected instead of
/// silently re-seeding a broken ledger.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Default)]
pub struct LedgerSnapshot {
    pub balances: HashMap<String, u64>,
    pub transactions: Vec<LedgerTransaction>,
}
