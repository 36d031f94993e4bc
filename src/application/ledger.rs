use crate::domain::money::{Amount, Balance};
use crate::domain::ports::IdSourceArc;
use crate::domain::transaction::{
    EntryKind, LedgerSnapshot, LedgerStats, LedgerTransaction, WalletPayment,
};
use crate::error::{PaymentError, Result};
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Method string recorded on debit rows.
const WALLET_METHOD: &str = "Wallet";
/// Description recorded on credit (top-up) rows.
const TOPUP_DESCRIPTION: &str = "Wallet Top-up";

#[derive(Default)]
struct LedgerState {
    balances: HashMap<String, Balance>,
    log: Vec<LedgerTransaction>,
}

impl LedgerState {
    fn balance(&self, subject: &str) -> Balance {
        self.balances.get(subject).copied().unwrap_or(Balance::ZERO)
    }
}

/// Per-subject wallet balances plus the append-only transaction log.
///
/// Both live in one state value behind one `RwLock`: a write guard is held
/// across the read-balance / write-balance / append-log sequence, so two
/// racing debits against the same subject cannot interleave and drive a
/// balance negative, and no caller can observe a balance without its log row.
pub struct WalletLedger {
    state: RwLock<LedgerState>,
    ids: IdSourceArc,
}

impl WalletLedger {
    pub fn new(ids: IdSourceArc) -> Self {
        Self {
            state: RwLock::new(LedgerState::default()),
            ids,
        }
    }

    /// Rebuilds a ledger from its serialized shape, verifying that every
    /// balance equals that subject's credits minus debits.
    pub fn from_snapshot(snapshot: LedgerSnapshot, ids: IdSourceArc) -> Result<Self> {
        let mut derived: HashMap<String, i128> = HashMap::new();
        for tx in &snapshot.transactions {
            let entry = derived.entry(tx.subject.clone()).or_default();
            match tx.kind {
                EntryKind::Credit => *entry += i128::from(tx.amount),
                EntryKind::Debit => *entry -= i128::from(tx.amount),
            }
        }

        for (subject, balance) in &snapshot.balances {
            let expected = derived.get(subject.as_str()).copied().unwrap_or(0);
            if expected < 0 || expected != i128::from(*balance) {
                return Err(PaymentError::CorruptSnapshot(format!(
                    "subject {subject}: stored balance {balance}, log implies {expected}"
                )));
            }
        }
        for subject in derived.keys() {
            if !snapshot.balances.contains_key(subject) {
                return Err(PaymentError::CorruptSnapshot(format!(
                    "subject {subject} has log rows but no balance entry"
                )));
            }
        }

        let balances = snapshot
            .balances
            .into_iter()
            .map(|(subject, value)| (subject, Balance::new(value)))
            .collect();

        Ok(Self {
            state: RwLock::new(LedgerState {
                balances,
                log: snapshot.transactions,
            }),
            ids,
        })
    }

    /// Current balance; 0 for a subject the ledger has never seen.
    pub async fn balance(&self, subject: &str) -> u64 {
        self.state.read().await.balance(subject).value()
    }

    pub async fn has_sufficient_balance(&self, subject: &str, amount: u64) -> bool {
        self.state.read().await.balance(subject).value() >= amount
    }

    /// Tops up a subject's wallet and appends the credit row.
    pub async fn credit(
        &self,
        subject: &str,
        amount: Amount,
        method: &str,
        reference: &str,
    ) -> Result<LedgerTransaction> {
        let id = self.ids.transaction_id()?;
        let mut state = self.state.write().await;

        let current = state.balance(subject);
        let Some(new_balance) = current.checked_credit(amount) else {
            warn!(
                subject,
                balance = current.value(),
                amount = amount.value(),
                "wallet credit refused: balance overflow"
            );
            return Err(PaymentError::BalanceOverflow {
                subject: subject.to_string(),
            });
        };
        let tx = LedgerTransaction {
            id,
            subject: subject.to_string(),
            kind: EntryKind::Credit,
            amount: amount.value(),
            method: method.to_string(),
            reference: reference.to_string(),
            description: TOPUP_DESCRIPTION.to_string(),
            timestamp: Utc::now(),
            balance_after: new_balance.value(),
        };

        state.balances.insert(subject.to_string(), new_balance);
        state.log.push(tx.clone());

        debug!(subject, amount = amount.value(), balance = new_balance.value(), "wallet credit");
        Ok(tx)
    }

    /// Deducts from a subject's wallet, failing with `InsufficientFunds`
    /// before anything is written when the balance is short.
    pub async fn debit(
        &self,
        subject: &str,
        amount: Amount,
        description: &str,
        reference: &str,
    ) -> Result<LedgerTransaction> {
        let id = self.ids.transaction_id()?;
        let mut state = self.state.write().await;

        let current = state.balance(subject);
        let Some(new_balance) = current.checked_debit(amount) else {
            warn!(
                subject,
                available = current.value(),
                required = amount.value(),
                "wallet debit refused"
            );
            return Err(PaymentError::InsufficientFunds {
                available: current.value(),
                required: amount.value(),
            });
        };

        let tx = LedgerTransaction {
            id,
            subject: subject.to_string(),
            kind: EntryKind::Debit,
            amount: amount.value(),
            method: WALLET_METHOD.to_string(),
            reference: reference.to_string(),
            description: description.to_string(),
            timestamp: Utc::now(),
            balance_after: new_balance.value(),
        };

        state.balances.insert(subject.to_string(), new_balance);
        state.log.push(tx.clone());

        debug!(subject, amount = amount.value(), balance = new_balance.value(), "wallet debit");
        Ok(tx)
    }

    /// Settles a bill from the wallet, shaping the insufficiency case as a
    /// caller-facing message instead of an error.
    pub async fn process_payment(
        &self,
        subject: &str,
        amount: Amount,
        bill_id: &str,
        description: &str,
    ) -> Result<WalletPayment> {
        match self.debit(subject, amount, description, bill_id).await {
            Ok(transaction) => Ok(WalletPayment {
                success: true,
                transaction: Some(transaction),
                message: "Payment successful via wallet".to_string(),
            }),
            Err(PaymentError::InsufficientFunds { available, required }) => Ok(WalletPayment {
                success: false,
                transaction: None,
                message: format!(
                    "Insufficient wallet balance. Available: {available}, Required: {required}"
                ),
            }),
            Err(e) => Err(e),
        }
    }

    /// Transaction history for a subject, most recent first.
    ///
    /// `limit == 0` means unbounded. Read-only and restartable.
    pub async fn transactions(&self, subject: &str, limit: usize) -> Vec<LedgerTransaction> {
        let state = self.state.read().await;
        let iter = state.log.iter().rev().filter(|tx| tx.subject == subject);
        if limit > 0 {
            iter.take(limit).cloned().collect()
        } else {
            iter.cloned().collect()
        }
    }

    /// All per-subject balances, sorted by subject for stable output.
    pub async fn balances(&self) -> Vec<(String, u64)> {
        let state = self.state.read().await;
        let mut rows: Vec<(String, u64)> = state
            .balances
            .iter()
            .map(|(subject, balance)| (subject.clone(), balance.value()))
            .collect();
        rows.sort();
        rows
    }

    /// Aggregates over all subjects.
    pub async fn stats(&self) -> LedgerStats {
        let state = self.state.read().await;

        // Totals accumulate in u128: each row fits a u64, their sum over the
        // whole ledger need not.
        let mut total_credits = 0u128;
        let mut total_debits = 0u128;
        for tx in &state.log {
            match tx.kind {
                EntryKind::Credit => total_credits += u128::from(tx.amount),
                EntryKind::Debit => total_debits += u128::from(tx.amount),
            }
        }

        LedgerStats {
            subjects: state.balances.len(),
            total_balance: state
                .balances
                .values()
                .map(|balance| u128::from(balance.value()))
                .sum(),
            transactions: state.log.len(),
            total_credits,
            total_debits,
        }
    }

    /// Serializable copy of the full ledger state.
    pub async fn snapshot(&self) -> LedgerSnapshot {
        let state = self.state.read().await;
        LedgerSnapshot {
            balances: state
                .balances
                .iter()
                .map(|(subject, balance)| (subject.clone(), balance.value()))
                .collect(),
            transactions: state.log.clone(),
        }
    }
}
