use crate::domain::ports::IdSource;
use crate::error::Result;
use chrono::Utc;
use rand::Rng;
use rand::distributions::Alphanumeric;
use std::sync::atomic::{AtomicU64, Ordering};

/// Production id source: timestamp + random suffix.
///
/// Unique per process lifetime; no cross-process guarantee is made, which is
/// enough for a single-writer simulator.
#[derive(Default, Clone)]
pub struct SystemIdSource;

impl SystemIdSource {
    pub fn new() -> Self {
        Self
    }

    fn suffix(len: usize) -> String {
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(len)
            .map(|b| (b as char).to_ascii_uppercase())
            .collect()
    }
}

impl IdSource for SystemIdSource {
    fn transaction_id(&self) -> Result<String> {
        Ok(format!(
            "TXN-{}-{}",
            Utc::now().timestamp_millis(),
            Self::suffix(7)
        ))
    }

    fn refund_id(&self) -> Result<String> {
        // Same shape as transaction ids; the suffix keeps two refunds issued
        // in the same millisecond distinct.
        Ok(format!(
            "REF-{}-{}",
            Utc::now().timestamp_millis(),
            Self::suffix(7)
        ))
    }

    fn authorization_code(&self) -> Result<String> {
        Ok(Self::suffix(6))
    }
}

/// Deterministic id source for tests: monotonically numbered ids.
#[derive(Default)]
pub struct SequenceIdSource {
    counter: AtomicU64,
}

impl SequenceIdSource {
    pub fn new() -> Self {
        Self::default()
    }

    fn next(&self) -> u64 {
        self.counter.fetch_add(1, Ordering::Relaxed) + 1
    }
}

impl IdSource for SequenceIdSource {
    fn transaction_id(&self) -> Result<String> {
        Ok(format!("TXN-{:06}", self.next()))
    }

    fn refund_id(&self) -> Result<String> {
        Ok(format!("REF-{:06}", self.next()))
    }

    fn authorization_code(&self) -> Result<String> {
        Ok(format!("AUTH{:04}", self.next()))
    }
}
