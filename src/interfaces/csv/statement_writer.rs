use crate::domain::transaction::LedgerTransaction;
use crate::error::Result;
use std::io::Write;

/// Writes ledger output as CSV: per-subject balances, or transaction
/// statements when a history depth was requested.
pub struct StatementWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> StatementWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_balances(
        &mut self,
        balances: impl IntoIterator<Item = (String, u64)>,
    ) -> Result<()> {
        self.writer.write_record(["subject", "balance"])?;
        for (subject, balance) in balances {
            self.writer.write_record([subject, balance.to_string()])?;
        }
        self.writer.flush()?;
        Ok(())
    }

    /// Writes transaction rows, one per ledger entry, in the order given.
    /// Timestamps are omitted so the output is stable across runs.
    pub fn write_transactions(&mut self, transactions: &[LedgerTransaction]) -> Result<()> {
        self.writer.write_record([
            "subject",
            "id",
            "kind",
            "amount",
            "method",
            "reference",
            "description",
            "balance_after",
        ])?;
        for tx in transactions {
            self.writer.write_record([
                tx.subject.as_str(),
                tx.id.as_str(),
                &tx.kind.to_string(),
                &tx.amount.to_string(),
                tx.method.as_str(),
                tx.reference.as_str(),
                tx.description.as_str(),
                &tx.balance_after.to_string(),
            ])?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
