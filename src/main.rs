use clap::Parser;
use medipay::application::ledger::WalletLedger;
use medipay::domain::money::Amount;
use medipay::infrastructure::ids::SystemIdSource;
use medipay::interfaces::csv::operation_reader::{OperationKind, OperationReader};
use medipay::interfaces::csv::statement_writer::StatementWriter;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input wallet operations CSV file
    input: PathBuf,

    /// Print each subject's most recent transactions instead of balances,
    /// at most LIMIT rows per subject (0 for the full history)
    #[arg(long)]
    limit: Option<usize>,

    /// Print aggregate ledger statistics as JSON to stderr
    #[arg(long)]
    stats: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let ledger = WalletLedger::new(Arc::new(SystemIdSource::new()));

    let file = File::open(cli.input).into_diagnostic()?;
    let reader = OperationReader::new(file);
    for op_result in reader.operations() {
        match op_result {
            Ok(op) => {
                let amount = match Amount::new(op.amount) {
                    Ok(amount) => amount,
                    Err(e) => {
                        eprintln!("Error processing operation: {}", e);
                        continue;
                    }
                };
                let result = match op.op {
                    OperationKind::Credit => ledger
                        .credit(
                            &op.subject,
                            amount,
                            op.method.as_deref().unwrap_or("Cash"),
                            op.reference.as_deref().unwrap_or(""),
                        )
                        .await
                        .map(|_| ()),
                    OperationKind::Debit => ledger
                        .debit(
                            &op.subject,
                            amount,
                            op.description.as_deref().unwrap_or("Payment"),
                            op.reference.as_deref().unwrap_or(""),
                        )
                        .await
                        .map(|_| ()),
                };
                if let Err(e) = result {
                    eprintln!("Error processing operation: {}", e);
                }
            }
            Err(e) => {
                eprintln!("Error reading operation: {}", e);
            }
        }
    }

    if cli.stats {
        let stats = ledger.stats().await;
        eprintln!("{}", serde_json::to_string(&stats).into_diagnostic()?);
    }

    let stdout = io::stdout();
    let mut writer = StatementWriter::new(stdout.lock());
    match cli.limit {
        Some(limit) => {
            let mut rows = Vec::new();
            for (subject, _) in ledger.balances().await {
                rows.extend(ledger.transactions(&subject, limit).await);
            }
            writer.write_transactions(&rows).into_diagnostic()?;
        }
        None => {
            writer.write_balances(ledger.balances().await).into_diagnostic()?;
        }
    }

    Ok(())
}
