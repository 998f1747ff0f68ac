//! Transaction CLI commands
//!
//! Add, list, update, and delete, plus the anomaly report over the full
//! history.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use clap::Subcommand;

use crate::error::{LedgerError, LedgerResult};
use crate::models::{Money, TransactionId};
use crate::services::{LedgerService, TransactionPatch};
use crate::session::Signer;

/// Transaction subcommands
#[derive(Subcommand)]
pub enum TransactionCommands {
    /// Add a new transaction
    Add {
        /// Amount (e.g., "-12.50" for an expense, "2000" for income)
        #[arg(allow_hyphen_values = true)]
        amount: String,
        /// Category; omitted means the classifier suggests one
        #[arg(short, long)]
        category: Option<String>,
        /// Free-form note, also used to train the classifier
        #[arg(short, long)]
        note: Option<String>,
        /// Transaction date (YYYY-MM-DD or RFC 3339); defaults to now
        #[arg(short, long)]
        date: Option<String>,
    },

    /// List transactions, newest first
    List {
        /// Number of transactions to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Update fields of an existing transaction
    Update {
        /// Transaction ID
        id: String,
        /// New amount
        #[arg(short, long, allow_hyphen_values = true)]
        amount: Option<String>,
        /// New category
        #[arg(short, long)]
        category: Option<String>,
        /// New note (empty string clears it)
        #[arg(short, long)]
        note: Option<String>,
        /// New date (YYYY-MM-DD or RFC 3339)
        #[arg(short, long)]
        date: Option<String>,
    },

    /// Delete a transaction
    #[command(alias = "rm")]
    Delete {
        /// Transaction ID
        id: String,
    },
}

/// Handle a transaction command
pub async fn handle_transaction_command(
    service: &LedgerService,
    signer: Option<&dyn Signer>,
    cmd: TransactionCommands,
) -> LedgerResult<()> {
    match cmd {
        TransactionCommands::Add {
            amount,
            category,
            note,
            date,
        } => {
            let amount = parse_amount(&amount)?;
            let timestamp = date.as_deref().map(parse_date).transpose()?;

            let suggested = category.is_none();
            let txn = service.add(amount, category, note, timestamp, signer).await?;

            if suggested {
                println!("Categorized as '{}'", txn.category);
            }
            println!("Added: {} (id {})", txn, txn.id);
        }

        TransactionCommands::List { limit } => {
            let transactions = service.list(signer).await?;
            if transactions.is_empty() {
                println!("No transactions recorded.");
                return Ok(());
            }

            for txn in transactions.iter().take(limit) {
                let note = txn.note.as_deref().unwrap_or("");
                println!("{}  {}  {}", txn.id, txn, note);
            }
            if transactions.len() > limit {
                println!("... and {} more", transactions.len() - limit);
            }
        }

        TransactionCommands::Update {
            id,
            amount,
            category,
            note,
            date,
        } => {
            let id = parse_id(&id)?;
            let patch = TransactionPatch {
                amount: amount.as_deref().map(parse_amount).transpose()?,
                category,
                note: note.map(|n| if n.is_empty() { None } else { Some(n) }),
                timestamp: date.as_deref().map(parse_date).transpose()?,
            };

            let txn = service.update(id, patch, signer).await?;
            println!("Updated: {}", txn);
        }

        TransactionCommands::Delete { id } => {
            let id = parse_id(&id)?;
            let removed = service.delete(id, signer).await?;
            println!("Deleted: {}", removed);
        }
    }

    Ok(())
}

/// Run the anomaly detector and print the flags
pub async fn handle_detect_command(
    service: &LedgerService,
    signer: Option<&dyn Signer>,
) -> LedgerResult<()> {
    let flags = service.detect_anomalies(signer).await?;

    if flags.is_empty() {
        println!("No anomalies detected.");
        return Ok(());
    }

    println!("{} anomaly flag(s):", flags.len());
    for flag in &flags {
        println!("  {} (transaction {})", flag, flag.transaction_id);
    }
    Ok(())
}

fn parse_amount(s: &str) -> LedgerResult<Money> {
    Money::parse(s).map_err(|e| LedgerError::Validation(format!("Invalid amount: {}", e)))
}

fn parse_id(s: &str) -> LedgerResult<TransactionId> {
    s.parse()
        .map_err(|_| LedgerError::Validation(format!("Invalid transaction ID: {}", s)))
}

/// Accept RFC 3339 timestamps or bare dates at UTC midnight
fn parse_date(s: &str) -> LedgerResult<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Ok(ts.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| LedgerError::Validation(format!("Invalid date: {}", s)))?;
    Ok(date.and_time(NaiveTime::MIN).and_utc())
}
