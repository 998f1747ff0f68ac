use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use ledgerkeep::cache::LedgerCache;
use ledgerkeep::cli::{
    handle_budget_command, handle_classify_command, handle_detect_command,
    handle_encrypt_command, handle_session_command, handle_transaction_command, BudgetCommands,
    ClassifyCommands, EncryptCommands, PromptSigner, SessionCommands, TransactionCommands,
};
use ledgerkeep::config::LedgerPaths;
use ledgerkeep::services::{EncryptionService, LedgerService};
use ledgerkeep::session::Signer;
use ledgerkeep::storage::Storage;

#[derive(Parser)]
#[command(
    name = "ledgerkeep",
    version,
    about = "Wallet-bound personal finance ledger",
    long_about = "ledgerkeep is a personal finance ledger whose storage can be \
                  switched between plaintext JSON and encryption under a key \
                  derived from your wallet's signature. It tracks transactions, \
                  learns your categories, watches for anomalies, and evaluates \
                  budgets."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Transaction management commands
    #[command(subcommand, alias = "txn")]
    Transaction(TransactionCommands),

    /// Category suggestion and training commands
    #[command(subcommand)]
    Classify(ClassifyCommands),

    /// Budget management commands
    #[command(subcommand)]
    Budget(BudgetCommands),

    /// Encryption management commands
    #[command(subcommand)]
    Encrypt(EncryptCommands),

    /// Wallet session commands
    #[command(subcommand)]
    Session(SessionCommands),

    /// Scan the transaction history for anomalies
    Detect,

    /// Show current configuration and paths
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let paths = LedgerPaths::new()?;
    let storage = Arc::new(Storage::new(paths)?);
    let cache = Arc::new(LedgerCache::new(storage.clone()));

    let ledger = LedgerService::new(storage.clone(), cache.clone());
    let encryption = EncryptionService::new(storage.clone(), cache.clone());

    let signer = PromptSigner::from_session(&storage)?;
    let signer_ref: Option<&dyn Signer> = signer.as_ref().map(|s| s as &dyn Signer);

    match cli.command {
        Some(Commands::Transaction(cmd)) => {
            handle_transaction_command(&ledger, signer_ref, cmd).await?;
        }
        Some(Commands::Classify(cmd)) => {
            handle_classify_command(&ledger, signer_ref, cmd)?;
        }
        Some(Commands::Budget(cmd)) => {
            handle_budget_command(&ledger, signer_ref, cmd).await?;
        }
        Some(Commands::Encrypt(cmd)) => {
            handle_encrypt_command(&encryption, signer_ref, cmd)?;
        }
        Some(Commands::Session(cmd)) => {
            handle_session_command(&storage, &cache, cmd)?;
        }
        Some(Commands::Detect) => {
            handle_detect_command(&ledger, signer_ref).await?;
        }
        Some(Commands::Config) => {
            let paths = storage.paths();
            println!("ledgerkeep Configuration");
            println!("========================");
            println!("Data directory: {}", paths.data_dir().display());
            println!();
            match storage.load_session()? {
                Some(session) => println!("Active session: {}", session.address),
                None => println!("Active session: (none)"),
            }
            match storage.encryption_owner()? {
                Some(owner) => println!("Encryption owner: {}", owner),
                None => println!("Encryption owner: (none)"),
            }
        }
        None => {
            println!("ledgerkeep - wallet-bound personal finance ledger");
            println!();
            println!("Run 'ledgerkeep --help' for usage information.");
        }
    }

    Ok(())
}
