//! Encryption CLI commands
//!
//! Enabling, disabling, and inspecting encryption on the protected records.
//! Every state-changing command requires a signature from the owning wallet.

use clap::Subcommand;

use crate::error::LedgerResult;
use crate::services::EncryptionService;
use crate::session::Signer;
use crate::storage::StorageMode;

/// Encryption management commands
#[derive(Subcommand)]
pub enum EncryptCommands {
    /// Enable encryption for your ledger data
    Enable,

    /// Disable encryption (requires the owning wallet)
    Disable,

    /// Show encryption status
    Status,

    /// Finish an interrupted enable/disable
    Resume,
}

/// Handle encryption commands
pub fn handle_encrypt_command(
    service: &EncryptionService,
    signer: Option<&dyn Signer>,
    cmd: EncryptCommands,
) -> LedgerResult<()> {
    match cmd {
        EncryptCommands::Enable => enable(service, signer),
        EncryptCommands::Disable => disable(service, signer),
        EncryptCommands::Status => show_status(service),
        EncryptCommands::Resume => resume(service, signer),
    }
}

fn enable(service: &EncryptionService, signer: Option<&dyn Signer>) -> LedgerResult<()> {
    let signer = require_signer(signer)?;
    let status = service.status()?;
    if status.fully_encrypted() {
        println!("Encryption is already enabled.");
        return Ok(());
    }

    println!("Enable Encryption");
    println!("=================");
    println!();
    println!("Your transaction history and classifier data will be encrypted");
    println!("with a key derived from your wallet's signature.");
    println!();
    println!("IMPORTANT: losing access to the wallet means losing the data.");
    println!();

    service.enable(signer)?;

    println!();
    println!("Encryption enabled.");
    Ok(())
}

fn disable(service: &EncryptionService, signer: Option<&dyn Signer>) -> LedgerResult<()> {
    let signer = require_signer(signer)?;
    let status = service.status()?;
    if status.owner.is_none() && status.pending_switch.is_none() {
        println!("Encryption is not enabled.");
        return Ok(());
    }

    print!("Are you sure you want to disable encryption? (yes/no): ");
    std::io::Write::flush(&mut std::io::stdout())?;

    let mut confirm = String::new();
    std::io::stdin().read_line(&mut confirm)?;
    if confirm.trim().to_lowercase() != "yes" {
        println!("Aborted.");
        return Ok(());
    }

    service.disable(signer)?;

    println!();
    println!("Encryption disabled. Your data is now stored unencrypted.");
    Ok(())
}

fn show_status(service: &EncryptionService) -> LedgerResult<()> {
    let status = service.status()?;

    println!("Encryption Status");
    println!("=================");
    println!();
    println!("Transactions: {}", mode_label(status.transactions_mode));
    println!("Classifier:   {}", mode_label(status.classifier_mode));
    match &status.owner {
        Some(owner) => println!("Owner:        {}", owner),
        None => println!("Owner:        (none)"),
    }
    if let Some(target) = status.pending_switch {
        println!();
        println!(
            "WARNING: an interrupted switch to {} storage is pending.",
            target
        );
        println!("Run 'ledgerkeep encrypt resume' to finish it.");
    }
    Ok(())
}

fn resume(service: &EncryptionService, signer: Option<&dyn Signer>) -> LedgerResult<()> {
    let signer = require_signer(signer)?;
    match service.resume(signer)? {
        Some(mode) => println!("Finished the interrupted switch; records are now {}.", mode),
        None => println!("No interrupted switch to resume."),
    }
    Ok(())
}

fn mode_label(mode: Option<StorageMode>) -> &'static str {
    match mode {
        None => "absent",
        Some(StorageMode::Plaintext) => "plaintext",
        Some(StorageMode::Encrypted) => "encrypted",
    }
}

fn require_signer(signer: Option<&dyn Signer>) -> LedgerResult<&dyn Signer> {
    signer.ok_or_else(|| {
        crate::error::LedgerError::Session(
            "No active session; run 'ledgerkeep session login' first".to_string(),
        )
    })
}
