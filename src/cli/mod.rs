//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod budget;
pub mod classify;
pub mod encrypt;
pub mod session;
pub mod transaction;

pub use budget::{handle_budget_command, BudgetCommands};
pub use classify::{handle_classify_command, ClassifyCommands};
pub use encrypt::{handle_encrypt_command, EncryptCommands};
pub use session::{handle_session_command, SessionCommands};
pub use transaction::{handle_detect_command, handle_transaction_command, TransactionCommands};

use crate::error::{LedgerError, LedgerResult};
use crate::session::Signer;
use crate::storage::Storage;

/// Signer backed by an interactive prompt.
///
/// The wallet lives outside this process; when a signature is needed the
/// challenge is shown and the user pastes the wallet's signature over it.
/// Input is hidden like a passphrase since the signature is key material.
pub struct PromptSigner {
    address: String,
}

impl PromptSigner {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
        }
    }

    /// A signer for the active session, None when nobody is logged in
    pub fn from_session(storage: &Storage) -> LedgerResult<Option<Self>> {
        Ok(storage.load_session()?.map(|s| Self::new(s.address)))
    }
}

impl Signer for PromptSigner {
    fn address(&self) -> LedgerResult<String> {
        Ok(self.address.clone())
    }

    fn sign(&self, message: &str) -> LedgerResult<String> {
        println!("Signature requested over challenge: \"{}\"", message);
        let signature = rpassword::prompt_password("Paste wallet signature: ")
            .map_err(|e| LedgerError::Session(format!("Failed to read signature: {}", e)))?;
        if signature.trim().is_empty() {
            return Err(LedgerError::Session("Empty signature".to_string()));
        }
        Ok(signature.trim().to_string())
    }
}
