//! Storage layer for ledgerkeep
//!
//! JSON file storage with atomic writes, a dual-encoding record envelope for
//! the protected records (transaction list, classifier table), and
//! plaintext-only side records (budgets, session, encryption owner,
//! switch-intent marker).

pub mod file_io;
pub mod mode_switch;
pub mod record;
pub mod store;

pub use file_io::{read_json, write_json_atomic};
pub use mode_switch::SwitchIntent;
pub use record::StorageMode;
pub use store::EncryptedStore;

use crate::classifier::ClassifierTable;
use crate::config::LedgerPaths;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{BudgetBook, Transaction};
use crate::session::WalletSession;

/// Main storage coordinator that provides access to all persisted records
pub struct Storage {
    paths: LedgerPaths,
    /// The transaction list, dual-encoded
    pub transactions: EncryptedStore<Vec<Transaction>>,
    /// The classifier table, dual-encoded in lockstep with the transactions
    pub classifier: EncryptedStore<ClassifierTable>,
}

impl Storage {
    /// Create a new Storage instance
    pub fn new(paths: LedgerPaths) -> Result<Self, LedgerError> {
        paths.ensure_directories()?;

        Ok(Self {
            transactions: EncryptedStore::new(paths.transactions_file(), "transactions"),
            classifier: EncryptedStore::new(paths.classifier_file(), "classifier"),
            paths,
        })
    }

    /// Get the paths configuration
    pub fn paths(&self) -> &LedgerPaths {
        &self.paths
    }

    /// Load the budget book (always plaintext; missing file is an empty book)
    pub fn load_budgets(&self) -> LedgerResult<BudgetBook> {
        read_json(self.paths.budgets_file())
    }

    /// Save the budget book
    pub fn save_budgets(&self, budgets: &BudgetBook) -> LedgerResult<()> {
        write_json_atomic(self.paths.budgets_file(), budgets)
    }

    /// Load the active wallet session, if any
    pub fn load_session(&self) -> LedgerResult<Option<WalletSession>> {
        match file_io::read_string_opt(self.paths.session_file())? {
            None => Ok(None),
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| LedgerError::Session(format!("Invalid session record: {}", e))),
        }
    }

    /// Persist the active wallet session
    pub fn save_session(&self, session: &WalletSession) -> LedgerResult<()> {
        write_json_atomic(self.paths.session_file(), session)
    }

    /// Remove the session record (logout)
    pub fn clear_session(&self) -> LedgerResult<()> {
        file_io::remove_if_exists(self.paths.session_file())
    }

    /// The identity that enabled encryption, if encryption is on
    pub fn encryption_owner(&self) -> LedgerResult<Option<String>> {
        Ok(file_io::read_string_opt(self.paths.owner_file())?
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()))
    }

    /// Record the encryption owner (set when encryption is enabled)
    pub fn set_encryption_owner(&self, address: &str) -> LedgerResult<()> {
        file_io::write_string_atomic(self.paths.owner_file(), address)
    }

    /// Remove the encryption owner record
    pub fn clear_encryption_owner(&self) -> LedgerResult<()> {
        file_io::remove_if_exists(self.paths.owner_file())
    }

    /// A mode switch that was started but never confirmed complete
    pub fn pending_switch(&self) -> LedgerResult<Option<SwitchIntent>> {
        match file_io::read_string_opt(self.paths.switch_intent_file())? {
            None => Ok(None),
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| LedgerError::corrupted("switch-intent", e.to_string())),
        }
    }

    pub(crate) fn write_switch_intent(&self, intent: &SwitchIntent) -> LedgerResult<()> {
        write_json_atomic(self.paths.switch_intent_file(), intent)
    }

    pub(crate) fn clear_switch_intent(&self) -> LedgerResult<()> {
        file_io::remove_if_exists(self.paths.switch_intent_file())
    }
}
