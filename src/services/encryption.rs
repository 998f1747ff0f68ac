//! Encryption lifecycle workflows
//!
//! Enable, disable, resume, and status over the dual-encoded records. Key
//! material is always derived fresh from a wallet signature over the fixed
//! unlock challenge; nothing key-like is ever persisted.

use std::sync::Arc;

use serde::Serialize;

use crate::cache::LedgerCache;
use crate::crypto::{derive_key, DerivedKey, UNLOCK_CHALLENGE};
use crate::error::{LedgerError, LedgerResult};
use crate::session::{same_address, EncryptionContext, Signer};
use crate::storage::{mode_switch, Storage, StorageMode};

/// Snapshot of the encryption state across both protected records
#[derive(Debug, Clone, Serialize)]
pub struct EncryptionStatus {
    pub transactions_mode: Option<StorageMode>,
    pub classifier_mode: Option<StorageMode>,
    pub owner: Option<String>,
    /// Target of an interrupted switch, if one is pending
    pub pending_switch: Option<StorageMode>,
}

impl EncryptionStatus {
    /// Both records present and encrypted, nothing pending
    pub fn fully_encrypted(&self) -> bool {
        self.pending_switch.is_none()
            && self.transactions_mode != Some(StorageMode::Plaintext)
            && self.classifier_mode != Some(StorageMode::Plaintext)
            && self.owner.is_some()
    }
}

/// Mode-switch lifecycle over the shared storage and cache
pub struct EncryptionService {
    storage: Arc<Storage>,
    cache: Arc<LedgerCache>,
}

impl EncryptionService {
    pub fn new(storage: Arc<Storage>, cache: Arc<LedgerCache>) -> Self {
        Self { storage, cache }
    }

    /// Turn encryption on for both protected records.
    ///
    /// Idempotent for the owning identity; any other identity is refused
    /// before a single byte is converted.
    pub fn enable(&self, signer: &dyn Signer) -> LedgerResult<()> {
        let address = signer.address()?;
        self.check_owner(&address)?;

        let key = self.derive_session_key(signer)?;
        mode_switch::enable_encryption(&self.storage, &key, &address)?;

        // Fresh cache state: the list reloads under the new mode and the key
        // is retained for writes in this session
        self.cache.clear();
        self.cache
            .set_context(EncryptionContext::new(address, key));
        Ok(())
    }

    /// Convert both records back to plaintext. Owner-only.
    pub fn disable(&self, signer: &dyn Signer) -> LedgerResult<()> {
        let address = signer.address()?;
        self.check_owner(&address)?;

        let key = self.derive_session_key(signer)?;
        mode_switch::disable_encryption(&self.storage, &key)?;

        self.cache.clear();
        Ok(())
    }

    /// Finish an interrupted mode switch. Owner-only; a no-op when nothing
    /// is pending.
    pub fn resume(&self, signer: &dyn Signer) -> LedgerResult<Option<StorageMode>> {
        let address = signer.address()?;
        self.check_owner(&address)?;

        let key = self.derive_session_key(signer)?;
        let finished = mode_switch::resume(&self.storage, &key, &address)?;

        if finished.is_some() {
            self.cache.clear();
            if finished == Some(StorageMode::Encrypted) {
                self.cache
                    .set_context(EncryptionContext::new(address, key));
            }
        }
        Ok(finished)
    }

    /// Current encryption state without touching any key material
    pub fn status(&self) -> LedgerResult<EncryptionStatus> {
        Ok(EncryptionStatus {
            transactions_mode: self.storage.transactions.mode()?,
            classifier_mode: self.storage.classifier.mode()?,
            owner: self.storage.encryption_owner()?,
            pending_switch: self.storage.pending_switch()?.map(|i| i.target),
        })
    }

    /// Refuse any identity other than the recorded owner
    fn check_owner(&self, address: &str) -> LedgerResult<()> {
        if let Some(owner) = self.storage.encryption_owner()? {
            if !same_address(&owner, address) {
                return Err(LedgerError::IdentityMismatch {
                    expected: owner,
                    actual: address.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Sign the fixed unlock challenge and derive the store key from it
    fn derive_session_key(&self, signer: &dyn Signer) -> LedgerResult<DerivedKey> {
        let signature = signer.sign(UNLOCK_CHALLENGE)?;
        derive_key(&signature)
    }
}
