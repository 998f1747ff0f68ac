//! Process-wide in-memory transaction cache
//!
//! One materialized transaction list shared by every reader, regardless of
//! storage mode, so callers never manage key derivation themselves.
//!
//! State machine: unloaded -> loading -> loaded. The `loading` transition is
//! guarded by a shared `tokio::sync::OnceCell`: concurrent load requests all
//! await the same in-flight initialization instead of starting a second
//! storage read or decrypt. A bare boolean flag would leave a window between
//! check and set across the await points; the cell closes it by
//! construction. `clear` swaps in a fresh cell, returning to `unloaded`.
//!
//! Auto-unlock policy for encrypted stores: decryption is attempted only
//! when a persisted encryption owner exists AND the active session identity
//! matches it (case-insensitive). On mismatch or absent session the cache
//! resolves to an empty list; it never signs or decrypts with an unrelated
//! identity. A successful unlock retains the derived key in the session
//! context so later writes stay encrypted without re-signing.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::OnceCell;

use crate::crypto::{derive_key, DerivedKey, UNLOCK_CHALLENGE};
use crate::error::LedgerResult;
use crate::models::Transaction;
use crate::session::{same_address, EncryptionContext, Signer};
use crate::storage::Storage;

/// Shared, lazily-loaded view of the transaction list
pub struct LedgerCache {
    storage: Arc<Storage>,
    /// Replaceable memoization slot; an initialized cell is the `loaded`
    /// state, an empty one is `unloaded`, an in-flight init is `loading`.
    slot: Mutex<Arc<OnceCell<Vec<Transaction>>>>,
    /// Session-scoped key, present only after enable or a successful unlock
    context: Mutex<Option<EncryptionContext>>,
}

impl LedgerCache {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self {
            storage,
            slot: Mutex::new(Arc::new(OnceCell::new())),
            context: Mutex::new(None),
        }
    }

    /// The transaction list, loading it on first use.
    ///
    /// Load failures degrade to an empty list plus a logged condition; they
    /// never propagate to readers (the UI must not block on storage faults).
    pub async fn transactions(&self, signer: Option<&dyn Signer>) -> Vec<Transaction> {
        match self.require_loaded(signer).await {
            Ok(transactions) => transactions,
            Err(err) => {
                tracing::warn!(target: "ledgerkeep::cache", error = %err, "cache load failed; resolving empty");
                Vec::new()
            }
        }
    }

    /// The transaction list, surfacing load errors to callers that must not
    /// silently continue (writers, mode switches).
    pub async fn require_loaded(&self, signer: Option<&dyn Signer>) -> LedgerResult<Vec<Transaction>> {
        let cell = self.current_cell();
        let loaded = cell
            .get_or_try_init(|| self.load_from_store(signer))
            .await?;
        Ok(loaded.clone())
    }

    /// Replace the cached list after a successful write, without a reload
    pub fn store_loaded(&self, transactions: Vec<Transaction>) {
        *self.lock_slot() = Arc::new(OnceCell::new_with(Some(transactions)));
    }

    /// Drop the cached list and session key (logout or identity change)
    pub fn clear(&self) {
        *self.lock_slot() = Arc::new(OnceCell::new());
        *self.lock_context() = None;
    }

    /// The session-scoped encryption key, if an unlock has happened
    pub fn session_key(&self) -> Option<Arc<DerivedKey>> {
        self.lock_context().as_ref().map(|ctx| ctx.key.clone())
    }

    /// Install a session key directly (used when encryption is first enabled,
    /// where the signature is already in hand)
    pub fn set_context(&self, context: EncryptionContext) {
        *self.lock_context() = Some(context);
    }

    /// A key for the protected records, unlocking through the signer when
    /// policy allows it.
    ///
    /// Returns None (never an error) when no owner is recorded, no session
    /// is active, the session does not own the store, or no signer is
    /// available. A retained key is reused without re-signing; a fresh
    /// unlock retains the key for the rest of the session.
    pub fn unlock_key(&self, signer: Option<&dyn Signer>) -> LedgerResult<Option<Arc<DerivedKey>>> {
        let owner = match self.storage.encryption_owner()? {
            Some(owner) => owner,
            None => return Ok(None),
        };

        if let Some(key) = self.key_for(&owner) {
            return Ok(Some(key));
        }

        let session = match self.storage.load_session()? {
            Some(session) => session,
            None => {
                tracing::debug!(target: "ledgerkeep::cache", "no active session; unlock skipped");
                return Ok(None);
            }
        };

        if !same_address(&owner, &session.address) {
            tracing::warn!(
                target: "ledgerkeep::cache",
                owner = %owner,
                session = %session.address,
                "session identity does not own the store; unlock skipped"
            );
            return Ok(None);
        }

        let signer = match signer {
            Some(signer) => signer,
            None => {
                tracing::debug!(target: "ledgerkeep::cache", "no signer available; unlock skipped");
                return Ok(None);
            }
        };

        let signature = signer.sign(UNLOCK_CHALLENGE)?;
        let context = EncryptionContext::new(session.address, derive_key(&signature)?);
        let key = context.key.clone();
        *self.lock_context() = Some(context);
        Ok(Some(key))
    }

    async fn load_from_store(&self, signer: Option<&dyn Signer>) -> LedgerResult<Vec<Transaction>> {
        if let Some(intent) = self.storage.pending_switch()? {
            return Err(crate::error::LedgerError::PartialModeSwitch {
                target: intent.target.to_string(),
            });
        }

        if !self.storage.transactions.is_encrypted()? {
            return self.storage.transactions.load_plain();
        }

        match self.unlock_key(signer)? {
            Some(key) => self.storage.transactions.load_encrypted(&key),
            None => {
                tracing::warn!(
                    target: "ledgerkeep::cache",
                    "encrypted store cannot be unlocked for this session; resolving empty"
                );
                Ok(Vec::new())
            }
        }
    }

    /// The retained key, but only if it belongs to the given owner
    fn key_for(&self, owner: &str) -> Option<Arc<DerivedKey>> {
        self.lock_context()
            .as_ref()
            .filter(|ctx| ctx.matches(owner))
            .map(|ctx| ctx.key.clone())
    }

    fn current_cell(&self) -> Arc<OnceCell<Vec<Transaction>>> {
        self.lock_slot().clone()
    }

    fn lock_slot(&self) -> std::sync::MutexGuard<'_, Arc<OnceCell<Vec<Transaction>>>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_context(&self) -> std::sync::MutexGuard<'_, Option<EncryptionContext>> {
        self.context.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
