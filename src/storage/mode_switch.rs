//! Mode-switch transaction across the protected records
//!
//! Enabling or disabling encryption must convert BOTH dual-encoded records
//! (transaction list and classifier table); a half-converted pair is the
//! bug class this module exists to prevent. There is no multi-file atomic
//! commit here, so a write-ahead intent marker brackets the conversion:
//!
//! 1. write the intent marker naming the target mode
//! 2. convert each record that is not already in the target mode
//! 3. update the owner record, then clear the marker
//!
//! A marker found on a later load means the switch was interrupted; the
//! conversion is resumed (each step is idempotent), never silently skipped.

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::crypto::DerivedKey;
use crate::error::LedgerResult;

use super::record::StorageMode;
use super::store::EncryptedStore;
use super::Storage;

/// Write-ahead marker for an in-progress mode switch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwitchIntent {
    /// The mode both records are being converted to
    pub target: StorageMode,

    /// When the switch started
    pub started_at: DateTime<Utc>,
}

impl SwitchIntent {
    fn new(target: StorageMode) -> Self {
        Self {
            target,
            started_at: Utc::now(),
        }
    }
}

/// Convert both protected records to encrypted form and record the owner.
///
/// Safe to re-run after a crash: records already in the target mode are left
/// alone.
pub fn enable_encryption(storage: &Storage, key: &DerivedKey, owner: &str) -> LedgerResult<()> {
    storage.write_switch_intent(&SwitchIntent::new(StorageMode::Encrypted))?;

    convert_record(&storage.transactions, StorageMode::Encrypted, key)?;
    convert_record(&storage.classifier, StorageMode::Encrypted, key)?;

    storage.set_encryption_owner(owner)?;
    storage.clear_switch_intent()
}

/// Convert both protected records back to plaintext and drop the owner.
pub fn disable_encryption(storage: &Storage, key: &DerivedKey) -> LedgerResult<()> {
    storage.write_switch_intent(&SwitchIntent::new(StorageMode::Plaintext))?;

    convert_record(&storage.transactions, StorageMode::Plaintext, key)?;
    convert_record(&storage.classifier, StorageMode::Plaintext, key)?;

    storage.clear_encryption_owner()?;
    storage.clear_switch_intent()
}

/// Finish an interrupted switch found via a stale intent marker.
///
/// Returns the mode the store ended up in, or None if nothing was pending.
pub fn resume(storage: &Storage, key: &DerivedKey, owner: &str) -> LedgerResult<Option<StorageMode>> {
    let intent = match storage.pending_switch()? {
        None => return Ok(None),
        Some(intent) => intent,
    };

    tracing::info!(target: "ledgerkeep::storage", mode = %intent.target, "resuming interrupted mode switch");

    match intent.target {
        StorageMode::Encrypted => enable_encryption(storage, key, owner)?,
        StorageMode::Plaintext => disable_encryption(storage, key)?,
    }

    Ok(Some(intent.target))
}

/// Re-encode a single record in the target mode, if it isn't there already
fn convert_record<T>(
    store: &EncryptedStore<T>,
    target: StorageMode,
    key: &DerivedKey,
) -> LedgerResult<()>
where
    T: Serialize + DeserializeOwned + Default,
{
    let current = match store.mode()? {
        // Absent records have nothing to convert
        None => return Ok(()),
        Some(mode) => mode,
    };

    if current == target {
        return Ok(());
    }

    match target {
        StorageMode::Encrypted => {
            let value = store.load_plain()?;
            store.save_encrypted(&value, key)
        }
        StorageMode::Plaintext => {
            let value = store.load_encrypted(key)?;
            store.save_plain(&value)
        }
    }
}
