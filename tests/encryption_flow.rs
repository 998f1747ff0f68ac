//! End-to-end encryption lifecycle over the library API
//!
//! Covers the full arc a real deployment goes through: plaintext history,
//! enable, writes while encrypted, a fresh process auto-unlocking, and
//! disable back to plaintext.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use tempfile::TempDir;

use ledgerkeep::cache::LedgerCache;
use ledgerkeep::config::LedgerPaths;
use ledgerkeep::error::LedgerResult;
use ledgerkeep::models::Money;
use ledgerkeep::services::{EncryptionService, LedgerService};
use ledgerkeep::session::{Signer, WalletSession};
use ledgerkeep::storage::Storage;

struct StaticSigner {
    address: String,
    signature: String,
}

impl StaticSigner {
    fn new(address: &str, signature: &str) -> Self {
        Self {
            address: address.into(),
            signature: signature.into(),
        }
    }
}

impl Signer for StaticSigner {
    fn address(&self) -> LedgerResult<String> {
        Ok(self.address.clone())
    }

    fn sign(&self, _message: &str) -> LedgerResult<String> {
        Ok(self.signature.clone())
    }
}

fn open(dir: &TempDir) -> (Arc<Storage>, Arc<LedgerCache>, LedgerService, EncryptionService) {
    let paths = LedgerPaths::with_base_dir(dir.path().to_path_buf());
    let storage = Arc::new(Storage::new(paths).unwrap());
    let cache = Arc::new(LedgerCache::new(storage.clone()));
    let ledger = LedgerService::new(storage.clone(), cache.clone());
    let encryption = EncryptionService::new(storage.clone(), cache.clone());
    (storage, cache, ledger, encryption)
}

#[tokio::test]
async fn full_lifecycle_across_processes() {
    let dir = TempDir::new().unwrap();
    let signer = StaticSigner::new("0xOwner", "0xsignature");
    let ts = Utc.with_ymd_and_hms(2025, 6, 10, 10, 0, 0).unwrap();

    // Process 1: plaintext history, then enable encryption
    {
        let (storage, _cache, ledger, encryption) = open(&dir);
        storage
            .save_session(&WalletSession::new("0xOwner"))
            .unwrap();

        ledger
            .add(
                Money::from_cents(-2500),
                Some("Groceries".into()),
                Some("weekly shop".into()),
                Some(ts),
                Some(&signer),
            )
            .await
            .unwrap();

        encryption.enable(&signer).unwrap();
        assert!(storage.transactions.is_encrypted().unwrap());
        assert!(storage.classifier.is_encrypted().unwrap());

        // Writes after enable stay encrypted via the retained session key
        ledger
            .add(
                Money::from_cents(-800),
                Some("Dining".into()),
                Some("coffee".into()),
                Some(ts),
                Some(&signer),
            )
            .await
            .unwrap();
        assert!(storage.transactions.is_encrypted().unwrap());
    }

    // Process 2: fresh cache auto-unlocks for the owning session
    {
        let (_storage, _cache, ledger, _encryption) = open(&dir);
        let listed = ledger.list(Some(&signer)).await.unwrap();
        assert_eq!(listed.len(), 2);
    }

    // Process 3: a different identity sees nothing and triggers no signing
    {
        let dir_signer = StaticSigner::new("0xIntruder", "0xothersig");
        let (storage, cache, _ledger, _encryption) = open(&dir);
        storage
            .save_session(&WalletSession::new("0xIntruder"))
            .unwrap();

        let listed = cache.transactions(Some(&dir_signer)).await;
        assert!(listed.is_empty());
        assert!(cache.session_key().is_none());

        // Restore the owner session for the final stage
        storage
            .save_session(&WalletSession::new("0xOwner"))
            .unwrap();
    }

    // Process 4: owner disables; everything reads back as plaintext
    {
        let (storage, _cache, ledger, encryption) = open(&dir);
        encryption.disable(&signer).unwrap();

        assert!(!storage.transactions.is_encrypted().unwrap());
        assert!(storage.encryption_owner().unwrap().is_none());
        assert_eq!(ledger.list(None).await.unwrap().len(), 2);
    }
}

#[tokio::test]
async fn wrong_signature_fails_decryption_cleanly() {
    let dir = TempDir::new().unwrap();
    let owner = StaticSigner::new("0xOwner", "0xrealsig");
    let ts = Utc.with_ymd_and_hms(2025, 6, 10, 10, 0, 0).unwrap();

    {
        let (storage, _cache, ledger, encryption) = open(&dir);
        storage
            .save_session(&WalletSession::new("0xOwner"))
            .unwrap();
        ledger
            .add(
                Money::from_cents(-1000),
                Some("Misc".into()),
                None,
                Some(ts),
                Some(&owner),
            )
            .await
            .unwrap();
        encryption.enable(&owner).unwrap();
    }

    // Same address, wrong signature: the derived key cannot authenticate
    // the ciphertext and the error surfaces instead of garbage data
    {
        let bad = StaticSigner::new("0xOwner", "0xforgedsig");
        let (_storage, cache, _ledger, _encryption) = open(&dir);
        let err = cache.require_loaded(Some(&bad)).await.unwrap_err();
        assert!(matches!(err, ledgerkeep::LedgerError::Encryption(_)));
    }
}
