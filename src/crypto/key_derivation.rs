//! Key derivation using Argon2id
//!
//! Derives the symmetric encryption key from a wallet signature. The
//! signature is the only secret input: the same signature must always yield
//! the same key so the owning identity can re-derive it in a later session
//! without anything being persisted. That rules out a per-derivation random
//! salt, so a fixed application salt is used for domain separation instead.

use argon2::{Algorithm, Argon2, Params, Version};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{LedgerError, LedgerResult};

/// The challenge string the wallet signs to unlock the ledger.
/// Changing it would orphan every encrypted store, so it is versioned.
pub const UNLOCK_CHALLENGE: &str = "ledgerkeep unlock v1";

/// Fixed domain-separation salt (derivation must be deterministic)
const KDF_SALT: &[u8] = b"ledgerkeep/kdf/v1";

/// Argon2id memory cost in KiB
const MEMORY_COST: u32 = 19_456;

/// Argon2id iteration count
const TIME_COST: u32 = 2;

/// Argon2id parallelism degree
const PARALLELISM: u32 = 1;

/// A derived 256-bit encryption key, zeroed on drop
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey {
    key: [u8; 32],
}

impl DerivedKey {
    /// Get the key bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.key
    }
}

// Never print key material in Debug output
impl fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DerivedKey").finish_non_exhaustive()
    }
}

/// Derive the encryption key from a wallet signature
///
/// Deterministic: the same signature always yields the same key. The private
/// signing key is never needed, only the signature string itself.
///
/// # Errors
///
/// Returns [`LedgerError::CryptoUnavailable`] if the Argon2 primitive cannot
/// be configured or run; callers must treat that as fatal for any
/// encryption-dependent operation rather than retrying.
pub fn derive_key(signature: &str) -> LedgerResult<DerivedKey> {
    let params = Params::new(MEMORY_COST, TIME_COST, PARALLELISM, Some(32))
        .map_err(|e| LedgerError::CryptoUnavailable(format!("Invalid Argon2 parameters: {}", e)))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut key = [0u8; 32];
    argon2
        .hash_password_into(signature.as_bytes(), KDF_SALT, &mut key)
        .map_err(|e| LedgerError::CryptoUnavailable(format!("Key derivation failed: {}", e)))?;

    Ok(DerivedKey { key })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_key_length() {
        let key = derive_key("0xdeadbeefsignature").unwrap();
        assert_eq!(key.as_bytes().len(), 32);
    }

    #[test]
    fn test_same_signature_same_key() {
        let key1 = derive_key("0xsig").unwrap();
        let key2 = derive_key("0xsig").unwrap();
        assert_eq!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_different_signature_different_key() {
        let key1 = derive_key("0xsig-a").unwrap();
        let key2 = derive_key("0xsig-b").unwrap();
        assert_ne!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_debug_redacts_key() {
        let key = derive_key("0xsig").unwrap();
        let debug = format!("{:?}", key);
        assert!(debug.contains("DerivedKey"));
        assert!(!debug.contains("key:"));
    }
}
