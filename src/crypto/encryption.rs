//! AES-256-GCM blob encryption/decryption
//!
//! On-disk form is a single base64 string of nonce || ciphertext. A fresh
//! random nonce is generated per write and prepended to the ciphertext;
//! decryption splits the prefix back off before the authenticated-decrypt
//! call.

use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::{
    aead::{Aead, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::STANDARD, Engine};

use crate::error::{LedgerError, LedgerResult};

use super::DerivedKey;

/// Size of the AES-GCM nonce in bytes (96 bits)
const NONCE_SIZE: usize = 12;

/// Encrypt plaintext into a transportable base64 blob
pub fn encrypt_blob(plaintext: &[u8], key: &DerivedKey) -> LedgerResult<String> {
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| LedgerError::Encryption(format!("Failed to create cipher: {}", e)))?;

    let mut nonce_bytes = [0u8; NONCE_SIZE];
    OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, plaintext)
        .map_err(|e| LedgerError::Encryption(format!("Encryption failed: {}", e)))?;

    let mut blob = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    blob.extend_from_slice(&nonce_bytes);
    blob.extend_from_slice(&ciphertext);

    Ok(STANDARD.encode(blob))
}

/// Decrypt a base64 blob produced by [`encrypt_blob`]
///
/// Malformed base64 and truncated blobs fail cleanly with an
/// [`LedgerError::Encryption`] rather than panicking.
pub fn decrypt_blob(blob: &str, key: &DerivedKey) -> LedgerResult<Vec<u8>> {
    let bytes = STANDARD
        .decode(blob.trim())
        .map_err(|e| LedgerError::Encryption(format!("Invalid blob encoding: {}", e)))?;

    if bytes.len() < NONCE_SIZE {
        return Err(LedgerError::Encryption(format!(
            "Blob too short: {} bytes, need at least {}",
            bytes.len(),
            NONCE_SIZE
        )));
    }

    let (nonce_bytes, ciphertext) = bytes.split_at(NONCE_SIZE);
    let nonce = Nonce::from_slice(nonce_bytes);

    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| LedgerError::Encryption(format!("Failed to create cipher: {}", e)))?;

    cipher.decrypt(nonce, ciphertext).map_err(|_| {
        LedgerError::Encryption("Decryption failed: invalid key or corrupted data".to_string())
    })
}
