//! Cryptographic functions for ledgerkeep
//!
//! Provides AES-256-GCM encryption with Argon2id key derivation from a
//! wallet-produced signature, for optional at-rest encryption of ledger data.

pub mod encryption;
pub mod key_derivation;

pub use encryption::{decrypt_blob, encrypt_blob};
pub use key_derivation::{derive_key, DerivedKey, UNLOCK_CHALLENGE};
