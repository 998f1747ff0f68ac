//! Wallet session and signing collaborator interfaces
//!
//! The core never interprets signatures cryptographically; it only feeds
//! them to key derivation. The wallet itself lives outside this crate and is
//! reached through the [`Signer`] trait.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::crypto::DerivedKey;
use crate::error::LedgerResult;

/// The active wallet session as persisted by the wallet collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletSession {
    /// The connected identity address
    pub address: String,

    /// When the wallet connected
    #[serde(rename = "connectedAt")]
    pub connected_at: DateTime<Utc>,
}

impl WalletSession {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            connected_at: Utc::now(),
        }
    }
}

/// Case-insensitive address comparison.
///
/// Wallet addresses round-trip through collaborators with inconsistent hex
/// casing, so identity checks must never be byte-exact.
pub fn same_address(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

/// The external signing collaborator
///
/// `sign` may suspend for user interaction; the core treats the returned
/// signature as an opaque key-derivation input.
pub trait Signer {
    /// The identity address this signer signs for
    fn address(&self) -> LedgerResult<String>;

    /// Produce a signature over a challenge message
    fn sign(&self, message: &str) -> LedgerResult<String>;
}

/// Session-scoped encryption state: the derived key plus the identity that
/// derived it. Held only in memory, dropped on logout or identity change.
/// Never ambient: it is injected into the storage operations that need it.
#[derive(Clone)]
pub struct EncryptionContext {
    pub address: String,
    pub key: Arc<DerivedKey>,
}

impl EncryptionContext {
    pub fn new(address: impl Into<String>, key: DerivedKey) -> Self {
        Self {
            address: address.into(),
            key: Arc::new(key),
        }
    }

    /// Whether this context belongs to the given identity
    pub fn matches(&self, address: &str) -> bool {
        same_address(&self.address, address)
    }
}

impl std::fmt::Debug for EncryptionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptionContext")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}
