//! Dual-encoding record envelope
//!
//! Every protected record is persisted in one of two encodings: structured
//! plaintext JSON or an encrypted base64 blob. New writes carry an explicit
//! `mode` tag; reads also accept two legacy untagged forms for stores written
//! before the tag existed:
//!
//! - bare JSON that decodes as the record type  => plaintext
//! - anything else                              => assumed encrypted blob
//!
//! The legacy fallback is a documented heuristic with a known failure mode:
//! corrupted untagged plaintext is indistinguishable from ciphertext and will
//! be treated as encrypted.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a persisted record is plaintext-structured or an encrypted blob
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageMode {
    Plaintext,
    Encrypted,
}

impl fmt::Display for StorageMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plaintext => write!(f, "plaintext"),
            Self::Encrypted => write!(f, "encrypted"),
        }
    }
}

/// The tagged on-disk envelope for a protected record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum RecordEnvelope {
    /// Structured plaintext payload
    Plaintext { data: serde_json::Value },
    /// base64(nonce || ciphertext) payload
    Encrypted { blob: String },
}

impl RecordEnvelope {
    pub fn mode(&self) -> StorageMode {
        match self {
            Self::Plaintext { .. } => StorageMode::Plaintext,
            Self::Encrypted { .. } => StorageMode::Encrypted,
        }
    }
}

/// Classification of raw persisted bytes
#[derive(Debug, Clone)]
pub enum ParsedRecord {
    /// Tagged envelope (current format)
    Envelope(RecordEnvelope),
    /// Untagged JSON value (legacy plaintext)
    LegacyPlaintext(serde_json::Value),
    /// Undecodable as either; assumed legacy encrypted blob
    LegacyBlob(String),
}

impl ParsedRecord {
    pub fn mode(&self) -> StorageMode {
        match self {
            Self::Envelope(env) => env.mode(),
            Self::LegacyPlaintext(_) => StorageMode::Plaintext,
            Self::LegacyBlob(_) => StorageMode::Encrypted,
        }
    }
}

/// Classify raw record text.
///
/// Tagged envelopes win; untagged JSON is legacy plaintext; everything else
/// is assumed to be a legacy encrypted blob (the heuristic described in the
/// module docs).
pub fn parse_record(raw: &str) -> ParsedRecord {
    if let Ok(envelope) = serde_json::from_str::<RecordEnvelope>(raw) {
        return ParsedRecord::Envelope(envelope);
    }
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(raw) {
        return ParsedRecord::LegacyPlaintext(value);
    }
    ParsedRecord::LegacyBlob(raw.trim().to_string())
}
