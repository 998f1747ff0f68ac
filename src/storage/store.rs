//! Generic persisted record store with dual encoding
//!
//! [`EncryptedStore`] persists one logical record either as tagged plaintext
//! JSON or as an AES-GCM blob, and answers mode queries without a key. Wrong
//! mode access is an explicit error; the caller decides the mode by asking
//! `is_encrypted()` first (or by holding a session key).

use std::marker::PhantomData;
use std::path::PathBuf;

use serde::{de::DeserializeOwned, Serialize};

use crate::crypto::{decrypt_blob, encrypt_blob, DerivedKey};
use crate::error::{LedgerError, LedgerResult};

use super::file_io::{read_string_opt, write_string_atomic};
use super::record::{parse_record, ParsedRecord, RecordEnvelope, StorageMode};

/// A persisted key/value record that can hold either encoding
pub struct EncryptedStore<T> {
    path: PathBuf,
    /// Stable record name used in error messages
    name: &'static str,
    _marker: PhantomData<T>,
}

impl<T> EncryptedStore<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    pub fn new(path: PathBuf, name: &'static str) -> Self {
        Self {
            path,
            name,
            _marker: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Check whether a record file exists at all
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Determine the record's current storage mode, None if absent.
    ///
    /// Tagged records answer from their mode field; legacy records fall back
    /// to the parse heuristic in [`super::record`].
    pub fn mode(&self) -> LedgerResult<Option<StorageMode>> {
        match read_string_opt(&self.path)? {
            None => Ok(None),
            Some(raw) => Ok(Some(parse_record(&raw).mode())),
        }
    }

    /// Mode-detection heuristic: true only when the persisted bytes do not
    /// read back as plaintext. An absent record counts as not encrypted. A
    /// read failure propagates so callers never mistake it for plaintext.
    pub fn is_encrypted(&self) -> LedgerResult<bool> {
        Ok(matches!(self.mode()?, Some(StorageMode::Encrypted)))
    }

    /// Save the record as tagged plaintext JSON
    pub fn save_plain(&self, value: &T) -> LedgerResult<()> {
        let data = serde_json::to_value(value)
            .map_err(|e| LedgerError::Json(format!("Failed to serialize {}: {}", self.name, e)))?;
        let envelope = RecordEnvelope::Plaintext { data };
        self.write_envelope(&envelope)
    }

    /// Save the record as a tagged encrypted blob
    pub fn save_encrypted(&self, value: &T, key: &DerivedKey) -> LedgerResult<()> {
        let plaintext = serde_json::to_vec(value)
            .map_err(|e| LedgerError::Json(format!("Failed to serialize {}: {}", self.name, e)))?;
        let blob = encrypt_blob(&plaintext, key)?;
        let envelope = RecordEnvelope::Encrypted { blob };
        self.write_envelope(&envelope)
    }

    /// Load a plaintext record. Absent file yields `T::default()`.
    ///
    /// Encountering an encrypted record here is a caller mode error, surfaced
    /// explicitly rather than returning empty data.
    pub fn load_plain(&self) -> LedgerResult<T> {
        let raw = match read_string_opt(&self.path)? {
            None => return Ok(T::default()),
            Some(raw) => raw,
        };

        match parse_record(&raw) {
            ParsedRecord::Envelope(RecordEnvelope::Plaintext { data }) => {
                serde_json::from_value(data)
                    .map_err(|e| LedgerError::corrupted(self.name, e.to_string()))
            }
            ParsedRecord::LegacyPlaintext(value) => serde_json::from_value(value)
                .map_err(|e| LedgerError::corrupted(self.name, e.to_string())),
            ParsedRecord::Envelope(RecordEnvelope::Encrypted { .. })
            | ParsedRecord::LegacyBlob(_) => Err(LedgerError::Encryption(format!(
                "{} record is encrypted; a key is required",
                self.name
            ))),
        }
    }

    /// Load and decrypt an encrypted record. Absent file yields `T::default()`.
    pub fn load_encrypted(&self, key: &DerivedKey) -> LedgerResult<T> {
        let raw = match read_string_opt(&self.path)? {
            None => return Ok(T::default()),
            Some(raw) => raw,
        };

        let blob = match parse_record(&raw) {
            ParsedRecord::Envelope(RecordEnvelope::Encrypted { blob }) => blob,
            ParsedRecord::LegacyBlob(blob) => blob,
            ParsedRecord::Envelope(RecordEnvelope::Plaintext { .. })
            | ParsedRecord::LegacyPlaintext(_) => {
                return Err(LedgerError::Encryption(format!(
                    "{} record is plaintext; refusing keyed load",
                    self.name
                )))
            }
        };

        let plaintext = decrypt_blob(&blob, key)?;
        serde_json::from_slice(&plaintext)
            .map_err(|e| LedgerError::corrupted(self.name, e.to_string()))
    }

    /// Load in whatever mode the record is currently in
    pub fn load_auto(&self, key: Option<&DerivedKey>) -> LedgerResult<T> {
        match self.mode()? {
            None => Ok(T::default()),
            Some(StorageMode::Plaintext) => self.load_plain(),
            Some(StorageMode::Encrypted) => match key {
                Some(key) => self.load_encrypted(key),
                None => Err(LedgerError::Encryption(format!(
                    "{} record is encrypted; a key is required",
                    self.name
                ))),
            },
        }
    }

    fn write_envelope(&self, envelope: &RecordEnvelope) -> LedgerResult<()> {
        let json = serde_json::to_string_pretty(envelope)
            .map_err(|e| LedgerError::Json(format!("Failed to serialize {}: {}", self.name, e)))?;
        write_string_atomic(&self.path, &json)
    }
}
