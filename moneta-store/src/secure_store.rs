//! Encrypted key-value facade with legacy-plaintext migration.
//!
//! Values are serialized to JSON, encrypted, and stored under a namespaced
//! key. Reads walk an explicit chain of stored forms — encrypted, then
//! legacy plaintext, then missing — migrating legacy records to the
//! encrypted form as a side effect, so any read that finds data in *some*
//! form succeeds and subsequent reads hit the encrypted path only.

use crate::backend::{KvBackend, LocalStore};
use crate::error::StoreResult;
use moneta_crypto::{DeviceKeyService, EncryptionCodec, TextCodec};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::{debug, warn};

/// Prefix for encrypted entries. Unprefixed names are the legacy
/// plaintext forms kept only for one-time migration.
pub const NAMESPACE_PREFIX: &str = "sec.";

/// Legacy record names from the pre-encryption era; `clear` removes these
/// even when no namespaced counterpart exists.
const KNOWN_LEGACY_NAMES: &[&str] = &["transactions", "gamification", "settings"];

/// The form a named record was found in, checked in order.
#[derive(Debug)]
enum StoredForm {
    Encrypted(String),
    LegacyPlaintext(String),
    Missing,
}

/// Key-value store with transparent at-rest encryption.
pub struct SecureKvStore {
    backend: Box<dyn KvBackend>,
    codec: Box<dyn TextCodec>,
}

impl SecureKvStore {
    pub fn new(backend: Box<dyn KvBackend>, codec: Box<dyn TextCodec>) -> Self {
        Self { backend, codec }
    }

    /// Opens a store at `path`, resolving the device key through the
    /// backend itself (the key artifacts live under fixed unprefixed names).
    pub fn open(path: &Path) -> StoreResult<Self> {
        Self::from_backend(LocalStore::open(path)?)
    }

    /// In-memory store with a real device key (for testing).
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::from_backend(LocalStore::open_in_memory()?)
    }

    fn from_backend(backend: LocalStore) -> StoreResult<Self> {
        let key = DeviceKeyService::new().get_or_create(&backend);
        Ok(Self::new(Box::new(backend), Box::new(EncryptionCodec::new(key))))
    }

    /// Serializes and encrypts `value` under the namespaced form of `name`.
    ///
    /// Serialization failures propagate (silently dropping user data is
    /// unacceptable). Encryption failures degrade to a plaintext write
    /// under the unprefixed name — availability over confidentiality.
    /// Backend write failures (quota) are logged and swallowed.
    pub fn set<T: Serialize>(&self, name: &str, value: &T) -> StoreResult<()> {
        let json = serde_json::to_string(value)?;

        match self.codec.encrypt_text(&json) {
            Ok(blob) => {
                if self.write_best_effort(&self.namespaced(name), &blob) {
                    // A surviving pre-migration copy would shadow this
                    // write on a later recovery read
                    self.remove_legacy_best_effort(name);
                }
            }
            Err(e) => {
                warn!("encryption failed for '{name}', storing plaintext fallback: {e}");
                self.write_best_effort(name, &json);
            }
        }
        Ok(())
    }

    /// Reads a named record, trying each stored form in order.
    ///
    /// Returns `None` for missing or unrecoverably corrupt records — this
    /// never fails the caller.
    pub fn get<T: DeserializeOwned>(&self, name: &str) -> Option<T> {
        match self.locate(name) {
            StoredForm::Encrypted(blob) => match self.codec.decrypt_text(&blob) {
                Ok(json) => match serde_json::from_str(&json) {
                    Ok(value) => Some(value),
                    Err(e) => {
                        warn!("stored record '{name}' failed to deserialize: {e}");
                        self.recover_from_legacy(name)
                    }
                },
                Err(e) => {
                    warn!("stored record '{name}' failed to decrypt: {e}");
                    self.recover_from_legacy(name)
                }
            },
            StoredForm::LegacyPlaintext(json) => self.migrate_legacy(name, &json),
            StoredForm::Missing => None,
        }
    }

    /// Removes both the namespaced and legacy forms of `name`, so a stale
    /// plaintext copy can never resurrect through a later migration.
    pub fn remove(&self, name: &str) -> StoreResult<()> {
        self.backend.remove(&self.namespaced(name))?;
        self.backend.remove(name)?;
        Ok(())
    }

    /// Removes every namespaced entry plus the known legacy names.
    pub fn clear(&self) -> StoreResult<()> {
        for key in self.backend.keys_with_prefix(NAMESPACE_PREFIX)? {
            self.backend.remove(&key)?;
        }
        for name in KNOWN_LEGACY_NAMES {
            self.backend.remove(name)?;
        }
        Ok(())
    }

    fn namespaced(&self, name: &str) -> String {
        format!("{NAMESPACE_PREFIX}{name}")
    }

    fn locate(&self, name: &str) -> StoredForm {
        match self.backend.get(&self.namespaced(name)) {
            Ok(Some(blob)) => return StoredForm::Encrypted(blob),
            Ok(None) => {}
            Err(e) => warn!("backend read failed for '{name}': {e}"),
        }
        match self.backend.get(name) {
            Ok(Some(json)) => StoredForm::LegacyPlaintext(json),
            Ok(None) => StoredForm::Missing,
            Err(e) => {
                warn!("backend read failed for legacy '{name}': {e}");
                StoredForm::Missing
            }
        }
    }

    /// Fallback when the encrypted form is unreadable: a legacy plaintext
    /// entry, if one survived, still carries the data.
    fn recover_from_legacy<T: DeserializeOwned>(&self, name: &str) -> Option<T> {
        let json = self.backend.get(name).ok().flatten()?;
        self.migrate_legacy(name, &json)
    }

    /// Parses a legacy plaintext record and migrates it to the encrypted
    /// form. The legacy entry is deleted only once the encrypted write
    /// succeeded.
    fn migrate_legacy<T: DeserializeOwned>(&self, name: &str, json: &str) -> Option<T> {
        let value: T = match serde_json::from_str(json) {
            Ok(v) => v,
            Err(e) => {
                warn!("legacy record '{name}' is unreadable: {e}");
                return None;
            }
        };

        debug!("migrating legacy plaintext record '{name}' to encrypted storage");
        match self.codec.encrypt_text(json) {
            Ok(blob) => {
                if self.backend.set(&self.namespaced(name), &blob).is_ok() {
                    self.remove_legacy_best_effort(name);
                } else {
                    warn!("could not store migrated record '{name}', keeping legacy form");
                }
            }
            Err(e) => warn!("could not re-encrypt legacy record '{name}': {e}"),
        }

        Some(value)
    }

    /// Returns whether the write landed.
    fn write_best_effort(&self, key: &str, value: &str) -> bool {
        match self.backend.set(key, value) {
            Ok(()) => true,
            Err(e) => {
                warn!("write failed for '{key}' (continuing without persistence): {e}");
                false
            }
        }
    }

    fn remove_legacy_best_effort(&self, name: &str) {
        if let Err(e) = self.backend.remove(name) {
            warn!("could not delete legacy record '{name}': {e}");
        }
    }
}
