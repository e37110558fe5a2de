//! Device key lifecycle: derive once, cache, reuse.

use crate::error::CryptoResult;
use crate::fingerprint::DeviceFingerprint;
use crate::key::{DeviceKey, derive_device_key};
use std::sync::RwLock;
use tracing::{debug, warn};

/// Fixed storage name for the persisted fingerprint. Lives outside the
/// secure store's namespaced scheme so it survives envelope-format changes.
pub const FINGERPRINT_CACHE_NAME: &str = "moneta_device_fingerprint";

/// Fixed storage name for the persisted derived key (base64).
pub const DEVICE_KEY_CACHE_NAME: &str = "moneta_device_key";

/// Plain string cache for device-local artifacts (fingerprint, derived key).
///
/// Implemented by the storage backend. Writes are best-effort from the key
/// service's point of view: a failed `store` is logged and ignored.
pub trait KeyCache {
    fn load(&self, name: &str) -> Option<String>;
    fn store(&self, name: &str, value: &str) -> CryptoResult<()>;
}

/// Derives and caches the per-device symmetric key.
///
/// A single instance is constructed at startup and injected wherever key
/// material is needed; no other component derives its own copy.
#[derive(Default)]
pub struct DeviceKeyService {
    cached: RwLock<Option<DeviceKey>>,
}

impl DeviceKeyService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the device key, deriving and persisting it on first use.
    ///
    /// Resolution order: in-memory cache → persisted key → derivation from
    /// the (persisted-or-new) fingerprint. Persisting either artifact is
    /// best-effort — on failure the in-memory key serves the session.
    /// This operation never fails.
    pub fn get_or_create(&self, cache: &dyn KeyCache) -> DeviceKey {
        if let Some(key) = self.cached.read().unwrap().clone() {
            return key;
        }

        let key = self.resolve(cache);
        *self.cached.write().unwrap() = Some(key.clone());
        key
    }

    /// Drops the in-memory key so the next use re-resolves it.
    /// Used by full-wipe flows after clearing the persisted artifacts.
    pub fn forget(&self) {
        *self.cached.write().unwrap() = None;
    }

    fn resolve(&self, cache: &dyn KeyCache) -> DeviceKey {
        if let Some(stored) = cache.load(DEVICE_KEY_CACHE_NAME) {
            match DeviceKey::from_base64(&stored) {
                Ok(key) => return key,
                Err(e) => warn!("stored device key unreadable, re-deriving: {e}"),
            }
        }

        let fingerprint = match cache.load(FINGERPRINT_CACHE_NAME) {
            Some(stored) => DeviceFingerprint::from_string(stored),
            None => {
                let fp = DeviceFingerprint::generate();
                if let Err(e) = cache.store(FINGERPRINT_CACHE_NAME, fp.as_str()) {
                    warn!("could not persist device fingerprint: {e}");
                }
                fp
            }
        };

        debug!("deriving device key from fingerprint");
        let key = derive_device_key(&fingerprint);

        if let Err(e) = cache.store(DEVICE_KEY_CACHE_NAME, &key.to_base64()) {
            warn!("could not persist device key, using in-memory key for this session: {e}");
        }

        key
    }
}
