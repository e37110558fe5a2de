use moneta_crypto::{
    CryptoError, CryptoResult, DEVICE_KEY_CACHE_NAME, DeviceKeyService, EncryptionCodec,
    FINGERPRINT_CACHE_NAME, KeyCache,
};
use std::collections::HashMap;
use std::sync::Mutex;

/// In-memory key cache standing in for the storage backend.
#[derive(Default)]
struct MemoryCache {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryCache {
    fn get(&self, name: &str) -> Option<String> {
        self.entries.lock().unwrap().get(name).cloned()
    }

    fn remove(&self, name: &str) {
        self.entries.lock().unwrap().remove(name);
    }
}

impl KeyCache for MemoryCache {
    fn load(&self, name: &str) -> Option<String> {
        self.get(name)
    }

    fn store(&self, name: &str, value: &str) -> CryptoResult<()> {
        self.entries
            .lock()
            .unwrap()
            .insert(name.to_string(), value.to_string());
        Ok(())
    }
}

/// Cache whose writes always fail (storage full).
struct FullCache;

impl KeyCache for FullCache {
    fn load(&self, _name: &str) -> Option<String> {
        None
    }

    fn store(&self, _name: &str, _value: &str) -> CryptoResult<()> {
        Err(CryptoError::Cache("quota exceeded".into()))
    }
}

// ── Derivation and caching ───────────────────────────────────────

#[test]
fn first_call_persists_fingerprint_and_key() {
    let cache = MemoryCache::default();
    let service = DeviceKeyService::new();

    let key = service.get_or_create(&cache);

    assert!(cache.get(FINGERPRINT_CACHE_NAME).is_some());
    let stored = cache.get(DEVICE_KEY_CACHE_NAME).unwrap();
    assert_eq!(stored, key.to_base64());
}

#[test]
fn repeated_calls_return_same_key() {
    let cache = MemoryCache::default();
    let service = DeviceKeyService::new();

    let a = service.get_or_create(&cache);
    let b = service.get_or_create(&cache);
    assert_eq!(a.as_bytes(), b.as_bytes());
}

#[test]
fn stored_key_wins_over_rederivation() {
    let cache = MemoryCache::default();
    let service = DeviceKeyService::new();
    let original = service.get_or_create(&cache);

    // A second service instance (fresh process) must pick up the stored key
    let service2 = DeviceKeyService::new();
    let resumed = service2.get_or_create(&cache);
    assert_eq!(original.as_bytes(), resumed.as_bytes());
}

#[test]
fn lost_key_rederives_from_persisted_fingerprint() {
    let cache = MemoryCache::default();
    let service = DeviceKeyService::new();
    let original = service.get_or_create(&cache);

    cache.remove(DEVICE_KEY_CACHE_NAME);
    service.forget();

    let rederived = service.get_or_create(&cache);
    assert_eq!(original.as_bytes(), rederived.as_bytes());
}

#[test]
fn corrupt_stored_key_falls_back_to_derivation() {
    let cache = MemoryCache::default();
    cache.store(DEVICE_KEY_CACHE_NAME, "not base64 at all!").unwrap();

    let service = DeviceKeyService::new();
    let key = service.get_or_create(&cache);

    // Re-derivation overwrote the corrupt entry with a usable one
    let stored = cache.get(DEVICE_KEY_CACHE_NAME).unwrap();
    assert_eq!(stored, key.to_base64());
}

// ── Degraded storage ─────────────────────────────────────────────

#[test]
fn failing_cache_still_yields_working_key() {
    let service = DeviceKeyService::new();
    let key = service.get_or_create(&FullCache);

    // The in-memory key must be fully functional for the session
    let codec = EncryptionCodec::new(key.clone());
    let blob = codec.encrypt("still works").unwrap();
    assert_eq!(codec.decrypt(&blob).unwrap(), "still works");

    // And stable across calls within the same service
    let again = service.get_or_create(&FullCache);
    assert_eq!(key.as_bytes(), again.as_bytes());
}
