use moneta_crypto::{DeviceFingerprint, EncryptionCodec, derive_device_key};
use moneta_store::{
    Envelope, LocalStore, PersistenceAdapter, SecureKvStore, StorageRecord, normalize_envelope,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;

fn test_adapter() -> (Arc<SecureKvStore>, PersistenceAdapter) {
    let backend = LocalStore::open_in_memory().unwrap();
    let codec = EncryptionCodec::new(derive_device_key(&DeviceFingerprint::from_string("test")));
    let store = Arc::new(SecureKvStore::new(Box::new(backend), Box::new(codec)));
    (store.clone(), PersistenceAdapter::new(store))
}

// ── Save / load ──────────────────────────────────────────────────

#[test]
fn roundtrip_preserves_version_and_payload() {
    let (_store, adapter) = test_adapter();
    let record = StorageRecord {
        name: "ledger".into(),
        version: 3,
        payload: json!({
            "entries": [{"amount": 12.5, "tags": ["a", "b"]}, {"amount": null}],
            "count": 2,
            "open": true,
        }),
    };

    adapter.save(&record).unwrap();
    let loaded = adapter.load("ledger").unwrap();

    assert_eq!(loaded, record);
}

#[test]
fn load_missing_returns_none() {
    let (_store, adapter) = test_adapter();
    assert!(adapter.load("absent").is_none());
}

#[test]
fn remove_deletes_record() {
    let (_store, adapter) = test_adapter();
    adapter
        .save(&StorageRecord {
            name: "ledger".into(),
            version: 1,
            payload: json!([1, 2, 3]),
        })
        .unwrap();

    adapter.remove("ledger").unwrap();
    assert!(adapter.load("ledger").is_none());
}

#[test]
fn pre_wrapped_payload_is_not_double_wrapped() {
    let (_store, adapter) = test_adapter();
    let record = StorageRecord {
        name: "ledger".into(),
        version: 0, // ignored: the payload carries its own envelope
        payload: json!({"state": {"entries": []}, "version": 5}),
    };

    adapter.save(&record).unwrap();
    let loaded = adapter.load("ledger").unwrap();

    assert_eq!(loaded.version, 5);
    assert_eq!(loaded.payload, json!({"entries": []}));
}

#[test]
fn bare_stored_value_normalizes_to_version_zero() {
    let (store, adapter) = test_adapter();
    // A record written before the envelope era: bare value, no wrapper
    store.set("ledger", &json!({"entries": [1, 2]})).unwrap();

    let loaded = adapter.load("ledger").unwrap();
    assert_eq!(loaded.version, 0);
    assert_eq!(loaded.payload, json!({"entries": [1, 2]}));
}

// ── Envelope normalization ───────────────────────────────────────

#[test]
fn normalize_recognizes_envelopes() {
    let env = normalize_envelope(json!({"state": [1], "version": 7}));
    assert_eq!(env, Envelope { state: json!([1]), version: 7 });
}

#[test]
fn normalize_wraps_everything_else() {
    // Extra keys disqualify the envelope shape
    let env = normalize_envelope(json!({"state": 1, "version": 2, "extra": 3}));
    assert_eq!(env.version, 0);
    assert_eq!(env.state, json!({"state": 1, "version": 2, "extra": 3}));

    // Non-numeric version disqualifies too
    let env = normalize_envelope(json!({"state": 1, "version": "two"}));
    assert_eq!(env.version, 0);

    // Scalars and arrays wrap as-is
    assert_eq!(normalize_envelope(json!(42)).state, json!(42));
    assert_eq!(normalize_envelope(json!([1, 2])).version, 0);
}
