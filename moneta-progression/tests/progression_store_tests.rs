use chrono::NaiveDate;
use moneta_crypto::{DeviceFingerprint, EncryptionCodec, derive_device_key};
use moneta_progression::{PROGRESSION_RECORD, Progression, ProgressionStore, definition};
use moneta_store::{KvBackend, LocalStore, SecureKvStore};
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn test_parts() -> (LocalStore, ProgressionStore) {
    let backend = LocalStore::open_in_memory().unwrap();
    let codec = EncryptionCodec::new(derive_device_key(&DeviceFingerprint::from_string("test")));
    let store = Arc::new(SecureKvStore::new(Box::new(backend.clone()), Box::new(codec)));
    (backend, ProgressionStore::new(store))
}

fn worked_state() -> Progression {
    let mut p = Progression::new();
    p.add_xp(100, "income");
    p.update_activity_on(NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());
    p.unlock(definition("first_income").unwrap());
    p
}

// ── Persistence ──────────────────────────────────────────────────

#[test]
fn fresh_store_loads_initial_state() {
    let (_backend, store) = test_parts();
    assert_eq!(store.load(), Progression::new());
}

#[test]
fn save_load_roundtrip() {
    let (_backend, store) = test_parts();
    let state = worked_state();

    store.save(&state).unwrap();
    assert_eq!(store.load(), state);
}

#[test]
fn record_is_encrypted_at_rest() {
    let (backend, store) = test_parts();
    store.save(&worked_state()).unwrap();

    let blob = backend.get("sec.gamification").unwrap().unwrap();
    assert!(blob.starts_with("mv1:"));
    assert!(!blob.contains("first_income"));
    assert_eq!(backend.get(PROGRESSION_RECORD).unwrap(), None);
}

#[test]
fn legacy_plaintext_record_migrates() {
    let (backend, store) = test_parts();
    let state = worked_state();

    // A pre-encryption record: bare JSON under the unprefixed name
    backend
        .set(
            PROGRESSION_RECORD,
            &serde_json::to_string(&state).unwrap(),
        )
        .unwrap();

    assert_eq!(store.load(), state);
    assert_eq!(backend.get(PROGRESSION_RECORD).unwrap(), None);
    assert!(backend.get("sec.gamification").unwrap().is_some());
}

#[test]
fn unreadable_record_starts_fresh() {
    let (backend, store) = test_parts();
    backend.set("sec.gamification", "mv1:not-a-real-blob").unwrap();
    assert_eq!(store.load(), Progression::new());
}

// ── Reset ────────────────────────────────────────────────────────

#[test]
fn reset_clears_state_and_storage() {
    let (backend, store) = test_parts();
    let mut state = worked_state();
    store.save(&state).unwrap();

    store.reset(&mut state).unwrap();

    assert_eq!(state, Progression::new());
    assert_eq!(backend.get("sec.gamification").unwrap(), None);
    assert_eq!(store.load(), Progression::new());
}
