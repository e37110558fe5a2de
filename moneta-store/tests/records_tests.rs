use chrono::{TimeZone, Utc};
use moneta_crypto::{DeviceFingerprint, EncryptionCodec, derive_device_key};
use moneta_model::{Settings, Transaction, TransactionType};
use moneta_store::records::{SettingsStore, TransactionLedger};
use moneta_store::{KvBackend, LocalStore, SecureKvStore};
use std::sync::Arc;

fn test_parts() -> (LocalStore, Arc<SecureKvStore>) {
    let backend = LocalStore::open_in_memory().unwrap();
    let codec = EncryptionCodec::new(derive_device_key(&DeviceFingerprint::from_string("test")));
    let store = Arc::new(SecureKvStore::new(Box::new(backend.clone()), Box::new(codec)));
    (backend, store)
}

fn tx(amount: f64, tx_type: TransactionType) -> Transaction {
    Transaction {
        id: format!("tx-{amount}"),
        tx_type,
        amount,
        category: "food".into(),
        description: String::new(),
        date: Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap(),
        created_at: Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap(),
    }
}

// ── Transactions ledger ──────────────────────────────────────────

#[test]
fn fresh_ledger_is_empty() {
    let (_backend, store) = test_parts();
    assert!(TransactionLedger::new(store).load().is_empty());
}

#[test]
fn ledger_roundtrip() {
    let (_backend, store) = test_parts();
    let ledger = TransactionLedger::new(store);

    let entries = vec![
        tx(1200.0, TransactionType::Income),
        tx(45.0, TransactionType::Expense),
    ];
    ledger.save(&entries).unwrap();

    assert_eq!(ledger.load(), entries);
}

#[test]
fn append_grows_ledger() {
    let (_backend, store) = test_parts();
    let ledger = TransactionLedger::new(store);

    ledger.append(tx(100.0, TransactionType::Income)).unwrap();
    let after = ledger.append(tx(20.0, TransactionType::Expense)).unwrap();

    assert_eq!(after.len(), 2);
    assert_eq!(ledger.load().len(), 2);
}

#[test]
fn ledger_is_encrypted_at_rest() {
    let (backend, store) = test_parts();
    let ledger = TransactionLedger::new(store);
    ledger.save(&[tx(999.0, TransactionType::Income)]).unwrap();

    let blob = backend.get("sec.transactions").unwrap().unwrap();
    assert!(blob.starts_with("mv1:"));
    assert!(!blob.contains("food"));
    assert_eq!(backend.get("transactions").unwrap(), None);
}

#[test]
fn clear_empties_ledger() {
    let (_backend, store) = test_parts();
    let ledger = TransactionLedger::new(store);
    ledger.append(tx(10.0, TransactionType::Expense)).unwrap();

    ledger.clear().unwrap();
    assert!(ledger.load().is_empty());
}

// ── Settings ─────────────────────────────────────────────────────

#[test]
fn missing_settings_default() {
    let (_backend, store) = test_parts();
    let settings = SettingsStore::new(store).load();
    assert_eq!(settings, Settings::default());
    assert_eq!(settings.currency, "USD");
    assert!(settings.monthly_savings_goal.is_none());
}

#[test]
fn settings_roundtrip() {
    let (_backend, store) = test_parts();
    let settings_store = SettingsStore::new(store);

    let settings = Settings {
        monthly_savings_goal: Some(500.0),
        currency: "EUR".into(),
    };
    settings_store.save(&settings).unwrap();

    assert_eq!(settings_store.load(), settings);
}
