//! Typed stores for the application's well-known records.
//!
//! Each record is independently named and independently encrypted; the
//! progression record has its own store in `moneta-progression`.

use crate::adapter::{PersistenceAdapter, StorageRecord};
use crate::error::StoreResult;
use crate::secure_store::SecureKvStore;
use moneta_model::{Settings, Transaction};
use std::sync::Arc;

/// Record name for the transactions ledger.
pub const TRANSACTIONS_RECORD: &str = "transactions";

/// Record name for user settings.
pub const SETTINGS_RECORD: &str = "settings";

const LEDGER_VERSION: u64 = 1;
const SETTINGS_VERSION: u64 = 1;

/// Persisted transactions ledger.
#[derive(Clone)]
pub struct TransactionLedger {
    adapter: PersistenceAdapter,
}

impl TransactionLedger {
    pub fn new(store: Arc<SecureKvStore>) -> Self {
        Self {
            adapter: PersistenceAdapter::new(store),
        }
    }

    /// Loads the ledger; a missing or unreadable record is an empty ledger.
    pub fn load(&self) -> Vec<Transaction> {
        self.adapter
            .load(TRANSACTIONS_RECORD)
            .and_then(|record| serde_json::from_value(record.payload).ok())
            .unwrap_or_default()
    }

    pub fn save(&self, transactions: &[Transaction]) -> StoreResult<()> {
        self.adapter.save(&StorageRecord {
            name: TRANSACTIONS_RECORD.to_string(),
            version: LEDGER_VERSION,
            payload: serde_json::to_value(transactions)?,
        })
    }

    /// Appends one transaction and persists the ledger.
    pub fn append(&self, transaction: Transaction) -> StoreResult<Vec<Transaction>> {
        let mut transactions = self.load();
        transactions.push(transaction);
        self.save(&transactions)?;
        Ok(transactions)
    }

    pub fn clear(&self) -> StoreResult<()> {
        self.adapter.remove(TRANSACTIONS_RECORD)
    }
}

/// Persisted user settings.
#[derive(Clone)]
pub struct SettingsStore {
    adapter: PersistenceAdapter,
}

impl SettingsStore {
    pub fn new(store: Arc<SecureKvStore>) -> Self {
        Self {
            adapter: PersistenceAdapter::new(store),
        }
    }

    /// Loads settings, falling back to defaults when nothing is stored.
    pub fn load(&self) -> Settings {
        self.adapter
            .load(SETTINGS_RECORD)
            .and_then(|record| serde_json::from_value(record.payload).ok())
            .unwrap_or_default()
    }

    pub fn save(&self, settings: &Settings) -> StoreResult<()> {
        self.adapter.save(&StorageRecord {
            name: SETTINGS_RECORD.to_string(),
            version: SETTINGS_VERSION,
            payload: serde_json::to_value(settings)?,
        })
    }
}
