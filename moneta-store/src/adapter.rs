//! Envelope handling between state containers and the secure store.
//!
//! Consumers persist named, versioned blobs. On disk those live inside a
//! `{state, version}` envelope; values written before the envelope era are
//! bare. All shape-sniffing happens in [`normalize_envelope`] — the rest of
//! the core only ever sees a consistent envelope.

use crate::error::StoreResult;
use crate::secure_store::SecureKvStore;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// The wrapper a state container expects around its persisted payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub state: Value,
    pub version: u64,
}

/// A named, versioned blob as seen by consumers. `version` is
/// caller-supplied and passes through storage unchanged.
#[derive(Clone, Debug, PartialEq)]
pub struct StorageRecord {
    pub name: String,
    pub version: u64,
    pub payload: Value,
}

/// Interprets a stored value as an envelope.
///
/// Only an object with exactly the keys `state` and a numeric `version`
/// counts; anything else is a pre-envelope value and gets wrapped as
/// version 0.
pub fn normalize_envelope(value: Value) -> Envelope {
    match parse_envelope(&value) {
        Some(envelope) => envelope,
        None => Envelope {
            state: value,
            version: 0,
        },
    }
}

/// The single envelope shape-sniff; both the read-path normalization and
/// the write-path double-wrap check go through here.
fn parse_envelope(value: &Value) -> Option<Envelope> {
    let map = value.as_object()?;
    if map.len() != 2 {
        return None;
    }
    Some(Envelope {
        state: map.get("state")?.clone(),
        version: map.get("version")?.as_u64()?,
    })
}

fn is_envelope(value: &Value) -> bool {
    parse_envelope(value).is_some()
}

/// Bridges the named-versioned-blob persistence contract onto the secure
/// store.
#[derive(Clone)]
pub struct PersistenceAdapter {
    store: Arc<SecureKvStore>,
}

impl PersistenceAdapter {
    pub fn new(store: Arc<SecureKvStore>) -> Self {
        Self { store }
    }

    /// Persists a record, wrapping the payload into the envelope unless the
    /// caller already supplied one.
    pub fn save(&self, record: &StorageRecord) -> StoreResult<()> {
        if is_envelope(&record.payload) {
            return self.store.set(&record.name, &record.payload);
        }
        let envelope = Envelope {
            state: record.payload.clone(),
            version: record.version,
        };
        self.store.set(&record.name, &envelope)
    }

    /// Loads a record, normalizing whatever stored shape is found so the
    /// consumer always observes the envelope contract.
    pub fn load(&self, name: &str) -> Option<StorageRecord> {
        let value: Value = self.store.get(name)?;
        let envelope = normalize_envelope(value);
        Some(StorageRecord {
            name: name.to_string(),
            version: envelope.version,
            payload: envelope.state,
        })
    }

    pub fn remove(&self, name: &str) -> StoreResult<()> {
        self.store.remove(name)
    }
}
