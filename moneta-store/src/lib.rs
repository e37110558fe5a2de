//! Encrypted local persistence for Moneta.
//!
//! A DuckDB-backed key-value table carries every persisted record. The
//! secure store serializes values to JSON, encrypts them with the device
//! key, and namespaces the entries; plaintext records from the
//! pre-encryption era migrate transparently on first read. The persistence
//! adapter wraps payloads in the `{state, version}` envelope that state
//! containers expect.
//!
//! Degradation policy: encryption failures fall back to plaintext writes,
//! quota failures are logged and swallowed, unreadable records read as
//! absent. Only serialization failures on the write path surface to the
//! caller.

mod adapter;
mod backend;
mod error;
pub mod records;
mod secure_store;

pub use adapter::{Envelope, PersistenceAdapter, StorageRecord, normalize_envelope};
pub use backend::{KvBackend, LocalStore};
pub use error::{StoreError, StoreResult};
pub use secure_store::{NAMESPACE_PREFIX, SecureKvStore};
