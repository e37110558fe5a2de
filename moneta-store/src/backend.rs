//! Raw key-value backend over DuckDB.

use crate::error::StoreResult;
use duckdb::{Connection, params};
use moneta_crypto::{CryptoError, CryptoResult, KeyCache};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Plain string key-value storage, no encryption awareness.
///
/// The secure store layers namespacing and encryption on top; the device
/// key service writes its fixed-name artifacts here directly.
pub trait KvBackend: Send + Sync {
    fn get(&self, key: &str) -> StoreResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;
    fn remove(&self, key: &str) -> StoreResult<()>;
    fn keys_with_prefix(&self, prefix: &str) -> StoreResult<Vec<String>>;
}

/// DuckDB-backed local store: a single `kv` table behind a shared
/// connection. Clones share the connection.
#[derive(Clone)]
pub struct LocalStore {
    conn: Arc<Mutex<Connection>>,
}

impl LocalStore {
    /// Opens (or creates) the store at the given path.
    pub fn open(path: &Path) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        // Cap memory/threads — DuckDB defaults to ~80% RAM per connection
        conn.execute_batch("PRAGMA memory_limit='64MB'; PRAGMA threads=1;")?;
        Self::with_connection(conn)
    }

    /// Opens an in-memory store (for testing).
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> StoreResult<Self> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key VARCHAR PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }
}

impl KvBackend for LocalStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT value FROM kv WHERE key = ?")?;
        let mut rows = stmt.query(params![key])?;
        match rows.next()? {
            Some(row) => Ok(Some(row.get(0)?)),
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?, ?)",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM kv WHERE key = ?", params![key])?;
        Ok(())
    }

    fn keys_with_prefix(&self, prefix: &str) -> StoreResult<Vec<String>> {
        let conn = self.conn.lock().unwrap();
        // LIKE-escape the prefix so '_' and '%' in names match literally
        let pattern = format!(
            "{}%",
            prefix.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
        );
        let mut stmt = conn.prepare("SELECT key FROM kv WHERE key LIKE ? ESCAPE '\\'")?;
        let keys = stmt
            .query_map(params![pattern], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(keys)
    }
}

/// The device key service persists its artifacts (fingerprint, derived key)
/// through the backend under fixed, unprefixed names.
impl KeyCache for LocalStore {
    fn load(&self, name: &str) -> Option<String> {
        KvBackend::get(self, name).ok().flatten()
    }

    fn store(&self, name: &str, value: &str) -> CryptoResult<()> {
        KvBackend::set(self, name, value).map_err(|e| CryptoError::Cache(e.to_string()))
    }
}
