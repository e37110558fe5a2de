//! Persistence for the progression record.

use crate::state::Progression;
use moneta_store::{PersistenceAdapter, SecureKvStore, StorageRecord, StoreResult};
use std::sync::Arc;
use tracing::warn;

/// Record name for the progression/gamification state.
pub const PROGRESSION_RECORD: &str = "gamification";

const PROGRESSION_VERSION: u64 = 1;

/// Loads and saves [`Progression`] through the persistence adapter.
#[derive(Clone)]
pub struct ProgressionStore {
    adapter: PersistenceAdapter,
}

impl ProgressionStore {
    pub fn new(store: Arc<SecureKvStore>) -> Self {
        Self {
            adapter: PersistenceAdapter::new(store),
        }
    }

    /// Loads the progression record; missing or unreadable state starts
    /// fresh. Achievements added since the record was written get locked
    /// slots backfilled.
    pub fn load(&self) -> Progression {
        let Some(record) = self.adapter.load(PROGRESSION_RECORD) else {
            return Progression::new();
        };
        match serde_json::from_value::<Progression>(record.payload) {
            Ok(mut progression) => {
                progression.ensure_catalog();
                progression
            }
            Err(e) => {
                warn!("progression record unreadable, starting fresh: {e}");
                Progression::new()
            }
        }
    }

    pub fn save(&self, progression: &Progression) -> StoreResult<()> {
        self.adapter.save(&StorageRecord {
            name: PROGRESSION_RECORD.to_string(),
            version: PROGRESSION_VERSION,
            payload: serde_json::to_value(progression)?,
        })
    }

    /// Full progression reset: reinitializes the in-memory state and
    /// clears the stored record for this domain.
    pub fn reset(&self, progression: &mut Progression) -> StoreResult<()> {
        progression.reset();
        self.adapter.remove(PROGRESSION_RECORD)
    }
}
