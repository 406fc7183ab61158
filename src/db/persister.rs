use anyhow::{Context, Result};

use crate::db::{save_snapshot, KeyValueStore};
use crate::repo::Store;
use crate::tracker::{Change, Listener};

/// Saves the store after every persistent change.
///
/// Transient changes (the periodic "now" refresh) are skipped, so storage is
/// only written when the user actually changed something.
pub struct Persister<S: KeyValueStore> {
    storage: S,
    key: String,
}

impl<S: KeyValueStore> Persister<S> {
    pub fn new(storage: S, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }
}

impl<S: KeyValueStore> Listener for Persister<S> {
    fn on_change(&mut self, change: &Change, store: &Store) -> Result<()> {
        if change.is_transient() {
            return Ok(());
        }
        save_snapshot(&mut self.storage, &self.key, store)
            .with_context(|| format!("Failed to save state after {:?}", change))
    }
}
