// Persisted snapshot of the store: { nextId, tasksById, timeslotsById }
// Transient state ("now", pending prompts) never reaches storage.

use crate::db::{KeyValueStore, StorageError};
use crate::repo::Store;

/// Slot the snapshot lives in
pub const STORAGE_KEY: &str = "time-tracker";

/// Load the stored snapshot, best effort.
///
/// A missing slot, an unreadable slot and a malformed value all mean "no
/// prior state"; the latter two are logged.
pub fn load_snapshot(storage: &impl KeyValueStore, key: &str) -> Option<Store> {
    let raw = match storage.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            log::warn!("Could not read stored state: {}", e);
            return None;
        }
    };
    if raw.trim().is_empty() || raw.trim() == "null" {
        return None;
    }

    match serde_json::from_str::<Store>(&raw) {
        Ok(mut store) => {
            if !repair_id_counter(&mut store) {
                log::warn!("Ignoring stored state: no ids left to hand out");
                return None;
            }
            Some(store)
        }
        Err(e) => {
            log::warn!("Ignoring malformed stored state: {}", e);
            None
        }
    }
}

/// Serialize the store into its slot
pub fn save_snapshot(
    storage: &mut impl KeyValueStore,
    key: &str,
    store: &Store,
) -> Result<(), StorageError> {
    let json = serde_json::to_string(store)?;
    storage.set(key, &json)
}

/// Make sure the next id cannot collide with a stored one.
///
/// Returns false when the counter has no room left to advance.
fn repair_id_counter(store: &mut Store) -> bool {
    let max_id = store
        .tasks_by_id
        .keys()
        .chain(store.timeslots_by_id.keys())
        .copied()
        .max()
        .unwrap_or(0);
    if store.next_id <= max_id {
        log::warn!(
            "Stored id counter {} is behind existing id {}; advancing it",
            store.next_id,
            max_id
        );
        match max_id.checked_add(1) {
            Some(next_id) => store.next_id = next_id,
            None => return false,
        }
    }
    store.next_id < i64::MAX
}
