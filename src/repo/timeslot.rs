use crate::models::Task;
use crate::repo::Store;

/// Timeslot mutations over a [`Store`]
pub struct TimeslotRepo;

impl TimeslotRepo {
    /// Set the begin timestamp. No ordering check against `end`.
    pub fn change_begin(store: &mut Store, id: i64, timestamp: i64) -> bool {
        match store.timeslot_mut(id) {
            Some(ts) => {
                ts.begin = timestamp;
                true
            }
            None => {
                log::warn!("No timeslot found with id {}", id);
                false
            }
        }
    }

    /// Set the end timestamp, closing the timeslot if it was open
    pub fn change_end(store: &mut Store, id: i64, timestamp: i64) -> bool {
        match store.timeslot_mut(id) {
            Some(ts) => {
                ts.end = Some(timestamp);
                true
            }
            None => {
                log::warn!("No timeslot found with id {}", id);
                false
            }
        }
    }

    pub fn remove(store: &mut Store, id: i64) -> bool {
        let removed = store.delete_timeslot(id).is_some();
        if removed {
            store.reset_if_empty();
        }
        removed
    }

    /// Hand a timeslot over to another existing task
    pub fn reassign(store: &mut Store, id: i64, task_id: i64) -> bool {
        if !store.has_task(task_id) {
            return false;
        }
        match store.timeslot_mut(id) {
            Some(ts) => {
                ts.task_id = Some(task_id);
                true
            }
            None => false,
        }
    }

    /// Split a timeslot off into a new unnamed task nested under its owner
    pub fn to_new_task(store: &mut Store, id: i64) -> Option<Task> {
        let owner = store.timeslot(id)?.task_id.filter(|owner| store.has_task(*owner));
        let task = store.create_task(None, owner);
        Self::reassign(store, id, task.id);
        Some(task)
    }
}
