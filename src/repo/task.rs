use std::collections::HashSet;

use crate::models::Task;
use crate::repo::Store;

/// Task mutations over a [`Store`].
///
/// Operations never fail: an unknown id or a rejected change leaves the
/// store untouched and reports `false` (or `None`).
pub struct TaskRepo;

impl TaskRepo {
    /// Create a task and immediately start timing it
    pub fn add(store: &mut Store, name: Option<String>, parent_id: Option<i64>, now: i64) -> Task {
        let parent_id = match parent_id {
            Some(id) if !store.has_task(id) => {
                log::warn!("Parent task {} not found, creating task at root level", id);
                None
            }
            other => other,
        };

        let task = store.create_task(name, parent_id);
        Self::start(store, task.id, now);
        log::debug!("Added task {}", task.id);
        task
    }

    pub fn rename(store: &mut Store, id: i64, name: Option<String>) -> bool {
        let Some(task) = store.task_mut(id) else {
            return false;
        };
        task.name = name.filter(|n| !n.trim().is_empty());
        true
    }

    /// Move a task under a new parent.
    ///
    /// Rejected when either task is missing, when the task would become its
    /// own parent, when it already has that parent, or when the new parent
    /// is one of its descendants.
    pub fn reparent(store: &mut Store, task_id: i64, parent_id: i64) -> bool {
        if task_id == parent_id {
            return false;
        }
        let Some(task) = store.task(task_id) else {
            return false;
        };
        if task.parent_id == Some(parent_id) || !store.has_task(parent_id) {
            return false;
        }

        match store.ancestor_ids(parent_id) {
            Ok(ancestors) if ancestors.contains(&task_id) => {
                log::debug!("Refusing to move task {} under its descendant {}", task_id, parent_id);
                return false;
            }
            Ok(_) => {}
            Err(e) => {
                log::warn!("Refusing to move task {}: {}", task_id, e);
                return false;
            }
        }

        if let Some(task) = store.task_mut(task_id) {
            task.parent_id = Some(parent_id);
        }
        true
    }

    /// Move a task to root level
    pub fn unparent(store: &mut Store, task_id: i64) -> bool {
        match store.task_mut(task_id) {
            Some(task) => task.parent_id.take().is_some(),
            None => false,
        }
    }

    /// Start timing a task.
    ///
    /// Any open timeslot in the store is closed first, so at most one
    /// timeslot is open afterwards. Starting a task that is already running
    /// changes nothing.
    pub fn start(store: &mut Store, id: i64, now: i64) -> bool {
        if !store.has_task(id) {
            return false;
        }
        let already_running = store
            .timeslots_by_id
            .values()
            .any(|ts| ts.task_id == Some(id) && ts.is_open());
        if already_running {
            return false;
        }

        for ts in store.timeslots_by_id.values_mut().filter(|ts| ts.is_open()) {
            log::debug!("Closing timeslot {} of task {:?}", ts.id, ts.task_id);
            ts.end = Some(now);
        }
        store.create_timeslot(Some(id), now);
        true
    }

    /// Close every open timeslot owned by the task
    pub fn stop(store: &mut Store, id: i64, now: i64) -> bool {
        if !store.has_task(id) {
            return false;
        }
        let mut stopped = false;
        for ts in store
            .timeslots_by_id
            .values_mut()
            .filter(|ts| ts.task_id == Some(id) && ts.is_open())
        {
            ts.end = Some(now);
            stopped = true;
        }
        stopped
    }

    /// Delete a task, its descendants, and every timeslot any of them owned
    pub fn remove(store: &mut Store, id: i64) -> bool {
        if !store.has_task(id) {
            return false;
        }

        let mut removed: HashSet<i64> = store.descendant_ids(id).into_iter().collect();
        removed.insert(id);

        store.tasks_by_id.retain(|task_id, _| !removed.contains(task_id));
        store
            .timeslots_by_id
            .retain(|_, ts| !ts.task_id.is_some_and(|owner| removed.contains(&owner)));

        if store.reset_if_empty() {
            log::debug!("Store is empty, id counter reset");
        }
        true
    }

    /// Delete the task's own timeslots; sub-tasks keep theirs
    pub fn reset(store: &mut Store, id: i64) -> bool {
        if !store.has_task(id) {
            return false;
        }
        store.timeslots_by_id.retain(|_, ts| ts.task_id != Some(id));
        true
    }

    pub fn clear_all(store: &mut Store) {
        store.clear();
    }
}
