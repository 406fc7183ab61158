use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::models::{Task, Timeslot};

/// First id handed out by an empty store
pub const INITIAL_ID: i64 = 1;

/// The parent chain of a task loops back onto itself
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("parent chain of task {task_id} contains a cycle")]
pub struct CycleError {
    pub task_id: i64,
}

/// Normalized store of tasks and timeslots.
///
/// Tasks and timeslots share one id sequence. The store is the sole owner of
/// both record kinds; everything else reads it or goes through the repos.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    pub next_id: i64,
    #[serde(default)]
    pub tasks_by_id: BTreeMap<i64, Task>,
    #[serde(default)]
    pub timeslots_by_id: BTreeMap<i64, Timeslot>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    pub fn new() -> Self {
        Self {
            next_id: INITIAL_ID,
            tasks_by_id: BTreeMap::new(),
            timeslots_by_id: BTreeMap::new(),
        }
    }

    /// Hand out the next id and advance the counter
    pub fn next_id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn create_task(&mut self, name: Option<String>, parent_id: Option<i64>) -> Task {
        let task = Task::new(self.next_id(), name, parent_id);
        self.tasks_by_id.insert(task.id, task.clone());
        task
    }

    /// Create an open timeslot beginning at `now`
    pub fn create_timeslot(&mut self, task_id: Option<i64>, now: i64) -> Timeslot {
        let timeslot = Timeslot::new(self.next_id(), task_id, now);
        self.timeslots_by_id.insert(timeslot.id, timeslot.clone());
        timeslot
    }

    pub fn task(&self, id: i64) -> Option<&Task> {
        self.tasks_by_id.get(&id)
    }

    pub fn task_mut(&mut self, id: i64) -> Option<&mut Task> {
        self.tasks_by_id.get_mut(&id)
    }

    pub fn set_task(&mut self, task: Task) {
        self.tasks_by_id.insert(task.id, task);
    }

    pub fn delete_task(&mut self, id: i64) -> Option<Task> {
        self.tasks_by_id.remove(&id)
    }

    pub fn timeslot(&self, id: i64) -> Option<&Timeslot> {
        self.timeslots_by_id.get(&id)
    }

    pub fn timeslot_mut(&mut self, id: i64) -> Option<&mut Timeslot> {
        self.timeslots_by_id.get_mut(&id)
    }

    pub fn set_timeslot(&mut self, timeslot: Timeslot) {
        self.timeslots_by_id.insert(timeslot.id, timeslot);
    }

    pub fn delete_timeslot(&mut self, id: i64) -> Option<Timeslot> {
        self.timeslots_by_id.remove(&id)
    }

    pub fn has_task(&self, id: i64) -> bool {
        self.tasks_by_id.contains_key(&id)
    }

    /// Ids of the timeslots owned by a task, in id order
    pub fn timeslot_ids_of(&self, task_id: i64) -> Vec<i64> {
        self.timeslots_by_id
            .values()
            .filter(|ts| ts.task_id == Some(task_id))
            .map(|ts| ts.id)
            .collect()
    }

    /// Ids of the direct children of a task, in id order
    pub fn child_ids_of(&self, parent_id: i64) -> Vec<i64> {
        self.tasks_by_id
            .values()
            .filter(|t| t.parent_id == Some(parent_id))
            .map(|t| t.id)
            .collect()
    }

    /// Walk the parent chain of a task, immediate parent first.
    ///
    /// Stops at the first parent id that has no task behind it. Revisiting a
    /// task means the parent graph is cyclic; the walk gives up with an error.
    pub fn ancestor_ids(&self, id: i64) -> Result<Vec<i64>, CycleError> {
        let mut ancestors = Vec::new();
        let mut seen = HashSet::from([id]);
        let mut current = self.task(id).and_then(|t| t.parent_id);

        while let Some(parent_id) = current {
            let Some(parent) = self.task(parent_id) else {
                break;
            };
            if !seen.insert(parent_id) {
                return Err(CycleError { task_id: id });
            }
            ancestors.push(parent_id);
            current = parent.parent_id;
        }

        Ok(ancestors)
    }

    /// All descendants of a task (children, grandchildren, ...), cycle safe
    pub fn descendant_ids(&self, id: i64) -> Vec<i64> {
        let mut descendants = Vec::new();
        let mut seen = HashSet::from([id]);
        let mut pending = self.child_ids_of(id);

        while let Some(child_id) = pending.pop() {
            if !seen.insert(child_id) {
                continue;
            }
            descendants.push(child_id);
            pending.extend(self.child_ids_of(child_id));
        }

        descendants
    }

    pub fn is_empty(&self) -> bool {
        self.tasks_by_id.is_empty() && self.timeslots_by_id.is_empty()
    }

    /// Reset the id counter when nothing is left that could collide with it
    pub fn reset_if_empty(&mut self) -> bool {
        if self.is_empty() && self.next_id != INITIAL_ID {
            self.next_id = INITIAL_ID;
            return true;
        }
        false
    }

    /// Remove every task and timeslot and reset the id counter
    pub fn clear(&mut self) {
        self.tasks_by_id.clear();
        self.timeslots_by_id.clear();
        self.next_id = INITIAL_ID;
    }
}
