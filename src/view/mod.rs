// Derived view: the read-only projection of the store used for display.
// Rebuilt explicitly after mutations, never recomputed on field access.

pub mod computed;

pub use computed::*;

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::models::{Task, Timeslot};
use crate::repo::Store;
use crate::utils::{format_duration, DurationFormat};

/// Snapshot of everything derived from a [`Store`] at one instant.
///
/// Durations and ancestor chains are memoized once per computation. A cyclic
/// parent graph is logged and treated as "no ancestors" / "no further
/// nesting" rather than walked forever.
#[derive(Debug, Clone)]
pub struct DerivedView {
    now: i64,
    tasks_by_id: BTreeMap<i64, Task>,
    task_list: Vec<Task>,
    timeslot_list: Vec<Timeslot>,
    timeslots_by_task: HashMap<i64, Vec<Timeslot>>,
    sub_tasks_by_parent: HashMap<i64, Vec<Task>>,
    durations: HashMap<i64, i64>,
    ancestors: HashMap<i64, Vec<i64>>,
}

impl DerivedView {
    pub fn compute(store: &Store, now: i64) -> Self {
        let tasks_by_id = store.tasks_by_id.clone();
        // BTreeMap iteration is already id order
        let task_list: Vec<Task> = tasks_by_id.values().cloned().collect();

        let mut timeslot_list: Vec<Timeslot> = store.timeslots_by_id.values().cloned().collect();
        timeslot_list.sort_by_key(|ts| ts.begin);

        let mut timeslots_by_task: HashMap<i64, Vec<Timeslot>> = HashMap::new();
        for ts in &timeslot_list {
            if let Some(task_id) = ts.task_id {
                timeslots_by_task.entry(task_id).or_default().push(ts.clone());
            }
        }

        let mut sub_tasks_by_parent: HashMap<i64, Vec<Task>> = HashMap::new();
        for task in &task_list {
            if let Some(parent_id) = task.parent_id {
                sub_tasks_by_parent.entry(parent_id).or_default().push(task.clone());
            }
        }

        let mut view = Self {
            now,
            tasks_by_id,
            task_list,
            timeslot_list,
            timeslots_by_task,
            sub_tasks_by_parent,
            durations: HashMap::new(),
            ancestors: HashMap::new(),
        };
        view.durations = view.build_durations();
        view.ancestors = view.build_ancestors();
        view
    }

    pub fn now(&self) -> i64 {
        self.now
    }

    /// All tasks sorted by id
    pub fn task_list(&self) -> &[Task] {
        &self.task_list
    }

    /// All timeslots sorted by begin
    pub fn timeslot_list(&self) -> &[Timeslot] {
        &self.timeslot_list
    }

    /// Timeslots owned by a task, ordered by begin
    pub fn timeslots_of(&self, task_id: i64) -> &[Timeslot] {
        self.timeslots_by_task.get(&task_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Direct children of a task, ordered by id
    pub fn sub_tasks_of(&self, task_id: i64) -> &[Task] {
        self.sub_tasks_by_parent.get(&task_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Timeslots that belong to no task
    pub fn unassigned_timeslots(&self) -> Vec<ComputedTimeslot> {
        self.timeslot_list
            .iter()
            .filter(|ts| ts.task_id.is_none())
            .map(|ts| ComputedTimeslot::new(ts, self.now))
            .collect()
    }

    pub fn timeslot_duration(&self, timeslot: &Timeslot) -> i64 {
        timeslot.duration_secs(self.now)
    }

    /// Duration of a task in seconds, sub-tasks included. Zero for unknown ids.
    pub fn task_duration(&self, task_id: i64) -> i64 {
        self.durations.get(&task_id).copied().unwrap_or(0)
    }

    pub fn is_active(&self, task_id: i64) -> bool {
        self.timeslots_of(task_id).iter().any(Timeslot::is_open)
    }

    /// Ancestor ids from the immediate parent up to the root
    pub fn ancestors(&self, task_id: i64) -> &[i64] {
        self.ancestors.get(&task_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// True if `ancestor_id` is somewhere above `task_id` in the tree
    pub fn is_ancestor(&self, ancestor_id: i64, task_id: i64) -> bool {
        self.ancestors(task_id).contains(&ancestor_id)
    }

    /// Task with durations, activity, timeslots and nested sub-tasks
    pub fn computed_task(&self, task_id: i64) -> Option<ComputedTask> {
        let mut visiting = HashSet::new();
        self.build_computed(task_id, &mut visiting)
    }

    /// Every task in id order, each with its full subtree
    pub fn computed_tasks(&self) -> Vec<ComputedTask> {
        self.task_list
            .iter()
            .filter_map(|task| self.computed_task(task.id))
            .collect()
    }

    /// Tasks at the top of the tree.
    ///
    /// A parent reference to a task that no longer exists counts as no parent.
    pub fn root_tasks(&self) -> Vec<ComputedTask> {
        self.root_ids()
            .into_iter()
            .filter_map(|id| self.computed_task(id))
            .collect()
    }

    /// The first task (by id) that owns an open timeslot
    pub fn active_task(&self) -> Option<ComputedTask> {
        self.task_list
            .iter()
            .find(|task| self.is_active(task.id))
            .and_then(|task| self.computed_task(task.id))
    }

    /// Sum over root tasks only; nested durations are already folded in
    pub fn total_duration(&self) -> i64 {
        self.root_ids()
            .into_iter()
            .map(|id| self.task_duration(id))
            .fold(0, i64::saturating_add)
    }

    pub fn absolute_total_duration(&self) -> i64 {
        self.total_duration().saturating_abs()
    }

    /// Title line for the running task, e.g. `45s - Write` or `1m - Write`.
    ///
    /// Seconds are only shown during the first minute. `None` when nothing
    /// runs or the running duration still displays as zero.
    pub fn title(&self, format: &DurationFormat) -> Option<String> {
        let active = self.active_task()?;
        let mut title_format = format.hide_zero();
        let parts = &mut title_format.parts;
        if parts.show_days || parts.show_hours || parts.show_minutes {
            parts.show_seconds = active.duration.unsigned_abs() < 60;
        }
        let duration = format_duration(active.duration, &title_format)?;
        Some(format!("{} - {}", duration, active.name.unwrap_or_default()))
    }

    fn root_ids(&self) -> Vec<i64> {
        self.task_list
            .iter()
            .filter(|task| match task.parent_id {
                None => true,
                Some(parent_id) => !self.tasks_by_id.contains_key(&parent_id),
            })
            .map(|task| task.id)
            .collect()
    }

    fn build_computed(&self, task_id: i64, visiting: &mut HashSet<i64>) -> Option<ComputedTask> {
        let task = self.tasks_by_id.get(&task_id)?;
        if !visiting.insert(task_id) {
            log::warn!("Task {} is part of a parent cycle; not nesting it again", task_id);
            return None;
        }

        let sub_tasks = self
            .sub_tasks_of(task_id)
            .iter()
            .filter_map(|sub| self.build_computed(sub.id, visiting))
            .collect();
        visiting.remove(&task_id);

        Some(ComputedTask {
            id: task.id,
            parent_id: task.parent_id,
            name: task.name.clone(),
            duration: self.task_duration(task_id),
            is_active: self.is_active(task_id),
            timeslots: self
                .timeslots_of(task_id)
                .iter()
                .map(|ts| ComputedTimeslot::new(ts, self.now))
                .collect(),
            sub_tasks,
        })
    }

    fn build_durations(&self) -> HashMap<i64, i64> {
        let mut memo = HashMap::new();
        for task in &self.task_list {
            let mut visiting = HashSet::new();
            self.duration_of(task.id, &mut memo, &mut visiting);
        }
        memo
    }

    fn duration_of(
        &self,
        task_id: i64,
        memo: &mut HashMap<i64, i64>,
        visiting: &mut HashSet<i64>,
    ) -> i64 {
        if let Some(duration) = memo.get(&task_id) {
            return *duration;
        }
        if !visiting.insert(task_id) {
            log::warn!("Task {} is part of a parent cycle; its duration is not counted twice", task_id);
            return 0;
        }

        let own: i64 = self
            .timeslots_of(task_id)
            .iter()
            .map(|ts| self.timeslot_duration(ts))
            .fold(0, i64::saturating_add);
        let nested: i64 = self
            .sub_tasks_of(task_id)
            .iter()
            .map(|sub| self.duration_of(sub.id, memo, visiting))
            .fold(0, i64::saturating_add);

        visiting.remove(&task_id);
        let total = own.saturating_add(nested);
        memo.insert(task_id, total);
        total
    }

    fn build_ancestors(&self) -> HashMap<i64, Vec<i64>> {
        let mut memo: HashMap<i64, Vec<i64>> = HashMap::new();
        let mut cyclic_ids: HashSet<i64> = HashSet::new();

        for task in &self.task_list {
            let mut chain = Vec::new();
            let mut seen = HashSet::from([task.id]);
            let mut current = task.parent_id;
            let mut cyclic = false;

            while let Some(parent_id) = current {
                let Some(parent) = self.tasks_by_id.get(&parent_id) else {
                    break;
                };
                if cyclic_ids.contains(&parent_id) || !seen.insert(parent_id) {
                    cyclic = true;
                    break;
                }
                if let Some(known) = memo.get(&parent_id) {
                    chain.push(parent_id);
                    chain.extend(known.iter().copied());
                    break;
                }
                chain.push(parent_id);
                current = parent.parent_id;
            }

            if cyclic {
                log::warn!("Parent chain of task {} contains a cycle; ignoring its ancestors", task.id);
                cyclic_ids.insert(task.id);
                chain.clear();
            }
            memo.insert(task.id, chain);
        }

        memo
    }
}
