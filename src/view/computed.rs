use serde::Serialize;

use crate::models::Timeslot;

/// A timeslot annotated for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputedTimeslot {
    pub id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<i64>,
    pub begin: i64,
    /// Stored end, or "now" while the timeslot is open
    pub end: i64,
    pub is_active: bool,
    /// Seconds
    pub duration: i64,
}

impl ComputedTimeslot {
    pub fn new(timeslot: &Timeslot, now: i64) -> Self {
        Self {
            id: timeslot.id,
            task_id: timeslot.task_id,
            begin: timeslot.begin,
            end: timeslot.effective_end(now),
            is_active: timeslot.is_open(),
            duration: timeslot.duration_secs(now),
        }
    }
}

/// A task annotated with its duration, activity and nested sub-tasks
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputedTask {
    pub id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Own timeslots plus all sub-tasks, in seconds
    pub duration: i64,
    pub is_active: bool,
    pub timeslots: Vec<ComputedTimeslot>,
    pub sub_tasks: Vec<ComputedTask>,
}

impl ComputedTask {
    /// Seconds recorded directly on this task, excluding sub-tasks
    pub fn own_duration(&self) -> i64 {
        self.timeslots.iter().map(|ts| ts.duration).fold(0, i64::saturating_add)
    }

    /// This task and its descendants in depth-first order, paired with their depth
    pub fn walk(&self) -> Vec<(usize, &ComputedTask)> {
        let mut out = Vec::new();
        let mut pending = vec![(0usize, self)];
        while let Some((depth, task)) = pending.pop() {
            out.push((depth, task));
            for sub in task.sub_tasks.iter().rev() {
                pending.push((depth + 1, sub));
            }
        }
        out
    }
}
