// Tracker: the store plus explicit change notification.
// Every mutation goes through here so listeners (persistence, views) can
// resynchronize; nothing observes the store implicitly.

use std::cell::Cell;
use std::rc::Rc;

use anyhow::Result;

use crate::models::Task;
use crate::repo::{Store, TaskRepo, TimeslotRepo};
use crate::view::DerivedView;

/// Source of the current time in milliseconds since the Unix epoch
pub trait Clock {
    fn now(&self) -> i64;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock(Rc<Cell<i64>>);

impl ManualClock {
    pub fn new(start: i64) -> Self {
        Self(Rc::new(Cell::new(start)))
    }

    pub fn set(&self, now: i64) {
        self.0.set(now);
    }

    pub fn advance_secs(&self, secs: i64) {
        self.0.set(self.0.get() + secs * 1000);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> i64 {
        self.0.get()
    }
}

/// What just happened to the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    TaskAdded(i64),
    TaskRenamed(i64),
    TaskMoved(i64),
    TaskStarted(i64),
    TaskStopped(i64),
    TaskRemoved(i64),
    TaskReset(i64),
    Cleared,
    TimeslotChanged(i64),
    TimeslotRemoved(i64),
    /// Periodic refresh of "now"; the stored data did not change
    Tick,
}

impl Change {
    /// Transient changes only affect derived values and must not be persisted
    pub fn is_transient(&self) -> bool {
        matches!(self, Change::Tick)
    }
}

/// Receives every change after it has been applied
pub trait Listener {
    fn on_change(&mut self, change: &Change, store: &Store) -> Result<()>;
}

/// Owns the store and drives mutations, derived-view caching and notification.
///
/// Rejected operations (unknown ids, cycle attempts) return `Ok(false)` and
/// notify nobody. Errors only come from listeners, e.g. a failed save.
pub struct Tracker {
    store: Store,
    clock: Box<dyn Clock>,
    now: i64,
    view: Option<DerivedView>,
    listeners: Vec<Box<dyn Listener>>,
}

impl Tracker {
    pub fn new(store: Store, clock: impl Clock + 'static) -> Self {
        let now = clock.now();
        Self {
            store,
            clock: Box::new(clock),
            now,
            view: None,
            listeners: Vec::new(),
        }
    }

    pub fn with_system_clock(store: Store) -> Self {
        Self::new(store, SystemClock)
    }

    pub fn subscribe(&mut self, listener: impl Listener + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn now(&self) -> i64 {
        self.now
    }

    /// Derived view of the current state, recomputed only after a change
    pub fn view(&mut self) -> &DerivedView {
        let (store, now) = (&self.store, self.now);
        self.view.get_or_insert_with(|| DerivedView::compute(store, now))
    }

    /// Refresh "now" so open timeslots show their running duration
    pub fn tick(&mut self) -> Result<()> {
        self.refresh_now();
        self.commit(Change::Tick)
    }

    /// Create a task and start timing it right away
    pub fn add_task(&mut self, name: Option<String>, parent_id: Option<i64>) -> Result<Task> {
        self.refresh_now();
        let task = TaskRepo::add(&mut self.store, name, parent_id, self.now);
        self.commit(Change::TaskAdded(task.id))?;
        Ok(task)
    }

    pub fn rename_task(&mut self, id: i64, name: Option<String>) -> Result<bool> {
        let changed = TaskRepo::rename(&mut self.store, id, name);
        self.commit_if(changed, Change::TaskRenamed(id))
    }

    pub fn reparent_task(&mut self, task_id: i64, parent_id: i64) -> Result<bool> {
        let changed = TaskRepo::reparent(&mut self.store, task_id, parent_id);
        self.commit_if(changed, Change::TaskMoved(task_id))
    }

    pub fn unparent_task(&mut self, task_id: i64) -> Result<bool> {
        let changed = TaskRepo::unparent(&mut self.store, task_id);
        self.commit_if(changed, Change::TaskMoved(task_id))
    }

    pub fn start_task(&mut self, id: i64) -> Result<bool> {
        self.refresh_now();
        let changed = TaskRepo::start(&mut self.store, id, self.now);
        self.commit_if(changed, Change::TaskStarted(id))
    }

    pub fn stop_task(&mut self, id: i64) -> Result<bool> {
        self.refresh_now();
        let changed = TaskRepo::stop(&mut self.store, id, self.now);
        self.commit_if(changed, Change::TaskStopped(id))
    }

    pub fn remove_task(&mut self, id: i64) -> Result<bool> {
        let changed = TaskRepo::remove(&mut self.store, id);
        self.commit_if(changed, Change::TaskRemoved(id))
    }

    pub fn reset_task(&mut self, id: i64) -> Result<bool> {
        let changed = TaskRepo::reset(&mut self.store, id);
        self.commit_if(changed, Change::TaskReset(id))
    }

    pub fn clear_all(&mut self) -> Result<()> {
        TaskRepo::clear_all(&mut self.store);
        self.commit(Change::Cleared)
    }

    pub fn change_timeslot_begin(&mut self, id: i64, timestamp: i64) -> Result<bool> {
        let changed = TimeslotRepo::change_begin(&mut self.store, id, timestamp);
        self.commit_if(changed, Change::TimeslotChanged(id))
    }

    pub fn change_timeslot_end(&mut self, id: i64, timestamp: i64) -> Result<bool> {
        let changed = TimeslotRepo::change_end(&mut self.store, id, timestamp);
        self.commit_if(changed, Change::TimeslotChanged(id))
    }

    pub fn remove_timeslot(&mut self, id: i64) -> Result<bool> {
        let changed = TimeslotRepo::remove(&mut self.store, id);
        self.commit_if(changed, Change::TimeslotRemoved(id))
    }

    pub fn reassign_timeslot(&mut self, id: i64, task_id: i64) -> Result<bool> {
        let changed = TimeslotRepo::reassign(&mut self.store, id, task_id);
        self.commit_if(changed, Change::TimeslotChanged(id))
    }

    /// Move a timeslot into a new unnamed sub-task of its owner
    pub fn timeslot_to_new_task(&mut self, id: i64) -> Result<Option<Task>> {
        let Some(task) = TimeslotRepo::to_new_task(&mut self.store, id) else {
            return Ok(None);
        };
        self.commit(Change::TaskAdded(task.id))?;
        Ok(Some(task))
    }

    fn refresh_now(&mut self) {
        self.now = self.clock.now();
    }

    fn commit_if(&mut self, changed: bool, change: Change) -> Result<bool> {
        if changed {
            self.commit(change)?;
        } else {
            log::debug!("Rejected {:?}", change);
        }
        Ok(changed)
    }

    fn commit(&mut self, change: Change) -> Result<()> {
        self.view = None;
        if !change.is_transient() {
            log::debug!("Applied {:?}", change);
        }
        for listener in &mut self.listeners {
            listener.on_change(&change, &self.store)?;
        }
        Ok(())
    }
}
