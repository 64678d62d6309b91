//! Deferred task scheduling.
//!
//! Delays such as "advance the deck 300 ms after a commit" are modelled as
//! tasks due at a timestamp. The host calls [`Scheduler::advance`] with the
//! current time (e.g. once per frame) and runs whatever came due. Nothing
//! blocks.

use std::time::Duration;

/// Handle for cancelling a scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

#[derive(Debug, Clone)]
struct Entry<T> {
    id: TaskId,
    due: Duration,
    task: T,
}

/// Queue of tasks keyed by due time.
#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    entries: Vec<Entry<T>>,
    next_id: u64,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
        }
    }
}

impl<T> Scheduler<T> {
    /// Create an empty scheduler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `task` once `delay` has passed after `now`.
    pub fn schedule(&mut self, now: Duration, delay: Duration, task: T) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry {
            id,
            due: now.saturating_add(delay),
            task,
        });
        id
    }

    /// Drop a pending task. Returns it if it had not run yet.
    pub fn cancel(&mut self, id: TaskId) -> Option<T> {
        let index = self.entries.iter().position(|e| e.id == id)?;
        Some(self.entries.remove(index).task)
    }

    /// Remove and return every task due at or before `now`, earliest first.
    /// Tasks due at the same instant come out in scheduling order.
    pub fn advance(&mut self, now: Duration) -> Vec<T> {
        let (mut due, pending): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.entries).into_iter().partition(|e| e.due <= now);
        self.entries = pending;
        due.sort_by_key(|e| (e.due, e.id.0));
        due.into_iter().map(|e| e.task).collect()
    }

    /// Earliest pending due time.
    pub fn next_due(&self) -> Option<Duration> {
        self.entries.iter().map(|e| e.due).min()
    }

    /// Number of pending tasks.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop everything (screen unmount).
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
