//! Single-instance guard for patch loading.
//!
//! One [LoadCoordinator] is shared by everything that may start a load.
//! [LoadCoordinator::try_begin] hands out at most one [LoadGuard] at a time;
//! work requested while a load runs is queued and drained FIFO by the
//! holder of the guard.

use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::loader::LoaderError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TodoKind {
    /// Fresh load of a whole patch.
    Load,
    Patch,
    Hotfix,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub kind: TodoKind,
    pub patch: String,
    #[serde(default)]
    pub hotfix: Option<NaiveDate>,
}

impl Todo {
    pub fn load(patch: impl Into<String>) -> Self {
        Self {
            kind: TodoKind::Load,
            patch: patch.into(),
            hotfix: None,
        }
    }

    pub fn patch(patch: impl Into<String>) -> Self {
        Self {
            kind: TodoKind::Patch,
            patch: patch.into(),
            hotfix: None,
        }
    }

    pub fn hotfix(patch: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            kind: TodoKind::Hotfix,
            patch: patch.into(),
            hotfix: Some(date),
        }
    }
}

impl fmt::Display for Todo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.hotfix {
            Some(date) => write!(f, "{:?} {} ({date})", self.kind, self.patch),
            None => write!(f, "{:?} {}", self.kind, self.patch),
        }
    }
}

#[derive(Debug, Default)]
pub struct LoadCoordinator {
    busy: AtomicBool,
    todos: Mutex<VecDeque<Todo>>,
}

impl LoadCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the loader, or [LoaderError::Busy] if a load is running.
    pub fn try_begin(&self) -> Result<LoadGuard<'_>, LoaderError> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| LoaderError::Busy)?;
        Ok(LoadGuard { coordinator: self })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    pub fn enqueue(&self, todo: Todo) {
        info!(target: "liandrys::load", %todo, "queued");
        self.todos().push_back(todo);
    }

    pub fn pending(&self) -> usize {
        self.todos().len()
    }

    fn todos(&self) -> MutexGuard<'_, VecDeque<Todo>> {
        // a panicked holder leaves the queue itself intact
        self.todos.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Proof of holding the loader; releases it on drop.
#[derive(Debug)]
pub struct LoadGuard<'a> {
    coordinator: &'a LoadCoordinator,
}

impl LoadGuard<'_> {
    pub fn next_todo(&self) -> Option<Todo> {
        self.coordinator.todos().pop_front()
    }

    /// Take every queued todo, oldest first.
    pub fn drain(&self) -> Vec<Todo> {
        self.coordinator.todos().drain(..).collect()
    }
}

impl Drop for LoadGuard<'_> {
    fn drop(&mut self) {
        self.coordinator.busy.store(false, Ordering::Release);
    }
}
