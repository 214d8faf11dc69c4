use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

/// Save actions that are mutually exclusive with themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepKind {
    PersonalInfo,
    Preferences,
    Conditions,
    MainGoal,
    HealthTriage,
    EmotionalTriage,
    EmotionalSymptoms,
    ProfileEdits,
}

/// Tracks which steps have a save outstanding.
#[derive(Debug, Clone, Default)]
pub struct StepLocks {
    busy: Arc<Mutex<HashSet<StepKind>>>,
}

impl StepLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `step` busy; `None` when a save for it is already running.
    pub fn try_acquire(&self, step: StepKind) -> Option<BusyGuard> {
        let mut busy = self.busy.lock().unwrap_or_else(PoisonError::into_inner);
        if !busy.insert(step) {
            return None;
        }
        Some(BusyGuard {
            locks: self.clone(),
            step,
        })
    }

    pub fn is_busy(&self, step: StepKind) -> bool {
        self.busy
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&step)
    }
}

/// Releases the step when dropped.
#[derive(Debug)]
pub struct BusyGuard {
    locks: StepLocks,
    step: StepKind,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.locks
            .busy
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.step);
    }
}
