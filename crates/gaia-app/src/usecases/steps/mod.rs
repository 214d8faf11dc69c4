//! Step-save use cases.
//!
//! Each onboarding or triage page writes only its own fields, hands the
//! stored row to the session-scoped loader and returns the next route.

mod busy;
mod save;

pub use busy::{BusyGuard, StepKind, StepLocks};
pub use save::{PreferencesForm, ProfileEdits, ProfileSteps, StepSaveError};
