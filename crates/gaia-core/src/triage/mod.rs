//! Triage questionnaires.
//!
//! A triage record maps question keys to a flag plus a free-text note. Stored
//! rows may still carry the legacy encoding where a question is a bare boolean;
//! [`normalize_triage`] reconciles both shapes into a [`TriageMap`].

mod entry;
mod normalize;
mod symptoms;

pub use entry::{TriageEntry, TriageMap};
pub use normalize::{normalize_triage, RawTriageValue};
pub use symptoms::{EmotionalSymptoms, EMOTIONAL_SYMPTOMS_KEY};
