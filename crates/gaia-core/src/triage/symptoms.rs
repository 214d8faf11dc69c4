use super::{TriageEntry, TriageMap};

/// Triage key under which the emotional-symptoms multi-select is stored.
pub const EMOTIONAL_SYMPTOMS_KEY: &str = "sintomas_emocionais";

const LIST_SEPARATOR: &str = ", ";
const NOTE_SEPARATOR: char = '|';

/// Emotional symptoms selected by the user plus an optional free-text note.
///
/// Persisted inside `emotional_triage` as a single entry whose note is
/// `"a, b, c | free text"` so no schema change is needed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmotionalSymptoms {
    pub selected: Vec<String>,
    pub note: String,
}

impl EmotionalSymptoms {
    pub fn from_triage(triage: &TriageMap) -> Self {
        triage
            .get(EMOTIONAL_SYMPTOMS_KEY)
            .map(|entry| Self::decode(&entry.note))
            .unwrap_or_default()
    }

    pub fn decode(raw: &str) -> Self {
        let (list, note) = match raw.split_once(NOTE_SEPARATOR) {
            Some((list, note)) => (list, note.trim()),
            None => (raw, ""),
        };
        let selected = list
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        Self {
            selected,
            note: note.to_string(),
        }
    }

    pub fn encode(&self) -> String {
        let mut out = self.selected.join(LIST_SEPARATOR);
        let note = self.note.trim();
        if !note.is_empty() {
            out.push_str(" | ");
            out.push_str(note);
        }
        out
    }

    /// Selecting an already selected symptom removes it.
    pub fn toggle(&mut self, symptom: &str) {
        if let Some(pos) = self.selected.iter().position(|s| s == symptom) {
            self.selected.remove(pos);
        } else {
            self.selected.push(symptom.to_string());
        }
    }

    pub fn to_entry(&self) -> TriageEntry {
        TriageEntry::new(!self.selected.is_empty(), self.encode())
    }

    /// Returns `triage` with the symptoms entry replaced, other answers untouched.
    pub fn merge_into(&self, triage: &TriageMap) -> TriageMap {
        let mut merged = triage.clone();
        merged.insert(EMOTIONAL_SYMPTOMS_KEY, self.to_entry());
        merged
    }
}
