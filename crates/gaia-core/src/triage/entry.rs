use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One answered triage question.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriageEntry {
    pub on: bool,
    pub note: String,
}

impl TriageEntry {
    pub fn new(on: bool, note: impl Into<String>) -> Self {
        Self {
            on,
            note: note.into(),
        }
    }

    pub fn flag(on: bool) -> Self {
        Self {
            on,
            note: String::new(),
        }
    }
}

/// Canonical triage record keyed by question id.
///
/// Keys that are absent have not been answered yet. There is no zero-fill
/// against a master question list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TriageMap(BTreeMap<String, TriageEntry>);

impl TriageMap {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn get(&self, key: &str) -> Option<&TriageEntry> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, entry: TriageEntry) -> Option<TriageEntry> {
        self.0.insert(key.into(), entry)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &TriageEntry)> {
        self.0.iter()
    }

    /// Flips the flag of `key`. Switching an answer off discards its note.
    pub fn toggle(&mut self, key: &str) {
        let entry = self.0.entry(key.to_string()).or_default();
        entry.on = !entry.on;
        if !entry.on {
            entry.note.clear();
        }
    }

    /// Replaces the note of `key`, creating an unanswered (off) entry if needed.
    pub fn set_note(&mut self, key: &str, note: impl Into<String>) {
        let entry = self.0.entry(key.to_string()).or_default();
        entry.note = note.into();
    }

    /// Keys currently flagged on.
    pub fn flagged(&self) -> impl Iterator<Item = &str> {
        self.0
            .iter()
            .filter(|(_, entry)| entry.on)
            .map(|(key, _)| key.as_str())
    }
}

impl FromIterator<(String, TriageEntry)> for TriageMap {
    fn from_iter<I: IntoIterator<Item = (String, TriageEntry)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for TriageMap {
    type Item = (String, TriageEntry);
    type IntoIter = std::collections::btree_map::IntoIter<String, TriageEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_creates_entry_and_turns_it_on() {
        let mut map = TriageMap::new();
        map.toggle("fuma");
        assert_eq!(map.get("fuma"), Some(&TriageEntry::flag(true)));
    }

    #[test]
    fn toggle_off_clears_note() {
        let mut map = TriageMap::new();
        map.insert("alcool", TriageEntry::new(true, "fins de semana"));
        map.toggle("alcool");
        assert_eq!(map.get("alcool"), Some(&TriageEntry::flag(false)));
    }

    #[test]
    fn set_note_keeps_flag() {
        let mut map = TriageMap::new();
        map.toggle("cirurgia");
        map.set_note("cirurgia", "apendicite em 2019");
        let entry = map.get("cirurgia").unwrap();
        assert!(entry.on);
        assert_eq!(entry.note, "apendicite em 2019");
    }

    #[test]
    fn set_note_on_unanswered_key_creates_off_entry() {
        let mut map = TriageMap::new();
        map.set_note("alergia", "dipirona");
        assert_eq!(map.get("alergia"), Some(&TriageEntry::new(false, "dipirona")));
    }

    #[test]
    fn serializes_as_plain_object() {
        let mut map = TriageMap::new();
        map.insert("fuma", TriageEntry::flag(true));
        let json = serde_json::to_value(&map).unwrap();
        assert_eq!(json, serde_json::json!({"fuma": {"on": true, "note": ""}}));
    }
}
