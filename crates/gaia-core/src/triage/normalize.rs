use serde_json::Value;

use super::{TriageEntry, TriageMap};

/// Shape of a single stored triage value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawTriageValue {
    /// Legacy encoding: the question is a bare boolean.
    Flag(bool),
    /// Current encoding: `{on, note}`.
    Entry(TriageEntry),
    /// Anything else (null, string, number, array). Dropped on normalization.
    Unrecognized,
}

impl RawTriageValue {
    pub fn classify(value: &Value) -> Self {
        match value {
            Value::Bool(on) => Self::Flag(*on),
            Value::Object(fields) => Self::Entry(TriageEntry {
                on: fields.get("on").map(is_truthy).unwrap_or(false),
                note: match fields.get("note") {
                    None | Some(Value::Null) => String::new(),
                    Some(note) => display_string(note),
                },
            }),
            _ => Self::Unrecognized,
        }
    }

    pub fn into_entry(self) -> Option<TriageEntry> {
        match self {
            Self::Flag(on) => Some(TriageEntry::flag(on)),
            Self::Entry(entry) => Some(entry),
            Self::Unrecognized => None,
        }
    }
}

/// Converts a loosely typed stored triage record into its canonical form.
///
/// Non-object input is treated as an empty record. Keys whose value is not a
/// boolean or an object vanish from the output instead of becoming a
/// default-off entry. Never fails.
pub fn normalize_triage(raw: &Value) -> TriageMap {
    let Value::Object(fields) = raw else {
        return TriageMap::new();
    };

    fields
        .iter()
        .filter_map(|(key, value)| {
            let entry = RawTriageValue::classify(value).into_entry();
            #[cfg(feature = "tracing")]
            if entry.is_none() {
                tracing::trace!(key = %key, "dropping unrecognized triage value");
            }
            entry.map(|entry| (key.clone(), entry))
        })
        .collect()
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn display_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items
            .iter()
            .map(display_string)
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bare_booleans_become_entries_with_empty_note() {
        let map = normalize_triage(&json!({"fuma": true, "alcool": false}));
        assert_eq!(map.get("fuma"), Some(&TriageEntry::flag(true)));
        assert_eq!(map.get("alcool"), Some(&TriageEntry::flag(false)));
    }

    #[test]
    fn objects_keep_flag_and_note() {
        let map = normalize_triage(&json!({"cirurgia": {"on": true, "note": "joelho"}}));
        assert_eq!(map.get("cirurgia"), Some(&TriageEntry::new(true, "joelho")));
    }

    #[test]
    fn object_without_note_gets_empty_note() {
        let map = normalize_triage(&json!({"arritmia": {"on": true}}));
        assert_eq!(map.get("arritmia"), Some(&TriageEntry::flag(true)));
    }

    #[test]
    fn object_fields_are_coerced() {
        let map = normalize_triage(&json!({
            "a": {"on": 1, "note": 42},
            "b": {"on": "", "note": null},
            "c": {"note": false},
            "d": {}
        }));
        assert_eq!(map.get("a"), Some(&TriageEntry::new(true, "42")));
        assert_eq!(map.get("b"), Some(&TriageEntry::flag(false)));
        assert_eq!(map.get("c"), Some(&TriageEntry::new(false, "false")));
        assert_eq!(map.get("d"), Some(&TriageEntry::flag(false)));
    }

    #[test]
    fn unrecognized_shapes_are_dropped() {
        let map = normalize_triage(&json!({
            "null": null,
            "text": "sim",
            "number": 3,
            "list": [true],
            "kept": true
        }));
        assert_eq!(map.len(), 1);
        assert!(map.contains_key("kept"));
        assert!(!map.contains_key("null"));
        assert!(!map.contains_key("list"));
    }

    #[test]
    fn non_object_input_is_empty() {
        assert!(normalize_triage(&Value::Null).is_empty());
        assert!(normalize_triage(&json!("oops")).is_empty());
        assert!(normalize_triage(&json!([{"on": true}])).is_empty());
    }

    #[test]
    fn normalization_is_idempotent() {
        let once = normalize_triage(&json!({"x": true, "y": {"on": false, "note": "n"}}));
        let twice = normalize_triage(&serde_json::to_value(&once).unwrap());
        assert_eq!(once, twice);
    }
}
