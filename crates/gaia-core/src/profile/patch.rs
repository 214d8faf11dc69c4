use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::ids::UserId;
use crate::triage::TriageMap;

/// Partial update written by a single onboarding step.
///
/// Absent fields are left untouched by the store. The preference fields use a
/// double option so a step can explicitly clear them (`Some(None)` ⇒ `null`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfilePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpf: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    pub age_range: Option<Option<String>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    pub main_goal: Option<Option<String>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    pub main_reason: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditions: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_triage: Option<TriageMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emotional_triage: Option<TriageMap>,
}

impl ProfilePatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Builds the upsert row: the patch fields plus the key and `updated_at`.
    pub fn into_row(self, id: &UserId, updated_at: &str) -> Result<Map<String, Value>, serde_json::Error> {
        let mut row = match serde_json::to_value(self)? {
            Value::Object(fields) => fields,
            _ => Map::new(),
        };
        row.insert("id".to_string(), Value::String(id.to_string()));
        row.insert("updated_at".to_string(), Value::String(updated_at.to_string()));
        Ok(row)
    }
}
