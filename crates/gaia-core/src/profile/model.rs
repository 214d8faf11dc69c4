use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::ids::UserId;
use crate::triage::{normalize_triage, TriageMap};

use super::ProfilePatch;

/// Columns requested when reading a profile row.
pub const PROFILE_COLUMNS: &[&str] = &[
    "id",
    "email",
    "full_name",
    "phone",
    "cpf",
    "birth_date",
    "state",
    "conditions",
    "age_range",
    "used_cannabis",
    "main_reason",
    "has_doctor",
    "main_goal",
    "share_data",
    "tipo",
    "direcionamento",
    "liberacao",
    "health_triage",
    "emotional_triage",
    "onboarding_answers",
    "onboarding_completed",
    "created_at",
    "updated_at",
];

/// Profile row exactly as the remote store returns it.
///
/// Triage columns are kept as raw JSON because legacy rows may encode answers
/// as bare booleans. Columns this crate does not interpret land in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub id: UserId,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub cpf: Option<String>,
    #[serde(default)]
    pub birth_date: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub age_range: Option<String>,
    #[serde(default)]
    pub main_goal: Option<String>,
    #[serde(default)]
    pub main_reason: Option<String>,
    #[serde(default)]
    pub conditions: Option<Vec<String>>,
    #[serde(default)]
    pub health_triage: Value,
    #[serde(default)]
    pub emotional_triage: Value,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Normalized profile used by every caller past the remote boundary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: UserId,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub cpf: Option<String>,
    #[serde(default)]
    pub birth_date: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub age_range: Option<String>,
    #[serde(default)]
    pub main_goal: Option<String>,
    #[serde(default)]
    pub main_reason: Option<String>,
    #[serde(default)]
    pub conditions: Option<Vec<String>>,
    #[serde(default)]
    pub health_triage: TriageMap,
    #[serde(default)]
    pub emotional_triage: TriageMap,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Profile {
    pub fn new(id: UserId) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    /// Applies a merge-patch locally: supplied fields overwrite, the rest stay.
    pub fn apply_patch(&mut self, patch: &ProfilePatch) {
        let patch = patch.clone();
        if let Some(v) = patch.full_name {
            self.full_name = Some(v);
        }
        if let Some(v) = patch.phone {
            self.phone = Some(v);
        }
        if let Some(v) = patch.cpf {
            self.cpf = Some(v);
        }
        if let Some(v) = patch.birth_date {
            self.birth_date = Some(v);
        }
        if let Some(v) = patch.state {
            self.state = Some(v);
        }
        if let Some(v) = patch.age_range {
            self.age_range = v;
        }
        if let Some(v) = patch.main_goal {
            self.main_goal = v;
        }
        if let Some(v) = patch.main_reason {
            self.main_reason = v;
        }
        if let Some(v) = patch.conditions {
            self.conditions = Some(v);
        }
        if let Some(v) = patch.health_triage {
            self.health_triage = v;
        }
        if let Some(v) = patch.emotional_triage {
            self.emotional_triage = v;
        }
    }

    pub fn merged_with(&self, patch: &ProfilePatch) -> Self {
        let mut merged = self.clone();
        merged.apply_patch(patch);
        merged
    }
}

impl From<ProfileRecord> for Profile {
    fn from(record: ProfileRecord) -> Self {
        Self {
            health_triage: normalize_triage(&record.health_triage),
            emotional_triage: normalize_triage(&record.emotional_triage),
            id: record.id,
            email: record.email,
            full_name: record.full_name,
            phone: record.phone,
            cpf: record.cpf,
            birth_date: record.birth_date,
            state: record.state,
            age_range: record.age_range,
            main_goal: record.main_goal,
            main_reason: record.main_reason,
            conditions: record.conditions,
            created_at: record.created_at,
            updated_at: record.updated_at,
            extra: record.extra,
        }
    }
}
