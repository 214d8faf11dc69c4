//! Admin flag fallback policy.

use serde::{Deserialize, Serialize};

/// Emails treated as admins while the admin table is not provisioned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdminAllowList(Vec<String>);

impl AdminAllowList {
    pub fn new<I, S>(emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(
            emails
                .into_iter()
                .map(|e| e.into().trim().to_lowercase())
                .filter(|e| !e.is_empty())
                .collect(),
        )
    }

    /// Case-insensitive email match. `None` never matches.
    pub fn contains(&self, email: Option<&str>) -> bool {
        let Some(email) = email.map(|e| e.trim().to_lowercase()) else {
            return false;
        };
        !email.is_empty() && self.0.iter().any(|e| *e == email)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
