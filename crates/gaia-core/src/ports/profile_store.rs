use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::ids::UserId;
use crate::profile::ProfileRecord;

use super::RemoteError;

/// Remote profile table keyed by user id.
#[async_trait]
pub trait ProfileStorePort: Send + Sync {
    /// Reads at most one row, selecting `columns`.
    async fn fetch(
        &self,
        user_id: &UserId,
        columns: &[&str],
    ) -> Result<Option<ProfileRecord>, RemoteError>;

    /// Merge-writes `row` on conflict of `id` and returns the stored row.
    ///
    /// Only the keys present in `row` are written.
    async fn upsert(&self, row: Map<String, Value>) -> Result<Option<ProfileRecord>, RemoteError>;
}
