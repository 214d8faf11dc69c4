use async_trait::async_trait;

use crate::ids::UserId;

use super::RemoteError;

/// Admin table: a row for the user id means the user is an admin.
#[async_trait]
pub trait AdminFlagPort: Send + Sync {
    async fn has_admin_row(&self, user_id: &UserId) -> Result<bool, RemoteError>;
}
