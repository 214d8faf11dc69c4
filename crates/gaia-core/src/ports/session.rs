use async_trait::async_trait;

use crate::session::Session;

use super::RemoteError;

/// Authentication backend.
#[async_trait]
pub trait SessionPort: Send + Sync {
    async fn get_session(&self) -> Result<Option<Session>, RemoteError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, RemoteError>;

    /// Returns `None` when the account still needs email confirmation.
    async fn sign_up(&self, email: &str, password: &str) -> Result<Option<Session>, RemoteError>;

    async fn sign_out(&self) -> Result<(), RemoteError>;

    async fn reset_password_for_email(
        &self,
        email: &str,
        redirect_to: &str,
    ) -> Result<(), RemoteError>;

    async fn update_password(&self, new_password: &str) -> Result<(), RemoteError>;
}
