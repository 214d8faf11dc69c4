use std::sync::Arc;

use async_trait::async_trait;
use gaia_core::ports::{ClockPort, LocalStorePort, RemoteError, SessionPort};
use gaia_core::{Session, UserId};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use super::error::{classify_transport, ensure_success};
use super::BackendClient;

/// Local store key holding the persisted auth session.
pub const AUTH_SESSION_KEY: &str = "gaia.auth.session";

/// Refresh this long before the access token actually expires.
const EXPIRY_MARGIN_SECS: i64 = 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct AuthUser {
    id: UserId,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    expires_at: Option<i64>,
    user: AuthUser,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct StoredSession {
    access_token: String,
    refresh_token: String,
    /// Unix seconds.
    expires_at: i64,
    user: AuthUser,
}

impl StoredSession {
    fn from_token(token: TokenResponse, now_secs: i64) -> Self {
        let expires_at = token
            .expires_at
            .or_else(|| token.expires_in.map(|secs| now_secs + secs))
            .unwrap_or(now_secs);
        Self {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            expires_at,
            user: token.user,
        }
    }

    fn is_expired(&self, now_secs: i64) -> bool {
        self.expires_at - EXPIRY_MARGIN_SECS <= now_secs
    }

    fn session(&self) -> Session {
        Session::new(self.user.id.clone(), self.user.email.clone())
    }
}

/// Email/password auth against the backend's auth API.
///
/// The session is persisted in the local store so a restart keeps the user
/// signed in; expired access tokens are refreshed on read.
pub struct HttpAuth {
    client: Arc<BackendClient>,
    store: Arc<dyn LocalStorePort>,
    clock: Arc<dyn ClockPort>,
}

impl HttpAuth {
    pub fn new(
        client: Arc<BackendClient>,
        store: Arc<dyn LocalStorePort>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            client,
            store,
            clock,
        }
    }

    fn now_secs(&self) -> i64 {
        self.clock.now_ms() / 1_000
    }

    fn load_stored(&self) -> Option<StoredSession> {
        let raw = match self.store.get(AUTH_SESSION_KEY) {
            Ok(raw) => raw?,
            Err(err) => {
                warn!(error = %err, "auth session unreadable");
                return None;
            }
        };
        serde_json::from_str(&raw)
            .inspect_err(|err| debug!(error = %err, "discarding malformed auth session"))
            .ok()
    }

    fn remember(&self, stored: &StoredSession) {
        self.client.set_access_token(Some(stored.access_token.clone()));
        match serde_json::to_string(stored) {
            Ok(raw) => {
                if let Err(err) = self.store.set(AUTH_SESSION_KEY, &raw) {
                    warn!(error = %err, "auth session not persisted");
                }
            }
            Err(err) => warn!(error = %err, "auth session not serializable"),
        }
    }

    fn forget(&self) {
        self.client.set_access_token(None);
        if let Err(err) = self.store.remove(AUTH_SESSION_KEY) {
            warn!(error = %err, "auth session not removed");
        }
    }

    async fn post_token(&self, grant_type: &str, body: Value) -> Result<TokenResponse, RemoteError> {
        let url = self.client.auth_url("token");
        let response = self
            .client
            .request_as(Method::POST, &url, self.client.anon_key())
            .query(&[("grant_type", grant_type)])
            .json(&body)
            .send()
            .await
            .map_err(|e| classify_transport(&e))?;
        ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|e| RemoteError::Other(format!("invalid token payload: {e}")))
    }

    async fn refresh(&self, stored: &StoredSession) -> Result<Option<StoredSession>, RemoteError> {
        let body = json!({ "refresh_token": stored.refresh_token });
        match self.post_token("refresh_token", body).await {
            Ok(token) => {
                let refreshed = StoredSession::from_token(token, self.now_secs());
                self.remember(&refreshed);
                debug!(user_id = %refreshed.user.id, "access token refreshed");
                Ok(Some(refreshed))
            }
            Err(err) if err.is_network() => Err(err),
            Err(err) => {
                info!(error = %err, "refresh token rejected; signing out locally");
                self.forget();
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl SessionPort for HttpAuth {
    async fn get_session(&self) -> Result<Option<Session>, RemoteError> {
        let Some(stored) = self.load_stored() else {
            self.client.set_access_token(None);
            return Ok(None);
        };
        if !stored.is_expired(self.now_secs()) {
            self.client.set_access_token(Some(stored.access_token.clone()));
            return Ok(Some(stored.session()));
        }
        Ok(self.refresh(&stored).await?.map(|s| s.session()))
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, RemoteError> {
        let body = json!({ "email": email, "password": password });
        let token = self.post_token("password", body).await?;
        let stored = StoredSession::from_token(token, self.now_secs());
        self.remember(&stored);
        info!(user_id = %stored.user.id, "signed in");
        Ok(stored.session())
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<Option<Session>, RemoteError> {
        let url = self.client.auth_url("signup");
        let response = self
            .client
            .request_as(Method::POST, &url, self.client.anon_key())
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| classify_transport(&e))?;
        let payload: Value = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|e| RemoteError::Other(format!("invalid sign-up payload: {e}")))?;

        // Without an access token the account still has to confirm its email.
        if payload.get("access_token").is_none() {
            info!("sign-up pending email confirmation");
            return Ok(None);
        }
        let token: TokenResponse = serde_json::from_value(payload)
            .map_err(|e| RemoteError::Other(format!("invalid sign-up payload: {e}")))?;
        let stored = StoredSession::from_token(token, self.now_secs());
        self.remember(&stored);
        Ok(Some(stored.session()))
    }

    async fn sign_out(&self) -> Result<(), RemoteError> {
        let token = self.client.access_token();
        self.forget();
        let Some(token) = token else {
            return Ok(());
        };

        let url = self.client.auth_url("logout");
        let response = self
            .client
            .request_as(Method::POST, &url, &token)
            .send()
            .await
            .map_err(|e| classify_transport(&e))?;
        ensure_success(response).await?;
        Ok(())
    }

    async fn reset_password_for_email(
        &self,
        email: &str,
        redirect_to: &str,
    ) -> Result<(), RemoteError> {
        let url = self.client.auth_url("recover");
        let response = self
            .client
            .request_as(Method::POST, &url, self.client.anon_key())
            .query(&[("redirect_to", redirect_to)])
            .json(&json!({ "email": email }))
            .send()
            .await
            .map_err(|e| classify_transport(&e))?;
        ensure_success(response).await?;
        Ok(())
    }

    async fn update_password(&self, new_password: &str) -> Result<(), RemoteError> {
        let Some(token) = self.client.access_token() else {
            return Err(RemoteError::Permission("not signed in".to_string()));
        };
        let url = self.client.auth_url("user");
        let response = self
            .client
            .request_as(Method::PUT, &url, &token)
            .json(&json!({ "password": new_password }))
            .send()
            .await
            .map_err(|e| classify_transport(&e))?;
        ensure_success(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryLocalStore;

    struct FixedClock(i64);

    impl ClockPort for FixedClock {
        fn now_ms(&self) -> i64 {
            self.0
        }
    }

    const NOW_SECS: i64 = 1_792_238_400;

    fn stored(expires_at: i64) -> StoredSession {
        StoredSession {
            access_token: "access".into(),
            refresh_token: "refresh".into(),
            expires_at,
            user: AuthUser {
                id: UserId::from("u-1"),
                email: Some("ana@example.com".into()),
            },
        }
    }

    fn auth(store: Arc<MemoryLocalStore>) -> (HttpAuth, Arc<BackendClient>) {
        // Unroutable base url: any request made by these tests fails fast.
        let client = Arc::new(BackendClient::new("http://127.0.0.1:9", "anon").unwrap());
        let auth = HttpAuth::new(client.clone(), store, Arc::new(FixedClock(NOW_SECS * 1_000)));
        (auth, client)
    }

    #[test]
    fn expiry_uses_expires_in_when_absolute_time_missing() {
        let token: TokenResponse = serde_json::from_value(json!({
            "access_token": "a",
            "refresh_token": "r",
            "expires_in": 3600,
            "user": { "id": "u-1", "email": "ana@example.com" },
        }))
        .unwrap();
        let stored = StoredSession::from_token(token, NOW_SECS);
        assert_eq!(stored.expires_at, NOW_SECS + 3600);
        assert!(!stored.is_expired(NOW_SECS));
        assert!(stored.is_expired(NOW_SECS + 3600 - 30));
    }

    #[tokio::test]
    async fn valid_stored_session_is_returned_without_network() {
        let store = Arc::new(MemoryLocalStore::new());
        store
            .set(AUTH_SESSION_KEY, &serde_json::to_string(&stored(NOW_SECS + 600)).unwrap())
            .unwrap();
        let (auth, client) = auth(store);

        let session = auth.get_session().await.unwrap();

        assert_eq!(
            session,
            Some(Session::new(UserId::from("u-1"), Some("ana@example.com".into())))
        );
        assert_eq!(client.access_token().as_deref(), Some("access"));
    }

    #[tokio::test]
    async fn no_stored_session_is_signed_out() {
        let (auth, client) = auth(Arc::new(MemoryLocalStore::new()));
        assert_eq!(auth.get_session().await, Ok(None));
        assert_eq!(client.access_token(), None);
    }

    #[tokio::test]
    async fn sign_out_without_token_only_clears_locally() {
        let store = Arc::new(MemoryLocalStore::new());
        store.set(AUTH_SESSION_KEY, "garbage").unwrap();
        let (auth, _) = auth(store.clone());

        assert_eq!(auth.sign_out().await, Ok(()));
        assert_eq!(store.get(AUTH_SESSION_KEY).unwrap(), None);
    }

    #[tokio::test]
    async fn update_password_requires_session() {
        let (auth, _) = auth(Arc::new(MemoryLocalStore::new()));
        assert!(matches!(
            auth.update_password("nova-senha").await,
            Err(RemoteError::Permission(_))
        ));
    }
}
