//! Hand-written port fakes shared by use-case tests.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use gaia_core::ports::{
    AdminFlagPort, ClockPort, LocalStoreError, LocalStorePort, ProfileStorePort, RemoteError,
    SessionPort,
};
use gaia_core::{ProfileRecord, Session, UserId};
use serde_json::{Map, Value};

use crate::resilience::WarnLimiter;
use crate::usecases::profile::{ProfileCache, ProfileGateway};

#[derive(Default)]
pub struct MemStore {
    entries: Mutex<HashMap<String, String>>,
}

impl LocalStorePort for MemStore {
    fn get(&self, key: &str) -> Result<Option<String>, LocalStoreError> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), LocalStoreError> {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), LocalStoreError> {
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }
}

pub struct FixedClock(pub i64);

impl ClockPort for FixedClock {
    fn now_ms(&self) -> i64 {
        self.0
    }
}

/// 2026-10-17T12:00:00Z
pub const NOW_MS: i64 = 1_792_238_400_000;

/// Scripted failure for the next remote call.
#[derive(Clone)]
pub enum Script {
    Fail(RemoteError),
    Hang,
    /// Succeeds after the given delay.
    Delay(Duration),
}

/// Profile table fake with merge-on-upsert semantics.
#[derive(Default)]
pub struct FakeProfileStore {
    rows: Mutex<HashMap<UserId, Map<String, Value>>>,
    script: Mutex<VecDeque<Script>>,
    fetch_calls: AtomicUsize,
    upsert_calls: AtomicUsize,
    hide_written_row: bool,
}

impl FakeProfileStore {
    pub fn with_row(row: Value) -> Self {
        let store = Self::default();
        store.put(row);
        store
    }

    /// Upserts succeed without returning the written row.
    pub fn without_returned_rows() -> Self {
        Self {
            hide_written_row: true,
            ..Default::default()
        }
    }

    pub fn put(&self, row: Value) {
        let Value::Object(fields) = row else {
            panic!("row must be an object");
        };
        let id = UserId::from(fields["id"].as_str().unwrap());
        self.rows.lock().unwrap().insert(id, fields);
    }

    pub fn push(&self, step: Script) {
        self.script.lock().unwrap().push_back(step);
    }

    pub fn fetches(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    pub fn upserts(&self) -> usize {
        self.upsert_calls.load(Ordering::SeqCst)
    }

    async fn run_script(&self) -> Result<(), RemoteError> {
        let next = self.script.lock().unwrap().pop_front();
        match next {
            None => Ok(()),
            Some(Script::Fail(err)) => Err(err),
            Some(Script::Hang) => std::future::pending().await,
            Some(Script::Delay(delay)) => {
                tokio::time::sleep(delay).await;
                Ok(())
            }
        }
    }

    fn record(fields: &Map<String, Value>) -> ProfileRecord {
        serde_json::from_value(Value::Object(fields.clone())).unwrap()
    }
}

#[async_trait]
impl ProfileStorePort for FakeProfileStore {
    async fn fetch(
        &self,
        user_id: &UserId,
        _columns: &[&str],
    ) -> Result<Option<ProfileRecord>, RemoteError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        self.run_script().await?;
        Ok(self.rows.lock().unwrap().get(user_id).map(Self::record))
    }

    async fn upsert(&self, row: Map<String, Value>) -> Result<Option<ProfileRecord>, RemoteError> {
        self.upsert_calls.fetch_add(1, Ordering::SeqCst);
        self.run_script().await?;
        let id = UserId::from(row["id"].as_str().unwrap());
        let mut rows = self.rows.lock().unwrap();
        let stored = rows.entry(id).or_default();
        stored.extend(row);
        if self.hide_written_row {
            return Ok(None);
        }
        Ok(Some(Self::record(stored)))
    }
}

pub fn gateway(store: Arc<FakeProfileStore>, local: Arc<MemStore>) -> Arc<ProfileGateway> {
    Arc::new(ProfileGateway::new(
        store,
        ProfileCache::new(local),
        Arc::new(FixedClock(NOW_MS)),
        Arc::new(WarnLimiter::new()),
    ))
}

/// Auth backend fake holding at most one signed-in session.
#[derive(Default)]
pub struct FakeAuth {
    current: Mutex<Option<Session>>,
    sign_out_error: Mutex<Option<RemoteError>>,
    sign_out_delay: Mutex<Option<Duration>>,
    sign_out_calls: AtomicUsize,
    confirm_email: bool,
}

impl FakeAuth {
    pub fn signed_in(session: Session) -> Self {
        let auth = Self::default();
        *auth.current.lock().unwrap() = Some(session);
        auth
    }

    /// Sign-up returns no session until the email is confirmed.
    pub fn requiring_confirmation() -> Self {
        Self {
            confirm_email: true,
            ..Default::default()
        }
    }

    pub fn fail_sign_out(&self, err: RemoteError) {
        *self.sign_out_error.lock().unwrap() = Some(err);
    }

    pub fn slow_sign_out(&self, delay: Duration) {
        *self.sign_out_delay.lock().unwrap() = Some(delay);
    }

    pub fn sign_outs(&self) -> usize {
        self.sign_out_calls.load(Ordering::SeqCst)
    }
}

pub fn session_for(email: &str) -> Session {
    let local = email.split('@').next().unwrap_or(email);
    Session::new(UserId::from(format!("uid-{local}")), Some(email.to_string()))
}

#[async_trait]
impl SessionPort for FakeAuth {
    async fn get_session(&self) -> Result<Option<Session>, RemoteError> {
        Ok(self.current.lock().unwrap().clone())
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, RemoteError> {
        if password != "segredo123" {
            return Err(RemoteError::classify("Invalid login credentials"));
        }
        let session = session_for(email);
        *self.current.lock().unwrap() = Some(session.clone());
        Ok(session)
    }

    async fn sign_up(&self, email: &str, _password: &str) -> Result<Option<Session>, RemoteError> {
        if self.confirm_email {
            return Ok(None);
        }
        let session = session_for(email);
        *self.current.lock().unwrap() = Some(session.clone());
        Ok(Some(session))
    }

    async fn sign_out(&self) -> Result<(), RemoteError> {
        self.sign_out_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.sign_out_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        *self.current.lock().unwrap() = None;
        match self.sign_out_error.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn reset_password_for_email(&self, _email: &str, _redirect_to: &str) -> Result<(), RemoteError> {
        Ok(())
    }

    async fn update_password(&self, new_password: &str) -> Result<(), RemoteError> {
        if new_password.len() < 6 {
            return Err(RemoteError::classify("Password should be at least 6 characters"));
        }
        Ok(())
    }
}

/// Admin table fake listing user ids that have a row.
#[derive(Default)]
pub struct FakeAdminTable {
    admins: Vec<UserId>,
}

impl FakeAdminTable {
    pub fn with_admins<I: IntoIterator<Item = UserId>>(admins: I) -> Self {
        Self {
            admins: admins.into_iter().collect(),
        }
    }
}

#[async_trait]
impl AdminFlagPort for FakeAdminTable {
    async fn has_admin_row(&self, user_id: &UserId) -> Result<bool, RemoteError> {
        Ok(self.admins.contains(user_id))
    }
}
