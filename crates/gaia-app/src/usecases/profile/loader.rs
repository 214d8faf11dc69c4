//! Session-scoped profile loader.
//!
//! Owns the "current profile" state for the signed-in user. Loads for the
//! same user that overlap share one in-flight request; results are applied
//! only if their sequence token is still current, so a load that was
//! superseded (user switch, sign-out, save) is discarded on arrival.
//! Saved rows carry the epoch they started in and are dropped once an
//! invalidation has moved the epoch on.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::{BoxFuture, FutureExt, Shared};
use gaia_core::ports::RemoteError;
use gaia_core::{Profile, UserId};
use tracing::{debug, info, info_span, Instrument};

use super::ProfileGateway;

type SharedLoad = Shared<BoxFuture<'static, Result<Option<Profile>, RemoteError>>>;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Loaded(Option<Profile>),
    Failed(RemoteError),
}

/// Result of [`ProfileLoader::load`] as seen by its caller.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    Loaded(Option<Profile>),
    /// `cached` is the last known good profile for the same user, if any.
    Failed {
        error: RemoteError,
        cached: Option<Profile>,
    },
    /// A newer load, save or invalidation happened while this one was in flight.
    Superseded,
}

struct InFlight {
    user_id: UserId,
    seq: u64,
    future: SharedLoad,
}

#[derive(Default)]
struct Inner {
    state: LoadState,
    user_id: Option<UserId>,
    in_flight: Option<InFlight>,
}

pub struct ProfileLoader {
    gateway: Arc<ProfileGateway>,
    seq: AtomicU64,
    epoch: AtomicU64,
    inner: Mutex<Inner>,
}

impl ProfileLoader {
    pub fn new(gateway: Arc<ProfileGateway>) -> Self {
        Self {
            gateway,
            seq: AtomicU64::new(0),
            epoch: AtomicU64::new(0),
            inner: Mutex::new(Inner::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn next_seq(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn state(&self) -> LoadState {
        self.lock().state.clone()
    }

    /// Current profile, if one is loaded.
    pub fn profile(&self) -> Option<Profile> {
        match &self.lock().state {
            LoadState::Loaded(profile) => profile.clone(),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.lock().state, LoadState::Loading)
    }

    pub fn error(&self) -> Option<RemoteError> {
        match &self.lock().state {
            LoadState::Failed(err) => Some(err.clone()),
            _ => None,
        }
    }

    /// User whose profile the current state belongs to.
    pub fn user_id(&self) -> Option<UserId> {
        self.lock().user_id.clone()
    }

    /// Loads the profile for `user_id`.
    ///
    /// Returns the already loaded profile for the same user unless `force` is
    /// set, and joins a running load for the same user instead of issuing a
    /// second request.
    pub async fn load(&self, user_id: &UserId, force: bool) -> LoadOutcome {
        let span = info_span!("usecase.load_profile.execute", user_id = %user_id, force);
        async move {
            let (seq, future) = {
                let mut inner = self.lock();

                if !force && inner.user_id.as_ref() == Some(user_id) {
                    if let LoadState::Loaded(profile) = &inner.state {
                        debug!("profile already loaded for user");
                        return LoadOutcome::Loaded(profile.clone());
                    }
                }

                let running = inner
                    .in_flight
                    .as_ref()
                    .filter(|running| &running.user_id == user_id)
                    .map(|running| (running.seq, running.future.clone()));

                if let Some((seq, future)) = running {
                    debug!(seq, "joining in-flight profile load");
                    (seq, future)
                } else {
                    let seq = self.next_seq();
                    let gateway = self.gateway.clone();
                    let target = user_id.clone();
                    let future = async move { gateway.fetch_profile(&target).await }
                        .boxed()
                        .shared();
                    inner.in_flight = Some(InFlight {
                        user_id: user_id.clone(),
                        seq,
                        future: future.clone(),
                    });
                    inner.state = LoadState::Loading;
                    inner.user_id = Some(user_id.clone());
                    (seq, future)
                }
            };

            let result = future.await;
            self.settle(seq, user_id, result)
        }
        .instrument(span)
        .await
    }

    fn settle(
        &self,
        seq: u64,
        user_id: &UserId,
        result: Result<Option<Profile>, RemoteError>,
    ) -> LoadOutcome {
        let mut inner = self.lock();
        if self.seq.load(Ordering::SeqCst) != seq {
            debug!(seq, "discarding superseded profile load");
            return LoadOutcome::Superseded;
        }
        if inner.in_flight.as_ref().is_some_and(|f| f.seq == seq) {
            inner.in_flight = None;
        }

        match result {
            Ok(profile) => {
                inner.state = LoadState::Loaded(profile.clone());
                LoadOutcome::Loaded(profile)
            }
            Err(error) => {
                inner.state = LoadState::Failed(error.clone());
                drop(inner);
                let cached = self.gateway.cache().read(user_id);
                LoadOutcome::Failed { error, cached }
            }
        }
    }

    /// Replaces the current profile with a freshly saved row.
    ///
    /// Any load still in flight is superseded.
    pub fn set_profile(&self, user_id: &UserId, profile: Option<Profile>) {
        self.next_seq();
        let mut inner = self.lock();
        inner.in_flight = None;
        inner.user_id = Some(user_id.clone());
        inner.state = LoadState::Loaded(profile);
    }

    /// Token identifying the current session's profile state.
    ///
    /// Moves on every [`invalidate`](Self::invalidate), never on loads or saves.
    pub fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }

    /// Like [`set_profile`](Self::set_profile), but only while `epoch` is
    /// still current and the state does not belong to another user.
    ///
    /// Returns whether the profile was applied.
    pub fn set_profile_if_current(
        &self,
        epoch: u64,
        user_id: &UserId,
        profile: Option<Profile>,
    ) -> bool {
        let mut inner = self.lock();
        let other_user = inner.user_id.as_ref().is_some_and(|id| id != user_id);
        if self.epoch.load(Ordering::SeqCst) != epoch || other_user {
            debug!(epoch, "discarding profile from a previous session");
            return false;
        }
        self.next_seq();
        inner.in_flight = None;
        inner.user_id = Some(user_id.clone());
        inner.state = LoadState::Loaded(profile);
        true
    }

    /// Drops all state; late results of running loads and saves are discarded.
    pub fn invalidate(&self) {
        let mut inner = self.lock();
        let seq = self.next_seq();
        self.epoch.fetch_add(1, Ordering::SeqCst);
        *inner = Inner::default();
        info!(seq, "profile state invalidated");
    }
}
