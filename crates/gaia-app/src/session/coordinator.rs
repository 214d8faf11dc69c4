//! Session-scoped coordinator.
//!
//! Owns everything tied to the signed-in user: the current session, the
//! profile loader, the admin flag, the profile gate and the event hub.
//! Sign-out or a user switch invalidates the loader so late results never
//! repopulate state for a user who is gone.

use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use gaia_core::ports::{RemoteError, SessionPort};
use gaia_core::routing::{evaluate_guard, GuardContext, GuardOutcome, Route};
use gaia_core::{Profile, Session, SessionEvent};
use serde_json::json;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info, info_span, Instrument};

use crate::resilience::{attempt_with_retry, RetryPolicy, WarnLimiter};
use crate::usecases::admin::CheckAdmin;
use crate::usecases::gate::{GateOutcome, ProfileGateOrchestrator};
use crate::usecases::profile::{LoadState, ProfileLoader};

use super::{SessionHub, SubscriptionId};

const AUTH_TIMEOUT: Duration = Duration::from_secs(20);

/// Point-in-time view used to evaluate route guards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionSnapshot {
    pub session: Option<Session>,
    pub profile: Option<Profile>,
    pub loading: bool,
    pub error: Option<String>,
    pub is_admin: bool,
}

impl SessionSnapshot {
    pub fn guard(&self, route: Route) -> GuardOutcome {
        let ctx = GuardContext {
            session: self.session.as_ref(),
            profile: self.profile.as_ref(),
            loading: self.loading,
            error: self.error.as_deref(),
            is_admin: self.is_admin,
        };
        evaluate_guard(route, &ctx)
    }
}

#[derive(Debug, Default)]
struct CoordinatorState {
    session: Option<Session>,
    is_admin: bool,
    bootstrapped: bool,
}

pub struct SessionCoordinator {
    auth: Arc<dyn SessionPort>,
    loader: Arc<ProfileLoader>,
    admin: Arc<CheckAdmin>,
    gate: ProfileGateOrchestrator,
    hub: SessionHub,
    warn: Arc<WarnLimiter>,
    state: Mutex<CoordinatorState>,
    signing_out: AtomicBool,
}

fn auth_policy(message: &'static str) -> RetryPolicy {
    RetryPolicy::single(AUTH_TIMEOUT, message)
}

impl SessionCoordinator {
    pub fn new(
        auth: Arc<dyn SessionPort>,
        loader: Arc<ProfileLoader>,
        admin: Arc<CheckAdmin>,
        warn: Arc<WarnLimiter>,
    ) -> Self {
        Self {
            gate: ProfileGateOrchestrator::new(loader.clone(), warn.clone()),
            auth,
            loader,
            admin,
            hub: SessionHub::new(),
            warn,
            state: Mutex::new(CoordinatorState::default()),
            signing_out: AtomicBool::new(false),
        }
    }

    pub fn loader(&self) -> &Arc<ProfileLoader> {
        &self.loader
    }

    pub fn subscribe(&self) -> (SubscriptionId, mpsc::UnboundedReceiver<SessionEvent>) {
        self.hub.subscribe()
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.hub.unsubscribe(id)
    }

    pub async fn session(&self) -> Option<Session> {
        self.state.lock().await.session.clone()
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.lock().await;
        let (profile, loading, error) = match self.loader.state() {
            LoadState::Idle => (None, false, None),
            LoadState::Loading => (None, true, None),
            LoadState::Loaded(profile) => (profile, false, None),
            LoadState::Failed(err) => (None, false, Some(err.message().to_string())),
        };
        SessionSnapshot {
            session: state.session.clone(),
            profile,
            loading,
            error,
            is_admin: state.is_admin,
        }
    }

    /// Reads the current session and loads what belongs to it.
    pub async fn bootstrap(&self) -> Result<Option<Session>, RemoteError> {
        let span = info_span!("usecase.session_bootstrap.execute");
        async {
            let result = attempt_with_retry(
                &auth_policy("Supabase timeout ao obter sessão"),
                move |_| self.auth.get_session(),
                |_, _| ControlFlow::Continue(()),
            )
            .await;

            let session = match result {
                Ok(session) => session,
                Err(err) => {
                    self.reset_state().await;
                    self.state.lock().await.bootstrapped = true;
                    return Err(err);
                }
            };

            self.apply_session(session.clone()).await;
            self.state.lock().await.bootstrapped = true;
            self.hub.publish(SessionEvent::InitialSession(session.clone()));
            info!(signed_in = session.is_some(), "session bootstrapped");
            Ok(session)
        }
        .instrument(span)
        .await
    }

    /// Applies a session change reported by the auth backend.
    pub async fn handle_event(&self, event: SessionEvent) {
        let span = info_span!("usecase.session_event.execute", event = event.name());
        async {
            match event {
                SessionEvent::InitialSession(session) => {
                    if self.state.lock().await.bootstrapped {
                        debug!("initial session ignored after bootstrap");
                        return;
                    }
                    self.apply_session(session.clone()).await;
                    self.state.lock().await.bootstrapped = true;
                    self.hub.publish(SessionEvent::InitialSession(session));
                }
                SessionEvent::SignedIn(session) | SessionEvent::TokenRefreshed(session) => {
                    let refreshed = event_is_refresh(&session, &self.session().await);
                    self.apply_session(Some(session.clone())).await;
                    let event = if refreshed {
                        SessionEvent::TokenRefreshed(session)
                    } else {
                        SessionEvent::SignedIn(session)
                    };
                    self.hub.publish(event);
                }
                SessionEvent::SignedOut => {
                    self.reset_state().await;
                    self.hub.publish(SessionEvent::SignedOut);
                }
            }
        }
        .instrument(span)
        .await
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, RemoteError> {
        let session = attempt_with_retry(
            &auth_policy("Supabase timeout ao entrar"),
            move |_| self.auth.sign_in(email, password),
            |_, _| ControlFlow::Continue(()),
        )
        .await?;
        self.handle_event(SessionEvent::SignedIn(session.clone())).await;
        Ok(session)
    }

    /// `None` when the account must confirm its email before signing in.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<Option<Session>, RemoteError> {
        let session = attempt_with_retry(
            &auth_policy("Supabase timeout ao criar conta"),
            move |_| self.auth.sign_up(email, password),
            |_, _| ControlFlow::Continue(()),
        )
        .await?;
        if let Some(session) = &session {
            self.handle_event(SessionEvent::SignedIn(session.clone())).await;
        }
        Ok(session)
    }

    pub async fn reset_password_for_email(&self, email: &str, redirect_to: &str) -> Result<(), RemoteError> {
        attempt_with_retry(
            &auth_policy("Supabase timeout ao enviar e-mail"),
            move |_| self.auth.reset_password_for_email(email, redirect_to),
            |_, _| ControlFlow::Continue(()),
        )
        .await
    }

    pub async fn update_password(&self, new_password: &str) -> Result<(), RemoteError> {
        attempt_with_retry(
            &auth_policy("Supabase timeout ao atualizar senha"),
            move |_| self.auth.update_password(new_password),
            |_, _| ControlFlow::Continue(()),
        )
        .await
    }

    /// Signs out. Local state is always cleared, even when the backend call
    /// fails. Returns `None` if a sign-out is already running.
    pub async fn sign_out(&self) -> Option<Route> {
        if self.signing_out.swap(true, Ordering::SeqCst) {
            debug!("sign-out already in progress");
            return None;
        }

        let span = info_span!("usecase.sign_out.execute");
        async {
            let result = attempt_with_retry(
                &auth_policy("Supabase timeout ao sair"),
                move |_| self.auth.sign_out(),
                |_, _| ControlFlow::Continue(()),
            )
            .await;
            if let Err(err) = result {
                self.warn
                    .warn("signout_error", json!({ "message": err.to_string() }));
            }

            self.reset_state().await;
            self.hub.publish(SessionEvent::SignedOut);
            info!("signed out");
        }
        .instrument(span)
        .await;

        self.signing_out.store(false, Ordering::SeqCst);
        Some(Route::Auth)
    }

    pub fn is_signing_out(&self) -> bool {
        self.signing_out.load(Ordering::SeqCst)
    }

    /// Evaluates the `/start` gate for the current session.
    pub async fn enter_gate(&self) -> GateOutcome {
        let session = self.session().await;
        self.gate.enter(session.as_ref()).await
    }

    pub async fn retry_gate(&self) -> GateOutcome {
        let session = self.session().await;
        self.gate.retry(session.as_ref()).await
    }

    pub async fn guard(&self, route: Route) -> GuardOutcome {
        self.snapshot().await.guard(route)
    }

    async fn apply_session(&self, session: Option<Session>) {
        let Some(session) = session else {
            self.reset_state().await;
            return;
        };

        let previous = self.state.lock().await.session.replace(session.clone());
        if previous.is_some_and(|p| p.user_id != session.user_id) {
            self.loader.invalidate();
        }

        self.loader.load(&session.user_id, false).await;
        let is_admin = self.admin.execute(Some(&session)).await;

        let mut state = self.state.lock().await;
        if state.session.as_ref().map(|s| &s.user_id) == Some(&session.user_id) {
            state.is_admin = is_admin;
        }
    }

    async fn reset_state(&self) {
        self.loader.invalidate();
        let mut state = self.state.lock().await;
        state.session = None;
        state.is_admin = false;
    }
}

fn event_is_refresh(incoming: &Session, current: &Option<Session>) -> bool {
    current.as_ref().is_some_and(|c| c.user_id == incoming.user_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecases::test_support::{
        gateway, session_for, FakeAdminTable, FakeAuth, FakeProfileStore, FixedClock, MemStore,
        Script, NOW_MS,
    };
    use crate::usecases::steps::ProfileSteps;
    use gaia_core::admin::AdminAllowList;
    use gaia_core::routing::GateView;
    use gaia_core::UserId;
    use serde_json::json;

    fn complete_row(id: &str) -> serde_json::Value {
        json!({
            "id": id,
            "full_name": "Ana Souza",
            "phone": "(11) 98888-7777",
            "cpf": "529.982.247-25",
            "birth_date": "01/02/1990",
            "age_range": "25-34",
            "main_goal": "Dormir melhor",
            "main_reason": "Insônia",
            "conditions": ["Insônia"],
        })
    }

    fn coordinator(auth: FakeAuth, store: Arc<FakeProfileStore>) -> (SessionCoordinator, Arc<FakeAuth>) {
        let auth = Arc::new(auth);
        let loader = Arc::new(ProfileLoader::new(gateway(store, Arc::new(MemStore::default()))));
        let admin = Arc::new(CheckAdmin::new(
            Arc::new(FakeAdminTable::with_admins([UserId::from("uid-root")])),
            AdminAllowList::default(),
        ));
        let coordinator =
            SessionCoordinator::new(auth.clone(), loader, admin, Arc::new(WarnLimiter::new()));
        (coordinator, auth)
    }

    #[tokio::test(start_paused = true)]
    async fn bootstrap_without_session_guards_to_auth() {
        let (coordinator, _) = coordinator(FakeAuth::default(), Arc::default());

        assert_eq!(coordinator.bootstrap().await, Ok(None));

        let snapshot = coordinator.snapshot().await;
        assert_eq!(snapshot.session, None);
        assert_eq!(snapshot.guard(Route::MainApp), GuardOutcome::Redirect(Route::Auth));
        assert_eq!(snapshot.guard(Route::Login), GuardOutcome::Render);
    }

    #[tokio::test(start_paused = true)]
    async fn bootstrap_with_complete_profile_enters_main_app() {
        let ana = session_for("ana@example.com");
        let store = Arc::new(FakeProfileStore::with_row(complete_row("uid-ana")));
        let (coordinator, _) = coordinator(FakeAuth::signed_in(ana.clone()), store);

        assert_eq!(coordinator.bootstrap().await, Ok(Some(ana)));

        let outcome = coordinator.enter_gate().await;
        assert_eq!(outcome.navigate_to, Some(Route::MainApp));
        assert_eq!(coordinator.guard(Route::Products).await, GuardOutcome::Render);
        assert_eq!(
            coordinator.guard(Route::AdminContents).await,
            GuardOutcome::Redirect(Route::MainApp)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn sign_in_loads_profile_and_admin_flag() {
        let store = Arc::new(FakeProfileStore::with_row(complete_row("uid-root")));
        let (coordinator, _) = coordinator(FakeAuth::default(), store);
        let (_id, mut events) = coordinator.subscribe();

        let session = coordinator.sign_in("root@gaia.example", "segredo123").await.unwrap();

        let snapshot = coordinator.snapshot().await;
        assert_eq!(snapshot.session, Some(session.clone()));
        assert!(snapshot.is_admin);
        assert!(snapshot.profile.is_some());
        assert_eq!(events.recv().await, Some(SessionEvent::SignedIn(session)));
        assert_eq!(coordinator.guard(Route::AdminContents).await, GuardOutcome::Render);
    }

    #[tokio::test(start_paused = true)]
    async fn wrong_password_keeps_signed_out() {
        let (coordinator, _) = coordinator(FakeAuth::default(), Arc::default());

        let err = coordinator.sign_in("ana@example.com", "errada").await.unwrap_err();

        assert_eq!(err.message(), "Invalid login credentials");
        assert_eq!(coordinator.session().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn sign_up_pending_confirmation_has_no_session() {
        let (coordinator, _) = coordinator(FakeAuth::requiring_confirmation(), Arc::default());

        assert_eq!(coordinator.sign_up("novo@example.com", "segredo123").await, Ok(None));
        assert_eq!(coordinator.session().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn token_refresh_for_same_user_does_not_refetch() {
        let ana = session_for("ana@example.com");
        let store = Arc::new(FakeProfileStore::with_row(complete_row("uid-ana")));
        let (coordinator, _) = coordinator(FakeAuth::signed_in(ana.clone()), store.clone());
        coordinator.bootstrap().await.unwrap();

        coordinator.handle_event(SessionEvent::TokenRefreshed(ana)).await;

        assert_eq!(store.fetches(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn initial_session_after_bootstrap_is_ignored() {
        let (coordinator, _) = coordinator(FakeAuth::default(), Arc::default());
        coordinator.bootstrap().await.unwrap();

        coordinator
            .handle_event(SessionEvent::InitialSession(Some(session_for("ana@example.com"))))
            .await;

        assert_eq!(coordinator.session().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn switching_user_replaces_profile() {
        let store = Arc::new(FakeProfileStore::with_row(complete_row("uid-ana")));
        let (coordinator, _) = coordinator(FakeAuth::default(), store);
        coordinator.sign_in("ana@example.com", "segredo123").await.unwrap();

        coordinator
            .handle_event(SessionEvent::SignedIn(session_for("bia@example.com")))
            .await;

        let snapshot = coordinator.snapshot().await;
        assert_eq!(snapshot.profile, None);
        assert_eq!(coordinator.loader().user_id(), Some(UserId::from("uid-bia")));
        assert_eq!(
            coordinator.guard(Route::MainApp).await,
            GuardOutcome::Redirect(Route::PersonalInfo)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn sign_out_clears_state_even_when_backend_fails() {
        let ana = session_for("ana@example.com");
        let store = Arc::new(FakeProfileStore::with_row(complete_row("uid-ana")));
        let (coordinator, auth) = coordinator(FakeAuth::signed_in(ana), store);
        coordinator.bootstrap().await.unwrap();
        auth.fail_sign_out(RemoteError::classify("Failed to fetch"));
        let (_id, mut events) = coordinator.subscribe();

        assert_eq!(coordinator.sign_out().await, Some(Route::Auth));

        let snapshot = coordinator.snapshot().await;
        assert_eq!(snapshot, SessionSnapshot::default());
        assert_eq!(events.recv().await, Some(SessionEvent::SignedOut));
        assert_eq!(coordinator.enter_gate().await.view, GateView::Redirecting(Route::Auth));
    }

    #[tokio::test(start_paused = true)]
    async fn gate_navigates_again_after_signing_back_in() {
        let (coordinator, _) = coordinator(FakeAuth::default(), Arc::default());
        coordinator.sign_in("ana@example.com", "segredo123").await.unwrap();
        assert_eq!(coordinator.enter_gate().await.navigate_to, Some(Route::PersonalInfo));

        coordinator.sign_out().await;
        coordinator.sign_in("ana@example.com", "segredo123").await.unwrap();

        let outcome = coordinator.enter_gate().await;
        assert_eq!(outcome.navigate_to, Some(Route::PersonalInfo));
        assert_eq!(outcome.view, GateView::Redirecting(Route::PersonalInfo));
    }

    #[tokio::test(start_paused = true)]
    async fn save_finishing_after_sign_out_does_not_restore_profile() {
        let store = Arc::new(FakeProfileStore::default());
        let (coordinator, _) = coordinator(FakeAuth::default(), store.clone());
        let ana = coordinator.sign_in("ana@example.com", "segredo123").await.unwrap();
        let steps = Arc::new(ProfileSteps::new(
            gateway(store.clone(), Arc::new(MemStore::default())),
            coordinator.loader().clone(),
            Arc::new(FixedClock(NOW_MS)),
        ));
        store.push(Script::Delay(Duration::from_secs(2)));

        let pending = {
            let steps = steps.clone();
            let user_id = ana.user_id.clone();
            tokio::spawn(async move { steps.save_main_goal(&user_id, "Mais Foco").await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        coordinator.sign_out().await;
        pending.await.unwrap().unwrap();

        let snapshot = coordinator.snapshot().await;
        assert_eq!(snapshot.session, None);
        assert_eq!(snapshot.profile, None);
        assert_eq!(store.upserts(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_sign_out_runs_once() {
        let (coordinator, auth) = coordinator(
            FakeAuth::signed_in(session_for("ana@example.com")),
            Arc::default(),
        );
        coordinator.bootstrap().await.unwrap();
        auth.slow_sign_out(Duration::from_millis(200));

        let (first, second) = tokio::join!(coordinator.sign_out(), coordinator.sign_out());

        assert_eq!(first, Some(Route::Auth));
        assert_eq!(second, None);
        assert_eq!(auth.sign_outs(), 1);
        assert!(!coordinator.is_signing_out());
    }
}
