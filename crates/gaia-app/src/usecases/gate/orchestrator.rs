//! Profile gate orchestrator.
//!
//! Drives the pure [`ProfileGate`] state machine and carries out the actions
//! it returns against the session-scoped loader.

use std::sync::Arc;

use gaia_core::routing::{GateAction, GateEvent, GateState, GateView, ProfileGate, Route};
use gaia_core::Session;
use serde_json::json;
use tokio::sync::Mutex;
use tracing::{debug, info, info_span, Instrument};

use crate::resilience::WarnLimiter;
use crate::usecases::profile::{LoadOutcome, LoadState, ProfileLoader};

/// Result of driving the gate: what to show and where to go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateOutcome {
    pub view: GateView,
    /// Navigation requested during this dispatch, replacing history.
    pub navigate_to: Option<Route>,
}

pub struct ProfileGateOrchestrator {
    gate: Mutex<ProfileGate>,
    loader: Arc<ProfileLoader>,
    warn: Arc<WarnLimiter>,
}

impl ProfileGateOrchestrator {
    pub fn new(loader: Arc<ProfileLoader>, warn: Arc<WarnLimiter>) -> Self {
        Self {
            gate: Mutex::new(ProfileGate::new()),
            loader,
            warn,
        }
    }

    pub async fn state(&self) -> GateState {
        self.gate.lock().await.state().clone()
    }

    /// Evaluates the gate for the current session.
    pub async fn enter(&self, session: Option<&Session>) -> GateOutcome {
        let event = match session {
            Some(_) => GateEvent::SessionStarted,
            None => GateEvent::SessionEnded,
        };
        self.dispatch(session, event).await
    }

    /// Manual retry from the error view.
    pub async fn retry(&self, session: Option<&Session>) -> GateOutcome {
        self.dispatch(session, GateEvent::Retry).await
    }

    async fn dispatch(&self, session: Option<&Session>, event: GateEvent) -> GateOutcome {
        let span = info_span!("usecase.profile_gate.dispatch", event = ?event_name(&event));
        async move {
            let mut gate = self.gate.lock().await;
            let mut navigate_to = None;
            let mut pending = vec![event];

            while let Some(event) = pending.pop() {
                let from = gate.state().clone();
                let actions = gate.handle(event);
                info!(from = ?from, to = ?gate.state(), "profile gate transition");

                for action in actions {
                    debug!(?action, "profile gate executing action");
                    match action {
                        GateAction::RequestProfileLoad => {
                            let Some(session) = session else {
                                pending.push(GateEvent::SessionEnded);
                                continue;
                            };
                            pending.push(self.load_for_gate(session).await);
                        }
                        GateAction::NavigateTo { route, .. } => navigate_to = Some(route),
                        GateAction::LogDegradedCache { message } => {
                            self.warn.warn(
                                "profile_gate_offline_cache",
                                json!({ "message": message }),
                            );
                        }
                    }
                }
            }

            GateOutcome {
                view: gate.view(),
                navigate_to,
            }
        }
        .instrument(span)
        .await
    }

    /// Loads the profile and turns the outcome into the next gate event.
    ///
    /// A superseded load resolves from whatever superseded it: the newer
    /// profile if one is loaded for this user, a fresh load otherwise.
    async fn load_for_gate(&self, session: &Session) -> GateEvent {
        loop {
            match self.loader.load(&session.user_id, false).await {
                LoadOutcome::Loaded(profile) => return GateEvent::ProfileLoaded(profile),
                LoadOutcome::Failed { error, cached } => {
                    return GateEvent::ProfileLoadFailed {
                        message: error.to_string(),
                        cached,
                    }
                }
                LoadOutcome::Superseded => {}
            }

            if self.loader.user_id().as_ref() != Some(&session.user_id) {
                debug!("profile state left this session; gate ends it");
                return GateEvent::SessionEnded;
            }
            if let LoadState::Loaded(profile) = self.loader.state() {
                debug!("profile load superseded by a newer profile");
                return GateEvent::ProfileLoaded(profile);
            }
            debug!("profile load superseded; loading again");
        }
    }
}

fn event_name(event: &GateEvent) -> &'static str {
    match event {
        GateEvent::SessionStarted => "session_started",
        GateEvent::SessionEnded => "session_ended",
        GateEvent::ProfileLoadStarted => "profile_load_started",
        GateEvent::ProfileLoaded(_) => "profile_loaded",
        GateEvent::ProfileLoadFailed { .. } => "profile_load_failed",
        GateEvent::Retry => "retry",
    }
}
