//! Profile gate state machine.
//!
//! Pure transition logic for the `/start` gate: it never performs I/O and
//! only returns the actions its driver has to carry out.

use serde::{Deserialize, Serialize};

use crate::profile::Profile;

use super::{next_step, OnboardingStep, Route};

/// Gate state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GateState {
    NoSession,
    Loading,
    Error { message: String },
    Resolved(OnboardingStep),
}

/// Signals that drive the gate.
#[derive(Debug, Clone, PartialEq)]
pub enum GateEvent {
    SessionStarted,
    SessionEnded,
    ProfileLoadStarted,
    ProfileLoaded(Option<Profile>),
    /// `cached` is the last known good profile for the same user, if any.
    ProfileLoadFailed {
        message: String,
        cached: Option<Profile>,
    },
    Retry,
}

/// Side-effects requested by a transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GateAction {
    RequestProfileLoad,
    NavigateTo { route: Route, replace: bool },
    /// Routing fell back to the locally cached profile.
    LogDegradedCache { message: String },
}

/// What the gate renders while it is not navigating away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateView {
    Waiting,
    /// Error with manual retry and go-to-login actions.
    Failed { message: String },
    Redirecting(Route),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileGate {
    state: GateState,
    last_target: Option<Route>,
}

impl Default for ProfileGate {
    fn default() -> Self {
        Self::new()
    }
}

impl ProfileGate {
    pub fn new() -> Self {
        Self {
            state: GateState::NoSession,
            last_target: None,
        }
    }

    pub fn state(&self) -> &GateState {
        &self.state
    }

    pub fn last_target(&self) -> Option<Route> {
        self.last_target
    }

    pub fn view(&self) -> GateView {
        match &self.state {
            GateState::NoSession => GateView::Redirecting(Route::Auth),
            GateState::Loading => GateView::Waiting,
            GateState::Error { message } => GateView::Failed {
                message: message.clone(),
            },
            GateState::Resolved(step) => GateView::Redirecting(step.route()),
        }
    }

    pub fn handle(&mut self, event: GateEvent) -> Vec<GateAction> {
        let current = std::mem::replace(&mut self.state, GateState::NoSession);
        let (next, actions) = match (current, event) {
            (_, GateEvent::SessionEnded) => {
                self.last_target = None;
                (GateState::NoSession, self.navigate(Route::Auth))
            }

            // Each session start is a new visit to the gate.
            (_, GateEvent::SessionStarted) => {
                self.last_target = None;
                (GateState::Loading, vec![GateAction::RequestProfileLoad])
            }

            (GateState::NoSession, _) => (GateState::NoSession, Vec::new()),

            (_, GateEvent::ProfileLoadStarted) => (GateState::Loading, Vec::new()),

            (_, GateEvent::ProfileLoaded(profile)) => {
                let step = next_step(profile.as_ref());
                (GateState::Resolved(step), self.navigate(step.route()))
            }

            (_, GateEvent::ProfileLoadFailed { message, cached }) => match cached {
                Some(profile) => {
                    let step = next_step(Some(&profile));
                    let mut actions = vec![GateAction::LogDegradedCache { message }];
                    actions.extend(self.navigate(step.route()));
                    (GateState::Resolved(step), actions)
                }
                None => (GateState::Error { message }, Vec::new()),
            },

            (GateState::Error { .. }, GateEvent::Retry) => {
                (GateState::Loading, vec![GateAction::RequestProfileLoad])
            }

            (state, GateEvent::Retry) => (state, Vec::new()),
        };
        self.state = next;
        actions
    }

    fn navigate(&mut self, route: Route) -> Vec<GateAction> {
        if self.last_target == Some(route) {
            return Vec::new();
        }
        self.last_target = Some(route);
        vec![GateAction::NavigateTo {
            route,
            replace: true,
        }]
    }
}
