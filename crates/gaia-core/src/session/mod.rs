//! Authenticated session as seen by the client.

use serde::{Deserialize, Serialize};

use crate::ids::UserId;

/// An authenticated session. Carries the user id and email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: UserId,
    #[serde(default)]
    pub email: Option<String>,
}

impl Session {
    pub fn new(user_id: UserId, email: Option<String>) -> Self {
        Self { user_id, email }
    }
}

/// Session changes published by the session hub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Emitted once by the backend when a listener attaches.
    InitialSession(Option<Session>),
    SignedIn(Session),
    TokenRefreshed(Session),
    SignedOut,
}

impl SessionEvent {
    /// Session carried by the event, if any.
    pub fn session(&self) -> Option<&Session> {
        match self {
            SessionEvent::InitialSession(session) => session.as_ref(),
            SessionEvent::SignedIn(session) | SessionEvent::TokenRefreshed(session) => {
                Some(session)
            }
            SessionEvent::SignedOut => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SessionEvent::InitialSession(_) => "INITIAL_SESSION",
            SessionEvent::SignedIn(_) => "SIGNED_IN",
            SessionEvent::TokenRefreshed(_) => "TOKEN_REFRESHED",
            SessionEvent::SignedOut => "SIGNED_OUT",
        }
    }
}
