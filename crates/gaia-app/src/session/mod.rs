//! Session lifecycle: event hub and the session-scoped coordinator.

mod coordinator;
mod hub;

pub use coordinator::{SessionCoordinator, SessionSnapshot};
pub use hub::{SessionHub, SubscriptionId};
