//! Routing: onboarding steps, the route table, the resolver, the profile gate
//! state machine and per-route guards.

mod gate;
mod guard;
mod resolver;
mod route;
mod step;

pub use gate::{GateAction, GateEvent, GateState, GateView, ProfileGate};
pub use guard::{evaluate_guard, GuardContext, GuardOutcome};
pub use resolver::next_step;
pub use route::{GuardKind, Route};
pub use step::OnboardingStep;
