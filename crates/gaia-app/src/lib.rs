//! Gaia Plant application layer.
//!
//! Use cases, the session-scoped coordinator and the retry policies that sit
//! between the domain rules in `gaia-core` and the adapters in `gaia-infra`.

mod app;
pub mod deps;
pub mod resilience;
pub mod session;
pub mod usecases;

pub use app::GaiaApp;
pub use deps::AppDeps;
pub use session::{SessionCoordinator, SessionSnapshot};
