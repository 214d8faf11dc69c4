//! # gaia-core
//!
//! Core domain models and onboarding rules for Gaia Plant.
//!
//! This crate contains pure business logic without any infrastructure dependencies:
//! the profile record, triage normalization, completeness predicates, the route
//! resolver and guards, and the ports every external collaborator is reached through.

pub mod admin;
pub mod cart;
pub mod config;
pub mod content;
pub mod ids;
pub mod ports;
pub mod profile;
pub mod routing;
pub mod session;
pub mod triage;

// Re-export commonly used types at the crate root
pub use config::AppConfig;
pub use ids::UserId;
pub use profile::{CompletenessTier, Profile, ProfilePatch, ProfileRecord};
pub use routing::{next_step, OnboardingStep, ProfileGate, Route};
pub use session::{Session, SessionEvent};
pub use triage::{normalize_triage, TriageEntry, TriageMap};
