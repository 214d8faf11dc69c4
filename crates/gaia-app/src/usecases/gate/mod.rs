mod orchestrator;

pub use orchestrator::{GateOutcome, ProfileGateOrchestrator};
