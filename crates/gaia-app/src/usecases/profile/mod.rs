//! Profile read/write path: local cache, remote gateway, session-scoped loader.

mod cache;
mod gateway;
mod loader;

pub use cache::ProfileCache;
pub use gateway::{FetchOutcome, ProfileGateway};
pub use loader::{LoadOutcome, LoadState, ProfileLoader};
