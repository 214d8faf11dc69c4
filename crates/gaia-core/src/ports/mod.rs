//! Port interfaces for the application layer
//!
//! Every external collaborator (hosted backend, local key/value storage,
//! clock) is reached through one of these traits. Implementations live in
//! `gaia-infra`; tests use hand-written fakes or the mocks declared here.

mod admin;
mod blob;
mod clock;
pub mod errors;
mod local_store;
mod profile_store;
mod session;

pub use admin::AdminFlagPort;
pub use blob::BlobStoragePort;
pub use clock::ClockPort;
pub use errors::RemoteError;
pub use local_store::{LocalStoreError, LocalStorePort};
pub use profile_store::ProfileStorePort;
pub use session::SessionPort;

#[cfg(test)]
pub use local_store::MockLocalStore;
