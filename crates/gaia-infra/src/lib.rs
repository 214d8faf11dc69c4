//! Adapters for the Gaia Plant ports: local key/value storage, the system
//! clock and the hosted backend (row store, auth and object storage).

pub mod backend;
pub mod storage;
pub mod time;

pub use backend::{BackendClient, HttpAdminTable, HttpAuth, HttpBlobStorage, HttpProfileStore};
pub use storage::{FileLocalStore, MemoryLocalStore};
pub use time::SystemClock;
