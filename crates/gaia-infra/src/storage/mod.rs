//! Local key/value stores backing the device-local storage port.

mod file_store;
mod memory_store;

pub use file_store::FileLocalStore;
pub use memory_store::MemoryLocalStore;
