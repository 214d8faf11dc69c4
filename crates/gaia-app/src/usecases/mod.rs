//! Use cases of the onboarding client.
//!
//! Each use case holds the ports it needs and exposes an async entry point
//! wrapped in its own tracing span.

pub mod admin;
pub mod cart;
pub mod content;
pub mod gate;
pub mod profile;
pub mod steps;

#[cfg(test)]
pub(crate) mod test_support;

pub use admin::CheckAdmin;
pub use cart::CartStore;
pub use content::ContentLibrary;
