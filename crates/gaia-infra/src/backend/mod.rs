//! HTTP adapters for the hosted backend.
//!
//! The backend exposes a PostgREST-style row API under `/rest/v1`, an auth
//! API under `/auth/v1` and object storage under `/storage/v1`. All adapters
//! share one [`BackendClient`] so the signed-in access token is attached to
//! every request.

mod auth;
mod client;
mod error;
mod rest;
mod storage;

pub use auth::{HttpAuth, AUTH_SESSION_KEY};
pub use client::BackendClient;
pub use error::{classify_response, classify_transport};
pub use rest::{HttpAdminTable, HttpProfileStore};
pub use storage::HttpBlobStorage;
