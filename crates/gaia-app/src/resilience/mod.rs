//! Retry/timeout policy and rate-limited warnings for remote calls.

mod retry;
mod warn_limiter;

pub use retry::{attempt_with_retry, Backoff, RetryPolicy};
pub use warn_limiter::WarnLimiter;
