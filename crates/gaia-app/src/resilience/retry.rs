//! Attempt-with-timeout-and-backoff helper shared by every remote call site.

use std::future::Future;
use std::ops::ControlFlow;
use std::time::Duration;

use gaia_core::ports::RemoteError;
use tracing::debug;

/// Delay before the next attempt, given the zero-based attempt that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    Fixed(Duration),
    /// `base + step * attempt`
    Linear { base: Duration, step: Duration },
}

impl Backoff {
    pub fn delay(&self, attempt: u32) -> Duration {
        match self {
            Backoff::Fixed(delay) => *delay,
            Backoff::Linear { base, step } => *base + *step * attempt,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// At least one attempt is always made.
    pub max_attempts: u32,
    pub attempt_timeout: Duration,
    pub backoff: Backoff,
    pub is_retryable: fn(&RemoteError) -> bool,
    /// Message carried by the [`RemoteError::Timeout`] raised on expiry.
    pub timeout_message: &'static str,
}

impl RetryPolicy {
    /// 3 attempts of 45 s, retrying network-class failures after
    /// 500 ms + 800 ms per failed attempt.
    pub fn profile_fetch() -> Self {
        Self {
            max_attempts: 3,
            attempt_timeout: Duration::from_secs(45),
            backoff: Backoff::Linear {
                base: Duration::from_millis(500),
                step: Duration::from_millis(800),
            },
            is_retryable: RemoteError::is_network,
            timeout_message: "Supabase timeout ao buscar perfil",
        }
    }

    /// 2 attempts of 20 s, retrying timeouts only after a fixed 400 ms.
    pub fn profile_upsert() -> Self {
        Self {
            max_attempts: 2,
            attempt_timeout: Duration::from_secs(20),
            backoff: Backoff::Fixed(Duration::from_millis(400)),
            is_retryable: RemoteError::is_timeout,
            timeout_message: "Supabase timeout ao salvar perfil",
        }
    }

    /// Single attempt bounded by `timeout`.
    pub fn single(timeout: Duration, timeout_message: &'static str) -> Self {
        Self {
            max_attempts: 1,
            attempt_timeout: timeout,
            backoff: Backoff::Fixed(Duration::ZERO),
            is_retryable: |_| false,
            timeout_message,
        }
    }
}

/// Runs `op` under `policy`.
///
/// Each attempt is raced against `policy.attempt_timeout`; expiry becomes a
/// [`RemoteError::Timeout`]. After every failure `on_failure` runs first and
/// may short-circuit with a value (`ControlFlow::Break`). Otherwise the error
/// propagates when it is not retryable or attempts are exhausted, and the
/// helper sleeps for the backoff before trying again.
pub async fn attempt_with_retry<T, F, Fut, H>(
    policy: &RetryPolicy,
    mut op: F,
    mut on_failure: H,
) -> Result<T, RemoteError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, RemoteError>>,
    H: FnMut(u32, &RemoteError) -> ControlFlow<T>,
{
    let mut attempt = 0;
    loop {
        let outcome = match tokio::time::timeout(policy.attempt_timeout, op(attempt)).await {
            Ok(result) => result,
            Err(_) => Err(RemoteError::Timeout(policy.timeout_message.to_string())),
        };

        let err = match outcome {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        if let ControlFlow::Break(value) = on_failure(attempt, &err) {
            return Ok(value);
        }

        let exhausted = attempt + 1 >= policy.max_attempts;
        if exhausted || !(policy.is_retryable)(&err) {
            return Err(err);
        }

        let delay = policy.backoff.delay(attempt);
        debug!(attempt, delay_ms = delay.as_millis() as u64, error = %err, "retrying remote call");
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}
