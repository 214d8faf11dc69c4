//! Fetch/upsert wrappers around the remote profile table.

use std::ops::ControlFlow;
use std::sync::Arc;

use chrono::SecondsFormat;
use gaia_core::ports::{ClockPort, ProfileStorePort, RemoteError};
use gaia_core::profile::PROFILE_COLUMNS;
use gaia_core::{Profile, ProfilePatch, UserId};
use serde_json::json;
use tracing::{info, info_span, Instrument};

use crate::resilience::{attempt_with_retry, RetryPolicy, WarnLimiter};

use super::ProfileCache;

/// How a fetch was satisfied.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// Row (or its absence) confirmed by the remote store.
    Fresh(Option<Profile>),
    /// First attempt hit a network failure and a cached copy was served.
    Cached(Profile),
}

impl FetchOutcome {
    pub fn into_profile(self) -> Option<Profile> {
        match self {
            FetchOutcome::Fresh(profile) => profile,
            FetchOutcome::Cached(profile) => Some(profile),
        }
    }
}

pub struct ProfileGateway {
    store: Arc<dyn ProfileStorePort>,
    cache: ProfileCache,
    clock: Arc<dyn ClockPort>,
    warn: Arc<WarnLimiter>,
}

impl ProfileGateway {
    pub fn new(
        store: Arc<dyn ProfileStorePort>,
        cache: ProfileCache,
        clock: Arc<dyn ClockPort>,
        warn: Arc<WarnLimiter>,
    ) -> Self {
        Self {
            store,
            cache,
            clock,
            warn,
        }
    }

    pub fn cache(&self) -> &ProfileCache {
        &self.cache
    }

    /// Fetches and normalizes the profile for `user_id`.
    pub async fn fetch_profile(&self, user_id: &UserId) -> Result<Option<Profile>, RemoteError> {
        self.fetch_profile_detailed(user_id)
            .await
            .map(FetchOutcome::into_profile)
    }

    /// Like [`fetch_profile`](Self::fetch_profile) but reports whether the
    /// cache answered.
    pub async fn fetch_profile_detailed(
        &self,
        user_id: &UserId,
    ) -> Result<FetchOutcome, RemoteError> {
        let span = info_span!("usecase.fetch_profile.execute", user_id = %user_id);
        async move {
            let policy = RetryPolicy::profile_fetch();
            let outcome = attempt_with_retry(
                &policy,
                move |_| async move {
                    let record = self.store.fetch(user_id, PROFILE_COLUMNS).await?;
                    Ok(FetchOutcome::Fresh(record.map(Profile::from)))
                },
                move |attempt, err| {
                    if err.is_timeout() {
                        self.warn.warn(
                            "profile_fetch_timeout",
                            json!({ "user_id": user_id.as_str(), "attempt": attempt }),
                        );
                    }
                    if !err.is_network() {
                        self.warn.warn(
                            "profile_fetch_error",
                            json!({
                                "user_id": user_id.as_str(),
                                "attempt": attempt,
                                "message": err.message(),
                            }),
                        );
                    }
                    if err.is_network() && attempt == 0 {
                        if let Some(cached) = self.cache.read(user_id) {
                            info!(error = %err, "serving cached profile after network failure");
                            return ControlFlow::Break(FetchOutcome::Cached(cached));
                        }
                    }
                    ControlFlow::Continue(())
                },
            )
            .await?;

            if let FetchOutcome::Fresh(Some(profile)) = &outcome {
                self.cache.write(profile);
            }
            Ok(outcome)
        }
        .instrument(span)
        .await
    }

    /// Merge-writes `patch` plus a fresh `updated_at` and returns the stored row.
    pub async fn upsert_profile(
        &self,
        user_id: &UserId,
        patch: ProfilePatch,
    ) -> Result<Option<Profile>, RemoteError> {
        let span = info_span!("usecase.upsert_profile.execute", user_id = %user_id);
        async move {
            let updated_at = self
                .clock
                .now_utc()
                .to_rfc3339_opts(SecondsFormat::Millis, true);
            let row = patch
                .into_row(user_id, &updated_at)
                .map_err(|e| RemoteError::Other(format!("invalid profile patch: {e}")))?;

            let policy = RetryPolicy::profile_upsert();
            let record = attempt_with_retry(
                &policy,
                move |_| self.store.upsert(row.clone()),
                move |attempt, err| {
                    if err.is_timeout() {
                        self.warn.warn(
                            "profile_upsert_timeout",
                            json!({ "user_id": user_id.as_str(), "attempt": attempt }),
                        );
                    }
                    ControlFlow::Continue(())
                },
            )
            .await?;

            Ok(record.map(Profile::from))
        }
        .instrument(span)
        .await
    }
}
