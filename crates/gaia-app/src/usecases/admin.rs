use std::sync::Arc;
use std::time::Duration;

use gaia_core::admin::AdminAllowList;
use gaia_core::ports::{AdminFlagPort, RemoteError};
use gaia_core::Session;
use tracing::{debug, info_span, Instrument};

use crate::resilience::{attempt_with_retry, RetryPolicy};

const ADMIN_CHECK_TIMEOUT: Duration = Duration::from_secs(20);

/// Decides whether the signed-in user may use admin pages.
pub struct CheckAdmin {
    flags: Arc<dyn AdminFlagPort>,
    allow_list: AdminAllowList,
}

impl CheckAdmin {
    pub fn new(flags: Arc<dyn AdminFlagPort>, allow_list: AdminAllowList) -> Self {
        Self { flags, allow_list }
    }

    /// A row in the admin table grants admin. While the table is missing, or
    /// the backend cannot be reached, the fallback allow-list decides. Any
    /// other store error denies.
    pub async fn execute(&self, session: Option<&Session>) -> bool {
        let Some(session) = session else {
            return false;
        };
        if session.user_id.is_empty() {
            return false;
        }

        let span = info_span!("usecase.check_admin.execute", user_id = %session.user_id);
        async move {
            let policy = RetryPolicy::single(ADMIN_CHECK_TIMEOUT, "Supabase timeout ao verificar admin");
            let result = attempt_with_retry(
                &policy,
                move |_| self.flags.has_admin_row(&session.user_id),
                |_, _| std::ops::ControlFlow::Continue(()),
            )
            .await;

            match result {
                Ok(is_admin) => is_admin,
                Err(err @ (RemoteError::MissingRelation(_) | RemoteError::Network(_) | RemoteError::Timeout(_))) => {
                    debug!(error = %err, "admin table unavailable; using fallback list");
                    self.allow_list.contains(session.email.as_deref())
                }
                Err(err) => {
                    debug!(error = %err, "admin check failed");
                    false
                }
            }
        }
        .instrument(span)
        .await
    }
}
