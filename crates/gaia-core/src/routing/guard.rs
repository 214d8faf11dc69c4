use crate::profile::{is_personal_complete, is_wizard_complete, Profile};
use crate::session::Session;

use super::{next_step, GuardKind, OnboardingStep, Route};

/// Everything a guard looks at, borrowed from the session owner.
#[derive(Debug, Clone, Copy, Default)]
pub struct GuardContext<'a> {
    pub session: Option<&'a Session>,
    pub profile: Option<&'a Profile>,
    pub loading: bool,
    pub error: Option<&'a str>,
    pub is_admin: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    Render,
    /// Replace the current history entry with this route.
    Redirect(Route),
    Waiting,
    /// Error with manual retry and go-to-login actions.
    Failed { message: String },
}

/// Decides whether `route` may render under `ctx`.
pub fn evaluate_guard(route: Route, ctx: &GuardContext<'_>) -> GuardOutcome {
    let signed_in = ctx.session.is_some();
    match route.guard() {
        GuardKind::PublicOnly if signed_in => GuardOutcome::Redirect(Route::Start),
        GuardKind::PublicOnly => GuardOutcome::Render,
        _ if !signed_in => GuardOutcome::Redirect(Route::Auth),
        GuardKind::RequireAuth => GuardOutcome::Render,
        GuardKind::RequireAdmin if ctx.is_admin => GuardOutcome::Render,
        GuardKind::RequireAdmin => GuardOutcome::Redirect(Route::MainApp),
        GuardKind::RequireBasicProfile => {
            if ctx.loading {
                GuardOutcome::Waiting
            } else if is_personal_complete(ctx.profile) {
                GuardOutcome::Render
            } else {
                GuardOutcome::Redirect(Route::PersonalInfo)
            }
        }
        GuardKind::RequireProfileComplete => {
            if let Some(message) = ctx.error {
                return GuardOutcome::Failed {
                    message: message.to_string(),
                };
            }
            if ctx.loading {
                return GuardOutcome::Waiting;
            }
            match next_step(ctx.profile) {
                OnboardingStep::MainApp => GuardOutcome::Render,
                step => GuardOutcome::Redirect(step.route()),
            }
        }
        GuardKind::Step if ctx.loading => GuardOutcome::Waiting,
        GuardKind::Step => step_guard(route, ctx.profile),
    }
}

// Step pages render unless a prerequisite is missing or the step is already
// satisfied, in which case a deep link forwards immediately.
fn step_guard(route: Route, profile: Option<&Profile>) -> GuardOutcome {
    let personal = is_personal_complete(profile);
    let wizard = is_wizard_complete(profile);
    match route {
        Route::PersonalInfo if personal => GuardOutcome::Redirect(Route::PreferencesWizard),
        Route::PreferencesWizard if !personal => GuardOutcome::Redirect(Route::PersonalInfo),
        Route::PreferencesWizard if wizard => GuardOutcome::Redirect(Route::ConditionsSelection),
        Route::ConditionsSelection if !personal => GuardOutcome::Redirect(Route::PersonalInfo),
        Route::ConditionsSelection if !wizard => GuardOutcome::Redirect(Route::PreferencesWizard),
        _ => GuardOutcome::Render,
    }
}
