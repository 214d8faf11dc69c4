use crate::profile::{has_conditions_selected, is_personal_complete, is_wizard_complete, Profile};

use super::OnboardingStep;

/// Maps a profile (or its absence) to the next required step.
///
/// Callers guarantee a session exists, so a missing profile means the
/// personal-info step and never the auth entry point.
pub fn next_step(profile: Option<&Profile>) -> OnboardingStep {
    if !is_personal_complete(profile) {
        OnboardingStep::PersonalInfo
    } else if !is_wizard_complete(profile) {
        OnboardingStep::PreferencesWizard
    } else if !has_conditions_selected(profile) {
        OnboardingStep::ConditionsSelection
    } else {
        OnboardingStep::MainApp
    }
}
