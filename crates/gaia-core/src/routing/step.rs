use serde::{Deserialize, Serialize};

use super::Route;

/// The single next required onboarding step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OnboardingStep {
    PersonalInfo,
    PreferencesWizard,
    ConditionsSelection,
    MainApp,
}

impl OnboardingStep {
    pub fn route(&self) -> Route {
        match self {
            OnboardingStep::PersonalInfo => Route::PersonalInfo,
            OnboardingStep::PreferencesWizard => Route::PreferencesWizard,
            OnboardingStep::ConditionsSelection => Route::ConditionsSelection,
            OnboardingStep::MainApp => Route::MainApp,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OnboardingStep::PersonalInfo => "personal-info",
            OnboardingStep::PreferencesWizard => "preferences-wizard",
            OnboardingStep::ConditionsSelection => "conditions-selection",
            OnboardingStep::MainApp => "main-app",
        }
    }
}

impl std::fmt::Display for OnboardingStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
