use std::sync::Arc;

use gaia_core::ports::{ClockPort, RemoteError};
use gaia_core::profile::{AgeRange, PersonalInfoForm, ValidationErrors};
use gaia_core::routing::Route;
use gaia_core::triage::{EmotionalSymptoms, TriageMap};
use gaia_core::{Profile, ProfilePatch, UserId};
use tracing::{info, info_span, Instrument};

use crate::usecases::profile::{ProfileGateway, ProfileLoader};

use super::{StepKind, StepLocks};

#[derive(Debug, thiserror::Error)]
pub enum StepSaveError {
    #[error("a save for this step is already in progress")]
    Busy,

    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    Remote(#[from] RemoteError),
}

/// Preferences wizard answers; every field is required.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreferencesForm {
    pub age_range: Option<AgeRange>,
    pub main_goal: Option<String>,
    pub main_reason: Option<String>,
}

/// Full profile edit from the profile page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileEdits {
    pub personal: PersonalInfoForm,
    /// `None` clears the stored value.
    pub age_range: Option<AgeRange>,
    pub main_goal: Option<String>,
    pub main_reason: Option<String>,
    pub conditions: Vec<String>,
    pub health_triage: TriageMap,
    pub emotional_triage: TriageMap,
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

pub struct ProfileSteps {
    gateway: Arc<ProfileGateway>,
    loader: Arc<ProfileLoader>,
    clock: Arc<dyn ClockPort>,
    locks: StepLocks,
}

impl ProfileSteps {
    pub fn new(
        gateway: Arc<ProfileGateway>,
        loader: Arc<ProfileLoader>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            gateway,
            loader,
            clock,
            locks: StepLocks::new(),
        }
    }

    pub fn is_saving(&self, step: StepKind) -> bool {
        self.locks.is_busy(step)
    }

    /// Clinical profile: validated personal data.
    pub async fn save_personal_info(
        &self,
        user_id: &UserId,
        form: &PersonalInfoForm,
    ) -> Result<Route, StepSaveError> {
        let today = self.clock.now_utc().date_naive();
        let patch = form.validate(today)?;
        self.save(StepKind::PersonalInfo, user_id, patch, Route::PreferencesWizard)
            .await
    }

    pub async fn save_preferences(
        &self,
        user_id: &UserId,
        form: &PreferencesForm,
    ) -> Result<Route, StepSaveError> {
        let mut errors = ValidationErrors::default();
        if form.age_range.is_none() {
            errors.add("age_range", "Selecione sua faixa etária.");
        }
        let main_goal = non_blank(&form.main_goal);
        if main_goal.is_none() {
            errors.add("main_goal", "Selecione seu objetivo principal.");
        }
        let main_reason = non_blank(&form.main_reason);
        if main_reason.is_none() {
            errors.add("main_reason", "Selecione o motivo principal.");
        }
        if !errors.is_empty() {
            return Err(errors.into());
        }

        let patch = ProfilePatch {
            age_range: Some(form.age_range.map(|r| r.to_string())),
            main_goal: Some(main_goal),
            main_reason: Some(main_reason),
            ..Default::default()
        };
        self.save(StepKind::Preferences, user_id, patch, Route::ConditionsSelection)
            .await
    }

    pub async fn save_conditions(
        &self,
        user_id: &UserId,
        conditions: Vec<String>,
    ) -> Result<Route, StepSaveError> {
        if conditions.is_empty() {
            let mut errors = ValidationErrors::default();
            errors.add("conditions", "Selecione pelo menos uma opção.");
            return Err(errors.into());
        }
        let patch = ProfilePatch {
            conditions: Some(conditions),
            ..Default::default()
        };
        self.save(StepKind::Conditions, user_id, patch, Route::MainApp)
            .await
    }

    /// Goal picked from the dashboard; continues to the health triage.
    pub async fn save_main_goal(&self, user_id: &UserId, goal: &str) -> Result<Route, StepSaveError> {
        let goal = goal.trim();
        if goal.is_empty() {
            let mut errors = ValidationErrors::default();
            errors.add("main_goal", "Selecione seu objetivo principal.");
            return Err(errors.into());
        }
        let patch = ProfilePatch {
            main_goal: Some(Some(goal.to_string())),
            ..Default::default()
        };
        self.save(StepKind::MainGoal, user_id, patch, Route::HealthTriage)
            .await
    }

    pub async fn save_health_triage(
        &self,
        user_id: &UserId,
        triage: TriageMap,
    ) -> Result<Route, StepSaveError> {
        let patch = ProfilePatch {
            health_triage: Some(triage),
            ..Default::default()
        };
        self.save(StepKind::HealthTriage, user_id, patch, Route::EmotionalTriage)
            .await
    }

    pub async fn save_emotional_triage(
        &self,
        user_id: &UserId,
        triage: TriageMap,
    ) -> Result<Route, StepSaveError> {
        let patch = ProfilePatch {
            emotional_triage: Some(triage),
            ..Default::default()
        };
        self.save(StepKind::EmotionalTriage, user_id, patch, Route::EmotionalSymptoms)
            .await
    }

    /// Stores the symptoms inside the current emotional triage, keeping the
    /// other answers.
    pub async fn save_emotional_symptoms(
        &self,
        user_id: &UserId,
        symptoms: &EmotionalSymptoms,
    ) -> Result<Route, StepSaveError> {
        let current = self
            .loader
            .profile()
            .filter(|p| &p.id == user_id)
            .map(|p| p.emotional_triage)
            .unwrap_or_default();
        let patch = ProfilePatch {
            emotional_triage: Some(symptoms.merge_into(&current)),
            ..Default::default()
        };
        self.save(StepKind::EmotionalSymptoms, user_id, patch, Route::MainApp)
            .await
    }

    /// Profile page: rewrites every editable field.
    pub async fn save_profile_edits(
        &self,
        user_id: &UserId,
        edits: ProfileEdits,
    ) -> Result<Route, StepSaveError> {
        let today = self.clock.now_utc().date_naive();
        let mut patch = edits.personal.validate(today)?;
        patch.age_range = Some(edits.age_range.map(|r| r.to_string()));
        patch.main_goal = Some(non_blank(&edits.main_goal));
        patch.main_reason = Some(non_blank(&edits.main_reason));
        patch.conditions = Some(edits.conditions);
        patch.health_triage = Some(edits.health_triage);
        patch.emotional_triage = Some(edits.emotional_triage);
        self.save(StepKind::ProfileEdits, user_id, patch, Route::Profile)
            .await
    }

    async fn save(
        &self,
        step: StepKind,
        user_id: &UserId,
        patch: ProfilePatch,
        next: Route,
    ) -> Result<Route, StepSaveError> {
        let _busy = self.locks.try_acquire(step).ok_or(StepSaveError::Busy)?;
        let span = info_span!("usecase.save_step.execute", step = ?step, user_id = %user_id);
        async move {
            // Kept for when the store confirms the write without returning a row.
            let merged = self
                .loader
                .profile()
                .filter(|p| &p.id == user_id)
                .unwrap_or_else(|| Profile::new(user_id.clone()))
                .merged_with(&patch);

            let epoch = self.loader.epoch();
            let fresh = self.gateway.upsert_profile(user_id, patch).await?;
            let profile = fresh.unwrap_or(merged);
            if !self.loader.set_profile_if_current(epoch, user_id, Some(profile)) {
                info!("session changed during save; saved row not applied");
            }

            info!(next = %next, "step saved");
            Ok(next)
        }
        .instrument(span)
        .await
    }
}
