//! Completeness predicates over a (possibly missing) profile.
//!
//! A field counts as present when it is set and not the empty string.
//! Whitespace-only values count as present; trimming happens at submission.

use super::Profile;

fn present(field: &Option<String>) -> bool {
    field.as_deref().is_some_and(|v| !v.is_empty())
}

pub fn is_personal_complete(profile: Option<&Profile>) -> bool {
    profile.is_some_and(|p| {
        present(&p.full_name) && present(&p.phone) && present(&p.cpf) && present(&p.birth_date)
    })
}

pub fn is_wizard_complete(profile: Option<&Profile>) -> bool {
    profile.is_some_and(|p| present(&p.age_range) && present(&p.main_goal) && present(&p.main_reason))
}

pub fn has_conditions_selected(profile: Option<&Profile>) -> bool {
    profile.is_some_and(|p| p.conditions.as_ref().is_some_and(|c| !c.is_empty()))
}

pub fn is_profile_complete(profile: Option<&Profile>) -> bool {
    is_personal_complete(profile) && is_wizard_complete(profile) && has_conditions_selected(profile)
}

/// Strictly ordered completeness tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CompletenessTier {
    NoProfile,
    PersonalIncomplete,
    WizardIncomplete,
    ConditionsEmpty,
    Complete,
}

impl CompletenessTier {
    pub fn of(profile: Option<&Profile>) -> Self {
        match profile {
            None => Self::NoProfile,
            Some(_) if !is_personal_complete(profile) => Self::PersonalIncomplete,
            Some(_) if !is_wizard_complete(profile) => Self::WizardIncomplete,
            Some(_) if !has_conditions_selected(profile) => Self::ConditionsEmpty,
            Some(_) => Self::Complete,
        }
    }
}
