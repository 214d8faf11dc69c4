//! Clinical/onboarding profile.

mod completeness;
mod model;
mod patch;
pub mod validation;

pub use completeness::{
    has_conditions_selected, is_personal_complete, is_profile_complete, is_wizard_complete,
    CompletenessTier,
};
pub use model::{Profile, ProfileRecord, PROFILE_COLUMNS};
pub use patch::ProfilePatch;
pub use validation::{AgeRange, PersonalInfoForm, ValidationErrors};
