//! # pw-services
//!
//! Business logic for Profile Wizard.
//!
//! - [`ResumeDetector`] decides where an unfinished draft picks up
//! - [`Wizard`] is the state machine the rendering layer drives
//! - [`FinalizeService`] turns a complete draft into a user record
//! - [`EditUserService`] writes changes to finalized records through
//!
//! Services return [`WizardResult`](pw_core::result::WizardResult); the
//! wizard converts every outcome into a [`ServiceResult`].

pub mod edit;
pub mod finalize;
pub mod result;
pub mod resume;
pub mod wizard;

#[cfg(test)]
mod test_support;

pub use edit::EditUserService;
pub use finalize::FinalizeService;
pub use result::ServiceResult;
pub use resume::{ResumeDecision, ResumeDetector};
pub use wizard::{FormSnapshot, FormStatus, Wizard, WizardEvent, WizardState};
