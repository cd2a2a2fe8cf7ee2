//! # pw-models
//!
//! Domain models for Profile Wizard.
//!
//! This crate contains the finalized [`UserRecord`], the per-section payloads a
//! draft is made of, and the fixed step registry that orders those sections.

pub use pw_core::types::UserId;

pub mod draft;
pub mod section;
pub mod user;

// Re-exports for convenience
pub use draft::{
    AccountSection, CapabilitiesSection, ContactsSection, DraftSection, DraftValues,
    ProfileSection, SectionValues,
};
pub use section::{Section, StepIndex};
pub use user::{Avatar, Skill, UserRecord};
