//! Capabilities section contract

use pw_core::error::ValidationErrors;
use pw_models::CapabilitiesSection;

use crate::base::{derive_rules, Contract, ValidationResult};

#[derive(Debug, Clone, Copy, Default)]
pub struct CapabilitiesContract;

impl Contract<CapabilitiesSection> for CapabilitiesContract {
    fn validate(&self, entity: &CapabilitiesSection) -> ValidationResult {
        let mut errors = ValidationErrors::new();

        derive_rules(entity, &mut errors);
        if entity.skills.iter().any(|skill| skill.value.trim().is_empty()) {
            errors.add("skills", "Skill can't be blank");
        }
        if entity.hobbies.iter().any(|hobby| hobby.trim().is_empty()) {
            errors.add("hobbies", "Hobby can't be blank");
        }

        errors.into_result()
    }
}
