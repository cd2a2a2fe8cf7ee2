//! Contacts section contract

use pw_core::error::ValidationErrors;
use pw_models::ContactsSection;
use regex::Regex;
use std::sync::LazyLock;

use crate::base::{derive_rules, is_blank, Contract, ValidationResult};

/// Loose international phone number pattern
static PHONE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9][0-9 ()\-]{5,19}$").unwrap());

/// Contract for the contacts step
#[derive(Debug, Clone, Copy, Default)]
pub struct ContactsContract;

impl ContactsContract {
    fn validate_phone(field: &str, value: &Option<String>, errors: &mut ValidationErrors) {
        if is_blank(value) {
            return;
        }
        if let Some(phone) = value {
            if !PHONE_PATTERN.is_match(phone.trim()) {
                errors.add(field, "Invalid phone number");
            }
        }
    }
}

impl Contract<ContactsSection> for ContactsContract {
    fn validate(&self, entity: &ContactsSection) -> ValidationResult {
        let mut errors = ValidationErrors::new();

        derive_rules(entity, &mut errors);
        Self::validate_phone("fax", &entity.fax, &mut errors);
        Self::validate_phone("phone1", &entity.phone1, &mut errors);
        Self::validate_phone("phone2", &entity.phone2, &mut errors);
        Self::validate_phone("phone3", &entity.phone3, &mut errors);

        errors.into_result()
    }
}
