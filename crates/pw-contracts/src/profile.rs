//! Profile (personal data) section contract

use chrono::NaiveDate;
use pw_core::error::ValidationErrors;
use pw_models::ProfileSection;

use crate::base::{derive_rules, Contract, ValidationResult};

/// Contract for the personal data step
#[derive(Debug, Clone, Copy)]
pub struct ProfileContract {
    today: NaiveDate,
}

impl ProfileContract {
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }

    pub fn validate_birth_date(&self, date: Option<NaiveDate>, errors: &mut ValidationErrors) {
        match date {
            None => errors.add("dateofbirth", "Required field"),
            Some(date) if date > self.today => {
                errors.add("dateofbirth", "Birth date can't be in the future")
            }
            Some(_) => {}
        }
    }
}

impl Contract<ProfileSection> for ProfileContract {
    fn validate(&self, entity: &ProfileSection) -> ValidationResult {
        let mut errors = ValidationErrors::new();

        derive_rules(entity, &mut errors);
        if entity.email.is_empty() {
            // the email rule reports format only; blank gets the usual message
            errors.errors.remove("email");
            errors.add("email", "Required field");
        }
        self.validate_birth_date(entity.date_of_birth, &mut errors);

        errors.into_result()
    }
}
