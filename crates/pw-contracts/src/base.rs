//! Base contract system

use pw_core::error::ValidationErrors;

/// Result of contract validation
pub type ValidationResult = Result<(), ValidationErrors>;

/// Base contract trait
pub trait Contract<T>: Send + Sync {
    /// Validate the entity
    fn validate(&self, entity: &T) -> ValidationResult;
}

/// Run the `validator` derive rules of a section and collect them as field errors
pub fn derive_rules<T: validator::Validate>(entity: &T, errors: &mut ValidationErrors) {
    if let Err(derived) = entity.validate() {
        for (field, field_errors) in derived.field_errors() {
            for error in field_errors {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| error.code.to_string());
                errors.add(field.to_string(), message);
            }
        }
    }
}

/// Whether an optional text field was left empty
pub fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map(str::trim).unwrap_or_default().is_empty()
}
