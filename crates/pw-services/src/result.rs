//! Service Result type
//!
//! What the rendering layer receives from every wizard operation: either a
//! value, or a failure code plus field-level messages. Errors never reach the
//! UI in any other form.

use pw_core::error::{ValidationErrors, WizardError};
use pw_core::result::WizardResult;

/// Represents the result of a service call
#[derive(Debug)]
pub struct ServiceResult<T> {
    /// Whether the service call was successful
    success: bool,
    /// The result of the service call
    result: Option<T>,
    /// Errors from the service call
    errors: ValidationErrors,
    /// Stable failure code (`validation_failed`, `store_unavailable`, ...)
    code: Option<&'static str>,
}

impl<T> ServiceResult<T> {
    /// Create a successful service result
    pub fn success(result: T) -> Self {
        Self {
            success: true,
            result: Some(result),
            errors: ValidationErrors::new(),
            code: None,
        }
    }

    /// Create a failed service result from a wizard error
    pub fn failure(error: &WizardError) -> Self {
        Self {
            success: false,
            result: None,
            errors: error.to_validation_errors(),
            code: Some(error.error_code()),
        }
    }

    /// Check if the service call was successful
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Check if the service call failed
    pub fn is_failure(&self) -> bool {
        !self.success
    }

    /// Get the result (if successful)
    pub fn result(&self) -> Option<&T> {
        self.result.as_ref()
    }

    /// Take the result (consuming it)
    pub fn into_inner(self) -> Option<T> {
        self.result
    }

    /// Get the errors
    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    /// Failure code, `None` on success
    pub fn code(&self) -> Option<&'static str> {
        self.code
    }

    /// Map the result value
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> ServiceResult<U> {
        ServiceResult {
            success: self.success,
            result: self.result.map(f),
            errors: self.errors,
            code: self.code,
        }
    }
}

impl<T> From<WizardResult<T>> for ServiceResult<T> {
    fn from(result: WizardResult<T>) -> Self {
        match result {
            Ok(value) => ServiceResult::success(value),
            Err(e) => ServiceResult::failure(&e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success() {
        let result = ServiceResult::success(42);
        assert!(result.is_success());
        assert_eq!(result.code(), None);
        assert_eq!(result.map(|v| v * 2).into_inner(), Some(84));
    }

    #[test]
    fn test_failure_from_error() {
        let mut errors = ValidationErrors::new();
        errors.add("name", "Required field");
        let result: ServiceResult<()> = Err(WizardError::Validation(errors)).into();

        assert!(result.is_failure());
        assert_eq!(result.code(), Some("validation_failed"));
        assert!(result.errors().has_error("name"));
        assert!(result.result().is_none());
    }

    #[test]
    fn test_store_failure_is_base_error() {
        let result: ServiceResult<()> = Err(WizardError::store("quota exceeded")).into();
        assert_eq!(result.code(), Some("store_unavailable"));
        assert_eq!(result.errors().base_errors.len(), 1);
    }
}
