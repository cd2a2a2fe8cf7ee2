//! Result type aliases

use crate::error::WizardError;

/// Standard Result type for wizard operations
pub type WizardResult<T> = Result<T, WizardError>;
