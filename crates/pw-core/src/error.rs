//! Core error types for Profile Wizard
//!
//! Every failure the wizard can report to the rendering layer is one of the
//! [`WizardError`] variants below.

use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

/// Core error type for all wizard operations
#[derive(Error, Debug, Clone)]
pub enum WizardError {
    /// A step's fields did not pass validation. State does not advance.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// Another finalized record already uses this name (case-insensitive).
    #[error("Name already taken: {name}")]
    DuplicateName { name: String },

    /// The durable store could not be read or written.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// The stored draft does not match the step registry.
    #[error("Inconsistent draft state: {0}")]
    InconsistentDraftState(String),

    #[error("Not found: {entity} with id={id}")]
    NotFound { entity: &'static str, id: String },

    /// The operation is not allowed in the current wizard state.
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Validation errors collection: field name -> messages, plus base messages.
#[derive(Error, Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[error("Validation errors: {errors:?}")]
pub struct ValidationErrors {
    /// Field-specific errors
    pub errors: BTreeMap<String, Vec<String>>,
    /// Base errors not tied to a specific field
    pub base_errors: Vec<String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    pub fn add_base(&mut self, message: impl Into<String>) {
        self.base_errors.push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.base_errors.is_empty()
    }

    /// Check if there are errors for a specific field
    pub fn has_error(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    /// Get errors for a specific field
    pub fn get(&self, field: &str) -> Option<&Vec<String>> {
        self.errors.get(field)
    }

    /// Turn an accumulated set into a `Result`
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }

    pub fn full_messages(&self) -> Vec<String> {
        let mut messages = self.base_errors.clone();
        for (field, field_messages) in &self.errors {
            for msg in field_messages {
                messages.push(format!("{} {}", field, msg));
            }
        }
        messages
    }
}

impl WizardError {
    pub fn store(message: impl std::fmt::Display) -> Self {
        WizardError::StoreUnavailable(message.to_string())
    }

    pub fn not_found(entity: &'static str, id: impl std::fmt::Display) -> Self {
        WizardError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Stable code for the rendering layer
    pub fn error_code(&self) -> &'static str {
        match self {
            WizardError::Validation(_) => "validation_failed",
            WizardError::DuplicateName { .. } => "duplicate_name",
            WizardError::StoreUnavailable(_) => "store_unavailable",
            WizardError::InconsistentDraftState(_) => "inconsistent_draft_state",
            WizardError::NotFound { .. } => "not_found",
            WizardError::InvalidTransition(_) => "invalid_transition",
        }
    }

    /// Whether the failure is caused by user input rather than the environment
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            WizardError::Validation(_) | WizardError::DuplicateName { .. }
        )
    }

    /// Field-level view of the error, used when surfacing it to the UI.
    ///
    /// A duplicate name is reported against the `name` field, the same way a
    /// failed validation rule would be.
    pub fn to_validation_errors(&self) -> ValidationErrors {
        match self {
            WizardError::Validation(errors) => errors.clone(),
            WizardError::DuplicateName { .. } => {
                let mut errors = ValidationErrors::new();
                errors.add("name", "Name already taken!");
                errors
            }
            other => {
                let mut errors = ValidationErrors::new();
                errors.add_base(other.to_string());
                errors
            }
        }
    }
}
