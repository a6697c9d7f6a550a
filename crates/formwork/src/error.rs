//! Error types for the binding layer.
//!
//! Configuration errors are fatal at construction. Validation errors never
//! cross the form boundary as `Err`; they are folded into the submit outcome
//! delivered to `form:submit` consumers.

use formwork_state::StateError;
use thiserror::Error;

/// Result type alias for binding-layer operations.
pub type FormResult<T> = Result<T, FormError>;

/// Errors raised by form and block operations.
#[derive(Debug, Error)]
pub enum FormError {
    /// A block was configured with neither a module name nor an inline
    /// template. Raised at construction, never during render.
    #[error("block configuration supplies neither module nor template")]
    MissingTemplate,

    /// A module name was not found in the template registry.
    #[error("unknown module: {module}")]
    UnknownModule {
        /// The module that was requested.
        module: String,
    },

    /// A module name was registered twice.
    #[error("module already registered: {module}")]
    DuplicateModule {
        /// The module registered twice.
        module: String,
    },

    /// A module was registered with an empty name.
    #[error("module name is empty")]
    EmptyModuleName,

    /// A processor rejected the document during extraction.
    #[error("validation failed: {message}")]
    Validation {
        /// What the processor objected to.
        message: String,
    },

    /// A second submission was attempted while one is in flight.
    #[error("submission already in flight")]
    SubmitInFlight,

    /// Document-layer failure (path resolution, patch application, coercion).
    #[error(transparent)]
    State(#[from] StateError),
}

impl FormError {
    /// Create an unknown-module error.
    #[inline]
    pub fn unknown_module(module: impl Into<String>) -> Self {
        FormError::UnknownModule {
            module: module.into(),
        }
    }

    /// Create a duplicate-module error.
    #[inline]
    pub fn duplicate_module(module: impl Into<String>) -> Self {
        FormError::DuplicateModule {
            module: module.into(),
        }
    }

    /// Create a validation error.
    #[inline]
    pub fn validation(message: impl Into<String>) -> Self {
        FormError::Validation {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formwork_state::Path;

    #[test]
    fn test_error_display() {
        assert_eq!(
            FormError::unknown_module("convention_forms.basis").to_string(),
            "unknown module: convention_forms.basis"
        );
        assert!(FormError::validation("name is required")
            .to_string()
            .contains("name is required"));
    }

    #[test]
    fn test_state_error_wraps_transparently() {
        let state = StateError::coercion_failed(Path::parse("settlementDays"), "five", "byte");
        let err: FormError = state.into();
        assert!(err.to_string().contains("settlementDays"));
    }
}
