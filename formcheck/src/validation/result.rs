use std::collections::HashMap;

use serde::Serialize;

/// Outcome of validating a single field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub enum FieldResult {
    /// Every rule passed.
    #[default]
    Valid,
    /// A rule failed; holds the message of the first failing rule.
    Invalid(String),
}

impl FieldResult {
    /// Check if the field passed validation.
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// Get the error message, if the field failed.
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Valid => None,
            Self::Invalid(message) => Some(message),
        }
    }

    /// Convert into the error message, if the field failed.
    pub fn into_error(self) -> Option<String> {
        match self {
            Self::Valid => None,
            Self::Invalid(message) => Some(message),
        }
    }
}

impl From<Option<String>> for FieldResult {
    fn from(error: Option<String>) -> Self {
        match error {
            Some(message) => Self::Invalid(message),
            None => Self::Valid,
        }
    }
}

/// Information about a single field validation error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Field name as declared in the schema.
    pub field: String,
    /// Error message.
    pub message: String,
}

impl FieldError {
    /// Creates a new field error.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of validating a whole form.
///
/// Errors are kept in schema declaration order, so the first error is the
/// first invalid field as the form lays it out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub enum ValidationReport {
    /// All fields passed validation.
    #[default]
    Valid,
    /// One or more fields failed validation.
    Invalid(Vec<FieldError>),
}

impl ValidationReport {
    /// Builds a report from collected field errors.
    pub fn from_errors(errors: Vec<FieldError>) -> Self {
        if errors.is_empty() {
            Self::Valid
        } else {
            Self::Invalid(errors)
        }
    }

    /// Check if all fields passed validation.
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// Check if any field failed validation.
    pub fn is_invalid(&self) -> bool {
        !self.is_valid()
    }

    /// Get all validation errors.
    pub fn errors(&self) -> &[FieldError] {
        match self {
            Self::Valid => &[],
            Self::Invalid(errors) => errors,
        }
    }

    /// Get the first validation error (if any).
    pub fn first_error(&self) -> Option<&FieldError> {
        self.errors().first()
    }

    /// Get the error message for one field.
    pub fn error(&self, field: &str) -> Option<&str> {
        self.errors()
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    /// Get the per-field result for one field.
    pub fn field_result(&self, field: &str) -> FieldResult {
        self.error(field).map(str::to_string).into()
    }

    /// Get the errors as a field → message map.
    pub fn error_map(&self) -> HashMap<&str, &str> {
        self.errors()
            .iter()
            .map(|e| (e.field.as_str(), e.message.as_str()))
            .collect()
    }
}
