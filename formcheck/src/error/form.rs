//! Form submission errors

use crate::validation::ValidationReport;

/// Error returned when a form cannot be submitted.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FormError {
    /// Submission was blocked because at least one field failed validation.
    #[error("Form has {} invalid field(s)", .report.errors().len())]
    Invalid { report: ValidationReport },
}

impl FormError {
    /// Returns the validation report that blocked submission.
    pub fn report(&self) -> &ValidationReport {
        match self {
            Self::Invalid { report } => report,
        }
    }
}
