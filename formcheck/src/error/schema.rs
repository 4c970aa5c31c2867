//! Schema construction errors

/// Error raised while declaring or loading a form schema.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// A pattern rule was declared with a regex that does not compile.
    #[error("Invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A date rule was declared with a maximum date that cannot be parsed.
    #[error("Invalid max date '{value}' (expected YYYY-MM-DD or RFC 3339)")]
    InvalidMaxDate { value: String },

    /// A JSON schema declaration could not be parsed.
    #[error("Invalid schema declaration: {0}")]
    InvalidDeclaration(#[source] serde_json::Error),

    /// One field of a JSON schema declaration could not be parsed.
    #[error("Invalid declaration for field '{field}': {source}")]
    InvalidField {
        field: String,
        #[source]
        source: serde_json::Error,
    },

    /// A JSON form payload could not be parsed.
    #[error("Invalid form data: {0}")]
    InvalidFormData(#[source] serde_json::Error),

    /// A rule was attached to a field the schema does not declare.
    #[error("Field '{field}' is not declared in the schema")]
    UnknownField { field: String },
}

impl SchemaError {
    /// Creates a new invalid pattern error.
    pub fn invalid_pattern(pattern: impl Into<String>, source: regex::Error) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            source,
        }
    }

    /// Creates a new unknown field error.
    pub fn unknown_field(field: impl Into<String>) -> Self {
        Self::UnknownField {
            field: field.into(),
        }
    }
}
