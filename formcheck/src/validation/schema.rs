//! Whole-form schemas and the schema validator.

use chrono::Utc;

use super::field::FieldSchema;
use super::result::{FieldError, FieldResult, ValidationReport};
use super::rule::Rule;
use crate::error::SchemaError;
use crate::model::{FormData, Value};

/// Mapping from field name to [`FieldSchema`] for an entire form.
///
/// Field names are unique and kept in declaration order. Only declared
/// fields are validated; extra keys in the form data are ignored.
///
/// # Example
///
/// ```
/// use formcheck::model::FormData;
/// use formcheck::validation::{FieldSchema, FormSchema};
///
/// let schema = FormSchema::new()
///     .field("title", FieldSchema::new().required())
///     .field("amount", FieldSchema::new().min(0.0));
///
/// let report = schema.validate(&FormData::new().set("amount", -5i64));
/// assert!(report.is_invalid());
/// assert_eq!(report.error("title"), Some("This field is required"));
/// assert_eq!(report.error("amount"), Some("Must be at least 0"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct FormSchema {
    fields: Vec<(String, FieldSchema)>,
}

impl FormSchema {
    /// Create an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a field (builder pattern).
    ///
    /// Declaring the same name twice replaces the earlier rules in place.
    pub fn field(mut self, name: impl Into<String>, schema: FieldSchema) -> Self {
        self.insert(name, schema);
        self
    }

    /// Declare a field, returning the rules it replaced.
    pub fn insert(&mut self, name: impl Into<String>, schema: FieldSchema) -> Option<FieldSchema> {
        let name = name.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => {
                log::warn!("Field '{}' declared twice; replacing its rules", name);
                Some(std::mem::replace(existing, schema))
            }
            None => {
                self.fields.push((name, schema));
                None
            }
        }
    }

    /// Append a rule to an already declared field.
    ///
    /// Used to attach custom rules to schemas loaded with
    /// [`from_json`](Self::from_json).
    pub fn with_rule(mut self, name: &str, rule: Rule) -> Result<Self, SchemaError> {
        let (_, existing) = self
            .fields
            .iter_mut()
            .find(|(n, _)| n == name)
            .ok_or_else(|| SchemaError::unknown_field(name))?;
        *existing = std::mem::take(existing).rule(rule);
        Ok(self)
    }

    /// Get the rules declared for a field.
    pub fn get(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, s)| s)
    }

    /// Check if a field is declared.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterate declared field names in declaration order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    /// Get the number of declared fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if no fields are declared.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Validate one field against the whole form.
    ///
    /// Fields the schema does not declare are always valid.
    pub fn validate_field(&self, name: &str, value: &Value, data: &FormData) -> FieldResult {
        match self.get(name) {
            Some(schema) => schema.validate(value, data),
            None => FieldResult::Valid,
        }
    }

    /// Validate every declared field.
    ///
    /// Declared fields missing from `data` are validated as null.
    pub fn validate(&self, data: &FormData) -> ValidationReport {
        let today = Utc::now().date_naive();
        let errors: Vec<FieldError> = self
            .fields
            .iter()
            .filter_map(|(name, schema)| {
                schema
                    .validate_on(data.value(name), data, today)
                    .into_error()
                    .map(|message| FieldError::new(name.clone(), message))
            })
            .collect();

        log::debug!(
            "Validated {} field(s), {} invalid",
            self.fields.len(),
            errors.len()
        );
        ValidationReport::from_errors(errors)
    }
}

/// Validate one field of a form.
///
/// Free-function form of [`FormSchema::validate_field`].
pub fn validate_field(
    name: &str,
    value: &Value,
    data: &FormData,
    schema: &FormSchema,
) -> FieldResult {
    schema.validate_field(name, value, data)
}

/// Validate a whole form.
///
/// Free-function form of [`FormSchema::validate`].
pub fn validate(data: &FormData, schema: &FormSchema) -> ValidationReport {
    schema.validate(data)
}
