//! Ordered rule lists bound to a single field.

use std::fmt;

use chrono::NaiveDate;
use chrono::Utc;
use regex::Regex;

use super::result::FieldResult;
use super::rule::{DateRule, Rule};
use crate::error::SchemaError;
use crate::model::{FormData, Value};

/// The rules for one field, evaluated in declaration order.
///
/// Evaluation stops at the first failing rule, so put cheap structural
/// checks (required, length) before business rules.
///
/// # Example
///
/// ```
/// use formcheck::model::{FormData, Value};
/// use formcheck::validation::FieldSchema;
///
/// let title = FieldSchema::new()
///     .required()
///     .message("Title is required")
///     .min_length(5);
///
/// let result = title.validate(&Value::from(""), &FormData::new());
/// assert_eq!(result.error(), Some("Title is required"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct FieldSchema {
    rules: Vec<Rule>,
}

impl FieldSchema {
    /// Create a field schema with no rules.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule.
    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Override the message of the most recently added rule.
    ///
    /// Custom rules return their own messages; an override on one is ignored
    /// with a warning.
    pub fn message(mut self, msg: impl Into<String>) -> Self {
        if let Some(last) = self.rules.pop() {
            self.rules.push(last.with_message(msg));
        }
        self
    }

    /// Require the field to be filled in.
    pub fn required(self) -> Self {
        self.rule(Rule::required())
    }

    /// Require minimum length (in characters).
    pub fn min_length(self, min: usize) -> Self {
        self.rule(Rule::min_length(min))
    }

    /// Require maximum length (in characters).
    pub fn max_length(self, max: usize) -> Self {
        self.rule(Rule::max_length(max))
    }

    /// Require a numeric lower bound.
    pub fn min(self, min: f64) -> Self {
        self.rule(Rule::min(min))
    }

    /// Require a numeric upper bound.
    pub fn max(self, max: f64) -> Self {
        self.rule(Rule::max(max))
    }

    /// Require the value to match a regex pattern.
    pub fn pattern(self, pattern: &str) -> Result<Self, SchemaError> {
        Ok(self.rule(Rule::pattern(pattern)?))
    }

    /// Require the value to match an already compiled regex.
    pub fn pattern_regex(self, regex: Regex) -> Self {
        self.rule(Rule::pattern_regex(regex))
    }

    /// Require a valid email address.
    pub fn email(self) -> Self {
        self.rule(Rule::email())
    }

    /// Require a date within the given range.
    pub fn date(self, rule: DateRule) -> Self {
        self.rule(Rule::date(rule))
    }

    /// Add a custom rule with access to the whole form.
    pub fn custom<F>(self, f: F) -> Self
    where
        F: Fn(&Value, &FormData) -> Option<String> + Send + Sync + 'static,
    {
        self.rule(Rule::custom(f))
    }

    /// Add a custom rule that can fail.
    pub fn try_custom<F, E>(self, f: F) -> Self
    where
        F: Fn(&Value, &FormData) -> Result<Option<String>, E> + Send + Sync + 'static,
        E: fmt::Display,
    {
        self.rule(Rule::try_custom(f))
    }

    /// Get the rules in evaluation order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Check if the field has no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Run the rules against `value`, stopping at the first failure.
    pub fn validate(&self, value: &Value, data: &FormData) -> FieldResult {
        self.validate_on(value, data, Utc::now().date_naive())
    }

    pub(crate) fn validate_on(
        &self,
        value: &Value,
        data: &FormData,
        today: NaiveDate,
    ) -> FieldResult {
        self.rules
            .iter()
            .find_map(|rule| rule.evaluate_on(value, data, today))
            .into()
    }
}

impl From<Vec<Rule>> for FieldSchema {
    fn from(rules: Vec<Rule>) -> Self {
        Self { rules }
    }
}
