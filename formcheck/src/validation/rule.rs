//! Declarative validation rules and their evaluation.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use chrono::NaiveDate;
use chrono::Utc;
use regex::Regex;

use super::coerce;
use crate::error::SchemaError;
use crate::model::{FormData, Value};

/// Message reported when a custom rule fails unexpectedly.
pub const VALIDATION_ERROR: &str = "Validation error occurred";

const REQUIRED: &str = "This field is required";
const INVALID_NUMBER: &str = "Please enter a valid number";
const INVALID_FORMAT: &str = "Invalid format";
const INVALID_EMAIL: &str = "Please enter a valid email address";
const INVALID_DATE: &str = "Please enter a valid date";
const DATE_IN_PAST: &str = "Date cannot be in the past";
const DATE_IN_FUTURE: &str = "Date cannot be in the future";

/// Type alias for custom rule closures.
type CustomFn = dyn Fn(&Value, &FormData) -> Result<Option<String>, String> + Send + Sync;

/// A single declarative constraint on a field's value.
///
/// Rules are immutable once declared and cheap to clone.
///
/// # Example
///
/// ```
/// use formcheck::model::{FormData, Value};
/// use formcheck::validation::Rule;
///
/// let rule = Rule::min_length(3).with_message("Title is too short");
/// let data = FormData::new();
/// assert_eq!(rule.evaluate(&Value::from("ab"), &data), Some("Title is too short".to_string()));
/// assert_eq!(rule.evaluate(&Value::from("abc"), &data), None);
/// ```
#[derive(Debug, Clone)]
pub enum Rule {
    /// Value must be present and not blank.
    Required { message: Option<String> },
    /// String must have at least `min` characters.
    MinLength { min: usize, message: Option<String> },
    /// String must have at most `max` characters.
    MaxLength { max: usize, message: Option<String> },
    /// Number must be at least `min`.
    Min { min: f64, message: Option<String> },
    /// Number must be at most `max`.
    Max { max: f64, message: Option<String> },
    /// Text form of the value must match `regex`.
    Pattern { regex: Regex, message: Option<String> },
    /// Value must be a syntactically valid email address.
    Email { message: Option<String> },
    /// Value must be a date within the allowed range.
    Date { rule: DateRule, message: Option<String> },
    /// Caller supplied check with access to the whole form.
    Custom(CustomRule),
}

impl Rule {
    /// Require the field to be filled in.
    pub fn required() -> Self {
        Self::Required { message: None }
    }

    /// Require minimum length (in characters).
    pub fn min_length(min: usize) -> Self {
        Self::MinLength { min, message: None }
    }

    /// Require maximum length (in characters).
    pub fn max_length(max: usize) -> Self {
        Self::MaxLength { max, message: None }
    }

    /// Require a numeric lower bound.
    pub fn min(min: f64) -> Self {
        Self::Min { min, message: None }
    }

    /// Require a numeric upper bound.
    pub fn max(max: f64) -> Self {
        Self::Max { max, message: None }
    }

    /// Require the value to match a regex pattern.
    pub fn pattern(pattern: &str) -> Result<Self, SchemaError> {
        let regex = Regex::new(pattern).map_err(|e| SchemaError::invalid_pattern(pattern, e))?;
        Ok(Self::pattern_regex(regex))
    }

    /// Require the value to match an already compiled regex.
    pub fn pattern_regex(regex: Regex) -> Self {
        Self::Pattern {
            regex,
            message: None,
        }
    }

    /// Require a valid email address.
    pub fn email() -> Self {
        Self::Email { message: None }
    }

    /// Require a date within the range described by `rule`.
    pub fn date(rule: DateRule) -> Self {
        Self::Date {
            rule,
            message: None,
        }
    }

    /// Add a custom rule.
    ///
    /// The closure receives the field value and the whole form, and returns
    /// an error message or `None`. It must not have side effects. A panic
    /// inside the closure fails the field with [`VALIDATION_ERROR`].
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&Value, &FormData) -> Option<String> + Send + Sync + 'static,
    {
        Self::Custom(CustomRule::new(f))
    }

    /// Add a custom rule that can fail.
    ///
    /// An `Err` is logged and fails the field with [`VALIDATION_ERROR`].
    pub fn try_custom<F, E>(f: F) -> Self
    where
        F: Fn(&Value, &FormData) -> Result<Option<String>, E> + Send + Sync + 'static,
        E: fmt::Display,
    {
        Self::Custom(CustomRule::fallible(f))
    }

    /// Replace the default failure message.
    ///
    /// Custom rules produce their own messages, so this has no effect on them.
    /// Unparsable numbers and dates keep their own message as well.
    pub fn with_message(mut self, msg: impl Into<String>) -> Self {
        match &mut self {
            Self::Required { message }
            | Self::MinLength { message, .. }
            | Self::MaxLength { message, .. }
            | Self::Min { message, .. }
            | Self::Max { message, .. }
            | Self::Pattern { message, .. }
            | Self::Email { message }
            | Self::Date { message, .. } => *message = Some(msg.into()),
            Self::Custom(_) => {
                log::warn!("Ignoring message override on custom rule: {}", msg.into());
            }
        }
        self
    }

    /// Returns the rule kind name, as used in JSON declarations.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Required { .. } => "required",
            Self::MinLength { .. } => "minLength",
            Self::MaxLength { .. } => "maxLength",
            Self::Min { .. } => "min",
            Self::Max { .. } => "max",
            Self::Pattern { .. } => "pattern",
            Self::Email { .. } => "email",
            Self::Date { .. } => "date",
            Self::Custom(_) => "custom",
        }
    }

    /// Evaluates the rule, returning the failure message or `None` on pass.
    pub fn evaluate(&self, value: &Value, data: &FormData) -> Option<String> {
        self.evaluate_on(value, data, Utc::now().date_naive())
    }

    /// Evaluates the rule with `today` as the reference day for date rules.
    pub fn evaluate_on(&self, value: &Value, data: &FormData, today: NaiveDate) -> Option<String> {
        let failure = match self {
            Self::Required { message } => {
                value.is_blank().then(|| message_or(message, REQUIRED))
            }
            Self::MinLength { min, message } => match value {
                Value::String(s) if !s.is_empty() && s.chars().count() < *min => {
                    Some(message_or(message, format!("Must be at least {min} characters")))
                }
                _ => None,
            },
            Self::MaxLength { max, message } => match value {
                Value::String(s) if s.chars().count() > *max => {
                    Some(message_or(message, format!("Must be no more than {max} characters")))
                }
                _ => None,
            },
            Self::Min { min, message } => check_number(value, |n| n >= *min).map(|e| {
                e.unwrap_or_else(|| message_or(message, format!("Must be at least {min}")))
            }),
            Self::Max { max, message } => check_number(value, |n| n <= *max).map(|e| {
                e.unwrap_or_else(|| message_or(message, format!("Must be no more than {max}")))
            }),
            Self::Pattern { regex, message } => {
                (!is_empty(value) && !regex.is_match(&value.to_text()))
                    .then(|| message_or(message, INVALID_FORMAT))
            }
            Self::Email { message } => match value {
                v if is_empty(v) => None,
                Value::String(s) if email_address::EmailAddress::is_valid(s.trim()) => None,
                _ => Some(message_or(message, INVALID_EMAIL)),
            },
            Self::Date { rule, message } => rule.check(value, today, message),
            Self::Custom(rule) => rule.run(value, data),
        };

        if let Some(msg) = &failure {
            log::trace!("Rule {} failed: {}", self.kind(), msg);
        }
        failure
    }
}

/// Evaluates one rule against one value.
///
/// Free-function form of [`Rule::evaluate`].
pub fn evaluate(rule: &Rule, value: &Value, data: &FormData) -> Option<String> {
    rule.evaluate(value, data)
}

fn message_or(message: &Option<String>, default: impl Into<String>) -> String {
    message.clone().unwrap_or_else(|| default.into())
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Runs a numeric comparison.
///
/// Returns `None` when the value is blank or in bounds, `Some(Some(msg))`
/// when it is not a number, and `Some(None)` when it is out of bounds.
fn check_number(value: &Value, in_bounds: impl Fn(f64) -> bool) -> Option<Option<String>> {
    if value.is_blank() {
        return None;
    }
    match coerce::to_number(value) {
        None => {
            log::trace!("Cannot read {} value as a number", value.type_name());
            Some(Some(INVALID_NUMBER.to_string()))
        }
        Some(n) if in_bounds(n) => None,
        Some(_) => Some(None),
    }
}

// =============================================================================
// DateRule
// =============================================================================

/// Allowed range for a date field.
///
/// Past and future are judged by calendar day, so "today" is neither.
///
/// # Example
///
/// ```
/// use formcheck::validation::{DateRule, Rule};
///
/// // Close date must not be in the past
/// let rule = Rule::date(DateRule::new().no_past());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRule {
    /// Whether days before today are accepted. Default: `true`.
    pub allow_past: bool,
    /// Whether days after today are accepted. Default: `true`.
    pub allow_future: bool,
    /// Latest accepted day, inclusive.
    pub max_date: Option<NaiveDate>,
}

impl Default for DateRule {
    fn default() -> Self {
        Self {
            allow_past: true,
            allow_future: true,
            max_date: None,
        }
    }
}

impl DateRule {
    /// Creates a date rule accepting any valid date.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects days before today.
    pub fn no_past(mut self) -> Self {
        self.allow_past = false;
        self
    }

    /// Rejects days after today.
    pub fn no_future(mut self) -> Self {
        self.allow_future = false;
        self
    }

    /// Sets the latest accepted day.
    pub fn max_date(mut self, max: NaiveDate) -> Self {
        self.max_date = Some(max);
        self
    }

    fn check(&self, value: &Value, today: NaiveDate, message: &Option<String>) -> Option<String> {
        if value.is_blank() {
            return None;
        }
        let Some(day) = coerce::to_date(value) else {
            log::trace!("Cannot read {} value as a date", value.type_name());
            return Some(INVALID_DATE.to_string());
        };
        if !self.allow_past && day < today {
            return Some(message_or(message, DATE_IN_PAST));
        }
        if !self.allow_future && day > today {
            return Some(message_or(message, DATE_IN_FUTURE));
        }
        match self.max_date {
            Some(max) if day > max => Some(message_or(
                message,
                format!("Date cannot be after {}", max.format("%Y-%m-%d")),
            )),
            _ => None,
        }
    }
}

// =============================================================================
// CustomRule
// =============================================================================

/// A caller supplied rule with access to the whole form.
#[derive(Clone)]
pub struct CustomRule {
    check: Arc<CustomFn>,
}

impl CustomRule {
    /// Wraps a check returning an error message or `None`.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Value, &FormData) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            check: Arc::new(move |v, data| Ok(f(v, data))),
        }
    }

    /// Wraps a check that can fail.
    pub fn fallible<F, E>(f: F) -> Self
    where
        F: Fn(&Value, &FormData) -> Result<Option<String>, E> + Send + Sync + 'static,
        E: fmt::Display,
    {
        Self {
            check: Arc::new(move |v, data| f(v, data).map_err(|e| e.to_string())),
        }
    }

    /// Runs the check, containing failures.
    fn run(&self, value: &Value, data: &FormData) -> Option<String> {
        match panic::catch_unwind(AssertUnwindSafe(|| (self.check)(value, data))) {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(err)) => {
                log::error!("Custom rule failed: {}", err);
                Some(VALIDATION_ERROR.to_string())
            }
            Err(panic) => {
                log::error!("Custom rule panicked: {}", extract_panic_message(&*panic));
                Some(VALIDATION_ERROR.to_string())
            }
        }
    }
}

impl fmt::Debug for CustomRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CustomRule")
    }
}

/// Extract a message from a panic payload.
pub fn extract_panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}
