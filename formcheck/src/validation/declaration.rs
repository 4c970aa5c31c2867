//! Declaration-style field rules and JSON schema loading.

use std::collections::HashMap;

use regex::Regex;
use serde::Deserialize;

use super::coerce;
use super::field::FieldSchema;
use super::rule::{CustomRule, DateRule, Rule};
use super::schema::FormSchema;
use crate::error::SchemaError;

/// Field rules declared as a set of optional keys.
///
/// Converting into a [`FieldSchema`] orders the rules canonically:
/// required, minLength, maxLength, min, max, pattern, email, date, custom.
///
/// # Example
///
/// ```
/// use formcheck::validation::{FieldRules, FieldSchema};
///
/// let rules = FieldRules {
///     required: true,
///     max_length: Some(120),
///     ..Default::default()
/// }
/// .message("required", "Give the opportunity a name");
///
/// let schema: FieldSchema = rules.into();
/// assert_eq!(schema.rules().len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct FieldRules {
    pub required: bool,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub pattern: Option<Regex>,
    pub email: bool,
    pub date: Option<DateRule>,
    pub custom: Option<CustomRule>,
    /// Message overrides keyed by rule kind (`"required"`, `"minLength"`, ...).
    ///
    /// A `"custom"` entry is ignored with a warning, since custom rules
    /// return their own messages.
    pub messages: HashMap<String, String>,
}

impl FieldRules {
    /// Override the message for one rule kind.
    pub fn message(mut self, kind: impl Into<String>, msg: impl Into<String>) -> Self {
        self.messages.insert(kind.into(), msg.into());
        self
    }
}

impl From<FieldRules> for FieldSchema {
    fn from(decl: FieldRules) -> Self {
        let rules = [
            decl.required.then(Rule::required),
            decl.min_length.map(Rule::min_length),
            decl.max_length.map(Rule::max_length),
            decl.min.map(Rule::min),
            decl.max.map(Rule::max),
            decl.pattern.map(Rule::pattern_regex),
            decl.email.then(Rule::email),
            decl.date.map(Rule::date),
            decl.custom.map(Rule::Custom),
        ];

        rules
            .into_iter()
            .flatten()
            .map(|rule| match decl.messages.get(rule.kind()) {
                Some(msg) => rule.with_message(msg.clone()),
                None => rule,
            })
            .collect::<Vec<_>>()
            .into()
    }
}

// =============================================================================
// JSON
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct FieldDeclaration {
    #[serde(default)]
    required: bool,
    min_length: Option<usize>,
    max_length: Option<usize>,
    min: Option<f64>,
    max: Option<f64>,
    pattern: Option<String>,
    #[serde(default)]
    email: bool,
    date: Option<DateDeclaration>,
    #[serde(default)]
    messages: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct DateDeclaration {
    #[serde(default = "allowed")]
    allow_past: bool,
    #[serde(default = "allowed")]
    allow_future: bool,
    max_date: Option<String>,
}

fn allowed() -> bool {
    true
}

impl TryFrom<FieldDeclaration> for FieldRules {
    type Error = SchemaError;

    fn try_from(decl: FieldDeclaration) -> Result<Self, Self::Error> {
        let pattern = decl
            .pattern
            .map(|p| Regex::new(&p).map_err(|e| SchemaError::invalid_pattern(p.as_str(), e)))
            .transpose()?;
        let date = decl.date.map(DateRule::try_from).transpose()?;

        Ok(Self {
            required: decl.required,
            min_length: decl.min_length,
            max_length: decl.max_length,
            min: decl.min,
            max: decl.max,
            pattern,
            email: decl.email,
            date,
            custom: None,
            messages: decl.messages,
        })
    }
}

impl TryFrom<DateDeclaration> for DateRule {
    type Error = SchemaError;

    fn try_from(decl: DateDeclaration) -> Result<Self, Self::Error> {
        let max_date = decl
            .max_date
            .map(|s| coerce::parse_date(&s).ok_or(SchemaError::InvalidMaxDate { value: s }))
            .transpose()?;

        Ok(Self {
            allow_past: decl.allow_past,
            allow_future: decl.allow_future,
            max_date,
        })
    }
}

impl FormSchema {
    /// Build a schema from declaration-style field rules.
    pub fn from_rules<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, FieldRules)>,
        K: Into<String>,
    {
        fields
            .into_iter()
            .fold(Self::new(), |schema, (name, rules)| schema.field(name, rules.into()))
    }

    /// Load a schema from a JSON object of field declarations.
    ///
    /// Keys use camelCase: `required`, `minLength`, `maxLength`, `min`,
    /// `max`, `pattern`, `email`, `date` (`allowPast`, `allowFuture`,
    /// `maxDate`) and `messages`. Field order follows the document.
    /// Custom rules are attached afterwards with
    /// [`with_rule`](FormSchema::with_rule).
    ///
    /// # Example
    ///
    /// ```
    /// use formcheck::validation::FormSchema;
    ///
    /// let schema = FormSchema::from_json(r#"{
    ///     "title": { "required": true, "minLength": 3 },
    ///     "closeDate": { "date": { "allowPast": false } }
    /// }"#).unwrap();
    /// assert_eq!(schema.field_names().collect::<Vec<_>>(), vec!["title", "closeDate"]);
    /// ```
    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        let fields: serde_json::Map<String, serde_json::Value> =
            serde_json::from_str(json).map_err(SchemaError::InvalidDeclaration)?;

        let mut schema = Self::new();
        for (name, decl) in fields {
            let decl: FieldDeclaration = serde_json::from_value(decl)
                .map_err(|source| SchemaError::InvalidField {
                    field: name.clone(),
                    source,
                })?;
            schema.insert(name, FieldRules::try_from(decl)?.into());
        }
        Ok(schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FormData, Value};

    #[test]
    fn test_canonical_rule_order() {
        let schema: FieldSchema = FieldRules {
            custom: Some(CustomRule::new(|_, _| Some("custom".to_string()))),
            email: true,
            min_length: Some(3),
            required: true,
            ..Default::default()
        }
        .into();

        let kinds: Vec<&str> = schema.rules().iter().map(Rule::kind).collect();
        assert_eq!(kinds, vec!["required", "minLength", "email", "custom"]);
    }

    #[test]
    fn test_message_overrides() {
        let schema: FieldSchema = FieldRules {
            required: true,
            ..Default::default()
        }
        .message("required", "Account name is required")
        .into();

        let result = schema.validate(&Value::Null, &FormData::new());
        assert_eq!(result.error(), Some("Account name is required"));
    }

    #[test]
    fn test_custom_message_override_is_ignored() {
        let schema: FieldSchema = FieldRules {
            custom: Some(CustomRule::new(|_, _| Some("Region mismatch".to_string()))),
            ..Default::default()
        }
        .message("custom", "unused")
        .into();

        let result = schema.validate(&Value::from("EMEA"), &FormData::new());
        assert_eq!(result.error(), Some("Region mismatch"));
    }

    #[test]
    fn test_from_json() {
        let schema = FormSchema::from_json(
            r#"{
                "title": {
                    "required": true,
                    "maxLength": 5,
                    "messages": { "maxLength": "Keep it short" }
                },
                "contactEmail": { "email": true },
                "code": { "pattern": "^[A-Z]+$" }
            }"#,
        )
        .unwrap();

        let data = FormData::new()
            .set("title", "Enterprise renewal")
            .set("contactEmail", "nope")
            .set("code", "abc");
        let report = schema.validate(&data);
        assert_eq!(report.error("title"), Some("Keep it short"));
        assert_eq!(report.error("contactEmail"), Some("Please enter a valid email address"));
        assert_eq!(report.error("code"), Some("Invalid format"));
    }

    #[test]
    fn test_from_json_preserves_order() {
        let schema = FormSchema::from_json(r#"{"zeta": {}, "alpha": {}, "mid": {}}"#).unwrap();
        assert_eq!(schema.field_names().collect::<Vec<_>>(), vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_from_json_unknown_key() {
        let err = FormSchema::from_json(r#"{"title": {"requird": true}}"#).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidField { ref field, .. } if field == "title"));
    }

    #[test]
    fn test_from_json_bad_pattern() {
        let err = FormSchema::from_json(r#"{"code": {"pattern": "[a-"}}"#).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidPattern { .. }));
    }

    #[test]
    fn test_from_json_bad_max_date() {
        let err = FormSchema::from_json(r#"{"closeDate": {"date": {"maxDate": "soon"}}}"#)
            .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidMaxDate { .. }));
    }

    #[test]
    fn test_from_json_date_defaults() {
        let schema =
            FormSchema::from_json(r#"{"closeDate": {"date": {"maxDate": "2030-01-01"}}}"#)
                .unwrap();
        let rules = schema.get("closeDate").unwrap().rules();
        let Rule::Date { rule, .. } = &rules[0] else {
            panic!("expected date rule");
        };
        assert!(rule.allow_past);
        assert!(rule.allow_future);
        assert_eq!(rule.max_date, chrono::NaiveDate::from_ymd_opt(2030, 1, 1));
    }

    #[test]
    fn test_from_rules() {
        let schema = FormSchema::from_rules([
            (
                "name",
                FieldRules {
                    required: true,
                    ..Default::default()
                },
            ),
            (
                "revenue",
                FieldRules {
                    min: Some(0.0),
                    ..Default::default()
                },
            ),
        ]);
        assert_eq!(schema.len(), 2);
        assert!(schema.validate(&FormData::new()).is_invalid());
    }
}
