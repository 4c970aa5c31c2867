//! Tests for schema and field validation.

use formcheck::model::{FormData, Value};
use formcheck::validation::{
    DateRule, FieldRules, FieldSchema, FormSchema, Rule, VALIDATION_ERROR, validate, validate_field,
};

fn probability_rule(value: &Value, data: &FormData) -> Option<String> {
    let prospect = data.value("stage").as_str() == Some("prospect");
    match value {
        Value::Int(p) if prospect && *p > 25 => Some("too high".to_string()),
        _ => None,
    }
}

fn opportunity_schema() -> FormSchema {
    FormSchema::new()
        .field(
            "title",
            FieldSchema::new()
                .required()
                .message("Opportunity title is required")
                .min_length(5),
        )
        .field("stage", FieldSchema::new().required())
        .field(
            "probability",
            FieldSchema::new().min(0.0).max(100.0).custom(probability_rule),
        )
        .field("contactEmail", FieldSchema::new().email())
        .field(
            "closeDate",
            FieldSchema::new().date(
                DateRule::new().max_date(chrono::NaiveDate::from_ymd_opt(2099, 12, 31).unwrap()),
            ),
        )
}

fn sample_forms() -> Vec<FormData> {
    vec![
        FormData::new(),
        FormData::new()
            .set("title", "Acme expansion")
            .set("stage", "prospect")
            .set("probability", 10i64),
        FormData::new()
            .set("title", "Acme")
            .set("stage", "prospect")
            .set("probability", 90i64)
            .set("contactEmail", "not-an-email"),
        FormData::new()
            .set("title", "Globex renewal")
            .set("stage", "negotiation")
            .set("probability", "eighty")
            .set("closeDate", "2199-01-01"),
    ]
}

#[test]
fn test_report_agrees_with_field_results() {
    let schema = opportunity_schema();
    for data in sample_forms() {
        let report = validate(&data, &schema);
        let mut all_valid = true;
        for field in schema.field_names() {
            let result = validate_field(field, data.value(field), &data, &schema);
            all_valid &= result.is_valid();
            assert_eq!(report.error(field), result.error(), "field {field}");
        }
        assert_eq!(report.is_valid(), all_valid);
    }
}

#[test]
fn test_validate_is_idempotent() {
    let schema = opportunity_schema();
    for data in sample_forms() {
        let before = data.clone();
        let first = validate(&data, &schema);
        let second = validate(&data, &schema);
        assert_eq!(first, second);
        assert_eq!(data, before);
    }
}

#[test]
fn test_fail_fast_ordering() {
    let schema = FormSchema::new().field("title", FieldSchema::new().required().min_length(5));
    let data = FormData::new().set("title", "");
    let result = validate_field("title", data.value("title"), &data, &schema);
    assert_eq!(result.error(), Some("This field is required"));
}

#[test]
fn test_required_empty() {
    let schema = FormSchema::new().field("title", FieldSchema::new().required());
    let data = FormData::new();
    let result = validate_field("title", &Value::from(""), &data, &schema);
    assert!(!result.is_valid());
    assert_eq!(result.error(), Some("This field is required"));
}

#[test]
fn test_cross_field_custom_rule() {
    let schema =
        FormSchema::new().field("probability", FieldSchema::new().custom(probability_rule));

    let high = FormData::new().set("stage", "prospect").set("probability", 90i64);
    assert_eq!(validate(&high, &schema).error("probability"), Some("too high"));

    let low = FormData::new().set("stage", "prospect").set("probability", 10i64);
    assert_eq!(validate(&low, &schema).error("probability"), None);

    let later_stage = FormData::new().set("stage", "closing").set("probability", 90i64);
    assert!(validate(&later_stage, &schema).is_valid());
}

#[test]
fn test_unschemad_field_ignored() {
    let schema = FormSchema::new().field("title", FieldSchema::new().required());
    let data = FormData::new().set("title", "ok").set("extra", "");
    let report = validate(&data, &schema);
    assert!(report.is_valid());
    assert!(report.error_map().is_empty());
}

#[test]
fn test_panicking_custom_rule_is_contained() {
    let schema = FormSchema::new()
        .field(
            "score",
            FieldSchema::new().custom(|_, _| panic!("scoring table missing")),
        )
        .field("title", FieldSchema::new().required());

    let data = FormData::new().set("score", 3i64);
    let result = validate_field("score", data.value("score"), &data, &schema);
    assert_eq!(result.error(), Some(VALIDATION_ERROR));

    // one broken rule does not stop the rest of the form
    let report = validate(&data, &schema);
    assert_eq!(report.error("score"), Some(VALIDATION_ERROR));
    assert_eq!(report.error("title"), Some("This field is required"));
}

#[test]
fn test_failing_custom_rule_is_contained() {
    let schema = FormSchema::new().field(
        "territory",
        FieldSchema::new().try_custom(|value, _| match value.as_str() {
            Some(code) if code.len() == 2 => Ok(None),
            Some(code) => Err(format!("unknown territory code {code}")),
            None => Ok(Some("Territory is required".to_string())),
        }),
    );

    let report = validate(&FormData::new().set("territory", "EMEA-1"), &schema);
    assert_eq!(report.error("territory"), Some("Validation error occurred"));
    assert!(validate(&FormData::new().set("territory", "NL"), &schema).is_valid());
}

#[test]
fn test_custom_rule_runs_after_structural_rules() {
    let schema = FormSchema::new().field(
        "probability",
        FieldSchema::new().required().max(100.0).custom(probability_rule),
    );
    let data = FormData::new().set("stage", "prospect").set("probability", 150i64);
    assert_eq!(
        validate(&data, &schema).error("probability"),
        Some("Must be no more than 100")
    );
}

#[test]
fn test_numeric_edge_cases() {
    let schema = FormSchema::new().field("amount", FieldSchema::new().min(0.0));
    let cases = [
        (Value::Float(f64::NAN), Some("Please enter a valid number")),
        (Value::Float(f64::NEG_INFINITY), Some("Please enter a valid number")),
        (Value::from("1e3"), None),
        (Value::from(""), None),
        (Value::from("-1"), Some("Must be at least 0")),
        (Value::Null, None),
    ];
    for (value, expected) in cases {
        let data = FormData::new().set("amount", value.clone());
        assert_eq!(validate(&data, &schema).error("amount"), expected, "value {value:?}");
    }
}

#[test]
fn test_required_number_rejects_blank() {
    let schema = FormSchema::new().field("amount", FieldSchema::new().required().min(0.0));
    let report = validate(&FormData::new().set("amount", "  "), &schema);
    assert_eq!(report.error("amount"), Some("This field is required"));
}

#[test]
fn test_close_date_cannot_be_in_the_past() {
    let schema = FormSchema::new()
        .field("closeDate", FieldSchema::new().date(DateRule::new().no_past()));
    let report = validate(&FormData::new().set("closeDate", "2001-01-01"), &schema);
    assert_eq!(report.error("closeDate"), Some("Date cannot be in the past"));

    let future = chrono::Utc::now() + chrono::TimeDelta::days(30);
    assert!(validate(&FormData::new().set("closeDate", future), &schema).is_valid());
}

#[test]
fn test_json_schema_with_attached_custom_rule() {
    let schema = FormSchema::from_json(
        r#"{
            "title": { "required": true, "messages": { "required": "Name the opportunity" } },
            "stage": { "required": true },
            "probability": { "min": 0, "max": 100 }
        }"#,
    )
    .unwrap()
    .with_rule("probability", Rule::custom(probability_rule))
    .unwrap();

    let data = FormData::from_json(r#"{"stage": "prospect", "probability": 60}"#).unwrap();
    let report = validate(&data, &schema);
    assert_eq!(report.error("title"), Some("Name the opportunity"));
    assert_eq!(report.error("probability"), Some("too high"));
    assert_eq!(report.errors().len(), 2);
}

#[test]
fn test_declaration_shape() {
    let schema = FormSchema::from_rules([(
        "email",
        FieldRules {
            required: true,
            max_length: Some(64),
            email: true,
            ..Default::default()
        },
    )]);

    assert!(validate(&FormData::new().set("email", "rep@sales.example"), &schema).is_valid());
    assert_eq!(
        validate(&FormData::new().set("email", "rep@"), &schema).error("email"),
        Some("Please enter a valid email address")
    );
}
