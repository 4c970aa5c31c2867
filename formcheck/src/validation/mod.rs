//! Declarative field and form validation.
//!
//! A [`FormSchema`] maps field names to ordered rule lists ([`FieldSchema`]).
//! Validating a field runs its rules in order and stops at the first
//! failure; validating a form runs every declared field and collects the
//! failures into a [`ValidationReport`].
//!
//! # Example
//!
//! ```
//! use formcheck::model::{FormData, Value};
//! use formcheck::validation::{FieldSchema, FormSchema};
//!
//! let schema = FormSchema::new()
//!     .field("name", FieldSchema::new().required().message("Name is required"))
//!     .field("email", FieldSchema::new().required().email())
//!     .field(
//!         "probability",
//!         FieldSchema::new().min(0.0).max(100.0).custom(|value, data| {
//!             let prospect = data.value("stage").as_str() == Some("prospect");
//!             let high = matches!(value, Value::Int(p) if *p > 25);
//!             (prospect && high).then(|| "Prospects cannot exceed 25%".to_string())
//!         }),
//!     );
//!
//! let data = FormData::new()
//!     .set("name", "Acme")
//!     .set("email", "buyer@acme.test")
//!     .set("stage", "prospect")
//!     .set("probability", 60i64);
//!
//! let report = schema.validate(&data);
//! assert!(report.is_invalid());
//! assert_eq!(report.error("probability"), Some("Prospects cannot exceed 25%"));
//! ```

mod coerce;
mod declaration;
mod field;
mod result;
mod rule;
mod schema;

pub use declaration::FieldRules;
pub use field::FieldSchema;
pub use result::{FieldError, FieldResult, ValidationReport};
pub use rule::{CustomRule, DateRule, Rule, VALIDATION_ERROR, evaluate, extract_panic_message};
pub use schema::{FormSchema, validate, validate_field};
