//! Declarative form validation for CRM forms
//!
//! Schema-driven field validation with cross-field rules, whole-form reports,
//! and a form controller that tracks touched fields and debounces
//! re-validation while the user types.

pub mod controller;
pub mod error;
pub mod model;
pub mod validation;

pub use controller::FormController;
pub use model::{FormData, Value};
pub use validation::{FieldSchema, FormSchema, Rule, ValidationReport, validate, validate_field};
