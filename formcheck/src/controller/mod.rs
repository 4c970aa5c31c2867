//! Form state holder with touched tracking and debounced re-validation.
//!
//! A [`FormController`] owns the values of one open form. Edits update the
//! values immediately; fields the user has already left (touched fields) are
//! revalidated after a quiet period so fast typing does not validate on every
//! keystroke. Leaving a field validates it at once, and submitting validates
//! everything.
//!
//! Timers run on the ambient tokio runtime. Outside a runtime, or with a zero
//! debounce window, revalidation happens synchronously.

mod config;
mod state;

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

pub use config::{ControllerConfig, DebounceScope};
use state::{ControllerInner, Scope};

use crate::error::FormError;
use crate::model::{FormData, Value};
use crate::validation::{FormSchema, ValidationReport};

/// Whether a debounced validation is outstanding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FormStatus {
    /// No validation is scheduled.
    #[default]
    Idle,
    /// At least one debounced validation is waiting for its timer.
    Validating,
}

/// Holds the state of one open form.
///
/// Cheap to clone; clones share state. Dropping the last handle cancels any
/// pending validation.
///
/// # Example
///
/// ```
/// use formcheck::controller::FormController;
/// use formcheck::validation::{FieldSchema, FormSchema};
///
/// let schema = FormSchema::new().field("title", FieldSchema::new().required());
/// let form = FormController::new(schema);
///
/// form.set_value("title", "");
/// assert_eq!(form.visible_error("title"), None); // not touched yet
///
/// form.blur("title");
/// assert_eq!(form.visible_error("title").as_deref(), Some("This field is required"));
///
/// assert!(form.submit().is_err());
/// ```
#[derive(Debug, Clone)]
pub struct FormController {
    inner: Arc<RwLock<ControllerInner>>,
}

impl FormController {
    /// Create a controller with the default configuration and no values.
    pub fn new(schema: impl Into<Arc<FormSchema>>) -> Self {
        Self::with_config(schema, ControllerConfig::default())
    }

    /// Create a controller with the given configuration.
    pub fn with_config(schema: impl Into<Arc<FormSchema>>, config: ControllerConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(ControllerInner::new(
                schema.into(),
                config,
                FormData::new(),
            ))),
        }
    }

    /// Start from existing values (builder pattern).
    pub fn with_values(self, data: FormData) -> Self {
        self.write().reset_to(data);
        self
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// Reopen the form for another record.
    ///
    /// Cancels pending validation and clears touched fields and errors.
    pub fn reopen(&self, data: FormData) {
        self.write().reset_to(data);
    }

    /// Discard edits and return to the values the form was opened with.
    pub fn reset(&self) {
        let mut inner = self.write();
        let initial = inner.initial.clone();
        inner.reset_to(initial);
    }

    /// Cancel every pending debounced validation.
    pub fn cancel_pending(&self) {
        self.write().cancel_all();
    }

    // -------------------------------------------------------------------------
    // Events
    // -------------------------------------------------------------------------

    /// Record an edit.
    ///
    /// The value is stored immediately. Once any field is touched, a debounced
    /// pass over the touched fields is scheduled, replacing any earlier one for
    /// the same scope. Editing an untouched field still revalidates touched
    /// fields whose custom rules may read it.
    pub fn set_value(&self, field: impl Into<String>, value: impl Into<Value>) {
        let field = field.into();
        let value = value.into();
        let mut inner = self.write();

        if inner.data.get(&field) == Some(&value) {
            return;
        }
        inner.data.insert(field.clone(), value);
        inner.dirty = true;

        if !inner.touched.is_empty() {
            let scope = inner.scope_for(&field);
            self.schedule(&mut inner, scope);
        }
    }

    /// Replace all values at once.
    ///
    /// Each changed field schedules a pass as for
    /// [`set_value`](Self::set_value).
    pub fn set_values(&self, data: FormData) {
        let mut inner = self.write();
        if inner.data == data {
            return;
        }

        let mut scopes: Vec<Scope> = Vec::new();
        if !inner.touched.is_empty() {
            let mut changed: Vec<&str> = inner
                .data
                .fields()
                .keys()
                .chain(data.fields().keys())
                .map(String::as_str)
                .filter(|field| inner.data.get(field) != data.get(field))
                .collect();
            changed.sort_unstable();
            changed.dedup();
            for field in changed {
                let scope = inner.scope_for(field);
                if !scopes.contains(&scope) {
                    scopes.push(scope);
                }
            }
        }

        inner.data = data;
        inner.dirty = true;
        for scope in scopes {
            self.schedule(&mut inner, scope);
        }
    }

    /// Record that the user left a field.
    ///
    /// Marks it touched and validates the touched fields immediately,
    /// cancelling the timer that covers the field.
    pub fn blur(&self, field: &str) {
        let mut inner = self.write();
        inner.touched.insert(field.to_string());
        let scope = inner.scope_for(field);
        inner.cancel(&scope);
        inner.validate_touched();
    }

    /// Attempt to submit.
    ///
    /// Validates every declared field regardless of touched state and marks
    /// them all touched. Returns the values when valid.
    pub fn submit(&self) -> Result<FormData, FormError> {
        let mut inner = self.write();
        inner.cancel_all();

        let report = inner.schema.validate(&inner.data);
        let fields: Vec<String> = inner.schema.field_names().map(str::to_string).collect();
        inner.touched.extend(fields);
        inner.errors = report
            .errors()
            .iter()
            .map(|e| (e.field.clone(), e.message.clone()))
            .collect();
        inner.passes += 1;

        if report.is_valid() {
            log::debug!("Form submitted");
            Ok(inner.data.clone())
        } else {
            log::debug!("Submit blocked: {} invalid field(s)", report.errors().len());
            Err(FormError::Invalid { report })
        }
    }

    // -------------------------------------------------------------------------
    // State access
    // -------------------------------------------------------------------------

    /// Get the current value of a field (null if unset).
    pub fn value(&self, field: &str) -> Value {
        self.read().data.value(field).clone()
    }

    /// Get a copy of all current values.
    pub fn data(&self) -> FormData {
        self.read().data.clone()
    }

    /// Get the schema the form validates against.
    pub fn schema(&self) -> Arc<FormSchema> {
        Arc::clone(&self.read().schema)
    }

    /// Check if a field has been touched.
    pub fn is_touched(&self, field: &str) -> bool {
        self.read().touched.contains(field)
    }

    /// Get the touched field names, sorted.
    pub fn touched(&self) -> Vec<String> {
        let mut fields: Vec<String> = self.read().touched.iter().cloned().collect();
        fields.sort();
        fields
    }

    /// Check if any value changed since the form was opened.
    pub fn is_dirty(&self) -> bool {
        self.read().dirty
    }

    /// Get whether a debounced validation is outstanding.
    pub fn status(&self) -> FormStatus {
        if self.read().pending.is_empty() {
            FormStatus::Idle
        } else {
            FormStatus::Validating
        }
    }

    /// Get the last computed error for a field, touched or not.
    pub fn error(&self, field: &str) -> Option<String> {
        self.read().errors.get(field).cloned()
    }

    /// Get the error to display for a field: only once it is touched.
    pub fn visible_error(&self, field: &str) -> Option<String> {
        let inner = self.read();
        if inner.touched.contains(field) {
            inner.errors.get(field).cloned()
        } else {
            None
        }
    }

    /// Get the errors to display for all touched fields.
    pub fn visible_errors(&self) -> HashMap<String, String> {
        let inner = self.read();
        inner
            .errors
            .iter()
            .filter(|(field, _)| inner.touched.contains(*field))
            .map(|(field, message)| (field.clone(), message.clone()))
            .collect()
    }

    /// Validate the current values from scratch.
    ///
    /// Does not change stored errors or touched state.
    pub fn report(&self) -> ValidationReport {
        let inner = self.read();
        inner.schema.validate(&inner.data)
    }

    /// Check if the current values pass validation.
    pub fn is_valid(&self) -> bool {
        self.report().is_valid()
    }

    /// Get the number of validation passes run so far.
    pub fn validation_passes(&self) -> u64 {
        self.read().passes
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn read(&self) -> RwLockReadGuard<'_, ControllerInner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, ControllerInner> {
        write(&self.inner)
    }

    /// Schedule a debounced validation for `scope`, or run it now when no
    /// timer can be used.
    fn schedule(&self, inner: &mut ControllerInner, scope: Scope) {
        let delay = inner.config.debounce;
        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) if !delay.is_zero() => handle,
            _ => {
                inner.cancel(&scope);
                inner.validate_touched();
                return;
            }
        };

        let (generation, cancel) = inner.schedule(scope.clone());
        log::debug!("Scheduled validation {} for {:?} in {:?}", generation, scope, delay);

        let weak = Arc::downgrade(&self.inner);
        handle.spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    if let Some(inner) = weak.upgrade() {
                        write(&inner).fire(&scope, generation);
                    }
                }
            }
        });
    }
}

fn write(inner: &RwLock<ControllerInner>) -> RwLockWriteGuard<'_, ControllerInner> {
    inner.write().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::FieldSchema;

    fn schema() -> FormSchema {
        FormSchema::new()
            .field("title", FieldSchema::new().required().min_length(3))
            .field("amount", FieldSchema::new().required().min(0.0))
    }

    #[test]
    fn test_starts_pristine() {
        let form = FormController::new(schema());
        assert!(!form.is_dirty());
        assert!(form.touched().is_empty());
        assert_eq!(form.status(), FormStatus::Idle);
        assert_eq!(form.validation_passes(), 0);
    }

    #[test]
    fn test_set_value_marks_dirty() {
        let form = FormController::new(schema());
        form.set_value("title", "Acme");
        assert!(form.is_dirty());
        assert_eq!(form.value("title"), Value::from("Acme"));
    }

    #[test]
    fn test_same_value_is_not_a_change() {
        let form = FormController::new(schema()).with_values(FormData::new().set("title", "Acme"));
        form.set_value("title", "Acme");
        assert!(!form.is_dirty());
    }

    #[test]
    fn test_untouched_edit_does_not_validate() {
        let form = FormController::new(schema());
        form.set_value("title", "x");
        assert_eq!(form.validation_passes(), 0);
        assert_eq!(form.error("title"), None);
    }

    #[test]
    fn test_untouched_edit_revalidates_touched_fields() {
        let form = FormController::new(schema());
        form.blur("title");
        assert_eq!(form.validation_passes(), 1);

        form.set_value("amount", -3i64);
        assert_eq!(form.validation_passes(), 2);
        assert_eq!(form.error("amount"), None);
        assert_eq!(form.visible_error("amount"), None);
    }

    #[test]
    fn test_blur_validates_immediately() {
        let form = FormController::new(schema());
        form.set_value("title", "ab");
        form.blur("title");
        assert!(form.is_touched("title"));
        assert_eq!(form.validation_passes(), 1);
        assert_eq!(
            form.visible_error("title").as_deref(),
            Some("Must be at least 3 characters")
        );
    }

    #[test]
    fn test_touched_edit_without_runtime_validates_now() {
        let form = FormController::new(schema());
        form.blur("title");
        form.set_value("title", "Acme");
        assert_eq!(form.validation_passes(), 2);
        assert_eq!(form.error("title"), None);
        assert_eq!(form.status(), FormStatus::Idle);
    }

    #[test]
    fn test_submit_marks_all_touched() {
        let form = FormController::new(schema());
        let err = form.submit().unwrap_err();
        assert_eq!(err.report().errors().len(), 2);
        assert_eq!(form.touched(), vec!["amount".to_string(), "title".to_string()]);
        assert_eq!(
            form.visible_error("amount").as_deref(),
            Some("This field is required")
        );
    }

    #[test]
    fn test_submit_returns_values_when_valid() {
        let form = FormController::new(schema());
        form.set_value("title", "Acme renewal");
        form.set_value("amount", 5000i64);
        form.set_value("notes", "");
        let data = form.submit().unwrap();
        assert_eq!(data.value("amount"), &Value::Int(5000));
        assert!(form.visible_errors().is_empty());
    }

    #[test]
    fn test_reset_returns_to_initial_values() {
        let initial = FormData::new().set("title", "Original");
        let form = FormController::new(schema()).with_values(initial.clone());
        form.set_value("title", "");
        form.blur("title");
        form.reset();
        assert_eq!(form.data(), initial);
        assert!(!form.is_dirty());
        assert!(form.touched().is_empty());
        assert_eq!(form.error("title"), None);
    }

    #[test]
    fn test_reopen_for_other_record() {
        let form = FormController::new(schema());
        let _ = form.submit();
        form.reopen(FormData::new().set("title", "Other deal"));
        assert!(form.touched().is_empty());
        assert!(form.visible_errors().is_empty());
        assert_eq!(form.value("title"), Value::from("Other deal"));
    }

    #[test]
    fn test_report_does_not_touch_state() {
        let form = FormController::new(schema());
        let report = form.report();
        assert!(report.is_invalid());
        assert!(!form.is_valid());
        assert_eq!(form.validation_passes(), 0);
        assert_eq!(form.error("title"), None);
    }
}
