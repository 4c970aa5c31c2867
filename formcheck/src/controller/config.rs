//! Form controller configuration

use std::time::Duration;

/// Which unit owns a pending debounced validation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DebounceScope {
    /// Each field has its own timer; editing one field does not delay
    /// validation of another (default).
    #[default]
    PerField,
    /// The whole form shares one timer; when it fires every touched field
    /// is validated.
    Form,
}

/// Configuration for a [`FormController`](super::FormController).
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use formcheck::controller::{ControllerConfig, DebounceScope};
///
/// let config = ControllerConfig::default()
///     .with_debounce(Duration::from_millis(500))
///     .with_scope(DebounceScope::Form);
///
/// // Validate on every change, no timers
/// let eager = ControllerConfig::immediate();
/// ```
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Quiet period after the last edit before a touched field is revalidated.
    ///
    /// Default: 300 milliseconds
    pub debounce: Duration,

    /// Unit owning a pending timer.
    ///
    /// Default: [`DebounceScope::PerField`]
    pub scope: DebounceScope,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(300),
            scope: DebounceScope::PerField,
        }
    }
}

impl ControllerConfig {
    /// Creates a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a config that revalidates touched fields on every change.
    pub fn immediate() -> Self {
        Self {
            debounce: Duration::ZERO,
            ..Default::default()
        }
    }

    /// Sets the debounce window.
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Sets the debounce scope.
    pub fn with_scope(mut self, scope: DebounceScope) -> Self {
        self.scope = scope;
        self
    }
}
