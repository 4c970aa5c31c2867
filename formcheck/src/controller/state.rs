//! Internal controller state.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::config::{ControllerConfig, DebounceScope};
use crate::model::FormData;
use crate::validation::FormSchema;

/// Unit owning at most one pending timer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(super) enum Scope {
    Field(String),
    Form,
}

/// A scheduled debounced validation.
#[derive(Debug)]
pub(super) struct Pending {
    pub(super) generation: u64,
    pub(super) cancel: CancellationToken,
}

#[derive(Debug)]
pub(super) struct ControllerInner {
    pub(super) schema: Arc<FormSchema>,
    pub(super) config: ControllerConfig,
    /// Values the form was opened with; `reset` returns here.
    pub(super) initial: FormData,
    pub(super) data: FormData,
    pub(super) touched: HashSet<String>,
    pub(super) dirty: bool,
    /// Last computed error per field.
    pub(super) errors: HashMap<String, String>,
    pub(super) pending: HashMap<Scope, Pending>,
    /// Monotonic counter; each scheduled timer gets a fresh value.
    pub(super) generation: u64,
    pub(super) passes: u64,
}

impl ControllerInner {
    pub(super) fn new(schema: Arc<FormSchema>, config: ControllerConfig, data: FormData) -> Self {
        Self {
            schema,
            config,
            initial: data.clone(),
            data,
            touched: HashSet::new(),
            dirty: false,
            errors: HashMap::new(),
            pending: HashMap::new(),
            generation: 0,
            passes: 0,
        }
    }

    pub(super) fn scope_for(&self, field: &str) -> Scope {
        match self.config.scope {
            DebounceScope::PerField => Scope::Field(field.to_string()),
            DebounceScope::Form => Scope::Form,
        }
    }

    /// Replaces any pending timer for `scope`, returning the new generation
    /// and its cancellation token.
    pub(super) fn schedule(&mut self, scope: Scope) -> (u64, CancellationToken) {
        self.cancel(&scope);
        self.generation += 1;
        let cancel = CancellationToken::new();
        self.pending.insert(
            scope,
            Pending {
                generation: self.generation,
                cancel: cancel.clone(),
            },
        );
        (self.generation, cancel)
    }

    pub(super) fn cancel(&mut self, scope: &Scope) {
        if let Some(pending) = self.pending.remove(scope) {
            pending.cancel.cancel();
        }
    }

    pub(super) fn cancel_all(&mut self) {
        for (_, pending) in self.pending.drain() {
            pending.cancel.cancel();
        }
    }

    /// Runs a timer's validation if it is still the latest for its scope.
    pub(super) fn fire(&mut self, scope: &Scope, generation: u64) {
        let current = self
            .pending
            .get(scope)
            .is_some_and(|pending| pending.generation == generation);
        if !current {
            log::trace!("Discarding stale validation for {:?}", scope);
            return;
        }
        self.pending.remove(scope);
        self.validate_touched();
    }

    /// Revalidates every touched field against current data.
    ///
    /// Custom rules may read other fields, so a pass fired for one field's
    /// edit still covers the rest of the touched set. The scope only decides
    /// which timer owned the pass.
    pub(super) fn validate_touched(&mut self) {
        let mut touched: Vec<String> = self.touched.iter().cloned().collect();
        touched.sort();
        self.validate_fields(&touched);
    }

    /// One validation pass over `fields`.
    pub(super) fn validate_fields(&mut self, fields: &[String]) {
        for field in fields {
            let result = self
                .schema
                .validate_field(field, self.data.value(field), &self.data);
            match result.into_error() {
                Some(message) => {
                    self.errors.insert(field.clone(), message);
                }
                None => {
                    self.errors.remove(field);
                }
            }
        }
        self.passes += 1;
        log::debug!("Validation pass {} over {:?}", self.passes, fields);
    }

    /// Returns to a pristine state holding `data`.
    pub(super) fn reset_to(&mut self, data: FormData) {
        self.cancel_all();
        self.initial = data.clone();
        self.data = data;
        self.touched.clear();
        self.errors.clear();
        self.dirty = false;
    }
}

impl Drop for ControllerInner {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
