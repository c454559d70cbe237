use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::spec::{FieldId, StepId};

/// Error attached to one field path.
///
/// `code` is a translation key; `params` fill its `:placeholder` tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub field: FieldId,
    pub path: String,
    pub code: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, String>,
}

impl ValidationError {
    pub fn new(field: FieldId, code: impl Into<String>) -> Self {
        Self {
            field,
            path: field.path(),
            code: code.into(),
            params: BTreeMap::new(),
        }
    }

    pub fn with_params(mut self, params: BTreeMap<String, String>) -> Self {
        self.params = params;
        self
    }

    pub fn step(&self) -> StepId {
        self.field.step()
    }
}

/// Outcome of one validation attempt. Empty errors means valid.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
}

impl ValidationResult {
    pub fn from_errors(errors: Vec<ValidationError>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }

    pub fn ok() -> Self {
        Self::from_errors(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn error_for(&self, field: FieldId) -> Option<&ValidationError> {
        self.errors.iter().find(|error| error.field == field)
    }

    pub fn fields(&self) -> Vec<FieldId> {
        self.errors.iter().map(|error| error.field).collect()
    }

    /// Earliest wizard step owning one of the failing fields.
    pub fn earliest_step(&self) -> Option<StepId> {
        self.errors.iter().map(ValidationError::step).min()
    }

    /// Replaces whatever error `field` had with `error` (or clears it).
    pub fn set_field(&mut self, field: FieldId, error: Option<ValidationError>) {
        self.errors.retain(|existing| existing.field != field);
        if let Some(error) = error {
            self.errors.push(error);
        }
        self.valid = self.errors.is_empty();
    }

    pub fn extend(&mut self, other: ValidationResult) {
        self.errors.extend(other.errors);
        self.valid = self.errors.is_empty();
    }
}
