use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::spec::{FieldId, StepId};

#[derive(Debug, Error)]
pub enum DraftError {
    #[error("draft must be a JSON object")]
    NotAnObject,
    #[error("field '{0}' must be a string, number or boolean")]
    UnsupportedValue(String),
    #[error("draft snapshot encode failed: {0}")]
    Encode(#[source] serde_cbor::Error),
    #[error("draft snapshot decode failed: {0}")]
    Decode(#[source] serde_cbor::Error),
}

/// Raw values typed so far, one slot per field.
///
/// Values are stored exactly as entered; validation never rewrites them.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegistrationDraft {
    values: BTreeMap<FieldId, String>,
}

impl RegistrationDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of `field`, or `""` when nothing was entered.
    pub fn get(&self, field: FieldId) -> &str {
        self.values.get(&field).map(String::as_str).unwrap_or("")
    }

    pub fn set(&mut self, field: FieldId, value: impl Into<String>) {
        self.values.insert(field, value.into());
    }

    pub fn with(mut self, field: FieldId, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    pub fn clear(&mut self, field: FieldId) {
        self.values.remove(&field);
    }

    pub fn is_empty(&self) -> bool {
        self.values.values().all(|value| value.is_empty())
    }

    /// Values belonging to one step.
    pub fn step_values(&self, step: StepId) -> BTreeMap<FieldId, &str> {
        step.fields().map(|field| (field, self.get(field))).collect()
    }

    /// Copies every value from `other`, overwriting existing slots.
    pub fn apply(&mut self, other: &RegistrationDraft) {
        for (field, value) in &other.values {
            self.values.insert(*field, value.clone());
        }
    }

    /// Builds a draft from a loosely-typed JSON object.
    ///
    /// Returns the draft plus any keys that are not registration fields.
    /// `null` leaves a field empty; numbers and booleans are kept as text.
    pub fn from_json(value: &Value) -> Result<(Self, Vec<String>), DraftError> {
        let object = value.as_object().ok_or(DraftError::NotAnObject)?;
        let mut draft = Self::new();
        let mut unknown = Vec::new();
        for (key, raw) in object {
            let Ok(field) = key.parse::<FieldId>() else {
                unknown.push(key.clone());
                continue;
            };
            let text = match raw {
                Value::Null => continue,
                Value::String(text) => text.clone(),
                Value::Number(number) => number.to_string(),
                Value::Bool(flag) => flag.to_string(),
                _ => return Err(DraftError::UnsupportedValue(key.clone())),
            };
            draft.set(field, text);
        }
        Ok((draft, unknown))
    }

    /// JSON view with secret fields masked.
    pub fn to_masked_json(&self) -> Value {
        let mut map = Map::new();
        for (field, value) in &self.values {
            let shown = if field.is_secret() && !value.is_empty() {
                "********".to_string()
            } else {
                value.clone()
            };
            map.insert(field.as_str().into(), Value::String(shown));
        }
        Value::Object(map)
    }

    pub fn to_cbor(&self) -> Result<Vec<u8>, DraftError> {
        serde_cbor::to_vec(self).map_err(DraftError::Encode)
    }

    pub fn from_cbor(bytes: &[u8]) -> Result<Self, DraftError> {
        serde_cbor::from_slice(bytes).map_err(DraftError::Decode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_json_collects_unknown_keys() {
        let (draft, unknown) = RegistrationDraft::from_json(&json!({
            "first_name": "Yasmine",
            "phone": 212612345678u64,
            "nickname": "yas",
            "city": null
        }))
        .expect("draft");
        assert_eq!(draft.get(FieldId::FirstName), "Yasmine");
        assert_eq!(draft.get(FieldId::Phone), "212612345678");
        assert_eq!(draft.get(FieldId::City), "");
        assert_eq!(unknown, vec!["nickname".to_string()]);
    }

    #[test]
    fn from_json_rejects_nested_values() {
        let err = RegistrationDraft::from_json(&json!({ "city": ["Fes"] })).unwrap_err();
        assert!(matches!(err, DraftError::UnsupportedValue(field) if field == "city"));
    }

    #[test]
    fn cbor_snapshot_restores_every_slot() {
        let draft = RegistrationDraft::new()
            .with(FieldId::FirstName, "Yasmine")
            .with(FieldId::RibNumber, "2301 2345 6789 0123 45");
        let bytes = draft.to_cbor().expect("encode");
        assert_eq!(RegistrationDraft::from_cbor(&bytes).expect("decode"), draft);
    }

    #[test]
    fn masked_json_hides_passwords() {
        let draft = RegistrationDraft::new()
            .with(FieldId::Email, "a@b.ma")
            .with(FieldId::Password, "Secret123");
        let masked = draft.to_masked_json();
        assert_eq!(masked["email"], "a@b.ma");
        assert_eq!(masked["password"], "********");
    }

    #[test]
    fn step_values_cover_only_that_step() {
        let draft = RegistrationDraft::new().with(FieldId::City, "Fes");
        let values = draft.step_values(StepId::LocationPayment);
        assert_eq!(values.len(), 5);
        assert_eq!(values[&FieldId::City], "Fes");
        assert!(!values.contains_key(&FieldId::Email));
    }
}
