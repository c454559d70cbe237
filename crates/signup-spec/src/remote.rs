use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::spec::{FieldId, StepId};

/// Server-side messages for one registration field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFieldError {
    pub field: FieldId,
    pub step: StepId,
    pub messages: Vec<String>,
}

/// Structured rejection returned by the registration endpoint.
///
/// The body follows the usual `{"message": "...", "errors": {"email":
/// ["..."]}}` shape. Keys that are not registration fields are kept in
/// `unmapped` so nothing the server said is lost.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RemoteErrors {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub fields: Vec<RemoteFieldError>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub unmapped: BTreeMap<String, Vec<String>>,
}

impl RemoteErrors {
    /// Parses a rejection body. Returns `None` when it carries no `errors`
    /// object at all.
    pub fn from_body(body: &Value) -> Option<Self> {
        let errors = body.get("errors")?.as_object()?;
        let message = body
            .get("message")
            .and_then(Value::as_str)
            .map(String::from);

        let mut fields = Vec::new();
        let mut unmapped = BTreeMap::new();
        for (key, raw) in errors {
            let messages = messages_of(raw);
            match key.parse::<FieldId>() {
                Ok(field) => fields.push(RemoteFieldError {
                    field,
                    step: field.step(),
                    messages,
                }),
                Err(_) => {
                    unmapped.insert(key.clone(), messages);
                }
            }
        }
        fields.sort_by_key(|error| (error.step, error.field));

        Some(Self {
            message,
            fields,
            unmapped,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.unmapped.is_empty()
    }

    pub fn for_field(&self, field: FieldId) -> Option<&RemoteFieldError> {
        self.fields.iter().find(|error| error.field == field)
    }

    /// First step the user has to revisit.
    pub fn earliest_step(&self) -> Option<StepId> {
        self.fields.iter().map(|error| error.step).min()
    }
}

fn messages_of(raw: &Value) -> Vec<String> {
    match raw {
        Value::String(text) => vec![text.clone()],
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(String::from)
            .collect(),
        Value::Null => Vec::new(),
        other => vec![other.to_string()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn maps_fields_to_steps_and_keeps_unknown_keys() {
        let body = json!({
            "message": "The given data was invalid.",
            "errors": {
                "email": ["The email has already been taken."],
                "phone": "The phone has already been taken.",
                "captcha": ["Captcha expired."]
            }
        });
        let errors = RemoteErrors::from_body(&body).expect("errors");
        assert_eq!(errors.message.as_deref(), Some("The given data was invalid."));
        assert_eq!(errors.fields.len(), 2);
        assert_eq!(errors.fields[0].field, FieldId::Phone);
        assert_eq!(errors.fields[0].step, StepId::PersonalInfo);
        assert_eq!(
            errors.for_field(FieldId::Email).map(|e| e.step),
            Some(StepId::AccountSetup)
        );
        assert_eq!(errors.unmapped["captcha"], vec!["Captcha expired."]);
        assert_eq!(errors.earliest_step(), Some(StepId::PersonalInfo));
    }

    #[test]
    fn body_without_errors_is_not_a_field_rejection() {
        assert!(RemoteErrors::from_body(&json!({ "message": "Server Error" })).is_none());
    }
}
