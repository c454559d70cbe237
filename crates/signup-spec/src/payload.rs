use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::draft::RegistrationDraft;
use crate::result::{ValidationError, ValidationResult};
use crate::rule::{normalize_phone, strip_whitespace};
use crate::spec::{FieldId, RegistrationForm};
use crate::validate::validate_union;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl FromStr for Gender {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            "other" => Ok(Gender::Other),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Bank,
}

impl FromStr for PaymentMethod {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "cash" => Ok(PaymentMethod::Cash),
            "bank" => Ok(PaymentMethod::Bank),
            _ => Err(()),
        }
    }
}

/// Flat request body sent to the registration endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RegistrationPayload {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub gender: Gender,
    pub national_id: String,
    pub country: String,
    pub city: String,
    pub payment_method: PaymentMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rib_number: Option<String>,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
}

#[derive(Debug, Error)]
pub enum MergeError {
    /// The draft reached the merge stage without satisfying the combined
    /// field schema. Only possible if a step transition was allowed wrongly.
    #[error("merged draft failed the combined schema on {fields:?}")]
    Inconsistent {
        fields: Vec<FieldId>,
        result: ValidationResult,
    },
}

impl MergeError {
    fn inconsistent(result: ValidationResult) -> Self {
        let error = MergeError::Inconsistent {
            fields: result.fields(),
            result,
        };
        tracing::error!(%error, "registration draft merge failed");
        error
    }
}

/// Combines the three step partitions into one payload.
///
/// Runs the union of all field rules first and refuses to build a payload
/// that does not satisfy it. Bank details are dropped for cash payouts.
pub fn merge(
    form: &RegistrationForm,
    draft: &RegistrationDraft,
) -> Result<RegistrationPayload, MergeError> {
    let union = validate_union(form, draft);
    if !union.is_empty() {
        return Err(MergeError::inconsistent(union));
    }

    let gender = parse_choice::<Gender>(draft, FieldId::Gender)?;
    let payment_method = parse_choice::<PaymentMethod>(draft, FieldId::PaymentMethod)?;
    let (bank_name, rib_number) = match payment_method {
        PaymentMethod::Cash => (None, None),
        PaymentMethod::Bank => (
            non_empty(draft.get(FieldId::BankName).trim()),
            non_empty(&strip_whitespace(draft.get(FieldId::RibNumber))),
        ),
    };

    Ok(RegistrationPayload {
        first_name: draft.get(FieldId::FirstName).trim().to_string(),
        last_name: draft.get(FieldId::LastName).trim().to_string(),
        phone: normalize_phone(draft.get(FieldId::Phone)),
        gender,
        national_id: draft.get(FieldId::NationalId).trim().to_string(),
        country: draft.get(FieldId::Country).trim().to_string(),
        city: draft.get(FieldId::City).trim().to_string(),
        payment_method,
        bank_name,
        rib_number,
        email: draft.get(FieldId::Email).trim().to_string(),
        password: draft.get(FieldId::Password).to_string(),
        password_confirmation: draft.get(FieldId::PasswordConfirmation).to_string(),
    })
}

/// JSON Schema describing [`RegistrationPayload`].
pub fn payload_schema() -> Value {
    serde_json::to_value(schemars::schema_for!(RegistrationPayload)).unwrap_or(Value::Null)
}

fn parse_choice<T: FromStr>(draft: &RegistrationDraft, field: FieldId) -> Result<T, MergeError> {
    draft.get(field).parse::<T>().map_err(|_| {
        MergeError::inconsistent(ValidationResult::from_errors(vec![ValidationError::new(
            field,
            "validation.invalid_choice",
        )]))
    })
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}
