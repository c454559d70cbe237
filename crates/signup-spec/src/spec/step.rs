use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::spec::field::{FieldId, FieldSpec};

/// The three stages of the registration wizard, in order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum StepId {
    PersonalInfo,
    LocationPayment,
    AccountSetup,
}

impl StepId {
    pub const ALL: [StepId; 3] = [
        StepId::PersonalInfo,
        StepId::LocationPayment,
        StepId::AccountSetup,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StepId::PersonalInfo => "personal_info",
            StepId::LocationPayment => "location_payment",
            StepId::AccountSetup => "account_setup",
        }
    }

    /// One-based position shown to users ("step 2 of 3").
    pub fn number(&self) -> usize {
        match self {
            StepId::PersonalInfo => 1,
            StepId::LocationPayment => 2,
            StepId::AccountSetup => 3,
        }
    }

    pub fn next(&self) -> Option<StepId> {
        match self {
            StepId::PersonalInfo => Some(StepId::LocationPayment),
            StepId::LocationPayment => Some(StepId::AccountSetup),
            StepId::AccountSetup => None,
        }
    }

    pub fn previous(&self) -> Option<StepId> {
        match self {
            StepId::PersonalInfo => None,
            StepId::LocationPayment => Some(StepId::PersonalInfo),
            StepId::AccountSetup => Some(StepId::LocationPayment),
        }
    }

    pub fn fields(&self) -> impl Iterator<Item = FieldId> + '_ {
        FieldId::ALL
            .into_iter()
            .filter(move |field| field.step() == *self)
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StepId {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "personal_info" | "1" => Ok(StepId::PersonalInfo),
            "location_payment" | "2" => Ok(StepId::LocationPayment),
            "account_setup" | "3" => Ok(StepId::AccountSetup),
            other => Err(format!("unknown step '{}'", other)),
        }
    }
}

/// Cross-field check evaluated after every field rule of its step passes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "refinement", rename_all = "snake_case")]
pub enum Refinement {
    /// With `payment_method = bank`, the bank name needs `bank_name_min`
    /// characters and the RIB, once whitespace is removed, must be
    /// `rib_min_digits..=rib_max_digits` ASCII digits. Cash leaves both
    /// fields unconstrained.
    BankDetails {
        bank_name_min: usize,
        rib_min_digits: usize,
        rib_max_digits: usize,
    },
    /// `password_confirmation` must equal `password` byte for byte. The error
    /// is always reported on the confirmation field.
    PasswordsMatch,
}

/// Immutable descriptor of one wizard step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct StepSpec {
    pub id: StepId,
    pub fields: Vec<FieldSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub refinements: Vec<Refinement>,
}

impl StepSpec {
    pub fn field(&self, id: FieldId) -> Option<&FieldSpec> {
        self.fields.iter().find(|field| field.id == id)
    }
}
