use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::spec::step::StepId;

/// Wire name of every registration field.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum FieldId {
    FirstName,
    LastName,
    Phone,
    Gender,
    NationalId,
    Country,
    City,
    PaymentMethod,
    BankName,
    RibNumber,
    Email,
    Password,
    PasswordConfirmation,
}

impl FieldId {
    pub const ALL: [FieldId; 13] = [
        FieldId::FirstName,
        FieldId::LastName,
        FieldId::Phone,
        FieldId::Gender,
        FieldId::NationalId,
        FieldId::Country,
        FieldId::City,
        FieldId::PaymentMethod,
        FieldId::BankName,
        FieldId::RibNumber,
        FieldId::Email,
        FieldId::Password,
        FieldId::PasswordConfirmation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldId::FirstName => "first_name",
            FieldId::LastName => "last_name",
            FieldId::Phone => "phone",
            FieldId::Gender => "gender",
            FieldId::NationalId => "national_id",
            FieldId::Country => "country",
            FieldId::City => "city",
            FieldId::PaymentMethod => "payment_method",
            FieldId::BankName => "bank_name",
            FieldId::RibNumber => "rib_number",
            FieldId::Email => "email",
            FieldId::Password => "password",
            FieldId::PasswordConfirmation => "password_confirmation",
        }
    }

    /// Step whose form collects this field.
    pub fn step(&self) -> StepId {
        match self {
            FieldId::FirstName
            | FieldId::LastName
            | FieldId::Phone
            | FieldId::Gender
            | FieldId::NationalId => StepId::PersonalInfo,
            FieldId::Country
            | FieldId::City
            | FieldId::PaymentMethod
            | FieldId::BankName
            | FieldId::RibNumber => StepId::LocationPayment,
            FieldId::Email | FieldId::Password | FieldId::PasswordConfirmation => {
                StepId::AccountSetup
            }
        }
    }

    /// JSON pointer used in validation output.
    pub fn path(&self) -> String {
        format!("/{}", self.as_str())
    }

    /// Secret fields are never echoed back by renderers.
    pub fn is_secret(&self) -> bool {
        matches!(self, FieldId::Password | FieldId::PasswordConfirmation)
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldId {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        FieldId::ALL
            .into_iter()
            .find(|field| field.as_str() == value)
            .ok_or_else(|| format!("unknown field '{}'", value))
    }
}

/// A single declarative check applied to a raw field value.
///
/// Rules run in declaration order and the first failure becomes the field's
/// error. Lengths count Unicode scalar values so Arabic names are measured the
/// same way as Latin ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum Rule {
    MinLen { min: usize },
    MaxLen { max: usize },
    Pattern { pattern: String, code: String },
    Email,
    OneOf { choices: Vec<String> },
    /// International number: `+` followed by `min_digits..=max_digits` digits
    /// once every character other than digits and `+` is stripped.
    Phone { min_digits: usize, max_digits: usize },
    /// At least one lowercase letter, one uppercase letter and one digit.
    PasswordStrength,
}

/// Field declaration inside a step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FieldSpec {
    pub id: FieldId,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<Rule>,
}

impl FieldSpec {
    pub fn required(id: FieldId) -> Self {
        Self {
            id,
            required: true,
            choices: None,
            rules: Vec::new(),
        }
    }

    pub fn optional(id: FieldId) -> Self {
        Self {
            id,
            required: false,
            choices: None,
            rules: Vec::new(),
        }
    }

    pub fn rule(mut self, rule: Rule) -> Self {
        if let Rule::OneOf { choices } = &rule {
            self.choices = Some(choices.clone());
        }
        self.rules.push(rule);
        self
    }
}
