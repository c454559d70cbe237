use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::spec::field::{FieldId, FieldSpec, Rule};
use crate::spec::step::{Refinement, StepId, StepSpec};

/// Latin letters, the Arabic block and whitespace.
pub const NAME_PATTERN: &str = r"^[A-Za-z\x{0600}-\x{06FF}\s]+$";
pub const NATIONAL_ID_PATTERN: &str = r"^[A-Z0-9]+$";

pub const GENDERS: [&str; 3] = ["male", "female", "other"];
pub const PAYMENT_METHODS: [&str; 2] = ["cash", "bank"];

/// Complete description of the registration wizard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RegistrationForm {
    pub id: String,
    pub version: String,
    pub steps: Vec<StepSpec>,
}

impl RegistrationForm {
    pub fn step(&self, id: StepId) -> Option<&StepSpec> {
        self.steps.iter().find(|step| step.id == id)
    }

    pub fn field(&self, id: FieldId) -> Option<&FieldSpec> {
        self.step(id.step()).and_then(|step| step.field(id))
    }

    /// Field declarations of every step, in step order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.steps.iter().flat_map(|step| step.fields.iter())
    }
}

impl Default for RegistrationForm {
    fn default() -> Self {
        registration_form()
    }
}

/// The marketer registration form.
pub fn registration_form() -> RegistrationForm {
    RegistrationForm {
        id: "marketer-registration".into(),
        version: "1.0.0".into(),
        steps: vec![personal_info(), location_payment(), account_setup()],
    }
}

fn name_field(id: FieldId) -> FieldSpec {
    FieldSpec::required(id)
        .rule(Rule::MinLen { min: 2 })
        .rule(Rule::MaxLen { max: 50 })
        .rule(Rule::Pattern {
            pattern: NAME_PATTERN.into(),
            code: "validation.name_format".into(),
        })
}

fn choices(values: &[&str]) -> Rule {
    Rule::OneOf {
        choices: values.iter().map(|value| value.to_string()).collect(),
    }
}

fn personal_info() -> StepSpec {
    StepSpec {
        id: StepId::PersonalInfo,
        fields: vec![
            name_field(FieldId::FirstName),
            name_field(FieldId::LastName),
            FieldSpec::required(FieldId::Phone).rule(Rule::Phone {
                min_digits: 7,
                max_digits: 15,
            }),
            FieldSpec::required(FieldId::Gender).rule(choices(&GENDERS)),
            FieldSpec::required(FieldId::NationalId)
                .rule(Rule::MinLen { min: 8 })
                .rule(Rule::MaxLen { max: 20 })
                .rule(Rule::Pattern {
                    pattern: NATIONAL_ID_PATTERN.into(),
                    code: "validation.national_id_format".into(),
                }),
        ],
        refinements: Vec::new(),
    }
}

fn location_payment() -> StepSpec {
    StepSpec {
        id: StepId::LocationPayment,
        fields: vec![
            FieldSpec::required(FieldId::Country)
                .rule(Rule::MinLen { min: 2 })
                .rule(Rule::MaxLen { max: 100 }),
            FieldSpec::required(FieldId::City),
            FieldSpec::required(FieldId::PaymentMethod).rule(choices(&PAYMENT_METHODS)),
            FieldSpec::optional(FieldId::BankName),
            FieldSpec::optional(FieldId::RibNumber),
        ],
        refinements: vec![Refinement::BankDetails {
            bank_name_min: 2,
            rib_min_digits: 16,
            rib_max_digits: 24,
        }],
    }
}

fn account_setup() -> StepSpec {
    StepSpec {
        id: StepId::AccountSetup,
        fields: vec![
            FieldSpec::required(FieldId::Email)
                .rule(Rule::Email)
                .rule(Rule::MaxLen { max: 255 }),
            FieldSpec::required(FieldId::Password)
                .rule(Rule::MinLen { min: 8 })
                .rule(Rule::MaxLen { max: 255 })
                .rule(Rule::PasswordStrength),
            FieldSpec::required(FieldId::PasswordConfirmation),
        ],
        refinements: vec![Refinement::PasswordsMatch],
    }
}
