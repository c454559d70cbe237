use crate::draft::RegistrationDraft;
use crate::result::{ValidationError, ValidationResult};
use crate::rule::strip_whitespace;
use crate::spec::{FieldId, FieldSpec, Refinement, RegistrationForm, StepSpec};

/// Validates every step of the form, refinements included, in step order.
pub fn validate(form: &RegistrationForm, draft: &RegistrationDraft) -> ValidationResult {
    let mut result = ValidationResult::ok();
    for step in &form.steps {
        result.extend(validate_step(step, draft));
    }
    result
}

/// Validates one step. Refinements only run once every field rule passes, and
/// all failing refinements are reported together.
pub fn validate_step(step: &StepSpec, draft: &RegistrationDraft) -> ValidationResult {
    let errors = field_errors(step.fields.iter(), draft);
    if !errors.is_empty() {
        return ValidationResult::from_errors(errors);
    }

    let errors = step
        .refinements
        .iter()
        .flat_map(|refinement| refine(refinement, draft))
        .collect();
    ValidationResult::from_errors(errors)
}

/// Field rules of every step, without refinements: the merged payload schema.
pub fn validate_union(form: &RegistrationForm, draft: &RegistrationDraft) -> ValidationResult {
    ValidationResult::from_errors(field_errors(form.fields(), draft))
}

/// First failing rule of a single field, if any.
///
/// Rules see the value as it is sent: trimmed, except for secrets which are
/// sent verbatim.
pub fn validate_field(spec: &FieldSpec, value: &str) -> Option<ValidationError> {
    if value.trim().is_empty() {
        return spec
            .required
            .then(|| ValidationError::new(spec.id, "validation.required"));
    }

    let value = if spec.id.is_secret() { value } else { value.trim() };
    spec.rules.iter().find_map(|rule| {
        rule.check(value)
            .err()
            .map(|failure| ValidationError::new(spec.id, failure.code).with_params(failure.params))
    })
}

fn field_errors<'a>(
    fields: impl Iterator<Item = &'a FieldSpec>,
    draft: &RegistrationDraft,
) -> Vec<ValidationError> {
    fields
        .filter_map(|spec| validate_field(spec, draft.get(spec.id)))
        .collect()
}

fn refine(refinement: &Refinement, draft: &RegistrationDraft) -> Vec<ValidationError> {
    match refinement {
        Refinement::BankDetails {
            bank_name_min,
            rib_min_digits,
            rib_max_digits,
        } => {
            if draft.get(FieldId::PaymentMethod) != "bank" {
                return Vec::new();
            }
            let mut errors = Vec::new();

            let bank_name = draft.get(FieldId::BankName).trim();
            if bank_name.is_empty() {
                errors.push(ValidationError::new(
                    FieldId::BankName,
                    "validation.bank_name_required",
                ));
            } else if bank_name.chars().count() < *bank_name_min {
                errors.push(
                    ValidationError::new(FieldId::BankName, "validation.min_length")
                        .with_params([("min".to_string(), bank_name_min.to_string())].into()),
                );
            }

            let rib = strip_whitespace(draft.get(FieldId::RibNumber));
            if rib.is_empty() {
                errors.push(ValidationError::new(
                    FieldId::RibNumber,
                    "validation.rib_required",
                ));
            } else if !rib.chars().all(|c| c.is_ascii_digit())
                || !(*rib_min_digits..=*rib_max_digits).contains(&rib.len())
            {
                errors.push(
                    ValidationError::new(FieldId::RibNumber, "validation.rib_format").with_params(
                        [
                            ("min".to_string(), rib_min_digits.to_string()),
                            ("max".to_string(), rib_max_digits.to_string()),
                        ]
                        .into(),
                    ),
                );
            }
            errors
        }
        Refinement::PasswordsMatch => {
            if draft.get(FieldId::Password) == draft.get(FieldId::PasswordConfirmation) {
                Vec::new()
            } else {
                vec![ValidationError::new(
                    FieldId::PasswordConfirmation,
                    "validation.password_mismatch",
                )]
            }
        }
    }
}
