use std::collections::BTreeMap;

use regex::Regex;

use crate::spec::Rule;

pub const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

/// Why a rule rejected a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleFailure {
    pub code: String,
    pub params: BTreeMap<String, String>,
}

impl RuleFailure {
    fn new(code: &str) -> Self {
        Self {
            code: code.into(),
            params: BTreeMap::new(),
        }
    }

    fn param(mut self, name: &str, value: impl ToString) -> Self {
        self.params.insert(name.into(), value.to_string());
        self
    }
}

impl Rule {
    /// Checks a non-empty raw value.
    pub fn check(&self, value: &str) -> Result<(), RuleFailure> {
        match self {
            Rule::MinLen { min } => {
                if value.chars().count() < *min {
                    return Err(RuleFailure::new("validation.min_length").param("min", min));
                }
            }
            Rule::MaxLen { max } => {
                if value.chars().count() > *max {
                    return Err(RuleFailure::new("validation.max_length").param("max", max));
                }
            }
            Rule::Pattern { pattern, code } => match matches_pattern(pattern, value) {
                Some(true) => {}
                Some(false) => return Err(RuleFailure::new(code)),
                None => return Err(RuleFailure::new("validation.pattern_invalid")),
            },
            Rule::Email => {
                if matches_pattern(EMAIL_PATTERN, value) != Some(true) {
                    return Err(RuleFailure::new("validation.email"));
                }
            }
            Rule::OneOf { choices } => {
                if !choices.iter().any(|choice| choice == value) {
                    return Err(
                        RuleFailure::new("validation.invalid_choice")
                            .param("values", choices.join(", ")),
                    );
                }
            }
            Rule::Phone {
                min_digits,
                max_digits,
            } => {
                let normalized = normalize_phone(value);
                let Some(digits) = normalized.strip_prefix('+') else {
                    return Err(RuleFailure::new("validation.phone_format"));
                };
                if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
                    return Err(RuleFailure::new("validation.phone_format"));
                }
                if !(*min_digits..=*max_digits).contains(&digits.len()) {
                    return Err(RuleFailure::new("validation.phone_length")
                        .param("min", min_digits)
                        .param("max", max_digits));
                }
            }
            Rule::PasswordStrength => {
                let lower = value.chars().any(|c| c.is_ascii_lowercase());
                let upper = value.chars().any(|c| c.is_ascii_uppercase());
                let digit = value.chars().any(|c| c.is_ascii_digit());
                if !(lower && upper && digit) {
                    return Err(RuleFailure::new("validation.password_strength"));
                }
            }
        }
        Ok(())
    }
}

/// Keeps only digits and `+` signs, in their original order.
pub fn normalize_phone(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect()
}

pub fn strip_whitespace(raw: &str) -> String {
    raw.chars().filter(|c| !c.is_whitespace()).collect()
}

/// `None` when the pattern itself does not compile.
pub(crate) fn matches_pattern(pattern: &str, text: &str) -> Option<bool> {
    match Regex::new(pattern) {
        Ok(regex) => Some(regex.is_match(text)),
        Err(err) => {
            tracing::error!(pattern, error = %err, "invalid validation pattern");
            None
        }
    }
}
