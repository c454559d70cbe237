use std::collections::BTreeMap;

use thiserror::Error;

use crate::result::{ValidationError, ValidationResult};
use crate::spec::{FieldId, StepId};

const EN: &str = include_str!("../locales/en.json");
const FR: &str = include_str!("../locales/fr.json");
const AR: &str = include_str!("../locales/ar.json");

pub const DEFAULT_LOCALE: &str = "en";

#[derive(Debug, Error)]
pub enum TranslationError {
    #[error("no built-in messages for locale '{0}'")]
    UnknownLocale(String),
    #[error("message catalogue is not a flat JSON object of strings: {0}")]
    Catalogue(#[source] serde_json::Error),
}

/// Message lookup for one locale.
///
/// Unknown keys resolve to the key itself so a missing translation degrades
/// to an ugly label instead of an error.
#[derive(Debug, Clone, Default)]
pub struct Translator {
    locale: String,
    messages: BTreeMap<String, String>,
}

impl Translator {
    pub fn new(locale: impl Into<String>, messages: BTreeMap<String, String>) -> Self {
        Self {
            locale: locale.into(),
            messages,
        }
    }

    /// Built-in catalogue for `en`, `fr` or `ar`.
    pub fn builtin(locale: &str) -> Result<Self, TranslationError> {
        let source = match locale {
            "en" => EN,
            "fr" => FR,
            "ar" => AR,
            other => return Err(TranslationError::UnknownLocale(other.to_string())),
        };
        Self::from_json(locale, source)
    }

    /// Built-in catalogue, falling back to English for unknown locales.
    pub fn for_locale(locale: &str) -> Result<Self, TranslationError> {
        match Self::builtin(locale) {
            Err(TranslationError::UnknownLocale(_)) => {
                tracing::warn!(locale, "unknown locale, using {}", DEFAULT_LOCALE);
                Self::builtin(DEFAULT_LOCALE)
            }
            other => other,
        }
    }

    pub fn from_json(locale: &str, json: &str) -> Result<Self, TranslationError> {
        let messages = serde_json::from_str(json).map_err(TranslationError::Catalogue)?;
        Ok(Self::new(locale, messages))
    }

    /// Adds or replaces messages from a JSON catalogue.
    pub fn overlay_json(&mut self, json: &str) -> Result<(), TranslationError> {
        let extra: BTreeMap<String, String> =
            serde_json::from_str(json).map_err(TranslationError::Catalogue)?;
        self.messages.extend(extra);
        Ok(())
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn translate(&self, key: &str, params: &BTreeMap<String, String>) -> String {
        match self.messages.get(key) {
            Some(template) => substitute(template, params),
            None => key.to_string(),
        }
    }

    pub fn text(&self, key: &str) -> String {
        self.translate(key, &BTreeMap::new())
    }

    pub fn field_label(&self, field: FieldId) -> String {
        let key = format!("fields.{}", field.as_str());
        match self.messages.get(&key) {
            Some(label) => label.clone(),
            None => field.as_str().replace('_', " "),
        }
    }

    pub fn step_title(&self, step: StepId) -> String {
        self.text(&format!("steps.{}", step.as_str()))
    }

    /// Localised message for a validation error, with `:attribute` bound to
    /// the field label.
    pub fn error_message(&self, error: &ValidationError) -> String {
        let mut params = error.params.clone();
        params
            .entry("attribute".into())
            .or_insert_with(|| self.field_label(error.field));
        self.translate(&error.code, &params)
    }

    /// Field name to message, in error order.
    pub fn localize(&self, result: &ValidationResult) -> Vec<(FieldId, String)> {
        result
            .errors
            .iter()
            .map(|error| (error.field, self.error_message(error)))
            .collect()
    }
}

/// Replaces `:name` tokens with their values. Longer names are substituted
/// first so `:min` never eats the prefix of `:minimum`.
pub fn substitute(template: &str, params: &BTreeMap<String, String>) -> String {
    let mut names: Vec<&String> = params.keys().collect();
    names.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

    let mut output = template.to_string();
    for name in names {
        output = output.replace(&format!(":{}", name), &params[name]);
    }
    output
}
