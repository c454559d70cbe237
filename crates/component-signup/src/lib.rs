use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;

use signup_spec::{
    DraftError, MergeError, RegistrationDraft, RegistrationForm, StepId, TranslationError,
    Translator, ValidationResult, example_draft, merge, payload_schema, registration_form,
    validate, validate_step,
};

#[derive(Debug, Error)]
enum ComponentError {
    #[error("failed to parse config: {0}")]
    ConfigParse(#[source] serde_json::Error),
    #[error("failed to parse draft: {0}")]
    DraftParse(#[source] serde_json::Error),
    #[error("invalid draft: {0}")]
    Draft(#[from] DraftError),
    #[error("unknown step: {0}")]
    UnknownStep(String),
    #[error("json encode error: {0}")]
    JsonEncode(#[source] serde_json::Error),
    #[error("translation error: {0}")]
    Translation(#[from] TranslationError),
    #[error("internal consistency error: {0}")]
    Merge(#[from] MergeError),
}

/// Per-call options. Everything a call needs is passed in explicitly.
#[derive(Debug, Deserialize, Serialize, Default)]
struct ComponentConfig {
    #[serde(default)]
    locale: Option<String>,
    #[serde(default)]
    messages_json: Option<String>,
}

fn load_config(config_json: &str) -> Result<ComponentConfig, ComponentError> {
    if config_json.trim().is_empty() {
        Ok(ComponentConfig::default())
    } else {
        serde_json::from_str(config_json).map_err(ComponentError::ConfigParse)
    }
}

fn load_translator(config: &ComponentConfig) -> Result<Translator, ComponentError> {
    let mut translator = Translator::for_locale(config.locale.as_deref().unwrap_or("en"))?;
    if let Some(messages) = &config.messages_json {
        translator.overlay_json(messages)?;
    }
    Ok(translator)
}

fn parse_draft(draft_json: &str) -> Result<(RegistrationDraft, Vec<String>), ComponentError> {
    let value: Value = if draft_json.trim().is_empty() {
        json!({})
    } else {
        serde_json::from_str(draft_json).map_err(ComponentError::DraftParse)?
    };
    Ok(RegistrationDraft::from_json(&value)?)
}

fn respond(result: Result<Value, ComponentError>) -> String {
    match result {
        Ok(value) => serde_json::to_string(&value).unwrap_or_else(|error| {
            json!({"error": format!("json encode: {}", error)}).to_string()
        }),
        Err(err) => json!({ "error": err.to_string() }).to_string(),
    }
}

fn validation_response(
    result: &ValidationResult,
    unknown_fields: Vec<String>,
    translator: &Translator,
) -> Result<Value, ComponentError> {
    let messages = translator
        .localize(result)
        .into_iter()
        .map(|(field, message)| (field.as_str().to_string(), Value::String(message)))
        .collect::<serde_json::Map<_, _>>();
    let mut value = serde_json::to_value(result).map_err(ComponentError::JsonEncode)?;
    value["messages"] = Value::Object(messages);
    value["unknown_fields"] = json!(unknown_fields);
    value["earliest_step"] = json!(result.earliest_step());
    Ok(value)
}

/// Form description: steps, fields and their rules.
pub fn describe() -> String {
    let form: RegistrationForm = registration_form();
    respond(serde_json::to_value(form).map_err(ComponentError::JsonEncode))
}

fn step_validation(
    step_id: &str,
    config_json: &str,
    draft_json: &str,
) -> Result<Value, ComponentError> {
    let config = load_config(config_json)?;
    let translator = load_translator(&config)?;
    let step: StepId = step_id
        .parse()
        .map_err(|_| ComponentError::UnknownStep(step_id.to_string()))?;
    let (draft, unknown) = parse_draft(draft_json)?;
    let form = registration_form();
    let spec = form
        .step(step)
        .ok_or_else(|| ComponentError::UnknownStep(step_id.to_string()))?;
    validation_response(&validate_step(spec, &draft), unknown, &translator)
}

/// Validates one step of a draft.
pub fn validate_step_json(step_id: &str, config_json: &str, draft_json: &str) -> String {
    respond(step_validation(step_id, config_json, draft_json))
}

/// Validates every step of a draft.
pub fn validate_draft(config_json: &str, draft_json: &str) -> String {
    respond(load_config(config_json).and_then(|config| {
        let translator = load_translator(&config)?;
        let (draft, unknown) = parse_draft(draft_json)?;
        validation_response(&validate(&registration_form(), &draft), unknown, &translator)
    }))
}

/// Merged request body for a complete draft.
///
/// Refinements are re-checked before merging; a draft that fails them gets a
/// validation response instead of a payload.
pub fn merge_payload(config_json: &str, draft_json: &str) -> String {
    respond(load_config(config_json).and_then(|config| {
        let translator = load_translator(&config)?;
        let (draft, unknown) = parse_draft(draft_json)?;
        let form = registration_form();
        let result = validate(&form, &draft);
        if !result.is_empty() {
            return validation_response(&result, unknown, &translator);
        }
        let payload = merge(&form, &draft)?;
        Ok(json!({
            "valid": true,
            "payload": serde_json::to_value(payload).map_err(ComponentError::JsonEncode)?,
        }))
    }))
}

/// JSON Schema of the merged payload.
pub fn get_payload_schema() -> String {
    respond(Ok(payload_schema()))
}

/// A complete, valid example draft.
pub fn get_example_draft() -> String {
    respond(serde_json::to_value(example_draft()).map_err(ComponentError::JsonEncode))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(output: &str) -> Value {
        serde_json::from_str(output).expect("json")
    }

    #[test]
    fn describe_lists_three_steps() {
        let form = parse(&describe());
        assert_eq!(form["id"], "marketer-registration");
        let steps = form["steps"].as_array().expect("steps");
        assert_eq!(steps.len(), 3);
        assert_eq!(steps[1]["id"], "location_payment");
        assert_eq!(steps[1]["refinements"][0]["refinement"], "bank_details");
        assert_eq!(steps[0]["fields"][2]["rules"][0]["rule"], "phone");
    }

    #[test]
    fn validate_step_reports_localized_messages() {
        let draft = json!({
            "country": "Morocco",
            "city": "Fes",
            "payment_method": "bank",
            "bank_name": "",
            "rib_number": ""
        });
        let output = parse(&validate_step_json(
            "location_payment",
            r#"{"locale":"en"}"#,
            &draft.to_string(),
        ));
        assert_eq!(output["valid"], false);
        assert_eq!(output["errors"][0]["field"], "bank_name");
        assert_eq!(output["errors"][1]["path"], "/rib_number");
        assert_eq!(
            output["messages"]["rib_number"],
            "The RIB is required for bank transfers."
        );
        assert_eq!(output["earliest_step"], "location_payment");
    }

    #[test]
    fn validate_step_accepts_numeric_step_ids() {
        let output = parse(&validate_step_json("1", "", "{}"));
        assert_eq!(output["valid"], false);
        assert_eq!(output["errors"].as_array().map(Vec::len), Some(5));
    }

    #[test]
    fn unknown_step_is_an_error() {
        let output = parse(&validate_step_json("payment", "", "{}"));
        assert_eq!(output["error"], "unknown step: payment");
    }

    #[test]
    fn validate_draft_flags_unknown_fields() {
        let mut draft = serde_json::to_value(example_draft()).expect("json");
        draft["nickname"] = json!("yas");
        let output = parse(&validate_draft("", &draft.to_string()));
        assert_eq!(output["valid"], true);
        assert_eq!(output["unknown_fields"][0], "nickname");
    }

    #[test]
    fn merge_payload_returns_wire_body() {
        let output = parse(&merge_payload("", &get_example_draft()));
        assert_eq!(output["valid"], true);
        assert_eq!(output["payload"]["gender"], "female");
        assert_eq!(output["payload"]["rib_number"], "230123456789012345");
    }

    #[test]
    fn merge_payload_rechecks_refinements() {
        let mut draft = serde_json::to_value(example_draft()).expect("json");
        draft["password_confirmation"] = json!("Mismatch2024");
        let output = parse(&merge_payload(r#"{"locale":"fr"}"#, &draft.to_string()));
        assert_eq!(output["valid"], false);
        assert_eq!(
            output["messages"]["password_confirmation"],
            "La confirmation du mot de passe ne correspond pas."
        );
        assert!(output.get("payload").is_none());
    }

    #[test]
    fn malformed_draft_is_reported() {
        let output = parse(&validate_draft("", "[1, 2]"));
        assert_eq!(output["error"], "invalid draft: draft must be a JSON object");
    }

    #[test]
    fn schema_and_example_are_json() {
        assert!(parse(&get_payload_schema())["properties"].is_object());
        assert_eq!(parse(&get_example_draft())["city"], "Fes");
    }
}
