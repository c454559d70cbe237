use serde_json::{Value, json};

use signup_spec::{
    FieldId, RegistrationDraft, StepId, Translator, ValidationResult, merge, payload_schema,
    registration_form, validate, validate_step, validate_union,
};

fn fixture(name: &str) -> &'static str {
    match name {
        "cash_draft" => include_str!("../tests/fixtures/cash_draft.json"),
        _ => panic!("unknown fixture {}", name),
    }
}

fn draft_from(value: Value) -> RegistrationDraft {
    RegistrationDraft::from_json(&value).expect("draft").0
}

fn check(step: StepId, draft: &RegistrationDraft) -> ValidationResult {
    let form = registration_form();
    validate_step(form.step(step).expect("step"), draft)
}

fn code_for(step: StepId, draft: &RegistrationDraft, field: FieldId) -> Option<String> {
    check(step, draft)
        .error_for(field)
        .map(|error| error.code.clone())
}

fn personal(phone: &str) -> RegistrationDraft {
    draft_from(json!({
        "first_name": "Yasmine",
        "last_name": "Amrani",
        "phone": phone,
        "gender": "female",
        "national_id": "AB1234567"
    }))
}

fn bank(rib: &str) -> RegistrationDraft {
    draft_from(json!({
        "country": "Morocco",
        "city": "Fes",
        "payment_method": "bank",
        "bank_name": "CIH Bank",
        "rib_number": rib
    }))
}

#[test]
fn phone_accepts_only_plus_and_seven_to_fifteen_digits() {
    for (phone, valid) in [
        ("+212612345678", true),
        ("+1234", false),
        ("212612345678", false),
        ("+212 (0) 6-12-34-56", true),
        ("+12345678901234567", false),
        ("", false),
    ] {
        let result = check(StepId::PersonalInfo, &personal(phone));
        assert_eq!(
            result.error_for(FieldId::Phone).is_none(),
            valid,
            "phone {:?}",
            phone
        );
    }
}

#[test]
fn national_id_is_eight_to_twenty_uppercase_letters_or_digits() {
    for (id, code) in [
        ("AB1234567", None),
        ("12345678", None),
        ("ab1234567", Some("validation.national_id_format")),
        ("AB-12345", Some("validation.national_id_format")),
        ("AB 1234 567", Some("validation.national_id_format")),
        ("ab12", Some("validation.min_length")),
        ("A1234567890123456789Z", Some("validation.max_length")),
    ] {
        let mut draft = personal("+212612345678");
        draft.set(FieldId::NationalId, id);
        assert_eq!(
            code_for(StepId::PersonalInfo, &draft, FieldId::NationalId).as_deref(),
            code,
            "national id {:?}",
            id
        );
    }
}

#[test]
fn names_are_two_to_fifty_characters_after_trimming() {
    let longest = "A".repeat(50);
    let too_long = "A".repeat(51);
    for (name, code) in [
        ("Yasmine", None),
        ("  Yasmine  ", None),
        (longest.as_str(), None),
        (too_long.as_str(), Some("validation.max_length")),
        ("Y", Some("validation.min_length")),
        ("Y ", Some("validation.min_length")),
    ] {
        let mut draft = personal("+212612345678");
        draft.set(FieldId::FirstName, name);
        draft.set(FieldId::LastName, name);
        let result = check(StepId::PersonalInfo, &draft);
        for field in [FieldId::FirstName, FieldId::LastName] {
            assert_eq!(
                result.error_for(field).map(|error| error.code.as_str()),
                code,
                "{} {:?}",
                field,
                name
            );
        }
    }
}

#[test]
fn country_is_two_to_one_hundred_characters() {
    let longest = "M".repeat(100);
    let too_long = "M".repeat(101);
    for (country, code) in [
        ("Ma", None),
        ("Morocco", None),
        (longest.as_str(), None),
        (too_long.as_str(), Some("validation.max_length")),
        ("M", Some("validation.min_length")),
        (" M", Some("validation.min_length")),
        ("   ", Some("validation.required")),
    ] {
        let mut draft = bank("12345678901234567890");
        draft.set(FieldId::Country, country);
        assert_eq!(
            code_for(StepId::LocationPayment, &draft, FieldId::Country).as_deref(),
            code,
            "country {:?}",
            country
        );
    }
}

#[test]
fn email_must_be_well_formed_and_at_most_255_characters() {
    let longest = format!("{}@example.ma", "a".repeat(244));
    let too_long = format!("{}@example.ma", "a".repeat(245));
    for (email, code) in [
        ("yasmine@example.ma", None),
        (longest.as_str(), None),
        (too_long.as_str(), Some("validation.max_length")),
        ("yasmine.example.ma", Some("validation.email")),
        ("yasmine@example", Some("validation.email")),
        ("yas mine@example.ma", Some("validation.email")),
    ] {
        let draft = draft_from(json!({
            "email": email,
            "password": "Souk2024Fes",
            "password_confirmation": "Souk2024Fes"
        }));
        assert_eq!(
            code_for(StepId::AccountSetup, &draft, FieldId::Email).as_deref(),
            code,
            "email {:?}",
            email
        );
    }
}

#[test]
fn password_needs_eight_characters_and_mixed_case_digits() {
    let too_long = format!("Aa1{}", "x".repeat(253));
    for (password, code) in [
        ("Souk2024Fes", None),
        ("Souk2024", None),
        ("Souk202", Some("validation.min_length")),
        ("souk2024fes", Some("validation.password_strength")),
        ("SOUK2024FES", Some("validation.password_strength")),
        ("SoukFesAtlas", Some("validation.password_strength")),
        (too_long.as_str(), Some("validation.max_length")),
    ] {
        let draft = draft_from(json!({
            "email": "yasmine@example.ma",
            "password": password,
            "password_confirmation": password
        }));
        assert_eq!(
            code_for(StepId::AccountSetup, &draft, FieldId::Password).as_deref(),
            code,
            "password {:?}",
            password
        );
    }
}

#[test]
fn bank_name_needs_two_characters_for_bank_payouts() {
    for (name, code) in [
        ("CIH Bank", None),
        ("BP", None),
        ("C", Some("validation.min_length")),
        (" C ", Some("validation.min_length")),
        ("", Some("validation.bank_name_required")),
    ] {
        let mut draft = bank("12345678901234567890");
        draft.set(FieldId::BankName, name);
        let result = check(StepId::LocationPayment, &draft);
        let error = result.error_for(FieldId::BankName);
        assert_eq!(
            error.map(|error| error.code.as_str()),
            code,
            "bank name {:?}",
            name
        );
        if code == Some("validation.min_length") {
            let error = error.expect("error");
            assert_eq!(error.params.get("min").map(String::as_str), Some("2"));
        }
    }
}

#[test]
fn rib_is_checked_after_stripping_whitespace() {
    assert!(check(StepId::LocationPayment, &bank("2301 2345 6789 0123 4567")).valid);
    assert!(check(StepId::LocationPayment, &bank("12345678901234567890")).valid);

    let short = check(StepId::LocationPayment, &bank("123"));
    assert_eq!(short.fields(), vec![FieldId::RibNumber]);
    assert_eq!(short.errors[0].code, "validation.rib_format");

    let letters = check(StepId::LocationPayment, &bank("FR76 3000 6000 0112 3456 7890"));
    assert_eq!(letters.fields(), vec![FieldId::RibNumber]);
}

#[test]
fn cash_leaves_bank_fields_unconstrained() {
    let draft = draft_from(serde_json::from_str(fixture("cash_draft")).expect("json"));
    let result = check(StepId::LocationPayment, &draft);
    assert!(result.valid, "{:?}", result.errors);

    let empty = draft_from(json!({
        "country": "Morocco",
        "city": "Fes",
        "payment_method": "cash"
    }));
    assert!(check(StepId::LocationPayment, &empty).valid);
}

#[test]
fn password_mismatch_is_reported_on_confirmation() {
    let draft = draft_from(json!({
        "email": "yasmine@example.ma",
        "password": "Souk2024Fes",
        "password_confirmation": "Souk2024fes"
    }));
    let result = check(StepId::AccountSetup, &draft);
    assert_eq!(result.fields(), vec![FieldId::PasswordConfirmation]);
    assert_eq!(result.errors[0].code, "validation.password_mismatch");
    assert!(result.error_for(FieldId::Password).is_none());
}

#[test]
fn refinements_wait_for_field_rules() {
    let draft = draft_from(json!({
        "email": "not-an-email",
        "password": "Souk2024Fes",
        "password_confirmation": "different"
    }));
    let result = check(StepId::AccountSetup, &draft);
    assert_eq!(result.fields(), vec![FieldId::Email]);
}

#[test]
fn invalid_first_step_is_stable_across_attempts() {
    let draft = draft_from(json!({
        "first_name": "Y",
        "last_name": "Amrani3",
        "phone": "0612345678",
        "gender": "unknown",
        "national_id": "ab12"
    }));
    let first = check(StepId::PersonalInfo, &draft);
    let second = check(StepId::PersonalInfo, &draft);
    assert!(!first.is_empty());
    assert_eq!(first, second);
    assert_eq!(
        first.fields(),
        vec![
            FieldId::FirstName,
            FieldId::LastName,
            FieldId::Phone,
            FieldId::Gender,
            FieldId::NationalId
        ]
    );
    assert_eq!(first.errors[0].code, "validation.min_length");
    assert_eq!(first.errors[1].code, "validation.name_format");
    assert_eq!(first.errors[4].code, "validation.min_length");
}

#[test]
fn arabic_names_are_accepted() {
    let mut draft = personal("+212612345678");
    draft.set(FieldId::FirstName, "ياسمين");
    draft.set(FieldId::LastName, "العمراني");
    assert!(check(StepId::PersonalInfo, &draft).valid);
}

#[test]
fn registration_scenario_across_steps() {
    let personal = personal("+212655112233");
    assert!(check(StepId::PersonalInfo, &personal).valid);

    let mut location = draft_from(json!({
        "country": "Morocco",
        "city": "Fes",
        "payment_method": "bank",
        "bank_name": "",
        "rib_number": ""
    }));
    let result = check(StepId::LocationPayment, &location);
    assert_eq!(result.fields(), vec![FieldId::BankName, FieldId::RibNumber]);
    assert_eq!(result.errors[0].code, "validation.bank_name_required");
    assert_eq!(result.errors[1].code, "validation.rib_required");

    location.set(FieldId::BankName, "CIH Bank");
    location.set(FieldId::RibNumber, "12345678901234567890");
    assert!(check(StepId::LocationPayment, &location).valid);
}

#[test]
fn union_schema_ignores_refinements() {
    let mut draft = signup_spec::example_draft();
    draft.set(FieldId::BankName, "");
    draft.set(FieldId::PasswordConfirmation, "Other2024");
    let form = registration_form();

    assert!(validate_union(&form, &draft).valid);
    let full = validate(&form, &draft);
    assert_eq!(
        full.fields(),
        vec![FieldId::BankName, FieldId::PasswordConfirmation]
    );
    assert_eq!(full.earliest_step(), Some(StepId::LocationPayment));
}

#[test]
fn merge_normalizes_and_drops_cash_bank_details() {
    let form = registration_form();
    let draft = draft_from(serde_json::from_str(fixture("cash_draft")).expect("json"));
    let payload = merge(&form, &draft).expect("payload");
    let wire = serde_json::to_value(&payload).expect("json");

    assert_eq!(wire["phone"], "+212661778899");
    assert_eq!(wire["payment_method"], "cash");
    assert!(wire.get("bank_name").is_none());
    assert!(wire.get("rib_number").is_none());
    assert_eq!(wire["password_confirmation"], "Atlas2024");
}

#[test]
fn merge_strips_rib_whitespace_for_bank() {
    let form = registration_form();
    let payload = merge(&form, &signup_spec::example_draft()).expect("payload");
    assert_eq!(payload.rib_number.as_deref(), Some("230123456789012345"));
    assert_eq!(payload.bank_name.as_deref(), Some("CIH Bank"));
}

#[test]
fn merge_rejects_inconsistent_draft() {
    let form = registration_form();
    let mut draft = signup_spec::example_draft();
    draft.clear(FieldId::Email);
    let err = merge(&form, &draft).unwrap_err();
    let signup_spec::MergeError::Inconsistent { fields, .. } = err;
    assert_eq!(fields, vec![FieldId::Email]);
}

#[test]
fn merged_values_satisfy_the_field_rules_they_were_checked_against() {
    let form = registration_form();
    let mut draft = signup_spec::example_draft();
    draft.set(FieldId::FirstName, "Y ");
    draft.set(FieldId::Country, " M");
    let err = merge(&form, &draft).unwrap_err();
    let signup_spec::MergeError::Inconsistent { fields, .. } = err;
    assert_eq!(fields, vec![FieldId::FirstName, FieldId::Country]);

    draft.set(FieldId::FirstName, "  Yasmine ");
    draft.set(FieldId::Country, " Morocco ");
    draft.set(FieldId::NationalId, " AB1234567 ");
    let payload = merge(&form, &draft).expect("payload");
    assert_eq!(payload.first_name, "Yasmine");
    assert_eq!(payload.country, "Morocco");
    assert_eq!(payload.national_id, "AB1234567");
    assert!(validate(&form, &draft).valid);
}

#[test]
fn payload_schema_lists_wire_fields() {
    let schema = payload_schema();
    let props = schema["properties"].as_object().expect("properties");
    for field in FieldId::ALL {
        assert!(props.contains_key(field.as_str()), "missing {}", field);
    }
    let required = schema["required"].as_array().expect("required");
    assert!(required.iter().any(|value| value == "email"));
    assert!(!required.iter().any(|value| value == "rib_number"));
}

#[test]
fn errors_localize_in_french() {
    let translator = Translator::builtin("fr").expect("fr");
    let result = check(StepId::PersonalInfo, &personal("+1234"));
    let messages = translator.localize(&result);
    assert_eq!(
        messages,
        vec![(
            FieldId::Phone,
            "Le champ téléphone doit contenir entre 7 et 15 chiffres.".to_string()
        )]
    );
}
