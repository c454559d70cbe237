use crate::draft::RegistrationDraft;
use crate::spec::FieldId;

/// A draft that passes every step with a bank payout.
pub fn example_draft() -> RegistrationDraft {
    RegistrationDraft::new()
        .with(FieldId::FirstName, "Yasmine")
        .with(FieldId::LastName, "Amrani")
        .with(FieldId::Phone, "+212655112233")
        .with(FieldId::Gender, "female")
        .with(FieldId::NationalId, "AB1234567")
        .with(FieldId::Country, "Morocco")
        .with(FieldId::City, "Fes")
        .with(FieldId::PaymentMethod, "bank")
        .with(FieldId::BankName, "CIH Bank")
        .with(FieldId::RibNumber, "2301 2345 6789 0123 45")
        .with(FieldId::Email, "yasmine.amrani@example.ma")
        .with(FieldId::Password, "Souk2024Fes")
        .with(FieldId::PasswordConfirmation, "Souk2024Fes")
}
