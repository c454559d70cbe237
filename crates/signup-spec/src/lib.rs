#![allow(missing_docs)]

pub mod draft;
pub mod example;
pub mod payload;
pub mod remote;
pub mod result;
pub mod rule;
pub mod spec;
pub mod translate;
pub mod validate;
pub mod wizard;

pub use draft::{DraftError, RegistrationDraft};
pub use example::example_draft;
pub use payload::{Gender, MergeError, PaymentMethod, RegistrationPayload, merge, payload_schema};
pub use remote::{RemoteErrors, RemoteFieldError};
pub use result::{ValidationError, ValidationResult};
pub use rule::{normalize_phone, strip_whitespace};
pub use spec::{
    FieldId, FieldSpec, Refinement, RegistrationForm, Rule, StepId, StepSpec, registration_form,
};
pub use translate::{TranslationError, Translator, substitute};
pub use validate::{validate, validate_field, validate_step, validate_union};
pub use wizard::{
    SubmissionFailure, SubmissionOutcome, UNAVAILABLE_CODE, Wizard, WizardError, WizardState,
};
