pub mod field;
pub mod form;
pub mod step;

pub use field::{FieldId, FieldSpec, Rule};
pub use form::{RegistrationForm, registration_form};
pub use step::{Refinement, StepId, StepSpec};
