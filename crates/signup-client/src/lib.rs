//! Submission adapter for the marketer registration wizard.

pub mod config;
pub mod endpoint;
pub mod error;
pub mod submit;

pub use config::{ClientConfig, ConfigError, DEFAULT_SUCCESS_DESTINATION, DEFAULT_TIMEOUT};
pub use endpoint::{Acceptance, HttpEndpoint, RegistrationEndpoint};
pub use error::SubmitError;
pub use submit::{Navigator, Submitter};
