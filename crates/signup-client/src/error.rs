use signup_spec::RemoteErrors;
use thiserror::Error;

/// Failure to get a registration accepted.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// Network failure, timeout, or a body that could not be read.
    #[error("network error: {0}")]
    Http(#[from] reqwest::Error),
    /// The server rejected specific fields.
    #[error("registration rejected ({} field error(s))", .0.fields.len())]
    Rejected(RemoteErrors),
    /// Any other non-success status.
    #[error("registration endpoint returned {status}: {body}")]
    Status { status: u16, body: String },
}
