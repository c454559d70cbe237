use signup_spec::{SubmissionOutcome, Wizard, WizardError, WizardState};
use tracing::{error, info, warn};

use crate::endpoint::RegistrationEndpoint;
use crate::error::SubmitError;

/// Routing collaborator invoked once a registration is accepted.
pub trait Navigator: Send + Sync {
    fn navigate(&self, destination: &str);
}

/// Drives a wizard through `Submitting` into `Succeeded` or `Failed`.
pub struct Submitter<'a, E: ?Sized, N: ?Sized> {
    endpoint: &'a E,
    navigator: &'a N,
    success_destination: String,
}

impl<'a, E, N> Submitter<'a, E, N>
where
    E: RegistrationEndpoint + ?Sized,
    N: Navigator + ?Sized,
{
    pub fn new(endpoint: &'a E, navigator: &'a N, success_destination: impl Into<String>) -> Self {
        Self {
            endpoint,
            navigator,
            success_destination: success_destination.into(),
        }
    }

    /// Validates, merges and sends the wizard's draft.
    ///
    /// Holding `&mut Wizard` across the request means no second submission
    /// can start for the same wizard until this one resolves. Errors are only
    /// returned when the wizard refuses to enter `Submitting`; every endpoint
    /// failure is recorded as a `Failed` state instead.
    pub async fn submit(&self, wizard: &mut Wizard) -> Result<WizardState, WizardError> {
        let payload = wizard.begin_submission()?;
        info!(payment_method = ?payload.payment_method, "submitting registration");

        let outcome = match self.endpoint.register(&payload).await {
            Ok(acceptance) => SubmissionOutcome::Accepted {
                destination: Some(
                    acceptance
                        .redirect
                        .unwrap_or_else(|| self.success_destination.clone()),
                ),
            },
            Err(SubmitError::Rejected(errors)) => {
                warn!(fields = errors.fields.len(), "registration rejected");
                SubmissionOutcome::Rejected(errors)
            }
            Err(err) => {
                error!(error = %err, "registration submission failed");
                SubmissionOutcome::Unavailable {
                    detail: err.to_string(),
                }
            }
        };

        let state = wizard.complete(outcome)?.clone();
        if let WizardState::Succeeded {
            destination: Some(destination),
        } = &state
        {
            self.navigator.navigate(destination);
        }
        Ok(state)
    }
}
