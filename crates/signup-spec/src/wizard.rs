use thiserror::Error;
use tracing::{debug, warn};

use crate::draft::RegistrationDraft;
use crate::payload::{MergeError, RegistrationPayload, merge};
use crate::remote::RemoteErrors;
use crate::result::{ValidationError, ValidationResult};
use crate::spec::{FieldId, RegistrationForm, StepId};
use crate::validate::{validate, validate_field, validate_step};

pub const UNAVAILABLE_CODE: &str = "errors.registration_unavailable";

/// Where the wizard currently is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardState {
    /// Collecting input for one step.
    Step(StepId),
    /// A submission is in flight; edits and resubmits are refused.
    Submitting,
    /// The endpoint accepted the registration.
    Succeeded { destination: Option<String> },
    /// The last submission failed. The draft is intact and the user may edit
    /// any step and submit again.
    Failed(SubmissionFailure),
}

impl WizardState {
    pub fn label(&self) -> &'static str {
        match self {
            WizardState::Step(StepId::PersonalInfo) => "step1",
            WizardState::Step(StepId::LocationPayment) => "step2",
            WizardState::Step(StepId::AccountSetup) => "step3",
            WizardState::Submitting => "submitting",
            WizardState::Succeeded { .. } => "succeeded",
            WizardState::Failed(_) => "failed",
        }
    }
}

/// Why a submission did not succeed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionFailure {
    /// The server rejected specific fields.
    Rejected(RemoteErrors),
    /// Network or unexpected server failure. `detail` is for logs only; users
    /// see the generic [`UNAVAILABLE_CODE`] message.
    Unavailable { detail: String },
}

impl SubmissionFailure {
    pub fn earliest_step(&self) -> Option<StepId> {
        match self {
            SubmissionFailure::Rejected(errors) => errors.earliest_step(),
            SubmissionFailure::Unavailable { .. } => None,
        }
    }
}

/// What the endpoint said about a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Accepted { destination: Option<String> },
    Rejected(RemoteErrors),
    Unavailable { detail: String },
}

#[derive(Debug, Error)]
pub enum WizardError {
    #[error("{} field(s) failed validation", .0.len())]
    Invalid(ValidationResult),
    #[error("a submission is already in progress")]
    SubmissionInFlight,
    #[error("cannot {action} while in state '{state}'")]
    InvalidTransition {
        state: &'static str,
        action: &'static str,
    },
    #[error("step '{0}' is not defined by the form")]
    UnknownStep(StepId),
    #[error(transparent)]
    Merge(#[from] MergeError),
}

/// Registration wizard state machine.
///
/// Owns the single draft of a session. Step transitions re-validate the step
/// being left; submission re-validates every step, refinements included,
/// before the payload is merged.
#[derive(Debug, Clone)]
pub struct Wizard {
    form: RegistrationForm,
    draft: RegistrationDraft,
    state: WizardState,
    errors: ValidationResult,
}

impl Wizard {
    pub fn new(form: RegistrationForm) -> Self {
        Self::resume(form, RegistrationDraft::new())
    }

    /// Starts at step one with previously entered values.
    pub fn resume(form: RegistrationForm, draft: RegistrationDraft) -> Self {
        Self {
            form,
            draft,
            state: WizardState::Step(StepId::PersonalInfo),
            errors: ValidationResult::ok(),
        }
    }

    pub fn form(&self) -> &RegistrationForm {
        &self.form
    }

    pub fn draft(&self) -> &RegistrationDraft {
        &self.draft
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    /// Errors from the latest validation attempt.
    pub fn errors(&self) -> &ValidationResult {
        &self.errors
    }

    pub fn current_step(&self) -> Option<StepId> {
        match self.state {
            WizardState::Step(step) => Some(step),
            _ => None,
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.state == WizardState::Submitting
    }

    pub fn set_value(
        &mut self,
        field: FieldId,
        value: impl Into<String>,
    ) -> Result<(), WizardError> {
        self.ensure_editable("edit")?;
        self.draft.set(field, value);
        Ok(())
    }

    /// Replaces several values at once.
    pub fn apply(&mut self, values: &RegistrationDraft) -> Result<(), WizardError> {
        self.ensure_editable("edit")?;
        self.draft.apply(values);
        Ok(())
    }

    /// Re-checks one field's own rules, clearing or replacing its error.
    pub fn validate_field(&mut self, field: FieldId) -> Option<ValidationError> {
        let error = self
            .form
            .field(field)
            .and_then(|spec| validate_field(spec, self.draft.get(field)));
        self.errors.set_field(field, error.clone());
        error
    }

    /// Validates one step against the current draft without changing state.
    pub fn check_step(&self, step: StepId) -> Result<ValidationResult, WizardError> {
        let spec = self.form.step(step).ok_or(WizardError::UnknownStep(step))?;
        Ok(validate_step(spec, &self.draft))
    }

    /// Moves to the next step when the current one is valid.
    pub fn advance(&mut self) -> Result<StepId, WizardError> {
        let WizardState::Step(step) = self.state else {
            return Err(self.refuse("advance"));
        };
        let Some(next) = step.next() else {
            return Err(self.refuse("advance"));
        };

        let result = self.check_step(step)?;
        if !result.is_empty() {
            warn!(step = %step, errors = result.len(), "step transition refused");
            self.errors = result.clone();
            return Err(WizardError::Invalid(result));
        }

        debug!(from = %step, to = %next, "advancing registration step");
        self.errors = ValidationResult::ok();
        self.state = WizardState::Step(next);
        Ok(next)
    }

    /// Goes one step back. Entered values are kept.
    pub fn back(&mut self) -> Result<StepId, WizardError> {
        let target = match &self.state {
            WizardState::Step(step) => step.previous().unwrap_or(*step),
            WizardState::Failed(_) => StepId::AccountSetup,
            _ => return Err(self.refuse("go back")),
        };
        self.go_to(target)
    }

    /// Jumps to `step` if it is not ahead of the current one. From a failed
    /// submission every step is reachable.
    pub fn go_to(&mut self, step: StepId) -> Result<StepId, WizardError> {
        let allowed = match &self.state {
            WizardState::Step(current) => step <= *current,
            WizardState::Failed(_) => true,
            WizardState::Submitting => return Err(WizardError::SubmissionInFlight),
            WizardState::Succeeded { .. } => false,
        };
        if !allowed {
            return Err(self.refuse("jump forward"));
        }
        debug!(from = self.state.label(), to = %step, "navigating registration step");
        self.state = WizardState::Step(step);
        Ok(step)
    }

    /// After a failure, routes to the earliest step holding an error, or to
    /// the last step when the failure was not field specific. While on a
    /// step the wizard never moves forward.
    pub fn jump_to_earliest_error(&mut self) -> Result<StepId, WizardError> {
        let target = match &self.state {
            WizardState::Failed(failure) => {
                failure.earliest_step().unwrap_or(StepId::AccountSetup)
            }
            WizardState::Step(current) => self
                .errors
                .earliest_step()
                .map_or(*current, |step| step.min(*current)),
            _ => return Err(self.refuse("jump to errors")),
        };
        self.state = WizardState::Step(target);
        Ok(target)
    }

    /// Enters `Submitting` and returns the payload to send.
    ///
    /// Allowed from the last step or from a failed submission. All steps are
    /// re-validated first; on failure the wizard lands on the earliest
    /// invalid step.
    pub fn begin_submission(&mut self) -> Result<RegistrationPayload, WizardError> {
        match &self.state {
            WizardState::Step(StepId::AccountSetup) | WizardState::Failed(_) => {}
            WizardState::Submitting => return Err(WizardError::SubmissionInFlight),
            _ => return Err(self.refuse("submit")),
        }

        let result = validate(&self.form, &self.draft);
        if let Some(step) = result.earliest_step() {
            warn!(step = %step, errors = result.len(), "submission refused by validation");
            self.errors = result.clone();
            self.state = WizardState::Step(step);
            return Err(WizardError::Invalid(result));
        }

        let payload = merge(&self.form, &self.draft)?;
        debug!(from = self.state.label(), "submitting registration");
        self.errors = ValidationResult::ok();
        self.state = WizardState::Submitting;
        Ok(payload)
    }

    /// Records the endpoint's answer for the in-flight submission.
    pub fn complete(&mut self, outcome: SubmissionOutcome) -> Result<&WizardState, WizardError> {
        if self.state != WizardState::Submitting {
            return Err(self.refuse("complete a submission"));
        }

        self.state = match outcome {
            SubmissionOutcome::Accepted { destination } => {
                debug!(?destination, "registration accepted");
                self.draft = RegistrationDraft::new();
                WizardState::Succeeded { destination }
            }
            SubmissionOutcome::Rejected(errors) => {
                warn!(
                    fields = errors.fields.len(),
                    unmapped = errors.unmapped.len(),
                    "registration rejected by server"
                );
                WizardState::Failed(SubmissionFailure::Rejected(errors))
            }
            SubmissionOutcome::Unavailable { detail } => {
                warn!(%detail, "registration endpoint unavailable");
                WizardState::Failed(SubmissionFailure::Unavailable { detail })
            }
        };
        Ok(&self.state)
    }

    /// Drops an in-flight submission and returns to the last step. Nothing is
    /// undone on the server.
    pub fn abandon_submission(&mut self) -> Result<StepId, WizardError> {
        if self.state != WizardState::Submitting {
            return Err(self.refuse("abandon a submission"));
        }
        debug!("submission abandoned");
        self.state = WizardState::Step(StepId::AccountSetup);
        Ok(StepId::AccountSetup)
    }

    fn ensure_editable(&self, action: &'static str) -> Result<(), WizardError> {
        match self.state {
            WizardState::Submitting => Err(WizardError::SubmissionInFlight),
            WizardState::Succeeded { .. } => Err(self.refuse(action)),
            _ => Ok(()),
        }
    }

    fn refuse(&self, action: &'static str) -> WizardError {
        WizardError::InvalidTransition {
            state: self.state.label(),
            action,
        }
    }
}
