mod wizard;

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use component_signup::{
    describe, get_example_draft, get_payload_schema, validate_draft, validate_step_json,
};
use serde_json::{Value, json};
use signup_client::{ClientConfig, HttpEndpoint, Navigator, Submitter};
use signup_spec::{
    FieldId, RegistrationDraft, StepId, SubmissionFailure, Translator, Wizard, WizardError,
    WizardState, registration_form,
};
use tracing_subscriber::EnvFilter;
use wizard::{Answer, PromptContext, Verbosity, WizardPresenter};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Marketer registration wizard CLI",
    long_about = "Walks the three-step marketer registration, validates drafts, and submits them to the registration endpoint"
)]
struct Cli {
    /// Locale for messages (en, fr, ar).
    #[arg(long, global = true, env = "SIGNUP_LOCALE", default_value = "en")]
    locale: String,
    /// JSON file of extra or overriding messages.
    #[arg(long, global = true, value_name = "FILE")]
    messages: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the registration wizard interactively.
    Wizard {
        /// Registration endpoint URL (falls back to SIGNUP_ENDPOINT).
        #[arg(long, value_name = "URL")]
        endpoint: Option<String>,
        /// Draft snapshot to resume from; saved again on quit or failure.
        #[arg(long, value_name = "SNAPSHOT")]
        resume: Option<PathBuf>,
        /// Show step summaries, allowed choices and failure details.
        #[arg(long, alias = "debug")]
        verbose: bool,
    },
    /// Validate a JSON draft, optionally a single step.
    Validate {
        /// Path to the draft JSON.
        #[arg(long, value_name = "DRAFT")]
        draft: PathBuf,
        /// Step id (personal_info, location_payment, account_setup) or number.
        #[arg(long)]
        step: Option<String>,
    },
    /// Submit a complete JSON draft without prompting.
    Submit {
        /// Path to the draft JSON.
        #[arg(long, value_name = "DRAFT")]
        draft: PathBuf,
        /// Registration endpoint URL (falls back to SIGNUP_ENDPOINT).
        #[arg(long, value_name = "URL")]
        endpoint: Option<String>,
    },
    /// Print the JSON Schema of the submitted payload.
    Schema,
    /// Print a complete example draft.
    Example,
    /// Print the form description (steps, fields, rules).
    Describe,
}

/// Prints the post-registration destination.
struct ConsoleNavigator;

impl Navigator for ConsoleNavigator {
    fn navigate(&self, destination: &str) {
        println!("Continue at: {}", destination);
    }
}

#[tokio::main]
async fn main() -> CliResult<()> {
    let cli = Cli::parse();
    let verbose = matches!(cli.command, Command::Wizard { verbose: true, .. });
    init_tracing(verbose);

    let messages = cli.messages.as_deref().map(fs::read_to_string).transpose()?;
    let translator = load_translator(&cli.locale, messages.as_deref())?;

    match cli.command {
        Command::Wizard {
            endpoint,
            resume,
            verbose,
        } => {
            let stdin = io::stdin();
            run_wizard(
                stdin.lock(),
                endpoint,
                resume,
                Verbosity::from_verbose(verbose),
                &translator,
            )
            .await
        }
        Command::Validate { draft, step } => {
            run_validate(&draft, step.as_deref(), &cli.locale, messages.as_deref())
        }
        Command::Submit { draft, endpoint } => run_submit(&draft, endpoint, &translator).await,
        Command::Schema => print_json(&get_payload_schema()),
        Command::Example => print_json(&get_example_draft()),
        Command::Describe => print_json(&describe()),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn load_translator(locale: &str, messages: Option<&str>) -> CliResult<Translator> {
    let mut translator = Translator::for_locale(locale)?;
    if let Some(messages) = messages {
        translator.overlay_json(messages)?;
    }
    Ok(translator)
}

fn print_json(output: &str) -> CliResult<()> {
    let value: Value = serde_json::from_str(output)?;
    if let Some(error) = value.get("error").and_then(Value::as_str) {
        return Err(error.to_string().into());
    }
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn run_validate(
    draft_path: &Path,
    step: Option<&str>,
    locale: &str,
    messages: Option<&str>,
) -> CliResult<()> {
    let draft_json = fs::read_to_string(draft_path)?;
    let config = json!({ "locale": locale, "messages_json": messages }).to_string();
    let output = match step {
        Some(step) => validate_step_json(step, &config, &draft_json),
        None => validate_draft(&config, &draft_json),
    };
    let result: Value = serde_json::from_str(&output)?;
    if let Some(error) = result.get("error").and_then(Value::as_str) {
        return Err(error.to_string().into());
    }

    let valid = result["valid"].as_bool().unwrap_or(false);
    println!(
        "Validation result: {}",
        if valid { "valid" } else { "invalid" }
    );
    describe_validation(&result);

    if valid {
        Ok(())
    } else {
        Err("validation failed".into())
    }
}

fn describe_validation(result: &Value) {
    if let Some(messages) = result["messages"].as_object()
        && !messages.is_empty()
    {
        println!("Errors:");
        for error in result["errors"].as_array().into_iter().flatten() {
            let field = error["field"].as_str().unwrap_or("<unknown>");
            let message = messages
                .get(field)
                .and_then(Value::as_str)
                .unwrap_or_default();
            println!(
                "  {} - {}",
                error["path"].as_str().unwrap_or("<unknown>"),
                message
            );
        }
    }
    if let Some(unknown) = result["unknown_fields"].as_array()
        && !unknown.is_empty()
    {
        let names = unknown
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>();
        println!("Unknown draft fields: {}", names.join(", "));
    }
}

async fn run_submit(
    draft_path: &Path,
    endpoint: Option<String>,
    translator: &Translator,
) -> CliResult<()> {
    let config = ClientConfig::from_env(endpoint)?;
    let value: Value = serde_json::from_str(&fs::read_to_string(draft_path)?)?;
    let (draft, _) = RegistrationDraft::from_json(&value)?;
    let presenter = WizardPresenter::new(Verbosity::Clean, translator);

    let mut wizard = Wizard::resume(registration_form(), draft);
    while wizard.current_step() != Some(StepId::AccountSetup) {
        if let Err(err) = wizard.advance() {
            if let WizardError::Invalid(result) = &err {
                presenter.show_errors(result);
            }
            return Err(err.into());
        }
    }

    let endpoint = HttpEndpoint::new(&config)?;
    let submitter = Submitter::new(
        &endpoint,
        &ConsoleNavigator,
        config.success_destination.clone(),
    );
    match submitter.submit(&mut wizard).await {
        Ok(WizardState::Succeeded { .. }) => {
            presenter.show_completion();
            Ok(())
        }
        Ok(WizardState::Failed(failure)) => {
            report_failure(&presenter, &failure);
            Err("registration failed".into())
        }
        Ok(other) => Err(format!("unexpected wizard state '{}'", other.label()).into()),
        Err(err) => {
            report_wizard_error(&presenter, &err);
            Err(err.into())
        }
    }
}

fn report_failure(presenter: &WizardPresenter<'_>, failure: &SubmissionFailure) {
    match failure {
        SubmissionFailure::Rejected(errors) => presenter.show_remote_errors(errors),
        SubmissionFailure::Unavailable { detail } => presenter.show_unavailable(detail),
    }
}

fn report_wizard_error(presenter: &WizardPresenter<'_>, err: &WizardError) {
    match err {
        WizardError::Invalid(result) => presenter.show_errors(result),
        WizardError::Merge(merge) => presenter.show_internal_error(&merge.to_string()),
        other => eprintln!("{}", other),
    }
}

/// What the prompt loop decided for the current step.
enum StepFlow {
    Completed,
    Back,
    Quit,
}

async fn run_wizard<R: BufRead>(
    mut input: R,
    endpoint: Option<String>,
    resume: Option<PathBuf>,
    verbosity: Verbosity,
    translator: &Translator,
) -> CliResult<()> {
    let config = ClientConfig::from_env(endpoint)?;
    let draft = match &resume {
        Some(path) if path.exists() => RegistrationDraft::from_cbor(&fs::read(path)?)?,
        _ => RegistrationDraft::new(),
    };
    let mut wizard = Wizard::resume(registration_form(), draft);
    let mut presenter = WizardPresenter::new(verbosity, translator);
    let endpoint = HttpEndpoint::new(&config)?;
    let submitter = Submitter::new(
        &endpoint,
        &ConsoleNavigator,
        config.success_destination.clone(),
    );
    let total = wizard.form().steps.len();
    let mut pending: Option<Vec<FieldId>> = None;

    presenter.show_header();
    loop {
        match wizard.state().clone() {
            WizardState::Step(step) => {
                presenter.show_step(step, total);
                let fields = pending
                    .take()
                    .unwrap_or_else(|| step.fields().collect());
                match prompt_fields(&mut input, &mut wizard, &presenter, &fields)? {
                    StepFlow::Back => {
                        wizard.back()?;
                        continue;
                    }
                    StepFlow::Quit => {
                        save_snapshot(resume.as_deref(), wizard.draft())?;
                        println!("Draft saved; run again with --resume to continue.");
                        return Ok(());
                    }
                    StepFlow::Completed => {}
                }

                let result = if step == StepId::AccountSetup {
                    submitter.submit(&mut wizard).await.map(|_| ())
                } else {
                    wizard.advance().map(|_| ())
                };
                match result {
                    Ok(()) => {
                        presenter.show_step_summary(wizard.form(), &wizard.draft().to_masked_json())
                    }
                    Err(WizardError::Invalid(result)) => {
                        presenter.show_errors(&result);
                        let current = wizard.current_step();
                        let fields: Vec<FieldId> = result
                            .errors
                            .iter()
                            .filter(|error| Some(error.step()) == current)
                            .map(|error| error.field)
                            .collect();
                        pending = Some(fields).filter(|fields| !fields.is_empty());
                    }
                    Err(err) => {
                        report_wizard_error(&presenter, &err);
                        save_snapshot(resume.as_deref(), wizard.draft())?;
                        return Err(err.into());
                    }
                }
            }
            WizardState::Succeeded { .. } => {
                presenter.show_completion();
                if let Some(path) = &resume
                    && path.exists()
                {
                    fs::remove_file(path)?;
                }
                return Ok(());
            }
            WizardState::Failed(failure) => {
                report_failure(&presenter, &failure);
                if !confirm(&mut input, "Retry?")? {
                    save_snapshot(resume.as_deref(), wizard.draft())?;
                    return Err("registration failed".into());
                }
                let step = wizard.jump_to_earliest_error()?;
                if let SubmissionFailure::Rejected(errors) = &failure {
                    let fields: Vec<FieldId> = errors
                        .fields
                        .iter()
                        .filter(|error| error.step == step)
                        .map(|error| error.field)
                        .collect();
                    pending = Some(fields).filter(|fields| !fields.is_empty());
                } else {
                    pending = Some(Vec::new());
                }
            }
            WizardState::Submitting => {
                return Err("wizard stuck in submitting state".into());
            }
        }
    }
}

/// Prompts each field until its own rules pass.
fn prompt_fields<R: BufRead>(
    input: &mut R,
    wizard: &mut Wizard,
    presenter: &WizardPresenter<'_>,
    fields: &[FieldId],
) -> CliResult<StepFlow> {
    for &field in fields {
        if matches!(field, FieldId::BankName | FieldId::RibNumber)
            && wizard.draft().get(FieldId::PaymentMethod) != "bank"
        {
            continue;
        }
        loop {
            let prompt = PromptContext::new(wizard.form(), field, wizard.draft().get(field));
            presenter.show_prompt(&prompt);
            io::stdout().flush()?;

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                return Ok(StepFlow::Quit);
            }
            match Answer::parse(&line) {
                Answer::Back => return Ok(StepFlow::Back),
                Answer::Quit => return Ok(StepFlow::Quit),
                Answer::Clear => wizard.set_value(field, "")?,
                Answer::Keep => {}
                Answer::Value(value) => wizard.set_value(field, value)?,
            }

            match wizard.validate_field(field) {
                Some(error) => eprintln!("  {}", presenter.translator().error_message(&error)),
                None => break,
            }
        }
    }
    Ok(StepFlow::Completed)
}

fn confirm<R: BufRead>(input: &mut R, question: &str) -> CliResult<bool> {
    print!("{} [y/N]: ", question);
    io::stdout().flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(matches!(line.trim().to_lowercase().as_str(), "y" | "yes"))
}

fn save_snapshot(path: Option<&Path>, draft: &RegistrationDraft) -> CliResult<()> {
    if let Some(path) = path {
        fs::write(path, draft.to_cbor()?)?;
        tracing::debug!(path = %path.display(), "draft snapshot saved");
    }
    Ok(())
}
