use signup_spec::{
    FieldId, RegistrationForm, RemoteErrors, StepId, Translator, UNAVAILABLE_CODE,
    ValidationResult,
};

/// Controls which bits of state the wizard prints.
#[derive(Copy, Clone, Eq, PartialEq)]
pub enum Verbosity {
    /// Clean output: prompts and errors only.
    Clean,
    /// Verbose output: step summaries and allowed choices.
    Verbose,
}

impl Verbosity {
    pub fn from_verbose(verbose: bool) -> Self {
        if verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Clean
        }
    }

    pub fn is_verbose(&self) -> bool {
        matches!(self, Verbosity::Verbose)
    }
}

/// Prints prompts, errors and outcomes for the text wizard.
pub struct WizardPresenter<'a> {
    verbosity: Verbosity,
    translator: &'a Translator,
    header_printed: bool,
}

impl<'a> WizardPresenter<'a> {
    pub fn new(verbosity: Verbosity, translator: &'a Translator) -> Self {
        Self {
            verbosity,
            translator,
            header_printed: false,
        }
    }

    pub fn translator(&self) -> &Translator {
        self.translator
    }

    pub fn show_header(&mut self) {
        if self.header_printed {
            return;
        }
        println!("Marketer registration");
        println!("Type :back to return to the previous step, :quit to save and exit.");
        println!("Type :clear to empty a field, or press enter to keep its value.");
        self.header_printed = true;
    }

    pub fn show_step(&self, step: StepId, total: usize) {
        println!();
        println!(
            "Step {}/{}: {}",
            step.number(),
            total,
            self.translator.step_title(step)
        );
    }

    pub fn show_prompt(&self, prompt: &PromptContext) {
        let mut line = self.translator.field_label(prompt.field);
        if prompt.required {
            line.push_str(" *");
        }
        if !prompt.choices.is_empty() {
            line.push_str(&format!(" ({})", prompt.choices.join("/")));
        }
        if let Some(current) = &prompt.current {
            line.push_str(&format!(" [{}]", current));
        }
        line.push_str(": ");
        print!("{}", line);
    }

    pub fn show_errors(&self, result: &ValidationResult) {
        for (field, message) in self.translator.localize(result) {
            eprintln!("  {}: {}", field, message);
        }
    }

    pub fn show_remote_errors(&self, errors: &RemoteErrors) {
        eprintln!("{}", self.translator.text("errors.registration_rejected"));
        if self.verbosity.is_verbose()
            && let Some(message) = &errors.message
        {
            eprintln!("  {}", message);
        }
        for error in &errors.fields {
            for message in &error.messages {
                eprintln!(
                    "  {} (step {}): {}",
                    error.field,
                    error.step.number(),
                    message
                );
            }
        }
        for (key, messages) in &errors.unmapped {
            for message in messages {
                eprintln!("  {}: {}", key, message);
            }
        }
    }

    pub fn show_unavailable(&self, detail: &str) {
        eprintln!("{}", self.translator.text(UNAVAILABLE_CODE));
        if self.verbosity.is_verbose() {
            eprintln!("  {}", detail);
        }
    }

    pub fn show_internal_error(&self, detail: &str) {
        eprintln!("{}", self.translator.text("errors.internal"));
        if self.verbosity.is_verbose() {
            eprintln!("  {}", detail);
        }
    }

    pub fn show_completion(&self) {
        println!("{}", self.translator.text("register.success"));
    }

    pub fn show_step_summary(&self, form: &RegistrationForm, values: &serde_json::Value) {
        if !self.verbosity.is_verbose() {
            return;
        }
        for field in form.fields() {
            if let Some(value) = values.get(field.id.as_str()).and_then(|v| v.as_str()) {
                println!(" - {} = {}", field.id, value);
            }
        }
    }
}

/// Context used to format a single prompt.
pub struct PromptContext {
    pub field: FieldId,
    pub required: bool,
    pub choices: Vec<String>,
    pub current: Option<String>,
}

impl PromptContext {
    pub fn new(form: &RegistrationForm, field: FieldId, current: &str) -> Self {
        let spec = form.field(field);
        let current = if current.is_empty() {
            None
        } else if field.is_secret() {
            Some("********".to_string())
        } else {
            Some(current.to_string())
        };
        Self {
            field,
            required: spec.map(|spec| spec.required).unwrap_or(false),
            choices: spec
                .and_then(|spec| spec.choices.clone())
                .unwrap_or_default(),
            current,
        }
    }
}

/// Raw line typed at a prompt.
#[derive(Debug, PartialEq, Eq)]
pub enum Answer {
    Back,
    Quit,
    /// Empties the field.
    Clear,
    /// Blank line: keep whatever the field already holds.
    Keep,
    Value(String),
}

impl Answer {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim_end_matches(['\r', '\n']);
        match trimmed.trim() {
            ":back" => Answer::Back,
            ":quit" => Answer::Quit,
            ":clear" => Answer::Clear,
            "" => Answer::Keep,
            _ => Answer::Value(trimmed.to_string()),
        }
    }
}
