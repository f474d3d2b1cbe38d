use crate::cli::error::{CliError, Severity, ValidationIssue};
use crate::console::commands::{load_settings, CallableTrait};
use crate::console::render;
use crate::validation::validate_settings;

/// `nodeprobe validate [--config FILE] [--json]`
///
/// Checks the endpoint configuration without touching the network.
pub struct ValidateCommand {
    pub config: Option<String>,
    pub json: bool,
}

impl ValidateCommand {
    pub fn new(config: Option<String>, json: bool) -> Self {
        Self { config, json }
    }
}

fn error_count(issues: &[ValidationIssue]) -> usize {
    issues
        .iter()
        .filter(|issue| issue.severity == Severity::Error)
        .count()
}

impl CallableTrait for ValidateCommand {
    fn call(&self) -> Result<(), Box<dyn std::error::Error>> {
        let settings = load_settings(self.config.as_deref())?;
        let issues = validate_settings(&settings);

        if self.json {
            println!("{}", serde_json::to_string_pretty(&issues)?);
        } else {
            println!("{}", render::render_issues(&issues));
        }

        match error_count(&issues) {
            0 => Ok(()),
            errors => Err(Box::new(CliError::ConfigValidation { errors })),
        }
    }
}
