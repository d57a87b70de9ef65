//! CLI error handling

use std::fmt;

use gotools_errors::UserFacingError;

/// CLI-specific error type
#[derive(Debug)]
pub enum CliError {
    /// Configuration could not be loaded
    Config(gotools_errors::Error),
    /// The run itself failed
    Ops(gotools_errors::Error),
}

impl CliError {
    fn inner(&self) -> &gotools_errors::Error {
        match self {
            CliError::Config(e) | CliError::Ops(e) => e,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let e = self.inner();
        if let CliError::Config(_) = self {
            write!(f, "Configuration error: ")?;
        }
        write!(f, "{}", e.user_message())?;
        if let Some(code) = e.user_code() {
            write!(f, "\n  Code: {code}")?;
        }
        if let Some(hint) = e.user_hint() {
            write!(f, "\n  Hint: {hint}")?;
        }
        if e.is_retryable() {
            write!(f, "\n  Retry: safe to retry this operation.")?;
        }
        Ok(())
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.inner())
    }
}

impl From<gotools_errors::Error> for CliError {
    fn from(e: gotools_errors::Error) -> Self {
        match e {
            gotools_errors::Error::Config(_) => CliError::Config(e),
            other => CliError::Ops(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gotools_errors::{ConfigError, OpsError};

    #[test]
    fn config_errors_are_labelled() {
        let err = CliError::from(gotools_errors::Error::from(ConfigError::NotFound {
            path: "/nope.yml".to_string(),
        }));
        assert!(matches!(err, CliError::Config(_)));
        assert!(err.to_string().starts_with("Configuration error: "));
        assert!(err.to_string().contains("/nope.yml"));
    }

    #[test]
    fn run_errors_carry_code() {
        let err = CliError::from(gotools_errors::Error::from(OpsError::CommandFailed {
            step: "pre_commands".to_string(),
            index: 1,
            message: "exit 2".to_string(),
        }));
        assert!(matches!(err, CliError::Ops(_)));
        let rendered = err.to_string();
        assert!(rendered.contains("pre_commands"));
        assert!(rendered.contains("\n  Code: "));
    }
}
