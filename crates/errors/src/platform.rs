//! Process execution errors

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

/// Errors that can occur while running external commands
#[derive(Debug, Clone, Error)]
pub enum PlatformError {
    #[error("process execution failed: {command} - {message}")]
    ProcessExecutionFailed { command: String, message: String },

    #[error("command `{command}` exited with {}", describe_exit(.exit_code))]
    CommandFailed {
        command: String,
        exit_code: Option<i32>,
    },

    #[error("empty command")]
    EmptyCommand,

    #[error("command `{command}` was cancelled")]
    Cancelled { command: String },
}

#[allow(clippy::ref_option)]
fn describe_exit(exit_code: &Option<i32>) -> String {
    match exit_code {
        Some(code) => format!("status {code}"),
        None => "a signal".to_string(),
    }
}

impl UserFacingError for PlatformError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::ProcessExecutionFailed { .. } => {
                Some("Make sure the program is installed and available on PATH.")
            }
            Self::CommandFailed { .. } => Some("Inspect the command output logged above."),
            Self::EmptyCommand => Some("Every command needs at least a program name."),
            Self::Cancelled { .. } => None,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::ProcessExecutionFailed { .. } => "platform.process_execution_failed",
            Self::CommandFailed { .. } => "platform.command_failed",
            Self::EmptyCommand => "platform.empty_command",
            Self::Cancelled { .. } => "platform.cancelled",
        };
        Some(code)
    }
}
