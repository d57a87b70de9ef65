//! Operation orchestration error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum OpsError {
    #[error("{step} command #{index} failed: {message}")]
    CommandFailed {
        step: String,
        index: usize,
        message: String,
    },

    #[error("{phase} phase failed: {message}")]
    PhaseFailed { phase: String, message: String },

    #[error("missing component: {component}")]
    MissingComponent { component: String },
}

impl UserFacingError for OpsError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::CommandFailed { .. } => {
                Some("Fix the failing pre/post command in the configuration file.")
            }
            Self::PhaseFailed { .. } | Self::MissingComponent { .. } => None,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::CommandFailed { .. } => "ops.command_failed",
            Self::PhaseFailed { .. } => "ops.phase_failed",
            Self::MissingComponent { .. } => "ops.missing_component",
        };
        Some(code)
    }
}
