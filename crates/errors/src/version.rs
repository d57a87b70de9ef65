//! Version resolution error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum VersionError {
    #[error("unable to resolve version of {package} from {source_url}: {message}")]
    ResolutionFailed {
        package: String,
        source_url: String,
        message: String,
    },

    #[error("version source {source_url} for {package} returned an empty version")]
    EmptyVersion { package: String, source_url: String },
}

impl UserFacingError for VersionError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::ResolutionFailed { .. } => {
                Some("Check that the version_url is reachable or pin a literal version instead.")
            }
            Self::EmptyVersion { .. } => {
                Some("The version_url must return the git reference to check out as its body.")
            }
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(self, Self::ResolutionFailed { .. })
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::ResolutionFailed { .. } => "version.resolution_failed",
            Self::EmptyVersion { .. } => "version.empty_version",
        };
        Some(code)
    }
}
