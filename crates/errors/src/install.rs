//! Package installation error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum InstallError {
    #[error("failed to install {package}@{version} during {step}: {message}")]
    PackageFailed {
        package: String,
        version: String,
        step: String,
        message: String,
    },

    #[error("installation of {package}@{version} was cancelled")]
    PackageCancelled { package: String, version: String },

    #[error("concurrency error: {message}")]
    ConcurrencyError { message: String },
}

impl UserFacingError for InstallError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::PackageFailed { .. } => {
                Some("Inspect the package output logged above; the checkout is left as-is.")
            }
            _ => None,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::PackageFailed { .. } => "install.package_failed",
            Self::PackageCancelled { .. } => "install.package_cancelled",
            Self::ConcurrencyError { .. } => "install.concurrency_error",
        };
        Some(code)
    }
}
