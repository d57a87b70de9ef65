//! Network-related error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum NetworkError {
    #[error("connection timeout to {url}")]
    Timeout { url: String },

    #[error("request to {url} failed: {message}")]
    RequestFailed { url: String, message: String },

    #[error("HTTP error {status} from {url}")]
    HttpError { status: u16, url: String },

    #[error("failed to initialise HTTP client: {0}")]
    ClientInit(String),
}

impl UserFacingError for NetworkError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::Timeout { .. } | Self::RequestFailed { .. } => {
                Some("Check your network connection and retry.")
            }
            Self::HttpError { .. } => Some("Verify the URL returns a successful response."),
            Self::ClientInit(_) => None,
        }
    }

    fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::RequestFailed { .. } => true,
            Self::HttpError { status, .. } => *status >= 500,
            Self::ClientInit(_) => false,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::Timeout { .. } => "network.timeout",
            Self::RequestFailed { .. } => "network.request_failed",
            Self::HttpError { .. } => "network.http_error",
            Self::ClientInit(_) => "network.client_init",
        };
        Some(code)
    }
}
