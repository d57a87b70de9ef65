use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::FailureContext;

/// Per-package installation events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PackageEvent {
    /// The package's version was resolved from a remote source
    VersionResolved {
        package: String,
        version: String,
        source_url: String,
    },

    /// Package installation started
    Started { package: String, version: String },

    /// An installation step (fetch, pin, install) started
    StepStarted {
        package: String,
        version: String,
        step: String,
    },

    /// Package installation finished successfully
    Completed {
        package: String,
        version: String,
        duration: Duration,
    },

    /// Package installation failed
    Failed {
        package: String,
        version: String,
        failure: FailureContext,
    },

    /// Package installation was cancelled after a sibling failed
    Cancelled { package: String, version: String },
}
