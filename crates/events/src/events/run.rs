use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Whole-run lifecycle events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RunEvent {
    /// The orchestrator started
    Started {
        version: String,
        num_cpu: usize,
        packages: usize,
    },

    /// Every phase finished successfully
    Completed {
        packages_installed: usize,
        duration: Duration,
    },

    /// The run stopped at its first failure
    Failed { failure: super::FailureContext },
}
