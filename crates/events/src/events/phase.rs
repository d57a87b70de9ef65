use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::FailureContext;

/// Build phase events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PhaseEvent {
    /// A build phase started
    Started {
        phase: String,
        concurrency: usize,
        packages: Vec<String>,
    },

    /// A build phase drained successfully
    Completed {
        phase: String,
        packages: usize,
        duration: Duration,
    },

    /// A build phase stopped at its first failure
    Failed {
        phase: String,
        failure: FailureContext,
        /// Packages still running when the failure was observed
        cancelled: usize,
    },
}
