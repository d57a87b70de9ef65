use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::FailureContext;

/// Pre/post hook command events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CommandEvent {
    /// A hook step (`pre_commands` / `post_commands`) started
    StepStarted { step: String, commands: usize },

    /// A single hook command started
    Started {
        step: String,
        index: usize,
        command: Vec<String>,
    },

    /// A single hook command finished successfully
    Completed {
        step: String,
        index: usize,
        duration: Duration,
    },

    /// A single hook command failed
    Failed {
        step: String,
        index: usize,
        failure: FailureContext,
    },
}
