use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Which output stream a line came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputStream {
    Stdout,
    Stderr,
}

impl OutputStream {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stdout => "stdout",
            Self::Stderr => "stderr",
        }
    }
}

/// Who a process runs on behalf of, so its output can be attributed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProcessOrigin {
    /// A hook command
    Command { step: String, index: usize },
    /// One of a package's installation steps
    Package { package: String, version: String },
    /// Not attributed to anything in particular
    Unattributed,
}

/// External process events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ProcessEvent {
    /// A process was spawned
    Spawned {
        origin: ProcessOrigin,
        program: String,
        args: Vec<String>,
        cwd: Option<PathBuf>,
    },

    /// A line of process output
    Output {
        origin: ProcessOrigin,
        stream: OutputStream,
        line: String,
    },

    /// A process exited
    Exited {
        origin: ProcessOrigin,
        program: String,
        exit_code: Option<i32>,
        duration: Duration,
    },
}
