use serde::{Deserialize, Serialize};

use crate::EventSource;
use gotools_errors::UserFacingError;

/// Structured failure information shared across domains.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureContext {
    /// Stable error code, when the error provides one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Short user-facing message.
    pub message: String,
    /// Optional remediation hint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Whether retrying the operation might succeed.
    pub retryable: bool,
}

impl FailureContext {
    /// Construct a new failure context.
    #[must_use]
    pub fn new(
        code: Option<impl Into<String>>,
        message: impl Into<String>,
        hint: Option<impl Into<String>>,
        retryable: bool,
    ) -> Self {
        Self {
            code: code.map(Into::into),
            message: message.into(),
            hint: hint.map(Into::into),
            retryable,
        }
    }

    /// Build failure context from a `UserFacingError` implementation.
    #[must_use]
    pub fn from_error<E: UserFacingError + ?Sized>(error: &E) -> Self {
        Self::new(
            error.user_code(),
            error.user_message().into_owned(),
            error.user_hint(),
            error.is_retryable(),
        )
    }
}

pub mod command;
pub mod general;
pub mod package;
pub mod phase;
pub mod process;
pub mod run;

pub use command::*;
pub use general::*;
pub use package::*;
pub use phase::*;
pub use process::*;
pub use run::*;

/// Top-level application event enum that aggregates all domain-specific events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event", rename_all = "snake_case")]
pub enum AppEvent {
    /// General utility events (warnings, errors, debug logs)
    General(GeneralEvent),

    /// Whole-run lifecycle
    Run(RunEvent),

    /// Pre/post hook commands
    Command(CommandEvent),

    /// Build phases
    Phase(PhaseEvent),

    /// Package installations
    Package(PackageEvent),

    /// External processes and their output
    Process(ProcessEvent),
}

impl AppEvent {
    /// Identify the source domain for this event (used for metadata/logging).
    #[must_use]
    pub fn event_source(&self) -> EventSource {
        match self {
            Self::General(_) => EventSource::GENERAL,
            Self::Run(_) => EventSource::RUN,
            Self::Command(_) => EventSource::COMMAND,
            Self::Phase(_) => EventSource::PHASE,
            Self::Package(_) => EventSource::PACKAGE,
            Self::Process(_) => EventSource::PROCESS,
        }
    }

    /// Determine the appropriate tracing log level for this event
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        use tracing::Level;

        match self {
            Self::General(GeneralEvent::Error { .. })
            | Self::Run(RunEvent::Failed { .. })
            | Self::Command(CommandEvent::Failed { .. })
            | Self::Phase(PhaseEvent::Failed { .. })
            | Self::Package(PackageEvent::Failed { .. })
            | Self::Process(ProcessEvent::Output {
                stream: OutputStream::Stderr,
                ..
            }) => Level::ERROR,

            Self::General(GeneralEvent::Warning { .. })
            | Self::Package(PackageEvent::Cancelled { .. }) => Level::WARN,

            Self::General(GeneralEvent::DebugLog { .. })
            | Self::Run(RunEvent::Started { .. })
            | Self::Package(PackageEvent::StepStarted { .. })
            | Self::Command(CommandEvent::Completed { .. })
            | Self::Process(ProcessEvent::Spawned { .. } | ProcessEvent::Exited { .. }) => {
                Level::DEBUG
            }

            _ => Level::INFO,
        }
    }

    /// Identifier used to correlate events belonging to the same package or step
    #[must_use]
    pub fn correlation_id(&self) -> Option<String> {
        match self {
            Self::Package(
                PackageEvent::VersionResolved { package, .. }
                | PackageEvent::Started { package, .. }
                | PackageEvent::StepStarted { package, .. }
                | PackageEvent::Completed { package, .. }
                | PackageEvent::Failed { package, .. }
                | PackageEvent::Cancelled { package, .. },
            ) => Some(package.clone()),
            Self::Command(
                CommandEvent::StepStarted { step, .. }
                | CommandEvent::Started { step, .. }
                | CommandEvent::Completed { step, .. }
                | CommandEvent::Failed { step, .. },
            ) => Some(step.clone()),
            Self::Phase(
                PhaseEvent::Started { phase, .. }
                | PhaseEvent::Completed { phase, .. }
                | PhaseEvent::Failed { phase, .. },
            ) => Some(phase.clone()),
            Self::Process(
                ProcessEvent::Spawned { origin, .. }
                | ProcessEvent::Output { origin, .. }
                | ProcessEvent::Exited { origin, .. },
            ) => match origin {
                ProcessOrigin::Command { step, .. } => Some(step.clone()),
                ProcessOrigin::Package { package, .. } => Some(package.clone()),
                ProcessOrigin::Unattributed => None,
            },
            Self::General(_) | Self::Run(_) => None,
        }
    }
}
