//! Types for operations and results

use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Which of the two build phases a phase is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseKind {
    /// Packages that may build next to each other
    Parallel,
    /// Packages that must build alone
    Single,
}

impl PhaseKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Parallel => "parallel",
            Self::Single => "single",
        }
    }
}

impl fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which list of hook commands is running
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HookStep {
    PreCommands,
    PostCommands,
}

impl HookStep {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PreCommands => "pre_commands",
            Self::PostCommands => "post_commands",
        }
    }
}

impl fmt::Display for HookStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one drained build phase
#[derive(Clone, Debug, Serialize)]
pub struct PhaseReport {
    pub kind: PhaseKind,
    pub concurrency: usize,
    /// Installed packages in completion order
    pub packages: Vec<String>,
    pub duration: Duration,
}

/// Outcome of a successful run
#[derive(Clone, Debug, Serialize)]
pub struct RunReport {
    pub pre_commands: usize,
    pub phases: Vec<PhaseReport>,
    pub post_commands: usize,
    pub duration: Duration,
}

impl RunReport {
    /// Total number of packages installed across phases
    #[must_use]
    pub fn packages_installed(&self) -> usize {
        self.phases.iter().map(|p| p.packages.len()).sum()
    }
}

/// One package as it would be installed
#[derive(Clone, Debug, Serialize)]
pub struct PlannedPackage {
    pub name: String,
    pub version: String,
    /// Commands in execution order, each joined for display
    pub commands: Vec<String>,
}

/// One build phase as it would run
#[derive(Clone, Debug, Serialize)]
pub struct PhasePlan {
    pub kind: PhaseKind,
    pub concurrency: usize,
    pub packages: Vec<PlannedPackage>,
}

/// Everything a run would do, without doing it
#[derive(Clone, Debug, Serialize)]
pub struct RunPlan {
    pub pre_commands: Vec<String>,
    pub phases: Vec<PhasePlan>,
    pub post_commands: Vec<String>,
}

impl RunPlan {
    /// Render as pretty JSON
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, gotools_errors::Error> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
