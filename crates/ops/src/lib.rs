#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Run orchestration for update-gotools
//!
//! This crate sits between the CLI and the specialized crates: it runs the
//! hook commands, partitions packages into the parallel and single build
//! phases and drives each phase under its concurrency limit.

mod context;
mod orchestrator;
mod phase;
mod types;

pub use context::{OpsContextBuilder, OpsCtx};
pub use orchestrator::Orchestrator;
pub use phase::{run_phase, BuildPhase};
pub use types::{
    HookStep, PhaseKind, PhasePlan, PhaseReport, PlannedPackage, RunPlan, RunReport,
};
