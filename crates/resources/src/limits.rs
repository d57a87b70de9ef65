//! Per-phase concurrency limits
//!
//! The parallel phase leaves one CPU free for the rest of the system; the
//! single phase always runs one package at a time.

use serde::{Deserialize, Serialize};

/// Capacities of the two build phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseLimits {
    /// CPUs the limits were derived from
    pub cpus: usize,
    /// Capacity of the parallel phase
    pub parallel: usize,
    /// Capacity of the single phase
    pub single: usize,
}

impl PhaseLimits {
    /// Limits derived from the number of CPUs on this machine
    ///
    /// A non-zero `jobs` overrides the detected parallel capacity.
    #[must_use]
    pub fn from_system(jobs: usize) -> Self {
        Self::for_cpus(num_cpus::get(), jobs)
    }

    /// Limits for a machine with `cpus` CPUs
    #[must_use]
    pub fn for_cpus(cpus: usize, jobs: usize) -> Self {
        let parallel = if jobs > 0 {
            jobs // User override
        } else {
            cpus.saturating_sub(1).max(1)
        };

        Self {
            cpus,
            parallel,
            single: 1,
        }
    }
}

impl Default for PhaseLimits {
    fn default() -> Self {
        Self::from_system(0)
    }
}
