#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Package installation for update-gotools
//!
//! One package install is three steps run through the platform's process
//! layer: fetch the source, optionally pin the checkout to a git reference,
//! and build it.

mod installer;
mod spec;
mod step;

pub use installer::PackageInstaller;
pub use spec::{is_unpinned, PackageSpec, UNPINNED_VERSIONS};
pub use step::InstallStep;

// Re-export EventSender for callers wiring up installers
pub use gotools_events::EventSender;
