//! Process execution layer for update-gotools.
//!
//! Every external command (hook commands, `go get`, `git fetch`, `git reset`,
//! `go install`) goes through [`ProcessOperations`]. The native
//! implementation streams stdout/stderr line by line into the event
//! channel so output stays attributed to the command or package that
//! produced it, and honours cooperative cancellation by killing the child.

pub mod core;
pub mod implementations;
pub mod process;

pub use core::{Platform, PlatformContext};
pub use implementations::native::NativeProcessOperations;
pub use process::{PlatformCommand, ProcessOperations};
