//! Native implementation backed by `tokio::process`

pub mod process;

pub use process::NativeProcessOperations;
