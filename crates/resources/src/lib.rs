#![deny(clippy::pedantic, unsafe_code)]

//! Concurrency control for update-gotools
//!
//! This crate provides the bounded-parallelism gate every build phase runs
//! under ([`Limiter`]), the helpers it is built on, and the computation of
//! per-phase capacities ([`PhaseLimits`]).

pub mod limiter;
pub mod limits;
pub mod semaphore;

pub use limiter::{Limiter, LimiterPermit};
pub use limits::PhaseLimits;
pub use semaphore::{acquire_semaphore_permit, create_semaphore};
