//! zipfbench - Skewed bitmap workload generator
//!
//! zipfbench drives a long, repeatable sequence of `SetBit`/`ClearBit` operations
//! against a two-dimensional id space (row ids and column ids). Ids are drawn from
//! a Zipf-Mandelbrot distribution and then scattered over the whole id range by a
//! seeded permutation, so hot ids are not all clustered near zero.
//!
//! # Architecture
//!
//! - **Distributions**: ratio-to-offset conversion and a rejection-inversion
//!   Zipf-Mandelbrot rank sampler
//! - **Permutations**: seeded bijections (materialized shuffle or Feistel network)
//! - **Driver**: per-agent state machine that samples, permutes, executes and times
//! - **Coordinator**: runs several agents concurrently and merges their stats
//! - **Client**: the execution and provisioning capabilities the driver consumes

pub mod client;
pub mod config;
pub mod coordinator;
pub mod distribution;
pub mod driver;
pub mod error;
pub mod output;
pub mod permutation;
pub mod stats;
pub mod util;

// Re-export commonly used types
pub use config::Config;
pub use driver::{RunReport, WorkloadDriver};
pub use error::ConfigError;

/// Result type used throughout zipfbench
pub type Result<T> = anyhow::Result<T>;
