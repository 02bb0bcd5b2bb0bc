//! Typed errors for configuration and permutation failures
//!
//! Everything else in the crate propagates `anyhow::Error`; these variants exist
//! so callers (and tests) can match on the exact configuration problem.

use thiserror::Error;

/// Invalid benchmark configuration, detected before any sampling occurs
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("Unsupported operation: \"{0}\" (must be \"set\" or \"clear\")")]
    UnsupportedOperation(String),

    #[error("{field} must be strictly between 0 and 1, got {value}")]
    InvalidRatio { field: &'static str, value: f64 },

    #[error("{field} {requirement}, got {value}")]
    InvalidExponent {
        field: &'static str,
        value: f64,
        requirement: &'static str,
    },

    #[error("{field} must be at least {min}, got {value}")]
    InvalidDomainSize {
        field: &'static str,
        value: u64,
        min: u64,
    },

    #[error("{field}: base id {base} + range {range} overflows the 64-bit id space")]
    IdOverflow {
        field: &'static str,
        base: u64,
        range: u64,
    },

    #[error("zipf offset {offset} is unusable with exponent {exponent}")]
    DegenerateShape { exponent: f64, offset: f64 },

    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("{field} must be at least 1, got {value}")]
    Zero { field: &'static str, value: u64 },

    #[error("{field} = {value} is too large for the shuffle permutation (max {max}); set permutation = \"feistel\"")]
    ShuffleDomainTooLarge {
        field: &'static str,
        value: u64,
        max: u64,
    },

    #[error("agent-index {index} is out of range for {agents} agents")]
    AgentIndexOutOfRange { index: usize, agents: usize },
}

/// Errors raised by [`crate::permutation::PermutationGenerator`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PermutationError {
    #[error("permutation domain must contain at least one id")]
    EmptyDomain,

    #[error("rank {rank} is outside the permutation domain [0, {domain_size})")]
    RankOutOfRange { rank: u64, domain_size: u64 },

    #[error("shuffle permutation supports at most {max} ids, got {domain_size}; use the feistel permutation")]
    DomainTooLarge { domain_size: u64, max: u64 },

    #[error("failed to allocate a shuffle table for {domain_size} ids")]
    TableAllocation { domain_size: u64 },
}
