//! Configuration validation
//!
//! Everything here runs before any sampler or permutation is built, so a bad
//! config never costs an O(N) permutation build or a provisioning round trip.

use super::*;
use crate::driver::query::Operation;
use crate::error::ConfigError;
use crate::permutation::shuffle::MAX_SHUFFLE_DOMAIN;
use crate::permutation::PermutationKind;
use anyhow::Result;

/// Validate complete configuration
pub fn validate_config(config: &Config) -> Result<()> {
    validate_zipf(&config.zipf)?;
    validate_runner(&config.runner)?;
    Ok(())
}

/// Validate the workload shape
///
/// The operation kind is checked first, so an unsupported operation is reported
/// even when other fields are also wrong.
pub fn validate_zipf(zipf: &ZipfConfig) -> Result<Operation, ConfigError> {
    let operation: Operation = zipf.operation.parse()?;

    if zipf.index.is_empty() {
        return Err(ConfigError::Empty { field: "index" });
    }
    if zipf.frame.is_empty() {
        return Err(ConfigError::Empty { field: "frame" });
    }

    zipf.bitmap_distribution().validate()?;
    zipf.profile_distribution().validate()?;

    if zipf.permutation == PermutationKind::Shuffle {
        validate_shuffle_domain("bitmap-id-range", zipf.bitmap_id_range)?;
        validate_shuffle_domain("profile-id-range", zipf.profile_id_range)?;
    }

    validate_id_span("base-bitmap-id", zipf.base_bitmap_id, zipf.bitmap_id_range)?;
    validate_id_span("base-profile-id", zipf.base_profile_id, zipf.profile_id_range)?;

    if zipf.iterations == 0 {
        tracing::warn!("iterations is 0; agents will issue no queries");
    }

    Ok(operation)
}

/// Shuffle tables are materialized, so their size is capped
fn validate_shuffle_domain(field: &'static str, range: u64) -> Result<(), ConfigError> {
    if range > MAX_SHUFFLE_DOMAIN {
        return Err(ConfigError::ShuffleDomainTooLarge {
            field,
            value: range,
            max: MAX_SHUFFLE_DOMAIN,
        });
    }
    Ok(())
}

/// `base + range - 1` must still be a valid id
fn validate_id_span(field: &'static str, base: u64, range: u64) -> Result<(), ConfigError> {
    match base.checked_add(range.saturating_sub(1)) {
        Some(_) => Ok(()),
        None => Err(ConfigError::IdOverflow { field, base, range }),
    }
}

/// Validate runner configuration
pub fn validate_runner(runner: &RunnerConfig) -> Result<()> {
    if runner.agents == 0 {
        return Err(ConfigError::Zero {
            field: "agents",
            value: 0,
        }
        .into());
    }
    if runner.hosts.is_empty() {
        return Err(ConfigError::Empty { field: "hosts" }.into());
    }
    if runner.hosts.iter().any(|host| host.trim().is_empty()) {
        anyhow::bail!("hosts must not contain empty entries");
    }
    // in single-agent mode `agents` is the total across all processes
    if let Some(index) = runner.agent_index {
        if index >= runner.agents {
            return Err(ConfigError::AgentIndexOutOfRange {
                index,
                agents: runner.agents,
            }
            .into());
        }
    }
    if runner.deadline_secs == Some(0) {
        return Err(ConfigError::Zero {
            field: "deadline-secs",
            value: 0,
        }
        .into());
    }
    Ok(())
}
