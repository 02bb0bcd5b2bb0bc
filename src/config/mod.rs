//! Configuration module
//!
//! Handles CLI argument parsing, TOML/JSON configuration files, and validation.
//!
//! A config file has three tables:
//!
//! ```toml
//! [zipf]
//! bitmap-id-range = 1000000
//! profile-id-range = 10000000
//! iterations = 100000
//! seed = 1
//! index = "i"
//! frame = "f"
//! bitmap-exponent = 1.01
//! bitmap-ratio = 0.01
//! profile-exponent = 1.01
//! profile-ratio = 0.01
//! operation = "set"
//!
//! [runner]
//! hosts = ["localhost:10101"]
//! agents = 4
//!
//! [output]
//! json-output = "results.json"
//! ```

pub mod cli;
pub mod toml;
pub mod validator;

use crate::distribution::{DistributionConfig, Domain};
use crate::permutation::PermutationKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Complete benchmark configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub zipf: ZipfConfig,
    #[serde(default)]
    pub runner: RunnerConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Workload shape shared by every agent
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ZipfConfig {
    /// Benchmark name carried into reports
    #[serde(default = "default_name")]
    pub name: String,
    /// Added to every permuted row id
    #[serde(default)]
    pub base_bitmap_id: u64,
    /// Added to every permuted column id
    #[serde(default)]
    pub base_profile_id: u64,
    /// Number of distinct row ids
    pub bitmap_id_range: u64,
    /// Number of distinct column ids
    pub profile_id_range: u64,
    /// Queries issued per agent
    pub iterations: u64,
    /// Base seed; agent N uses seed + N
    ///
    /// Negative seeds are accepted and reinterpreted as their two's complement,
    /// so `seed + N` wraps exactly like signed 64-bit addition would.
    #[serde(default, deserialize_with = "deserialize_seed")]
    pub seed: u64,
    pub index: String,
    pub frame: String,
    pub bitmap_exponent: f64,
    pub bitmap_ratio: f64,
    pub profile_exponent: f64,
    pub profile_ratio: f64,
    /// "set" or "clear"
    #[serde(default = "default_operation")]
    pub operation: String,
    #[serde(default)]
    pub permutation: PermutationKind,
    /// What to do when index/frame provisioning fails
    #[serde(default)]
    pub provision_failure: ProvisionPolicy,
    /// Let the service forward queries to the owning node
    #[serde(default = "default_allow_redirect")]
    pub allow_redirect: bool,
}

fn deserialize_seed<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Seed {
        Unsigned(u64),
        Signed(i64),
    }

    Ok(match Seed::deserialize(deserializer)? {
        Seed::Unsigned(seed) => seed,
        Seed::Signed(seed) => seed as u64,
    })
}

fn default_name() -> String {
    "zipf".to_string()
}

fn default_operation() -> String {
    "set".to_string()
}

fn default_allow_redirect() -> bool {
    true
}

impl ZipfConfig {
    pub fn bitmap_distribution(&self) -> DistributionConfig {
        DistributionConfig::new(
            Domain::Bitmap,
            self.bitmap_id_range,
            self.bitmap_exponent,
            self.bitmap_ratio,
        )
    }

    pub fn profile_distribution(&self) -> DistributionConfig {
        DistributionConfig::new(
            Domain::Profile,
            self.profile_id_range,
            self.profile_exponent,
            self.profile_ratio,
        )
    }
}

/// Provisioning failure handling
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProvisionPolicy {
    /// Log the failure and keep going (the index usually already exists)
    Warn,
    /// Treat the failure as a configuration error
    Abort,
}

impl Default for ProvisionPolicy {
    fn default() -> Self {
        Self::Warn
    }
}

impl fmt::Display for ProvisionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProvisionPolicy::Warn => write!(f, "warn"),
            ProvisionPolicy::Abort => write!(f, "abort"),
        }
    }
}

/// How agents are run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RunnerConfig {
    /// Target hosts; the first one is used for provisioning
    #[serde(default = "default_hosts")]
    pub hosts: Vec<String>,
    /// Number of agents; with `agent-index` set, the total across all processes
    #[serde(default = "default_agents")]
    pub agents: usize,
    /// Run only this agent (distributed mode: one agent per process); must be
    /// below `agents`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_index: Option<usize>,
    /// Stop every agent after this many seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline_secs: Option<u64>,
}

fn default_hosts() -> Vec<String> {
    vec!["localhost:10101".to_string()]
}

fn default_agents() -> usize {
    1
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            hosts: default_hosts(),
            agents: default_agents(),
            agent_index: None,
            deadline_secs: None,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Write the JSON report here
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json_output: Option<PathBuf>,
    /// Write every query here ("-" for stdout) instead of discarding it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_log: Option<PathBuf>,
}
