//! CLI argument parsing using clap

use crate::permutation::PermutationKind;
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// zipfbench - skewed SetBit/ClearBit workload generator
#[derive(Parser, Debug)]
#[command(name = "zipfbench")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Benchmark configuration file (.toml or .json)
    #[arg(short = 'c', long, env = "ZIPFBENCH_CONFIG")]
    pub config: PathBuf,

    // === Workload Overrides ===
    /// Queries per agent
    #[arg(short = 'i', long)]
    pub iterations: Option<u64>,

    /// Base seed (agent N uses seed + N)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Operation: set or clear
    #[arg(long)]
    pub operation: Option<String>,

    /// Permutation construction
    #[arg(long, value_enum)]
    pub permutation: Option<PermutationArg>,

    /// Fail configuration when index/frame provisioning fails
    #[arg(long)]
    pub abort_on_provision_failure: bool,

    // === Runner Options ===
    /// Number of agents (total across processes when --agent-index is set)
    #[arg(short = 'a', long)]
    pub agents: Option<usize>,

    /// Run only this agent index, below --agents (one agent per process in distributed runs)
    #[arg(long)]
    pub agent_index: Option<usize>,

    /// Target hosts (comma-separated, e.g., "10.0.1.10:10101,10.0.1.11:10101")
    #[arg(long = "host", value_delimiter = ',')]
    pub hosts: Vec<String>,

    /// Stop after this long (e.g., 30s, 5m, 1h)
    #[arg(short = 'd', long)]
    pub deadline: Option<String>,

    // === Output Options ===
    /// Write the JSON report to this file
    #[arg(long)]
    pub json_output: Option<PathBuf>,

    /// Write every query to this file ("-" for stdout)
    #[arg(long)]
    pub query_log: Option<PathBuf>,

    /// Validate the configuration and exit
    #[arg(long)]
    pub dry_run: bool,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

/// Permutation construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PermutationArg {
    /// Materialized seeded shuffle
    Shuffle,
    /// Keyed Feistel network (constant memory)
    Feistel,
}

impl From<PermutationArg> for PermutationKind {
    fn from(arg: PermutationArg) -> Self {
        match arg {
            PermutationArg::Shuffle => PermutationKind::Shuffle,
            PermutationArg::Feistel => PermutationKind::Feistel,
        }
    }
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Checks that do not need the config file
    pub fn validate(&self) -> Result<()> {
        if self.agents == Some(0) {
            anyhow::bail!("agents must be at least 1");
        }
        if let Some(ref deadline) = self.deadline {
            if parse_duration(deadline)? == 0 {
                anyhow::bail!("deadline must be greater than zero");
            }
        }
        Ok(())
    }
}

/// Parse a duration string (e.g., "30s", "5m", "1h") to seconds
pub fn parse_duration(s: &str) -> Result<u64> {
    let s = s.trim().to_lowercase();

    let (num_str, multiplier) = if s.ends_with("sec") || s.ends_with('s') {
        (s.trim_end_matches("sec").trim_end_matches('s'), 1u64)
    } else if s.ends_with("min") || s.ends_with('m') {
        (s.trim_end_matches("min").trim_end_matches('m'), 60)
    } else if s.ends_with("hr") || s.ends_with('h') {
        (s.trim_end_matches("hr").trim_end_matches('h'), 3600)
    } else {
        (s.as_str(), 1)
    };

    let num: u64 = num_str
        .parse()
        .with_context(|| format!("Invalid duration format: {}", s))?;

    num.checked_mul(multiplier)
        .with_context(|| format!("Duration too large: {}", s))
}
