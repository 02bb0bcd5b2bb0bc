//! Workload driver
//!
//! The [`WorkloadDriver`] is the execution unit of a benchmark. One driver is one
//! agent: it owns two id pipelines (rows and columns), an injected query executor
//! and a latency accumulator, and runs its iterations strictly in order on a
//! single thread.
//!
//! # Lifecycle
//!
//! ```text
//! Uninitialized --configure--> Configured --run--> Running --> Completed
//!                                                          \--> Failed
//!                                                          \--> Cancelled
//! ```
//!
//! 1. **Creation**: `WorkloadDriver::new()` stores config and executor
//! 2. **Configure**: validates the config, derives seeds, builds samplers and
//!    permutations, provisions the index
//! 3. **Run**: samples, permutes, executes and times `iterations` queries
//! 4. **Report**: `run()` returns a [`RunReport`] with stats and any error
//!
//! # Example
//!
//! ```
//! use zipfbench::client::NoopProvisioner;
//! use zipfbench::client::mock::MockExecutor;
//! use zipfbench::config::toml::parse_toml_string;
//! use zipfbench::driver::{DriverState, RunContext, WorkloadDriver};
//!
//! let config = parse_toml_string(r#"
//!     [zipf]
//!     bitmap-id-range = 100
//!     profile-id-range = 1000
//!     iterations = 25
//!     seed = 42
//!     index = "i"
//!     frame = "f"
//!     bitmap-exponent = 1.5
//!     bitmap-ratio = 0.1
//!     profile-exponent = 1.5
//!     profile-ratio = 0.1
//! "#)?;
//!
//! let executor = MockExecutor::new();
//! let mut driver = WorkloadDriver::new(config.zipf, 0, Box::new(executor.clone()));
//! driver.configure("localhost:10101", &NoopProvisioner)?;
//!
//! let report = driver.run(&RunContext::background());
//! assert!(report.is_success());
//! assert_eq!(report.latency.count, 25);
//! assert_eq!(driver.state(), DriverState::Completed);
//! assert_eq!(executor.call_count(), 25);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod context;
pub mod ids;
pub mod query;

pub use context::RunContext;

use crate::client::{Provisioner, QueryExecutor};
use crate::config::validator::validate_zipf;
use crate::config::{ProvisionPolicy, ZipfConfig};
use crate::stats::{LatencyStats, LatencySummary};
use crate::Result;
use ids::{IdGenerator, SeedPlan};
use query::Operation;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Instant;

/// Driver lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriverState {
    Uninitialized,
    Configured,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl fmt::Display for DriverState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DriverState::Uninitialized => "uninitialized",
            DriverState::Configured => "configured",
            DriverState::Running => "running",
            DriverState::Completed => "completed",
            DriverState::Failed => "failed",
            DriverState::Cancelled => "cancelled",
        };
        write!(f, "{}", name)
    }
}

/// Everything `configure` builds
struct Pipelines {
    operation: Operation,
    seeds: SeedPlan,
    bitmap: IdGenerator,
    profile: IdGenerator,
}

/// One benchmark agent
pub struct WorkloadDriver {
    agent_index: usize,
    config: ZipfConfig,
    executor: Box<dyn QueryExecutor>,
    state: DriverState,
    pipelines: Option<Pipelines>,
    stats: LatencyStats,
    iterations_completed: u64,
}

impl WorkloadDriver {
    /// Create an unconfigured driver for agent `agent_index`
    ///
    /// The executor is used for every query this driver issues.
    pub fn new(config: ZipfConfig, agent_index: usize, executor: Box<dyn QueryExecutor>) -> Self {
        Self {
            agent_index,
            config,
            executor,
            state: DriverState::Uninitialized,
            pipelines: None,
            stats: LatencyStats::new(),
            iterations_completed: 0,
        }
    }

    /// Validate, build the id pipelines and provision the index on `host`
    ///
    /// The operation kind is checked before anything else is built. A
    /// provisioning failure is logged and ignored unless the config's
    /// `provision-failure` policy is `abort`.
    ///
    /// # Errors
    ///
    /// Configuration errors are returned as [`crate::ConfigError`] (reachable with
    /// `downcast_ref`). On error the driver moves to [`DriverState::Failed`].
    pub fn configure(&mut self, host: &str, provisioner: &dyn Provisioner) -> Result<()> {
        if self.state != DriverState::Uninitialized {
            anyhow::bail!(
                "agent {}: configure called in state {}",
                self.agent_index,
                self.state
            );
        }

        match self.build_pipelines(host, provisioner) {
            Ok(pipelines) => {
                self.pipelines = Some(pipelines);
                self.state = DriverState::Configured;
                Ok(())
            }
            Err(e) => {
                self.state = DriverState::Failed;
                Err(e)
            }
        }
    }

    fn build_pipelines(&self, host: &str, provisioner: &dyn Provisioner) -> Result<Pipelines> {
        let operation = validate_zipf(&self.config)?;
        let seeds = SeedPlan::for_agent(self.config.seed, self.agent_index);

        let bitmap = IdGenerator::new(
            &self.config.bitmap_distribution(),
            self.config.base_bitmap_id,
            seeds.bitmap_sampler,
            seeds.bitmap_permutation,
            self.config.permutation,
        )?;
        let profile = IdGenerator::new(
            &self.config.profile_distribution(),
            self.config.base_profile_id,
            seeds.profile_sampler,
            seeds.profile_permutation,
            self.config.permutation,
        )?;

        tracing::info!(
            agent = self.agent_index,
            seed = seeds.agent,
            operation = %operation,
            permutation = %self.config.permutation,
            bitmap_offset = bitmap.sampler().offset(),
            profile_offset = profile.sampler().offset(),
            bitmap_permutation_seed = bitmap.permutation().seed(),
            profile_permutation_seed = profile.permutation().seed(),
            "configured workload"
        );

        if let Err(e) = provisioner.provision_index(host, &self.config.index, &self.config.frame) {
            match self.config.provision_failure {
                ProvisionPolicy::Warn => {
                    tracing::warn!(
                        agent = self.agent_index,
                        host,
                        index = %self.config.index,
                        frame = %self.config.frame,
                        "provisioning failed, continuing: {:#}",
                        e
                    );
                }
                ProvisionPolicy::Abort => {
                    return Err(e.context(format!(
                        "Failed to provision index {} frame {} on {}",
                        self.config.index, self.config.frame, host
                    )));
                }
            }
        }

        Ok(Pipelines {
            operation,
            seeds,
            bitmap,
            profile,
        })
    }

    /// Run all iterations and report
    ///
    /// `ctx` is checked before every iteration; once it is cancelled or past its
    /// deadline the loop stops and the report carries the partial stats with
    /// `cancelled` set. The first executor error stops the run immediately and is
    /// recorded in the report; nothing is retried.
    pub fn run(&mut self, ctx: &RunContext) -> RunReport {
        let started = Instant::now();

        if self.state != DriverState::Configured {
            let message = format!(
                "agent {}: run called in state {}, expected configured",
                self.agent_index, self.state
            );
            return self.report(started, Some(message));
        }
        let pipelines = match self.pipelines.as_mut() {
            Some(pipelines) => pipelines,
            None => {
                self.state = DriverState::Failed;
                return self.report(started, Some("driver has no id pipelines".to_string()));
            }
        };

        self.state = DriverState::Running;
        let mut query = String::with_capacity(64);
        let mut error = None;

        for _ in 0..self.config.iterations {
            if ctx.is_done() {
                tracing::info!(
                    agent = self.agent_index,
                    completed = self.iterations_completed,
                    "run cancelled"
                );
                self.state = DriverState::Cancelled;
                break;
            }

            let ids = pipelines
                .bitmap
                .next_id()
                .and_then(|row| Ok((row, pipelines.profile.next_id()?)));
            let (row_id, column_id) = match ids {
                Ok(ids) => ids,
                Err(e) => {
                    // samplers and permutations share domain sizes, so this is a bug
                    error = Some(format!("internal id pipeline error: {}", e));
                    break;
                }
            };

            query.clear();
            pipelines
                .operation
                .write_query(&mut query, &self.config.frame, row_id, column_id);

            let start = Instant::now();
            let result = self.executor.execute(
                ctx,
                &self.config.index,
                &query,
                self.config.allow_redirect,
            );
            let latency = start.elapsed();

            if let Err(e) = result {
                tracing::error!(
                    agent = self.agent_index,
                    iteration = self.iterations_completed,
                    "query failed: {:#}",
                    e
                );
                error = Some(format!("{:#}", e));
                break;
            }

            self.stats.record(latency);
            self.iterations_completed += 1;
        }

        if let Err(e) = self.executor.finish() {
            tracing::error!(agent = self.agent_index, "finishing executor failed: {:#}", e);
            // the first error wins
            error.get_or_insert_with(|| format!("{:#}", e));
        }

        if error.is_some() {
            self.state = DriverState::Failed;
        } else if self.state == DriverState::Running {
            self.state = DriverState::Completed;
        }

        self.report(started, error)
    }

    /// Report for a driver that never got to run
    pub(crate) fn failure_report(&self, error: &anyhow::Error) -> RunReport {
        self.report(Instant::now(), Some(format!("{:#}", error)))
    }

    fn report(&self, started: Instant, error: Option<String>) -> RunReport {
        RunReport {
            name: self.config.name.clone(),
            agent_index: self.agent_index,
            seed: self.pipelines.as_ref().map(|p| p.seeds.agent),
            operation: self.config.operation.clone(),
            iterations_requested: self.config.iterations,
            iterations_completed: self.iterations_completed,
            elapsed_micros: started.elapsed().as_micros() as u64,
            latency: self.stats.summary(),
            error,
            cancelled: self.state == DriverState::Cancelled,
            stats: self.stats.clone(),
        }
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn agent_index(&self) -> usize {
        self.agent_index
    }

    pub fn stats(&self) -> &LatencyStats {
        &self.stats
    }

    /// Seed plan in use, once configured
    pub fn seeds(&self) -> Option<SeedPlan> {
        self.pipelines.as_ref().map(|p| p.seeds)
    }
}

/// Result of one driver run
///
/// `latency` holds the named statistics; `error` is set when the run failed and
/// `cancelled` when it was stopped early by its context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub name: String,
    pub agent_index: usize,
    /// Agent seed (base seed + agent index); absent if the driver never configured
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub operation: String,
    pub iterations_requested: u64,
    pub iterations_completed: u64,
    pub elapsed_micros: u64,
    pub latency: LatencySummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub cancelled: bool,
    /// Full histogram, kept for merging across agents
    #[serde(skip)]
    pub stats: LatencyStats,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Flat name -> value view of the report
    ///
    /// Contains every latency statistic plus `error` (when present) and
    /// `cancelled`.
    pub fn results_map(&self) -> BTreeMap<String, serde_json::Value> {
        let mut results = BTreeMap::new();
        if let Ok(serde_json::Value::Object(latency)) = serde_json::to_value(&self.latency) {
            results.extend(latency);
        }
        results.insert(
            "iterations".to_string(),
            serde_json::Value::from(self.iterations_completed),
        );
        results.insert("cancelled".to_string(), serde_json::Value::from(self.cancelled));
        if let Some(ref error) = self.error {
            results.insert("error".to_string(), serde_json::Value::from(error.as_str()));
        }
        results
    }
}
