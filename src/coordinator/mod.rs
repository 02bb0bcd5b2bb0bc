//! Agent coordinator
//!
//! Runs one or more [`WorkloadDriver`]s concurrently in this process. Each agent
//! gets its own executor from a factory and its own thread; the only thing they
//! share is the [`RunContext`], so a deadline or cancellation stops them all.
//!
//! With `runner.agent-index` set only that single agent runs, which is how a run
//! is spread over several processes or machines: every process gets the same
//! config and a different index below `agents`, and agent seeds stay distinct.

use crate::client::{Provisioner, QueryExecutor};
use crate::config::Config;
use crate::driver::{RunContext, RunReport, WorkloadDriver};
use crate::stats::{LatencyStats, LatencySummary};
use crate::Result;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Combined result of every agent in this process
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateReport {
    pub name: String,
    /// RFC 3339 start time
    pub started_at: String,
    pub elapsed_micros: u64,
    pub agents: Vec<RunReport>,
    /// Latency over all agents
    pub latency: LatencySummary,
    pub iterations_completed: u64,
    pub failed_agents: usize,
    pub cancelled: bool,
}

impl AggregateReport {
    pub fn is_success(&self) -> bool {
        self.failed_agents == 0
    }
}

pub struct Coordinator {
    config: Config,
}

impl Coordinator {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Agent indices this process runs
    pub fn agent_indices(&self) -> Vec<usize> {
        match self.config.runner.agent_index {
            Some(index) => vec![index],
            None => (0..self.config.runner.agents).collect(),
        }
    }

    /// Run every agent to completion
    ///
    /// `make_executor` is called once per agent index, on this thread, before any
    /// agent starts. Agents configure (provisioning against the first host) and
    /// run on their own threads. A failing agent does not stop the others; its
    /// error ends up in its report.
    pub fn run<F>(
        &self,
        ctx: &RunContext,
        provisioner: &(dyn Provisioner + Sync),
        make_executor: F,
    ) -> Result<AggregateReport>
    where
        F: Fn(usize) -> Result<Box<dyn QueryExecutor>>,
    {
        let host = self
            .config
            .runner
            .hosts
            .first()
            .context("No hosts configured")?
            .as_str();

        let mut drivers = Vec::new();
        for agent in self.agent_indices() {
            let executor = make_executor(agent)
                .with_context(|| format!("Failed to create executor for agent {}", agent))?;
            drivers.push(WorkloadDriver::new(self.config.zipf.clone(), agent, executor));
        }

        tracing::info!(
            agents = drivers.len(),
            iterations = self.config.zipf.iterations,
            seed = self.config.zipf.seed,
            "starting run"
        );

        let started_at = chrono::Utc::now();
        let started = Instant::now();

        let results = crossbeam::scope(|scope| {
            let handles: Vec<_> = drivers
                .into_iter()
                .map(|mut driver| {
                    scope.spawn(move |_| match driver.configure(host, provisioner) {
                        Ok(()) => driver.run(ctx),
                        Err(e) => {
                            tracing::error!(agent = driver.agent_index(), "configure failed: {:#}", e);
                            driver.failure_report(&e)
                        }
                    })
                })
                .collect();

            handles
                .into_iter()
                .map(|handle| handle.join())
                .collect::<Vec<_>>()
        })
        .map_err(|_| anyhow::anyhow!("Agent thread panicked"))?;

        let mut agents = Vec::with_capacity(results.len());
        for result in results {
            agents.push(result.map_err(|_| anyhow::anyhow!("Agent thread panicked"))?);
        }

        let elapsed = started.elapsed();
        let mut merged = LatencyStats::new();
        for report in &agents {
            merged.merge(&report.stats)?;
        }

        let failed_agents = agents.iter().filter(|r| !r.is_success()).count();
        let report = AggregateReport {
            name: self.config.zipf.name.clone(),
            started_at: started_at.to_rfc3339(),
            elapsed_micros: elapsed.as_micros() as u64,
            latency: merged.summary(),
            iterations_completed: agents.iter().map(|r| r.iterations_completed).sum(),
            failed_agents,
            cancelled: agents.iter().any(|r| r.cancelled),
            agents,
        };

        tracing::info!(
            completed = report.iterations_completed,
            failed_agents,
            elapsed_ms = elapsed.as_millis() as u64,
            "run finished"
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::mock::{MockExecutor, MockProvisioner};
    use crate::client::NoopProvisioner;
    use crate::config::test_support::test_config;
    use std::collections::HashMap;
    use std::time::Duration;

    /// One MockExecutor per agent, kept so tests can inspect them afterwards
    fn mocks(n: usize) -> HashMap<usize, MockExecutor> {
        (0..n).map(|agent| (agent, MockExecutor::new())).collect()
    }

    fn factory(
        mocks: &HashMap<usize, MockExecutor>,
    ) -> impl Fn(usize) -> Result<Box<dyn QueryExecutor>> + '_ {
        move |agent| {
            let mock = mocks.get(&agent).context("unexpected agent")?;
            Ok(Box::new(mock.clone()) as Box<dyn QueryExecutor>)
        }
    }

    #[test]
    fn test_runs_all_agents() {
        let mut config = test_config();
        config.runner.agents = 3;
        let executors = mocks(3);

        let report = Coordinator::new(config)
            .run(&RunContext::background(), &NoopProvisioner, factory(&executors))
            .unwrap();

        assert!(report.is_success());
        assert_eq!(report.agents.len(), 3);
        assert_eq!(report.iterations_completed, 30);
        assert_eq!(report.latency.count, 30);
        let indices: Vec<usize> = report.agents.iter().map(|r| r.agent_index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        for mock in executors.values() {
            assert_eq!(mock.call_count(), 10);
        }
        assert_ne!(
            executors[&0].executed_queries(),
            executors[&1].executed_queries()
        );
    }

    #[test]
    fn test_single_agent_index() {
        let mut config = test_config();
        config.runner.agents = 4;
        config.runner.agent_index = Some(2);
        let coordinator = Coordinator::new(config);
        assert_eq!(coordinator.agent_indices(), vec![2]);

        let executors = mocks(3);
        let report = coordinator
            .run(&RunContext::background(), &NoopProvisioner, factory(&executors))
            .unwrap();
        assert_eq!(report.agents.len(), 1);
        assert_eq!(report.agents[0].seed, Some(44));
        assert_eq!(executors[&2].call_count(), 10);
        assert_eq!(executors[&0].call_count(), 0);
    }

    #[test]
    fn test_failed_agent_does_not_stop_others() {
        let mut config = test_config();
        config.runner.agents = 2;
        let executors = mocks(2);
        executors[&1].set_fail_on_call(3);

        let report = Coordinator::new(config)
            .run(&RunContext::background(), &NoopProvisioner, factory(&executors))
            .unwrap();

        assert!(!report.is_success());
        assert_eq!(report.failed_agents, 1);
        assert!(report.agents[0].is_success());
        assert_eq!(report.agents[0].iterations_completed, 10);
        assert_eq!(report.agents[1].iterations_completed, 2);
        assert_eq!(report.iterations_completed, 12);
    }

    #[test]
    fn test_configure_failure_is_reported_per_agent() {
        let mut config = test_config();
        config.zipf.operation = "flip".to_string();
        config.runner.agents = 2;
        let executors = mocks(2);
        let provisioner = MockProvisioner::new();

        let report = Coordinator::new(config)
            .run(&RunContext::background(), &provisioner, factory(&executors))
            .unwrap();

        assert_eq!(report.failed_agents, 2);
        for agent in &report.agents {
            assert!(agent.error.as_deref().unwrap().contains("flip"));
        }
        assert!(provisioner.calls().is_empty());
        assert_eq!(executors[&0].call_count(), 0);
    }

    #[test]
    fn test_provisions_first_host() {
        let mut config = test_config();
        config.runner.hosts = vec!["a:1".to_string(), "b:2".to_string()];
        let executors = mocks(1);
        let provisioner = MockProvisioner::new();

        Coordinator::new(config)
            .run(&RunContext::background(), &provisioner, factory(&executors))
            .unwrap();
        assert_eq!(provisioner.calls()[0].host, "a:1");
    }

    #[test]
    fn test_factory_error_propagates() {
        let result = Coordinator::new(test_config()).run(
            &RunContext::background(),
            &NoopProvisioner,
            |_| anyhow::bail!("no executor"),
        );
        let err = result.unwrap_err();
        assert!(format!("{:#}", err).contains("no executor"));
    }

    #[test]
    fn test_deadline_cancels_all_agents() {
        let mut config = test_config();
        config.zipf.iterations = 1_000_000;
        config.runner.agents = 2;
        let executors = mocks(2);
        for mock in executors.values() {
            mock.set_delay(Duration::from_millis(2));
        }

        let report = Coordinator::new(config)
            .run(
                &RunContext::with_timeout(Duration::from_millis(50)),
                &NoopProvisioner,
                factory(&executors),
            )
            .unwrap();

        assert!(report.cancelled);
        assert!(report.is_success());
        assert!(report.agents.iter().all(|r| r.cancelled));
        assert!(report.iterations_completed < 2_000_000);
    }
}
