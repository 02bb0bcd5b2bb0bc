//! JSON output formatting
//!
//! The JSON report wraps the coordinator's [`AggregateReport`] with run metadata
//! (host, timestamps, effective config) so result files from several machines
//! can be collected and compared later.

use crate::config::Config;
use crate::coordinator::AggregateReport;
use crate::Result;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Run metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRunInfo {
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    pub start_time: String,
    pub end_time: String,
    pub config: Config,
}

/// Complete JSON report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonReport {
    pub run: JsonRunInfo,
    pub results: AggregateReport,
}

impl JsonReport {
    pub fn new(config: &Config, results: &AggregateReport) -> Self {
        Self {
            run: JsonRunInfo {
                version: env!("CARGO_PKG_VERSION").to_string(),
                hostname: local_hostname(),
                start_time: results.started_at.clone(),
                end_time: chrono::Utc::now().to_rfc3339(),
                config: config.clone(),
            },
            results: results.clone(),
        }
    }
}

fn local_hostname() -> Option<String> {
    hostname::get().ok().and_then(|name| name.into_string().ok())
}

/// Write the report to `output_path`
pub fn write_json_output(output_path: &Path, report: &JsonReport, pretty: bool) -> Result<()> {
    let file = File::create(output_path)
        .with_context(|| format!("Failed to create JSON output {}", output_path.display()))?;
    let writer = BufWriter::new(file);

    if pretty {
        serde_json::to_writer_pretty(writer, report)?;
    } else {
        serde_json::to_writer(writer, report)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::mock::MockExecutor;
    use crate::client::{NoopProvisioner, QueryExecutor};
    use crate::config::test_support::test_config;
    use crate::coordinator::Coordinator;
    use crate::driver::RunContext;
    use tempfile::TempDir;

    fn run() -> (Config, AggregateReport) {
        let config = test_config();
        let report = Coordinator::new(config.clone())
            .run(&RunContext::background(), &NoopProvisioner, |_| {
                Ok(Box::new(MockExecutor::new()) as Box<dyn QueryExecutor>)
            })
            .unwrap();
        (config, report)
    }

    #[test]
    fn test_write_and_read_back() {
        let (config, results) = run();
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.json");

        write_json_output(&path, &JsonReport::new(&config, &results), true).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["results"]["latency"]["count"], 10);
        assert_eq!(value["results"]["agents"][0]["seed"], 42);
        assert_eq!(value["run"]["config"]["zipf"]["bitmap-id-range"], 100);
        assert!(value["results"]["agents"][0].get("error").is_none());

        let parsed: JsonReport = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed.results.iterations_completed, 10);
    }

    #[test]
    fn test_unwritable_path() {
        let (config, results) = run();
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("report.json");
        let err = write_json_output(&path, &JsonReport::new(&config, &results), false).unwrap_err();
        assert!(err.to_string().contains("Failed to create JSON output"));
    }
}
