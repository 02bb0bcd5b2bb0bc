//! Configuration file parsing
//!
//! TOML is the native format. Files ending in `.json` are read as JSON, either
//! with the same `zipf`/`runner`/`output` structure or as a bare, flat benchmark
//! object (the older JSON benchmark config shape), which gets default `runner`
//! and `output` tables.

use super::*;
use crate::config::cli::Cli;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Parse a configuration file, picking the format from its extension
pub fn parse_config_file(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let is_json = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let parsed = if is_json {
        parse_json_string(&contents)
    } else {
        parse_toml_string(&contents)
    };
    parsed.with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Parse TOML configuration from string
pub fn parse_toml_string(contents: &str) -> Result<Config> {
    let config: Config = ::toml::from_str(contents)
        .context("Failed to parse TOML configuration")?;

    Ok(config)
}

/// Parse JSON configuration from string
///
/// An object with a `zipf` key is a full config; anything else is read as a
/// flat workload definition.
pub fn parse_json_string(contents: &str) -> Result<Config> {
    let value: serde_json::Value = serde_json::from_str(contents)
        .context("Failed to parse JSON configuration")?;

    if value.get("zipf").is_some() {
        let config: Config = serde_json::from_value(value)
            .context("Failed to parse JSON configuration")?;
        return Ok(config);
    }

    let zipf: ZipfConfig = serde_json::from_value(value)
        .context("Failed to parse flat JSON benchmark configuration")?;
    Ok(Config {
        zipf,
        runner: RunnerConfig::default(),
        output: OutputConfig::default(),
    })
}

/// Merge CLI arguments with file configuration (CLI takes precedence)
pub fn merge_cli_with_config(cli: &Cli, mut config: Config) -> Result<Config> {
    if let Some(iterations) = cli.iterations {
        config.zipf.iterations = iterations;
    }
    if let Some(seed) = cli.seed {
        config.zipf.seed = seed;
    }
    if let Some(ref operation) = cli.operation {
        config.zipf.operation = operation.clone();
    }
    if let Some(permutation) = cli.permutation {
        config.zipf.permutation = permutation.into();
    }
    if cli.abort_on_provision_failure {
        config.zipf.provision_failure = ProvisionPolicy::Abort;
    }

    if let Some(agents) = cli.agents {
        config.runner.agents = agents;
    }
    if let Some(agent_index) = cli.agent_index {
        config.runner.agent_index = Some(agent_index);
    }
    if !cli.hosts.is_empty() {
        config.runner.hosts = cli.hosts.clone();
    }
    if let Some(ref deadline) = cli.deadline {
        let seconds = cli::parse_duration(deadline).context("Invalid deadline")?;
        config.runner.deadline_secs = Some(seconds);
    }

    if let Some(ref path) = cli.json_output {
        config.output.json_output = Some(path.clone());
    }
    if let Some(ref path) = cli.query_log {
        config.output.query_log = Some(path.clone());
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;

    const TOML_CONFIG: &str = r#"
[zipf]
base-bitmap-id = 1000
bitmap-id-range = 100
profile-id-range = 1000
iterations = 500
seed = 7
index = "i"
frame = "f"
bitmap-exponent = 1.5
bitmap-ratio = 0.1
profile-exponent = 2.0
profile-ratio = 0.2
operation = "clear"
permutation = "feistel"

[runner]
agents = 3
deadline-secs = 60
"#;

    #[test]
    fn test_parse_toml_string() {
        let config = parse_toml_string(TOML_CONFIG).unwrap();
        assert_eq!(config.zipf.name, "zipf");
        assert_eq!(config.zipf.base_bitmap_id, 1000);
        assert_eq!(config.zipf.base_profile_id, 0);
        assert_eq!(config.zipf.iterations, 500);
        assert_eq!(config.zipf.operation, "clear");
        assert_eq!(config.zipf.permutation, PermutationKind::Feistel);
        assert_eq!(config.zipf.provision_failure, ProvisionPolicy::Warn);
        assert!(config.zipf.allow_redirect);
        assert_eq!(config.runner.agents, 3);
        assert_eq!(config.runner.deadline_secs, Some(60));
        assert_eq!(config.runner.hosts, vec!["localhost:10101".to_string()]);
        assert!(config.output.json_output.is_none());
    }

    #[test]
    fn test_parse_json_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{
                "zipf": {{
                    "name": "zipf-sets",
                    "bitmap-id-range": 100,
                    "profile-id-range": 1000,
                    "iterations": 10,
                    "index": "i",
                    "frame": "f",
                    "bitmap-exponent": 1.01,
                    "bitmap-ratio": 0.01,
                    "profile-exponent": 1.01,
                    "profile-ratio": 0.01
                }},
                "runner": {{ "hosts": ["10.0.0.1:10101"] }}
            }}"#
        )
        .unwrap();

        let config = parse_config_file(file.path()).unwrap();
        assert_eq!(config.zipf.name, "zipf-sets");
        assert_eq!(config.zipf.operation, "set");
        assert_eq!(config.zipf.permutation, PermutationKind::Shuffle);
        assert_eq!(config.runner.hosts, vec!["10.0.0.1:10101".to_string()]);
    }

    #[test]
    fn test_parse_flat_json_benchmark() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{"name":"zipf","base-bitmap-id":0,"base-profile-id":0,"bitmap-id-range":1000,"profile-id-range":100000,"iterations":1000,"seed":-5,"index":"ibench","frame":"fbench","bitmap-exponent":1.01,"bitmap-ratio":0.1,"profile-exponent":1.01,"profile-ratio":0.1,"operation":"clear"}}"#
        )
        .unwrap();

        let config = parse_config_file(file.path()).unwrap();
        assert_eq!(config.zipf.index, "ibench");
        assert_eq!(config.zipf.frame, "fbench");
        assert_eq!(config.zipf.profile_id_range, 100_000);
        assert_eq!(config.zipf.operation, "clear");
        assert_eq!(config.zipf.seed, (-5i64) as u64);
        assert_eq!(config.runner.agents, 1);
        assert!(crate::config::validator::validate_config(&config).is_ok());
    }

    #[test]
    fn test_flat_json_missing_field() {
        let err = parse_json_string(r#"{"bitmap-id-range": 10}"#).unwrap_err();
        assert!(format!("{:#}", err).contains("flat JSON benchmark"));
    }

    #[test]
    fn test_parse_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(TOML_CONFIG.as_bytes()).unwrap();
        let config = parse_config_file(file.path()).unwrap();
        assert_eq!(config.zipf.seed, 7);
    }

    #[test]
    fn test_missing_file() {
        let err = parse_config_file(Path::new("/nonexistent/zipf.toml")).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to read config file"));
    }

    #[test]
    fn test_missing_required_field() {
        let err = parse_toml_string("[zipf]\nbitmap-id-range = 10\n").unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to parse TOML configuration"));
    }

    #[test]
    fn test_cli_overrides_file() {
        let config = parse_toml_string(TOML_CONFIG).unwrap();
        let cli = Cli::parse_from([
            "zipfbench",
            "--config",
            "zipf.toml",
            "--iterations",
            "20",
            "--operation",
            "set",
            "--agents",
            "2",
            "--host",
            "a:1,b:2",
            "--deadline",
            "2m",
            "--abort-on-provision-failure",
        ]);

        let merged = merge_cli_with_config(&cli, config).unwrap();
        assert_eq!(merged.zipf.iterations, 20);
        assert_eq!(merged.zipf.operation, "set");
        assert_eq!(merged.zipf.seed, 7);
        assert_eq!(merged.zipf.provision_failure, ProvisionPolicy::Abort);
        assert_eq!(merged.runner.agents, 2);
        assert_eq!(merged.runner.hosts, vec!["a:1".to_string(), "b:2".to_string()]);
        assert_eq!(merged.runner.deadline_secs, Some(120));
    }
}
