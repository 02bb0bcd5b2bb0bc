//! zipfbench CLI entry point

use anyhow::{Context, Result};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use zipfbench::client::query_log::{NullExecutor, QueryLog};
use zipfbench::client::{NoopProvisioner, QueryExecutor};
use zipfbench::config::cli::Cli;
use zipfbench::config::toml::{merge_cli_with_config, parse_config_file};
use zipfbench::config::validator::validate_config;
use zipfbench::coordinator::Coordinator;
use zipfbench::driver::RunContext;
use zipfbench::output::json::{write_json_output, JsonReport};
use zipfbench::output::text::{print_configuration, print_results};

fn main() -> Result<()> {
    let cli = Cli::parse_args();
    cli.validate()?;
    init_logging(cli.verbose);

    let config = parse_config_file(&cli.config)?;
    let config = merge_cli_with_config(&cli, config)?;
    validate_config(&config).context("Configuration validation failed")?;

    println!("zipfbench v{}", env!("CARGO_PKG_VERSION"));
    println!();
    print_configuration(&config);

    if cli.dry_run {
        println!();
        println!("Dry run mode - configuration validated successfully");
        return Ok(());
    }
    println!();

    let ctx = match config.runner.deadline_secs {
        Some(secs) => RunContext::with_timeout(Duration::from_secs(secs)),
        None => RunContext::background(),
    };

    let coordinator = Coordinator::new(config.clone());
    let agent_count = coordinator.agent_indices().len();
    let query_log = config.output.query_log.clone();

    let report = coordinator.run(&ctx, &NoopProvisioner, |agent| {
        make_executor(query_log.as_deref(), agent, agent_count)
    })?;

    print_results(&report);

    if let Some(ref path) = config.output.json_output {
        write_json_output(path, &JsonReport::new(&config, &report), true)?;
        println!();
        println!("JSON report written to {}", path.display());
    }

    if !report.is_success() {
        anyhow::bail!("{} of {} agents failed", report.failed_agents, report.agents.len());
    }
    Ok(())
}

/// Logs go to stderr so a query log on stdout stays clean
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Executor for one agent
///
/// Without a query log, queries are discarded. `-` logs to stdout; a file path
/// gets an `.agent<N>` suffix when more than one agent runs in this process.
fn make_executor(
    query_log: Option<&Path>,
    agent: usize,
    agent_count: usize,
) -> Result<Box<dyn QueryExecutor>> {
    let path = match query_log {
        None => return Ok(Box::new(NullExecutor)),
        Some(path) if path == Path::new("-") => {
            return Ok(Box::new(QueryLog::new(std::io::stdout())));
        }
        Some(path) => path,
    };

    let path = if agent_count > 1 {
        let mut name = path.as_os_str().to_owned();
        name.push(format!(".agent{}", agent));
        PathBuf::from(name)
    } else {
        path.to_path_buf()
    };

    let file = File::create(&path)
        .with_context(|| format!("Failed to create query log {}", path.display()))?;
    tracing::debug!(agent, path = %path.display(), "writing query log");
    Ok(Box::new(QueryLog::new(BufWriter::new(file))))
}
