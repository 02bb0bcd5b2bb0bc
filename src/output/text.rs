//! Human-readable text output

use crate::config::Config;
use crate::coordinator::AggregateReport;
use crate::stats::LatencySummary;
use crate::util::time::{calculate_rate, format_micros, format_rate};
use std::fmt::Write;
use std::time::Duration;

/// Print the configuration a run is about to use
pub fn print_configuration(config: &Config) {
    print!("{}", render_configuration(config));
}

/// Print run results to stdout
pub fn print_results(report: &AggregateReport) {
    print!("{}", render_results(report));
}

pub fn render_configuration(config: &Config) -> String {
    let zipf = &config.zipf;
    let mut out = String::new();
    let _ = writeln!(out, "Workload: {}", zipf.name);
    let _ = writeln!(
        out,
        "  Operation:   {} on index '{}' frame '{}'",
        zipf.operation, zipf.index, zipf.frame
    );
    let _ = writeln!(out, "  Iterations:  {} per agent", zipf.iterations);
    let _ = writeln!(
        out,
        "  Rows:        [{}, +{}) exponent {} ratio {}",
        zipf.base_bitmap_id, zipf.bitmap_id_range, zipf.bitmap_exponent, zipf.bitmap_ratio
    );
    let _ = writeln!(
        out,
        "  Columns:     [{}, +{}) exponent {} ratio {}",
        zipf.base_profile_id, zipf.profile_id_range, zipf.profile_exponent, zipf.profile_ratio
    );
    let _ = writeln!(out, "  Permutation: {}", zipf.permutation);
    let _ = writeln!(out, "  Seed:        {}", zipf.seed);
    match config.runner.agent_index {
        Some(index) => {
            let _ = writeln!(out, "  Agent:       {} (single)", index);
        }
        None => {
            let _ = writeln!(out, "  Agents:      {}", config.runner.agents);
        }
    }
    let _ = writeln!(out, "  Hosts:       {}", config.runner.hosts.join(","));
    if let Some(secs) = config.runner.deadline_secs {
        let _ = writeln!(out, "  Deadline:    {}s", secs);
    }
    out
}

pub fn render_results(report: &AggregateReport) -> String {
    let mut out = String::new();
    let elapsed = Duration::from_micros(report.elapsed_micros);

    let _ = writeln!(out, "═══════════════════════════════════════════════════════════");
    let _ = writeln!(out, "                    RESULTS: {}", report.name);
    let _ = writeln!(out, "═══════════════════════════════════════════════════════════");
    let _ = writeln!(out);
    let _ = writeln!(out, "Elapsed Time: {:.3}s", elapsed.as_secs_f64());
    let _ = writeln!(
        out,
        "Queries:      {} ({} QPS)",
        report.iterations_completed,
        format_rate(calculate_rate(report.iterations_completed, elapsed))
    );
    if report.cancelled {
        let _ = writeln!(out, "Stopped early by deadline or cancellation");
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "Latency:");
    write_latency(&mut out, &report.latency);

    if report.agents.len() > 1 || !report.is_success() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Agents:");
        for agent in &report.agents {
            let status = match (&agent.error, agent.cancelled) {
                (Some(error), _) => format!("FAILED: {}", error),
                (None, true) => "cancelled".to_string(),
                (None, false) => "ok".to_string(),
            };
            let _ = writeln!(
                out,
                "  [{}] {}/{} queries, mean {} - {}",
                agent.agent_index,
                agent.iterations_completed,
                agent.iterations_requested,
                agent
                    .latency
                    .mean_micros
                    .map(format_micros)
                    .unwrap_or_else(|| "-".to_string()),
                status
            );
        }
    }
    out
}

fn write_latency(out: &mut String, latency: &LatencySummary) {
    if latency.count == 0 {
        let _ = writeln!(out, "  No latency data collected");
        return;
    }

    let rows = [
        ("Min", latency.min_micros),
        ("Mean", latency.mean_micros),
        ("Max", latency.max_micros),
        ("p50", latency.p50_micros),
        ("p90", latency.p90_micros),
        ("p95", latency.p95_micros),
        ("p99", latency.p99_micros),
        ("p99.9", latency.p99_9_micros),
    ];
    for (name, value) in rows {
        if let Some(micros) = value {
            let _ = writeln!(out, "  {:<6} {}", format!("{}:", name), format_micros(micros));
        }
    }
}
