//! Statistics collection
//!
//! Each driver owns one [`LatencyStats`] and records the wall-clock latency of
//! every query it issues. Stats from several agents are merged by the coordinator
//! into a single view, and [`LatencySummary`] is the serializable snapshot that
//! ends up in the run report.
//!
//! # Example
//!
//! ```
//! use zipfbench::stats::LatencyStats;
//! use std::time::Duration;
//!
//! let mut stats = LatencyStats::new();
//! stats.record(Duration::from_micros(100));
//! stats.record(Duration::from_micros(300));
//!
//! let summary = stats.summary();
//! assert_eq!(summary.count, 2);
//! assert_eq!(summary.total_micros, 400);
//! ```

pub mod histogram;

use crate::Result;
use histogram::LatencyHistogram;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Running latency accumulator
#[derive(Debug, Clone, Default)]
pub struct LatencyStats {
    histogram: LatencyHistogram,
    total: Duration,
}

impl LatencyStats {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn record(&mut self, latency: Duration) {
        self.histogram.record(latency);
        self.total += latency;
    }

    pub fn count(&self) -> u64 {
        self.histogram.len()
    }

    /// Sum of all recorded latencies (exact, not histogram-rounded)
    pub fn total(&self) -> Duration {
        self.total
    }

    pub fn histogram(&self) -> &LatencyHistogram {
        &self.histogram
    }

    pub fn merge(&mut self, other: &LatencyStats) -> Result<()> {
        self.histogram.merge(&other.histogram)?;
        self.total += other.total;
        Ok(())
    }

    pub fn summary(&self) -> LatencySummary {
        let micros = |d: Option<Duration>| d.map(|d| d.as_micros() as u64);
        let mean = if self.count() == 0 {
            None
        } else {
            Some((self.total.as_micros() / self.count() as u128) as u64)
        };

        LatencySummary {
            count: self.count(),
            total_micros: self.total.as_micros() as u64,
            mean_micros: mean,
            min_micros: micros(self.histogram.min()),
            max_micros: micros(self.histogram.max()),
            p50_micros: micros(self.histogram.percentile(50.0)),
            p90_micros: micros(self.histogram.percentile(90.0)),
            p95_micros: micros(self.histogram.percentile(95.0)),
            p99_micros: micros(self.histogram.percentile(99.0)),
            p99_9_micros: micros(self.histogram.percentile(99.9)),
        }
    }
}

/// Named latency statistics, all in microseconds
///
/// Everything but `count` and `total_micros` is absent when no query completed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatencySummary {
    pub count: u64,
    pub total_micros: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean_micros: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_micros: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_micros: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p50_micros: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p90_micros: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p95_micros: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p99_micros: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p99_9_micros: Option<u64>,
}
