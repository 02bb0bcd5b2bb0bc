//! Latency histogram using HdrHistogram
//!
//! Wraps the HdrHistogram library for tracking query latencies with high
//! precision and constant-time recording.
//!
//! # Example
//!
//! ```
//! use zipfbench::stats::histogram::LatencyHistogram;
//! use std::time::Duration;
//!
//! let mut hist = LatencyHistogram::new();
//! hist.record(Duration::from_micros(100));
//! hist.record(Duration::from_micros(150));
//! hist.record(Duration::from_micros(200));
//!
//! let p50 = hist.percentile(50.0).unwrap();
//! assert!(p50 >= Duration::from_micros(149) && p50 <= Duration::from_micros(151));
//! ```

use crate::Result;
use anyhow::Context;
use hdrhistogram::Histogram;
use std::time::Duration;

/// Highest trackable latency: 1 hour in nanoseconds
const MAX_TRACKABLE_NANOS: u64 = 3_600_000_000_000;

/// Latency histogram wrapper
///
/// Tracks latencies from 1 nanosecond to 1 hour with 3 significant digits, so
/// every reported value is within 0.1% of the recorded one.
#[derive(Debug, Clone)]
pub struct LatencyHistogram {
    histogram: Histogram<u64>,
}

impl LatencyHistogram {
    pub fn new() -> Self {
        let histogram = Histogram::new_with_bounds(1, MAX_TRACKABLE_NANOS, 3)
            .expect("Failed to create histogram with valid bounds");

        Self { histogram }
    }

    /// Record a latency sample, clamped to the trackable range
    #[inline]
    pub fn record(&mut self, latency: Duration) {
        let nanos = latency.as_nanos().min(MAX_TRACKABLE_NANOS as u128) as u64;
        let value = nanos.max(1);
        // value is clamped into bounds, so recording cannot fail
        let _ = self.histogram.record(value);
    }

    /// Latency at `percentile` (0.0 - 100.0), or None if nothing was recorded
    pub fn percentile(&self, percentile: f64) -> Option<Duration> {
        if self.histogram.is_empty() {
            return None;
        }
        Some(Duration::from_nanos(self.histogram.value_at_percentile(percentile)))
    }

    pub fn min(&self) -> Option<Duration> {
        if self.histogram.is_empty() {
            return None;
        }
        Some(Duration::from_nanos(self.histogram.min()))
    }

    pub fn max(&self) -> Option<Duration> {
        if self.histogram.is_empty() {
            return None;
        }
        Some(Duration::from_nanos(self.histogram.max()))
    }

    pub fn len(&self) -> u64 {
        self.histogram.len()
    }

    pub fn is_empty(&self) -> bool {
        self.histogram.is_empty()
    }

    /// Fold another histogram's samples into this one
    pub fn merge(&mut self, other: &LatencyHistogram) -> Result<()> {
        self.histogram
            .add(&other.histogram)
            .context("Failed to merge latency histograms")
    }
}

impl Default for LatencyHistogram {
    fn default() -> Self {
        Self::new()
    }
}
