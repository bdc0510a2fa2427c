//! Per-run accumulation and the final benchmark result

use std::time::Duration;

use chrono::{DateTime, Utc};
use hdrhistogram::Histogram;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ReqtimerError, Result};
use crate::request::ResponseInfo;

/// Highest latency the histogram tracks (one day, in ms). Larger samples are
/// clamped to it in the percentiles, but still count in full towards the
/// average.
const MAX_TRACKED_MS: u64 = 86_400_000;

/// Transient state of one benchmark run
pub struct RunAccumulator {
    total_duration_ms: u64,
    error_count: u64,
    success_count: u64,
    non_2xx_count: u64,
    completed: usize,
    latency_histogram: Histogram<u64>,
}

impl RunAccumulator {
    pub fn new() -> Result<Self> {
        // 1 ms to one day, 3 significant figures
        let latency_histogram = Histogram::new_with_bounds(1, MAX_TRACKED_MS, 3)
            .map_err(|e| ReqtimerError::Internal(format!("latency histogram: {}", e)))?;

        Ok(Self {
            total_duration_ms: 0,
            error_count: 0,
            success_count: 0,
            non_2xx_count: 0,
            completed: 0,
            latency_histogram,
        })
    }

    /// Record a settled successful call. Any status is a success; non-2xx
    /// ones are only tallied.
    pub fn record_success(&mut self, duration_ms: u64, response: &ResponseInfo) {
        self.total_duration_ms += duration_ms;
        self.success_count += 1;
        self.completed += 1;
        if !response.is_success_status() {
            self.non_2xx_count += 1;
        }
        if duration_ms > MAX_TRACKED_MS {
            warn!(
                duration_ms,
                max_ms = MAX_TRACKED_MS,
                "latency above histogram range, percentiles clamped"
            );
        }
        self.latency_histogram.saturating_record(duration_ms);
    }

    /// Record a failed call. It adds nothing to the duration total.
    pub fn record_failure(&mut self) {
        self.error_count += 1;
        self.completed += 1;
    }

    /// Number of settled calls so far (successes and failures)
    pub fn completed(&self) -> usize {
        self.completed
    }

    fn latencies(&self) -> LatencyPercentiles {
        if self.success_count == 0 {
            return LatencyPercentiles::default();
        }
        let hist = &self.latency_histogram;
        LatencyPercentiles {
            min_ms: hist.min(),
            p50_ms: hist.value_at_quantile(0.50),
            p95_ms: hist.value_at_quantile(0.95),
            p99_ms: hist.value_at_quantile(0.99),
            max_ms: hist.max(),
        }
    }

    /// Close the run. The divisor is always the requested `count`, so
    /// failed calls pull the average towards zero.
    pub fn finish(
        self,
        count: usize,
        started_at: DateTime<Utc>,
        elapsed: Duration,
    ) -> BenchmarkResult {
        BenchmarkResult {
            count,
            successes: self.success_count,
            errors: self.error_count,
            non_2xx_responses: self.non_2xx_count,
            total_duration_ms: self.total_duration_ms,
            average_response_time_ms: self.total_duration_ms as f64 / count as f64,
            latencies: self.latencies(),
            started_at,
            elapsed,
        }
    }
}

/// Latency percentiles over successful calls, in milliseconds.
/// All zero when no call succeeded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatencyPercentiles {
    pub min_ms: u64,
    pub p50_ms: u64,
    pub p95_ms: u64,
    pub p99_ms: u64,
    pub max_ms: u64,
}

/// Outcome of a benchmark run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkResult {
    /// Requested number of calls
    pub count: usize,
    pub successes: u64,
    pub errors: u64,
    /// Successes whose status was outside 2xx
    #[serde(default)]
    pub non_2xx_responses: u64,
    pub total_duration_ms: u64,
    pub average_response_time_ms: f64,
    pub latencies: LatencyPercentiles,
    pub started_at: DateTime<Utc>,
    #[serde(with = "crate::serde_duration")]
    pub elapsed: Duration,
}

impl BenchmarkResult {
    /// Errors as a percentage of the requested calls
    pub fn error_rate(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            (self.errors as f64 / self.count as f64) * 100.0
        }
    }
}
