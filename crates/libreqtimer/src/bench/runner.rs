//! Sequential benchmark runner

use chrono::Utc;
use tokio::time::Instant;
use tracing::{debug, error, info};

use super::metrics::{BenchmarkResult, RunAccumulator};
use crate::error::{ReqtimerError, Result};
use crate::request::RequestOp;

/// Iterations used when the caller does not choose a count
pub const DEFAULT_COUNT: usize = 10;

/// Calls a request operation `count` times, one after another, and reports
/// the average response time and the error count.
#[derive(Debug, Clone, Copy)]
pub struct Benchmarker {
    count: usize,
}

impl Default for Benchmarker {
    fn default() -> Self {
        Self { count: DEFAULT_COUNT }
    }
}

impl Benchmarker {
    /// Create a benchmarker. `count` must be at least 1, an empty run has
    /// no meaningful average.
    pub fn new(count: usize) -> Result<Self> {
        if count == 0 {
            return Err(ReqtimerError::InvalidArgs(
                "count must be at least 1".to_string(),
            ));
        }
        Ok(Self { count })
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Run the benchmark.
    ///
    /// Iteration `i + 1` starts only after iteration `i` has settled. A
    /// failing call is logged and counted; it is not retried and does not
    /// stop the loop. Request failures never surface as an `Err` here.
    pub async fn run<O>(&self, op: &O) -> Result<BenchmarkResult>
    where
        O: RequestOp + ?Sized,
    {
        let mut acc = RunAccumulator::new()?;
        let started_at = Utc::now();
        let run_start = Instant::now();

        debug!(count = self.count, "benchmark starting");

        for _ in 0..self.count {
            let start = Instant::now();
            let outcome = op.call().await;
            let duration_ms = start.elapsed().as_millis() as u64;

            match outcome {
                Ok(response) => {
                    acc.record_success(duration_ms, &response);
                    info!(
                        "Status: {} / Duration: {} ms / Total queries: {}",
                        response.status,
                        duration_ms,
                        acc.completed()
                    );
                }
                Err(e) => {
                    acc.record_failure();
                    error!("Error: {}", e);
                }
            }
        }

        let result = acc.finish(self.count, started_at, run_start.elapsed());
        debug!(
            average_ms = result.average_response_time_ms,
            errors = result.errors,
            "benchmark complete"
        );
        Ok(result)
    }
}
