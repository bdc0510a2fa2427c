//! Sequential benchmarker

pub mod metrics;
pub mod runner;

pub use metrics::{BenchmarkResult, LatencyPercentiles, RunAccumulator};
pub use runner::{Benchmarker, DEFAULT_COUNT};
