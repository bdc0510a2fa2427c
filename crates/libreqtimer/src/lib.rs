//! Core library for reqtimer.
//!
//! Two independent utilities built around a caller-supplied [`RequestOp`]:
//! - [`Benchmarker`] calls the operation `count` times, strictly one after
//!   another, and reports the average response time and error count.
//! - [`Poller`] fires the operation every `interval` until `duration` has
//!   elapsed, without waiting for earlier calls to settle.

pub mod bench;
pub mod config;
pub mod error;
pub mod http;
pub mod poll;
pub mod request;
mod serde_duration;

pub use bench::{BenchmarkResult, Benchmarker, LatencyPercentiles, DEFAULT_COUNT};
pub use config::{
    load_config, save_config, BenchSettings, PollSettings, ReqtimerConfig, RequestSpec,
};
pub use error::{ReqtimerError, Result};
pub use http::HttpRequestOp;
pub use poll::{PollConfig, PollSummary, Poller, DEFAULT_DRAIN_GRACE};
pub use request::{RequestFailure, RequestOp, ResponseInfo};
