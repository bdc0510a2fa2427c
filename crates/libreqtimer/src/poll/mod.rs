//! Interval poller

pub mod poller;

pub use poller::{PollConfig, PollSummary, Poller, DEFAULT_DRAIN_GRACE};
