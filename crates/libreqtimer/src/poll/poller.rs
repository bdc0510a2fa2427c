//! Interval poller

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::task::{JoinError, JoinSet};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::error::{ReqtimerError, Result};
use crate::request::RequestOp;

/// How long requests still in flight at the end of a session may take to
/// settle before they are abandoned
pub const DEFAULT_DRAIN_GRACE: Duration = Duration::from_secs(30);

/// Schedule for a polling session. Interval and duration are non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    interval: Duration,
    duration: Duration,
    drain_grace: Duration,
}

impl PollConfig {
    pub fn new(interval: Duration, duration: Duration) -> Result<Self> {
        if interval.is_zero() {
            return Err(ReqtimerError::InvalidArgs(
                "interval must be greater than zero".to_string(),
            ));
        }
        if duration.is_zero() {
            return Err(ReqtimerError::InvalidArgs(
                "duration must be greater than zero".to_string(),
            ));
        }
        Ok(Self {
            interval,
            duration,
            drain_grace: DEFAULT_DRAIN_GRACE,
        })
    }

    /// Replace the drain grace period. Zero abandons in-flight requests as
    /// soon as the session ends.
    pub fn with_drain_grace(mut self, grace: Duration) -> Self {
        self.drain_grace = grace;
        self
    }

    /// Build from seconds as given on the command line or in a config file
    pub fn from_secs(interval_secs: f64, duration_secs: f64) -> Result<Self> {
        Self::new(
            secs_to_duration("interval", interval_secs)?,
            secs_to_duration("duration", duration_secs)?,
        )
    }

    /// Delay between successive ticks
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Wall-clock time after which no new tick starts, measured from start
    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn drain_grace(&self) -> Duration {
        self.drain_grace
    }
}

fn secs_to_duration(name: &str, secs: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(secs).map_err(|_| {
        ReqtimerError::InvalidArgs(format!(
            "{} must be a positive number of seconds, got {}",
            name, secs
        ))
    })
}

/// Counters shared between the scheduler and the tick tasks
#[derive(Debug, Default)]
struct PollCounters {
    ticks: AtomicU64,
    successes: AtomicU64,
    failures: AtomicU64,
}

/// Outcome of a polling session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollSummary {
    /// Ticks started before the deadline
    pub ticks: u64,
    pub successes: u64,
    pub failures: u64,
    /// Requests cut off because they had not settled within the drain grace
    /// period or before a second shutdown signal
    #[serde(default)]
    pub abandoned: u64,
    #[serde(with = "crate::serde_duration")]
    pub elapsed: Duration,
}

/// Fires a request operation every `interval` until `duration` elapses.
///
/// Ticks follow the clock, not completion: each tick runs on its own task,
/// so a slow request can overlap the next ones. There is no cap on how many
/// requests are in flight.
#[derive(Debug, Clone, Copy)]
pub struct Poller {
    config: PollConfig,
}

impl Poller {
    pub fn new(config: PollConfig) -> Self {
        Self { config }
    }

    /// Poll until the deadline
    pub async fn run<O>(&self, op: Arc<O>) -> PollSummary
    where
        O: RequestOp + ?Sized + 'static,
    {
        self.run_until(op, std::future::pending::<()>).await
    }

    /// Poll until the deadline or until a shutdown future resolves, whichever
    /// comes first.
    ///
    /// `shutdown` is called once for the polling phase and once more for the
    /// drain that follows. Requests still in flight are awaited and counted
    /// until the drain grace period runs out or the second shutdown future
    /// resolves; whatever is left then is aborted and reported as abandoned.
    pub async fn run_until<O, S, F>(&self, op: Arc<O>, mut shutdown: S) -> PollSummary
    where
        O: RequestOp + ?Sized + 'static,
        S: FnMut() -> F,
        F: Future<Output = ()>,
    {
        let counters = Arc::new(PollCounters::default());
        let start = Instant::now();

        let deadline = tokio::time::sleep(self.config.duration);
        tokio::pin!(deadline);
        let interrupted = shutdown();
        tokio::pin!(interrupted);

        // First tick completes immediately
        let mut schedule = tokio::time::interval(self.config.interval);
        schedule.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut in_flight = JoinSet::new();

        debug!(
            interval_secs = self.config.interval.as_secs_f64(),
            duration_secs = self.config.duration.as_secs_f64(),
            "polling started"
        );

        loop {
            tokio::select! {
                biased;

                _ = &mut deadline => {
                    debug!("poll deadline reached");
                    break;
                }
                _ = &mut interrupted => {
                    info!("Polling interrupted");
                    break;
                }
                _ = schedule.tick() => {
                    counters.ticks.fetch_add(1, Ordering::Relaxed);
                    let op = Arc::clone(&op);
                    let counters = Arc::clone(&counters);
                    in_flight.spawn(async move {
                        poll_once(op.as_ref(), &counters).await;
                    });
                }
                Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                    reap(joined);
                }
            }
        }

        // The schedule is cancelled; let whatever is already running settle
        let abandoned = self.drain(&mut in_flight, shutdown()).await;

        PollSummary {
            ticks: counters.ticks.load(Ordering::Relaxed),
            successes: counters.successes.load(Ordering::Relaxed),
            failures: counters.failures.load(Ordering::Relaxed),
            abandoned,
            elapsed: start.elapsed(),
        }
    }

    /// Await in-flight ticks for at most the grace period, or until `stop`
    /// resolves. Returns how many were aborted.
    async fn drain<F>(&self, in_flight: &mut JoinSet<()>, stop: F) -> u64
    where
        F: Future<Output = ()>,
    {
        if in_flight.is_empty() {
            return 0;
        }
        debug!(in_flight = in_flight.len(), "waiting for in-flight requests");

        let grace = tokio::time::sleep(self.config.drain_grace);
        tokio::pin!(grace);
        tokio::pin!(stop);

        loop {
            tokio::select! {
                biased;

                joined = in_flight.join_next() => match joined {
                    Some(joined) => reap(joined),
                    None => return 0,
                },
                _ = &mut stop => {
                    warn!("Abandoning {} in-flight requests", in_flight.len());
                    break;
                }
                _ = &mut grace => {
                    warn!(
                        "{} requests still in flight after {:.1} s, abandoning them",
                        in_flight.len(),
                        self.config.drain_grace.as_secs_f64()
                    );
                    break;
                }
            }
        }

        in_flight.abort_all();
        let mut abandoned = 0;
        while let Some(joined) = in_flight.join_next().await {
            if matches!(&joined, Err(e) if e.is_cancelled()) {
                abandoned += 1;
            }
            reap(joined);
        }
        abandoned
    }
}

/// One tick: await the request and log its outcome. Only successes advance
/// the query count.
async fn poll_once<O>(op: &O, counters: &PollCounters)
where
    O: RequestOp + ?Sized,
{
    match op.call().await {
        Ok(response) => {
            let query_count = counters.successes.fetch_add(1, Ordering::Relaxed) + 1;
            info!("Status: {} / Total queries: {}", response.status, query_count);
        }
        Err(e) => {
            counters.failures.fetch_add(1, Ordering::Relaxed);
            error!("Error: {}", e);
        }
    }
}

fn reap(joined: std::result::Result<(), JoinError>) {
    if let Err(e) = joined {
        if e.is_panic() {
            error!("Poll task panicked: {}", e);
        }
    }
}
