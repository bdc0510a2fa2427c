use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use libreqtimer::{HttpRequestOp, PollConfig, Poller, Result};
use tracing::{info, warn};

use super::file_config;
use crate::cli::{Cli, RequestArgs};
use crate::output;

pub async fn run(
    cli: &Cli,
    request: &RequestArgs,
    interval: Option<f64>,
    duration: Option<f64>,
    json_report: Option<&PathBuf>,
) -> Result<()> {
    let config = file_config(cli)?;
    let spec = request.apply_to(config.request);
    let poll_config = PollConfig::from_secs(
        interval.unwrap_or_else(|| config.poll.interval_secs_or_default()),
        duration.unwrap_or_else(|| config.poll.duration_secs_or_default()),
    )?
    .with_drain_grace(Duration::from_secs(spec.timeout_secs_or_default()));
    let op = HttpRequestOp::new(&spec)?;

    info!(
        "Polling {} {} every {:.1} s for {:.1} s",
        op.method(),
        op.url(),
        poll_config.interval().as_secs_f64(),
        poll_config.duration().as_secs_f64()
    );

    // A second Ctrl+C during the drain abandons whatever is still in flight;
    // otherwise the request timeout bounds it
    let summary = Poller::new(poll_config)
        .run_until(Arc::new(op), shutdown_signal)
        .await;

    if let Some(path) = json_report {
        output::write_report(path, &summary)?;
        info!("Report saved to {}", path.display());
    }

    output::print_poll_summary(cli, &summary)
}

/// Resolves on Ctrl+C or SIGTERM. If a handler cannot be installed that
/// signal is ignored and polling runs to its deadline.
///
/// The poller listens again while it waits for in-flight requests, so a
/// second Ctrl+C abandons them.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
