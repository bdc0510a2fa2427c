//! reqtimer - time HTTP endpoints and poll them on a schedule

mod cli;
mod commands;
mod output;

use clap::Parser;
use libreqtimer::ReqtimerError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cli::{Cli, Command};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_logging(&cli.log_level);

    if let Err(e) = run_command(&cli).await {
        output::output_error(&cli, &e);
        std::process::exit(e.exit_code());
    }
}

/// RUST_LOG wins over --log-level. Logs go to stderr so stdout only carries
/// the summary.
fn init_logging(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run_command(cli: &Cli) -> Result<(), ReqtimerError> {
    match &cli.command {
        Command::Bench { request, count, json_report } => {
            commands::bench::run(cli, request, *count, json_report.as_ref()).await
        }
        Command::Poll { request, interval, duration, json_report } => {
            commands::poll::run(cli, request, *interval, *duration, json_report.as_ref()).await
        }
    }
}
