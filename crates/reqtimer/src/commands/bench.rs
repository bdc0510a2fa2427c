use std::path::PathBuf;

use libreqtimer::{Benchmarker, HttpRequestOp, Result, DEFAULT_COUNT};
use tracing::info;

use super::file_config;
use crate::cli::{Cli, RequestArgs};
use crate::output;

pub async fn run(
    cli: &Cli,
    request: &RequestArgs,
    count: Option<usize>,
    json_report: Option<&PathBuf>,
) -> Result<()> {
    let config = file_config(cli)?;
    let spec = request.apply_to(config.request);
    let count = count.or(config.bench.count).unwrap_or(DEFAULT_COUNT);

    // Validate everything before the first request goes out
    let benchmarker = Benchmarker::new(count)?;
    let op = HttpRequestOp::new(&spec)?;

    info!("Benchmarking {} {} with {} sequential requests", op.method(), op.url(), count);

    let result = benchmarker.run(&op).await?;

    if let Some(path) = json_report {
        output::write_report(path, &result)?;
        info!("Report saved to {}", path.display());
    }

    output::print_bench_summary(cli, &result)
}
