use std::path::Path;

use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;
use libreqtimer::{BenchmarkResult, PollSummary, ReqtimerError};
use serde::Serialize;

use crate::cli::Cli;

/// Print the benchmark summary: average and error rate first, then the
/// latency breakdown
pub fn print_bench_summary(cli: &Cli, result: &BenchmarkResult) -> Result<(), ReqtimerError> {
    if cli.json {
        println!("{}", serde_json::to_string_pretty(result)?);
        return Ok(());
    }
    if cli.quiet {
        return Ok(());
    }

    println!();
    println!("Average response time: {:.2} ms", result.average_response_time_ms);
    println!(
        "Error rate: {:.2}% ({} of {} requests failed)",
        result.error_rate(),
        result.errors,
        result.count
    );
    if result.non_2xx_responses > 0 {
        println!("Non-2xx responses: {}", result.non_2xx_responses);
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["min", "p50", "p95", "p99", "max", "total"]);
    let l = &result.latencies;
    table.add_row(vec![
        format!("{} ms", l.min_ms),
        format!("{} ms", l.p50_ms),
        format!("{} ms", l.p95_ms),
        format!("{} ms", l.p99_ms),
        format!("{} ms", l.max_ms),
        format!("{:.2} s", result.elapsed.as_secs_f64()),
    ]);
    println!("{table}");

    Ok(())
}

/// Print the poll summary
pub fn print_poll_summary(cli: &Cli, summary: &PollSummary) -> Result<(), ReqtimerError> {
    if cli.json {
        println!("{}", serde_json::to_string_pretty(summary)?);
        return Ok(());
    }
    if cli.quiet {
        return Ok(());
    }

    println!();
    println!(
        "Polled {} times in {:.1} s: {} succeeded, {} failed",
        summary.ticks,
        summary.elapsed.as_secs_f64(),
        summary.successes,
        summary.failures
    );
    if summary.abandoned > 0 {
        println!("{} requests were still in flight and abandoned", summary.abandoned);
    }
    Ok(())
}

/// Write a pretty JSON report
pub fn write_report<T: Serialize>(path: &Path, data: &T) -> Result<(), ReqtimerError> {
    let report = serde_json::to_string_pretty(data)?;
    std::fs::write(path, report)?;
    Ok(())
}

/// Report a fatal error on stderr
pub fn output_error(cli: &Cli, err: &ReqtimerError) {
    if cli.json {
        let error = serde_json::json!({
            "ok": false,
            "error": {
                "code": err.error_code(),
                "message": err.to_string(),
                "suggestions": err.suggestions(),
            }
        });
        eprintln!("{}", error);
        return;
    }

    eprintln!("error: {}", err);
    let suggestions = err.suggestions();
    if !suggestions.is_empty() {
        eprintln!();
        eprintln!("Suggestions:");
        for suggestion in suggestions {
            eprintln!("  - {}", suggestion);
        }
    }
}
