use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use libreqtimer::RequestSpec;

#[derive(Parser)]
#[command(
    name = "reqtimer",
    about = "Measure HTTP endpoint response times and poll endpoints on a schedule",
    version
)]
pub struct Cli {
    /// Config file with [request], [bench] and [poll] sections
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Print the summary as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress the human-readable summary
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Call the endpoint COUNT times, one after another, and report the
    /// average response time and error rate
    Bench {
        #[command(flatten)]
        request: RequestArgs,

        /// Number of sequential requests (default 10)
        #[arg(short = 'n', long)]
        count: Option<usize>,

        /// Write the result as JSON to this file
        #[arg(short = 'j', long)]
        json_report: Option<PathBuf>,
    },

    /// Call the endpoint every INTERVAL seconds until DURATION seconds have
    /// passed
    Poll {
        #[command(flatten)]
        request: RequestArgs,

        /// Seconds between requests (default 60)
        #[arg(short, long)]
        interval: Option<f64>,

        /// Total seconds to keep polling (default 18000)
        #[arg(short, long)]
        duration: Option<f64>,

        /// Write the summary as JSON to this file
        #[arg(short = 'j', long)]
        json_report: Option<PathBuf>,
    },
}

/// Request options shared by both commands. Each one overrides the
/// matching key of the config file's [request] section.
#[derive(Args, Clone, Debug, Default)]
pub struct RequestArgs {
    /// Target URL
    #[arg(short, long)]
    pub url: Option<String>,

    /// HTTP method
    #[arg(short = 'X', long)]
    pub method: Option<String>,

    /// Request header as `name: value` (repeatable)
    #[arg(short = 'H', long = "header", value_parser = parse_header)]
    pub headers: Vec<(String, String)>,

    /// Cookie header value
    #[arg(long)]
    pub cookie: Option<String>,

    /// Request body
    #[arg(short = 'b', long)]
    pub body: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,
}

impl RequestArgs {
    /// Overlay these options on a request loaded from the config file
    pub fn apply_to(&self, mut spec: RequestSpec) -> RequestSpec {
        if let Some(ref url) = self.url {
            spec.url = Some(url.clone());
        }
        if let Some(ref method) = self.method {
            spec.method = Some(method.clone());
        }
        if let Some(ref cookie) = self.cookie {
            spec.cookie = Some(cookie.clone());
        }
        if let Some(ref body) = self.body {
            spec.body = Some(body.clone());
        }
        if let Some(timeout) = self.timeout {
            spec.timeout_secs = Some(timeout);
        }
        for (name, value) in &self.headers {
            spec.headers.insert(name.clone(), value.clone());
        }
        spec
    }
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected `name: value`, got '{}'", raw))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("empty header name in '{}'", raw));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_header() {
        assert_eq!(
            parse_header("accept: application/json").unwrap(),
            ("accept".to_string(), "application/json".to_string())
        );
        assert_eq!(
            parse_header("x-range:0,10").unwrap(),
            ("x-range".to_string(), "0,10".to_string())
        );
        assert!(parse_header("no-colon").is_err());
        assert!(parse_header(": value").is_err());
    }

    #[test]
    fn test_flags_override_config() {
        let mut from_file = RequestSpec {
            url: Some("http://file.example/".to_string()),
            method: Some("POST".to_string()),
            ..Default::default()
        };
        from_file.headers.insert("accept".to_string(), "text/html".to_string());
        from_file.headers.insert("x-keep".to_string(), "1".to_string());

        let args = RequestArgs {
            url: Some("http://flag.example/".to_string()),
            headers: vec![("accept".to_string(), "application/json".to_string())],
            timeout: Some(3),
            ..Default::default()
        };

        let spec = args.apply_to(from_file);
        assert_eq!(spec.url.as_deref(), Some("http://flag.example/"));
        assert_eq!(spec.method.as_deref(), Some("POST"));
        assert_eq!(spec.timeout_secs, Some(3));
        assert_eq!(spec.headers.get("accept").unwrap(), "application/json");
        assert_eq!(spec.headers.get("x-keep").unwrap(), "1");
    }

    #[test]
    fn test_parse_poll_command() {
        let cli = Cli::try_parse_from([
            "reqtimer", "poll", "--url", "http://localhost/", "-i", "0.5", "-d", "10",
        ])
        .unwrap();
        match cli.command {
            Command::Poll { interval, duration, request, .. } => {
                assert_eq!(interval, Some(0.5));
                assert_eq!(duration, Some(10.0));
                assert_eq!(request.url.as_deref(), Some("http://localhost/"));
            }
            _ => panic!("expected poll"),
        }
    }
}
