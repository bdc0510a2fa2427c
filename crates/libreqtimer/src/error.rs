use thiserror::Error;

/// Errors that abort a reqtimer command.
///
/// Failures of individual requests are not represented here; those are
/// [`RequestFailure`](crate::RequestFailure)s, counted and logged by the
/// benchmarker and poller.
#[derive(Debug, Error)]
pub enum ReqtimerError {
    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ReqtimerError {
    /// Error code used in machine-readable output
    pub fn error_code(&self) -> &'static str {
        match self {
            ReqtimerError::InvalidArgs(_) => "invalid_args",
            ReqtimerError::Io(_) => "io_error",
            ReqtimerError::Json(_) => "internal_error",
            ReqtimerError::TomlParse(_) => "invalid_args",
            ReqtimerError::TomlSerialize(_) => "internal_error",
            ReqtimerError::Http(_) => "http_error",
            ReqtimerError::Internal(_) => "internal_error",
        }
    }

    /// Process exit code for the CLI
    pub fn exit_code(&self) -> i32 {
        match self {
            ReqtimerError::InvalidArgs(_) => 2,
            ReqtimerError::TomlParse(_) => 2,
            ReqtimerError::Io(_) => 5,
            ReqtimerError::Http(_) => 6,
            _ => 1,
        }
    }

    /// Actionable hints printed under the error message
    pub fn suggestions(&self) -> Vec<&'static str> {
        match self {
            ReqtimerError::InvalidArgs(msg) if msg.contains("url") => vec![
                "Pass --url or set `url` in the [request] section of the config file",
            ],
            ReqtimerError::TomlParse(_) => vec![
                "Check the config file against the [request], [bench] and [poll] sections",
            ],
            _ => vec![],
        }
    }
}

pub type Result<T> = std::result::Result<T, ReqtimerError>;
