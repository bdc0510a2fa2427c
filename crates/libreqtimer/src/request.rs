//! The request capability shared by the benchmarker and the poller

use std::fmt;
use std::future::Future;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What a settled request reports back
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseInfo {
    /// HTTP status code. Any status counts as success for timing purposes.
    pub status: u16,
}

impl ResponseInfo {
    pub fn new(status: u16) -> Self {
        Self { status }
    }

    pub fn is_success_status(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

impl fmt::Display for ResponseInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.status)
    }
}

/// Any failure of a request operation: transport errors, timeouts, body
/// read errors. Never escapes the benchmarker or poller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct RequestFailure {
    pub message: String,
}

impl RequestFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for RequestFailure {
    fn from(e: reqwest::Error) -> Self {
        // reqwest's Display drops the underlying cause, which is usually the
        // useful part (connection refused, dns failure, ...)
        let mut message = e.to_string();
        let mut source = std::error::Error::source(&e);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        Self { message }
    }
}

/// A zero-argument operation performing one request.
///
/// Implemented for [`HttpRequestOp`](crate::HttpRequestOp) and for any
/// `Fn() -> impl Future<Output = Result<ResponseInfo, RequestFailure>>`.
#[async_trait]
pub trait RequestOp: Send + Sync {
    async fn call(&self) -> Result<ResponseInfo, RequestFailure>;
}

#[async_trait]
impl<F, Fut> RequestOp for F
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<ResponseInfo, RequestFailure>> + Send + 'static,
{
    async fn call(&self) -> Result<ResponseInfo, RequestFailure> {
        (self)().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_closure_is_request_op() {
        let op = || async { Ok::<_, RequestFailure>(ResponseInfo::new(204)) };
        let response = RequestOp::call(&op).await.unwrap();
        assert_eq!(response.status, 204);
        assert!(response.is_success_status());
    }

    #[tokio::test]
    async fn test_closure_failure() {
        let op = || async { Err::<ResponseInfo, _>(RequestFailure::new("connection reset")) };
        let err = RequestOp::call(&op).await.unwrap_err();
        assert_eq!(err.to_string(), "connection reset");
    }

    #[test]
    fn test_non_2xx_status() {
        assert!(!ResponseInfo::new(503).is_success_status());
        assert_eq!(ResponseInfo::new(503).to_string(), "503");
    }
}
