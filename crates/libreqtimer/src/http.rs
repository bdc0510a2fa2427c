//! `RequestOp` backed by reqwest

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, COOKIE};
use reqwest::{Client, Method, Url};
use tracing::debug;

use crate::config::RequestSpec;
use crate::error::{ReqtimerError, Result};
use crate::request::{RequestFailure, RequestOp, ResponseInfo};

/// Replays the same HTTP request on every call.
///
/// The [`RequestSpec`] is validated once in [`HttpRequestOp::new`]; a bad URL
/// or header fails there, never inside `call`.
#[derive(Debug, Clone)]
pub struct HttpRequestOp {
    client: Client,
    method: Method,
    url: Url,
    headers: HeaderMap,
    body: Option<String>,
}

impl HttpRequestOp {
    pub fn new(spec: &RequestSpec) -> Result<Self> {
        let raw_url = spec.require_url()?;
        let url = Url::parse(raw_url)
            .map_err(|e| ReqtimerError::InvalidArgs(format!("invalid url '{}': {}", raw_url, e)))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ReqtimerError::InvalidArgs(format!(
                "unsupported url scheme '{}', expected http or https",
                url.scheme()
            )));
        }

        let raw_method = spec.method_or_default();
        let method = Method::from_str(&raw_method.to_uppercase()).map_err(|_| {
            ReqtimerError::InvalidArgs(format!("invalid HTTP method '{}'", raw_method))
        })?;

        let mut headers = HeaderMap::new();
        for (name, value) in &spec.headers {
            let name = HeaderName::from_str(name).map_err(|_| {
                ReqtimerError::InvalidArgs(format!("invalid header name '{}'", name))
            })?;
            let value = HeaderValue::from_str(value).map_err(|_| {
                ReqtimerError::InvalidArgs(format!("invalid value for header '{}'", name))
            })?;
            headers.append(name, value);
        }
        if let Some(ref cookie) = spec.cookie {
            let value = HeaderValue::from_str(cookie)
                .map_err(|_| ReqtimerError::InvalidArgs("invalid cookie value".to_string()))?;
            headers.insert(COOKIE, value);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(spec.timeout_secs_or_default()))
            .build()?;

        Ok(Self {
            client,
            method,
            url,
            headers,
            body: spec.body.clone(),
        })
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl RequestOp for HttpRequestOp {
    async fn call(&self) -> std::result::Result<ResponseInfo, RequestFailure> {
        let mut request = self
            .client
            .request(self.method.clone(), self.url.clone())
            .headers(self.headers.clone());
        if let Some(ref body) = self.body {
            request = request.body(body.clone());
        }

        let response = request.send().await?;
        let status = response.status().as_u16();

        // Time the full transfer, not just the headers
        let body = response.bytes().await?;
        debug!(status, bytes = body.len(), "response received");

        Ok(ResponseInfo::new(status))
    }
}
