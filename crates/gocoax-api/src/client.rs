// Adapter HTTP transport
//
// Wraps `reqwest::Client` with Basic auth, endpoint URL construction, and
// the mapping from HTTP failures onto `TransportError`. Payloads come back
// as raw bytes; interpretation belongs to the `wire` module.

use std::future::Future;
use std::time::Duration;

use bytes::Bytes;
use tracing::{debug, trace};
use url::Url;

use crate::auth::BasicCredentials;
use crate::endpoint::Endpoint;
use crate::error::{Error, TransportError};
use crate::transport::TransportConfig;

/// Anything that can fetch the raw body of an adapter endpoint.
///
/// Implemented by [`HttpTransport`] for real adapters; tests substitute
/// in-memory implementations.
pub trait Fetch: Send + Sync {
    fn fetch(&self, endpoint: Endpoint)
    -> impl Future<Output = Result<Bytes, TransportError>> + Send;
}

/// Authenticated HTTP access to one adapter.
///
/// Holds a connection pool that may be reused across polls. Nothing here is
/// session state: credentials ride along on every request.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    base_url: Url,
    credentials: BasicCredentials,
    timeout: Duration,
}

impl HttpTransport {
    /// Create a transport with a fresh HTTP client built from `transport`.
    pub fn new(
        base_url: Url,
        credentials: BasicCredentials,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url,
            credentials,
            timeout: transport.timeout,
        })
    }

    /// Create a transport around a caller-owned `reqwest::Client`.
    ///
    /// `timeout` is only used to label timeout errors; the client's own
    /// timeout governs the actual request.
    pub fn with_client(
        http: reqwest::Client,
        base_url: Url,
        credentials: BasicCredentials,
        timeout: Duration,
    ) -> Self {
        Self {
            http,
            base_url,
            credentials,
            timeout,
        }
    }

    /// The adapter base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Full URL for an endpoint.
    pub fn endpoint_url(&self, endpoint: Endpoint) -> Result<Url, Error> {
        Ok(self.base_url.join(endpoint.path())?)
    }

    /// GET an endpoint and return its body untouched.
    pub async fn get_raw(&self, endpoint: Endpoint) -> Result<Bytes, TransportError> {
        let url = self
            .endpoint_url(endpoint)
            .map_err(|e| TransportError::Unreachable {
                reason: e.to_string(),
            })?;
        debug!(%endpoint, %url, "GET");

        let resp = self
            .credentials
            .apply(self.http.get(url))
            .send()
            .await
            .map_err(|e| self.classify(&e))?;

        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(TransportError::Unauthorized {
                status: status.as_u16(),
            });
        }
        if !status.is_success() {
            return Err(TransportError::Unreachable {
                reason: format!("HTTP {status}"),
            });
        }

        let body = resp.bytes().await.map_err(|e| self.classify(&e))?;
        trace!(%endpoint, len = body.len(), preview = %preview(&body), "response body");
        Ok(body)
    }

    fn classify(&self, err: &reqwest::Error) -> TransportError {
        if err.is_timeout() {
            TransportError::Timeout {
                timeout_secs: self.timeout.as_secs(),
            }
        } else {
            TransportError::Unreachable {
                reason: err.to_string(),
            }
        }
    }
}

impl Fetch for HttpTransport {
    fn fetch(
        &self,
        endpoint: Endpoint,
    ) -> impl Future<Output = Result<Bytes, TransportError>> + Send {
        self.get_raw(endpoint)
    }
}

fn preview(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    text.chars().take(200).collect()
}
