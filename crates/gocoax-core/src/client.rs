// ── Adapter client facade ──
//
// One poll: credential probe, bounded concurrent fetch of the remaining
// endpoints, then decode/normalize/merge once every result is in. The
// whole poll shares one deadline; whatever hasn't answered by then is
// recorded as timed out and the snapshot is built from the rest.

use std::collections::BTreeSet;
use std::net::IpAddr;
use std::time::Duration;

use bytes::Bytes;
use chrono::Utc;
use futures_util::{StreamExt, stream};
use gocoax_api::{Endpoint, Fetch, HttpTransport, TransportError, decode};
use tokio::time::{Instant, timeout_at};
use tracing::{debug, info, warn};

use crate::config::AdapterConfig;
use crate::convert::normalize;
use crate::error::{ClientError, EndpointError};
use crate::model::MacAddress;
use crate::snapshot::{SnapshotBuilder, StatusReport};

/// Endpoint fetched alone before anything else to validate credentials.
pub const CREDENTIAL_PROBE: Endpoint = Endpoint::Mac;

type FetchOutcome = (Endpoint, Result<Bytes, TransportError>);

/// Session-scoped client for one adapter.
///
/// Owns the HTTP connection pool, which is reused by every poll and
/// released when the client is dropped.
#[derive(Debug, Clone)]
pub struct AdapterClient<F = HttpTransport> {
    transport: F,
    host: String,
    ip: Option<IpAddr>,
    timeout: Duration,
    max_in_flight: usize,
}

impl AdapterClient<HttpTransport> {
    /// Validate `config` and build an HTTP client for it. No request is sent.
    pub fn connect(config: &AdapterConfig) -> Result<Self, ClientError> {
        config.validate()?;
        let transport = HttpTransport::new(
            config.base_url()?,
            config.credentials(),
            &config.transport_config(),
        )?;
        Ok(Self::from_parts(transport, config))
    }
}

impl<F: Fetch> AdapterClient<F> {
    /// Poll through a caller-supplied transport.
    pub fn with_transport(transport: F, config: &AdapterConfig) -> Result<Self, ClientError> {
        config.validate()?;
        Ok(Self::from_parts(transport, config))
    }

    fn from_parts(transport: F, config: &AdapterConfig) -> Self {
        Self {
            transport,
            host: config.host.clone(),
            ip: config.host_ip(),
            timeout: config.timeout,
            max_in_flight: config.max_in_flight.max(1),
        }
    }

    pub fn transport(&self) -> &F {
        &self.transport
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    fn timeout_secs(&self) -> u64 {
        self.timeout.as_secs()
    }

    fn deadline_error(&self) -> TransportError {
        TransportError::Timeout {
            timeout_secs: self.timeout_secs(),
        }
    }

    /// Check reachability and credentials with a single request.
    ///
    /// Returns the adapter's MAC address on success.
    pub async fn probe(&self) -> Result<MacAddress, ClientError> {
        let fetched = tokio::time::timeout(self.timeout, self.transport.fetch(CREDENTIAL_PROBE))
            .await
            .unwrap_or_else(|_| Err(self.deadline_error()));

        let body = match fetched {
            Ok(body) => body,
            Err(TransportError::Unauthorized { status }) => {
                return Err(ClientError::rejected(CREDENTIAL_PROBE, status));
            }
            Err(TransportError::Timeout { timeout_secs }) => {
                return Err(ClientError::Timeout {
                    timeout_secs,
                    errors: Vec::new(),
                });
            }
            Err(TransportError::Unreachable { reason }) => {
                return Err(ClientError::Transport { reason });
            }
        };

        let payload = decode(CREDENTIAL_PROBE, &body).map_err(|e| ClientError::NoUsableData {
            errors: vec![EndpointError::new(CREDENTIAL_PROBE, e)],
        })?;
        normalize(&payload)
            .fields()
            .mac()
            .ok_or_else(|| ClientError::NoUsableData { errors: Vec::new() })
    }

    /// Take one status snapshot.
    pub async fn poll(&self) -> Result<StatusReport, ClientError> {
        let started = Instant::now();
        let deadline = started + self.timeout;
        let mut outcomes: Vec<FetchOutcome> = Vec::with_capacity(Endpoint::ALL.len());

        // ── Credential probe ─────────────────────────────────────────
        let probe = timeout_at(deadline, self.transport.fetch(CREDENTIAL_PROBE))
            .await
            .unwrap_or_else(|_| Err(self.deadline_error()));
        if let Err(TransportError::Unauthorized { status }) = probe {
            warn!(host = %self.host, status, "credentials rejected, aborting poll");
            return Err(ClientError::rejected(CREDENTIAL_PROBE, status));
        }
        outcomes.push((CREDENTIAL_PROBE, probe));

        // ── Remaining endpoints, bounded concurrency ──────────────────
        let rest: Vec<Endpoint> = Endpoint::ALL
            .into_iter()
            .filter(|e| *e != CREDENTIAL_PROBE)
            .collect();
        let mut pending: BTreeSet<Endpoint> = rest.iter().copied().collect();

        let mut fetches = stream::iter(rest)
            .map(|endpoint| async move { (endpoint, self.transport.fetch(endpoint).await) })
            .buffer_unordered(self.max_in_flight);

        loop {
            match timeout_at(deadline, fetches.next()).await {
                Ok(Some((endpoint, result))) => {
                    if let Err(TransportError::Unauthorized { status }) = result {
                        warn!(%endpoint, status, "credentials rejected mid-poll, aborting");
                        return Err(ClientError::rejected(endpoint, status));
                    }
                    debug!(%endpoint, ok = result.is_ok(), "fetch finished");
                    pending.remove(&endpoint);
                    outcomes.push((endpoint, result));
                }
                Ok(None) => break,
                Err(_) => {
                    warn!(
                        unfinished = pending.len(),
                        timeout_secs = self.timeout_secs(),
                        "poll deadline reached"
                    );
                    break;
                }
            }
        }
        // Dropping the stream cancels whatever is still in flight.
        drop(fetches);
        outcomes.extend(
            pending
                .into_iter()
                .map(|endpoint| (endpoint, Err(self.deadline_error()))),
        );

        let report = self.assemble(outcomes)?;
        info!(
            host = %self.host,
            errors = report.errors.len(),
            warnings = report.warnings.len(),
            elapsed_ms = started.elapsed().as_millis(),
            "poll complete"
        );
        Ok(report)
    }

    fn assemble(&self, mut outcomes: Vec<FetchOutcome>) -> Result<StatusReport, ClientError> {
        outcomes.sort_by_key(|(endpoint, _)| *endpoint);

        let mut builder = SnapshotBuilder::new();
        builder.configured_ip(&self.host, self.ip);
        let mut responded = false;

        for (endpoint, result) in outcomes {
            match result {
                Ok(body) => {
                    responded = true;
                    match decode(endpoint, &body) {
                        Ok(payload) => builder.merge(&payload),
                        Err(e) => builder.record_error(EndpointError::new(endpoint, e)),
                    }
                }
                Err(e) => {
                    responded |= !e.is_timeout();
                    builder.record_error(EndpointError::new(endpoint, e));
                }
            }
        }

        let (status, errors, warnings) = builder.finish();
        if !status.has_adapter_data() {
            return Err(if responded {
                ClientError::NoUsableData { errors }
            } else {
                ClientError::Timeout {
                    timeout_secs: self.timeout_secs(),
                    errors,
                }
            });
        }

        Ok(StatusReport {
            status,
            errors,
            warnings,
            captured_at: Utc::now(),
        })
    }
}

/// One-shot poll: build a client for `config`, poll once, drop it.
pub async fn get_status(config: &AdapterConfig) -> Result<StatusReport, ClientError> {
    AdapterClient::connect(config)?.poll().await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    /// Serves canned results and records what was asked for.
    struct Canned {
        respond: fn(Endpoint) -> Result<Bytes, TransportError>,
        calls: Mutex<Vec<Endpoint>>,
    }

    impl Fetch for Canned {
        async fn fetch(&self, endpoint: Endpoint) -> Result<Bytes, TransportError> {
            self.calls.lock().unwrap().push(endpoint);
            (self.respond)(endpoint)
        }
    }

    fn client(respond: fn(Endpoint) -> Result<Bytes, TransportError>) -> AdapterClient<Canned> {
        let transport = Canned {
            respond,
            calls: Mutex::new(Vec::new()),
        };
        AdapterClient::with_transport(transport, &AdapterConfig::new("192.168.1.100")).unwrap()
    }

    fn unreachable() -> TransportError {
        TransportError::Unreachable {
            reason: "connection refused".into(),
        }
    }

    #[tokio::test]
    async fn probe_returns_mac() {
        let c = client(|_| Ok(Bytes::from_static(br#"{"data":["0xa4817a49","0xe3dd0000"]}"#)));
        let mac = c.probe().await.unwrap();
        assert_eq!(mac.to_string(), "a4:81:7a:49:e3:dd");
    }

    #[tokio::test]
    async fn probe_maps_unauthorized() {
        let c = client(|_| Err(TransportError::Unauthorized { status: 401 }));
        assert!(c.probe().await.unwrap_err().is_auth());
    }

    #[tokio::test]
    async fn every_endpoint_unreachable_is_no_usable_data() {
        let c = client(|_| Err(unreachable()));
        let err = c.poll().await.unwrap_err();

        assert!(matches!(err, ClientError::NoUsableData { .. }), "{err:?}");
        assert_eq!(err.endpoint_errors().len(), Endpoint::ALL.len());
        assert_eq!(c.transport().calls.lock().unwrap().len(), Endpoint::ALL.len());
    }

    #[tokio::test]
    async fn every_endpoint_timing_out_is_timeout() {
        let c = client(|_| Err(TransportError::Timeout { timeout_secs: 30 }));
        let err = c.poll().await.unwrap_err();
        assert!(matches!(err, ClientError::Timeout { timeout_secs: 30, .. }), "{err:?}");
    }

    #[tokio::test]
    async fn garbage_everywhere_is_no_usable_data() {
        let c = client(|_| Ok(Bytes::from_static(b"\0\0\0")));
        let err = c.poll().await.unwrap_err();
        assert!(matches!(err, ClientError::NoUsableData { .. }), "{err:?}");
    }

    #[test]
    fn connect_rejects_invalid_config() {
        let config = AdapterConfig::new("192.168.1.100").with_timeout(Duration::from_secs(1));
        assert!(matches!(
            AdapterClient::connect(&config),
            Err(ClientError::Config { .. })
        ));
    }
}
