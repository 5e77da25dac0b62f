// ── Runtime connection configuration ──
//
// Describes how to reach one adapter. Carries credentials and tuning but
// never touches disk; the CLI resolves profiles and hands one of these in.

use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use gocoax_api::auth::{DEFAULT_PASSWORD, DEFAULT_USERNAME};
use gocoax_api::{BasicCredentials, TlsMode, TransportConfig, base_url_for_host};
use secrecy::SecretString;
use url::{Host, Url};

use crate::error::ClientError;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const MIN_TIMEOUT_SECS: u64 = 10;
pub const MAX_TIMEOUT_SECS: u64 = 300;

/// Concurrent endpoint fetches per poll.
pub const DEFAULT_MAX_IN_FLIGHT: usize = 4;

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification. Adapters that serve HTTPS use self-signed certs.
    #[default]
    DangerAcceptInvalid,
}

/// Configuration for polling a single adapter.
#[derive(Debug, Clone)]
pub struct AdapterConfig {
    /// Adapter address: IP, hostname, or URL.
    pub host: String,
    pub username: String,
    pub password: SecretString,
    pub tls: TlsVerification,
    /// Bound on a whole poll, not just one request.
    pub timeout: Duration,
    /// Endpoint fetches allowed in flight at once.
    pub max_in_flight: usize,
}

impl AdapterConfig {
    /// Config for `host` with factory-default credentials.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            username: DEFAULT_USERNAME.to_owned(),
            password: SecretString::from(DEFAULT_PASSWORD.to_owned()),
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
        }
    }

    #[must_use]
    pub fn with_credentials(mut self, username: impl Into<String>, password: SecretString) -> Self {
        self.username = username.into();
        self.password = password;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn validate(&self) -> Result<(), ClientError> {
        if self.host.trim().is_empty() {
            return Err(ClientError::Config {
                message: "adapter host is empty".into(),
            });
        }
        let secs = self.timeout.as_secs();
        if !(MIN_TIMEOUT_SECS..=MAX_TIMEOUT_SECS).contains(&secs) || self.timeout.subsec_nanos() != 0
        {
            return Err(ClientError::Config {
                message: format!(
                    "timeout must be a whole number of seconds between {MIN_TIMEOUT_SECS} and {MAX_TIMEOUT_SECS}, got {:?}",
                    self.timeout
                ),
            });
        }
        if self.max_in_flight == 0 {
            return Err(ClientError::Config {
                message: "max_in_flight must be at least 1".into(),
            });
        }
        Ok(())
    }

    pub fn base_url(&self) -> Result<Url, ClientError> {
        base_url_for_host(&self.host).map_err(ClientError::from)
    }

    /// The adapter's IP, when the host is an IP literal.
    pub fn host_ip(&self) -> Option<IpAddr> {
        match self.base_url().ok()?.host()? {
            Host::Ipv4(v4) => Some(IpAddr::V4(v4)),
            Host::Ipv6(v6) => Some(IpAddr::V6(v6)),
            Host::Domain(_) => None,
        }
    }

    pub(crate) fn credentials(&self) -> BasicCredentials {
        BasicCredentials::new(self.username.clone(), self.password.clone())
    }

    pub(crate) fn transport_config(&self) -> TransportConfig {
        let tls = match &self.tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        };
        TransportConfig {
            tls,
            timeout: self.timeout,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    #[test]
    fn factory_defaults() {
        let config = AdapterConfig::new("192.168.1.100");
        assert_eq!(config.username, "admin");
        assert_eq!(config.password.expose_secret(), "gocoax");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.max_in_flight, 4);
        config.validate().unwrap();
    }

    #[test]
    fn timeout_range_is_enforced() {
        for secs in [9, 301] {
            let config = AdapterConfig::new("10.0.0.2").with_timeout(Duration::from_secs(secs));
            assert!(matches!(config.validate(), Err(ClientError::Config { .. })), "{secs}");
        }
        for secs in [10, 300] {
            let config = AdapterConfig::new("10.0.0.2").with_timeout(Duration::from_secs(secs));
            config.validate().unwrap();
        }
        let config = AdapterConfig::new("10.0.0.2").with_timeout(Duration::from_millis(10_500));
        assert!(config.validate().is_err());
    }

    #[test]
    fn empty_host_is_rejected() {
        assert!(AdapterConfig::new("  ").validate().is_err());
    }

    #[test]
    fn host_ip_only_for_literals() {
        assert_eq!(
            AdapterConfig::new("192.168.1.100").host_ip(),
            Some(IpAddr::from([192, 168, 1, 100]))
        );
        assert_eq!(
            AdapterConfig::new("http://10.0.0.7:8080").host_ip(),
            Some(IpAddr::from([10, 0, 0, 7]))
        );
        assert_eq!(
            AdapterConfig::new("[fe80::1]").host_ip(),
            Some("fe80::1".parse().unwrap())
        );
        assert_eq!(AdapterConfig::new("moca-den.lan").host_ip(), None);
    }
}
