// Shared transport configuration for building reqwest::Client instances.
//
// The adapter serves plain HTTP out of the box; some firmware can be switched
// to HTTPS with a self-signed certificate, hence the TLS modes.

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::error::Error;

/// TLS verification mode.
#[derive(Debug, Clone)]
pub enum TlsMode {
    /// Use the system certificate store.
    System,
    /// Use a custom CA certificate from the given PEM file.
    CustomCa(PathBuf),
    /// Accept any certificate (adapters ship self-signed).
    DangerAcceptInvalid,
}

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::DangerAcceptInvalid,
            timeout: Duration::from_secs(30),
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(concat!("gocoax/", env!("CARGO_PKG_VERSION")));

        match &self.tls {
            TlsMode::System => {}
            TlsMode::CustomCa(path) => {
                let cert_pem = std::fs::read(path)
                    .map_err(|e| Error::Tls(format!("failed to read CA cert: {e}")))?;
                let cert = reqwest::Certificate::from_pem(&cert_pem)
                    .map_err(|e| Error::Tls(format!("invalid CA cert: {e}")))?;
                builder = builder.add_root_certificate(cert);
            }
            TlsMode::DangerAcceptInvalid => {
                builder = builder.danger_accept_invalid_certs(true);
            }
        }

        builder
            .build()
            .map_err(|e| Error::Tls(format!("failed to build HTTP client: {e}")))
    }
}

/// Turn a configured host into the adapter base URL.
///
/// A bare host or `host:port` gets `http://`; an explicit scheme is kept.
pub fn base_url_for_host(host: &str) -> Result<Url, Error> {
    let host = host.trim().trim_end_matches('/');
    let url = if host.contains("://") {
        Url::parse(host)?
    } else {
        Url::parse(&format!("http://{host}"))?
    };
    Ok(url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn bare_host_defaults_to_http() {
        let url = base_url_for_host("192.168.1.100").unwrap();
        assert_eq!(url.as_str(), "http://192.168.1.100/");
    }

    #[test]
    fn explicit_scheme_and_port_are_kept() {
        let url = base_url_for_host("https://moca.lan:8443/").unwrap();
        assert_eq!(url.scheme(), "https");
        assert_eq!(url.port(), Some(8443));
    }

    #[test]
    fn garbage_host_is_rejected() {
        assert!(matches!(
            base_url_for_host("http://[::1"),
            Err(Error::InvalidUrl(_))
        ));
    }

    #[test]
    fn default_config_builds_client() {
        TransportConfig::default().build_client().unwrap();
    }
}
