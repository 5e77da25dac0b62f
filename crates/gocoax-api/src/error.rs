use thiserror::Error;

/// Failure fetching a single endpoint.
///
/// The three kinds are kept apart because callers treat them differently:
/// `Unauthorized` means every other endpoint will fail the same way, while
/// `Unreachable` and `Timeout` only cost the fields that endpoint owns.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Connection refused, DNS failure, or a non-success HTTP status.
    #[error("adapter unreachable: {reason}")]
    Unreachable { reason: String },

    /// The adapter rejected the Basic auth credentials.
    #[error("credentials rejected (HTTP {status})")]
    Unauthorized { status: u16 },

    /// No response within the configured request timeout.
    #[error("request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },
}

impl TransportError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Failure decoding a raw endpoint payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The envelope itself is unusable (not JSON, no `data` array, no markup).
    #[error("malformed payload header: {reason}")]
    MalformedHeader { reason: String },

    /// The payload carried no data words or text at all.
    #[error("payload truncated before first field")]
    TruncatedPayload,

    /// The payload announced a layout version with no table entry.
    #[error("unsupported layout version {version}")]
    UnsupportedLayoutVersion { version: u16 },
}

/// Top-level error type for the `gocoax-api` crate.
///
/// Per-endpoint failures surface as [`TransportError`] / [`DecodeError`];
/// this type adds the setup failures that happen before any request.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// A request against an endpoint failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// URL parsing error (bad host or scheme).
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or HTTP client construction error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Data ────────────────────────────────────────────────────────
    /// A payload could not be decoded.
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

impl Error {
    /// Returns `true` if the adapter rejected the credentials.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_unauthorized())
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Transport(TransportError::Timeout { .. } | TransportError::Unreachable { .. })
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_error_messages() {
        insta::assert_snapshot!(
            TransportError::Unauthorized { status: 401 }.to_string(),
            @"credentials rejected (HTTP 401)"
        );
        insta::assert_snapshot!(
            TransportError::Timeout { timeout_secs: 30 }.to_string(),
            @"request timed out after 30s"
        );
    }

    #[test]
    fn auth_and_transient_classification() {
        let auth = Error::from(TransportError::Unauthorized { status: 401 });
        assert!(auth.is_auth());
        assert!(!auth.is_transient());

        let timeout = Error::from(TransportError::Timeout { timeout_secs: 10 });
        assert!(timeout.is_transient());

        let decode = Error::from(DecodeError::TruncatedPayload);
        assert!(!decode.is_auth());
        assert!(!decode.is_transient());
    }
}
