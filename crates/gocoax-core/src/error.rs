// ── Core error types ──
//
// `ClientError` is what a poll returns when it can't produce a snapshot at
// all. Anything less than total failure is reported per endpoint through
// `EndpointError` inside a successful `StatusReport`.

use gocoax_api::{DecodeError, Endpoint, TransportError};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use thiserror::Error;

/// Why a single endpoint contributed nothing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EndpointFailure {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

impl EndpointFailure {
    /// Stable machine-readable category.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport(TransportError::Unreachable { .. }) => "unreachable",
            Self::Transport(TransportError::Unauthorized { .. }) => "unauthorized",
            Self::Transport(TransportError::Timeout { .. }) => "timeout",
            Self::Decode(DecodeError::MalformedHeader { .. }) => "malformed_header",
            Self::Decode(DecodeError::TruncatedPayload) => "truncated_payload",
            Self::Decode(DecodeError::UnsupportedLayoutVersion { .. }) => {
                "unsupported_layout_version"
            }
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_timeout())
    }
}

/// A failed endpoint within an otherwise successful poll.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{endpoint}: {failure}")]
pub struct EndpointError {
    pub endpoint: Endpoint,
    #[source]
    pub failure: EndpointFailure,
}

impl EndpointError {
    pub fn new(endpoint: Endpoint, failure: impl Into<EndpointFailure>) -> Self {
        Self {
            endpoint,
            failure: failure.into(),
        }
    }
}

impl Serialize for EndpointError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("EndpointError", 3)?;
        state.serialize_field("endpoint", &self.endpoint)?;
        state.serialize_field("kind", self.failure.kind())?;
        state.serialize_field("message", &self.failure.to_string())?;
        state.end()
    }
}

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum ClientError {
    // ── Poll failures ────────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Adapter did not respond within {timeout_secs}s")]
    Timeout {
        timeout_secs: u64,
        errors: Vec<EndpointError>,
    },

    #[error("Adapter returned no usable data ({} endpoint(s) failed)", errors.len())]
    NoUsableData { errors: Vec<EndpointError> },

    // ── Setup failures ───────────────────────────────────────────────
    #[error("Cannot reach adapter: {reason}")]
    Transport { reason: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ClientError {
    pub(crate) fn rejected(endpoint: Endpoint, status: u16) -> Self {
        Self::AuthenticationFailed {
            message: format!("adapter rejected credentials on {endpoint} (HTTP {status})"),
        }
    }

    /// Per-endpoint detail carried by whole-poll failures.
    pub fn endpoint_errors(&self) -> &[EndpointError] {
        match self {
            Self::Timeout { errors, .. } | Self::NoUsableData { errors } => errors,
            _ => &[],
        }
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, Self::AuthenticationFailed { .. })
    }

    /// Worth retrying on the next poll.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. } | Self::Transport { .. } | Self::NoUsableData { .. }
        )
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<gocoax_api::Error> for ClientError {
    fn from(err: gocoax_api::Error) -> Self {
        match err {
            gocoax_api::Error::Transport(TransportError::Unauthorized { status }) => {
                Self::AuthenticationFailed {
                    message: format!("adapter rejected credentials (HTTP {status})"),
                }
            }
            gocoax_api::Error::Transport(TransportError::Timeout { timeout_secs }) => {
                Self::Timeout {
                    timeout_secs,
                    errors: Vec::new(),
                }
            }
            gocoax_api::Error::Transport(TransportError::Unreachable { reason }) => {
                Self::Transport { reason }
            }
            gocoax_api::Error::InvalidUrl(e) => Self::Config {
                message: format!("Invalid adapter address: {e}"),
            },
            gocoax_api::Error::Tls(msg) => Self::Transport {
                reason: format!("TLS error: {msg}"),
            },
            gocoax_api::Error::Decode(e) => Self::Internal(format!("Decode error: {e}")),
        }
    }
}
