//! CLI error types with miette diagnostics.
//!
//! Maps `ClientError` and `ConfigError` into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use gocoax_config::ConfigError;
use gocoax_core::ClientError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to adapter: {reason}")]
    #[diagnostic(
        code(gocoax::connection_failed),
        help(
            "Check that the adapter is powered and reachable from this machine.\n\
             Factory address is 192.168.1.1 on the adapter's own subnet.\n\
             Try: gocoax check --host <address>"
        )
    )]
    ConnectionFailed { reason: String },

    #[error("Adapter did not respond within {seconds}s")]
    #[diagnostic(
        code(gocoax::timeout),
        help("Increase the timeout with --timeout or check the adapter's load.")
    )]
    Timeout { seconds: u64 },

    #[error("Adapter answered but returned no usable status ({failed} endpoint(s) failed)")]
    #[diagnostic(
        code(gocoax::no_usable_data),
        help("Run with -vv to see each endpoint failure. The firmware may be unsupported.")
    )]
    NoUsableData { failed: usize },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(gocoax::auth_failed),
        help(
            "Factory credentials are admin / gocoax.\n\
             Set the password with GOCOAX_PASSWORD, the system keyring \
             (service 'gocoax', account '<profile>/password') or the profile's password_env."
        )
    )]
    AuthFailed { message: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("No adapter configured")]
    #[diagnostic(
        code(gocoax::no_config),
        help(
            "Pass --host <address>, set GOCOAX_HOST, or add a profile to\n\
             {path}"
        )
    )]
    NoConfig { path: String },

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(code(gocoax::profile_not_found), help("Available profiles: {available}"))]
    ProfileNotFound { name: String, available: String },

    #[error(transparent)]
    #[diagnostic(code(gocoax::config))]
    Config(#[from] ConfigError),

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(gocoax::validation))]
    Validation { field: String, reason: String },

    // ── Watch ────────────────────────────────────────────────────────
    #[error("Stopped watching after {failures} consecutive failed polls")]
    #[diagnostic(code(gocoax::watch_aborted), help("Last error: {last}"))]
    WatchAborted { failures: u32, last: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render output: {0}")]
    #[diagnostic(code(gocoax::render))]
    Render(String),

    #[error("Internal error: {0}")]
    #[diagnostic(code(gocoax::internal))]
    Internal(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } => exit_code::AUTH,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Validation { .. } | Self::ProfileNotFound { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── ClientError → CliError mapping ───────────────────────────────────

impl From<ClientError> for CliError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::AuthenticationFailed { message } => Self::AuthFailed { message },

            ClientError::Timeout { timeout_secs, .. } => Self::Timeout {
                seconds: timeout_secs,
            },

            // Nothing answered at all: report it as a connection problem.
            ClientError::NoUsableData { ref errors }
                if !errors.is_empty()
                    && errors.iter().all(|e| e.failure.kind() == "unreachable") =>
            {
                Self::ConnectionFailed {
                    reason: errors
                        .first()
                        .map(|e| e.failure.to_string())
                        .unwrap_or_default(),
                }
            }

            ClientError::NoUsableData { errors } => Self::NoUsableData {
                failed: errors.len(),
            },

            ClientError::Transport { reason } => Self::ConnectionFailed { reason },

            ClientError::Config { message } => Self::Validation {
                field: "adapter".into(),
                reason: message,
            },

            ClientError::Internal(message) => Self::Internal(message),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use gocoax_core::{Endpoint, EndpointError, TransportError};

    use super::*;

    fn unreachable(endpoint: Endpoint) -> EndpointError {
        EndpointError::new(
            endpoint,
            TransportError::Unreachable {
                reason: "connection refused".into(),
            },
        )
    }

    #[test]
    fn all_unreachable_is_a_connection_failure() {
        let err: CliError = ClientError::NoUsableData {
            errors: Endpoint::ALL.into_iter().map(unreachable).collect(),
        }
        .into();
        assert_eq!(err.exit_code(), exit_code::CONNECTION);
    }

    #[test]
    fn mixed_failures_stay_no_usable_data() {
        let err: CliError = ClientError::NoUsableData {
            errors: vec![
                unreachable(Endpoint::Mac),
                EndpointError::new(
                    Endpoint::Config,
                    TransportError::Timeout { timeout_secs: 30 },
                ),
            ],
        }
        .into();
        assert!(matches!(err, CliError::NoUsableData { failed: 2 }));
        assert_eq!(err.exit_code(), exit_code::GENERAL);
    }

    #[test]
    fn auth_and_timeout_exit_codes() {
        let auth: CliError = ClientError::AuthenticationFailed {
            message: "HTTP 401".into(),
        }
        .into();
        let timeout: CliError = ClientError::Timeout {
            timeout_secs: 30,
            errors: Vec::new(),
        }
        .into();
        assert_eq!(auth.exit_code(), exit_code::AUTH);
        assert_eq!(timeout.exit_code(), exit_code::TIMEOUT);
        assert_eq!(timeout.to_string(), "Adapter did not respond within 30s");
    }
}
