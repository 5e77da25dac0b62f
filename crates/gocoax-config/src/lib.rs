//! Shared configuration for goCoax adapter tools.
//!
//! TOML profiles, password resolution (env + keyring + plaintext), and
//! translation to `gocoax_core::AdapterConfig`. The CLI layers its
//! command-line overrides on top of what this crate resolves.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use gocoax_core::config::{DEFAULT_TIMEOUT_SECS, MAX_TIMEOUT_SECS, MIN_TIMEOUT_SECS};
use gocoax_core::{AdapterConfig, TlsVerification};

/// Env var that points at an alternate config file.
pub const CONFIG_PATH_ENV: &str = "GOCOAX_CONFIG";
/// Env var consulted for the password when a profile names none.
pub const PASSWORD_ENV: &str = "GOCOAX_PASSWORD";
/// Service name for system keyring entries.
pub const KEYRING_SERVICE: &str = "gocoax";

const DEFAULT_USERNAME: &str = "admin";
const DEFAULT_PASSWORD: &str = "gocoax";
const DEFAULT_PROFILE: &str = "default";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found in config")]
    UnknownProfile { name: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when none is named on the command line.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named adapter profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some(DEFAULT_PROFILE.into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Name of the profile to use, given an optional explicit choice.
    pub fn profile_name<'a>(&'a self, requested: Option<&'a str>) -> &'a str {
        requested
            .or(self.default_profile.as_deref())
            .unwrap_or(DEFAULT_PROFILE)
    }

    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::UnknownProfile { name: name.into() })
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    /// Whole-poll timeout, seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Seconds between polls in `watch`.
    #[serde(default = "default_interval")]
    pub interval: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
            interval: default_interval(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}
fn default_interval() -> u64 {
    30
}

/// A named adapter profile.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Profile {
    /// Adapter address: IP, hostname, or URL.
    pub host: String,

    pub username: Option<String>,

    /// Plaintext password. Prefer the keyring or `password_env`.
    pub password: Option<String>,

    /// Name of an env var holding the password.
    pub password_env: Option<String>,

    /// Override the default timeout.
    pub timeout: Option<u64>,

    /// Path to a CA certificate, for adapters behind a TLS proxy.
    pub ca_cert: Option<PathBuf>,

    /// `false` enforces certificate validation against system roots.
    pub insecure: Option<bool>,
}

impl Profile {
    /// Ad-hoc profile for a host given on the command line.
    pub fn for_host(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Self::default()
        }
    }

    /// Copy with the plaintext password masked, for display.
    #[must_use]
    pub fn redacted(&self) -> Self {
        Self {
            password: self.password.as_ref().map(|_| "********".into()),
            ..self.clone()
        }
    }

    pub fn username(&self) -> &str {
        self.username.as_deref().unwrap_or(DEFAULT_USERNAME)
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path: `GOCOAX_CONFIG`, else platform conventions.
pub fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
        return PathBuf::from(path);
    }
    ProjectDirs::from("com", "gocoax", "gocoax").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("gocoax");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from `path` (missing file means defaults) + `GOCOAX_` env vars.
///
/// Nested keys use a double underscore: `GOCOAX_DEFAULTS__TIMEOUT=60`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "loading config");
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("GOCOAX_").split("__"));

    let config: Config = figment.extract()?;
    validate_timeout(config.defaults.timeout, "defaults.timeout")?;
    Ok(config)
}

/// Serialize config to pretty TOML.
pub fn render_config(cfg: &Config) -> Result<String, ConfigError> {
    Ok(toml::to_string_pretty(cfg)?)
}

fn validate_timeout(secs: u64, field: &str) -> Result<(), ConfigError> {
    if (MIN_TIMEOUT_SECS..=MAX_TIMEOUT_SECS).contains(&secs) {
        Ok(())
    } else {
        Err(ConfigError::Validation {
            field: field.into(),
            reason: format!(
                "must be between {MIN_TIMEOUT_SECS} and {MAX_TIMEOUT_SECS} seconds, got {secs}"
            ),
        })
    }
}

// ── Password resolution ─────────────────────────────────────────────

/// Where secrets are looked up.
pub trait SecretSource {
    fn env(&self, name: &str) -> Option<String>;
    fn keyring(&self, account: &str) -> Option<String>;
}

/// Process environment and the platform keyring.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemSecrets;

impl SecretSource for SystemSecrets {
    fn env(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }

    fn keyring(&self, account: &str) -> Option<String> {
        keyring::Entry::new(KEYRING_SERVICE, account)
            .ok()?
            .get_password()
            .ok()
    }
}

/// Keyring account holding a profile's password.
pub fn keyring_account(profile_name: &str) -> String {
    format!("{profile_name}/password")
}

/// Resolve the adapter password.
///
/// Order: the profile's `password_env` var, `GOCOAX_PASSWORD`, the
/// keyring, plaintext in the profile, then the factory default.
pub fn resolve_password(
    profile: &Profile,
    profile_name: &str,
    secrets: &impl SecretSource,
) -> SecretString {
    // 1. Profile's password_env → env var lookup
    if let Some(value) = profile
        .password_env
        .as_deref()
        .and_then(|name| secrets.env(name))
    {
        return SecretString::from(value);
    }

    // 2. Global env var
    if let Some(value) = secrets.env(PASSWORD_ENV) {
        return SecretString::from(value);
    }

    // 3. System keyring
    if let Some(value) = secrets.keyring(&keyring_account(profile_name)) {
        return SecretString::from(value);
    }

    // 4. Plaintext in config
    if let Some(ref value) = profile.password {
        return SecretString::from(value.clone());
    }

    debug!(profile = profile_name, "using factory default password");
    SecretString::from(DEFAULT_PASSWORD.to_owned())
}

/// Build an `AdapterConfig` from a profile.
pub fn profile_to_adapter_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
    secrets: &impl SecretSource,
) -> Result<AdapterConfig, ConfigError> {
    if profile.host.trim().is_empty() {
        return Err(ConfigError::Validation {
            field: "host".into(),
            reason: format!("profile '{profile_name}' has no adapter host"),
        });
    }

    let timeout = profile.timeout.unwrap_or(defaults.timeout);
    validate_timeout(timeout, "timeout")?;

    let tls = if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else if profile.insecure == Some(false) {
        TlsVerification::SystemDefaults
    } else {
        TlsVerification::DangerAcceptInvalid
    };

    let password = resolve_password(profile, profile_name, secrets);
    let mut config = AdapterConfig::new(profile.host.trim())
        .with_credentials(profile.username(), password)
        .with_timeout(Duration::from_secs(timeout));
    config.tls = tls;
    Ok(config)
}
