//! CLI configuration: thin wrapper around `gocoax_config`.
//!
//! Adds `GlobalOpts` overrides (--host, --username, --timeout) on top of
//! the profile the shared crate loads.

use gocoax_config::{Config, Profile, SystemSecrets, config_path, profile_to_adapter_config};
use gocoax_core::AdapterConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// The profile to poll, after flag overrides, with its name.
#[derive(Debug, Clone)]
pub struct ResolvedProfile {
    pub name: String,
    pub profile: Profile,
}

/// Pick the active profile and apply command-line overrides.
///
/// With no matching profile, `--host` alone is enough. Naming a profile
/// explicitly that doesn't exist is an error even when `--host` is given.
pub fn resolve_profile(global: &GlobalOpts, cfg: &Config) -> Result<ResolvedProfile, CliError> {
    let name = cfg.profile_name(global.profile.as_deref()).to_owned();

    let mut profile = match (cfg.profiles.get(&name), global.host.as_deref()) {
        (Some(profile), _) => profile.clone(),
        (None, _) if global.profile.is_some() => {
            let mut available: Vec<&str> = cfg.profiles.keys().map(String::as_str).collect();
            available.sort_unstable();
            return Err(CliError::ProfileNotFound {
                name,
                available: if available.is_empty() {
                    "(none)".into()
                } else {
                    available.join(", ")
                },
            });
        }
        (None, Some(host)) => Profile::for_host(host),
        (None, None) => {
            return Err(CliError::NoConfig {
                path: config_path().display().to_string(),
            });
        }
    };

    if let Some(ref host) = global.host {
        profile.host.clone_from(host);
    }
    if let Some(ref username) = global.username {
        profile.username = Some(username.clone());
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }

    Ok(ResolvedProfile { name, profile })
}

/// Build the `AdapterConfig` for the active profile.
pub fn build_adapter_config(global: &GlobalOpts, cfg: &Config) -> Result<AdapterConfig, CliError> {
    let resolved = resolve_profile(global, cfg)?;
    tracing::debug!(profile = %resolved.name, host = %resolved.profile.host, "resolved profile");
    Ok(profile_to_adapter_config(
        &resolved.profile,
        &resolved.name,
        &cfg.defaults,
        &SystemSecrets,
    )?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use clap::Parser;

    use super::*;
    use crate::cli::Cli;

    fn global(args: &[&str]) -> GlobalOpts {
        let mut argv = vec!["gocoax"];
        argv.extend_from_slice(args);
        argv.push("check");
        Cli::try_parse_from(argv).unwrap().global
    }

    fn config_with(name: &str, host: &str) -> Config {
        Config {
            profiles: HashMap::from([(name.to_owned(), Profile::for_host(host))]),
            ..Config::default()
        }
    }

    #[test]
    fn host_flag_without_profile() {
        let resolved = resolve_profile(&global(&["--host", "10.0.0.9"]), &Config::default()).unwrap();
        assert_eq!(resolved.name, "default");
        assert_eq!(resolved.profile.host, "10.0.0.9");
    }

    #[test]
    fn flags_override_profile() {
        let cfg = config_with("default", "192.168.1.100");
        let resolved = resolve_profile(
            &global(&["--username", "root", "--timeout", "90"]),
            &cfg,
        )
        .unwrap();

        assert_eq!(resolved.profile.host, "192.168.1.100");
        assert_eq!(resolved.profile.username(), "root");
        assert_eq!(resolved.profile.timeout, Some(90));
    }

    #[test]
    fn unknown_named_profile_lists_available() {
        let cfg = config_with("den", "192.168.1.100");
        let err = resolve_profile(&global(&["--profile", "attic", "--host", "x"]), &cfg).unwrap_err();
        match err {
            CliError::ProfileNotFound { name, available } => {
                assert_eq!(name, "attic");
                assert_eq!(available, "den");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn nothing_configured_is_no_config() {
        let err = resolve_profile(&global(&[]), &Config::default()).unwrap_err();
        assert!(matches!(err, CliError::NoConfig { .. }));
    }
}
