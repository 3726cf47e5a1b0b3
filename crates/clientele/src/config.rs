//! CLI configuration: thin wrapper around `clientele_config`.
//!
//! Adds resolution that respects `GlobalOpts` overrides
//! (`--api-url`, `--timeout`, `--insecure`) on top of the active profile.

use std::time::Duration;

use clientele_config::TokenStoreKind;
use clientele_core::{ClientConfig, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use clientele_config::{
    Config, Profile, config_path, data_dir, load_config_or_default, save_config,
};

/// Everything needed to open a controller for one profile.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub profile_name: String,
    pub client: ClientConfig,
    pub token_store: TokenStoreKind,
}

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    config.active_profile_name(global.profile.as_deref())
}

/// Profile values, then flag / env overrides.
///
/// A profile named explicitly with `--profile` must exist. Without one,
/// an unconfigured install talks to the default local server.
pub fn resolve(global: &GlobalOpts, config: &Config) -> Result<Resolved, CliError> {
    let profile_name = active_profile_name(global, config);

    let (mut client, token_store) = match config.profiles.get(&profile_name) {
        Some(profile) => (
            profile.client_config(&config.defaults)?,
            profile.token_store,
        ),
        None if global.profile.is_some() => {
            let mut available: Vec<_> = config.profiles.keys().cloned().collect();
            available.sort();
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: if available.is_empty() {
                    "(none)".into()
                } else {
                    available.join(", ")
                },
            });
        }
        None => (
            ClientConfig {
                timeout: config.defaults.timeout.map(Duration::from_secs),
                ..ClientConfig::default()
            },
            TokenStoreKind::default(),
        ),
    };

    if let Some(ref raw) = global.api_url {
        client.url = clientele_config::parse_api_url(raw)?;
    }
    if let Some(secs) = global.timeout {
        client.timeout = Some(Duration::from_secs(secs));
    }
    if global.insecure {
        client.tls = TlsVerification::DangerAcceptInvalid;
    }

    tracing::debug!(profile = %profile_name, url = %client.url, "resolved configuration");
    Ok(Resolved {
        profile_name,
        client,
        token_store,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::Parser;

    use super::*;
    use crate::cli::Cli;

    fn global(args: &[&str]) -> GlobalOpts {
        let mut argv = vec!["clientele"];
        argv.extend_from_slice(args);
        argv.push("whoami");
        Cli::try_parse_from(argv).unwrap().global
    }

    fn config_with_local() -> Config {
        let mut cfg = Config::default();
        let mut local = Profile::new("http://local.test:9000");
        local.timeout = Some(12);
        local.token_store = TokenStoreKind::Keyring;
        cfg.profiles.insert("local".into(), local);
        cfg.default_profile = Some("local".into());
        cfg
    }

    #[test]
    fn profile_values_apply() {
        let resolved = resolve(&global(&[]), &config_with_local()).unwrap();
        assert_eq!(resolved.profile_name, "local");
        assert_eq!(resolved.client.url.as_str(), "http://local.test:9000/");
        assert_eq!(resolved.client.timeout, Some(Duration::from_secs(12)));
        assert_eq!(resolved.token_store, TokenStoreKind::Keyring);
    }

    #[test]
    fn flags_override_profile() {
        let g = global(&["--api-url", "https://api.test", "--timeout", "3", "-k"]);
        let resolved = resolve(&g, &config_with_local()).unwrap();
        assert_eq!(resolved.client.url.as_str(), "https://api.test/");
        assert_eq!(resolved.client.timeout, Some(Duration::from_secs(3)));
        assert_eq!(resolved.client.tls, TlsVerification::DangerAcceptInvalid);
    }

    #[test]
    fn unconfigured_install_uses_local_server() {
        let resolved = resolve(&global(&[]), &Config::default()).unwrap();
        assert_eq!(resolved.profile_name, "default");
        assert_eq!(resolved.client.url.as_str(), "http://localhost:8080/");
        assert!(resolved.client.timeout.is_none());
    }

    #[test]
    fn unknown_explicit_profile_is_an_error() {
        let err = resolve(&global(&["-p", "prod"]), &config_with_local()).unwrap_err();
        assert!(matches!(err, CliError::ProfileNotFound { ref available, .. } if available == "local"));
    }
}
