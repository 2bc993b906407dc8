//! Configuration loading and resolution.
//!
//! Values come from an optional TOML file and are overridden by CLI flags.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

pub(crate) const DEFAULT_SERVER: &str = "http://127.0.0.1:5000";
pub(crate) const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;
pub(crate) const DEFAULT_VOLUME_STEP: u16 = 5;

/// Remote configuration loaded from TOML.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RemoteConfig {
    /// Base URL of the playback service.
    pub(crate) server: Option<String>,
    /// Status poll interval in milliseconds.
    pub(crate) poll_interval_ms: Option<u64>,
    /// Volume change per key press, in percent.
    pub(crate) volume_step: Option<u16>,
}

/// Values given on the command line; `None` falls back to the file, then defaults.
#[derive(Debug, Default)]
pub(crate) struct CliOverrides {
    pub(crate) server: Option<String>,
    pub(crate) poll_interval_ms: Option<u64>,
    pub(crate) volume_step: Option<u16>,
}

/// Fully resolved settings used by the UI.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Settings {
    pub(crate) server: String,
    pub(crate) poll_interval: Duration,
    pub(crate) volume_step: u16,
}

impl RemoteConfig {
    /// Load configuration from disk.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let raw =
            std::fs::read_to_string(path).with_context(|| format!("read config {:?}", path))?;
        toml::from_str::<RemoteConfig>(&raw).with_context(|| format!("parse config {:?}", path))
    }

    /// Load the explicit path if given, else `config.toml` next to the executable if present.
    pub(crate) fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match default_config_path().filter(|path| path.is_file()) {
            Some(path) => {
                tracing::info!(path = ?path, "using config next to executable");
                Self::load(&path)
            }
            None => Ok(Self::default()),
        }
    }
}

fn default_config_path() -> Option<PathBuf> {
    std::env::current_exe()
        .ok()
        .and_then(|path| path.parent().map(|dir| dir.join("config.toml")))
}

/// Merge CLI overrides over the file config and validate the result.
pub(crate) fn resolve(cli: &CliOverrides, cfg: &RemoteConfig) -> Result<Settings> {
    let server = cli
        .server
        .as_deref()
        .or(cfg.server.as_deref())
        .unwrap_or(DEFAULT_SERVER)
        .trim()
        .trim_end_matches('/')
        .to_string();
    if !(server.starts_with("http://") || server.starts_with("https://")) {
        anyhow::bail!("server must be an http(s) URL, got {server:?}");
    }

    let poll_ms = cli
        .poll_interval_ms
        .or(cfg.poll_interval_ms)
        .unwrap_or(DEFAULT_POLL_INTERVAL_MS);
    if poll_ms == 0 {
        anyhow::bail!("poll interval must be greater than 0 ms");
    }

    let volume_step = cli
        .volume_step
        .or(cfg.volume_step)
        .unwrap_or(DEFAULT_VOLUME_STEP);
    if !(1..=50).contains(&volume_step) {
        anyhow::bail!("volume step must be within 1..=50, got {volume_step}");
    }

    Ok(Settings {
        server,
        poll_interval: Duration::from_millis(poll_ms),
        volume_step,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_file_or_flags() {
        let settings = resolve(&CliOverrides::default(), &RemoteConfig::default()).unwrap();
        assert_eq!(settings.server, DEFAULT_SERVER);
        assert_eq!(settings.poll_interval, Duration::from_secs(1));
        assert_eq!(settings.volume_step, 5);
    }

    #[test]
    fn cli_overrides_file_values() {
        let cfg = RemoteConfig {
            server: Some("http://file:5000".to_string()),
            poll_interval_ms: Some(250),
            volume_step: Some(10),
        };
        let cli = CliOverrides {
            server: Some("http://cli:5000/".to_string()),
            poll_interval_ms: None,
            volume_step: Some(2),
        };
        let settings = resolve(&cli, &cfg).unwrap();
        assert_eq!(settings.server, "http://cli:5000");
        assert_eq!(settings.poll_interval, Duration::from_millis(250));
        assert_eq!(settings.volume_step, 2);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let cfg = RemoteConfig::default();
        let zero_poll = CliOverrides {
            poll_interval_ms: Some(0),
            ..Default::default()
        };
        assert!(resolve(&zero_poll, &cfg).is_err());

        let bad_url = CliOverrides {
            server: Some("127.0.0.1:5000".to_string()),
            ..Default::default()
        };
        assert!(resolve(&bad_url, &cfg).is_err());

        let big_step = CliOverrides {
            volume_step: Some(80),
            ..Default::default()
        };
        assert!(resolve(&big_step, &cfg).is_err());
    }

    #[test]
    fn toml_file_is_parsed() {
        let cfg: RemoteConfig =
            toml::from_str("server = \"http://jukebox.local:5000\"\npoll_interval_ms = 500\n")
                .unwrap();
        assert_eq!(cfg.server.as_deref(), Some("http://jukebox.local:5000"));
        assert_eq!(cfg.poll_interval_ms, Some(500));
        assert!(cfg.volume_step.is_none());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(toml::from_str::<RemoteConfig>("theme = \"dark\"\n").is_err());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = RemoteConfig::discover(Some(Path::new("/nonexistent/jukebox.toml"))).unwrap_err();
        assert!(format!("{err:#}").contains("read config"));
    }
}
