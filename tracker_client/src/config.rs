use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Tracker service origin; request paths are appended to it.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Relay endpoint every request is rewritten through. The encoded target
    /// URL is appended verbatim, so it normally ends in `?` or `=`.
    #[serde(default = "default_relay_url")]
    pub relay_url: String,

    /// Per-request timeout. Unset means a hung request stays pending.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            relay_url: default_relay_url(),
            request_timeout_secs: None,
            user_agent: None,
        }
    }
}

impl TrackerConfig {
    /// Loads from `explicit` (or `TRACKER_CONFIG`, or the per-user config
    /// file when it exists), then applies environment overrides.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = explicit
            .map(Path::to_path_buf)
            .or_else(|| env::var_os("TRACKER_CONFIG").map(PathBuf::from))
            .or_else(|| default_config_path().filter(|path| path.exists()));

        let config = match path {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        Ok(config.with_overrides(|key| env::var(key).ok()))
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(config.sanitized())
    }

    /// Applies `TRACKER_API_URL`, `TRACKER_RELAY_URL` and
    /// `TRACKER_TIMEOUT_SECS` as resolved by `lookup`. Blank values are ignored.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|raw| !raw.trim().is_empty());

        if let Some(url) = read("TRACKER_API_URL") {
            self.api_base_url = url;
        }
        if let Some(url) = read("TRACKER_RELAY_URL") {
            self.relay_url = url;
        }
        if let Some(secs) = read("TRACKER_TIMEOUT_SECS").and_then(|raw| raw.trim().parse().ok()) {
            self.request_timeout_secs = Some(secs);
        }
        self.sanitized()
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    fn sanitized(mut self) -> Self {
        self.api_base_url = with_scheme(self.api_base_url.trim().to_string());
        while self.api_base_url.ends_with('/') {
            self.api_base_url.pop();
        }
        self.relay_url = with_scheme(self.relay_url.trim().to_string());
        self
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("tracker").join("config.toml"))
}

fn with_scheme(url: String) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        url
    } else {
        format!("https://{url}")
    }
}

fn default_api_base_url() -> String {
    "https://discord-tracker.com".to_string()
}

fn default_relay_url() -> String {
    "https://corsproxy.io/?".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn defaults_point_at_public_service() {
        let config = TrackerConfig::default();
        assert_eq!(config.api_base_url, "https://discord-tracker.com");
        assert_eq!(config.relay_url, "https://corsproxy.io/?");
        assert_eq!(config.request_timeout(), None);
    }

    #[test]
    fn file_values_are_sanitized() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(
            file,
            "api_base_url = \"tracker.local/\"\nrequest_timeout_secs = 5"
        )
        .expect("write config");

        let config = TrackerConfig::from_file(file.path()).expect("config");
        assert_eq!(config.api_base_url, "https://tracker.local");
        assert_eq!(config.relay_url, "https://corsproxy.io/?");
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn unparsable_file_is_reported() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "api_base_url = [").expect("write config");
        let err = TrackerConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn overrides_skip_blank_values() {
        let vars: HashMap<&str, &str> = [
            ("TRACKER_API_URL", "http://127.0.0.1:9000/"),
            ("TRACKER_RELAY_URL", "  "),
            ("TRACKER_TIMEOUT_SECS", "12"),
        ]
        .into_iter()
        .collect();

        let config = TrackerConfig::default()
            .with_overrides(|key| vars.get(key).map(|value| value.to_string()));
        assert_eq!(config.api_base_url, "http://127.0.0.1:9000");
        assert_eq!(config.relay_url, "https://corsproxy.io/?");
        assert_eq!(config.request_timeout_secs, Some(12));
    }
}
