//! Process-wide configuration, read once at startup.
//!
//! Values come from the environment (after `main` has loaded an optional
//! `.env` file). Nothing here changes after `Config` is built; handlers and
//! the CRM connection receive it through shared state.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use cobj_core::{ObjectType, DEFAULT_BASE_URL};
use thiserror::Error;

pub const DEFAULT_OBJECT_TYPE: &str = "pets";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
/// Stylesheets and other assets shipped with this crate. Absolute, so the
/// binary finds them whatever its working directory; override with
/// `STATIC_DIR` when deploying elsewhere.
pub const DEFAULT_STATIC_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/public");

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?} ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Clone)]
pub struct Config {
    /// Bearer credential for every CRM call. May be empty; the CRM then
    /// rejects each request.
    pub api_key: String,
    pub object_type: ObjectType,
    pub port: u16,
    pub base_url: String,
    /// `None` leaves the HTTP client's default (no timeout).
    pub timeout: Option<Duration>,
    pub static_dir: PathBuf,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &if self.api_key.is_empty() { "<unset>" } else { "<redacted>" })
            .field("object_type", &self.object_type)
            .field("port", &self.port)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("static_dir", &self.static_dir)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let port = match get("PORT") {
            Some(raw) => parse_number("PORT", &raw)?,
            None => DEFAULT_PORT,
        };
        let timeout_secs = match get("CRM_TIMEOUT_SECS") {
            Some(raw) => parse_number("CRM_TIMEOUT_SECS", &raw)?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            api_key: get("HUBSPOT_API_KEY").unwrap_or_default(),
            object_type: ObjectType::new(
                get("CUSTOM_OBJECT_TYPE").unwrap_or_else(|| DEFAULT_OBJECT_TYPE.to_string()),
            ),
            port,
            base_url: get("HUBSPOT_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            timeout: (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs)),
            static_dir: PathBuf::from(
                get("STATIC_DIR").unwrap_or_else(|| DEFAULT_STATIC_DIR.to_string()),
            ),
        })
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.is_empty()
    }
}

fn parse_number<T>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = config(&[]).unwrap();
        assert!(!config.has_api_key());
        assert_eq!(config.object_type.as_str(), "pets");
        assert_eq!(config.port, 3000);
        assert_eq!(config.base_url, "https://api.hubapi.com");
        assert_eq!(config.timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.static_dir, PathBuf::from(DEFAULT_STATIC_DIR));
    }

    #[test]
    fn default_static_dir_does_not_depend_on_working_directory() {
        let dir = config(&[]).unwrap().static_dir;
        assert!(dir.is_absolute());
        assert!(dir.join("css/style.css").is_file());
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = config(&[
            ("HUBSPOT_API_KEY", "pat-na1-123"),
            ("CUSTOM_OBJECT_TYPE", "2-999"),
            ("PORT", "8080"),
            ("HUBSPOT_BASE_URL", "http://127.0.0.1:4000"),
            ("CRM_TIMEOUT_SECS", "5"),
            ("STATIC_DIR", "/srv/static"),
        ])
        .unwrap();
        assert!(config.has_api_key());
        assert_eq!(config.object_type.as_str(), "2-999");
        assert_eq!(config.port, 8080);
        assert_eq!(config.base_url, "http://127.0.0.1:4000");
        assert_eq!(config.timeout, Some(Duration::from_secs(5)));
        assert_eq!(config.static_dir, PathBuf::from("/srv/static"));
    }

    #[test]
    fn empty_values_fall_back_to_defaults() {
        let config = config(&[("CUSTOM_OBJECT_TYPE", ""), ("PORT", "  ")]).unwrap();
        assert_eq!(config.object_type.as_str(), "pets");
        assert_eq!(config.port, 3000);
    }

    #[test]
    fn zero_timeout_disables_it() {
        let config = config(&[("CRM_TIMEOUT_SECS", "0")]).unwrap();
        assert_eq!(config.timeout, None);
    }

    #[test]
    fn invalid_port_is_rejected() {
        let err = config(&[("PORT", "eighty")]).unwrap_err();
        let ConfigError::Invalid { key, value, .. } = &err;
        assert_eq!(*key, "PORT");
        assert_eq!(value, "eighty");
        assert!(err.to_string().starts_with("invalid value for PORT"));
    }

    #[test]
    fn debug_never_prints_the_api_key() {
        let config = config(&[("HUBSPOT_API_KEY", "pat-na1-secret")]).unwrap();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("pat-na1-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
