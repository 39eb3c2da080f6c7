//! Client configuration loaded via OrthoConfig.
//!
//! Every value can be set through `CRM_*` environment variables; anything
//! left unset falls back to a local development default.

use std::time::Duration;

use camino::Utf8PathBuf;
use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api/";
const DEFAULT_TOKEN_DIR: &str = ".crm";
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

/// Settings rejected while building the application context.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// The API base URL does not parse.
    #[error("invalid API base URL '{value}': {reason}")]
    InvalidBaseUrl {
        /// Raw configured value.
        value: String,
        /// Parser diagnostic.
        reason: String,
    },
    /// The API base URL cannot carry a path, e.g. `mailto:`.
    #[error("API base URL '{value}' must be an http(s) URL")]
    UnsupportedBaseUrl {
        /// Raw configured value.
        value: String,
    },
    /// A zero timeout would fail every request.
    #[error("request timeout must be greater than zero")]
    ZeroTimeout,
    /// The token directory is blank.
    #[error("token directory must not be empty")]
    EmptyTokenDir,
}

/// Configuration for the CRM client.
#[derive(Debug, Clone, Default, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "CRM")]
pub struct ClientSettings {
    /// Root of the CRM REST API.
    pub api_base_url: Option<String>,
    /// Directory holding the persisted session tokens.
    pub token_dir: Option<String>,
    /// Per-request deadline in milliseconds.
    pub request_timeout_ms: Option<u64>,
    /// Serve sample customers when customer reads fail.
    pub sample_fallback: Option<bool>,
}

impl ClientSettings {
    /// Parsed API base URL, falling back to the local default.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] or
    /// [`ConfigError::UnsupportedBaseUrl`] for unusable values.
    pub fn api_base_url(&self) -> Result<Url, ConfigError> {
        let raw = self.api_base_url.as_deref().unwrap_or(DEFAULT_API_BASE_URL);
        let url = Url::parse(raw).map_err(|err| ConfigError::InvalidBaseUrl {
            value: raw.to_owned(),
            reason: err.to_string(),
        })?;
        if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::UnsupportedBaseUrl {
                value: raw.to_owned(),
            });
        }
        Ok(url)
    }

    /// Token directory, falling back to `.crm` under the working directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyTokenDir`] for a blank value.
    pub fn token_dir(&self) -> Result<Utf8PathBuf, ConfigError> {
        let raw = self.token_dir.as_deref().unwrap_or(DEFAULT_TOKEN_DIR);
        if raw.trim().is_empty() {
            return Err(ConfigError::EmptyTokenDir);
        }
        Ok(Utf8PathBuf::from(raw))
    }

    /// Request deadline, falling back to ten seconds.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroTimeout`] when configured as zero.
    pub fn request_timeout(&self) -> Result<Duration, ConfigError> {
        match self.request_timeout_ms.unwrap_or(DEFAULT_REQUEST_TIMEOUT_MS) {
            0 => Err(ConfigError::ZeroTimeout),
            millis => Ok(Duration::from_millis(millis)),
        }
    }

    /// Whether customer reads fall back to sample data; on unless disabled.
    #[must_use]
    pub fn sample_fallback(&self) -> bool {
        self.sample_fallback.unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for client configuration parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 4] = [
        "CRM_API_BASE_URL",
        "CRM_TOKEN_DIR",
        "CRM_REQUEST_TIMEOUT_MS",
        "CRM_SAMPLE_FALLBACK",
    ];

    fn load_from_empty_args() -> ClientSettings {
        ClientSettings::load_from_iter([OsString::from("crm")]).expect("config should load")
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load_from_empty_args();
        assert_eq!(settings.sample_fallback, None);
        assert!(settings.sample_fallback());
        assert_eq!(
            settings.api_base_url().expect("default url").as_str(),
            DEFAULT_API_BASE_URL
        );
        assert_eq!(settings.token_dir().expect("default dir"), ".crm");
        assert_eq!(
            settings.request_timeout().expect("default timeout"),
            Duration::from_secs(10)
        );
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("CRM_API_BASE_URL", Some("https://crm.example.com/v2".to_owned())),
            ("CRM_TOKEN_DIR", Some("/tmp/crm-tokens".to_owned())),
            ("CRM_REQUEST_TIMEOUT_MS", Some("2500".to_owned())),
            ("CRM_SAMPLE_FALLBACK", Some("false".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert!(!settings.sample_fallback());
        assert_eq!(
            settings.api_base_url().expect("url").as_str(),
            "https://crm.example.com/v2"
        );
        assert_eq!(settings.token_dir().expect("dir"), "/tmp/crm-tokens");
        assert_eq!(
            settings.request_timeout().expect("timeout"),
            Duration::from_millis(2500)
        );
    }

    #[rstest]
    #[case("not a url")]
    #[case("mailto:ops@crm.io")]
    #[case("ftp://crm.io/api")]
    fn unusable_base_urls_are_rejected(#[case] raw: &str) {
        let settings = ClientSettings {
            api_base_url: Some(raw.to_owned()),
            ..ClientSettings::default()
        };
        assert!(settings.api_base_url().is_err());
    }

    #[rstest]
    fn zero_timeout_and_blank_dir_are_rejected() {
        let settings = ClientSettings {
            token_dir: Some("  ".to_owned()),
            request_timeout_ms: Some(0),
            ..ClientSettings::default()
        };
        assert_eq!(settings.request_timeout(), Err(ConfigError::ZeroTimeout));
        assert_eq!(settings.token_dir(), Err(ConfigError::EmptyTokenDir));
    }

    #[rstest]
    #[case(None, true)]
    #[case(Some(true), true)]
    #[case(Some(false), false)]
    fn sample_fallback_is_on_unless_disabled(#[case] raw: Option<bool>, #[case] expected: bool) {
        let settings = ClientSettings {
            sample_fallback: raw,
            ..ClientSettings::default()
        };
        assert_eq!(settings.sample_fallback(), expected);
    }
}
