use std::env;
use std::time::Duration;

use reqwest::Client;
use url::Url;

use crate::error::ConfigError;

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

const BASE_URL_VAR: &str = "EXAM_API_BASE_URL";
const TIMEOUT_VAR: &str = "EXAM_HTTP_TIMEOUT_SECS";

/// Where the parser and grader live and how long to wait for them.
///
/// The base URL is only ever set through `with_base_url`, so it is always an
/// absolute http(s) URL.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExamConfig {
    base_url: String,
    pub request_timeout: Duration,
}

impl Default for ExamConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ExamConfig {
    /// Read `EXAM_API_BASE_URL` and `EXAM_HTTP_TIMEOUT_SECS`, falling back to
    /// defaults when they are unset or blank.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when a variable is set but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();
        if let Some(raw) = read(BASE_URL_VAR) {
            config = config.with_base_url(&raw)?;
        }
        if let Some(raw) = read(TIMEOUT_VAR) {
            let secs = raw
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidTimeout(raw.clone()))?;
            config = config.with_timeout(Duration::from_secs(secs));
        }
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns `ConfigError::InvalidBaseUrl` unless `raw` parses as an
    /// absolute http or https URL.
    pub fn with_base_url(mut self, raw: &str) -> Result<Self, ConfigError> {
        let raw = raw.trim();
        let invalid = |reason: String| ConfigError::InvalidBaseUrl {
            raw: raw.to_owned(),
            reason,
        };
        let url = Url::parse(raw).map_err(|err| invalid(err.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme {:?}", url.scheme())));
        }
        self.base_url = raw.to_owned();
        Ok(self)
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Join an API path onto the base URL.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Build the HTTP client shared by the collaborators.
    ///
    /// # Errors
    ///
    /// Returns `reqwest::Error` if the TLS backend cannot be initialized.
    pub fn http_client(&self) -> Result<Client, reqwest::Error> {
        Client::builder().timeout(self.request_timeout).build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup<'a>(vars: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |key| {
            vars.iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| (*value).to_owned())
        }
    }

    #[test]
    fn endpoint_joins_without_double_slashes() {
        let config = ExamConfig::default()
            .with_base_url("http://exam.local/")
            .unwrap();
        assert_eq!(
            config.endpoint("/api/exam/submit"),
            "http://exam.local/api/exam/submit"
        );
    }

    #[test]
    fn defaults_point_at_local_backend() {
        let config = ExamConfig::default();
        assert_eq!(config.base_url(), "http://127.0.0.1:5000");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn rejects_malformed_and_non_http_urls() {
        for raw in ["http://exa mple/::[bad", "exam.local", "ftp://exam.local"] {
            let err = ExamConfig::default().with_base_url(raw).unwrap_err();
            assert!(
                matches!(err, ConfigError::InvalidBaseUrl { .. }),
                "{raw}: {err:?}"
            );
        }
    }

    #[test]
    fn env_values_are_validated() {
        let config =
            ExamConfig::from_lookup(lookup(&[(BASE_URL_VAR, " https://grader.example ")]))
                .unwrap();
        assert_eq!(config.base_url(), "https://grader.example");

        let blank = ExamConfig::from_lookup(lookup(&[(BASE_URL_VAR, "  ")])).unwrap();
        assert_eq!(blank, ExamConfig::default());

        let err = ExamConfig::from_lookup(lookup(&[(BASE_URL_VAR, "http://exa mple/::[bad")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBaseUrl { .. }));

        let err = ExamConfig::from_lookup(lookup(&[(TIMEOUT_VAR, "soon")])).unwrap_err();
        assert_eq!(err, ConfigError::InvalidTimeout("soon".into()));
    }
}
