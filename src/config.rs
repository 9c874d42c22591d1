//! Configuration loading.
//!
//! Settings come from a YAML/TOML file plus `PROMPORTAL_*` environment
//! overrides, using `__` for nesting (`PROMPORTAL_BACKEND__PORT=9091`).
//! The static object catalog lives in the same file under `objects`.

use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

use promportal_adapters::prometheus::PrometheusClient;
use promportal_adapters::{AdapterError, RetryPolicy};
use promportal_types::ObjectDefinition;

use crate::catalog::ObjectCatalog;
use crate::engine::{EngineSettings, DEFAULT_MAX_CONCURRENT_REQUESTS, DEFAULT_VALID_INTERVAL_SECONDS};
use crate::registry::{HandlerKind, Operation};

/// Environment variable prefix for overrides.
pub const ENV_PREFIX: &str = "PROMPORTAL";

/// Everything the data source needs at startup.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub backend: BackendSettings,
    pub search: SearchSettings,
    pub handlers: HandlerSettings,
    pub objects: Vec<ObjectDefinition>,
}

/// How to reach the metrics backend.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BackendSettings {
    pub hostname: String,
    /// Without a port the hostname is used as the whole target.
    pub port: Option<u16>,
    pub scheme: String,
    #[serde(deserialize_with = "crate::duration::deserialize")]
    pub timeout: Duration,
    #[serde(deserialize_with = "crate::duration::deserialize")]
    pub probe_timeout: Duration,
    pub retry_attempts: u32,
    #[serde(deserialize_with = "crate::duration::deserialize")]
    pub retry_delay: Duration,
    pub max_concurrent_requests: usize,
}

impl Default for BackendSettings {
    fn default() -> Self {
        let retry = RetryPolicy::default();
        Self {
            hostname: "localhost".to_string(),
            port: Some(9090),
            scheme: "http".to_string(),
            timeout: Duration::from_secs(60),
            probe_timeout: Duration::from_secs(3),
            retry_attempts: retry.attempts,
            retry_delay: retry.delay,
            max_concurrent_requests: DEFAULT_MAX_CONCURRENT_REQUESTS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    pub valid_interval_seconds: f64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            valid_interval_seconds: DEFAULT_VALID_INTERVAL_SECONDS,
        }
    }
}

/// Which implementation answers each operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct HandlerSettings {
    pub object_search: HandlerKind,
    pub topn_search: HandlerKind,
    pub time_series_data: HandlerKind,
}

impl HandlerSettings {
    pub fn kinds(&self) -> [(Operation, HandlerKind); 3] {
        [
            (Operation::ObjectSearch, self.object_search),
            (Operation::TopnSearch, self.topn_search),
            (Operation::TimeSeriesData, self.time_series_data),
        ]
    }
}

impl Settings {
    /// Load settings from an optional file and the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        let settings: Settings = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    /// Reject settings the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.backend.hostname.is_empty() {
            bail!("backend.hostname must not be empty");
        }
        if self.backend.retry_attempts == 0 {
            bail!("backend.retry_attempts must be at least 1");
        }
        if self.backend.max_concurrent_requests == 0 {
            bail!("backend.max_concurrent_requests must be at least 1");
        }

        let mut seen = HashSet::new();
        for object in &self.objects {
            if !seen.insert((&object.object_type_id, &object.object_id)) {
                bail!(
                    "duplicate catalog object {}/{}",
                    object.object_type_id,
                    object.object_id
                );
            }
        }
        Ok(())
    }

    /// The object catalog, in file order.
    pub fn catalog(&self) -> ObjectCatalog {
        ObjectCatalog::new(self.objects.clone())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            attempts: self.backend.retry_attempts,
            delay: self.backend.retry_delay,
        }
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            valid_interval_seconds: self.search.valid_interval_seconds,
            max_concurrent_requests: self.backend.max_concurrent_requests,
        }
    }

    /// Build the Prometheus client described by the backend section.
    pub fn build_backend(&self) -> Result<PrometheusClient, AdapterError> {
        PrometheusClient::builder()
            .hostname(&self.backend.hostname)
            .maybe_port(self.backend.port)
            .scheme(&self.backend.scheme)
            .timeout(self.backend.timeout)
            .probe_timeout(self.backend.probe_timeout)
            .retry(self.retry_policy())
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    fn write_config(extension: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = Builder::new().suffix(extension).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.backend.hostname, "localhost");
        assert_eq!(settings.backend.port, Some(9090));
        assert_eq!(settings.retry_policy(), RetryPolicy::default());
        assert_eq!(settings.engine_settings(), EngineSettings::default());
        assert_eq!(settings.handlers.topn_search, HandlerKind::Prometheus);
        assert!(settings.catalog().is_empty());
    }

    #[test]
    fn test_load_yaml() {
        let file = write_config(
            ".yaml",
            r#"
backend:
  hostname: prom.internal
  port: 9091
  timeout: 30s
  probe_timeout: 500ms
  retry_attempts: 2
  retry_delay: 1
  max_concurrent_requests: 8
search:
  valid_interval_seconds: 60
handlers:
  topn_search: disabled
objects:
  - { object_id: h1, object_type_id: host, display_name: Host1 }
  - { object_id: h2, object_type_id: host, display_name: Host2 }
"#,
        );

        let settings = Settings::load(Some(file.path())).unwrap();

        assert_eq!(settings.backend.hostname, "prom.internal");
        assert_eq!(settings.backend.port, Some(9091));
        assert_eq!(settings.backend.scheme, "http");
        assert_eq!(settings.backend.timeout, Duration::from_secs(30));
        assert_eq!(settings.backend.probe_timeout, Duration::from_millis(500));
        assert_eq!(
            settings.retry_policy(),
            RetryPolicy {
                attempts: 2,
                delay: Duration::from_secs(1)
            }
        );
        assert_eq!(settings.engine_settings().max_concurrent_requests, 8);
        assert_eq!(settings.engine_settings().valid_interval_seconds, 60.0);
        assert_eq!(settings.handlers.topn_search, HandlerKind::Disabled);
        assert_eq!(settings.handlers.object_search, HandlerKind::Prometheus);

        let catalog = settings.catalog();
        let ids: Vec<_> = catalog.iter().map(|o| o.object_id.as_str()).collect();
        assert_eq!(ids, vec!["h1", "h2"]);

        let backend = settings.build_backend().unwrap();
        assert_eq!(
            backend.query_range_url(),
            "http://prom.internal:9091/api/v1/query_range"
        );
    }

    #[test]
    fn test_duplicate_objects_rejected() {
        let file = write_config(
            ".yaml",
            r#"
objects:
  - { object_id: h1, object_type_id: host, display_name: Host1 }
  - { object_id: h1, object_type_id: host, display_name: Again }
"#,
        );
        let err = Settings::load(Some(file.path())).unwrap_err();
        assert!(err.to_string().contains("duplicate catalog object host/h1"));
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let mut settings = Settings::default();
        settings.backend.max_concurrent_requests = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_bad_duration_rejected() {
        let file = write_config(".toml", "[backend]\ntimeout = \"soon\"\n");
        assert!(Settings::load(Some(file.path())).is_err());
    }
}
