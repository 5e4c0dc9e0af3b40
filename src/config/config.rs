use std::path::{Path, PathBuf};

use reqwest::Url;
use serde::Deserialize;
use tokio::time::Duration;

use crate::core::parse::ExtensionFilter;
use crate::core::ImportOptions;
use crate::KvseedError;

// Seeder configuration.
// Every field is optional so that a config file, command line flags and
// defaults can be layered with `override_merge`.
#[derive(Deserialize, Debug, Default, Clone)]
pub struct Config {
    // Directory tree to import.
    config_path: Option<PathBuf>,
    // Namespace root of every imported key.
    global_prefix: Option<String>,
    // Delete everything under the prefix before importing.
    reset: Option<bool>,
    // Extensions a file name must contain to be imported.
    acceptable_extensions: Option<Vec<String>>,
    // Extensions parsed as yaml. Everything else is parsed as properties.
    yaml_extensions: Option<Vec<String>>,
    // Max concurrent writes per file.
    write_concurrency: Option<usize>,
    #[serde(default)]
    pub(crate) store: StoreConfig,
    #[serde(default)]
    pub(crate) retry: RetryConfig,
}

// Location of the key value store.
#[derive(Deserialize, Debug, Default, Clone)]
pub struct StoreConfig {
    protocol: Option<String>,
    host: Option<String>,
    // Kept as a string so that a bad port is reported by the health check.
    port: Option<String>,
}

// Connection retry policy.
#[derive(Deserialize, Debug, Default, Clone)]
pub struct RetryConfig {
    // Number of health checks before giving up. Zero or less never checks.
    fail_limit: Option<i32>,
    wait_time_between_fails_milliseconds: Option<u64>,
    probe_timeout_milliseconds: Option<u64>,
}

impl Config {
    const DEFAULT_CONFIG_PATH: &'static str = "./config";
    const DEFAULT_GLOBAL_PREFIX: &'static str = "config";
    const DEFAULT_YAML_EXTENSIONS: [&'static str; 2] = [".yaml", ".yml"];
    const DEFAULT_PROPERTIES_EXTENSIONS: [&'static str; 1] = [".properties"];
    const DEFAULT_WRITE_CONCURRENCY: usize = 8;

    pub fn set_config_path(&mut self, val: &mut Option<PathBuf>) {
        if let Some(val) = val.take() {
            self.config_path = Some(val)
        }
    }
    pub fn set_global_prefix(&mut self, val: &mut Option<String>) {
        if let Some(val) = val.take() {
            self.global_prefix = Some(val)
        }
    }
    pub fn set_reset(&mut self, val: Option<bool>) {
        if let Some(val) = val {
            self.reset = Some(val)
        }
    }
    pub fn set_acceptable_extensions(&mut self, val: &mut Option<Vec<String>>) {
        if let Some(val) = val.take() {
            self.acceptable_extensions = Some(val)
        }
    }
    pub fn set_yaml_extensions(&mut self, val: &mut Option<Vec<String>>) {
        if let Some(val) = val.take() {
            self.yaml_extensions = Some(val)
        }
    }
    pub fn set_write_concurrency(&mut self, val: Option<usize>) {
        if let Some(val) = val {
            self.write_concurrency = Some(std::cmp::max(val, 1));
        }
    }
    pub fn store_mut(&mut self) -> &mut StoreConfig {
        &mut self.store
    }
    pub fn retry_mut(&mut self) -> &mut RetryConfig {
        &mut self.retry
    }

    pub fn override_merge(&mut self, other: &mut Config) {
        self.set_config_path(&mut other.config_path);
        self.set_global_prefix(&mut other.global_prefix);
        self.set_reset(other.reset);
        self.set_acceptable_extensions(&mut other.acceptable_extensions);
        self.set_yaml_extensions(&mut other.yaml_extensions);
        self.set_write_concurrency(other.write_concurrency);
        self.store.override_merge(&mut other.store);
        self.retry.override_merge(&mut other.retry);
    }

    pub fn config_path(&self) -> &Path {
        self.config_path
            .as_deref()
            .unwrap_or_else(|| Path::new(Config::DEFAULT_CONFIG_PATH))
    }

    pub fn global_prefix(&self) -> &str {
        self.global_prefix
            .as_deref()
            .unwrap_or(Config::DEFAULT_GLOBAL_PREFIX)
    }

    pub fn reset(&self) -> bool {
        self.reset.unwrap_or(false)
    }

    pub fn yaml_extensions(&self) -> Vec<String> {
        match self.yaml_extensions {
            Some(ref val) => val.clone(),
            None => Config::DEFAULT_YAML_EXTENSIONS
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
        }
    }

    pub fn acceptable_extensions(&self) -> Vec<String> {
        match self.acceptable_extensions {
            Some(ref val) => val.clone(),
            None => Config::DEFAULT_YAML_EXTENSIONS
                .iter()
                .chain(Config::DEFAULT_PROPERTIES_EXTENSIONS.iter())
                .map(|ext| ext.to_string())
                .collect(),
        }
    }

    pub fn write_concurrency(&self) -> usize {
        self.write_concurrency
            .unwrap_or(Config::DEFAULT_WRITE_CONCURRENCY)
    }

    pub fn store(&self) -> &StoreConfig {
        &self.store
    }

    pub fn retry(&self) -> &RetryConfig {
        &self.retry
    }

    pub fn import_options(&self) -> ImportOptions {
        ImportOptions {
            prefix: self.global_prefix().to_owned(),
            filter: ExtensionFilter::new(self.acceptable_extensions(), self.yaml_extensions()),
            write_concurrency: self.write_concurrency(),
        }
    }
}

impl StoreConfig {
    const DEFAULT_PROTOCOL: &'static str = "http";
    const DEFAULT_HOST: &'static str = "localhost";
    const DEFAULT_PORT: &'static str = "8500";
    const STATUS_PATH: &'static str = "/v1/agent/self";

    pub fn set_protocol(&mut self, val: &mut Option<String>) {
        if let Some(val) = val.take() {
            self.protocol = Some(val)
        }
    }
    pub fn set_host(&mut self, val: &mut Option<String>) {
        if let Some(val) = val.take() {
            self.host = Some(val)
        }
    }
    pub fn set_port(&mut self, val: &mut Option<String>) {
        if let Some(val) = val.take() {
            self.port = Some(val)
        }
    }
    pub(crate) fn override_merge(&mut self, other: &mut StoreConfig) {
        self.set_protocol(&mut other.protocol);
        self.set_host(&mut other.host);
        self.set_port(&mut other.port);
    }

    pub fn protocol(&self) -> &str {
        self.protocol
            .as_deref()
            .unwrap_or(StoreConfig::DEFAULT_PROTOCOL)
    }

    pub fn host(&self) -> &str {
        self.host.as_deref().unwrap_or(StoreConfig::DEFAULT_HOST)
    }

    pub fn port(&self) -> &str {
        self.port.as_deref().unwrap_or(StoreConfig::DEFAULT_PORT)
    }

    pub fn base_url(&self) -> Result<Url, KvseedError> {
        let protocol = self.protocol().to_ascii_lowercase();
        if protocol != "http" && protocol != "https" {
            return Err(KvseedError::Config(format!(
                "unsupported store protocol {:?}",
                self.protocol()
            )));
        }
        if self.host().is_empty() {
            return Err(KvseedError::Config("empty store host".to_owned()));
        }
        let port = self.port().parse::<u16>().map_err(|err| {
            KvseedError::Config(format!("store port {:?}. {}", self.port(), err))
        })?;

        Url::parse(&format!("{}://{}:{}/", protocol, self.host(), port))
            .map_err(|err| KvseedError::Config(format!("store url. {}", err)))
    }

    pub fn status_url(&self) -> Result<Url, KvseedError> {
        self.base_url()?
            .join(StoreConfig::STATUS_PATH)
            .map_err(|err| KvseedError::Config(format!("store status url. {}", err)))
    }
}

impl RetryConfig {
    const DEFAULT_FAIL_LIMIT: i32 = 30;
    const DEFAULT_WAIT_TIME_BETWEEN_FAILS_MILLISECONDS: u64 = 3000;
    const DEFAULT_PROBE_TIMEOUT_MILLISECONDS: u64 = 5000;

    pub fn set_fail_limit(&mut self, val: Option<i32>) {
        if let Some(val) = val {
            self.fail_limit = Some(val)
        }
    }
    pub fn set_wait_time_between_fails_milliseconds(&mut self, val: Option<u64>) {
        if let Some(val) = val {
            self.wait_time_between_fails_milliseconds = Some(val)
        }
    }
    pub fn set_probe_timeout_milliseconds(&mut self, val: Option<u64>) {
        if let Some(val) = val {
            self.probe_timeout_milliseconds = Some(std::cmp::max(val, 10))
        }
    }
    pub(crate) fn override_merge(&mut self, other: &mut RetryConfig) {
        self.set_fail_limit(other.fail_limit);
        self.set_wait_time_between_fails_milliseconds(other.wait_time_between_fails_milliseconds);
        self.set_probe_timeout_milliseconds(other.probe_timeout_milliseconds);
    }

    pub fn fail_limit(&self) -> i32 {
        self.fail_limit.unwrap_or(RetryConfig::DEFAULT_FAIL_LIMIT)
    }

    pub fn wait_time_between_fails(&self) -> Duration {
        Duration::from_millis(
            self.wait_time_between_fails_milliseconds
                .unwrap_or(RetryConfig::DEFAULT_WAIT_TIME_BETWEEN_FAILS_MILLISECONDS),
        )
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(
            self.probe_timeout_milliseconds
                .unwrap_or(RetryConfig::DEFAULT_PROBE_TIMEOUT_MILLISECONDS),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();

        assert_eq!(config.config_path(), Path::new("./config"));
        assert_eq!(config.global_prefix(), "config");
        assert!(!config.reset());
        assert_eq!(config.yaml_extensions(), vec![".yaml", ".yml"]);
        assert_eq!(
            config.acceptable_extensions(),
            vec![".yaml", ".yml", ".properties"]
        );
        assert_eq!(config.retry().fail_limit(), 30);
        assert_eq!(
            config.retry().wait_time_between_fails(),
            Duration::from_secs(3)
        );
        assert_eq!(
            config.store().status_url().unwrap().as_str(),
            "http://localhost:8500/v1/agent/self"
        );
    }

    #[test]
    fn deserialize_and_override() {
        let yaml = r#"
config_path: /etc/seed
global_prefix: edgex
reset: true
store:
  host: consul
  port: "8501"
retry:
  fail_limit: 2
  wait_time_between_fails_milliseconds: 0
yaml_extensions: [".yaml"]
"#;
        let mut config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.config_path(), Path::new("/etc/seed"));
        assert!(config.reset());
        assert_eq!(config.retry().fail_limit(), 2);
        assert_eq!(config.retry().wait_time_between_fails(), Duration::ZERO);

        let mut flags = Config::default();
        flags.set_global_prefix(&mut Some("override".to_owned()));
        flags.store_mut().set_port(&mut Some("9000".to_owned()));
        config.override_merge(&mut flags);

        assert_eq!(config.global_prefix(), "override");
        assert_eq!(config.store().host(), "consul");
        assert_eq!(config.store().base_url().unwrap().as_str(), "http://consul:9000/");
        assert_eq!(config.config_path(), Path::new("/etc/seed"));
    }

    #[test]
    fn malformed_endpoint() {
        let mut store = StoreConfig::default();
        store.set_port(&mut Some("eighty".to_owned()));
        assert!(store.status_url().is_err());

        let mut store = StoreConfig::default();
        store.set_protocol(&mut Some("gopher".to_owned()));
        assert!(store.base_url().is_err());

        let mut store = StoreConfig::default();
        store.set_host(&mut Some("bad host".to_owned()));
        assert!(store.base_url().is_err());
    }
}
