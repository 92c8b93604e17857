use crate::error::DocsignError;
use crate::storage::jenv::{get_env_bool, get_env_var};
use getset::Getters;
use jsonschema::{Draft, Validator};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::fs;
use tracing::{error, info, warn};

/*
Configuration Loading (12-Factor App Pattern)
=============================================

Configuration is loaded in the following order, with later sources
overriding earlier ones:

1. DEFAULTS: built into the code
2. CONFIG FILE: optional JSON file (docsign.config.json)
3. ENVIRONMENT VARIABLES: always take highest precedence

Environment Variables Supported:
- DOCSIGN_DEFAULT_STORAGE       fs | memory
- DOCSIGN_DATA_DIRECTORY
- DOCSIGN_SEED_DEMO_DATA        true | false
- DOCSIGN_SIGNING_BASE_URL
- DOCSIGN_UPLOAD_LATENCY_MS
- DOCSIGN_VIEW_LATENCY_MS
- DOCSIGN_SIGNING_LATENCY_MS
- DOCSIGN_FAILURE_RATE          0.0 ..= 1.0
- DOCSIGN_LOG_LEVEL
*/

pub const DEFAULT_CONFIG_FILENAME: &str = "docsign.config.json";
pub const CONFIG_SCHEMA_STRING: &str = include_str!("../../schemas/docsign.config.schema.json");

const DEFAULT_STORAGE: &str = "fs";
const DEFAULT_DATA_DIRECTORY: &str = "./docsign_data";
const DEFAULT_SIGNING_BASE_URL: &str = "http://localhost:8080";
const DEFAULT_UPLOAD_LATENCY_MS: u64 = 1500;
const DEFAULT_VIEW_LATENCY_MS: u64 = 1000;
const DEFAULT_SIGNING_LATENCY_MS: u64 = 1000;

#[derive(Serialize, Deserialize, Debug, Clone, Getters)]
pub struct Config {
    #[serde(rename = "$schema")]
    #[serde(default = "default_schema")]
    #[getset(get)]
    schema: String,
    #[getset(get = "pub")]
    #[serde(default)]
    docsign_default_storage: Option<String>,
    #[getset(get = "pub")]
    #[serde(default)]
    docsign_data_directory: Option<String>,
    #[getset(get = "pub")]
    #[serde(default)]
    docsign_seed_demo_data: Option<bool>,
    #[getset(get = "pub")]
    #[serde(default)]
    docsign_signing_base_url: Option<String>,
    #[getset(get = "pub")]
    #[serde(default)]
    docsign_upload_latency_ms: Option<u64>,
    #[getset(get = "pub")]
    #[serde(default)]
    docsign_view_latency_ms: Option<u64>,
    #[getset(get = "pub")]
    #[serde(default)]
    docsign_signing_latency_ms: Option<u64>,
    #[getset(get = "pub")]
    #[serde(default)]
    docsign_failure_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observability: Option<ObservabilityConfig>,
}

fn default_schema() -> String {
    "https://docsign.dev/schemas/docsign.config.schema.json".to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ObservabilityConfig {
    #[serde(default)]
    pub logs: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_destination")]
    pub destination: LogDestination,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            destination: LogDestination::Stderr,
        }
    }
}

fn default_true() -> bool {
    true
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_destination() -> LogDestination {
    LogDestination::Stderr
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum LogDestination {
    #[serde(rename = "stderr")]
    Stderr,
    /// Daily-rotated log files under `path`.
    #[serde(rename = "file")]
    File { path: String },
    #[serde(rename = "null")]
    Null,
}

impl Default for Config {
    fn default() -> Self {
        Config::with_defaults()
    }
}

/// Builder for creating Config instances with a fluent API.
///
/// ```rust
/// use docsign::config::Config;
///
/// let config = Config::builder()
///     .default_storage("memory")
///     .seed_demo_data(false)
///     .latency_ms(0)
///     .build();
/// assert_eq!(config.docsign_default_storage().as_deref(), Some("memory"));
/// ```
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    default_storage: Option<String>,
    data_directory: Option<String>,
    seed_demo_data: Option<bool>,
    signing_base_url: Option<String>,
    upload_latency_ms: Option<u64>,
    view_latency_ms: Option<u64>,
    signing_latency_ms: Option<u64>,
    failure_rate: Option<f64>,
    observability: Option<ObservabilityConfig>,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the storage backend ("fs" or "memory").
    pub fn default_storage(mut self, storage: &str) -> Self {
        self.default_storage = Some(storage.to_string());
        self
    }

    pub fn data_directory(mut self, dir: &str) -> Self {
        self.data_directory = Some(dir.to_string());
        self
    }

    /// Whether an empty store is seeded with the demo documents.
    pub fn seed_demo_data(mut self, seed: bool) -> Self {
        self.seed_demo_data = Some(seed);
        self
    }

    pub fn signing_base_url(mut self, url: &str) -> Self {
        self.signing_base_url = Some(url.to_string());
        self
    }

    /// Set upload, view and signing latency to the same value.
    pub fn latency_ms(mut self, ms: u64) -> Self {
        self.upload_latency_ms = Some(ms);
        self.view_latency_ms = Some(ms);
        self.signing_latency_ms = Some(ms);
        self
    }

    pub fn upload_latency_ms(mut self, ms: u64) -> Self {
        self.upload_latency_ms = Some(ms);
        self
    }

    pub fn view_latency_ms(mut self, ms: u64) -> Self {
        self.view_latency_ms = Some(ms);
        self
    }

    pub fn signing_latency_ms(mut self, ms: u64) -> Self {
        self.signing_latency_ms = Some(ms);
        self
    }

    /// Probability in `0.0..=1.0` that an upload or signing action fails.
    pub fn failure_rate(mut self, rate: f64) -> Self {
        self.failure_rate = Some(rate);
        self
    }

    pub fn observability(mut self, config: ObservabilityConfig) -> Self {
        self.observability = Some(config);
        self
    }

    /// Build the Config. Unset fields take the hardcoded defaults.
    pub fn build(self) -> Config {
        let defaults = Config::with_defaults();
        Config {
            schema: default_schema(),
            docsign_default_storage: self.default_storage.or(defaults.docsign_default_storage),
            docsign_data_directory: self.data_directory.or(defaults.docsign_data_directory),
            docsign_seed_demo_data: self.seed_demo_data.or(defaults.docsign_seed_demo_data),
            docsign_signing_base_url: self
                .signing_base_url
                .or(defaults.docsign_signing_base_url),
            docsign_upload_latency_ms: self
                .upload_latency_ms
                .or(defaults.docsign_upload_latency_ms),
            docsign_view_latency_ms: self.view_latency_ms.or(defaults.docsign_view_latency_ms),
            docsign_signing_latency_ms: self
                .signing_latency_ms
                .or(defaults.docsign_signing_latency_ms),
            docsign_failure_rate: self.failure_rate.or(defaults.docsign_failure_rate),
            observability: self.observability,
        }
    }
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// A Config with only hardcoded defaults (no env var lookups).
    pub fn with_defaults() -> Self {
        Config {
            schema: default_schema(),
            docsign_default_storage: Some(DEFAULT_STORAGE.to_string()),
            docsign_data_directory: Some(DEFAULT_DATA_DIRECTORY.to_string()),
            docsign_seed_demo_data: Some(true),
            docsign_signing_base_url: Some(DEFAULT_SIGNING_BASE_URL.to_string()),
            docsign_upload_latency_ms: Some(DEFAULT_UPLOAD_LATENCY_MS),
            docsign_view_latency_ms: Some(DEFAULT_VIEW_LATENCY_MS),
            docsign_signing_latency_ms: Some(DEFAULT_SIGNING_LATENCY_MS),
            docsign_failure_rate: Some(0.0),
            observability: None,
        }
    }

    /// Merge another config into this one; `Some` values in `other` win.
    pub fn merge(&mut self, other: Config) {
        if other.docsign_default_storage.is_some() {
            self.docsign_default_storage = other.docsign_default_storage;
        }
        if other.docsign_data_directory.is_some() {
            self.docsign_data_directory = other.docsign_data_directory;
        }
        if other.docsign_seed_demo_data.is_some() {
            self.docsign_seed_demo_data = other.docsign_seed_demo_data;
        }
        if other.docsign_signing_base_url.is_some() {
            self.docsign_signing_base_url = other.docsign_signing_base_url;
        }
        if other.docsign_upload_latency_ms.is_some() {
            self.docsign_upload_latency_ms = other.docsign_upload_latency_ms;
        }
        if other.docsign_view_latency_ms.is_some() {
            self.docsign_view_latency_ms = other.docsign_view_latency_ms;
        }
        if other.docsign_signing_latency_ms.is_some() {
            self.docsign_signing_latency_ms = other.docsign_signing_latency_ms;
        }
        if other.docsign_failure_rate.is_some() {
            self.docsign_failure_rate = other.docsign_failure_rate;
        }
        if other.observability.is_some() {
            self.observability = other.observability;
        }
    }

    /// Apply environment variable overrides. Environment always wins.
    ///
    /// Unparseable numeric values are logged and ignored.
    pub fn apply_env_overrides(&mut self) {
        fn env_opt(key: &str) -> Option<String> {
            match get_env_var(key, false) {
                Ok(Some(val)) if !val.is_empty() => Some(val),
                _ => None,
            }
        }

        fn env_opt_parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
            let raw = env_opt(key)?;
            match raw.parse::<T>() {
                Ok(val) => Some(val),
                Err(_) => {
                    warn!("Ignoring {}='{}': not a valid value", key, raw);
                    None
                }
            }
        }

        if let Some(val) = env_opt("DOCSIGN_DEFAULT_STORAGE") {
            self.docsign_default_storage = Some(val);
        }
        if let Some(val) = env_opt("DOCSIGN_DATA_DIRECTORY") {
            self.docsign_data_directory = Some(val);
        }
        if let Some(val) = get_env_bool("DOCSIGN_SEED_DEMO_DATA") {
            self.docsign_seed_demo_data = Some(val);
        }
        if let Some(val) = env_opt("DOCSIGN_SIGNING_BASE_URL") {
            self.docsign_signing_base_url = Some(val);
        }
        if let Some(val) = env_opt_parsed("DOCSIGN_UPLOAD_LATENCY_MS") {
            self.docsign_upload_latency_ms = Some(val);
        }
        if let Some(val) = env_opt_parsed("DOCSIGN_VIEW_LATENCY_MS") {
            self.docsign_view_latency_ms = Some(val);
        }
        if let Some(val) = env_opt_parsed("DOCSIGN_SIGNING_LATENCY_MS") {
            self.docsign_signing_latency_ms = Some(val);
        }
        if let Some(val) = env_opt_parsed("DOCSIGN_FAILURE_RATE") {
            self.docsign_failure_rate = Some(val);
        }
        if let Some(level) = env_opt("DOCSIGN_LOG_LEVEL") {
            let observability = self.observability.get_or_insert_with(Default::default);
            observability.logs.level = level;
        }
    }

    /// Checks values the JSON schema cannot see (env overrides bypass it).
    pub fn validate(&self) -> Result<(), DocsignError> {
        if let Some(rate) = self.docsign_failure_rate {
            if !(0.0..=1.0).contains(&rate) {
                return Err(DocsignError::ConfigError(format!(
                    "docsign_failure_rate must be between 0.0 and 1.0, got {}",
                    rate
                )));
            }
        }
        if let Some(base) = self.docsign_signing_base_url.as_deref() {
            url::Url::parse(base).map_err(|e| {
                DocsignError::ConfigError(format!(
                    "docsign_signing_base_url '{}' is not a valid URL: {}",
                    base, e
                ))
            })?;
        }
        Ok(())
    }

    pub fn log_config(&self) -> LogConfig {
        self.observability
            .as_ref()
            .map(|o| o.logs.clone())
            .unwrap_or_default()
    }

    /// Load config from a JSON file without applying environment overrides.
    pub fn from_file(path: &str) -> Result<Config, DocsignError> {
        let json_str = fs::read_to_string(path).map_err(|e| {
            DocsignError::ConfigError(format!("Failed to read config file '{}': {}", path, e))
        })?;
        let validated_value: Value = validate_config(&json_str)?;
        serde_json::from_value(validated_value).map_err(|e| {
            DocsignError::ConfigError(format!("Config file '{}' could not be read: {}", path, e))
        })
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            r#"
        Loading docsign config variables of:
            DOCSIGN_DEFAULT_STORAGE:     {},
            DOCSIGN_DATA_DIRECTORY:      {},
            DOCSIGN_SEED_DEMO_DATA:      {},
            DOCSIGN_SIGNING_BASE_URL:    {},
            DOCSIGN_UPLOAD_LATENCY_MS:   {},
            DOCSIGN_VIEW_LATENCY_MS:     {},
            DOCSIGN_SIGNING_LATENCY_MS:  {},
            DOCSIGN_FAILURE_RATE:        {},
        "#,
            self.docsign_default_storage.as_deref().unwrap_or(""),
            self.docsign_data_directory.as_deref().unwrap_or(""),
            display_opt(self.docsign_seed_demo_data),
            self.docsign_signing_base_url.as_deref().unwrap_or(""),
            display_opt(self.docsign_upload_latency_ms),
            display_opt(self.docsign_view_latency_ms),
            display_opt(self.docsign_signing_latency_ms),
            display_opt(self.docsign_failure_rate),
        )
    }
}

fn display_opt<T: fmt::Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

pub fn validate_config(config_json: &str) -> Result<Value, DocsignError> {
    let schema: Value = serde_json::from_str(CONFIG_SCHEMA_STRING)?;
    let validator = Validator::options()
        .with_draft(Draft::Draft7)
        .build(&schema)
        .map_err(|e| DocsignError::ConfigError(format!("Invalid config schema: {}", e)))?;

    let instance: Value = serde_json::from_str(config_json).map_err(|e| {
        error!("Invalid JSON: {}", e);
        DocsignError::ConfigError(format!("Config file is not valid JSON: {}", e))
    })?;

    validator.validate(&instance).map_err(|e| {
        let err_msg = format!("Error validating config file: {}", e);
        error!("{}", err_msg);
        DocsignError::ConfigError(err_msg)
    })?;

    Ok(instance)
}

/// Load configuration following 12-Factor App principles.
///
/// Order (later overrides earlier): hardcoded defaults, config file (if
/// given; a missing or invalid file is an error), environment variables.
pub fn load_config_12factor(config_path: Option<&str>) -> Result<Config, DocsignError> {
    let mut config = Config::with_defaults();

    if let Some(path) = config_path {
        let file_config = Config::from_file(path)?;
        info!("Loaded config file: {}", path);
        config.merge(file_config);
    }

    config.apply_env_overrides();
    config.validate()?;

    info!("Final config (12-Factor):{}", config);
    Ok(config)
}

/// Like [`load_config_12factor`], but a missing or unparseable config file
/// only logs a warning and falls back to defaults plus env vars.
pub fn load_config_12factor_optional(config_path: Option<&str>) -> Result<Config, DocsignError> {
    let mut config = Config::with_defaults();

    if let Some(path) = config_path {
        if std::path::Path::new(path).exists() {
            match Config::from_file(path) {
                Ok(file_config) => {
                    info!("Loaded config file: {}", path);
                    config.merge(file_config);
                }
                Err(e) => {
                    warn!("Failed to parse config file '{}': {}. Using defaults.", path, e);
                }
            }
        } else {
            info!(
                "Config file '{}' not found. Using defaults and environment variables.",
                path
            );
        }
    }

    config.apply_env_overrides();
    config.validate()?;

    info!("Final config (12-Factor):{}", config);
    Ok(config)
}
