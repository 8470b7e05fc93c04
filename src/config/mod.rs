use serde::Deserialize;
use std::{env, fs, path::Path};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config parse error: {0}")]
    Parse(String),
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DispatcherConfig {
    /// Size of an owned worker pool; 0 lets Tokio pick (one per CPU).
    pub worker_threads: usize,
    pub thread_name: String,
    /// Always build an owned pool, even when a Tokio runtime is already running.
    pub dedicated_pool: bool,
    /// Attach the caller's source location to empty/unsubscribed publish
    /// diagnostics. Defaults to on in debug builds only.
    pub capture_call_site: Option<bool>,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            worker_threads: 0,
            thread_name: "localmq-worker".to_string(),
            dedicated_pool: false,
            capture_call_site: None,
        }
    }
}

impl DispatcherConfig {
    pub fn capture_call_site(&self) -> bool {
        self.capture_call_site.unwrap_or(cfg!(debug_assertions))
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is not set.
    pub filter: String,
    pub ansi: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            ansi: true,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub dispatcher: DispatcherConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Defaults plus `LOCALMQ_*` environment overrides.
    pub fn from_env_only() -> Result<Self, ConfigError> {
        let mut cfg = Config::default();
        cfg.apply_env_overrides()?;
        Ok(cfg)
    }

    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| env::var(key).ok())
    }

    /// Applies overrides from an arbitrary key lookup. Keys use the
    /// `LOCALMQ_` prefix.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("LOCALMQ_WORKER_THREADS") {
            self.dispatcher.worker_threads = v
                .trim()
                .parse()
                .map_err(|e| ConfigError::Parse(format!("LOCALMQ_WORKER_THREADS: {e}")))?;
        }

        if let Some(v) = lookup("LOCALMQ_THREAD_NAME") {
            self.dispatcher.thread_name = v;
        }

        if let Some(v) = lookup("LOCALMQ_DEDICATED_POOL") {
            self.dispatcher.dedicated_pool = parse_flag("LOCALMQ_DEDICATED_POOL", &v)?;
        }

        if let Some(v) = lookup("LOCALMQ_CAPTURE_CALL_SITE") {
            self.dispatcher.capture_call_site = Some(parse_flag("LOCALMQ_CAPTURE_CALL_SITE", &v)?);
        }

        if let Some(v) = lookup("LOCALMQ_LOG") {
            self.logging.filter = v;
        }

        Ok(())
    }
}

fn parse_flag(key: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::Parse(format!("{key}: invalid flag '{other}'"))),
    }
}

/// Reads a TOML file, then applies environment overrides.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, anyhow::Error> {
    let raw: String = fs::read_to_string(path)?;
    let mut config: Config = toml::from_str(&raw)?;
    config.apply_env_overrides()?;
    Ok(config)
}
