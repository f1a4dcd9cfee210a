// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Manager configuration.
//!
//! Configuration is loaded from environment variables:
//!
//! | Variable | Required | Default | Description |
//! |----------|----------|---------|-------------|
//! | `DATALIFT_SUBMISSION_ENGINE` | Yes | - | Registered submission engine name |
//! | `DATALIFT_EXECUTION_ENGINE` | Yes | - | Registered execution engine name |
//! | `DATALIFT_PURGE_THRESHOLD_MS` | No | `86400000` | Submissions older than this are purged |
//! | `DATALIFT_PURGE_SLEEP_MS` | No | `86400000` | Interval between purge cycles |
//! | `DATALIFT_UPDATE_SLEEP_MS` | No | `300000` | Interval between status poll cycles |
//! | `DATALIFT_ENGINE_*` | No | - | Engine option subtree, see below |
//!
//! Every `DATALIFT_ENGINE_*` variable is folded into the engine option
//! context with the prefix stripped, the name lower-cased, and underscores
//! turned into dots: `DATALIFT_ENGINE_SUBMISSION_ENGINE_QUEUE=transfers`
//! becomes `submission.engine.queue = transfers`. Each engine reads its own
//! subtree through its configured prefix.

use std::time::Duration;

use datalift_spi::context::Context;

/// Context prefix handed to the submission engine at initialization.
pub const SUBMISSION_ENGINE_PREFIX: &str = "submission.engine.";

/// Context prefix handed to the execution engine at initialization.
pub const EXECUTION_ENGINE_PREFIX: &str = "execution.engine.";

const DEFAULT_PURGE_THRESHOLD_MS: u64 = 24 * 60 * 60 * 1000;
const DEFAULT_PURGE_SLEEP_MS: u64 = 24 * 60 * 60 * 1000;
const DEFAULT_UPDATE_SLEEP_MS: u64 = 5 * 60 * 1000;

/// Manager configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Name of the submission engine to resolve from the registry.
    pub submission_engine: String,
    /// Name of the execution engine to resolve from the registry.
    pub execution_engine: String,
    /// Submissions older than this are removed by the purge worker.
    pub purge_threshold: Duration,
    /// How often the purge worker runs.
    pub purge_interval: Duration,
    /// How often the update worker polls unfinished submissions.
    pub update_interval: Duration,
    /// Options handed to the engines at initialization.
    pub engine_options: Context,
}

impl Config {
    /// Configuration with default intervals for the given engine pair.
    pub fn new(
        submission_engine: impl Into<String>,
        execution_engine: impl Into<String>,
    ) -> Self {
        Self {
            submission_engine: submission_engine.into(),
            execution_engine: execution_engine.into(),
            purge_threshold: Duration::from_millis(DEFAULT_PURGE_THRESHOLD_MS),
            purge_interval: Duration::from_millis(DEFAULT_PURGE_SLEEP_MS),
            update_interval: Duration::from_millis(DEFAULT_UPDATE_SLEEP_MS),
            engine_options: Context::new(),
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let submission_engine = std::env::var("DATALIFT_SUBMISSION_ENGINE")
            .map_err(|_| ConfigError::MissingEnvVar("DATALIFT_SUBMISSION_ENGINE"))?;

        let execution_engine = std::env::var("DATALIFT_EXECUTION_ENGINE")
            .map_err(|_| ConfigError::MissingEnvVar("DATALIFT_EXECUTION_ENGINE"))?;

        let purge_threshold_ms = std::env::var("DATALIFT_PURGE_THRESHOLD_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_PURGE_THRESHOLD_MS);

        let purge_sleep_ms = std::env::var("DATALIFT_PURGE_SLEEP_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_PURGE_SLEEP_MS);

        let update_sleep_ms = std::env::var("DATALIFT_UPDATE_SLEEP_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_UPDATE_SLEEP_MS);

        let engine_options: Context = std::env::vars()
            .filter_map(|(key, value)| {
                key.strip_prefix("DATALIFT_ENGINE_")
                    .map(|rest| (rest.to_ascii_lowercase().replace('_', "."), value))
            })
            .collect();

        Ok(Self {
            submission_engine,
            execution_engine,
            purge_threshold: Duration::from_millis(purge_threshold_ms),
            purge_interval: Duration::from_millis(purge_sleep_ms),
            update_interval: Duration::from_millis(update_sleep_ms),
            engine_options,
        })
    }

    /// Override the purge retention cutoff.
    pub fn with_purge_threshold(mut self, threshold: Duration) -> Self {
        self.purge_threshold = threshold;
        self
    }

    /// Override the purge cycle interval.
    pub fn with_purge_interval(mut self, interval: Duration) -> Self {
        self.purge_interval = interval;
        self
    }

    /// Override the status poll interval.
    pub fn with_update_interval(mut self, interval: Duration) -> Self {
        self.update_interval = interval;
        self
    }

    /// Replace the engine option context.
    pub fn with_engine_options(mut self, options: Context) -> Self {
        self.engine_options = options;
        self
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required environment variable is missing.
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to serialize tests that modify environment variables
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// Helper to set env vars for a test and restore them after
    struct EnvGuard {
        vars: Vec<(String, Option<String>)>,
    }

    impl EnvGuard {
        fn new() -> Self {
            Self { vars: Vec::new() }
        }

        fn set(&mut self, key: &str, value: &str) {
            let old = env::var(key).ok();
            self.vars.push((key.to_string(), old));
            // SAFETY: Tests are serialized via ENV_MUTEX, so no concurrent access
            unsafe { env::set_var(key, value) };
        }

        fn remove(&mut self, key: &str) {
            let old = env::var(key).ok();
            self.vars.push((key.to_string(), old));
            // SAFETY: Tests are serialized via ENV_MUTEX, so no concurrent access
            unsafe { env::remove_var(key) };
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for (key, value) in self.vars.drain(..).rev() {
                // SAFETY: Tests are serialized via ENV_MUTEX, so no concurrent access
                unsafe {
                    match value {
                        Some(v) => env::set_var(&key, v),
                        None => env::remove_var(&key),
                    }
                }
            }
        }
    }

    #[test]
    fn test_from_env_with_defaults() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let mut guard = EnvGuard::new();

        guard.set("DATALIFT_SUBMISSION_ENGINE", "spark");
        guard.set("DATALIFT_EXECUTION_ENGINE", "batch");
        guard.remove("DATALIFT_PURGE_THRESHOLD_MS");
        guard.remove("DATALIFT_PURGE_SLEEP_MS");
        guard.remove("DATALIFT_UPDATE_SLEEP_MS");

        let config = Config::from_env().unwrap();

        assert_eq!(config.submission_engine, "spark");
        assert_eq!(config.execution_engine, "batch");
        assert_eq!(config.purge_threshold, Duration::from_millis(86_400_000));
        assert_eq!(config.purge_interval, Duration::from_millis(86_400_000));
        assert_eq!(config.update_interval, Duration::from_millis(300_000));
    }

    #[test]
    fn test_from_env_custom_intervals() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let mut guard = EnvGuard::new();

        guard.set("DATALIFT_SUBMISSION_ENGINE", "spark");
        guard.set("DATALIFT_EXECUTION_ENGINE", "batch");
        guard.set("DATALIFT_PURGE_THRESHOLD_MS", "1000");
        guard.set("DATALIFT_PURGE_SLEEP_MS", "2000");
        guard.set("DATALIFT_UPDATE_SLEEP_MS", "3000");

        let config = Config::from_env().unwrap();

        assert_eq!(config.purge_threshold, Duration::from_millis(1000));
        assert_eq!(config.purge_interval, Duration::from_millis(2000));
        assert_eq!(config.update_interval, Duration::from_millis(3000));
    }

    #[test]
    fn test_from_env_unparseable_interval_falls_back() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let mut guard = EnvGuard::new();

        guard.set("DATALIFT_SUBMISSION_ENGINE", "spark");
        guard.set("DATALIFT_EXECUTION_ENGINE", "batch");
        guard.set("DATALIFT_UPDATE_SLEEP_MS", "not_a_number");

        let config = Config::from_env().unwrap();

        assert_eq!(config.update_interval, Duration::from_millis(300_000));
    }

    #[test]
    fn test_from_env_missing_engine_name() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let mut guard = EnvGuard::new();

        guard.remove("DATALIFT_SUBMISSION_ENGINE");
        guard.set("DATALIFT_EXECUTION_ENGINE", "batch");

        let err = Config::from_env().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingEnvVar("DATALIFT_SUBMISSION_ENGINE")
        ));
        assert!(err.to_string().contains("DATALIFT_SUBMISSION_ENGINE"));
    }

    #[test]
    fn test_from_env_collects_engine_options() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let mut guard = EnvGuard::new();

        guard.set("DATALIFT_SUBMISSION_ENGINE", "spark");
        guard.set("DATALIFT_EXECUTION_ENGINE", "batch");
        guard.set("DATALIFT_ENGINE_SUBMISSION_ENGINE_QUEUE", "transfers");

        let config = Config::from_env().unwrap();

        assert_eq!(
            config.engine_options.string("submission.engine.queue"),
            Some("transfers")
        );
        let scoped = config.engine_options.scoped(SUBMISSION_ENGINE_PREFIX);
        assert_eq!(scoped.string("queue"), Some("transfers"));
    }

    #[test]
    fn test_builder_overrides() {
        let config = Config::new("mock", "mock")
            .with_update_interval(Duration::from_millis(50))
            .with_purge_interval(Duration::from_millis(60))
            .with_purge_threshold(Duration::from_millis(70));

        assert_eq!(config.update_interval, Duration::from_millis(50));
        assert_eq!(config.purge_interval, Duration::from_millis(60));
        assert_eq!(config.purge_threshold, Duration::from_millis(70));
    }
}
