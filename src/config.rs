//! Library configuration.
//!
//! Every section has sensible defaults, so an empty JSON object is a valid
//! configuration. Values can be overridden from the environment with
//! [`Config::apply_env`].

use crate::cloud::helpers::config_from_env;
use crate::executor::ExecutorConfig;
use crate::logging::{LoggingConfig, LoggingLevel};
use crate::poll::policy::{PollConfig, PollPolicy};
use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Default prefix of environment overrides.
pub const ENV_PREFIX: &str = "STRATUS_";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub executor: ExecutorConfig,

    #[serde(default)]
    pub poll: PollConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened, is not valid JSON for
    /// this schema, or describes an invalid poll policy.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).with_context(|| format!("open config {}", path.display()))?;
        let config: Self = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("parse config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Override loaded values with `{prefix}THREADS`, `{prefix}POLL_TIMEOUT_MS`,
    /// `{prefix}POLL_PERIOD_MS` and `{prefix}LOG_LEVEL`.
    ///
    /// # Errors
    ///
    /// Returns an error for values that do not parse.
    pub fn apply_env(self, prefix: &str) -> Result<Self> {
        self.with_overrides(prefix, &config_from_env(prefix))
    }

    /// Apply overrides keyed like [`config_from_env`] output: `threads`,
    /// `poll_timeout_ms`, `poll_period_ms` and `log_level`. `prefix` is only
    /// used in error messages.
    ///
    /// A poll period override switches the policy to a fixed period.
    ///
    /// # Errors
    ///
    /// Returns an error for values that do not parse or an invalid result.
    pub fn with_overrides(mut self, prefix: &str, vars: &HashMap<String, String>) -> Result<Self> {

        if let Some(threads) = vars.get("threads") {
            let threads = threads
                .parse::<usize>()
                .with_context(|| format!("{prefix}THREADS must be a number, got {threads:?}"))?;
            self.executor.threads = Some(threads);
        }
        if let Some(timeout) = vars.get("poll_timeout_ms") {
            self.poll.timeout_ms = timeout.parse::<u64>().with_context(|| {
                format!("{prefix}POLL_TIMEOUT_MS must be a number, got {timeout:?}")
            })?;
        }
        if let Some(period) = vars.get("poll_period_ms") {
            let period_ms = period.parse::<u64>().with_context(|| {
                format!("{prefix}POLL_PERIOD_MS must be a number, got {period:?}")
            })?;
            self.poll.policy = PollPolicy::Fixed { period_ms };
        }
        if let Some(level) = vars.get("log_level") {
            self.logging.level = level
                .parse::<LoggingLevel>()
                .map_err(|err| anyhow!("{prefix}LOG_LEVEL: {err}"))?;
        }

        self.validate()?;
        Ok(self)
    }

    /// # Errors
    ///
    /// Returns an error describing the first invalid section.
    pub fn validate(&self) -> Result<()> {
        self.poll.validate().context("invalid poll configuration")?;
        if self.executor.threads == Some(0) {
            return Err(anyhow!("executor threads must be positive"));
        }
        Ok(())
    }
}
