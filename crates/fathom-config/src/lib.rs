//! Layered configuration for the `fathom` binary.
//!
//! [`Config`] merges built-in defaults, an optional TOML configuration file
//! (`--config-path` or `FATHOM_CONFIG_PATH`), `FATHOM_*` environment
//! variables and command-line flags, in increasing order of precedence.

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

mod defaults;
mod logging;

pub use defaults::{
    DEFAULT_EXPERIMENT_EXTENSION, DEFAULT_JOBS, DEFAULT_LOG_FILTER, DEFAULT_MAX_COMBINATIONS,
    DEFAULT_POLICY_TIMEOUT_SECS, default_experiment_extension, default_jobs, default_log_filter,
    default_log_filter_string, default_log_format, default_max_combinations,
    default_policy_timeout_secs,
};
pub use logging::{LogFormat, LogFormatParseError};

/// Resolved configuration shared by every command.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "FATHOM")]
#[serde(default)]
pub struct Config {
    /// `tracing` filter expression, e.g. `info` or `fathom_experiment=debug`.
    #[serde(default = "default_log_filter_string")]
    #[ortho_config(default = default_log_filter_string())]
    pub log_filter: String,
    /// Log output format.
    #[serde(default = "default_log_format")]
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
    /// Ceiling on candidates proposed in one search round.
    #[serde(default = "default_max_combinations")]
    #[ortho_config(default = default_max_combinations())]
    pub max_combinations: usize,
    /// Number of files processed concurrently.
    #[serde(default = "default_jobs")]
    #[ortho_config(default = default_jobs())]
    pub jobs: usize,
    /// Seconds before a policy command is killed; zero waits forever.
    #[serde(default = "default_policy_timeout_secs")]
    #[ortho_config(default = default_policy_timeout_secs())]
    pub policy_timeout_secs: u64,
    /// Extension of files collected from experiment directories.
    #[serde(default = "default_experiment_extension")]
    #[ortho_config(default = default_experiment_extension())]
    pub experiment_extension: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
            max_combinations: default_max_combinations(),
            jobs: default_jobs(),
            policy_timeout_secs: default_policy_timeout_secs(),
            experiment_extension: default_experiment_extension(),
        }
    }
}

impl Config {
    /// Returns the log filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Returns the log output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Returns the per-round combination ceiling.
    #[must_use]
    pub const fn max_combinations(&self) -> usize {
        self.max_combinations
    }

    /// Returns the worker count, never less than one.
    #[must_use]
    pub fn jobs(&self) -> usize {
        self.jobs.max(1)
    }

    /// Returns the policy timeout, or `None` when disabled.
    #[must_use]
    pub const fn policy_timeout(&self) -> Option<Duration> {
        match self.policy_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    /// Returns the experiment file extension without a leading dot.
    #[must_use]
    pub fn experiment_extension(&self) -> &str {
        self.experiment_extension.trim_start_matches('.')
    }
}
