//! Built-in configuration defaults.

use crate::logging::LogFormat;

/// Default log filter expression used by the binary.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Default ceiling on candidates proposed in one search round.
pub const DEFAULT_MAX_COMBINATIONS: usize = 1000;

/// Default number of files processed concurrently.
pub const DEFAULT_JOBS: usize = 1;

/// Default policy timeout in seconds; zero disables the timeout.
pub const DEFAULT_POLICY_TIMEOUT_SECS: u64 = 0;

/// Default extension of files collected from experiment directories.
pub const DEFAULT_EXPERIMENT_EXTENSION: &str = "sexp";

/// Default log filter expression used by the binary.
#[must_use]
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for the binary.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Compact
}

/// Default per-round combination ceiling.
#[must_use]
pub const fn default_max_combinations() -> usize {
    DEFAULT_MAX_COMBINATIONS
}

/// Default worker count.
#[must_use]
pub const fn default_jobs() -> usize {
    DEFAULT_JOBS
}

/// Default policy timeout in seconds.
#[must_use]
pub const fn default_policy_timeout_secs() -> u64 {
    DEFAULT_POLICY_TIMEOUT_SECS
}

/// Owned experiment extension used by serde.
#[must_use]
pub fn default_experiment_extension() -> String {
    DEFAULT_EXPERIMENT_EXTENSION.to_owned()
}
