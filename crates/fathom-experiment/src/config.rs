//! Runner configuration.

use crate::search::DEFAULT_MAX_COMBINATIONS;

/// Default extension of files searched under lookup directories.
pub const DEFAULT_EXTENSION: &str = "sexp";

/// Tunables for an [`ExperimentRunner`](crate::ExperimentRunner).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExperimentConfig {
    max_combinations: usize,
    jobs: usize,
    extension: String,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            max_combinations: DEFAULT_MAX_COMBINATIONS,
            jobs: 1,
            extension: String::from(DEFAULT_EXTENSION),
        }
    }
}

impl ExperimentConfig {
    /// Sets the ceiling on candidates proposed in one round.
    #[must_use]
    pub const fn with_max_combinations(mut self, max_combinations: usize) -> Self {
        self.max_combinations = max_combinations;
        self
    }

    /// Sets how many files are processed concurrently. Zero means one.
    #[must_use]
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    /// Sets the extension of files collected from lookup directories.
    #[must_use]
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        let ext: String = extension.into();
        self.extension = ext.trim_start_matches('.').to_owned();
        self
    }

    /// Returns the per-round candidate ceiling.
    #[must_use]
    pub const fn max_combinations(&self) -> usize {
        self.max_combinations
    }

    /// Returns the number of worker threads.
    #[must_use]
    pub const fn jobs(&self) -> usize {
        self.jobs
    }

    /// Returns the collected file extension, without a leading dot.
    #[must_use]
    pub fn extension(&self) -> &str {
        &self.extension
    }
}
