//! Errors raised while running experiments.
//!
//! I/O errors are wrapped in `Arc` so outcomes carrying an error stay cheap
//! to clone.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use fathom_syntax::SyntaxError;
use thiserror::Error;

/// Errors arising while evaluating a candidate or processing a file.
#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum ExperimentError {
    /// A file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        /// File that was read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<io::Error>,
    },

    /// A file could not be written.
    #[error("failed to write {}: {source}", path.display())]
    Write {
        /// File that was written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<io::Error>,
    },

    /// The original file does not parse with the experiment's front-end.
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        /// File that was parsed.
        path: PathBuf,
        /// Front-end error.
        #[source]
        source: SyntaxError,
    },

    /// Producing a candidate rewrite failed.
    #[error("failed to rewrite {}: {source}", path.display())]
    Rewrite {
        /// File being rewritten.
        path: PathBuf,
        /// Rewrite error.
        #[source]
        source: SyntaxError,
    },

    /// The policy process could not be started.
    #[error("policy '{program}' failed to start: {source}")]
    PolicySpawn {
        /// Program that was launched.
        program: String,
        /// Underlying I/O error.
        #[source]
        source: Arc<io::Error>,
    },

    /// Waiting on the policy process failed.
    #[error("policy '{program}' could not be awaited: {source}")]
    PolicyWait {
        /// Program that was launched.
        program: String,
        /// Underlying I/O error.
        #[source]
        source: Arc<io::Error>,
    },

    /// A policy reported a failure of its own.
    #[error("policy failed: {message}")]
    Policy {
        /// Human-readable description.
        message: String,
    },
}

impl ExperimentError {
    pub(crate) fn read(path: &Path, source: io::Error) -> Self {
        Self::Read {
            path: path.to_path_buf(),
            source: Arc::new(source),
        }
    }

    pub(crate) fn write(path: &Path, source: io::Error) -> Self {
        Self::Write {
            path: path.to_path_buf(),
            source: Arc::new(source),
        }
    }

    /// Creates a [`ExperimentError::Policy`] from a message.
    #[must_use]
    pub fn policy(message: impl Into<String>) -> Self {
        Self::Policy {
            message: message.into(),
        }
    }
}

/// Errors raised by the combination search state machine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum SearchError {
    /// A round proposed more combinations than the search allows.
    #[error("round {round} proposed {proposed} combinations, above the limit of {limit}")]
    CombinationBudgetExceeded {
        /// Round that overflowed.
        round: usize,
        /// Number of combinations proposed.
        proposed: usize,
        /// Configured ceiling.
        limit: usize,
    },
}

/// Errors raised by the experiment registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum RegistryError {
    /// An experiment with this name is already registered.
    #[error("experiment '{name}' is already registered")]
    Duplicate {
        /// Conflicting name.
        name: String,
    },

    /// No experiment with this name is registered.
    #[error("experiment '{name}' not found in registry")]
    NotFound {
        /// Name that was looked up.
        name: String,
    },
}
