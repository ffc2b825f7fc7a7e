//! Error types for the CLI runtime.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use fathom_experiment::ExperimentError;
use fathom_syntax::SyntaxError;
use thiserror::Error;

use crate::telemetry::TelemetryError;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<ortho_config::OrthoError>),
    #[error("failed to initialise logging: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("invalid pattern: {0}")]
    Pattern(SyntaxError),
    #[error("invalid template: {0}")]
    Template(SyntaxError),
    #[error("failed to read {}: {source}", path.display())]
    ReadSource { path: PathBuf, source: io::Error },
    #[error("failed to write {}: {source}", path.display())]
    WriteSource { path: PathBuf, source: io::Error },
    #[error("failed to parse {}: {source}", path.display())]
    ParseSource { path: PathBuf, source: SyntaxError },
    #[error("failed to rewrite {}: {source}", path.display())]
    Rewrite { path: PathBuf, source: SyntaxError },
    #[error("the policy command must not be empty")]
    MissingPolicy,
    #[error("experiment failed: {0}")]
    Experiment(#[from] ExperimentError),
    #[error("failed to serialise output: {0}")]
    Serialise(serde_json::Error),
    #[error("failed to write output: {0}")]
    Output(io::Error),
}
