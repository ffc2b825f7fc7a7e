//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Output format for search and capture results.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// One line per result.
    #[default]
    Human,
    /// A single JSON array.
    Json,
}

/// Structural search, rewriting and rewrite experiments over syntax trees.
#[derive(Parser, Debug)]
#[command(name = "fathom", version, disable_help_subcommand = true)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// Lists every occurrence of a pattern.
    Search(SearchArgs),
    /// Prints the values captured by a pattern.
    Capture(SearchArgs),
    /// Rewrites occurrences of a pattern using a template.
    Rewrite(RewriteArgs),
    /// Keeps the largest set of rewrites an external policy accepts.
    Experiment(ExperimentArgs),
}

#[derive(Args, Debug)]
pub(crate) struct SearchArgs {
    /// Pattern to match, e.g. `(send nil :puts $_)`.
    #[arg(value_name = "PATTERN", allow_hyphen_values = true)]
    pub(crate) pattern: String,
    /// Files to search.
    #[arg(value_name = "FILE", required = true)]
    pub(crate) files: Vec<PathBuf>,
    /// How results are printed.
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub(crate) format: OutputFormat,
    /// Logs every pattern evaluation; pair with `--log-filter fathom_syntax=trace`.
    #[arg(long)]
    pub(crate) trace: bool,
}

#[derive(Args, Debug)]
pub(crate) struct RewriteArgs {
    /// Pattern to match.
    #[arg(value_name = "PATTERN", allow_hyphen_values = true)]
    pub(crate) pattern: String,
    /// Replacement text; `$N` inserts the source of capture `N`.
    #[arg(value_name = "TEMPLATE", allow_hyphen_values = true)]
    pub(crate) template: String,
    /// File to rewrite.
    #[arg(value_name = "FILE")]
    pub(crate) file: PathBuf,
    /// Rewrites only the Nth occurrence, counted from 1.
    #[arg(long, value_name = "N")]
    pub(crate) only: Option<usize>,
    /// Writes the result back instead of printing it.
    #[arg(long)]
    pub(crate) write: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ExperimentArgs {
    /// Pattern to match.
    #[arg(value_name = "PATTERN", allow_hyphen_values = true)]
    pub(crate) pattern: String,
    /// Replacement text; `$N` inserts the source of capture `N`.
    #[arg(value_name = "TEMPLATE", allow_hyphen_values = true)]
    pub(crate) template: String,
    /// Files or directories to experiment on.
    #[arg(value_name = "PATH", required = true)]
    pub(crate) paths: Vec<PathBuf>,
    /// Seconds before the policy command is killed; overrides configuration.
    #[arg(long, value_name = "SECS")]
    pub(crate) timeout: Option<u64>,
    /// Policy command; `{file}` is replaced by the candidate path.
    #[arg(
        long,
        value_name = "CMD",
        required = true,
        num_args = 1..,
        allow_hyphen_values = true
    )]
    pub(crate) policy: Vec<String>,
}
