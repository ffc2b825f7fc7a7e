//! Subcommand implementations.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use fathom_config::Config;
use fathom_syntax::{Frontend, Pattern, SexpFrontend, SyntaxNode};

use crate::cli::Command;
use crate::errors::AppError;

mod experiment;
mod rewrite;
mod search;

/// Tracing target for command execution.
const COMMAND_TARGET: &str = "fathom_cli::commands";

pub(crate) fn execute<W: Write>(
    command: Command,
    config: &Config,
    stdout: &mut W,
) -> Result<ExitCode, AppError> {
    match command {
        Command::Search(args) => search::search(&args, stdout),
        Command::Capture(args) => search::capture(&args, stdout),
        Command::Rewrite(args) => rewrite::rewrite(&args, stdout),
        Command::Experiment(args) => experiment::experiment(&args, config, stdout),
    }
}

fn compile(pattern: &str) -> Result<Pattern, AppError> {
    Pattern::compile(pattern).map_err(AppError::Pattern)
}

/// A source file read and parsed with the S-expression front-end.
pub(crate) struct SourceFile {
    path: PathBuf,
    text: String,
    tree: SyntaxNode,
}

impl SourceFile {
    pub(crate) fn load(path: &Path) -> Result<Self, AppError> {
        let text = fs::read_to_string(path).map_err(|source| AppError::ReadSource {
            path: path.to_path_buf(),
            source,
        })?;
        let tree = SexpFrontend
            .parse(&text)
            .map_err(|source| AppError::ParseSource {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self {
            path: path.to_path_buf(),
            text,
            tree,
        })
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn display_path(&self) -> String {
        self.path.display().to_string()
    }

    pub(crate) fn text(&self) -> &str {
        &self.text
    }

    pub(crate) const fn tree(&self) -> &SyntaxNode {
        &self.tree
    }
}
