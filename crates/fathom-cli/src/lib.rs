//! Command-line runtime for `fathom`.
//!
//! The runtime splits configuration flags from the subcommand, loads layered
//! configuration, installs logging and dispatches to the command
//! implementations. IO streams are injected so tests can capture output.
//!
//! Exit codes: `0` on success, `1` when an operation fails, `2` on usage
//! errors.

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use clap::error::ErrorKind;

mod cli;
mod commands;
mod config;
mod errors;
mod output;
mod telemetry;

use cli::Cli;
use config::{ConfigLoader, OrthoConfigLoader, split_config_arguments};

/// Exit code reported for malformed command lines.
const USAGE_EXIT_CODE: u8 = 2;

/// Runs the CLI using the provided arguments and IO handles.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    run_with_loader(args, stdout, stderr, &OrthoConfigLoader)
}

/// Runs the CLI with a custom configuration loader.
pub(crate) fn run_with_loader<I, W, E, L>(
    args: I,
    stdout: &mut W,
    stderr: &mut E,
    loader: &L,
) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    let args: Vec<OsString> = args.into_iter().collect();
    let split = split_config_arguments(&args);
    let cli = match Cli::try_parse_from(&split.command_arguments) {
        Ok(cli) => cli,
        Err(error) => return report_usage(&error, stdout, stderr),
    };

    let result = loader.load(&split.config_arguments).and_then(|config| {
        telemetry::initialise(&config)?;
        commands::execute(cli.command, &config, stdout)
    });
    match result {
        Ok(exit_code) => exit_code,
        Err(error) => {
            drop(writeln!(stderr, "{error}"));
            ExitCode::FAILURE
        }
    }
}

fn report_usage<W: Write, E: Write>(error: &clap::Error, stdout: &mut W, stderr: &mut E) -> ExitCode {
    let rendered = error.render();
    if matches!(error.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) {
        drop(write!(stdout, "{rendered}"));
        return ExitCode::SUCCESS;
    }
    drop(write!(stderr, "{rendered}"));
    ExitCode::from(USAGE_EXIT_CODE)
}

#[cfg(test)]
mod tests;
