//! Entry point for the `fathom` binary.
//!
//! Delegates to [`fathom_cli::run`]. Standard error stays unlocked because
//! experiment workers log to it from their own threads.

use std::io;
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout = io::stdout().lock();
    let mut stderr = io::stderr();
    fathom_cli::run(std::env::args_os(), &mut stdout, &mut stderr)
}
