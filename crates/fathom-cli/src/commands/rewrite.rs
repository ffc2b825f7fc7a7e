use std::fs;
use std::io::Write;
use std::process::ExitCode;

use fathom_syntax::RewriteRule;
use tracing::info;

use super::{COMMAND_TARGET, SourceFile, compile};
use crate::cli::RewriteArgs;
use crate::errors::AppError;

pub(super) fn rewrite<W: Write>(args: &RewriteArgs, stdout: &mut W) -> Result<ExitCode, AppError> {
    let pattern = compile(&args.pattern)?;
    let base = RewriteRule::new(pattern, args.template.as_str()).map_err(AppError::Template)?;
    let rule = match args.only {
        Some(index) => base.only(index),
        None => base,
    };
    let file = SourceFile::load(&args.file)?;
    let result = rule
        .apply(file.tree(), file.text())
        .map_err(|source| AppError::Rewrite {
            path: file.path().to_path_buf(),
            source,
        })?;

    if !args.write {
        stdout
            .write_all(result.output().as_bytes())
            .map_err(AppError::Output)?;
        return Ok(ExitCode::SUCCESS);
    }

    if result.has_changes() {
        fs::write(file.path(), result.output()).map_err(|source| AppError::WriteSource {
            path: file.path().to_path_buf(),
            source,
        })?;
    }
    info!(
        target: COMMAND_TARGET,
        path = %file.path().display(),
        occurrences = result.occurrences(),
        edits = result.edits(),
        "rewrote file"
    );
    Ok(ExitCode::SUCCESS)
}
