use std::io::Write;
use std::process::ExitCode;

use fathom_syntax::{LogTracer, Matcher, Pattern};
use tracing::debug;

use super::{COMMAND_TARGET, SourceFile, compile};
use crate::cli::SearchArgs;
use crate::errors::AppError;
use crate::output::{CaptureRecord, OccurrenceRecord, emit_captures, emit_occurrences};

static LOG_TRACER: LogTracer = LogTracer;

fn matcher_for(pattern: &Pattern, trace: bool) -> Matcher<'_> {
    let plain = Matcher::new(pattern);
    if trace {
        plain.with_tracer(&LOG_TRACER)
    } else {
        plain
    }
}

pub(super) fn search<W: Write>(args: &SearchArgs, stdout: &mut W) -> Result<ExitCode, AppError> {
    let pattern = compile(&args.pattern)?;
    let matcher = matcher_for(&pattern, args.trace);
    let mut records = Vec::new();
    for path in &args.files {
        let file = SourceFile::load(path)?;
        let found = matcher.search(file.tree());
        debug!(
            target: COMMAND_TARGET,
            path = %path.display(),
            occurrences = found.len(),
            "searched file"
        );
        records.extend(
            found
                .iter()
                .map(|occurrence| OccurrenceRecord::new(&file, occurrence)),
        );
    }
    emit_occurrences(&records, args.format, stdout)?;
    Ok(ExitCode::SUCCESS)
}

pub(super) fn capture<W: Write>(args: &SearchArgs, stdout: &mut W) -> Result<ExitCode, AppError> {
    let pattern = compile(&args.pattern)?;
    let matcher = matcher_for(&pattern, args.trace);
    let mut records = Vec::with_capacity(args.files.len());
    for path in &args.files {
        let file = SourceFile::load(path)?;
        let captures = matcher
            .capture(file.tree())
            .into_vec()
            .into_iter()
            .map(|value| value.source_text(file.text()))
            .collect();
        records.push(CaptureRecord {
            path: file.display_path(),
            captures,
        });
    }
    emit_captures(&records, args.format, stdout)?;
    Ok(ExitCode::SUCCESS)
}
