//! Rendering of search and capture results.

use std::io::Write;

use fathom_syntax::position::line_col;
use fathom_syntax::{Occurrence, ValueRef};
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::commands::SourceFile;
use crate::errors::AppError;

/// One occurrence of a pattern.
#[derive(Debug, Serialize)]
pub(crate) struct OccurrenceRecord {
    pub(crate) path: String,
    pub(crate) index: usize,
    pub(crate) line: u32,
    pub(crate) column: u32,
    pub(crate) text: String,
    pub(crate) captures: Vec<String>,
}

impl OccurrenceRecord {
    pub(crate) fn new(file: &SourceFile, occurrence: &Occurrence<'_>) -> Self {
        let offset = occurrence.node().span().map_or(0, |span| span.start());
        let (line, column) = line_col(file.text(), offset);
        Self {
            path: file.display_path(),
            index: occurrence.index(),
            line,
            column,
            text: ValueRef::Node(occurrence.node()).source_text(file.text()),
            captures: occurrence
                .captures()
                .iter()
                .map(|value| value.source_text(file.text()))
                .collect(),
        }
    }
}

/// Values captured in one file.
#[derive(Debug, Serialize)]
pub(crate) struct CaptureRecord {
    pub(crate) path: String,
    pub(crate) captures: Vec<String>,
}

pub(crate) fn emit_occurrences<W: Write>(
    records: &[OccurrenceRecord],
    format: OutputFormat,
    out: &mut W,
) -> Result<(), AppError> {
    match format {
        OutputFormat::Json => emit_json(records, out),
        OutputFormat::Human => records.iter().try_for_each(|record| {
            writeln!(
                out,
                "{}:{}:{}: {}",
                record.path, record.line, record.column, record.text
            )
            .map_err(AppError::Output)
        }),
    }
}

pub(crate) fn emit_captures<W: Write>(
    records: &[CaptureRecord],
    format: OutputFormat,
    out: &mut W,
) -> Result<(), AppError> {
    match format {
        OutputFormat::Json => emit_json(records, out),
        OutputFormat::Human => records
            .iter()
            .flat_map(|record| record.captures.iter().map(move |text| (&record.path, text)))
            .try_for_each(|(path, text)| writeln!(out, "{path}: {text}").map_err(AppError::Output)),
    }
}

fn emit_json<T: Serialize + ?Sized, W: Write>(value: &T, out: &mut W) -> Result<(), AppError> {
    serde_json::to_writer_pretty(&mut *out, value).map_err(AppError::Serialise)?;
    writeln!(out).map_err(AppError::Output)
}
