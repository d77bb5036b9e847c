//! Single-pass run executor.
//!
//! Pulls rows from a line source, pushes each one through the run's
//! pipeline and writes the result before reading further. Pipelines that
//! need to recognise the final row get a one-row lookahead; nothing else is
//! buffered.

use std::io::Write;

use crate::command::{Command, classify};
use crate::dsl::parse_commands;
use crate::error::Result;
use crate::pipeline::{RowContext, RowPipeline, pipeline_for};
use crate::row::{DelimiterSet, Row};
use crate::source::{DelimitedReader, LineSource};

/// Row counts of a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Rows read from the source.
    pub rows_in: usize,
    /// Non-blank rows written to the sink.
    pub rows_out: usize,
}

/// Edit the table read from `source` into `sink`.
///
/// Classifies `commands` before touching the source, so a mixed command
/// list fails without reading any input.
pub fn run<S, W>(
    source: &mut S,
    sink: &mut W,
    delims: &DelimiterSet,
    commands: &[Command],
) -> Result<RunSummary>
where
    S: LineSource + ?Sized,
    W: Write + ?Sized,
{
    let mode = classify(commands)?;
    let mut pipeline = pipeline_for(mode, delims, commands);
    let _span = tracing::debug_span!("run", pipeline = pipeline.name()).entered();
    tracing::debug!(?mode, commands = commands.len(), "starting run");

    let summary = execute(source, sink, pipeline.as_mut())?;
    sink.flush()?;

    tracing::debug!(rows_in = summary.rows_in, rows_out = summary.rows_out, "run finished");
    Ok(summary)
}

/// Drive `source` through `pipeline` until end of input, then flush.
pub fn execute<S, W>(
    source: &mut S,
    sink: &mut W,
    pipeline: &mut dyn RowPipeline,
) -> Result<RunSummary>
where
    S: LineSource + ?Sized,
    W: Write + ?Sized,
{
    let mut summary = RunSummary::default();

    if pipeline.needs_lookahead() {
        // Two slots: the row being processed and the one after it.
        let mut next = source.next_line()?;
        while let Some(current) = next.take() {
            next = source.next_line()?;
            summary.rows_in += 1;
            let ctx = RowContext {
                number: summary.rows_in,
                is_last: next.is_none(),
            };
            emit(sink, pipeline.process(current, ctx)?, &mut summary)?;
        }
    } else {
        while let Some(row) = source.next_line()? {
            summary.rows_in += 1;
            let ctx = RowContext {
                number: summary.rows_in,
                is_last: false,
            };
            emit(sink, pipeline.process(row, ctx)?, &mut summary)?;
        }
    }

    emit(sink, pipeline.flush()?, &mut summary)?;
    Ok(summary)
}

fn emit<W: Write + ?Sized>(sink: &mut W, rows: Vec<Row>, summary: &mut RunSummary) -> Result<()> {
    for row in rows {
        if !row.is_blank() {
            sink.write_all(row.as_bytes())?;
            summary.rows_out += 1;
        }
    }
    Ok(())
}

/// Run an argument list (commands plus optional `-d DELIMS`) over text.
///
/// Returns the edited table and the run summary.
pub fn run_str<T: AsRef<str>>(input: &str, args: &[T]) -> Result<(String, RunSummary)> {
    let parsed = parse_commands(args)?;
    let delims = match parsed.delimiters.as_deref() {
        Some(d) => DelimiterSet::new(d)?,
        None => DelimiterSet::default(),
    };
    let mut source = DelimitedReader::new(input.as_bytes(), delims.clone());
    let mut output = Vec::new();
    let summary = run(&mut source, &mut output, &delims, &parsed.commands)?;
    Ok((String::from_utf8_lossy(&output).into_owned(), summary))
}
