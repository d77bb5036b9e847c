//! # sheet-rs
//!
//! A single-pass editor for delimiter-separated text tables.
//!
//! Rows are read one at a time into a bounded buffer, edited in place and
//! written out before the next row is read; the table is never held in
//! memory as a whole.
//!
//! ## Overview
//!
//! - **Rows**: at most 10 KiB each, newline included
//! - **Delimiters**: any of a set of bytes separates columns; the first one
//!   is canonical and replaces the others on input
//! - **Commands**: structural edits (rows and columns), data edits (cell
//!   content) and row selection, applied in the order given
//!
//! ## Example
//!
//! ```
//! use sheet_rs::run_str;
//!
//! let (output, summary) = run_str("a,b,c\nd,e,f\n", &["-d", ",", "dcol", "2"]).unwrap();
//!
//! assert_eq!(output, "a,c\nd,f\n");
//! assert_eq!(summary.rows_in, 2);
//! ```

pub mod cell;
pub mod command;
pub mod config;
pub mod dsl;
pub mod error;
pub mod executor;
pub mod logging;
pub mod pipeline;
pub mod row;
pub mod shift;
pub mod source;

pub use cell::{Case, Rounding};
pub use command::{CATALOG, Classification, Command, Descriptor, Family, Mode, RowBound, classify};
pub use config::{Cli, Config};
pub use dsl::{ParsedArgs, parse_commands};
pub use error::{Result, SheetError};
pub use executor::{RunSummary, execute, run, run_str};
pub use pipeline::{
    ColumnPlan, DataPipeline, PassThroughPipeline, RowContext, RowPipeline, StructuralPipeline,
    pipeline_for,
};
pub use row::{Column, ColumnEnd, DelimiterSet, ROW_CAPACITY, Row};
pub use source::{DelimitedReader, LineSource};
