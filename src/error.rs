//! Error taxonomy for table editing runs.
//!
//! Every error is fatal: the run stops where it is detected and rows
//! already written to the sink stay written.

use thiserror::Error;

/// Errors raised while configuring or executing a run.
#[derive(Debug, Error)]
pub enum SheetError {
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("invalid amount of arguments for command {0}")]
    MissingArguments(&'static str),

    #[error("invalid argument {value} for command {command}: number expected")]
    InvalidNumber { command: &'static str, value: String },

    #[error("argument {0} too long")]
    ArgumentTooLong(String),

    #[error("delimiter not given")]
    MissingDelimiter,

    #[error("delimiter set is empty")]
    EmptyDelimiters,

    #[error("unexpected combination of commands: {structural} structural with {data} data and {selection} selection")]
    MixedFamilies {
        structural: usize,
        data: usize,
        selection: usize,
    },

    #[error("line limit exceeded")]
    CapacityExceeded,

    #[error("line {row} was too long")]
    LineTooLong { row: usize },

    #[error("invalid table: row {row} has {found} columns, expected {expected}")]
    ColumnCountMismatch {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("invalid row number: {0}")]
    InvalidRow(i64),

    #[error("invalid column number: {0}")]
    InvalidColumn(i64),

    #[error("invalid arguments: {from} !<= {to}")]
    InvalidRange { from: i64, to: i64 },

    #[error("column {column} contains other data than numbers: {content:?}")]
    NotNumeric { column: usize, content: String },

    #[error("value {0:?} contains a delimiter")]
    DelimiterInValue(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SheetError {
    /// True for errors detected before any row is read.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            SheetError::UnknownCommand(_)
                | SheetError::MissingArguments(_)
                | SheetError::InvalidNumber { .. }
                | SheetError::ArgumentTooLong(_)
                | SheetError::MissingDelimiter
                | SheetError::EmptyDelimiters
                | SheetError::MixedFamilies { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, SheetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_classification() {
        assert!(SheetError::UnknownCommand("foo".to_string()).is_configuration());
        assert!(
            SheetError::MixedFamilies {
                structural: 1,
                data: 1,
                selection: 0
            }
            .is_configuration()
        );
        assert!(!SheetError::CapacityExceeded.is_configuration());
        assert!(!SheetError::InvalidColumn(0).is_configuration());
    }

    #[test]
    fn test_messages() {
        let err = SheetError::ColumnCountMismatch {
            row: 3,
            expected: 2,
            found: 4,
        };
        assert_eq!(
            err.to_string(),
            "invalid table: row 3 has 4 columns, expected 2"
        );
        assert_eq!(
            SheetError::InvalidRange { from: 4, to: 2 }.to_string(),
            "invalid arguments: 4 !<= 2"
        );
    }
}
