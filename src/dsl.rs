//! Parser for command-line editing commands.
//!
//! Commands are given as a flat token list, each command name followed by
//! its arguments:
//! ```text
//! -d , irow 1 dcols 2 3 acol
//! -d : rows 2 - beginswith 1 abc cset 3 x
//! ```
//!
//! - Numeric arguments are base-10 integers; range checks happen per row.
//! - `cset`, `beginswith` and `contains` take a string as second argument.
//! - `rows` accepts `-` for either bound: from the first row / to the last.
//! - `-d DELIMS` may appear anywhere; the last occurrence wins.

use crate::command::{Command, RowBound, descriptor};
use crate::error::{Result, SheetError};

/// Longest string argument accepted, in bytes.
pub const MAX_ARGUMENT_LEN: usize = 99;

/// Result of parsing the command tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedArgs {
    /// Delimiter set given with `-d` among the command tokens, if any.
    pub delimiters: Option<String>,
    pub commands: Vec<Command>,
}

/// Parse command tokens into commands, in declared order.
pub fn parse_commands<S: AsRef<str>>(tokens: &[S]) -> Result<ParsedArgs> {
    let mut parsed = ParsedArgs::default();
    let tokens: Vec<&str> = tokens.iter().map(|t| t.as_ref()).collect();
    let mut tokens = tokens.into_iter();

    while let Some(token) = tokens.next() {
        if token == "-d" {
            let delims = tokens.next().ok_or(SheetError::MissingDelimiter)?;
            parsed.delimiters = Some(delims.to_string());
            continue;
        }

        let desc = descriptor(token).ok_or_else(|| SheetError::UnknownCommand(token.to_string()))?;
        let values: Vec<&str> = tokens.by_ref().take(desc.arity).collect();
        if values.len() < desc.arity {
            return Err(SheetError::MissingArguments(desc.name));
        }

        let cmd = desc.build(&values)?;
        tracing::trace!(command = cmd.name(), ?cmd, "parsed command");
        parsed.commands.push(cmd);
    }

    Ok(parsed)
}

/// Argument tokens of one command, converted on demand.
pub struct Arguments<'a> {
    command: &'static str,
    values: &'a [&'a str],
}

impl<'a> Arguments<'a> {
    pub fn new(command: &'static str, values: &'a [&'a str]) -> Self {
        Self { command, values }
    }

    fn value(&self, i: usize) -> Result<&'a str> {
        self.values
            .get(i)
            .copied()
            .ok_or(SheetError::MissingArguments(self.command))
    }

    /// A base-10 integer; leading whitespace is skipped.
    pub fn number(&self, i: usize) -> Result<i64> {
        let value = self.value(i)?;
        value
            .trim_start()
            .parse()
            .map_err(|_| SheetError::InvalidNumber {
                command: self.command,
                value: value.to_string(),
            })
    }

    /// A `rows` bound: a row number or `-`.
    pub fn bound(&self, i: usize) -> Result<RowBound> {
        if self.value(i)? == "-" {
            Ok(RowBound::Open)
        } else {
            self.number(i).map(RowBound::Index)
        }
    }

    /// A string argument of at most `MAX_ARGUMENT_LEN` bytes.
    pub fn text(&self, i: usize) -> Result<String> {
        let value = self.value(i)?;
        if value.len() > MAX_ARGUMENT_LEN {
            return Err(SheetError::ArgumentTooLong(value.to_string()));
        }
        Ok(value.to_string())
    }
}
