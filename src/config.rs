//! Command-line configuration.
//!
//! The CLI surface is derived with clap; `Config::from_cli` validates it
//! into the delimiter set, the parsed commands and the I/O endpoints.

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::Parser;

use crate::command::{Command, classify};
use crate::dsl::parse_commands;
use crate::error::Result;
use crate::executor::{RunSummary, run};
use crate::row::DelimiterSet;
use crate::source::DelimitedReader;

/// Edit a delimiter-separated table read from stdin, one row at a time.
///
/// Commands are applied in the order given. Row and column insertion or
/// deletion (irow arow drow drows icol acol dcol dcols) cannot be combined
/// with cell edits (cset tolower toupper round int copy swap move) or row
/// selection (rows beginswith contains).
#[derive(Parser, Debug)]
#[command(name = "sheet", version, args_override_self = true)]
pub struct Cli {
    /// Delimiter characters; the first one is written to the output
    #[arg(short = 'd', long = "delim", value_name = "DELIMS")]
    pub delim: Option<String>,

    /// Read the table from a file instead of stdin
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Write the table to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Report paths and row counts on stderr
    #[arg(short, long)]
    pub verbose: bool,

    /// Editing commands with their arguments, e.g. `irow 1 dcols 2 3`
    #[arg(value_name = "COMMAND", trailing_var_arg = true, allow_hyphen_values = true)]
    pub commands: Vec<String>,
}

/// Validated run configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub delimiters: DelimiterSet,
    pub commands: Vec<Command>,
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub verbose: bool,
}

impl Config {
    /// Validate CLI arguments. Fails on unknown or malformed commands and
    /// on command lists mixing structural with data or selection commands.
    pub fn from_cli(cli: Cli) -> Result<Self> {
        let parsed = parse_commands(&cli.commands)?;
        classify(&parsed.commands)?;

        // A `-d` among the commands comes after the leading option.
        let delimiters = match parsed.delimiters.or(cli.delim) {
            Some(delims) => DelimiterSet::new(&delims)?,
            None => DelimiterSet::default(),
        };

        Ok(Self {
            delimiters,
            commands: parsed.commands,
            input: cli.input,
            output: cli.output,
            verbose: cli.verbose,
        })
    }

    /// Open the configured endpoints and run the edit.
    pub fn run(&self) -> Result<RunSummary> {
        tracing::info!(
            input = ?self.input,
            output = ?self.output,
            delimiter = %char::from(self.delimiters.canonical()),
            commands = self.commands.len(),
            "editing table"
        );
        let reader: Box<dyn BufRead> = match &self.input {
            Some(path) => Box::new(BufReader::new(File::open(path)?)),
            None => Box::new(io::stdin().lock()),
        };
        let mut writer: Box<dyn Write> = match &self.output {
            Some(path) => Box::new(BufWriter::new(create_output(path)?)),
            None => Box::new(BufWriter::new(io::stdout().lock())),
        };

        let mut source = DelimitedReader::new(reader, self.delimiters.clone());
        run(&mut source, &mut writer, &self.delimiters, &self.commands)
    }
}

fn create_output(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    Ok(File::create(path)?)
}
