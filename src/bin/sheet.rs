//! Command-line table editor.
//!
//! Usage:
//!   sheet [-d DELIMS] [COMMAND [ARGS]...] < input > output
//!   sheet -i input.txt -o out/result.txt irow 1 dcol 3
//!
//! Reads stdin and writes stdout unless files are given.

use std::process;

use clap::Parser;
use sheet_rs::{Cli, Config, logging};

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        // --help and --version
        Err(e) if !e.use_stderr() => e.exit(),
        Err(e) => {
            let _ = e.print();
            process::exit(1);
        }
    };
    logging::init(cli.verbose);

    let config = match Config::from_cli(cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("sheet: {e}");
            if e.is_configuration() {
                eprintln!("Try 'sheet --help' for more information.");
            }
            process::exit(1);
        }
    };

    match config.run() {
        Ok(summary) => {
            if config.verbose {
                eprintln!("Rows:   {} in -> {} out", summary.rows_in, summary.rows_out);
            }
        }
        Err(e) => {
            eprintln!("sheet: {e}");
            process::exit(1);
        }
    }
}
