//! Command catalog, parsed invocations and run classification.

use crate::dsl::Arguments;
use crate::error::{Result, SheetError};

/// Family a command belongs to. A run never mixes `Structural` with the
/// other two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    /// Inserts or deletes whole rows or columns.
    Structural,
    /// Edits cell content without changing row or column counts.
    Data,
    /// Decides which rows the data commands apply to.
    Selection,
}

/// Static catalog entry.
#[derive(Clone, Copy)]
pub struct Descriptor {
    pub name: &'static str,
    pub arity: usize,
    pub family: Family,
    construct: fn(&Arguments<'_>) -> Result<Command>,
}

impl Descriptor {
    /// Build the command from exactly `arity` argument tokens.
    pub fn build(&self, values: &[&str]) -> Result<Command> {
        (self.construct)(&Arguments::new(self.name, values))
    }
}

impl std::fmt::Debug for Descriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Descriptor")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .field("family", &self.family)
            .finish()
    }
}

const fn entry(
    name: &'static str,
    arity: usize,
    family: Family,
    construct: fn(&Arguments<'_>) -> Result<Command>,
) -> Descriptor {
    Descriptor {
        name,
        arity,
        family,
        construct,
    }
}

/// Every command the editor understands, in catalog order.
pub static CATALOG: [Descriptor; 19] = [
    entry("irow", 1, Family::Structural, |a| {
        Ok(Command::Irow { row: a.number(0)? })
    }),
    entry("arow", 0, Family::Structural, |_| Ok(Command::Arow)),
    entry("drow", 1, Family::Structural, |a| {
        Ok(Command::Drow { row: a.number(0)? })
    }),
    entry("drows", 2, Family::Structural, |a| {
        Ok(Command::Drows {
            from: a.number(0)?,
            to: a.number(1)?,
        })
    }),
    entry("icol", 1, Family::Structural, |a| {
        Ok(Command::Icol { col: a.number(0)? })
    }),
    entry("acol", 0, Family::Structural, |_| Ok(Command::Acol)),
    entry("dcol", 1, Family::Structural, |a| {
        Ok(Command::Dcol { col: a.number(0)? })
    }),
    entry("dcols", 2, Family::Structural, |a| {
        Ok(Command::Dcols {
            from: a.number(0)?,
            to: a.number(1)?,
        })
    }),
    entry("cset", 2, Family::Data, |a| {
        Ok(Command::Cset {
            col: a.number(0)?,
            value: a.text(1)?,
        })
    }),
    entry("tolower", 1, Family::Data, |a| {
        Ok(Command::ToLower { col: a.number(0)? })
    }),
    entry("toupper", 1, Family::Data, |a| {
        Ok(Command::ToUpper { col: a.number(0)? })
    }),
    entry("round", 1, Family::Data, |a| {
        Ok(Command::Round { col: a.number(0)? })
    }),
    entry("int", 1, Family::Data, |a| Ok(Command::Int { col: a.number(0)? })),
    entry("copy", 2, Family::Data, |a| {
        Ok(Command::Copy {
            from: a.number(0)?,
            to: a.number(1)?,
        })
    }),
    entry("swap", 2, Family::Data, |a| {
        Ok(Command::Swap {
            from: a.number(0)?,
            to: a.number(1)?,
        })
    }),
    entry("move", 2, Family::Data, |a| {
        Ok(Command::Move {
            from: a.number(0)?,
            to: a.number(1)?,
        })
    }),
    entry("rows", 2, Family::Selection, |a| {
        Ok(Command::Rows {
            from: a.bound(0)?,
            to: a.bound(1)?,
        })
    }),
    entry("beginswith", 2, Family::Selection, |a| {
        Ok(Command::BeginsWith {
            col: a.number(0)?,
            prefix: a.text(1)?,
        })
    }),
    entry("contains", 2, Family::Selection, |a| {
        Ok(Command::Contains {
            col: a.number(0)?,
            pattern: a.text(1)?,
        })
    }),
];

/// Look up a catalog entry by command name.
pub fn descriptor(name: &str) -> Option<&'static Descriptor> {
    CATALOG.iter().find(|d| d.name == name)
}

/// One end of a `rows` range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowBound {
    Index(i64),
    /// `-`: from the first row, or to the last row.
    Open,
}

/// A parsed command invocation.
///
/// Numeric arguments stay signed so that zero and negative indexes reach
/// the per-row argument checks instead of failing at parse time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// irow R - insert an empty row before row R
    Irow { row: i64 },
    /// arow - append an empty row after the last one
    Arow,
    /// drow R - delete row R
    Drow { row: i64 },
    /// drows N M - delete rows N through M
    Drows { from: i64, to: i64 },
    /// icol C - insert an empty column before column C
    Icol { col: i64 },
    /// acol - append an empty column
    Acol,
    /// dcol C - delete column C
    Dcol { col: i64 },
    /// dcols N M - delete columns N through M
    Dcols { from: i64, to: i64 },
    /// cset C STR - set the cell in column C to STR
    Cset { col: i64, value: String },
    /// tolower C
    ToLower { col: i64 },
    /// toupper C
    ToUpper { col: i64 },
    /// round C - round to the nearest integer
    Round { col: i64 },
    /// int C - drop the fractional part
    Int { col: i64 },
    /// copy N M - overwrite column M with column N
    Copy { from: i64, to: i64 },
    /// swap N M
    Swap { from: i64, to: i64 },
    /// move N M - move column N in front of column M
    Move { from: i64, to: i64 },
    /// rows N M - select rows N through M
    Rows { from: RowBound, to: RowBound },
    /// beginswith C STR - select rows whose column C starts with STR
    BeginsWith { col: i64, prefix: String },
    /// contains C STR - select rows whose column C contains STR
    Contains { col: i64, pattern: String },
}

impl Command {
    fn catalog_index(&self) -> usize {
        match self {
            Command::Irow { .. } => 0,
            Command::Arow => 1,
            Command::Drow { .. } => 2,
            Command::Drows { .. } => 3,
            Command::Icol { .. } => 4,
            Command::Acol => 5,
            Command::Dcol { .. } => 6,
            Command::Dcols { .. } => 7,
            Command::Cset { .. } => 8,
            Command::ToLower { .. } => 9,
            Command::ToUpper { .. } => 10,
            Command::Round { .. } => 11,
            Command::Int { .. } => 12,
            Command::Copy { .. } => 13,
            Command::Swap { .. } => 14,
            Command::Move { .. } => 15,
            Command::Rows { .. } => 16,
            Command::BeginsWith { .. } => 17,
            Command::Contains { .. } => 18,
        }
    }

    /// Catalog entry of this command.
    pub fn descriptor(&self) -> &'static Descriptor {
        &CATALOG[self.catalog_index()]
    }

    /// Name as written on the command line.
    pub fn name(&self) -> &'static str {
        self.descriptor().name
    }

    pub fn family(&self) -> Family {
        self.descriptor().family
    }
}

/// Which pipeline governs a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    PassThrough,
    Structural,
    Data,
}

/// How many invocations fall into each family.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Classification {
    pub structural: usize,
    pub data: usize,
    pub selection: usize,
}

impl Classification {
    pub fn of(commands: &[Command]) -> Self {
        let mut counts = Self::default();
        for cmd in commands {
            match cmd.family() {
                Family::Structural => counts.structural += 1,
                Family::Data => counts.data += 1,
                Family::Selection => counts.selection += 1,
            }
        }
        counts
    }

    /// Pick the pipeline, rejecting structural commands mixed with others.
    pub fn mode(&self) -> Result<Mode> {
        if self.structural > 0 && (self.data > 0 || self.selection > 0) {
            return Err(SheetError::MixedFamilies {
                structural: self.structural,
                data: self.data,
                selection: self.selection,
            });
        }
        Ok(if self.structural > 0 {
            Mode::Structural
        } else if self.data > 0 || self.selection > 0 {
            Mode::Data
        } else {
            Mode::PassThrough
        })
    }
}

/// Classify a command list and choose its pipeline mode.
pub fn classify(commands: &[Command]) -> Result<Mode> {
    Classification::of(commands).mode()
}
