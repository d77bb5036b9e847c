//! Bounded row buffer, delimiter sets and the column locator.
//!
//! A row holds the raw bytes of one table record including its trailing
//! newline. Column boundaries are never stored: they are located on demand
//! and go stale as soon as the row is mutated.

use crate::error::{Result, SheetError};

/// Maximum bytes a row may hold, newline included (10 KiB).
pub const ROW_CAPACITY: usize = 10240;

/// Row terminator.
pub const NEWLINE: u8 = b'\n';

/// Ordered set of delimiter bytes. The first one is canonical.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelimiterSet {
    bytes: Vec<u8>,
}

impl DelimiterSet {
    /// Build a delimiter set from the bytes of `delims`.
    pub fn new(delims: &str) -> Result<Self> {
        if delims.is_empty() {
            return Err(SheetError::EmptyDelimiters);
        }
        Ok(Self {
            bytes: delims.as_bytes().to_vec(),
        })
    }

    /// The delimiter written whenever a new separator is needed.
    pub fn canonical(&self) -> u8 {
        self.bytes[0]
    }

    pub fn contains(&self, byte: u8) -> bool {
        self.bytes.contains(&byte)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl Default for DelimiterSet {
    fn default() -> Self {
        Self {
            bytes: vec![b' '],
        }
    }
}

/// End of a located column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnEnd {
    /// Offset of the last byte of the column (inclusive).
    At(usize),
    /// The column has zero width.
    Empty,
}

/// A located column: its first byte and its end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub start: usize,
    pub end: ColumnEnd,
}

impl Column {
    pub fn len(&self) -> usize {
        match self.end {
            ColumnEnd::At(end) => end + 1 - self.start,
            ColumnEnd::Empty => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.end == ColumnEnd::Empty
    }

    /// Offset one past the last byte of the column.
    pub fn stop(&self) -> usize {
        self.start + self.len()
    }
}

/// One table record held in a capacity-bounded byte buffer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Row {
    pub(crate) bytes: Vec<u8>,
}

impl Row {
    /// An empty (blank) row.
    pub fn new() -> Self {
        Self {
            bytes: Vec::with_capacity(ROW_CAPACITY),
        }
    }

    /// Build a row from raw bytes, which should end with a newline.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() > ROW_CAPACITY {
            return Err(SheetError::CapacityExceeded);
        }
        let mut row = Self::new();
        row.bytes.extend_from_slice(bytes);
        Ok(row)
    }

    /// Convenience constructor for text rows. Appends the newline if missing.
    pub fn from_str(text: &str) -> Result<Self> {
        let mut row = Self::from_bytes(text.as_bytes())?;
        if row.bytes.last() != Some(&NEWLINE) {
            if row.bytes.len() == ROW_CAPACITY {
                return Err(SheetError::CapacityExceeded);
            }
            row.bytes.push(NEWLINE);
        }
        Ok(row)
    }

    /// A row of `columns` empty cells separated by the canonical delimiter.
    pub fn empty_cells(columns: usize, delims: &DelimiterSet) -> Result<Self> {
        // `columns - 1` delimiters plus the newline.
        if columns > ROW_CAPACITY {
            return Err(SheetError::CapacityExceeded);
        }
        let mut row = Self::new();
        row.bytes
            .extend(std::iter::repeat_n(delims.canonical(), columns.saturating_sub(1)));
        row.bytes.push(NEWLINE);
        Ok(row)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Lossy text view, mainly for tests and diagnostics.
    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// True once the row has been deleted; a blank row writes nothing.
    pub fn is_blank(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Drop the row's content, keeping its slot in the output.
    pub fn blank(&mut self) {
        self.bytes.clear();
    }

    /// Number of delimiter-separated fields before the newline.
    pub fn column_count(&self, delims: &DelimiterSet) -> usize {
        self.bytes
            .iter()
            .take_while(|&&b| b != NEWLINE)
            .filter(|&&b| delims.contains(b))
            .count()
            + 1
    }

    /// Offset of the first byte of column `n` (1-indexed).
    pub fn column_start(&self, delims: &DelimiterSet, n: usize) -> Option<usize> {
        let mut current = 1;
        for (i, &b) in self.bytes.iter().enumerate() {
            if current == n {
                return Some(i);
            }
            if delims.contains(b) {
                current += 1;
            }
        }
        None
    }

    /// Scan from `start` for the `skip`-th terminator (delimiter or newline).
    ///
    /// Returns the offset just before it, or `Empty` when the terminator
    /// sits at `start` itself.
    pub fn column_end(&self, delims: &DelimiterSet, start: usize, skip: usize) -> Option<ColumnEnd> {
        let mut skip = skip;
        for (i, &b) in self.bytes.iter().enumerate().skip(start) {
            if b == NEWLINE || delims.contains(b) {
                skip = skip.saturating_sub(1);
                if skip == 0 {
                    return Some(if i == start {
                        ColumnEnd::Empty
                    } else {
                        ColumnEnd::At(i - 1)
                    });
                }
            }
        }
        None
    }

    /// Locate column `n` (1-indexed).
    pub fn column(&self, delims: &DelimiterSet, n: usize) -> Option<Column> {
        let start = self.column_start(delims, n)?;
        let end = self.column_end(delims, start, 1)?;
        Some(Column { start, end })
    }

    /// Raw bytes of a located column.
    pub fn cell(&self, column: Column) -> &[u8] {
        &self.bytes[column.start..column.stop()]
    }
}
