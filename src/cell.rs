//! Column-level edits built on the locator and the shift engine.
//!
//! Column indexes are 1-based. Every operation locates its columns afresh,
//! so earlier edits to the same row never leave stale offsets behind.

use crate::error::{Result, SheetError};
use crate::row::{Column, DelimiterSet, NEWLINE, ROW_CAPACITY, Row};

/// Case conversion applied while extracting a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Case {
    Keep,
    Lower,
    Upper,
}

/// How `numeric` turns a floating-point cell into an integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rounding {
    /// Half away from zero.
    Round,
    /// Drop the fractional part.
    Truncate,
}

impl Row {
    fn locate(&self, delims: &DelimiterSet, n: usize) -> Result<Column> {
        self.column(delims, n)
            .ok_or(SheetError::InvalidColumn(n as i64))
    }

    /// Copy out a cell, converting ASCII case on the way.
    pub fn extract(&self, column: Column, case: Case) -> Vec<u8> {
        let cell = self.cell(column);
        match case {
            Case::Keep => cell.to_vec(),
            Case::Lower => cell.to_ascii_lowercase(),
            Case::Upper => cell.to_ascii_uppercase(),
        }
    }

    /// Overwrite a located column with `content`, resizing the row as needed.
    pub fn replace(&mut self, column: Column, content: &[u8]) -> Result<()> {
        let size = column.len();
        if content.len() > size {
            // Anchored at the column end; for an empty column that is its start.
            self.shift_right(column.stop(), content.len() - size)?;
        } else if content.len() < size {
            self.shift_left(column.start, size - content.len());
        }
        self.bytes[column.start..column.start + content.len()].copy_from_slice(content);
        Ok(())
    }

    /// `cset`: set column `n` to `content`.
    ///
    /// Content holding a delimiter byte is rejected; it would split the cell.
    pub fn set_cell(&mut self, delims: &DelimiterSet, n: usize, content: &[u8]) -> Result<()> {
        if content.iter().any(|&b| delims.contains(b)) {
            return Err(SheetError::DelimiterInValue(
                String::from_utf8_lossy(content).into_owned(),
            ));
        }
        let column = self.locate(delims, n)?;
        self.replace(column, content)
    }

    /// `tolower` / `toupper`.
    pub fn change_case(&mut self, delims: &DelimiterSet, n: usize, case: Case) -> Result<()> {
        let column = self.locate(delims, n)?;
        let converted = self.extract(column, case);
        self.replace(column, &converted)
    }

    /// `icol`: insert an empty column before column `n`.
    pub fn insert_column(&mut self, delims: &DelimiterSet, n: usize) -> Result<()> {
        let start = self
            .column_start(delims, n)
            .ok_or(SheetError::InvalidColumn(n as i64))?;
        self.shift_right(start, 1)?;
        self.bytes[start] = delims.canonical();
        Ok(())
    }

    /// `acol`: append an empty column after the last one.
    pub fn append_column(&mut self, delims: &DelimiterSet) -> Result<()> {
        if self.bytes.len() + 1 > ROW_CAPACITY {
            return Err(SheetError::CapacityExceeded);
        }
        if self.bytes.last() == Some(&NEWLINE) {
            self.bytes.pop();
        }
        self.bytes.push(delims.canonical());
        self.bytes.push(NEWLINE);
        Ok(())
    }

    /// `dcol` / `dcols`: delete columns `low..=high`.
    ///
    /// Column 1 has no delimiter before it and the last column none after
    /// it, so a range starting at column 1 takes the trailing delimiter with
    /// it (none at all if it also reaches the last column) while any other
    /// range takes the leading one. The newline is never removed.
    pub fn delete_columns(&mut self, delims: &DelimiterSet, low: usize, high: usize) -> Result<()> {
        if high < low {
            return Err(SheetError::InvalidRange {
                from: low as i64,
                to: high as i64,
            });
        }
        let count = self.column_count(delims);
        if high > count {
            return Err(SheetError::InvalidColumn(high as i64));
        }
        let start = self
            .column_start(delims, low)
            .ok_or(SheetError::InvalidColumn(low as i64))?;
        let end = self
            .column_end(delims, start, high - low + 1)
            .ok_or(SheetError::InvalidColumn(high as i64))?;
        let stop = Column { start, end }.stop();

        let (from, to) = if low == 1 {
            if high == count {
                (start, stop)
            } else {
                (start, stop + 1)
            }
        } else {
            (start - 1, stop)
        };
        self.shift_left(from, to - from);
        Ok(())
    }

    /// `round` / `int`: replace a numeric cell by an integer.
    ///
    /// Empty cells are left alone. The result is never longer than a plain
    /// decimal literal of the same value.
    pub fn numeric(&mut self, delims: &DelimiterSet, n: usize, rounding: Rounding) -> Result<()> {
        let column = self.locate(delims, n)?;
        if column.is_empty() {
            return Ok(());
        }
        let cell = self.cell(column);
        let not_numeric = || SheetError::NotNumeric {
            column: n,
            content: String::from_utf8_lossy(cell).into_owned(),
        };
        let text = std::str::from_utf8(cell).map_err(|_| not_numeric())?;
        let value: f64 = text
            .trim_start_matches(|c: char| c.is_ascii_whitespace())
            .parse()
            .map_err(|_| not_numeric())?;
        let integer = match rounding {
            Rounding::Round => value.round(),
            Rounding::Truncate => value.trunc(),
        } as i64;
        self.replace(column, integer.to_string().as_bytes())
    }

    /// `copy N M`: overwrite column `to` with the content of column `from`.
    pub fn copy_column(&mut self, delims: &DelimiterSet, from: usize, to: usize) -> Result<()> {
        let content = self.extract(self.locate(delims, from)?, Case::Keep);
        let target = self.locate(delims, to)?;
        self.replace(target, &content)
    }

    /// `swap N M`: exchange the contents of two columns.
    pub fn swap_columns(&mut self, delims: &DelimiterSet, from: usize, to: usize) -> Result<()> {
        let source = self.locate(delims, from)?;
        let target = self.locate(delims, to)?;
        let source_content = self.extract(source, Case::Keep);
        let target_content = self.extract(target, Case::Keep);
        self.replace(target, &source_content)?;
        // The first replace may have moved column `from`.
        let source = self.locate(delims, from)?;
        self.replace(source, &target_content)
    }

    /// `move N M`: move column `from` in front of column `to`.
    pub fn move_column(&mut self, delims: &DelimiterSet, from: usize, to: usize) -> Result<()> {
        let content = self.extract(self.locate(delims, from)?, Case::Keep);
        self.insert_column(delims, to)?;
        self.set_cell(delims, to, &content)?;
        // Inserting at `to` pushed every later column one to the right.
        let original = if from > to { from + 1 } else { from };
        self.delete_columns(delims, original, original)
    }
}
