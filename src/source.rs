//! Line sources feeding rows to the executor.

use std::io::{BufRead, Read};

use crate::error::{Result, SheetError};
use crate::row::{DelimiterSet, NEWLINE, ROW_CAPACITY, Row};

/// Produces rows one at a time.
pub trait LineSource {
    /// The next row, `Ok(None)` at end of input, or `LineTooLong` when a
    /// line does not fit in a row buffer.
    fn next_line(&mut self) -> Result<Option<Row>>;
}

/// Reads newline-terminated lines and rewrites every delimiter to the
/// canonical one.
pub struct DelimitedReader<R> {
    reader: R,
    delims: DelimiterSet,
    line: usize,
    buf: Vec<u8>,
}

impl<R: BufRead> DelimitedReader<R> {
    pub fn new(reader: R, delims: DelimiterSet) -> Self {
        Self {
            reader,
            delims,
            line: 0,
            buf: Vec::with_capacity(ROW_CAPACITY + 1),
        }
    }
}

impl<R: BufRead> LineSource for DelimitedReader<R> {
    fn next_line(&mut self) -> Result<Option<Row>> {
        self.buf.clear();
        let read = self
            .reader
            .by_ref()
            .take(ROW_CAPACITY as u64 + 1)
            .read_until(NEWLINE, &mut self.buf)?;
        if read == 0 {
            return Ok(None);
        }
        self.line += 1;

        // A final line without terminator still becomes a row.
        if self.buf.last() != Some(&NEWLINE) {
            self.buf.push(NEWLINE);
        }
        if self.buf.len() > ROW_CAPACITY {
            tracing::warn!(line = self.line, "input line exceeds row capacity");
            return Err(SheetError::LineTooLong { row: self.line });
        }

        let canonical = self.delims.canonical();
        for b in self.buf.iter_mut() {
            if self.delims.contains(*b) {
                *b = canonical;
            }
        }
        Row::from_bytes(&self.buf).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reader<'a>(input: &'a str, delims: &str) -> DelimitedReader<&'a [u8]> {
        DelimitedReader::new(input.as_bytes(), DelimiterSet::new(delims).unwrap())
    }

    #[test]
    fn test_reads_lines() {
        let mut src = reader("a,b\nc,d\n", ",");
        assert_eq!(src.next_line().unwrap().unwrap().as_bytes(), b"a,b\n");
        assert_eq!(src.next_line().unwrap().unwrap().as_bytes(), b"c,d\n");
        assert!(src.next_line().unwrap().is_none());
    }

    #[test]
    fn test_normalizes_delimiters() {
        let mut src = reader("a;b:c\n", ":;");
        assert_eq!(src.next_line().unwrap().unwrap().as_bytes(), b"a:b:c\n");
    }

    #[test]
    fn test_unterminated_last_line() {
        let mut src = reader("a\nb", ",");
        src.next_line().unwrap();
        assert_eq!(src.next_line().unwrap().unwrap().as_bytes(), b"b\n");
        assert!(src.next_line().unwrap().is_none());
    }

    #[test]
    fn test_empty_line() {
        let mut src = reader("\n", ",");
        assert_eq!(src.next_line().unwrap().unwrap().as_bytes(), b"\n");
    }

    #[test]
    fn test_line_at_capacity() {
        let mut input = "x".repeat(ROW_CAPACITY - 1);
        input.push('\n');
        let mut src = reader(&input, ",");
        assert_eq!(src.next_line().unwrap().unwrap().len(), ROW_CAPACITY);
    }

    #[test]
    fn test_line_too_long() {
        let mut input = "ok\n".to_string();
        input.push_str(&"x".repeat(ROW_CAPACITY));
        input.push('\n');
        let mut src = reader(&input, ",");
        assert!(src.next_line().unwrap().is_some());
        assert!(matches!(
            src.next_line(),
            Err(SheetError::LineTooLong { row: 2 })
        ));
    }
}
