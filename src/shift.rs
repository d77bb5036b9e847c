//! In-place byte shifts: the only operations that change a row's length.

use crate::error::{Result, SheetError};
use crate::row::{ROW_CAPACITY, Row};

/// Filler written into the gap opened by a right shift.
pub const FILL: u8 = b' ';

impl Row {
    /// Move every byte at or after `from` right by `amount`, filling the gap.
    ///
    /// Leaves the row untouched if the result would exceed `ROW_CAPACITY`.
    pub fn shift_right(&mut self, from: usize, amount: usize) -> Result<()> {
        let len = self.bytes.len();
        if len + amount > ROW_CAPACITY {
            tracing::warn!(len, amount, "shift would exceed row capacity");
            return Err(SheetError::CapacityExceeded);
        }
        let from = from.min(len);
        self.bytes.resize(len + amount, FILL);
        self.bytes.copy_within(from..len, from + amount);
        self.bytes[from..from + amount].fill(FILL);
        Ok(())
    }

    /// Remove `amount` bytes starting at `from`, moving later bytes left.
    pub fn shift_left(&mut self, from: usize, amount: usize) {
        let len = self.bytes.len();
        let from = from.min(len);
        let amount = amount.min(len - from);
        self.bytes.copy_within(from + amount..len, from);
        self.bytes.truncate(len - amount);
    }
}
