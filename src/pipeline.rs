//! Row-at-a-time processing pipelines.
//!
//! Exactly one pipeline governs a run, chosen from the command families
//! present. Each pipeline sees every input row once, in order, and returns
//! the rows to emit for it.

use crate::cell::{Case, Rounding};
use crate::command::{Command, Mode, RowBound};
use crate::error::{Result, SheetError};
use crate::row::{DelimiterSet, Row};

/// Position of a row within the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowContext {
    /// 1-indexed row number.
    pub number: usize,
    /// True for the final input row. Only known to pipelines that ask for
    /// lookahead; always false otherwise.
    pub is_last: bool,
}

/// A pipeline that processes rows one at a time.
pub trait RowPipeline {
    /// Process one input row, returning the rows to emit in order.
    fn process(&mut self, row: Row, ctx: RowContext) -> Result<Vec<Row>>;

    /// Rows to emit once input is exhausted.
    fn flush(&mut self) -> Result<Vec<Row>> {
        Ok(vec![])
    }

    /// Whether `process` needs to know if a row is the last one.
    fn needs_lookahead(&self) -> bool {
        false
    }

    /// The display name of this pipeline.
    fn name(&self) -> &str;
}

/// Enforces that every row has the first row's column count.
#[derive(Debug, Default)]
struct ColumnGuard {
    expected: Option<usize>,
}

impl ColumnGuard {
    fn check(&mut self, row: &Row, delims: &DelimiterSet, number: usize) -> Result<usize> {
        let found = row.column_count(delims);
        let expected = *self.expected.get_or_insert(found);
        if found != expected {
            tracing::warn!(row = number, expected, found, "column count mismatch");
            return Err(SheetError::ColumnCountMismatch {
                row: number,
                expected,
                found,
            });
        }
        Ok(expected)
    }
}

fn check_row(n: i64) -> Result<usize> {
    if n <= 0 {
        return Err(SheetError::InvalidRow(n));
    }
    Ok(n as usize)
}

fn check_column(n: i64, columns: usize) -> Result<usize> {
    if n <= 0 || n as usize > columns {
        return Err(SheetError::InvalidColumn(n));
    }
    Ok(n as usize)
}

fn check_order(from: i64, to: i64) -> Result<()> {
    if from > to {
        return Err(SheetError::InvalidRange { from, to });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Pass-through
// ---------------------------------------------------------------------------

/// No commands: validate the table and copy it unchanged.
pub struct PassThroughPipeline {
    delims: DelimiterSet,
    guard: ColumnGuard,
}

impl PassThroughPipeline {
    pub fn new(delims: DelimiterSet) -> Self {
        Self {
            delims,
            guard: ColumnGuard::default(),
        }
    }
}

impl RowPipeline for PassThroughPipeline {
    fn process(&mut self, row: Row, ctx: RowContext) -> Result<Vec<Row>> {
        self.guard.check(&row, &self.delims, ctx.number)?;
        Ok(vec![row])
    }

    fn name(&self) -> &str {
        "PASS-THROUGH"
    }
}

// ---------------------------------------------------------------------------
// Structural
// ---------------------------------------------------------------------------

/// Column counts implied by the structural commands of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnPlan {
    /// Column count seen by each command, in declared order.
    pub before: Vec<usize>,
    /// Column count once every command has been applied. Generated empty
    /// rows use this width.
    pub adjusted: usize,
}

impl ColumnPlan {
    /// Check every structural argument against the column count it will
    /// see, then record those counts.
    ///
    /// Fails on the first out-of-range row, column or reversed range, so no
    /// width is ever derived from an invalid argument.
    pub fn new(original: usize, commands: &[Command]) -> Result<Self> {
        let mut count = original;
        let mut before = Vec::with_capacity(commands.len());
        for cmd in commands {
            before.push(count);
            match cmd {
                Command::Irow { row } | Command::Drow { row } => {
                    check_row(*row)?;
                }
                Command::Drows { from, to } => {
                    check_row(*from)?;
                    check_row(*to)?;
                    check_order(*from, *to)?;
                }
                Command::Icol { col } => {
                    check_column(*col, count)?;
                    count += 1;
                }
                Command::Acol => count += 1,
                Command::Dcol { col } => {
                    check_column(*col, count)?;
                    count -= 1;
                }
                Command::Dcols { from, to } => {
                    let first = check_column(*from, count)?;
                    let last = check_column(*to, count)?;
                    check_order(*from, *to)?;
                    count -= last - first + 1;
                }
                _ => {}
            }
        }
        Ok(Self {
            before,
            adjusted: count,
        })
    }
}

/// Row and column insertion and deletion.
pub struct StructuralPipeline {
    delims: DelimiterSet,
    commands: Vec<Command>,
    guard: ColumnGuard,
    plan: Option<ColumnPlan>,
}

impl StructuralPipeline {
    pub fn new(delims: DelimiterSet, commands: Vec<Command>) -> Self {
        Self {
            delims,
            commands,
            guard: ColumnGuard::default(),
            plan: None,
        }
    }

    fn adjusted_columns(&self) -> usize {
        self.plan.as_ref().map_or(1, |plan| plan.adjusted)
    }
}

impl RowPipeline for StructuralPipeline {
    fn process(&mut self, row: Row, ctx: RowContext) -> Result<Vec<Row>> {
        let columns = self.guard.check(&row, &self.delims, ctx.number)?;
        let plan = match &mut self.plan {
            Some(plan) => &*plan,
            slot @ None => &*slot.insert(ColumnPlan::new(columns, &self.commands)?),
        };
        let delims = &self.delims;

        let mut out = Vec::new();
        let mut row = row;
        for (cmd, &columns) in self.commands.iter().zip(&plan.before) {
            match cmd {
                Command::Irow { row: n } => {
                    if check_row(*n)? == ctx.number {
                        out.push(Row::empty_cells(plan.adjusted, delims)?);
                    }
                }
                Command::Drow { row: n } => {
                    if check_row(*n)? == ctx.number {
                        row.blank();
                    }
                }
                Command::Drows { from, to } => {
                    let first = check_row(*from)?;
                    let last = check_row(*to)?;
                    check_order(*from, *to)?;
                    if (first..=last).contains(&ctx.number) {
                        row.blank();
                    }
                }
                Command::Icol { col } => {
                    let col = check_column(*col, columns)?;
                    if !row.is_blank() {
                        row.insert_column(delims, col)?;
                    }
                }
                Command::Acol => {
                    if !row.is_blank() {
                        row.append_column(delims)?;
                    }
                }
                Command::Dcol { col } => {
                    let col = check_column(*col, columns)?;
                    if !row.is_blank() {
                        row.delete_columns(delims, col, col)?;
                    }
                }
                Command::Dcols { from, to } => {
                    let first = check_column(*from, columns)?;
                    let last = check_column(*to, columns)?;
                    check_order(*from, *to)?;
                    if !row.is_blank() {
                        row.delete_columns(delims, first, last)?;
                    }
                }
                // Deferred to flush.
                Command::Arow => {}
                _ => {}
            }
        }

        tracing::trace!(row = ctx.number, blank = row.is_blank(), extra = out.len(), "structural row");
        out.push(row);
        Ok(out)
    }

    fn flush(&mut self) -> Result<Vec<Row>> {
        let columns = self.adjusted_columns();
        self.commands
            .iter()
            .filter(|cmd| matches!(cmd, Command::Arow))
            .map(|_| Row::empty_cells(columns, &self.delims))
            .collect()
    }

    fn name(&self) -> &str {
        "STRUCTURAL"
    }
}

// ---------------------------------------------------------------------------
// Data and selection
// ---------------------------------------------------------------------------

/// Cell edits gated by row selection.
pub struct DataPipeline {
    delims: DelimiterSet,
    commands: Vec<Command>,
    guard: ColumnGuard,
}

impl DataPipeline {
    pub fn new(delims: DelimiterSet, commands: Vec<Command>) -> Self {
        Self {
            delims,
            commands,
            guard: ColumnGuard::default(),
        }
    }
}

fn check_bound(bound: RowBound) -> Result<()> {
    if let RowBound::Index(n) = bound
        && n < 1
    {
        return Err(SheetError::InvalidRow(n));
    }
    Ok(())
}

/// Resolve `rows FROM TO` for the row at `ctx`.
///
/// An open start means row 0 and an open end the current row, so `rows - -`
/// selects only the final input row.
fn rows_selected(from: RowBound, to: RowBound, ctx: RowContext) -> bool {
    let number = ctx.number as i64;
    match (from, to) {
        (RowBound::Open, RowBound::Open) => ctx.is_last,
        _ => {
            let first = match from {
                RowBound::Index(n) => n,
                RowBound::Open => 0,
            };
            let last = match to {
                RowBound::Index(n) => n,
                RowBound::Open => number,
            };
            first <= number && number <= last
        }
    }
}

fn cell_bytes<'a>(row: &'a Row, delims: &DelimiterSet, col: usize) -> Result<&'a [u8]> {
    let column = row
        .column(delims, col)
        .ok_or(SheetError::InvalidColumn(col as i64))?;
    Ok(row.cell(column))
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    needle.is_empty() || haystack.windows(needle.len()).any(|w| w == needle)
}

impl RowPipeline for DataPipeline {
    fn process(&mut self, row: Row, ctx: RowContext) -> Result<Vec<Row>> {
        let columns = self.guard.check(&row, &self.delims, ctx.number)?;
        let delims = &self.delims;
        let mut row = row;

        // Each selection command overwrites `selected` instead of combining
        // with it, so the last selection command before a data command
        // decides whether that command applies. This is intentional.
        let mut selected = true;
        for cmd in &self.commands {
            match cmd {
                Command::Cset { col, value } => {
                    let col = check_column(*col, columns)?;
                    if selected {
                        row.set_cell(delims, col, value.as_bytes())?;
                    }
                }
                Command::ToLower { col } | Command::ToUpper { col } => {
                    let col = check_column(*col, columns)?;
                    let case = if matches!(cmd, Command::ToLower { .. }) {
                        Case::Lower
                    } else {
                        Case::Upper
                    };
                    if selected {
                        row.change_case(delims, col, case)?;
                    }
                }
                Command::Round { col } | Command::Int { col } => {
                    let col = check_column(*col, columns)?;
                    let rounding = if matches!(cmd, Command::Round { .. }) {
                        Rounding::Round
                    } else {
                        Rounding::Truncate
                    };
                    if selected {
                        row.numeric(delims, col, rounding)?;
                    }
                }
                Command::Copy { from, to } | Command::Swap { from, to } | Command::Move { from, to } => {
                    let from = check_column(*from, columns)?;
                    let to = check_column(*to, columns)?;
                    if selected {
                        match cmd {
                            Command::Copy { .. } => row.copy_column(delims, from, to)?,
                            Command::Swap { .. } => row.swap_columns(delims, from, to)?,
                            _ => row.move_column(delims, from, to)?,
                        }
                    }
                }
                Command::Rows { from, to } => {
                    check_bound(*from)?;
                    check_bound(*to)?;
                    if let (RowBound::Index(first), RowBound::Index(last)) = (*from, *to) {
                        check_order(first, last)?;
                    }
                    selected = rows_selected(*from, *to, ctx);
                }
                Command::BeginsWith { col, prefix } => {
                    let col = check_column(*col, columns)?;
                    selected = cell_bytes(&row, delims, col)?.starts_with(prefix.as_bytes());
                }
                Command::Contains { col, pattern } => {
                    let col = check_column(*col, columns)?;
                    selected = contains(cell_bytes(&row, delims, col)?, pattern.as_bytes());
                }
                _ => {}
            }
        }

        tracing::trace!(row = ctx.number, last = ctx.is_last, selected, "data row");
        Ok(vec![row])
    }

    fn needs_lookahead(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "DATA"
    }
}

// ---------------------------------------------------------------------------
// Factory
// ---------------------------------------------------------------------------

/// Create the pipeline for a classified run.
pub fn pipeline_for(mode: Mode, delims: &DelimiterSet, commands: &[Command]) -> Box<dyn RowPipeline> {
    match mode {
        Mode::PassThrough => Box::new(PassThroughPipeline::new(delims.clone())),
        Mode::Structural => Box::new(StructuralPipeline::new(delims.clone(), commands.to_vec())),
        Mode::Data => Box::new(DataPipeline::new(delims.clone(), commands.to_vec())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::ROW_CAPACITY;

    fn comma() -> DelimiterSet {
        DelimiterSet::new(",").unwrap()
    }

    fn ctx(number: usize) -> RowContext {
        RowContext {
            number,
            is_last: false,
        }
    }

    fn last(number: usize) -> RowContext {
        RowContext {
            number,
            is_last: true,
        }
    }

    fn row(text: &str) -> Row {
        Row::from_str(text).unwrap()
    }

    fn texts(rows: &[Row]) -> Vec<String> {
        rows.iter().map(Row::to_string_lossy).collect()
    }

    #[test]
    fn test_passthrough() {
        let mut p = PassThroughPipeline::new(comma());
        assert_eq!(texts(&p.process(row("a,b"), ctx(1)).unwrap()), vec!["a,b\n"]);
        assert_eq!(texts(&p.process(row("c,d"), ctx(2)).unwrap()), vec!["c,d\n"]);
    }

    #[test]
    fn test_passthrough_rejects_mismatch() {
        let mut p = PassThroughPipeline::new(comma());
        p.process(row("a,b"), ctx(1)).unwrap();
        assert!(matches!(
            p.process(row("a,b,c"), ctx(2)),
            Err(SheetError::ColumnCountMismatch {
                row: 2,
                expected: 2,
                found: 3
            })
        ));
    }

    #[test]
    fn test_column_plan() {
        let commands = [
            Command::Icol { col: 1 },
            Command::Dcols { from: 2, to: 3 },
            Command::Acol,
            Command::Drow { row: 1 },
        ];
        let plan = ColumnPlan::new(4, &commands).unwrap();
        assert_eq!(plan.before, vec![4, 5, 3, 4]);
        assert_eq!(plan.adjusted, 4);
    }

    #[test]
    fn test_column_plan_rejects_extreme_arguments() {
        let commands = [Command::Dcols {
            from: 1,
            to: i64::MIN,
        }];
        assert!(matches!(
            ColumnPlan::new(2, &commands),
            Err(SheetError::InvalidColumn(i64::MIN))
        ));
        let commands = [
            Command::Irow { row: 1 },
            Command::Dcols {
                from: 2,
                to: -4_000_000_000_000_000_000,
            },
        ];
        assert!(matches!(
            ColumnPlan::new(2, &commands),
            Err(SheetError::InvalidColumn(-4_000_000_000_000_000_000))
        ));
    }

    #[test]
    fn test_invalid_argument_fails_before_irow_emits() {
        let mut p = StructuralPipeline::new(
            comma(),
            vec![Command::Irow { row: 1 }, Command::Dcol { col: 9 }],
        );
        assert!(matches!(
            p.process(row("a,b"), ctx(1)),
            Err(SheetError::InvalidColumn(9))
        ));
    }

    #[test]
    fn test_irow_too_wide_for_row() {
        let commands: Vec<Command> = std::iter::once(Command::Irow { row: 1 })
            .chain(std::iter::repeat_n(Command::Acol, 3))
            .collect();
        let mut p = StructuralPipeline::new(comma(), commands);
        let wide = ",".repeat(ROW_CAPACITY - 2);
        assert!(matches!(
            p.process(row(&wide), ctx(1)),
            Err(SheetError::CapacityExceeded)
        ));
    }

    #[test]
    fn test_irow_uses_adjusted_width() {
        let mut p = StructuralPipeline::new(comma(), vec![Command::Irow { row: 2 }, Command::Acol]);
        assert_eq!(texts(&p.process(row("a,b"), ctx(1)).unwrap()), vec!["a,b,\n"]);
        assert_eq!(
            texts(&p.process(row("c,d"), ctx(2)).unwrap()),
            vec![",,\n", "c,d,\n"]
        );
    }

    #[test]
    fn test_drow_blanks() {
        let mut p = StructuralPipeline::new(comma(), vec![Command::Drow { row: 1 }, Command::Icol { col: 1 }]);
        let out = p.process(row("a,b"), ctx(1)).unwrap();
        assert_eq!(out.len(), 1);
        assert!(out[0].is_blank());
        assert_eq!(texts(&p.process(row("c,d"), ctx(2)).unwrap()), vec![",c,d\n"]);
    }

    #[test]
    fn test_drows_range() {
        let mut p = StructuralPipeline::new(comma(), vec![Command::Drows { from: 2, to: 3 }]);
        let blank: Vec<bool> = (1..=4)
            .map(|n| p.process(row("x"), ctx(n)).unwrap()[0].is_blank())
            .collect();
        assert_eq!(blank, vec![false, true, true, false]);
    }

    #[test]
    fn test_drows_rejects_reversed() {
        let mut p = StructuralPipeline::new(comma(), vec![Command::Drows { from: 3, to: 2 }]);
        assert!(matches!(
            p.process(row("x"), ctx(1)),
            Err(SheetError::InvalidRange { from: 3, to: 2 })
        ));
    }

    #[test]
    fn test_structural_column_bounds() {
        let mut p = StructuralPipeline::new(comma(), vec![Command::Dcol { col: 3 }]);
        assert!(matches!(
            p.process(row("a,b"), ctx(1)),
            Err(SheetError::InvalidColumn(3))
        ));
        let mut p = StructuralPipeline::new(comma(), vec![Command::Irow { row: 0 }]);
        assert!(matches!(
            p.process(row("a,b"), ctx(1)),
            Err(SheetError::InvalidRow(0))
        ));
    }

    #[test]
    fn test_bounds_follow_earlier_commands() {
        let mut p = StructuralPipeline::new(comma(), vec![Command::Acol, Command::Dcol { col: 3 }]);
        assert_eq!(texts(&p.process(row("a,b"), ctx(1)).unwrap()), vec!["a,b\n"]);
    }

    #[test]
    fn test_arow_flush() {
        let mut p = StructuralPipeline::new(
            comma(),
            vec![Command::Arow, Command::Dcol { col: 1 }, Command::Arow],
        );
        p.process(row("a,b,c"), ctx(1)).unwrap();
        assert_eq!(texts(&p.flush().unwrap()), vec![",\n", ",\n"]);
    }

    #[test]
    fn test_arow_without_input() {
        let mut p = StructuralPipeline::new(comma(), vec![Command::Arow]);
        assert_eq!(texts(&p.flush().unwrap()), vec!["\n"]);
    }

    #[test]
    fn test_rows_selected() {
        let open = RowBound::Open;
        let idx = RowBound::Index;
        assert!(rows_selected(idx(2), idx(4), ctx(3)));
        assert!(!rows_selected(idx(2), idx(4), ctx(5)));
        assert!(rows_selected(open, idx(2), ctx(1)));
        assert!(rows_selected(idx(6), open, ctx(9)));
        assert!(!rows_selected(idx(6), open, ctx(5)));
        assert!(!rows_selected(open, open, ctx(3)));
        assert!(rows_selected(open, open, last(3)));
    }

    #[test]
    fn test_last_selection_wins() {
        let commands = vec![
            Command::Rows {
                from: RowBound::Index(2),
                to: RowBound::Index(4),
            },
            Command::Rows {
                from: RowBound::Index(6),
                to: RowBound::Open,
            },
            Command::Cset {
                col: 1,
                value: "X".to_string(),
            },
        ];
        let mut p = DataPipeline::new(comma(), commands);
        let selected: Vec<usize> = (1..=8)
            .filter(|&n| {
                let c = if n == 8 { last(n) } else { ctx(n) };
                p.process(row("a,b"), c).unwrap()[0].as_bytes() == b"X,b\n"
            })
            .collect();
        assert_eq!(selected, vec![6, 7, 8]);
    }

    #[test]
    fn test_selection_applies_to_following_commands_only() {
        let commands = vec![
            Command::ToUpper { col: 1 },
            Command::BeginsWith {
                col: 2,
                prefix: "no".to_string(),
            },
            Command::ToUpper { col: 2 },
        ];
        let mut p = DataPipeline::new(comma(), commands);
        assert_eq!(texts(&p.process(row("a,yes"), ctx(1)).unwrap()), vec!["A,yes\n"]);
        assert_eq!(texts(&p.process(row("b,nope"), ctx(2)).unwrap()), vec!["B,NOPE\n"]);
    }

    #[test]
    fn test_contains_selection() {
        let commands = vec![
            Command::Contains {
                col: 1,
                pattern: "ab".to_string(),
            },
            Command::Cset {
                col: 2,
                value: "hit".to_string(),
            },
        ];
        let mut p = DataPipeline::new(comma(), commands);
        assert_eq!(texts(&p.process(row("aab,x"), ctx(1)).unwrap()), vec!["aab,hit\n"]);
        assert_eq!(texts(&p.process(row("ba,x"), ctx(2)).unwrap()), vec!["ba,x\n"]);
    }

    #[test]
    fn test_unselected_rows_still_checked() {
        let commands = vec![
            Command::Rows {
                from: RowBound::Index(5),
                to: RowBound::Index(6),
            },
            Command::Round { col: 3 },
        ];
        let mut p = DataPipeline::new(comma(), commands);
        assert!(matches!(
            p.process(row("1.5,2"), ctx(1)),
            Err(SheetError::InvalidColumn(3))
        ));
    }

    #[test]
    fn test_unselected_rows_skip_numeric() {
        let commands = vec![
            Command::Rows {
                from: RowBound::Index(2),
                to: RowBound::Open,
            },
            Command::Int { col: 1 },
        ];
        let mut p = DataPipeline::new(comma(), commands);
        assert_eq!(texts(&p.process(row("header,b"), ctx(1)).unwrap()), vec!["header,b\n"]);
        assert_eq!(texts(&p.process(row("2.5,b"), ctx(2)).unwrap()), vec!["2,b\n"]);
    }

    #[test]
    fn test_rows_argument_checks() {
        let mut p = DataPipeline::new(
            comma(),
            vec![Command::Rows {
                from: RowBound::Index(0),
                to: RowBound::Open,
            }],
        );
        assert!(matches!(
            p.process(row("a"), ctx(1)),
            Err(SheetError::InvalidRow(0))
        ));
        let mut p = DataPipeline::new(
            comma(),
            vec![Command::Rows {
                from: RowBound::Index(4),
                to: RowBound::Index(2),
            }],
        );
        assert!(matches!(
            p.process(row("a"), ctx(1)),
            Err(SheetError::InvalidRange { from: 4, to: 2 })
        ));
    }

    #[test]
    fn test_data_keeps_column_count() {
        let d = comma();
        let commands = vec![
            Command::Move { from: 1, to: 3 },
            Command::Swap { from: 1, to: 2 },
            Command::Copy { from: 3, to: 1 },
            Command::Cset {
                col: 2,
                value: "a longer value".to_string(),
            },
            Command::ToLower { col: 3 },
        ];
        let mut p = DataPipeline::new(d.clone(), commands);
        let out = p.process(row("A,B,C"), ctx(1)).unwrap();
        assert_eq!(out[0].column_count(&d), 3);
    }

    #[test]
    fn test_pipeline_factory() {
        let d = comma();
        assert_eq!(pipeline_for(Mode::PassThrough, &d, &[]).name(), "PASS-THROUGH");
        let p = pipeline_for(Mode::Data, &d, &[Command::Round { col: 1 }]);
        assert_eq!(p.name(), "DATA");
        assert!(p.needs_lookahead());
        let p = pipeline_for(Mode::Structural, &d, &[Command::Acol]);
        assert!(!p.needs_lookahead());
    }
}
