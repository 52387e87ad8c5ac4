//! Host-facing spreadsheet model
//!
//! A [`Spreadsheet`] owns one grid for its whole lifetime and keeps every
//! display value current: each edit triggers a full recalculation.

use crate::calculation::{CalculationOptions, CalculationStats, FormulaEngine};
use crate::{Cell, CellAddress, Grid, Result};
use tracing::debug;

/// A named sheet bound to a formula engine
#[derive(Debug, Clone)]
pub struct Spreadsheet {
    name: String,
    grid: Grid,
    engine: FormulaEngine,
}

impl Spreadsheet {
    /// Create an unnamed sheet of empty cells with default options
    pub fn new(rows: usize, columns: usize) -> Self {
        Self::with_options(rows, columns, CalculationOptions::default())
    }

    /// Create an unnamed sheet with custom calculation options
    pub fn with_options(rows: usize, columns: usize, options: CalculationOptions) -> Self {
        Self {
            name: String::new(),
            grid: Grid::new(rows, columns),
            engine: FormulaEngine::new(options),
        }
    }

    /// Builder-style name setter
    pub fn with_name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = name.into();
        self
    }

    /// Get the sheet name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the sheet name
    pub fn set_name<S: Into<String>>(&mut self, name: S) {
        self.name = name.into();
    }

    pub fn rows(&self) -> usize {
        self.grid.rows()
    }

    pub fn columns(&self) -> usize {
        self.grid.columns()
    }

    pub fn options(&self) -> &CalculationOptions {
        self.engine.options()
    }

    /// Read-only access to the underlying grid
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    // === Cell Access ===

    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.grid.get(row, col)
    }

    /// Computed display value at (row, col)
    pub fn display_value(&self, row: usize, col: usize) -> Option<&str> {
        self.grid.computed_value(row, col)
    }

    /// Raw input at (row, col)
    pub fn raw_input(&self, row: usize, col: usize) -> Option<&str> {
        self.grid.get(row, col).map(|cell| cell.raw_input.as_str())
    }

    /// Iterate over all cells in row-major order
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, &Cell)> + '_ {
        self.grid.cells()
    }

    // === Editing ===

    /// Set a cell's raw input and recalculate the whole sheet.
    ///
    /// Coordinates outside the sheet are ignored.
    pub fn set_cell<S: Into<String>>(&mut self, row: usize, col: usize, text: S) {
        if let Err(err) = self.grid.set_text(row, col, text) {
            debug!(row, col, error = %err, "ignoring edit outside sheet");
            return;
        }
        self.recalculate();
    }

    /// Set a cell's raw input by address (e.g., "B2") and recalculate
    pub fn set_cell_by_name<S: Into<String>>(&mut self, address: &str, text: S) -> Result<()> {
        let addr = CellAddress::parse(address)?;
        self.grid.set_text(addr.row, addr.col, text)?;
        self.recalculate();
        Ok(())
    }

    /// Recalculate every cell
    pub fn recalculate(&mut self) -> CalculationStats {
        self.engine.recalculate_all(&mut self.grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculation::RecalcOrder;
    use crate::Error;

    #[test]
    fn test_set_cell_recalculates() {
        let mut sheet = Spreadsheet::new(2, 2).with_name("Sheet1");
        assert_eq!(sheet.name(), "Sheet1");

        sheet.set_cell(0, 0, "10");
        sheet.set_cell(0, 1, "=A1*2");
        assert_eq!(sheet.display_value(0, 1), Some("20"));

        sheet.set_cell(0, 0, "21");
        assert_eq!(sheet.display_value(0, 1), Some("42"));
        assert_eq!(sheet.raw_input(0, 1), Some("=A1*2"));
    }

    #[test]
    fn test_set_cell_out_of_range_is_ignored() {
        let mut sheet = Spreadsheet::new(2, 2);
        sheet.set_cell(5, 0, "1");
        sheet.set_cell(0, 5, "1");
        assert!(sheet.cells().all(|(_, _, cell)| cell.is_empty()));
    }

    #[test]
    fn test_set_cell_by_name() {
        let mut sheet = Spreadsheet::new(3, 3);
        sheet.set_cell_by_name("c3", "7").unwrap();
        sheet.set_cell_by_name("A1", "=C3+1").unwrap();
        assert_eq!(sheet.display_value(0, 0), Some("8"));

        assert!(matches!(
            sheet.set_cell_by_name("3C", "1"),
            Err(Error::InvalidAddress(_))
        ));
        assert_eq!(
            sheet.set_cell_by_name("D1", "1"),
            Err(Error::ColumnOutOfBounds(3, 3))
        );
    }

    #[test]
    fn test_options_are_kept() {
        let options = CalculationOptions {
            order: RecalcOrder::Dependency,
            ..Default::default()
        };
        let mut sheet = Spreadsheet::with_options(1, 2, options);
        assert_eq!(sheet.options().order, RecalcOrder::Dependency);

        // Forward reference resolved in one pass
        sheet.set_cell(0, 0, "=B1+1");
        sheet.set_cell(0, 1, "=1+1");
        assert_eq!(sheet.display_value(0, 0), Some("3"));
    }

    #[test]
    fn test_recalculate_stats() {
        let mut sheet = Spreadsheet::new(2, 2);
        sheet.set_cell(0, 0, "=1+");
        sheet.set_cell(1, 1, "=2");

        let stats = sheet.recalculate();
        assert_eq!(stats.cells_visited, 4);
        assert_eq!(stats.formula_count, 2);
        assert_eq!(stats.errors, 1);
        assert_eq!(sheet.display_value(0, 0), Some("#ERR"));
    }
}
