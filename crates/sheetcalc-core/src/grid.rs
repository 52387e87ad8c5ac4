//! Fixed-size cell grid

use std::ops::{Index, IndexMut};

use crate::address::CellAddress;
use crate::cell::Cell;
use crate::error::{Error, Result};

/// A fixed-size, row-major grid of cells.
///
/// The row and column counts are set at construction and never change.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Grid {
    rows: usize,
    columns: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Create a grid of empty cells
    ///
    /// # Panics
    ///
    /// Panics if `rows * columns` overflows `usize`.
    pub fn new(rows: usize, columns: usize) -> Self {
        let Some(len) = rows.checked_mul(columns) else {
            panic!("{rows}x{columns} grid has too many cells");
        };
        Self {
            rows,
            columns,
            cells: vec![Cell::default(); len],
        }
    }

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Check whether (row, col) lies inside the grid
    pub fn in_bounds(&self, row: usize, col: usize) -> bool {
        row < self.rows && col < self.columns
    }

    fn offset(&self, row: usize, col: usize) -> Result<usize> {
        if row >= self.rows {
            return Err(Error::RowOutOfBounds(row, self.rows));
        }
        if col >= self.columns {
            return Err(Error::ColumnOutOfBounds(col, self.columns));
        }
        Ok(row * self.columns + col)
    }

    // === Cell Access ===

    /// Get a cell by row and column indices
    pub fn get(&self, row: usize, col: usize) -> Option<&Cell> {
        self.offset(row, col).ok().map(|i| &self.cells[i])
    }

    /// Get a mutable cell by row and column indices
    pub fn get_mut(&mut self, row: usize, col: usize) -> Option<&mut Cell> {
        match self.offset(row, col) {
            Ok(i) => Some(&mut self.cells[i]),
            Err(_) => None,
        }
    }

    /// Get a cell by address string (e.g., "A1")
    pub fn cell(&self, address: &str) -> Result<&Cell> {
        let addr = CellAddress::parse(address)?;
        let i = self.offset(addr.row, addr.col)?;
        Ok(&self.cells[i])
    }

    /// The computed display value at (row, col), if in bounds
    pub fn computed_value(&self, row: usize, col: usize) -> Option<&str> {
        self.get(row, col).map(|cell| cell.computed_value.as_str())
    }

    /// Set a cell's raw input (and, until recalculated, its computed value)
    pub fn set_text<S: Into<String>>(&mut self, row: usize, col: usize, text: S) -> Result<()> {
        let i = self.offset(row, col)?;
        self.cells[i].set_text(text);
        Ok(())
    }

    /// Set a cell's raw input by address string (e.g., "B2")
    pub fn set_text_by_name<S: Into<String>>(&mut self, address: &str, text: S) -> Result<()> {
        let addr = CellAddress::parse(address)?;
        self.set_text(addr.row, addr.col, text)
    }

    /// Store a computed display value
    pub fn set_computed_value<S: Into<String>>(
        &mut self,
        row: usize,
        col: usize,
        value: S,
    ) -> Result<()> {
        let i = self.offset(row, col)?;
        self.cells[i].computed_value = value.into();
        Ok(())
    }

    /// Iterate over all cells in row-major order
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, &Cell)> + '_ {
        let columns = self.columns;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, cell)| (i / columns, i % columns, cell))
    }
}

/// Indexing panics when (row, col) lies outside the grid; use [`Grid::get`]
/// for a checked lookup.
impl Index<(usize, usize)> for Grid {
    type Output = Cell;

    fn index(&self, (row, col): (usize, usize)) -> &Cell {
        assert!(
            self.in_bounds(row, col),
            "cell ({row}, {col}) outside {}x{} grid",
            self.rows,
            self.columns
        );
        &self.cells[row * self.columns + col]
    }
}

impl IndexMut<(usize, usize)> for Grid {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut Cell {
        assert!(
            self.in_bounds(row, col),
            "cell ({row}, {col}) outside {}x{} grid",
            self.rows,
            self.columns
        );
        &mut self.cells[row * self.columns + col]
    }
}
