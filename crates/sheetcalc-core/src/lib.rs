//! # sheetcalc-core
//!
//! Core data structures for the sheetcalc formula engine.
//!
//! This crate provides:
//! - [`CellAddress`] and [`CellRange`] - A1-style addressing
//! - [`Cell`] - raw input plus computed display value
//! - [`Grid`] - a fixed-size, row-major array of cells
//!
//! ## Example
//!
//! ```rust
//! use sheetcalc_core::{CellAddress, Grid};
//!
//! let mut grid = Grid::new(10, 5);
//! grid.set_text_by_name("B2", "=A1*2").unwrap();
//!
//! let addr = CellAddress::parse("B2").unwrap();
//! assert_eq!(grid[(addr.row, addr.col)].raw_input, "=A1*2");
//! ```

pub mod address;
pub mod cell;
pub mod error;
pub mod grid;

pub use address::{CellAddress, CellRange, CellRangeIterator};
pub use cell::Cell;
pub use error::{Error, Result};
pub use grid::Grid;
