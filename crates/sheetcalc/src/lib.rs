//! # sheetcalc
//!
//! A spreadsheet formula engine.
//!
//! The engine turns each cell's raw input (e.g. `=SUM(A1:B2)+C3`) into a
//! display string and keeps the whole grid consistent after every edit.
//!
//! ## Features
//!
//! - A1-style addressing with bijective base-26 column letters
//! - `+ - * /` arithmetic with standard precedence, cell references, ranges
//!   and `SUM`
//! - Lenient or strict handling of malformed formulas
//! - Row-major or dependency-ordered recalculation with cycle reporting
//! - Per-cell error containment: failures show `#ERR`, never propagate
//!
//! ## Example
//!
//! ```rust
//! use sheetcalc::prelude::*;
//!
//! let mut sheet = Spreadsheet::new(3, 2);
//! sheet.set_cell(0, 0, "1");
//! sheet.set_cell(1, 0, "2");
//! sheet.set_cell(2, 0, "3");
//! sheet.set_cell(0, 1, "=SUM(A1:A3)");
//!
//! assert_eq!(sheet.display_value(0, 1), Some("6"));
//! ```

pub mod calculation;
pub mod prelude;
pub mod spreadsheet;

// Re-export calculation types
pub use calculation::{
    error_marker, CalculationOptions, CalculationStats, FormulaEngine, GridCalculationExt,
    RecalcOrder, CIRCULAR_MARKER, ERROR_MARKER,
};
pub use spreadsheet::Spreadsheet;

// Re-export core types
pub use sheetcalc_core::{Cell, CellAddress, CellRange, Error, Grid, Result};

// Re-export formula types
pub use sheetcalc_formula::{
    evaluate, evaluate_formula, extract_references, format_number, parse_body,
    parse_display_number, parse_formula, parse_formula_with, tokenize, BinaryOperator, CellKey,
    DependencyGraph, EvaluationContext, FormulaError, FormulaExpr, FormulaResult, MalformedPolicy,
    Token, TokenKind,
};
