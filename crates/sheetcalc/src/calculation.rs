//! Grid recalculation engine
//!
//! Recomputes every cell's display value from its raw input. Errors never
//! escape a pass: a formula that fails to tokenize, parse or evaluate shows
//! [`ERROR_MARKER`] and the pass moves on to the next cell.
//!
//! # Example
//!
//! ```rust
//! use sheetcalc::prelude::*;
//!
//! let mut grid = Grid::new(3, 1);
//! grid.set_text(0, 0, "10").unwrap();
//! grid.set_text(1, 0, "20").unwrap();
//! grid.set_text(2, 0, "=A1+A2").unwrap();
//!
//! let stats = grid.recalculate_all();
//! assert_eq!(stats.formula_count, 1);
//! assert_eq!(grid[(2, 0)].computed_value, "30");
//! ```

use crate::{
    evaluate, evaluate_formula, extract_references, format_number, parse_body, CellKey,
    DependencyGraph, EvaluationContext, FormulaError, FormulaExpr, FormulaResult, Grid,
    MalformedPolicy,
};
use ahash::AHashMap;
use tracing::{debug, warn};

/// Display value of a formula cell whose evaluation failed
pub const ERROR_MARKER: &str = "#ERR";

/// Display value of a formula cell on, or depending on, a reference cycle
pub const CIRCULAR_MARKER: &str = "#CIRC";

/// Order in which formula cells are evaluated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RecalcOrder {
    /// One sweep, rows outer and columns inner. A formula reading a cell
    /// later in that order sees the value from before this pass.
    #[default]
    RowMajor,
    /// Every formula is evaluated after the formulas it reads. Cycles are
    /// reported with [`CIRCULAR_MARKER`].
    Dependency,
}

/// Options for grid recalculation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CalculationOptions {
    /// Evaluation order for formula cells
    pub order: RecalcOrder,
    /// How the parser treats malformed formulas
    pub malformed: MalformedPolicy,
}

/// Statistics from a recalculation pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CalculationStats {
    /// Cells whose display value was rewritten (every cell of the grid)
    pub cells_visited: usize,
    /// Number of formula cells
    pub formula_count: usize,
    /// Formula cells that produced a number
    pub cells_calculated: usize,
    /// Formula cells showing an error marker
    pub errors: usize,
    /// Formula cells on or behind a reference cycle
    pub circular_references: usize,
}

/// Extension trait for Grid to add recalculation methods
pub trait GridCalculationExt {
    /// Recalculate every cell with default options
    fn recalculate_all(&mut self) -> CalculationStats;

    /// Recalculate every cell with custom options
    fn recalculate_with_options(&mut self, options: &CalculationOptions) -> CalculationStats;
}

impl GridCalculationExt for Grid {
    fn recalculate_all(&mut self) -> CalculationStats {
        self.recalculate_with_options(&CalculationOptions::default())
    }

    fn recalculate_with_options(&mut self, options: &CalculationOptions) -> CalculationStats {
        FormulaEngine::new(*options).recalculate_all(self)
    }
}

/// The recalculation engine
///
/// Holds only options; all state lives in the grid passed to each call.
#[derive(Debug, Clone, Default)]
pub struct FormulaEngine {
    options: CalculationOptions,
}

impl FormulaEngine {
    pub fn new(options: CalculationOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &CalculationOptions {
        &self.options
    }

    /// Recompute every cell's display value from its raw input
    pub fn recalculate_all(&self, grid: &mut Grid) -> CalculationStats {
        debug!(
            rows = grid.rows(),
            columns = grid.columns(),
            order = ?self.options.order,
            "recalculating grid"
        );

        let mut stats = CalculationStats::default();
        match self.options.order {
            RecalcOrder::RowMajor => self.calculate_row_major(grid, &mut stats),
            RecalcOrder::Dependency => self.calculate_by_dependency(grid, &mut stats),
        }

        debug!(
            formulas = stats.formula_count,
            calculated = stats.cells_calculated,
            errors = stats.errors,
            circular = stats.circular_references,
            "recalculation finished"
        );
        stats
    }

    /// Single sweep in row-major order
    fn calculate_row_major(&self, grid: &mut Grid, stats: &mut CalculationStats) {
        for row in 0..grid.rows() {
            for col in 0..grid.columns() {
                let view: &Grid = grid;
                let cell = &view[(row, col)];
                let computed = match cell.formula_body() {
                    None => cell.raw_input.clone(),
                    Some(body) => {
                        stats.formula_count += 1;
                        let result = evaluate_formula(body, view, self.options.malformed);
                        record_result(result, row, col, stats)
                    }
                };
                grid[(row, col)].computed_value = computed;
                stats.cells_visited += 1;
            }
        }
    }

    /// Pass-through cells first, then formulas in dependency order
    fn calculate_by_dependency(&self, grid: &mut Grid, stats: &mut CalculationStats) {
        let (rows, columns) = (grid.rows(), grid.columns());

        // Phase 1: literals, and parse every formula
        let mut formula_cells: Vec<CellKey> = Vec::new();
        let mut parsed: AHashMap<CellKey, FormulaResult<FormulaExpr>> = AHashMap::new();
        for row in 0..rows {
            for col in 0..columns {
                let cell = &mut grid[(row, col)];
                stats.cells_visited += 1;
                match cell.formula_body() {
                    None => cell.computed_value.clone_from(&cell.raw_input),
                    Some(body) => {
                        let key = CellKey::new(row, col);
                        parsed.insert(key, parse_body(body, self.options.malformed));
                        formula_cells.push(key);
                    }
                }
            }
        }
        stats.formula_count = formula_cells.len();

        // Phase 2: dependency graph between formula cells
        let mut graph = DependencyGraph::new();
        for (&key, ast) in &parsed {
            let Ok(ast) = ast else { continue };
            for precedent in extract_references(ast, rows, columns) {
                if parsed.contains_key(&precedent) {
                    graph.add_dependency(precedent, key);
                }
            }
        }

        // Phase 3: evaluate in order
        let order = graph.calculation_order(&formula_cells);
        for key in order.order {
            let result = if order.circular.contains(&key) {
                stats.circular_references += 1;
                Err(FormulaError::CircularReference)
            } else {
                match &parsed[&key] {
                    Ok(ast) => evaluate(ast, &EvaluationContext::new(grid)),
                    Err(err) => Err(err.clone()),
                }
            };
            grid[(key.row, key.col)].computed_value =
                record_result(result, key.row, key.col, stats);
        }
    }
}

/// Turn one formula's outcome into its display value, counting it in `stats`
fn record_result(
    result: FormulaResult<f64>,
    row: usize,
    col: usize,
    stats: &mut CalculationStats,
) -> String {
    match result {
        Ok(value) => {
            stats.cells_calculated += 1;
            format_number(value)
        }
        Err(err) => {
            stats.errors += 1;
            let address = crate::CellAddress::new(row, col);
            warn!(%address, error = %err, "formula evaluation failed");
            error_marker(&err).to_string()
        }
    }
}

/// Display marker for a formula error
pub fn error_marker(err: &FormulaError) -> &'static str {
    match err {
        FormulaError::CircularReference => CIRCULAR_MARKER,
        _ => ERROR_MARKER,
    }
}
