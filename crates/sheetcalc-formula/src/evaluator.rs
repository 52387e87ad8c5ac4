//! Formula evaluator
//!
//! Evaluates formula ASTs against a grid's computed values.

use crate::ast::FormulaExpr;
use crate::error::{FormulaError, FormulaResult};
use crate::parser::parse_body;
use crate::policy::MalformedPolicy;
use sheetcalc_core::{CellAddress, CellRange, Grid};

/// Context for formula evaluation
///
/// References read the *computed* value of other cells, never their raw
/// input.
pub struct EvaluationContext<'a> {
    grid: &'a Grid,
}

impl<'a> EvaluationContext<'a> {
    /// Create a new evaluation context over a grid
    pub fn new(grid: &'a Grid) -> Self {
        Self { grid }
    }

    /// Numeric value of the cell at `address`.
    ///
    /// Non-numeric text and cells outside the grid count as 0. Text that is
    /// not a cell address at all is an error.
    pub fn cell_number(&self, address: &str) -> FormulaResult<f64> {
        let addr = CellAddress::parse(address)?;
        match self.grid.computed_value(addr.row, addr.col) {
            Some(value) => Ok(parse_display_number(value)),
            None => {
                tracing::trace!(%addr, "reference outside grid, using 0");
                Ok(0.0)
            }
        }
    }

    /// Sum of the numeric values in the inclusive range `start:end`.
    ///
    /// Rows are visited outer, columns inner. Reversed corners select no
    /// cells; cells outside the grid count as 0.
    pub fn sum_range(&self, start: &str, end: &str) -> FormulaResult<f64> {
        let range = CellRange::new(CellAddress::parse(start)?, CellAddress::parse(end)?);

        let Some(clamped) = range.clamp(self.grid.rows(), self.grid.columns()) else {
            tracing::trace!(%range, "range selects no cells inside grid");
            return Ok(0.0);
        };

        Ok(clamped
            .cells()
            .filter_map(|addr| self.grid.computed_value(addr.row, addr.col))
            .map(parse_display_number)
            .sum())
    }
}

/// Evaluate a formula AST to a number.
///
/// Every intermediate value is finite; a result that overflows is
/// [`FormulaError::Overflow`].
pub fn evaluate(expr: &FormulaExpr, ctx: &EvaluationContext<'_>) -> FormulaResult<f64> {
    let value = match expr {
        FormulaExpr::Number(n) => *n,

        FormulaExpr::CellRef(address) => ctx.cell_number(address)?,

        FormulaExpr::BinaryOp { op, left, right } => {
            let left = evaluate(left, ctx)?;
            let right = evaluate(right, ctx)?;
            op.apply(left, right)
        }

        FormulaExpr::Range { start, end } => ctx.sum_range(start, end)?,

        // Only SUM over a range is recognised; anything else is 0 and its
        // arguments are never evaluated.
        FormulaExpr::Function { name, arg, .. } => match (name.as_str(), arg.as_ref()) {
            ("SUM", FormulaExpr::Range { start, end }) => ctx.sum_range(start, end)?,
            _ => 0.0,
        },
    };

    if value.is_finite() {
        Ok(value)
    } else {
        Err(FormulaError::Overflow)
    }
}

/// Tokenize, parse and evaluate a formula body (leading `=` stripped)
pub fn evaluate_formula(body: &str, grid: &Grid, policy: MalformedPolicy) -> FormulaResult<f64> {
    let ast = parse_body(body, policy)?;
    evaluate(&ast, &EvaluationContext::new(grid))
}

/// Interpret a computed display string as a number, 0 if it is not one.
///
/// Only finite values count: text such as `inf` or `NaN` reads as 0.
pub fn parse_display_number(value: &str) -> f64 {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .unwrap_or(0.0)
}

/// Render a number in its shortest decimal form
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_formula;

    fn grid_with(values: &[(&str, &str)]) -> Grid {
        let mut grid = Grid::new(5, 5);
        for (address, value) in values {
            grid.set_text_by_name(address, *value).unwrap();
        }
        grid
    }

    fn eval(formula: &str, grid: &Grid) -> FormulaResult<f64> {
        let ast = parse_formula(formula)?;
        evaluate(&ast, &EvaluationContext::new(grid))
    }

    #[test]
    fn test_evaluate_arithmetic() {
        let grid = Grid::new(1, 1);
        assert_eq!(eval("=1+2*3", &grid), Ok(7.0));
        assert_eq!(eval("=(1+2)*3", &grid), Ok(9.0));
        assert_eq!(eval("=10-4-3", &grid), Ok(3.0));
        assert_eq!(eval("=7/2", &grid), Ok(3.5));
    }

    #[test]
    fn test_division_by_zero() {
        let grid = grid_with(&[("A1", "0")]);
        assert_eq!(eval("=5/0", &grid), Ok(0.0));
        assert_eq!(eval("=5/A1", &grid), Ok(0.0));
        assert_eq!(eval("=5/(2-2)", &grid), Ok(0.0));
    }

    #[test]
    fn test_cell_reference_reads_computed_value() {
        let mut grid = grid_with(&[("A1", "=99")]);
        assert_eq!(eval("=A1", &grid), Ok(0.0));

        grid.set_computed_value(0, 0, "12.5").unwrap();
        assert_eq!(eval("=A1*2", &grid), Ok(25.0));
    }

    #[test]
    fn test_non_numeric_is_zero() {
        let grid = grid_with(&[("A1", "hello"), ("A2", "#ERR"), ("A3", " 4 ")]);
        assert_eq!(eval("=A1+1", &grid), Ok(1.0));
        assert_eq!(eval("=A2+1", &grid), Ok(1.0));
        assert_eq!(eval("=A3+1", &grid), Ok(5.0));
        assert_eq!(eval("=B5", &grid), Ok(0.0));
    }

    #[test]
    fn test_infinity_and_nan_text_is_zero() {
        let grid = grid_with(&[
            ("A1", "1"),
            ("A2", "Nan"),
            ("A3", "inf"),
            ("A4", "-Infinity"),
        ]);
        assert_eq!(eval("=SUM(A1:A2)", &grid), Ok(1.0));
        assert_eq!(eval("=A3*0", &grid), Ok(0.0));
        assert_eq!(eval("=A3", &grid), Ok(0.0));
        assert_eq!(eval("=A4+2", &grid), Ok(2.0));
        assert_eq!(parse_display_number("NaN"), 0.0);
    }

    #[test]
    fn test_overflow_is_error() {
        let big = format!("1{}", "0".repeat(200));
        let grid = grid_with(&[("A1", big.as_str()), ("A2", big.as_str())]);
        assert_eq!(eval("=A1*A2", &grid), Err(FormulaError::Overflow));
        assert_eq!(eval("=A1*A2*0", &grid), Err(FormulaError::Overflow));
        assert_eq!(eval("=A1+A2", &grid), Ok(2e200));

        let literal = format!("={}", "9".repeat(400));
        assert_eq!(eval(&literal, &grid), Err(FormulaError::Overflow));
    }

    #[test]
    fn test_out_of_bounds_reference_is_zero() {
        let grid = grid_with(&[("A1", "3")]);
        assert_eq!(eval("=Z99+A1", &grid), Ok(3.0));
        assert_eq!(eval("=LOG10(1)", &grid), Ok(0.0));
    }

    #[test]
    fn test_range_sum() {
        let grid = grid_with(&[("A1", "1"), ("A2", "2"), ("A3", "3"), ("B1", "x")]);
        assert_eq!(eval("=A1:A3", &grid), Ok(6.0));
        assert_eq!(eval("=SUM(A1:B3)", &grid), Ok(6.0));
        assert_eq!(eval("=sum(a1:a3)*2", &grid), Ok(12.0));
    }

    #[test]
    fn test_range_partially_outside_grid() {
        let grid = grid_with(&[("E5", "4"), ("E4", "1")]);
        assert_eq!(eval("=SUM(E4:Z100)", &grid), Ok(5.0));
        assert_eq!(eval("=SUM(F1:G2)", &grid), Ok(0.0));
    }

    #[test]
    fn test_reversed_range_is_zero() {
        let grid = grid_with(&[("A1", "1"), ("A2", "2")]);
        assert_eq!(eval("=SUM(A2:A1)", &grid), Ok(0.0));
    }

    #[test]
    fn test_unknown_function_is_zero() {
        let grid = grid_with(&[("A1", "1"), ("A2", "2")]);
        assert_eq!(eval("=MAX(A1:A2)", &grid), Ok(0.0));
        assert_eq!(eval("=SUM(A1)", &grid), Ok(0.0));
        assert_eq!(eval("=SUM(A1:A2, 10)", &grid), Ok(3.0));
        // Arguments of unrecognised functions are never resolved
        assert_eq!(eval("=FOO(A1:5)", &grid), Ok(0.0));
    }

    #[test]
    fn test_invalid_address_is_error() {
        let grid = Grid::new(2, 2);
        assert!(matches!(
            eval("=A1:5", &grid),
            Err(FormulaError::InvalidReference(_))
        ));
        assert!(matches!(
            eval("=SUM(A1:5)", &grid),
            Err(FormulaError::InvalidReference(_))
        ));
    }

    #[test]
    fn test_evaluate_formula() {
        let grid = grid_with(&[("A1", "10")]);
        assert_eq!(
            evaluate_formula("a1*2", &grid, MalformedPolicy::Lenient),
            Ok(20.0)
        );
        assert_eq!(
            evaluate_formula("(", &grid, MalformedPolicy::Lenient),
            Err(FormulaError::UnexpectedEnd)
        );
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(20.0), "20");
        assert_eq!(format_number(-3.0), "-3");
        assert_eq!(format_number(0.5), "0.5");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(1.0 / 3.0), "0.3333333333333333");
        assert_eq!(format_number(1e20), "100000000000000000000");
    }
}
