//! # sheetcalc-formula
//!
//! Formula tokenizer, parser and evaluator for sheetcalc.
//!
//! This crate provides:
//! - Tokenizing (text → tokens)
//! - Formula parsing (tokens → AST), with a pluggable [`MalformedPolicy`]
//! - Formula evaluation (AST → number) against a [`sheetcalc_core::Grid`]
//! - Dependency tracking for ordered recalculation
//!
//! ## Example
//!
//! ```rust
//! use sheetcalc_core::Grid;
//! use sheetcalc_formula::{evaluate, parse_formula, EvaluationContext};
//!
//! let mut grid = Grid::new(3, 1);
//! grid.set_text(0, 0, "4").unwrap();
//!
//! let ast = parse_formula("=A1*2+1").unwrap();
//! let result = evaluate(&ast, &EvaluationContext::new(&grid)).unwrap();
//! assert_eq!(result, 9.0);
//! ```

pub mod ast;
pub mod dependency;
pub mod error;
pub mod evaluator;
pub mod parser;
pub mod policy;
pub mod token;

pub use ast::{BinaryOperator, FormulaExpr};
pub use dependency::{extract_references, CalculationOrder, CellKey, DependencyGraph};
pub use error::{FormulaError, FormulaResult};
pub use evaluator::{
    evaluate, evaluate_formula, format_number, parse_display_number, EvaluationContext,
};
pub use parser::{parse_body, parse_formula, parse_formula_with, parse_tokens};
pub use policy::MalformedPolicy;
pub use token::{tokenize, Token, TokenKind};
