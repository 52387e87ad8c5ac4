//! Handling of malformed formula input
//!
//! The grammar never decides on its own what to do with input it does not
//! expect; it asks a [`MalformedPolicy`]. `Lenient` reproduces the
//! spreadsheet's forgiving behaviour, `Strict` turns the same situations into
//! parse errors.

use crate::ast::FormulaExpr;
use crate::error::{FormulaError, FormulaResult};
use crate::token::{Token, TokenKind};

/// What the parser does when it meets input it does not expect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MalformedPolicy {
    /// Substitute `0` for unusable operands, accept any closing token and
    /// ignore tokens left over after the expression.
    #[default]
    Lenient,
    /// Reject all of the above with [`FormulaError::Parse`].
    Strict,
}

impl MalformedPolicy {
    /// Called when an operand was required but `found` cannot start one.
    pub fn on_unexpected(&self, found: &Token) -> FormulaResult<FormulaExpr> {
        match self {
            MalformedPolicy::Lenient => Ok(FormulaExpr::Number(0.0)),
            MalformedPolicy::Strict => Err(FormulaError::Parse(format!(
                "unexpected {} where a value was expected",
                found
            ))),
        }
    }

    /// Called after the parser consumed `found` in a position where the
    /// grammar calls for `expected`.
    pub fn on_mismatch(&self, expected: TokenKind, found: &Token) -> FormulaResult<()> {
        if found.kind == expected {
            return Ok(());
        }
        match self {
            MalformedPolicy::Lenient => Ok(()),
            MalformedPolicy::Strict => Err(FormulaError::Parse(format!(
                "expected {:?}, got {}",
                expected, found
            ))),
        }
    }

    /// Called once the top-level expression is complete and `next` is the
    /// first token not consumed by it.
    pub fn on_trailing(&self, next: &Token) -> FormulaResult<()> {
        match (self, next.kind) {
            (_, TokenKind::End) | (MalformedPolicy::Lenient, _) => Ok(()),
            (MalformedPolicy::Strict, _) => Err(FormulaError::Parse(format!(
                "unexpected {} after expression",
                next
            ))),
        }
    }
}
