//! Formula parser
//!
//! A recursive descent parser over the token sequence with two precedence
//! levels:
//!
//! ```text
//! expression := term (('+' | '-') term)*
//! term       := factor (('*' | '/') factor)*
//! factor     := NUMBER
//!             | CELL (':' CELL)?
//!             | FUNCTION '(' expression (',' expression)? ')'
//!             | '(' expression ')'
//! ```
//!
//! Anything the grammar does not expect is delegated to a [`MalformedPolicy`].
//! Reading past the End sentinel is always an error, whatever the policy.

use crate::ast::{BinaryOperator, FormulaExpr};
use crate::error::{FormulaError, FormulaResult};
use crate::policy::MalformedPolicy;
use crate::token::{tokenize, Token, TokenKind};

/// Deepest allowed nesting of parentheses and function calls
pub const MAX_NESTING: usize = 256;

/// Most binary operators a single formula may contain.
///
/// Operator chains fold into a left-deep tree, so this bounds the tree depth
/// together with [`MAX_NESTING`].
pub const MAX_OPERATORS: usize = 1024;

/// Parse a formula string (with its leading `=`) into an AST, leniently
///
/// # Example
/// ```rust
/// use sheetcalc_formula::parse_formula;
///
/// let ast = parse_formula("=1+2").unwrap();
/// let ast = parse_formula("=SUM(A1:A10)").unwrap();
/// ```
pub fn parse_formula(formula: &str) -> FormulaResult<FormulaExpr> {
    parse_formula_with(formula, MalformedPolicy::default())
}

/// Parse a formula string (with its leading `=`) under the given policy
pub fn parse_formula_with(formula: &str, policy: MalformedPolicy) -> FormulaResult<FormulaExpr> {
    let body = formula
        .strip_prefix('=')
        .ok_or_else(|| FormulaError::Parse("Formula must start with '='".into()))?;
    parse_body(body, policy)
}

/// Tokenize and parse a formula body (leading `=` already stripped)
pub fn parse_body(body: &str, policy: MalformedPolicy) -> FormulaResult<FormulaExpr> {
    let tokens = tokenize(body);
    parse_tokens(&tokens, policy)
}

/// Parse an already tokenized formula body
pub fn parse_tokens(tokens: &[Token], policy: MalformedPolicy) -> FormulaResult<FormulaExpr> {
    let mut parser = FormulaParser::new(tokens, policy);
    let expr = parser.parse_expression()?;
    policy.on_trailing(parser.peek()?)?;
    Ok(expr)
}

/// Formula parser
struct FormulaParser<'t> {
    tokens: &'t [Token],
    pos: usize,
    depth: usize,
    operators: usize,
    policy: MalformedPolicy,
}

impl<'t> FormulaParser<'t> {
    fn new(tokens: &'t [Token], policy: MalformedPolicy) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
            operators: 0,
            policy,
        }
    }

    // === Token cursor ===

    fn peek(&self) -> FormulaResult<&'t Token> {
        self.tokens.get(self.pos).ok_or(FormulaError::UnexpectedEnd)
    }

    fn next(&mut self) -> FormulaResult<&'t Token> {
        let token = self.peek()?;
        self.pos += 1;
        Ok(token)
    }

    /// Consume the next token if it is one of `accepted` operators
    fn next_operator(
        &mut self,
        accepted: &[BinaryOperator],
    ) -> FormulaResult<Option<BinaryOperator>> {
        let token = self.peek()?;
        if token.kind != TokenKind::Operator {
            return Ok(None);
        }
        match BinaryOperator::from_symbol(&token.text) {
            Some(op) if accepted.contains(&op) => {
                self.operators += 1;
                if self.operators > MAX_OPERATORS {
                    return Err(FormulaError::Parse(format!(
                        "formula has more than {} operators",
                        MAX_OPERATORS
                    )));
                }
                self.pos += 1;
                Ok(Some(op))
            }
            _ => Ok(None),
        }
    }

    fn enter(&mut self) -> FormulaResult<()> {
        self.depth += 1;
        if self.depth > MAX_NESTING {
            return Err(FormulaError::Parse(format!(
                "formula nested deeper than {} levels",
                MAX_NESTING
            )));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    // === Expression parsing with precedence ===

    fn parse_expression(&mut self) -> FormulaResult<FormulaExpr> {
        let mut left = self.parse_term()?;

        while let Some(op) =
            self.next_operator(&[BinaryOperator::Add, BinaryOperator::Subtract])?
        {
            let right = self.parse_term()?;
            left = FormulaExpr::binary(op, left, right);
        }

        Ok(left)
    }

    fn parse_term(&mut self) -> FormulaResult<FormulaExpr> {
        let mut left = self.parse_factor()?;

        while let Some(op) =
            self.next_operator(&[BinaryOperator::Multiply, BinaryOperator::Divide])?
        {
            let right = self.parse_factor()?;
            left = FormulaExpr::binary(op, left, right);
        }

        Ok(left)
    }

    fn parse_factor(&mut self) -> FormulaResult<FormulaExpr> {
        let token = self.next()?;

        match token.kind {
            TokenKind::Number => token
                .text
                .parse()
                .map(FormulaExpr::Number)
                .map_err(|_| FormulaError::Parse(format!("invalid number '{}'", token.text))),

            TokenKind::Cell => {
                if self.peek()?.kind != TokenKind::Colon {
                    return Ok(FormulaExpr::CellRef(token.text.clone()));
                }
                self.pos += 1;
                let end = self.next()?;
                self.policy.on_mismatch(TokenKind::Cell, end)?;
                Ok(FormulaExpr::range(token.text.clone(), end.text.clone()))
            }

            TokenKind::Function => {
                self.enter()?;
                let open = self.next()?;
                self.policy.on_mismatch(TokenKind::LeftParen, open)?;

                let arg = self.parse_expression()?;
                let second = if self.peek()?.kind == TokenKind::Comma {
                    self.pos += 1;
                    Some(Box::new(self.parse_expression()?))
                } else {
                    None
                };

                let close = self.next()?;
                self.policy.on_mismatch(TokenKind::RightParen, close)?;
                self.leave();

                Ok(FormulaExpr::Function {
                    name: token.text.clone(),
                    arg: Box::new(arg),
                    second,
                })
            }

            TokenKind::LeftParen => {
                self.enter()?;
                let expr = self.parse_expression()?;
                let close = self.next()?;
                self.policy.on_mismatch(TokenKind::RightParen, close)?;
                self.leave();
                Ok(expr)
            }

            TokenKind::Operator
            | TokenKind::RightParen
            | TokenKind::Comma
            | TokenKind::Colon
            | TokenKind::End => self.policy.on_unexpected(token),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn num(n: f64) -> FormulaExpr {
        FormulaExpr::Number(n)
    }

    fn cell(a: &str) -> FormulaExpr {
        FormulaExpr::CellRef(a.to_string())
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_formula("=42").unwrap(), num(42.0));
        assert_eq!(parse_formula("=3.14").unwrap(), num(3.14));
    }

    #[test]
    fn test_parse_requires_equals() {
        assert!(matches!(parse_formula("1+2"), Err(FormulaError::Parse(_))));
    }

    #[test]
    fn test_parse_precedence() {
        let ast = parse_formula("=1+2*3").unwrap();
        assert_eq!(
            ast,
            FormulaExpr::binary(
                BinaryOperator::Add,
                num(1.0),
                FormulaExpr::binary(BinaryOperator::Multiply, num(2.0), num(3.0)),
            )
        );
    }

    #[test]
    fn test_parse_left_associative() {
        let ast = parse_formula("=8-3-1").unwrap();
        assert_eq!(
            ast,
            FormulaExpr::binary(
                BinaryOperator::Subtract,
                FormulaExpr::binary(BinaryOperator::Subtract, num(8.0), num(3.0)),
                num(1.0),
            )
        );

        let ast = parse_formula("=8/4/2").unwrap();
        assert!(matches!(
            ast,
            FormulaExpr::BinaryOp { op: BinaryOperator::Divide, ref left, .. }
                if matches!(**left, FormulaExpr::BinaryOp { op: BinaryOperator::Divide, .. })
        ));
    }

    #[test]
    fn test_parse_parentheses() {
        let ast = parse_formula("=(1+2)*3").unwrap();
        assert_eq!(
            ast,
            FormulaExpr::binary(
                BinaryOperator::Multiply,
                FormulaExpr::binary(BinaryOperator::Add, num(1.0), num(2.0)),
                num(3.0),
            )
        );
    }

    #[test]
    fn test_parse_cell_and_range() {
        assert_eq!(parse_formula("=b12").unwrap(), cell("B12"));
        assert_eq!(
            parse_formula("=A1:B2").unwrap(),
            FormulaExpr::range("A1", "B2")
        );
    }

    #[test]
    fn test_parse_function() {
        let ast = parse_formula("=SUM(A1:A3)").unwrap();
        assert_eq!(
            ast,
            FormulaExpr::Function {
                name: "SUM".into(),
                arg: Box::new(FormulaExpr::range("A1", "A3")),
                second: None,
            }
        );

        let ast = parse_formula("=max(A1, 2)").unwrap();
        assert_eq!(
            ast,
            FormulaExpr::Function {
                name: "MAX".into(),
                arg: Box::new(cell("A1")),
                second: Some(Box::new(num(2.0))),
            }
        );
    }

    #[test]
    fn test_lenient_fallback_to_zero() {
        // An operator where an operand belongs becomes 0
        assert_eq!(parse_formula("=*5").unwrap(), num(0.0));
        assert_eq!(
            parse_formula("=1+)").unwrap(),
            FormulaExpr::binary(BinaryOperator::Add, num(1.0), num(0.0))
        );
    }

    #[test]
    fn test_lenient_ignores_trailing_tokens() {
        assert_eq!(parse_formula("=1 2").unwrap(), num(1.0));
        assert_eq!(parse_formula("=A1)").unwrap(), cell("A1"));
    }

    #[test]
    fn test_lenient_does_not_validate_closing_paren() {
        assert_eq!(
            parse_formula("=(1+2,").unwrap(),
            FormulaExpr::binary(BinaryOperator::Add, num(1.0), num(2.0))
        );
    }

    #[test]
    fn test_running_out_of_tokens_is_an_error() {
        assert_eq!(parse_formula("="), Err(FormulaError::UnexpectedEnd));
        assert_eq!(parse_formula("=1+"), Err(FormulaError::UnexpectedEnd));
        assert_eq!(parse_formula("=("), Err(FormulaError::UnexpectedEnd));
        assert_eq!(parse_formula("=SUM("), Err(FormulaError::UnexpectedEnd));
        assert_eq!(parse_formula("=SUM(A1:A3"), Err(FormulaError::UnexpectedEnd));
        assert_eq!(parse_formula("=A1:"), Err(FormulaError::UnexpectedEnd));
    }

    #[test]
    fn test_lenient_range_end_not_validated() {
        assert_eq!(parse_formula("=A1:5").unwrap(), FormulaExpr::range("A1", "5"));
    }

    #[test]
    fn test_strict_policy() {
        let strict = MalformedPolicy::Strict;
        assert!(parse_formula_with("=(1+2)*3", strict).is_ok());
        assert!(parse_formula_with("=SUM(A1:B2, 3)", strict).is_ok());

        assert!(matches!(parse_formula_with("=*5", strict), Err(FormulaError::Parse(_))));
        assert!(matches!(parse_formula_with("=1 2", strict), Err(FormulaError::Parse(_))));
        assert!(matches!(parse_formula_with("=(1+2,", strict), Err(FormulaError::Parse(_))));
        assert!(matches!(parse_formula_with("=A1:5", strict), Err(FormulaError::Parse(_))));
    }

    #[test]
    fn test_nesting_limit() {
        let deep = format!("={}1{}", "(".repeat(MAX_NESTING), ")".repeat(MAX_NESTING));
        assert_eq!(parse_formula(&deep).unwrap(), num(1.0));

        let too_deep = format!(
            "={}1{}",
            "(".repeat(MAX_NESTING + 1),
            ")".repeat(MAX_NESTING + 1)
        );
        assert!(matches!(parse_formula(&too_deep), Err(FormulaError::Parse(_))));
    }

    #[test]
    fn test_operator_limit() {
        let terms = vec!["1"; MAX_OPERATORS + 1].join("+");
        assert!(parse_formula(&format!("={}", terms)).is_ok());

        let terms = vec!["2"; MAX_OPERATORS + 2].join("*");
        assert!(matches!(
            parse_formula(&format!("={}", terms)),
            Err(FormulaError::Parse(_))
        ));
    }

    #[test]
    fn test_very_long_formula_is_rejected() {
        let terms = vec!["1"; 100_000].join("+");
        assert!(matches!(
            parse_formula(&format!("={}", terms)),
            Err(FormulaError::Parse(_))
        ));
    }
}
