//! Formula tokenizer
//!
//! Turns formula source text (without the leading `=`) into a flat sequence
//! of tokens terminated by a single [`TokenKind::End`] sentinel.

use lazy_regex::regex;
use std::fmt;

/// Token classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// `digits(.digits)?`
    Number,
    /// Cell reference like `A1`
    Cell,
    /// Function name, always directly followed by `(`
    Function,
    /// One of `+ - * /`
    Operator,
    LeftParen,
    RightParen,
    Comma,
    Colon,
    /// End of input sentinel
    End,
}

/// A classified lexical unit with its source text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
}

impl Token {
    pub fn new<S: Into<String>>(kind: TokenKind, text: S) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    /// The End sentinel
    pub fn end() -> Self {
        Self::new(TokenKind::End, "")
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::End => write!(f, "end of formula"),
            _ => write!(f, "'{}'", self.text),
        }
    }
}

/// Tokenize a formula body.
///
/// The whole input is uppercased first, so references and function names are
/// case-insensitive. Characters that start no token are dropped.
///
/// ```rust
/// use sheetcalc_formula::token::{tokenize, TokenKind};
///
/// let kinds: Vec<_> = tokenize("sum(a1:a3)").into_iter().map(|t| t.kind).collect();
/// assert_eq!(kinds, vec![
///     TokenKind::Function, TokenKind::LeftParen, TokenKind::Cell, TokenKind::Colon,
///     TokenKind::Cell, TokenKind::RightParen, TokenKind::End,
/// ]);
/// ```
pub fn tokenize(source: &str) -> Vec<Token> {
    let source = source.to_uppercase();
    let mut tokens = Vec::new();
    let mut rest = source.as_str();

    while let Some(c) = rest.chars().next() {
        if c.is_whitespace() {
            rest = &rest[c.len_utf8()..];
            continue;
        }

        if let Some(m) = regex!(r"^[0-9]+(\.[0-9]+)?").find(rest) {
            tokens.push(Token::new(TokenKind::Number, m.as_str()));
            rest = &rest[m.end()..];
            continue;
        }

        if let Some(m) = regex!(r"^[A-Z]+[0-9]+").find(rest) {
            tokens.push(Token::new(TokenKind::Cell, m.as_str()));
            rest = &rest[m.end()..];
            continue;
        }

        // Function names stop before the '(' which is scanned next
        if let Some(m) = regex!(r"^[A-Z]+\(").find(rest) {
            let name_end = m.end() - 1;
            tokens.push(Token::new(TokenKind::Function, &rest[..name_end]));
            rest = &rest[name_end..];
            continue;
        }

        rest = &rest[c.len_utf8()..];
        let kind = match c {
            '+' | '-' | '*' | '/' => TokenKind::Operator,
            '(' => TokenKind::LeftParen,
            ')' => TokenKind::RightParen,
            ',' => TokenKind::Comma,
            ':' => TokenKind::Colon,
            _ => continue,
        };
        tokens.push(Token::new(kind, c.to_string()));
    }

    tokens.push(Token::end());
    tokens
}
