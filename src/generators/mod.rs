//! Tree-to-text generators.
//!
//! `arduino` turns a block graph into an Arduino sketch; `python` covers the
//! subset of blocks that have a MicroPython rendition. Both share operator
//! precedence handling and identifier sanitising from this module.

pub mod arduino;
pub mod names;
pub mod python;

pub use names::NameDb;

/// Operator precedence of an emitted expression. Lower ranks bind tighter.
pub trait Precedence: Copy {
    fn rank(self) -> u8;
}

/// Parenthesise `code` when it binds more loosely than the slot it goes into.
pub fn parenthesize<O: Precedence>(code: String, inner: O, outer: O) -> String {
    if code.is_empty() || inner.rank() <= outer.rank() {
        code
    } else {
        format!("({code})")
    }
}

/// What a block generator produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Code<O> {
    /// Newline-terminated statement text.
    Statement(String),
    /// An expression and the precedence of its outermost operator.
    Expr(String, O),
}

impl<O> Code<O> {
    pub fn statement(code: impl Into<String>) -> Self {
        Code::Statement(code.into())
    }

    pub fn into_text(self) -> String {
        match self {
            Code::Statement(s) | Code::Expr(s, _) => s,
        }
    }
}

/// Prefix every line of `text` with `prefix`.
pub fn prefix_lines(text: &str, prefix: &str) -> String {
    text.lines()
        .map(|l| format!("{prefix}{l}\n"))
        .collect::<String>()
}
