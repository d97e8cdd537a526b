//! Shared error utilities used across the compilation pipeline.
//!
//! Diagnostics are kept lightweight on purpose – lexical and parse errors
//! point at the offending byte with a caret, semantic errors raised during
//! code generation carry just their message, and the arena reports
//! exhaustion as a bare resource error.

use snafu::Snafu;

pub type CompileResult<T> = Result<T, CompileError>;

#[derive(Debug, Snafu)]
pub enum CompileError {
  #[snafu(display("{expr_line}\n{marker} {message}"))]
  WithLocation {
    expr_line: String,
    marker: String,
    message: String,
  },
  #[snafu(display("{message}"))]
  Message { message: String },
  #[snafu(display("arena capacity exhausted"))]
  ArenaExhausted,
}

impl CompileError {
  /// Construct an error anchored at a specific byte offset in the source.
  pub fn at(expr: &str, loc: usize, message: impl Into<String>) -> Self {
    let expr_line = format!("'{expr}'");
    let safe_loc = loc.min(expr.len());
    let char_offset = expr[..safe_loc].chars().count() + 1; // account for opening quote
    let marker = format!("{}^", " ".repeat(char_offset));
    Self::WithLocation {
      expr_line,
      marker,
      message: message.into(),
    }
  }

  /// Construct a position-free error from a bare message.
  pub fn message(message: impl Into<String>) -> Self {
    Self::Message {
      message: message.into(),
    }
  }
}
