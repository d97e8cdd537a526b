//! Lexical analysis: turns the raw input string into a vector of tokens.
//!
//! The tokenizer is intentionally tiny – it knows nothing about semantics
//! beyond recognising keywords, identifiers, integer literals and the
//! language's single-character punctuation. It only inspects ASCII classes,
//! and no end-of-input token is emitted; the parser treats exhaustion of the
//! vector as the end.

use crate::error::{CompileError, CompileResult};
use std::fmt;

/// Kinds of tokens recognised by the front-end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
  Exit,
  IntLit,
  Semi,
  OpenParen,
  CloseParen,
  Ident,
  Def,
  Eq,
  Plus,
  Star,
  Minus,
  Slash,
  OpenCurly,
  CloseCurly,
  If,
  Elif,
  Else,
}

impl TokenKind {
  /// Binary-operator precedence: `None` for kinds that are not operators.
  /// `+` and `-` bind loosest, `*` and `/` one level tighter.
  pub fn bin_prec(self) -> Option<u8> {
    match self {
      TokenKind::Plus | TokenKind::Minus => Some(0),
      TokenKind::Star | TokenKind::Slash => Some(1),
      _ => None,
    }
  }
}

impl fmt::Display for TokenKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let symbol = match self {
      TokenKind::Exit => "exit",
      TokenKind::IntLit => "integer literal",
      TokenKind::Semi => ";",
      TokenKind::OpenParen => "(",
      TokenKind::CloseParen => ")",
      TokenKind::Ident => "identifier",
      TokenKind::Def => "def",
      TokenKind::Eq => "=",
      TokenKind::Plus => "+",
      TokenKind::Star => "*",
      TokenKind::Minus => "-",
      TokenKind::Slash => "/",
      TokenKind::OpenCurly => "{",
      TokenKind::CloseCurly => "}",
      TokenKind::If => "if",
      TokenKind::Elif => "elif",
      TokenKind::Else => "else",
    };
    f.write_str(symbol)
  }
}

/// Thin wrapper for lexical information needed by later stages. The lexeme
/// is present only for kinds that carry a value (`IntLit`, `Ident`).
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
  pub kind: TokenKind,
  pub lexeme: Option<String>,
  pub loc: usize,
}

impl Token {
  /// Convenience constructor to keep the `tokenize` loop readable.
  pub fn new(kind: TokenKind, loc: usize) -> Self {
    Self {
      kind,
      lexeme: None,
      loc,
    }
  }

  pub fn with_lexeme(kind: TokenKind, loc: usize, lexeme: impl Into<String>) -> Self {
    Self {
      kind,
      lexeme: Some(lexeme.into()),
      loc,
    }
  }

  /// The lexeme for value-carrying tokens, empty otherwise.
  pub fn text(&self) -> &str {
    self.lexeme.as_deref().unwrap_or("")
  }
}

fn keyword(text: &str) -> Option<TokenKind> {
  match text {
    "exit" => Some(TokenKind::Exit),
    "def" => Some(TokenKind::Def),
    "if" => Some(TokenKind::If),
    "elif" => Some(TokenKind::Elif),
    "else" => Some(TokenKind::Else),
    _ => None,
  }
}

fn punctuator(byte: u8) -> Option<TokenKind> {
  match byte {
    b';' => Some(TokenKind::Semi),
    b'(' => Some(TokenKind::OpenParen),
    b')' => Some(TokenKind::CloseParen),
    b'=' => Some(TokenKind::Eq),
    b'+' => Some(TokenKind::Plus),
    b'*' => Some(TokenKind::Star),
    b'-' => Some(TokenKind::Minus),
    b'/' => Some(TokenKind::Slash),
    b'{' => Some(TokenKind::OpenCurly),
    b'}' => Some(TokenKind::CloseCurly),
    _ => None,
  }
}

/// Lex the input into a flat vector of tokens.
pub fn tokenize(input: &str) -> CompileResult<Vec<Token>> {
  let mut tokens = Vec::new();
  let bytes = input.as_bytes();
  let mut i = 0;

  while i < bytes.len() {
    let c = bytes[i];
    if c.is_ascii_whitespace() {
      i += 1;
      continue;
    }

    if c.is_ascii_alphabetic() {
      let start = i;
      i += 1;
      while i < bytes.len() && bytes[i].is_ascii_alphanumeric() {
        i += 1;
      }
      let text = &input[start..i];
      tokens.push(match keyword(text) {
        Some(kind) => Token::new(kind, start),
        None => Token::with_lexeme(TokenKind::Ident, start, text),
      });
      continue;
    }

    if c.is_ascii_digit() {
      let start = i;
      i += 1;
      while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
      }
      tokens.push(Token::with_lexeme(TokenKind::IntLit, start, &input[start..i]));
      continue;
    }

    if let Some(kind) = punctuator(c) {
      tokens.push(Token::new(kind, i));
      i += 1;
      continue;
    }

    let invalid_char = input[i..].chars().next().unwrap_or('\0');
    return Err(CompileError::at(
      input,
      i,
      format!("invalid token: '{invalid_char}'"),
    ));
  }

  Ok(tokens)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn kinds(input: &str) -> Vec<TokenKind> {
    tokenize(input)
      .expect("tokenize")
      .into_iter()
      .map(|token| token.kind)
      .collect()
  }

  #[test]
  fn keywords_become_keyword_tokens() {
    assert_eq!(
      kinds("exit def if elif else"),
      vec![
        TokenKind::Exit,
        TokenKind::Def,
        TokenKind::If,
        TokenKind::Elif,
        TokenKind::Else,
      ]
    );
  }

  #[test]
  fn keywords_carry_no_lexeme() {
    let tokens = tokenize("exit").expect("tokenize");
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].lexeme, None);
  }

  #[test]
  fn identifier_keeps_its_lexeme() {
    let tokens = tokenize("counter").expect("tokenize");
    assert_eq!(tokens[0].kind, TokenKind::Ident);
    assert_eq!(tokens[0].text(), "counter");
  }

  #[test]
  fn keyword_prefix_is_still_an_identifier() {
    let tokens = tokenize("exitcode").expect("tokenize");
    assert_eq!(tokens[0].kind, TokenKind::Ident);
    assert_eq!(tokens[0].text(), "exitcode");
  }

  #[test]
  fn identifier_may_contain_digits_after_first_char() {
    let tokens = tokenize("x1").expect("tokenize");
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].kind, TokenKind::Ident);
    assert_eq!(tokens[0].text(), "x1");
  }

  #[test]
  fn integer_literal_keeps_its_digits() {
    let tokens = tokenize("1234").expect("tokenize");
    assert_eq!(tokens[0].kind, TokenKind::IntLit);
    assert_eq!(tokens[0].text(), "1234");
  }

  #[test]
  fn all_punctuators_map_to_their_kinds() {
    assert_eq!(
      kinds("; ( ) = + * - / { }"),
      vec![
        TokenKind::Semi,
        TokenKind::OpenParen,
        TokenKind::CloseParen,
        TokenKind::Eq,
        TokenKind::Plus,
        TokenKind::Star,
        TokenKind::Minus,
        TokenKind::Slash,
        TokenKind::OpenCurly,
        TokenKind::CloseCurly,
      ]
    );
  }

  #[test]
  fn empty_input_produces_no_tokens() {
    assert!(tokenize("").expect("tokenize").is_empty());
    assert!(tokenize("  \n\t ").expect("tokenize").is_empty());
  }

  #[test]
  fn whitespace_is_skipped() {
    assert_eq!(
      kinds("exit\t(\n0 ) ;"),
      kinds("exit(0);"),
    );
  }

  #[test]
  fn token_locations_point_at_first_byte() {
    let tokens = tokenize("def x = 10;").expect("tokenize");
    let locs: Vec<usize> = tokens.iter().map(|token| token.loc).collect();
    assert_eq!(locs, vec![0, 4, 6, 8, 10]);
  }

  #[test]
  fn unknown_character_is_a_lexical_error() {
    let err = tokenize("exit(@);").expect_err("should fail");
    assert!(err.to_string().contains("invalid token: '@'"));
  }

  #[test]
  fn tokenize_is_deterministic() {
    let source = "def x = 1 + 2; exit(x);";
    assert_eq!(
      tokenize(source).expect("tokenize"),
      tokenize(source).expect("tokenize"),
    );
  }

  #[test]
  fn precedence_table() {
    assert_eq!(TokenKind::Plus.bin_prec(), Some(0));
    assert_eq!(TokenKind::Minus.bin_prec(), Some(0));
    assert_eq!(TokenKind::Star.bin_prec(), Some(1));
    assert_eq!(TokenKind::Slash.bin_prec(), Some(1));
    assert_eq!(TokenKind::Exit.bin_prec(), None);
    assert_eq!(TokenKind::OpenParen.bin_prec(), None);
    assert_eq!(TokenKind::Eq.bin_prec(), None);
  }
}
