//! Recursive-descent parser producing an arena-allocated statement AST.
//!
//! The grammar is LL(1) almost everywhere; a `def` declaration needs three
//! tokens of lookahead (`def IDENT =`) before we commit to the statement
//! form. Binary expressions are parsed with precedence climbing: one loop
//! carrying a minimum-precedence threshold instead of one production per
//! precedence level.

use crate::arena::{Arena, ExprId, IfPredId, ScopeId, StmtId, TermId};
use crate::ast::{BinExpr, BinOp, Expr, IfPred, Program, Scope, Stmt, Term};
use crate::error::{CompileError, CompileResult};
use crate::tokenizer::{Token, TokenKind};

/// Parse the whole token stream into a [`Program`].
///
/// Statements are emitted in source order. Leftover input that does not
/// start a valid statement is a fatal parse error.
pub fn parse(tokens: Vec<Token>, source: &str, arena: &mut Arena) -> CompileResult<Program> {
  let mut stream = TokenStream::new(tokens, source);

  let mut stmts = Vec::new();
  while !stream.is_empty() {
    match parse_stmt(&mut stream, arena)? {
      Some(stmt) => stmts.push(stmt),
      None => return Err(stream.error("Invalid statement")),
    }
  }

  Ok(Program { stmts })
}

/// Parse one statement, or return `None` when the lookahead is not a
/// statement prefix.
fn parse_stmt(stream: &mut TokenStream, arena: &mut Arena) -> CompileResult<Option<StmtId>> {
  match stream.peek_kind() {
    Some(TokenKind::Exit) if stream.peek_kind_at(1) == Some(TokenKind::OpenParen) => {
      stream.bump(); // exit
      stream.bump(); // (
      let expr = expect_expr(parse_expr(stream, arena, 0)?, stream)?;
      stream.expect(TokenKind::CloseParen)?;
      stream.expect(TokenKind::Semi)?;
      Ok(Some(arena.alloc_stmt(Stmt::Exit { expr })?))
    }
    Some(TokenKind::Def)
      if stream.peek_kind_at(1) == Some(TokenKind::Ident)
        && stream.peek_kind_at(2) == Some(TokenKind::Eq) =>
    {
      stream.bump(); // def
      let ident = stream.expect(TokenKind::Ident)?;
      stream.bump(); // =
      let expr = expect_expr(parse_expr(stream, arena, 0)?, stream)?;
      stream.expect(TokenKind::Semi)?;
      Ok(Some(arena.alloc_stmt(Stmt::Def { ident, expr })?))
    }
    Some(TokenKind::OpenCurly) => {
      let scope = expect_scope(parse_scope(stream, arena)?, stream)?;
      Ok(Some(arena.alloc_stmt(Stmt::Scope(scope))?))
    }
    Some(TokenKind::If) => {
      stream.bump(); // if
      stream.expect(TokenKind::OpenParen)?;
      let cond = expect_expr(parse_expr(stream, arena, 0)?, stream)?;
      stream.expect(TokenKind::CloseParen)?;
      let body = expect_scope(parse_scope(stream, arena)?, stream)?;
      let pred = parse_if_pred(stream, arena)?;
      Ok(Some(arena.alloc_stmt(Stmt::If { cond, body, pred })?))
    }
    _ => Ok(None),
  }
}

/// Parse a braced scope, or return `None` when there is no opening `{`.
/// Once the brace is consumed the closing `}` is mandatory.
fn parse_scope(stream: &mut TokenStream, arena: &mut Arena) -> CompileResult<Option<ScopeId>> {
  if stream.peek_kind() != Some(TokenKind::OpenCurly) {
    return Ok(None);
  }
  stream.bump(); // {

  let mut stmts = Vec::new();
  while let Some(stmt) = parse_stmt(stream, arena)? {
    stmts.push(stmt);
  }
  stream.expect(TokenKind::CloseCurly)?;

  Ok(Some(arena.alloc_scope(Scope { stmts })?))
}

/// Parse the optional elif/else tail of an if statement. Elif chains are
/// right-recursive and terminate in `None` or an `Else`.
fn parse_if_pred(stream: &mut TokenStream, arena: &mut Arena) -> CompileResult<Option<IfPredId>> {
  match stream.peek_kind() {
    Some(TokenKind::Elif) => {
      stream.bump(); // elif
      stream.expect(TokenKind::OpenParen)?;
      let cond = expect_expr(parse_expr(stream, arena, 0)?, stream)?;
      stream.expect(TokenKind::CloseParen)?;
      let body = expect_scope(parse_scope(stream, arena)?, stream)?;
      let next = parse_if_pred(stream, arena)?;
      Ok(Some(arena.alloc_if_pred(IfPred::Elif { cond, body, next })?))
    }
    Some(TokenKind::Else) => {
      stream.bump(); // else
      let body = expect_scope(parse_scope(stream, arena)?, stream)?;
      Ok(Some(arena.alloc_if_pred(IfPred::Else { body })?))
    }
    _ => Ok(None),
  }
}

/// Precedence-climbing expression parser. Returns `None` when the lookahead
/// does not start a term.
///
/// Each loop iteration wraps the accumulated left-hand side in a freshly
/// allocated `Expr`, so growing the tree to the left never aliases a node
/// with itself.
fn parse_expr(
  stream: &mut TokenStream,
  arena: &mut Arena,
  min_prec: u8,
) -> CompileResult<Option<ExprId>> {
  let Some(term) = parse_term(stream, arena)? else {
    return Ok(None);
  };
  let mut lhs = arena.alloc_expr(Expr::Term(term))?;

  loop {
    let (op, prec) = match stream.peek_kind() {
      Some(kind) => match kind.bin_prec() {
        Some(prec) if prec >= min_prec => (kind, prec),
        _ => break,
      },
      None => break,
    };
    stream.bump();

    // prec + 1 keeps all four operators left-associative
    let rhs = expect_expr(parse_expr(stream, arena, prec + 1)?, stream)?;

    let op = match op {
      TokenKind::Plus => BinOp::Add,
      TokenKind::Minus => BinOp::Sub,
      TokenKind::Star => BinOp::Mul,
      TokenKind::Slash => BinOp::Div,
      _ => unreachable!(),
    };
    let bin_expr = arena.alloc_bin_expr(BinExpr { op, lhs, rhs })?;
    lhs = arena.alloc_expr(Expr::Bin(bin_expr))?;
  }

  Ok(Some(lhs))
}

/// Parse a term: integer literal, identifier, or parenthesised expression.
/// Parentheses re-enter `parse_expr` with the threshold reset to zero.
fn parse_term(stream: &mut TokenStream, arena: &mut Arena) -> CompileResult<Option<TermId>> {
  match stream.peek_kind() {
    Some(TokenKind::IntLit) => {
      let token = stream.expect(TokenKind::IntLit)?;
      Ok(Some(arena.alloc_term(Term::IntLit(token))?))
    }
    Some(TokenKind::Ident) => {
      let token = stream.expect(TokenKind::Ident)?;
      Ok(Some(arena.alloc_term(Term::Ident(token))?))
    }
    Some(TokenKind::OpenParen) => {
      stream.bump(); // (
      let expr = expect_expr(parse_expr(stream, arena, 0)?, stream)?;
      stream.expect(TokenKind::CloseParen)?;
      Ok(Some(arena.alloc_term(Term::Paren(expr))?))
    }
    _ => Ok(None),
  }
}

fn expect_expr(expr: Option<ExprId>, stream: &TokenStream) -> CompileResult<ExprId> {
  expr.ok_or_else(|| stream.error("Invalid expression"))
}

fn expect_scope(scope: Option<ScopeId>, stream: &TokenStream) -> CompileResult<ScopeId> {
  scope.ok_or_else(|| stream.error("Invalid scope"))
}

/// Lightweight cursor over the token vector.
struct TokenStream<'a> {
  tokens: Vec<Token>,
  source: &'a str,
  pos: usize,
}

impl<'a> TokenStream<'a> {
  /// Take ownership of the token stream; the parser advances `pos` as it
  /// consumes input.
  fn new(tokens: Vec<Token>, source: &'a str) -> Self {
    Self {
      tokens,
      source,
      pos: 0,
    }
  }

  fn peek(&self) -> Option<&Token> {
    self.tokens.get(self.pos)
  }

  fn peek_kind(&self) -> Option<TokenKind> {
    self.peek().map(|token| token.kind)
  }

  fn peek_kind_at(&self, offset: usize) -> Option<TokenKind> {
    self.tokens.get(self.pos + offset).map(|token| token.kind)
  }

  /// Advance past the current token without inspecting it.
  fn bump(&mut self) {
    self.pos += 1;
  }

  /// Consume the current token if it has the given kind, or fail with the
  /// `Expected '<kind>'` diagnostic at the current location.
  fn expect(&mut self, kind: TokenKind) -> CompileResult<Token> {
    if let Some(token) = self.peek()
      && token.kind == kind
    {
      let token = token.clone();
      self.pos += 1;
      return Ok(token);
    }
    Err(self.error(format!("Expected '{kind}'")))
  }

  fn current_loc(&self) -> usize {
    self
      .peek()
      .map(|token| token.loc)
      .unwrap_or(self.source.len())
  }

  fn error(&self, message: impl Into<String>) -> CompileError {
    CompileError::at(self.source, self.current_loc(), message)
  }

  fn is_empty(&self) -> bool {
    self.pos >= self.tokens.len()
  }
}
