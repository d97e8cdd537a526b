//! Tagged-variant AST node definitions.
//!
//! Nodes never own their children directly: every child link is a typed id
//! into the compilation's [`Arena`](crate::arena::Arena), so the tree is a
//! DAG rooted at [`Program`] and freed wholesale when the arena drops.
//! Pattern matching on these enums replaces the visitor dispatch a
//! pointer-based design would need.

use crate::arena::{BinExprId, ExprId, IfPredId, ScopeId, StmtId, TermId};
use crate::tokenizer::Token;

/// A leaf of the expression grammar: integer literal, identifier, or a
/// parenthesised sub-expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Term {
  IntLit(Token),
  Ident(Token),
  Paren(ExprId),
}

/// Binary operators recognised by the language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
  Add,
  Sub,
  Mul,
  Div,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinExpr {
  pub op: BinOp,
  pub lhs: ExprId,
  pub rhs: ExprId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expr {
  Term(TermId),
  Bin(BinExprId),
}

/// A braced statement list. Scope entry and exit drive the generator's
/// variable-table boundaries.
#[derive(Debug, Clone, PartialEq)]
pub struct Scope {
  pub stmts: Vec<StmtId>,
}

/// The optional tail of an if-chain: either an `elif` with its own condition,
/// body and recursive tail, or a final `else`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IfPred {
  Elif {
    cond: ExprId,
    body: ScopeId,
    next: Option<IfPredId>,
  },
  Else {
    body: ScopeId,
  },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
  Exit {
    expr: ExprId,
  },
  /// Variable declaration with initialiser. The ident token always has kind
  /// `Ident` and a non-empty lexeme.
  Def {
    ident: Token,
    expr: ExprId,
  },
  Scope(ScopeId),
  If {
    cond: ExprId,
    body: ScopeId,
    pred: Option<IfPredId>,
  },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Program {
  pub stmts: Vec<StmtId>,
}
