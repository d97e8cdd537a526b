//! Bulk owner of every AST node produced during one compilation.
//!
//! The arena hands out a fixed byte budget (4 MiB by default) across one pool
//! per node type. Allocation is append-only and charges the node's size
//! against the shared budget; there is no individual free – the whole arena
//! drops at once after code generation. Ids are plain `u32` indices, so a
//! handle stays valid for the arena's entire lifetime.

use crate::ast::{BinExpr, Expr, IfPred, Scope, Stmt, Term};
use crate::error::{CompileError, CompileResult};
use std::mem;

/// Default budget for a single compilation.
pub const DEFAULT_CAPACITY_BYTES: usize = 4 * 1024 * 1024;

macro_rules! node_id {
  ($name:ident) => {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct $name(u32);
  };
}

node_id!(TermId);
node_id!(BinExprId);
node_id!(ExprId);
node_id!(StmtId);
node_id!(ScopeId);
node_id!(IfPredId);

/// Arena with exclusive ownership of all nodes reachable from a [`Program`].
/// Deliberately not `Clone`.
pub struct Arena {
  remaining: usize,
  terms: Vec<Term>,
  bin_exprs: Vec<BinExpr>,
  exprs: Vec<Expr>,
  stmts: Vec<Stmt>,
  scopes: Vec<Scope>,
  if_preds: Vec<IfPred>,
}

impl Arena {
  pub fn new() -> Self {
    Self::with_capacity(DEFAULT_CAPACITY_BYTES)
  }

  pub fn with_capacity(bytes: usize) -> Self {
    Self {
      remaining: bytes,
      terms: Vec::new(),
      bin_exprs: Vec::new(),
      exprs: Vec::new(),
      stmts: Vec::new(),
      scopes: Vec::new(),
      if_preds: Vec::new(),
    }
  }

  fn charge(&mut self, bytes: usize) -> CompileResult<()> {
    if bytes > self.remaining {
      return Err(CompileError::ArenaExhausted);
    }
    self.remaining -= bytes;
    Ok(())
  }

  pub fn alloc_term(&mut self, term: Term) -> CompileResult<TermId> {
    self.charge(mem::size_of::<Term>())?;
    let id = TermId(self.terms.len() as u32);
    self.terms.push(term);
    Ok(id)
  }

  pub fn alloc_bin_expr(&mut self, bin_expr: BinExpr) -> CompileResult<BinExprId> {
    self.charge(mem::size_of::<BinExpr>())?;
    let id = BinExprId(self.bin_exprs.len() as u32);
    self.bin_exprs.push(bin_expr);
    Ok(id)
  }

  pub fn alloc_expr(&mut self, expr: Expr) -> CompileResult<ExprId> {
    self.charge(mem::size_of::<Expr>())?;
    let id = ExprId(self.exprs.len() as u32);
    self.exprs.push(expr);
    Ok(id)
  }

  pub fn alloc_stmt(&mut self, stmt: Stmt) -> CompileResult<StmtId> {
    self.charge(mem::size_of::<Stmt>())?;
    let id = StmtId(self.stmts.len() as u32);
    self.stmts.push(stmt);
    Ok(id)
  }

  pub fn alloc_scope(&mut self, scope: Scope) -> CompileResult<ScopeId> {
    self.charge(mem::size_of::<Scope>())?;
    let id = ScopeId(self.scopes.len() as u32);
    self.scopes.push(scope);
    Ok(id)
  }

  pub fn alloc_if_pred(&mut self, if_pred: IfPred) -> CompileResult<IfPredId> {
    self.charge(mem::size_of::<IfPred>())?;
    let id = IfPredId(self.if_preds.len() as u32);
    self.if_preds.push(if_pred);
    Ok(id)
  }

  pub fn term(&self, id: TermId) -> &Term {
    &self.terms[id.0 as usize]
  }

  pub fn bin_expr(&self, id: BinExprId) -> &BinExpr {
    &self.bin_exprs[id.0 as usize]
  }

  pub fn expr(&self, id: ExprId) -> &Expr {
    &self.exprs[id.0 as usize]
  }

  pub fn stmt(&self, id: StmtId) -> &Stmt {
    &self.stmts[id.0 as usize]
  }

  pub fn scope(&self, id: ScopeId) -> &Scope {
    &self.scopes[id.0 as usize]
  }

  pub fn if_pred(&self, id: IfPredId) -> &IfPred {
    &self.if_preds[id.0 as usize]
  }
}

impl Default for Arena {
  fn default() -> Self {
    Self::new()
  }
}
