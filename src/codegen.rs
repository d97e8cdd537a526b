//! Code generation: lower the parsed AST into NASM x86-64 assembly.
//!
//! The emitter is a stack machine: every expression leaves exactly one value
//! on the machine stack, operators pop their operands into `rax`/`rbx`, and
//! variables live in the stack slots their `def` initialiser pushed. All
//! stack traffic goes through `push`/`pop` so the logical depth counter
//! always matches the emitted instructions.

use crate::arena::{Arena, BinExprId, ExprId, IfPredId, ScopeId, StmtId, TermId};
use crate::ast::{BinExpr, BinOp, Expr, IfPred, Program, Scope, Stmt, Term};
use crate::error::{CompileError, CompileResult};

/// Emit assembly for a whole program, including the implicit `exit(0)`
/// trailer.
pub fn generate(program: &Program, arena: &Arena) -> CompileResult<String> {
  let mut generator = Generator::new(arena);
  generator.gen_program(program)?;
  Ok(generator.output)
}

/// A live variable: its name and the stack depth at the moment its slot was
/// pushed.
struct Var {
  name: String,
  stack_loc: usize,
}

struct Generator<'a> {
  arena: &'a Arena,
  output: String,
  stack_depth: usize,
  vars: Vec<Var>,
  scopes: Vec<usize>,
  label_count: usize,
}

impl<'a> Generator<'a> {
  fn new(arena: &'a Arena) -> Self {
    Self {
      arena,
      output: String::new(),
      stack_depth: 0,
      vars: Vec::new(),
      scopes: Vec::new(),
      label_count: 0,
    }
  }

  fn gen_program(&mut self, program: &Program) -> CompileResult<()> {
    self.output.push_str("global _start\n_start:\n");

    for &stmt in &program.stmts {
      self.gen_stmt(stmt)?;
    }

    self.output.push_str("    mov rax, 60\n");
    self.output.push_str("    mov rdi, 0\n");
    self.output.push_str("    syscall\n");
    Ok(())
  }

  fn gen_stmt(&mut self, id: StmtId) -> CompileResult<()> {
    let arena = self.arena;
    match arena.stmt(id) {
      Stmt::Exit { expr } => {
        self.gen_expr(*expr)?;
        self.output.push_str("    mov rax, 60\n");
        self.pop("rdi");
        self.output.push_str("    syscall\n");
      }
      Stmt::Def { ident, expr } => {
        let name = ident.text();
        if self.vars.iter().any(|var| var.name == name) {
          return Err(CompileError::message(format!(
            "Identifier already used: {name}"
          )));
        }
        self.vars.push(Var {
          name: name.to_string(),
          stack_loc: self.stack_depth,
        });
        // the initialiser pushes one value, filling the slot just registered
        self.gen_expr(*expr)?;
      }
      Stmt::Scope(scope) => self.gen_scope(*scope)?,
      Stmt::If { cond, body, pred } => self.gen_stmt_if(*cond, *body, *pred)?,
    }

    // each live variable occupies exactly one slot between statements
    debug_assert_eq!(self.stack_depth, self.vars.len());
    Ok(())
  }

  fn gen_stmt_if(
    &mut self,
    cond: ExprId,
    body: ScopeId,
    pred: Option<IfPredId>,
  ) -> CompileResult<()> {
    self.gen_expr(cond)?;
    self.pop("rax");
    let end_label = self.fresh_label();

    match pred {
      Some(pred) => {
        let next_label = self.fresh_label();
        self.output.push_str("    test rax, rax\n");
        self.output.push_str(&format!("    jz {next_label}\n"));
        self.gen_scope(body)?;
        self.output.push_str(&format!("    jmp {end_label}\n"));
        self.output.push_str(&format!("{next_label}:\n"));
        self.gen_if_pred(pred, &end_label)?;
      }
      None => {
        self.output.push_str("    test rax, rax\n");
        self.output.push_str(&format!("    jz {end_label}\n"));
        self.gen_scope(body)?;
      }
    }

    self.output.push_str(&format!("{end_label}:\n"));
    Ok(())
  }

  /// Lower one element of an elif/else chain. Every branch but the last
  /// jumps to the shared end label; the last one falls through to it.
  fn gen_if_pred(&mut self, id: IfPredId, end_label: &str) -> CompileResult<()> {
    let arena = self.arena;
    match arena.if_pred(id) {
      IfPred::Elif { cond, body, next } => {
        self.gen_expr(*cond)?;
        self.pop("rax");
        match next {
          Some(next) => {
            let next_label = self.fresh_label();
            self.output.push_str("    test rax, rax\n");
            self.output.push_str(&format!("    jz {next_label}\n"));
            self.gen_scope(*body)?;
            self.output.push_str(&format!("    jmp {end_label}\n"));
            self.output.push_str(&format!("{next_label}:\n"));
            self.gen_if_pred(*next, end_label)?;
          }
          None => {
            self.output.push_str("    test rax, rax\n");
            self.output.push_str(&format!("    jz {end_label}\n"));
            self.gen_scope(*body)?;
          }
        }
      }
      IfPred::Else { body } => self.gen_scope(*body)?,
    }
    Ok(())
  }

  fn gen_scope(&mut self, id: ScopeId) -> CompileResult<()> {
    self.begin_scope();
    let Scope { stmts } = self.arena.scope(id);
    for &stmt in stmts {
      self.gen_stmt(stmt)?;
    }
    self.end_scope();
    Ok(())
  }

  fn gen_expr(&mut self, id: ExprId) -> CompileResult<()> {
    match self.arena.expr(id) {
      Expr::Term(term) => self.gen_term(*term),
      Expr::Bin(bin_expr) => self.gen_bin_expr(*bin_expr),
    }
  }

  /// Binary operands are evaluated right to left so that the two pops land
  /// the *left* operand in `rax` – this matters for `sub` and `div`.
  fn gen_bin_expr(&mut self, id: BinExprId) -> CompileResult<()> {
    let BinExpr { op, lhs, rhs } = *self.arena.bin_expr(id);
    self.gen_expr(rhs)?;
    self.gen_expr(lhs)?;
    self.pop("rax");
    self.pop("rbx");
    match op {
      BinOp::Add => self.output.push_str("    add rax, rbx\n"),
      BinOp::Sub => self.output.push_str("    sub rax, rbx\n"),
      BinOp::Mul => self.output.push_str("    mul rbx\n"),
      BinOp::Div => {
        // rdx is the high half of the dividend; clear it so the divide
        // is a plain 64-bit unsigned rax / rbx
        self.output.push_str("    xor rdx, rdx\n");
        self.output.push_str("    div rbx\n");
      }
    }
    self.push("rax");
    Ok(())
  }

  fn gen_term(&mut self, id: TermId) -> CompileResult<()> {
    let arena = self.arena;
    match arena.term(id) {
      Term::IntLit(token) => {
        self.output.push_str(&format!("    mov rax, {}\n", token.text()));
        self.push("rax");
      }
      Term::Ident(token) => {
        let name = token.text();
        let Some(stack_loc) = self
          .vars
          .iter()
          .find(|var| var.name == name)
          .map(|var| var.stack_loc)
        else {
          return Err(CompileError::message(format!(
            "Undeclared identifier: {name}"
          )));
        };
        let offset = (self.stack_depth - stack_loc - 1) * 8;
        self.push(&format!("QWORD [rsp + {offset}]"));
      }
      Term::Paren(expr) => self.gen_expr(*expr)?,
    }
    Ok(())
  }

  // ----- Accounting primitives -----

  fn push(&mut self, operand: &str) {
    self.output.push_str(&format!("    push {operand}\n"));
    self.stack_depth += 1;
  }

  fn pop(&mut self, operand: &str) {
    self.output.push_str(&format!("    pop {operand}\n"));
    self.stack_depth -= 1;
  }

  fn begin_scope(&mut self) {
    self.scopes.push(self.vars.len());
  }

  /// Unwind every variable declared since the matching `begin_scope`: move
  /// `rsp` past their slots, drop them from the table and lower the depth
  /// counter accordingly.
  fn end_scope(&mut self) {
    let Some(boundary) = self.scopes.pop() else {
      return;
    };
    let pop_count = self.vars.len() - boundary;
    self.output.push_str(&format!("    add rsp, {}\n", pop_count * 8));
    self.stack_depth -= pop_count;
    self.vars.truncate(boundary);
  }

  fn fresh_label(&mut self) -> String {
    let label = format!("label{}", self.label_count);
    self.label_count += 1;
    label
  }
}
