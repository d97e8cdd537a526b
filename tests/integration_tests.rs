//! End-to-end pipeline tests: source text in, NASM assembly text out.
//!
//! Running the assembled program is the driver's concern; here the generated
//! text itself is the observable, so the exit-code scenarios assert on the
//! exact instruction sequences that produce those exit codes.

use slc::compile;

const PROLOGUE: &str = "global _start\n_start:\n";
const TRAILER: &str = "    mov rax, 60\n    mov rdi, 0\n    syscall\n";

fn exit_sequence(asm: &str) -> bool {
  asm.contains("    mov rax, 60\n    pop rdi\n    syscall\n")
}

#[test]
fn exit_zero() {
  let asm = compile("exit(0);").expect("compile");
  assert!(asm.starts_with(PROLOGUE));
  assert!(asm.ends_with(TRAILER));
  assert!(asm.contains("    mov rax, 0\n    push rax\n"));
  assert!(exit_sequence(&asm));
}

#[test]
fn exit_with_a_nonzero_literal() {
  let asm = compile("exit(7);").expect("compile");
  assert!(asm.contains("    mov rax, 7\n    push rax\n"));
  assert!(exit_sequence(&asm));
}

#[test]
fn precedence_drives_the_emitted_order() {
  // 2 + 3 * 4: the product is computed first, then added to 2
  let asm = compile("exit(2 + 3 * 4);").expect("compile");
  let mul = asm.find("    mul rbx\n").expect("multiply emitted");
  let add = asm.find("    add rax, rbx\n").expect("add emitted");
  assert!(mul < add);
}

#[test]
fn parentheses_flip_the_emitted_order() {
  // (2 + 3) * 4: the sum is computed first, then multiplied
  let asm = compile("exit((2 + 3) * 4);").expect("compile");
  let add = asm.find("    add rax, rbx\n").expect("add emitted");
  let mul = asm.find("    mul rbx\n").expect("multiply emitted");
  assert!(add < mul);
}

#[test]
fn variables_resolve_to_stack_slots() {
  let asm = compile("def x = 10; def y = 5; exit(x - y);").expect("compile");
  // y sits on top of the stack, x two slots below the two pushed reads
  assert!(asm.contains("    push QWORD [rsp + 0]\n    push QWORD [rsp + 16]\n"));
  assert!(asm.contains("    sub rax, rbx\n"));
}

#[test]
fn inner_scope_unwinds_and_outer_variable_survives() {
  let source = "def x = 2; { def y = 3; def z = x + y; } exit(x);";
  let asm = compile(source).expect("compile");
  // two inner variables are unwound in one rsp adjustment
  assert!(asm.contains("    add rsp, 16\n"));
  // after the unwind, x is back on top of the stack
  assert!(asm.contains("    add rsp, 16\n    push QWORD [rsp + 0]\n"));
}

#[test]
fn elif_and_else_lower_to_a_label_chain() {
  let source = "if (0) { exit(1); } elif (1) { exit(2); } else { exit(3); }";
  let asm = compile(source).expect("compile");
  assert!(asm.contains("    test rax, rax\n"));
  assert!(asm.contains("    jz label1\n"));
  assert!(asm.contains("    jmp label0\n"));
  assert!(asm.contains("label0:\n"));
  // both non-final branches jump to the shared end label
  assert_eq!(asm.matches("    jmp label0\n").count(), 2);
}

#[test]
fn whitespace_between_tokens_never_changes_the_output() {
  let compact = compile("def x=10;def y=5;exit(x-y);").expect("compile");
  let spaced = compile("def x = 10 ;\n def y = 5 ;\n exit ( x - y ) ;\n").expect("compile");
  assert_eq!(compact, spaced);
}

#[test]
fn compile_is_a_pure_function_of_the_source() {
  let source = "def a = 1; if (a) { exit(a + 41); } else { exit(0); }";
  assert_eq!(
    compile(source).expect("compile"),
    compile(source).expect("compile"),
  );
}

#[test]
fn missing_open_paren_is_a_parse_error() {
  let err = compile("exit 5;").expect_err("should fail");
  assert!(err.to_string().contains("Invalid statement"));
}

#[test]
fn missing_close_paren_is_a_parse_error() {
  let err = compile("exit(1").expect_err("should fail");
  assert!(err.to_string().contains("Expected ')'"));
}

#[test]
fn redeclaration_is_a_semantic_error() {
  let err = compile("def x = 1; def x = 2;").expect_err("should fail");
  assert_eq!(err.to_string(), "Identifier already used: x");
}

#[test]
fn undeclared_identifier_is_a_semantic_error() {
  let err = compile("exit(y);").expect_err("should fail");
  assert_eq!(err.to_string(), "Undeclared identifier: y");
}

#[test]
fn lexical_error_points_at_the_offending_character() {
  let err = compile("exit(1 $ 2);").expect_err("should fail");
  let rendered = err.to_string();
  assert!(rendered.contains("invalid token: '$'"));
  assert!(rendered.contains('^'));
}
