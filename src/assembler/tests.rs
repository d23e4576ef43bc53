use super::*;
use crate::ir::SymLine;

#[test]
fn simple_push_add_exit() {
    let lines = vec![SymLine::push_int(2), SymLine::push_int(3), SymLine::op0("ADD"), SymLine::op0("EXIT")];
    let result = assemble(&lines);
    assert_eq!(result.bytecode, vec![21, 2, 21, 3, 42, 255]);
    assert!(result.unresolved.is_empty());
}

#[test]
fn label_resolves_to_ip_at_definition() {
    let lines = vec![
        SymLine::push_label("L1001"),
        SymLine::op0("GOTO"),
        SymLine::label_def("L1001"),
        SymLine::op0("EXIT"),
    ];
    let result = assemble(&lines);
    // PUSH(2) GOTO(1) = ip 3 at LABEL, then EXIT
    assert_eq!(result.bytecode, vec![21, 3, 205, 255]);
}

#[test]
fn unresolved_label_becomes_zero_and_is_reported() {
    let lines = vec![SymLine::push_label("Lghost"), SymLine::op0("GOTO")];
    let result = assemble(&lines);
    assert_eq!(result.bytecode, vec![21, 0, 205]);
    assert_eq!(result.unresolved, vec!["Lghost".to_string()]);
}

#[test]
fn cmt_assembles_to_nop() {
    let lines = vec![SymLine::op0("CMT")];
    let result = assemble(&lines);
    assert_eq!(result.bytecode, vec![0]);
}

#[test]
fn line_emits_three_ints() {
    let lines = vec![SymLine::op2("LINE", crate::ir::Operand::Int(5), crate::ir::Operand::Int(1))];
    let result = assemble(&lines);
    assert_eq!(result.bytecode, vec![2, 5, 1]);
}

#[test]
fn zero_operand_mnemonics_emit_one_word() {
    let lines = vec![SymLine::op0("ADD"), SymLine::op0("POP"), SymLine::op0("EXIT")];
    let result = assemble(&lines);
    assert_eq!(result.bytecode, vec![42, 22, 255]);
}

#[test]
fn disassemble_then_reassemble_is_a_fixed_point() {
    let lines = vec![
        SymLine::push_label("L1001"),
        SymLine::op0("GOTO"),
        SymLine::label_def("L1001"),
        SymLine::push_int(7),
        SymLine::op0("EXIT"),
    ];
    let code = assemble(&lines).bytecode;
    let roundtrip = assemble(&disassemble(&code)).bytecode;
    assert_eq!(code, roundtrip);
}
