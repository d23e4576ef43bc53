use super::*;
use crate::assembler::assemble;
use crate::compiler::compile_source;

fn build(src: &str) -> Vec<i64> {
    let unit = compile_source(src).unwrap();
    assemble(&unit.lines).bytecode
}

#[test]
fn claim_then_free_restores_stack_pointers() {
    let code = vec![21, 3, 11, 12, 255]; // PUSH 3; CLAIM; FREE; EXIT
    let mut m = Machine::new(code);
    let mut sink = Vec::new();
    let outcome = m.dispatch_common(1000, &mut |e| sink.push(e));
    assert_eq!(outcome, DispatchOutcome::Exited);
    assert_eq!(m.top, -1);
    assert_eq!(m.base, 0);
}

#[test]
fn claimed_slots_are_poisoned_and_marked_empty() {
    let code = vec![21, 2, 11]; // PUSH 2; CLAIM
    let mut m = Machine::new(code);
    m.dispatch_common(1000, &mut |_| {});
    assert!(m.empty[1]);
    assert!(m.empty[2]);
    assert!(m.stack[1] >= 2 && m.stack[1] <= 7921);
}

#[test]
fn store_clears_empty_flag() {
    // PUSH 2; CLAIM; PUSH 9; PUSH 1; STORE; EXIT
    let code = vec![21, 2, 11, 21, 9, 21, 1, 14, 255];
    let mut m = Machine::new(code);
    m.dispatch_common(1000, &mut |_| {});
    assert!(!m.empty[1]);
    assert_eq!(m.stack[1], 9);
}

#[test]
fn division_by_zero_is_runtime_error() {
    let code = vec![21, 7, 21, 0, 45]; // PUSH 7; PUSH 0; DIV
    let mut m = Machine::new(code);
    let mut errors = Vec::new();
    let outcome = m.dispatch_common(1000, &mut |e| {
        if let trace::LogEvent::RuntimeError(msg) = e {
            errors.push(msg);
        }
    });
    assert!(matches!(outcome, DispatchOutcome::RuntimeError(_)));
    assert_eq!(errors, vec!["Illegal division by zero".to_string()]);
}

#[test]
fn echo_scenario_batch() {
    let code = build("program E dictionary var x:int code input x output x endprogram");
    let mut m = Machine::new(code);
    let mut input = std::io::Cursor::new(b"42\n".to_vec());
    let mut output = Vec::new();
    run_batch(&mut m, &mut input, &mut output).unwrap();
    assert_eq!(String::from_utf8(output).unwrap().trim(), "42");
}

#[test]
fn loop_sum_scenario_batch() {
    let code = build(
        "program S dictionary var i,s:int code s<-0 i<-1 while i<=5 do s<-s+i i<-i+1 endwhile output s endprogram",
    );
    let mut m = Machine::new(code);
    let mut input = std::io::Cursor::new(Vec::new());
    let mut output = Vec::new();
    run_batch(&mut m, &mut input, &mut output).unwrap();
    assert_eq!(String::from_utf8(output).unwrap().trim(), "15");
}

#[test]
fn case_scenario_selects_matching_arm() {
    let code = build(
        "program C dictionary var n:int code input n case n of 1 : output 10 2 : output 20 otherwise output 99 endcase endprogram",
    );
    let mut m = Machine::new(code.clone());
    let mut input = std::io::Cursor::new(b"2\n".to_vec());
    let mut output = Vec::new();
    run_batch(&mut m, &mut input, &mut output).unwrap();
    assert_eq!(String::from_utf8(output).unwrap().trim(), "20");

    let mut m2 = Machine::new(code);
    let mut input2 = std::io::Cursor::new(b"5\n".to_vec());
    let mut output2 = Vec::new();
    run_batch(&mut m2, &mut input2, &mut output2).unwrap();
    assert_eq!(String::from_utf8(output2).unwrap().trim(), "99");
}

#[test]
fn uninitialized_read_logs_once_and_continues() {
    let code = build("program U dictionary var x:int code output x endprogram");
    let mut m = Machine::new(code);
    let mut input = std::io::Cursor::new(Vec::new());
    let mut output = Vec::new();
    run_batch(&mut m, &mut input, &mut output).unwrap();
    assert!(m.is_done());
}

#[test]
fn restart_resets_state_without_reallocating() {
    let code = vec![21, 1, 255];
    let mut m = Machine::new(code);
    m.dispatch_common(1000, &mut |_| {});
    assert!(m.is_done());
    m.restart();
    assert!(!m.is_done());
    assert_eq!(m.ip, 0);
    assert_eq!(m.top, -1);
}
