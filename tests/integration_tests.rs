//! End-to-end pipeline tests exercised through `dap_toolchain`'s public API,
//! one per literal scenario from the project's testable-properties section.

use std::io::Cursor;

use dap_toolchain::assembler::{assemble, disassemble};
use dap_toolchain::compiler::compile_source;
use dap_toolchain::persistence;
use dap_toolchain::vm::animator;
use dap_toolchain::vm::trace::{Command, LogEvent};
use dap_toolchain::vm::{run_batch, Machine};

fn pipeline(source: &str) -> Vec<i64> {
    let unit = compile_source(source).expect("compilation failed");
    assemble(&unit.lines).bytecode
}

fn run(source: &str, input: &str) -> String {
    let mut machine = Machine::new(pipeline(source));
    let mut input = Cursor::new(input.as_bytes().to_vec());
    let mut output = Vec::new();
    run_batch(&mut machine, &mut input, &mut output).unwrap();
    String::from_utf8(output).unwrap().trim().to_string()
}

#[test]
fn echo_scenario() {
    let src = "program E dictionary var x:int code input x output x endprogram";
    assert_eq!(run(src, "42\n"), "42");
}

#[test]
fn loop_sum_scenario() {
    let src = "program S dictionary var i,s:int code s<-0 i<-1 while i<=5 do s<-s+i i<-i+1 endwhile output s endprogram";
    assert_eq!(run(src, ""), "15");
}

#[test]
fn div_by_zero_scenario_animated() {
    let src = "program D dictionary var a,b:int code input a input b output a/b endprogram";
    let unit = compile_source(src).unwrap();
    let assembled = assemble(&unit.lines);
    let handle = animator::spawn(
        assembled.bytecode,
        src.to_string(),
        unit.symbols.into_vec(),
        unit.assignments,
        10_000,
    );

    handle.commands.send(Command::Handshake).unwrap();
    handle.log.recv().unwrap();
    handle.commands.send(Command::Restart).unwrap();
    handle.log.recv().unwrap(); // suspended awaiting `a`
    handle.commands.send(Command::Input("7".into())).unwrap();
    handle.log.recv().unwrap(); // suspended awaiting `b`
    handle.commands.send(Command::Input("0".into())).unwrap();
    let batch = handle.log.recv().unwrap();

    let errors: Vec<&String> = batch
        .iter()
        .filter_map(|e| match e {
            LogEvent::RuntimeError(msg) => Some(msg),
            _ => None,
        })
        .collect();
    assert_eq!(errors, vec!["Illegal division by zero"]);

    handle.commands.send(Command::Terminate).unwrap();
    handle.join.join().unwrap();
}

#[test]
fn uninit_read_scenario() {
    let src = "program U dictionary var x:int code output x endprogram";
    let unit = compile_source(src).unwrap();
    let assembled = assemble(&unit.lines);
    let handle = animator::spawn(
        assembled.bytecode,
        src.to_string(),
        unit.symbols.into_vec(),
        unit.assignments,
        10_000,
    );

    handle.commands.send(Command::Handshake).unwrap();
    handle.log.recv().unwrap();
    handle.commands.send(Command::Restart).unwrap();
    let batch = handle.log.recv().unwrap();

    let errors: Vec<&String> = batch
        .iter()
        .filter_map(|e| match e {
            LogEvent::RuntimeError(msg) => Some(msg),
            _ => None,
        })
        .collect();
    assert_eq!(errors, vec!["Illegal access to uninitialized variable"]);

    handle.commands.send(Command::Terminate).unwrap();
    handle.join.join().unwrap();
}

#[test]
fn case_scenario_both_arms() {
    let src = "program C dictionary var n:int code input n case n of 1 : output 10 2 : output 20 otherwise output 99 endcase endprogram";
    assert_eq!(run(src, "2\n"), "20");
    assert_eq!(run(src, "5\n"), "99");
}

#[test]
fn budget_scenario_suspends_then_resumes() {
    let src = "program S dictionary var i,s:int code s<-0 i<-1 while i<=5 do s<-s+i i<-i+1 endwhile output s endprogram";
    let unit = compile_source(src).unwrap();
    let assembled = assemble(&unit.lines);
    let handle = animator::spawn(assembled.bytecode, src.to_string(), unit.symbols.into_vec(), unit.assignments, 3);

    handle.commands.send(Command::Handshake).unwrap();
    handle.log.recv().unwrap();
    handle.commands.send(Command::Restart).unwrap();
    let first = handle.log.recv().unwrap();
    assert!(matches!(first.last(), Some(LogEvent::BudgetExhausted)));

    let mut output = None;
    let mut done = false;
    let mut cmd = Command::Continue;
    while !done {
        handle.commands.send(cmd.clone()).unwrap();
        let batch = handle.log.recv().unwrap();
        for event in &batch {
            match event {
                LogEvent::Output(v) => output = Some(v.clone()),
                LogEvent::Done => done = true,
                _ => {}
            }
        }
        cmd = Command::Continue;
    }
    assert_eq!(output, Some(dap_toolchain::vm::trace::Value::Int(15)));

    handle.commands.send(Command::Terminate).unwrap();
    handle.join.join().unwrap();
}

#[test]
fn symbolic_and_bytecode_persistence_round_trip() {
    let src = "program P dictionary var x:int code x<-2+3*4 output x endprogram";
    let unit = compile_source(src).unwrap();
    let direct = assemble(&unit.lines).bytecode;

    let dir = tempfile::tempdir().unwrap();
    let s4041 = dir.path().join("p.s4041");
    persistence::save_symbolic(&s4041, &unit.lines).unwrap();
    let reloaded_lines = persistence::load_symbolic(&s4041).unwrap();
    assert_eq!(assemble(&reloaded_lines).bytecode, direct);

    let i4041 = dir.path().join("p.i4041");
    persistence::save_bytecode(&i4041, &direct).unwrap();
    let reloaded_code = persistence::load_bytecode(&i4041).unwrap();
    assert_eq!(reloaded_code, direct);
}

#[test]
fn compile_assemble_disassemble_assemble_is_a_fixed_point() {
    let src = "program S dictionary var i,s:int code s<-0 i<-1 while i<=5 do s<-s+i i<-i+1 endwhile output s endprogram";
    let code = pipeline(src);
    let roundtrip = assemble(&disassemble(&code)).bytecode;
    assert_eq!(code, roundtrip);
}

#[test]
fn constant_folding_produces_pure_push_exit_form() {
    let src = "program F dictionary code output 2+3*4 endprogram";
    let code = pipeline(src);
    // No variables or I/O beyond the single OUTI: folding must leave exactly
    // one PUSH of the folded value ahead of the output/exit tail.
    assert!(code.windows(2).any(|w| w == [21, 14])); // PUSH 14
}
