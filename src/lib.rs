//! # DAP Toolchain
//!
//! A compiler, assembler, and stack-machine emulator for DAP, a bilingual
//! pseudocode language used to teach introductory programming.
//!
//! ## Pipeline
//!
//! 1. **Lexer** — source bytes to tokens, with comment/quote/assignment/
//!    keyword-spelling style checks.
//! 2. **Compiler** — tokens to symbolic assembly, with constant folding and
//!    a symbol table built along the way.
//! 3. **Assembler** — symbolic assembly to numeric bytecode, resolving
//!    forward-referenced labels in a single structural pass.
//! 4. **Virtual machine** — executes the bytecode, either to completion
//!    ([`vm::run_batch`]) or cooperatively under an external driver
//!    ([`vm::animator`]).
//!
//! ## Example
//!
//! ```rust,no_run
//! use dap_toolchain::{compiler::compile_source, assembler::assemble, vm::{Machine, run_batch}};
//!
//! let source = std::fs::read_to_string("program.dap").unwrap();
//! let unit = compile_source(&source).expect("compilation failed");
//! let assembled = assemble(&unit.lines);
//! let mut machine = Machine::new(assembled.bytecode);
//! run_batch(&mut machine, &mut std::io::stdin().lock(), &mut std::io::stdout()).unwrap();
//! ```

pub mod assembler;
pub mod compiler;
pub mod error;
pub mod ir;
pub mod lexer;
pub mod persistence;
pub mod symbols;
pub mod vm;
