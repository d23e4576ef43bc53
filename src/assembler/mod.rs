//! One-pass symbolic-to-numeric assembler.
//!
//! Walks the compiler's symbolic instruction stream once, resolving `LABEL`
//! definitions as it goes and patching `PUSH @label` sites after the walk —
//! the label table is only ever fully known at the end, so every reference
//! to a label not yet defined becomes a patch site recorded for the second,
//! much shorter pass over just the placeholders.

#[cfg(test)]
mod tests;

use std::collections::HashMap;

use crate::ir::{Operand, SymLine};

/// `n = 3` for `LINE`/`LVAR`, `2` for `GVAR`/`PUSH`, `1` for every other
/// mnemonic. `LABEL` and `CMT` are special-cased by the caller.
fn emitted_width(mnemonic: &str) -> usize {
    match mnemonic {
        "LINE" | "LVAR" => 3,
        "GVAR" | "PUSH" => 2,
        _ => 1,
    }
}

pub struct AssembleResult {
    pub bytecode: Vec<i64>,
    /// Label names referenced by a `PUSH @label` that were never defined.
    /// Per the bug preserved from the teaching tool's original assembler,
    /// these resolve to a literal `0` in the bytecode rather than aborting —
    /// surfaced here so a caller that wants the stricter behavior can check.
    pub unresolved: Vec<String>,
}

pub fn assemble(lines: &[SymLine]) -> AssembleResult {
    let mut code: Vec<i64> = Vec::new();
    let mut labels: HashMap<String, usize> = HashMap::new();
    let mut patches: Vec<(String, usize)> = Vec::new();

    for line in lines {
        let mnemonic = if line.mnemonic == "CMT" { "NOP" } else { line.mnemonic.as_str() };

        if line.mnemonic == "LABEL" {
            if let Operand::Label(name) = &line.op1 {
                labels.insert(name.clone(), code.len());
            }
            continue;
        }

        code.push(opcode_value(mnemonic));

        match &line.op1 {
            Operand::Int(n) => code.push(*n),
            Operand::Label(name) => {
                patches.push((name.clone(), code.len()));
                code.push(0);
            }
            Operand::None => {}
        }
        match &line.op2 {
            Operand::Int(n) => code.push(*n),
            Operand::Label(name) => {
                patches.push((name.clone(), code.len()));
                code.push(0);
            }
            Operand::None => {}
        }

        debug_assert_eq!(
            1 + operand_count(line),
            emitted_width_for(line),
            "emitted width mismatch for {mnemonic}"
        );
    }

    let mut unresolved = Vec::new();
    for (name, site) in patches {
        match labels.get(&name) {
            Some(target) => code[site] = *target as i64,
            None => unresolved.push(name),
        }
    }

    AssembleResult { bytecode: code, unresolved }
}

fn operand_count(line: &SymLine) -> usize {
    (line.op1 != Operand::None) as usize + (line.op2 != Operand::None) as usize
}

fn emitted_width_for(line: &SymLine) -> usize {
    emitted_width(&line.mnemonic)
}

/// The fixed numeric opcode table; must never change once a `.i4041` file
/// exists depending on it.
fn opcode_value(mnemonic: &str) -> i64 {
    match mnemonic {
        "NOP" => 0,
        "CMT" => 1,
        "LINE" => 2,
        "GVAR" => 3,
        "LVAR" => 4,
        "CLAIM" => 11,
        "FREE" => 12,
        "COPY" => 13,
        "STORE" => 14,
        "LCOPY" => 15,
        "LSTOR" => 16,
        "PUSH" => 21,
        "POP" => 22,
        "SWAP" => 23,
        "DUP" => 24,
        "NEG" => 41,
        "ADD" => 42,
        "SUB" => 43,
        "MUL" => 44,
        "DIV" => 45,
        "MOD" => 46,
        "NOT" => 51,
        "OR" => 52,
        "AND" => 53,
        "LT" => 61,
        "LEQ" => 62,
        "GT" => 63,
        "GEQ" => 64,
        "EQ" => 65,
        "NEQ" => 66,
        "INPI" => 71,
        "INPC" => 72,
        "INPB" => 73,
        "OUTI" => 81,
        "OUTC" => 82,
        "OUTB" => 83,
        "SAVEIP" => 201,
        "COND" => 202,
        "NCOND" => 203,
        "CALL" => 204,
        "GOTO" => 205,
        "EXIT" => 255,
        other => panic!("unknown mnemonic '{other}' reached the assembler"),
    }
}

/// Reconstructs a symbolic instruction stream from already-resolved numeric
/// bytecode. Labels are gone by this point — every `PUSH @label` site was
/// patched to the literal address during assembly — so a `GOTO` target that
/// began life as a label comes back as `PUSH <address>`, not a label
/// reference. That's fine for the one property this exists to support:
/// `assemble(disassemble(code)) == code`, not source-level fidelity.
pub fn disassemble(code: &[i64]) -> Vec<SymLine> {
    let mut lines = Vec::new();
    let mut ip = 0;
    while ip < code.len() {
        let opcode = code[ip];
        let mnemonic = mnemonic_for(opcode).unwrap_or("NOP");
        let width = emitted_width(mnemonic);
        let line = match width {
            2 => SymLine::op1(mnemonic, Operand::Int(code[ip + 1])),
            3 => SymLine::op2(mnemonic, Operand::Int(code[ip + 1]), Operand::Int(code[ip + 2])),
            _ => SymLine::op0(mnemonic),
        };
        lines.push(line);
        ip += width;
    }
    lines
}

/// Mnemonic for a raw opcode value, used by [`disassemble`] and by
/// `persistence` when regenerating `.s4041` from `.i4041`.
pub fn mnemonic_for(opcode: i64) -> Option<&'static str> {
    Some(match opcode {
        0 => "NOP",
        1 => "CMT",
        2 => "LINE",
        3 => "GVAR",
        4 => "LVAR",
        11 => "CLAIM",
        12 => "FREE",
        13 => "COPY",
        14 => "STORE",
        15 => "LCOPY",
        16 => "LSTOR",
        21 => "PUSH",
        22 => "POP",
        23 => "SWAP",
        24 => "DUP",
        41 => "NEG",
        42 => "ADD",
        43 => "SUB",
        44 => "MUL",
        45 => "DIV",
        46 => "MOD",
        51 => "NOT",
        52 => "OR",
        53 => "AND",
        61 => "LT",
        62 => "LEQ",
        63 => "GT",
        64 => "GEQ",
        65 => "EQ",
        66 => "NEQ",
        71 => "INPI",
        72 => "INPC",
        73 => "INPB",
        81 => "OUTI",
        82 => "OUTC",
        83 => "OUTB",
        201 => "SAVEIP",
        202 => "COND",
        203 => "NCOND",
        204 => "CALL",
        205 => "GOTO",
        255 => "EXIT",
        _ => return None,
    })
}
