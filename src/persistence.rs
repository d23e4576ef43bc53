//! Reading and writing the toolchain's four on-disk formats: `.dap` source,
//! `.s4041` symbolic assembly, `.i4041` numeric bytecode, and `.dapsym`
//! symbol-table dumps consumed by the animator when it starts from
//! precompiled bytecode rather than source.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ir::SymLine;
use crate::symbols::{AssignmentRecord, Symbol};

pub fn load_source(path: &Path) -> std::io::Result<String> {
    fs::read_to_string(path)
}

pub fn save_source(path: &Path, source: &str) -> std::io::Result<()> {
    fs::write(path, source)
}

/// `.s4041`: one symbolic instruction per line, via [`SymLine`]'s
/// `Display`/`FromStr`. A malformed line is skipped rather than aborting
/// the whole load — matching the compiler's count-and-continue posture —
/// but the caller can tell from a shorter-than-expected result.
pub fn save_symbolic(path: &Path, lines: &[SymLine]) -> std::io::Result<()> {
    let text: String = lines.iter().map(|l| format!("{l}\n")).collect();
    fs::write(path, text)
}

pub fn load_symbolic(path: &Path) -> std::io::Result<Vec<SymLine>> {
    let text = fs::read_to_string(path)?;
    Ok(text
        .lines()
        .filter(|l| !l.trim().is_empty())
        .filter_map(|l| l.parse::<SymLine>().ok())
        .collect())
}

/// `.i4041`: whitespace-separated integers, one token stream for the whole
/// file (not one instruction per line — widths vary by opcode).
pub fn save_bytecode(path: &Path, code: &[i64]) -> std::io::Result<()> {
    let text = code.iter().map(i64::to_string).collect::<Vec<_>>().join(" ");
    fs::write(path, text)
}

pub fn load_bytecode(path: &Path) -> std::io::Result<Vec<i64>> {
    let text = fs::read_to_string(path)?;
    Ok(text.split_whitespace().filter_map(|t| t.parse::<i64>().ok()).collect())
}

/// `.dapsym`: the `{ D, A }` pair an animator needs to label variables and
/// highlight assignment sites when it has no source to recompile from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolDump {
    pub symbols: Vec<Symbol>,
    pub assignments: Vec<AssignmentRecord>,
}

pub fn save_symbol_dump(path: &Path, dump: &SymbolDump) -> std::io::Result<()> {
    let text = serde_json::to_string_pretty(dump).map_err(to_io_error)?;
    fs::write(path, text)
}

pub fn load_symbol_dump(path: &Path) -> std::io::Result<SymbolDump> {
    let text = fs::read_to_string(path)?;
    serde_json::from_str(&text).map_err(to_io_error)
}

fn to_io_error(e: serde_json::Error) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::InvalidData, e)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::assemble;
    use crate::compiler::compile_source;
    use crate::ir::Operand;

    #[test]
    fn symbolic_round_trip_matches_direct_assembly() {
        let src = "program S dictionary var i,s:int code s<-0 i<-1 while i<=5 do s<-s+i i<-i+1 endwhile output s endprogram";
        let unit = compile_source(src).unwrap();
        let direct = assemble(&unit.lines).bytecode;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prog.s4041");
        save_symbolic(&path, &unit.lines).unwrap();
        let reloaded = load_symbolic(&path).unwrap();
        let via_disk = assemble(&reloaded).bytecode;

        assert_eq!(direct, via_disk);
    }

    #[test]
    fn bytecode_round_trip_is_identity() {
        let code = vec![21, 5, 21, -3, 42, 255];
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prog.i4041");
        save_bytecode(&path, &code).unwrap();
        let reloaded = load_bytecode(&path).unwrap();
        assert_eq!(code, reloaded);
    }

    #[test]
    fn symbol_dump_round_trips_through_json() {
        let dump = SymbolDump {
            symbols: vec![Symbol {
                parent: String::new(),
                name: "x".into(),
                kind: crate::symbols::DapType::Number,
                value: crate::symbols::SymbolValue::Uninitialized,
                location: 1,
                is_local: false,
            }],
            assignments: vec![AssignmentRecord { parent: String::new(), source_line: 3, slot: 1 }],
        };
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prog.dapsym");
        save_symbol_dump(&path, &dump).unwrap();
        let reloaded = load_symbol_dump(&path).unwrap();
        assert_eq!(reloaded.symbols, dump.symbols);
        assert_eq!(reloaded.assignments, dump.assignments);
    }

    #[test]
    fn blank_lines_are_skipped_when_loading_symbolic_assembly() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spaced.s4041");
        fs::write(&path, "ADD\n\nPOP\n").unwrap();
        let lines = load_symbolic(&path).unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].mnemonic, "ADD");
        assert_eq!(lines[0].op1, Operand::None);
    }
}
