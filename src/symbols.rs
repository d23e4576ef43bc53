//! Symbol table and variable-attribute records shared by the compiler (which
//! builds them) and the animator (which displays them via the `D`/`A` trace
//! events).
//!
//! Backed by a `Vec` rather than a `HashMap`, like the teaching tool's
//! symbolic assembler symbol table: a DAP program's symbol count is small
//! (well under a hundred) and insertion order must be preserved for the
//! `.dapsym` dump the animator reads.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DapType {
    Number,
    Bool,
    CharArray,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConstValue {
    Number(i64),
    Bool(bool),
    CharArray(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SymbolValue {
    Const(ConstValue),
    Uninitialized,
}

/// `{ parent, name, type, value, location }` from the language's variable
/// attribute record: `parent` is the enclosing scope name (empty = global),
/// `location` is the 1-based stack slot assigned in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Symbol {
    pub parent: String,
    pub name: String,
    pub kind: DapType,
    pub value: SymbolValue,
    pub location: usize,
    /// True when declared under the `local`/`lokal` heading — addressed
    /// relative to the current frame base (`LCOPY`/`LSTOR`) rather than
    /// absolutely (`COPY`/`STORE`). Since this language has no function
    /// calls, the single program frame never moves `base`, so the two
    /// addressing modes are numerically equivalent here; the distinction is
    /// preserved because the bytecode format and the opcode table expose it.
    pub is_local: bool,
}

pub fn symbol_key(parent: &str, name: &str) -> String {
    format!("{parent}:{name}")
}

/// One write site, used by the animator to highlight which slot changed on
/// a given source line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentRecord {
    pub parent: String,
    pub source_line: usize,
    pub slot: usize,
}

#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    entries: Vec<(String, Symbol)>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Inserts a new symbol. Returns `false` without modifying the table if
    /// the `parent:name` key already exists — re-declaration is a compile
    /// error the caller must report.
    pub fn declare(&mut self, symbol: Symbol) -> bool {
        let key = symbol_key(&symbol.parent, &symbol.name);
        if self.entries.iter().any(|(k, _)| k == &key) {
            return false;
        }
        self.entries.push((key, symbol));
        true
    }

    pub fn get(&self, parent: &str, name: &str) -> Option<&Symbol> {
        let key = symbol_key(parent, name);
        self.entries.iter().find(|(k, _)| k == &key).map(|(_, s)| s)
    }

    /// Fills in a folded constant value for a symbol already declared.
    /// Used by the compiler once an initializer expression is evaluated.
    pub fn set_value(&mut self, parent: &str, name: &str, value: SymbolValue) {
        let key = symbol_key(parent, name);
        if let Some((_, sym)) = self.entries.iter_mut().find(|(k, _)| k == &key) {
            sym.value = value;
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.entries.iter().map(|(_, s)| s)
    }

    pub fn into_vec(self) -> Vec<Symbol> {
        self.entries.into_iter().map(|(_, s)| s).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sym(parent: &str, name: &str, loc: usize) -> Symbol {
        Symbol {
            parent: parent.into(),
            name: name.into(),
            kind: DapType::Number,
            value: SymbolValue::Uninitialized,
            location: loc,
            is_local: false,
        }
    }

    #[test]
    fn declare_and_get() {
        let mut t = SymbolTable::new();
        assert!(t.declare(sym("", "x", 1)));
        assert_eq!(t.get("", "x").unwrap().location, 1);
    }

    #[test]
    fn redeclaration_rejected() {
        let mut t = SymbolTable::new();
        assert!(t.declare(sym("", "x", 1)));
        assert!(!t.declare(sym("", "x", 2)));
    }

    #[test]
    fn scoped_names_are_distinct() {
        let mut t = SymbolTable::new();
        assert!(t.declare(sym("", "x", 1)));
        assert!(t.declare(sym("f", "x", 1)));
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn insertion_order_preserved() {
        let mut t = SymbolTable::new();
        t.declare(sym("", "b", 1));
        t.declare(sym("", "a", 2));
        let names: Vec<_> = t.iter().map(|s| s.name.clone()).collect();
        assert_eq!(names, vec!["b", "a"]);
    }
}
