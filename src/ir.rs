//! The symbolic instruction stream emitted by the compiler and consumed by
//! the assembler — the textual intermediate form described by the on-disk
//! `.s4041` format.

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    None,
    Int(i64),
    Label(String),
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::None => Ok(()),
            Operand::Int(n) => write!(f, "{n}"),
            Operand::Label(l) => write!(f, "{l}"),
        }
    }
}

/// One symbolic instruction: a mnemonic with zero, one, or two operands.
/// `LABEL @Lxxxx` is a zero-cost placeholder the assembler resolves; it is
/// the only mnemonic whose first operand is a bare label definition rather
/// than a reference.
#[derive(Debug, Clone, PartialEq)]
pub struct SymLine {
    pub mnemonic: String,
    pub op1: Operand,
    pub op2: Operand,
}

impl SymLine {
    pub fn op0(mnemonic: &str) -> Self {
        Self { mnemonic: mnemonic.to_string(), op1: Operand::None, op2: Operand::None }
    }

    pub fn op1(mnemonic: &str, op1: Operand) -> Self {
        Self { mnemonic: mnemonic.to_string(), op1, op2: Operand::None }
    }

    pub fn op2(mnemonic: &str, op1: Operand, op2: Operand) -> Self {
        Self { mnemonic: mnemonic.to_string(), op1, op2 }
    }

    pub fn label_def(name: &str) -> Self {
        Self { mnemonic: "LABEL".into(), op1: Operand::Label(name.to_string()), op2: Operand::None }
    }

    pub fn push_label(name: &str) -> Self {
        Self::op1("PUSH", Operand::Label(name.to_string()))
    }

    pub fn push_int(n: i64) -> Self {
        Self::op1("PUSH", Operand::Int(n))
    }
}

impl fmt::Display for SymLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.mnemonic)?;
        if self.op1 != Operand::None {
            write!(f, " {}", self.op1)?;
        }
        if self.op2 != Operand::None {
            write!(f, " {}", self.op2)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseSymLineError(pub String);

impl fmt::Display for ParseSymLineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "malformed symbolic assembly line: {}", self.0)
    }
}

impl FromStr for SymLine {
    type Err = ParseSymLineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let mnemonic = parts.next().ok_or_else(|| ParseSymLineError(s.to_string()))?.to_string();
        let parse_operand = |text: &str| -> Operand {
            if let Ok(n) = text.parse::<i64>() {
                Operand::Int(n)
            } else {
                Operand::Label(text.to_string())
            }
        };
        let op1 = parts.next().map(parse_operand).unwrap_or(Operand::None);
        let op2 = parts.next().map(parse_operand).unwrap_or(Operand::None);
        Ok(SymLine { mnemonic, op1, op2 })
    }
}
