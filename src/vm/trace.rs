//! The tag-value wire protocol exchanged between the VM task and an
//! observer (the console animator, or any other front-end): one stream of
//! `LogEvent`s flowing VM → observer, one stream of `Command`s flowing
//! observer → VM.
//!
//! Adjacently-tagged JSON (`{"c": "...", "v": ...}`) mirrors the source
//! protocol's single-character tag directly, so a hand-written observer can
//! match on `c` without deserializing the payload first.

use serde::{Deserialize, Serialize};

/// A value crossing the wire. Kept as an explicit sum type rather than a
/// boxed `dyn Any` — integers are never silently reinterpreted as floats on
/// this side, but an observer speaking strict JSON may still round a large
/// `Int` through a float, so callers should not assume wire fidelity beyond
/// what `serde_json` gives them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
}

impl Value {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            Value::Float(f) => Some(*f as i64),
            Value::Bool(b) => Some(*b as i64),
            Value::Str(s) => s.parse().ok(),
        }
    }
}

/// VM → observer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "c", content = "v")]
pub enum LogEvent {
    /// Source program text, sent in response to a handshake `L`.
    #[serde(rename = "P")]
    Program(String),
    /// Variable attribute list (symbol table dump).
    #[serde(rename = "D")]
    Symbols(Vec<crate::symbols::Symbol>),
    /// Line-to-slot assignment-site mapping.
    #[serde(rename = "A")]
    Assignments(Vec<crate::symbols::AssignmentRecord>),
    /// Currently executing source line.
    #[serde(rename = "L")]
    Line(i64),
    /// A store happened with this new value, paired with the most recent `Line`.
    #[serde(rename = "V")]
    Stored(Value),
    /// Program output.
    #[serde(rename = "O")]
    Output(Value),
    /// Awaiting input.
    #[serde(rename = "I")]
    AwaitingInput,
    /// Step budget exhausted.
    #[serde(rename = "C")]
    BudgetExhausted,
    /// Runtime error description.
    #[serde(rename = "X")]
    RuntimeError(String),
    /// Normal termination.
    #[serde(rename = "E")]
    Done,
}

/// Observer → VM.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "c", content = "v")]
pub enum Command {
    /// First-time handshake: send me the source and symbol tables.
    #[serde(rename = "L")]
    Handshake,
    /// Here is the requested input.
    #[serde(rename = "I")]
    Input(String),
    /// Continue with another budget.
    #[serde(rename = "C")]
    Continue,
    /// Restart.
    #[serde(rename = "R")]
    Restart,
    /// Terminate.
    #[serde(rename = "X")]
    Terminate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_event_round_trips_through_json() {
        let event = LogEvent::Stored(Value::Int(42));
        let text = serde_json::to_string(&event).unwrap();
        let back: LogEvent = serde_json::from_str(&text).unwrap();
        assert_eq!(event, back);
    }

    #[test]
    fn command_tag_matches_protocol_letter() {
        let text = serde_json::to_string(&Command::Continue).unwrap();
        assert_eq!(text, r#"{"c":"C","v":null}"#);
    }

    #[test]
    fn value_as_int_handles_every_variant() {
        assert_eq!(Value::Int(3).as_int(), Some(3));
        assert_eq!(Value::Float(3.7).as_int(), Some(3));
        assert_eq!(Value::Bool(true).as_int(), Some(1));
        assert_eq!(Value::Str("9".into()).as_int(), Some(9));
    }
}
