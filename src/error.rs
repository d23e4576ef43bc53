//! Shared error and diagnostic types used by the lexer, compiler, and
//! assembler. A `Diagnostic` is either a recoverable style/semantic complaint
//! (counted, execution continues) or a fatal compile error; I/O failures on
//! the source file are a separate, always-fatal variant of `CompileError`.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub line: usize,
    pub col: usize,
}

impl Span {
    pub fn start() -> Self {
        Self { line: 1, col: 1 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagnosticKind,
    pub message: String,
    pub span: Span,
}

impl Diagnostic {
    pub fn warning(kind: DiagnosticKind, message: impl Into<String>, span: Span) -> Self {
        Self { severity: Severity::Warning, kind, message: message.into(), span }
    }

    pub fn error(kind: DiagnosticKind, message: impl Into<String>, span: Span) -> Self {
        Self { severity: Severity::Error, kind, message: message.into(), span }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tag = match self.severity {
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
        };
        write!(f, "{} (line {}:{}): {}", tag, self.span.line, self.span.col, self.message)
    }
}

/// Recoverable-diagnostic classification. Not exhaustive of every message —
/// only of the kinds callers (tests, CLI exit-code mapping) need to match on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    MixedCommentStyle,
    MixedQuoteStyle,
    MixedAssignmentStyle,
    InconsistentKeywordSpelling,
    BadIndentation,

    UnexpectedToken,
    ExpectedToken,
    UndeclaredName,
    DuplicateDeclaration,
    TypeMismatch,
    IllegalOperation,
    ConstantDivisionByZero,
}

/// Top-level failure of the lexer→compiler pipeline, returned by
/// [`crate::compiler::compile_source`].
#[derive(Debug)]
pub enum CompileError {
    Io(std::io::Error),
    Diagnostics(Vec<Diagnostic>),
}

impl std::fmt::Display for CompileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompileError::Io(e) => write!(f, "I/O error reading source: {e}"),
            CompileError::Diagnostics(ds) => {
                writeln!(f, "compilation failed with {} error(s):", ds.iter().filter(|d| d.is_error()).count())?;
                for d in ds {
                    writeln!(f, "  {d}")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for CompileError {}

impl From<std::io::Error> for CompileError {
    fn from(e: std::io::Error) -> Self {
        CompileError::Io(e)
    }
}
