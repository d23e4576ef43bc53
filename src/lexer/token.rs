//! # Token Types
//!
//! Defines every lexical token the DAP lexer can produce.

use crate::error::Span;

/// A single lexical token.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    /// True if this is the first token on its source line (used by the
    /// compiler's block-indentation discipline).
    pub first_on_line: bool,
    /// Column (tab-expanded) of this token when `first_on_line` is set;
    /// meaningless otherwise.
    pub indent: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // === Structure keywords ===
    Program,
    Dict,
    Code,
    Endprog,
    Var,
    Const,
    Global,
    Local,

    // === Types ===
    TypeInt,
    TypeReal,
    TypeChar,
    TypeBool,

    // === Statement keywords ===
    Input,
    Output,
    While,
    Do,
    Endwhile,
    Repeat,
    Until,
    If,
    Then,
    Elif,
    Else,
    Endif,
    Case,
    Of,
    Default,
    Endcase,

    // === Operators (word-form) ===
    And,
    Or,
    Not,
    True,
    False,

    // === Literals & identifiers ===
    Name(String),
    Number(String),
    CharArray(String),

    // === Punctuation / symbolic operators ===
    Colon,
    Comma,
    LeftPar,
    RightPar,
    Plus,
    Minus,
    Mult,
    Div,
    Mod,
    Lt,
    Leq,
    Gt,
    Geq,
    Eq,
    Neq,
    /// `<-` or `:=`
    Assign,
    /// `=` — legal only in `const` initializers.
    MEq,

    Eof,
}

/// The four comment-delimiter styles DAP source may use. Mixing styles
/// within one file is a recoverable lexical warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentStyle {
    Brace,
    SlashSlash,
    ParenStar,
    SlashStar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteStyle {
    Double,
    Single,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignStyle {
    Arrow,
    ColonEq,
}

/// One entry of the bilingual keyword table: a symbolic kind plus every
/// spelling (English/Indonesian) that maps to it. Kept as a flat table
/// rather than two separate maps so the lexer can report "which spelling
/// of this kind did we see first" for the keyword-consistency check.
pub const KEYWORD_TABLE: &[(&str, TokenKind)] = &[
    ("program", TokenKind::Program),
    ("dictionary", TokenKind::Dict),
    ("kamus", TokenKind::Dict),
    ("code", TokenKind::Code),
    ("algoritma", TokenKind::Code),
    ("endprogram", TokenKind::Endprog),
    ("var", TokenKind::Var),
    ("variable", TokenKind::Var),
    ("variabel", TokenKind::Var),
    ("const", TokenKind::Const),
    ("global", TokenKind::Global),
    ("local", TokenKind::Local),
    ("integer", TokenKind::TypeInt),
    ("int", TokenKind::TypeInt),
    ("real", TokenKind::TypeReal),
    ("float", TokenKind::TypeReal),
    ("character", TokenKind::TypeChar),
    ("char", TokenKind::TypeChar),
    ("boolean", TokenKind::TypeBool),
    ("bool", TokenKind::TypeBool),
    ("logical", TokenKind::TypeBool),
    ("input", TokenKind::Input),
    ("output", TokenKind::Output),
    ("tulis", TokenKind::Output),
    ("while", TokenKind::While),
    ("selama", TokenKind::While),
    ("do", TokenKind::Do),
    ("endwhile", TokenKind::Endwhile),
    ("repeat", TokenKind::Repeat),
    ("until", TokenKind::Until),
    ("if", TokenKind::If),
    ("then", TokenKind::Then),
    ("elif", TokenKind::Elif),
    ("else", TokenKind::Else),
    ("endif", TokenKind::Endif),
    ("mod", TokenKind::Mod),
    ("case", TokenKind::Case),
    ("of", TokenKind::Of),
    ("default", TokenKind::Default),
    ("otherwise", TokenKind::Default),
    ("endcase", TokenKind::Endcase),
    ("and", TokenKind::And),
    ("dan", TokenKind::And),
    ("or", TokenKind::Or),
    ("atau", TokenKind::Or),
    ("not", TokenKind::Not),
    ("tidak", TokenKind::Not),
    ("true", TokenKind::True),
    ("benar", TokenKind::True),
    ("false", TokenKind::False),
    ("salah", TokenKind::False),
];

/// The symbolic kind a keyword spelling maps to, grouped for the
/// spelling-consistency check — two different spellings of the same group
/// seen in one file triggers a recoverable warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeywordGroup {
    Dict,
    Code,
    Var,
    TypeInt,
    TypeReal,
    TypeChar,
    TypeBool,
    Output,
    While,
    Default,
    And,
    Or,
    Not,
    True,
    False,
}

pub fn keyword_group(kind: &TokenKind) -> Option<KeywordGroup> {
    match kind {
        TokenKind::Dict => Some(KeywordGroup::Dict),
        TokenKind::Code => Some(KeywordGroup::Code),
        TokenKind::Var => Some(KeywordGroup::Var),
        TokenKind::TypeInt => Some(KeywordGroup::TypeInt),
        TokenKind::TypeReal => Some(KeywordGroup::TypeReal),
        TokenKind::TypeChar => Some(KeywordGroup::TypeChar),
        TokenKind::TypeBool => Some(KeywordGroup::TypeBool),
        TokenKind::Output => Some(KeywordGroup::Output),
        TokenKind::While => Some(KeywordGroup::While),
        TokenKind::Default => Some(KeywordGroup::Default),
        TokenKind::And => Some(KeywordGroup::And),
        TokenKind::Or => Some(KeywordGroup::Or),
        TokenKind::Not => Some(KeywordGroup::Not),
        TokenKind::True => Some(KeywordGroup::True),
        TokenKind::False => Some(KeywordGroup::False),
        _ => None,
    }
}

pub fn lookup_keyword(word: &str) -> Option<TokenKind> {
    let lower = word.to_ascii_lowercase();
    KEYWORD_TABLE
        .iter()
        .find(|(spelling, _)| *spelling == lower)
        .map(|(_, kind)| kind.clone())
}
