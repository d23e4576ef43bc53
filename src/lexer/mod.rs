//! # DAP Lexer
//!
//! Tokenizes DAP pseudocode source into a stream of tokens, while performing
//! the style-consistency checks the language's teaching materials rely on:
//! a file may use any of four comment styles, two quote styles, and (for
//! plain assignment) two arrow styles, and any of several bilingual keyword
//! spellings — but mixing styles *within one file* is a recoverable warning,
//! not a hard error, so a student's program still runs while the tool nudges
//! them toward consistency.
//!
//! ## Indentation
//!
//! Every token records whether it is the first token on its logical source
//! line, and if so, at what (tab-expanded) column. The compiler uses this to
//! enforce block indentation — the lexer itself does not interpret nesting.
//!
//! ## Numbers
//!
//! A leading `.` or `-` immediately followed by a digit starts a numeric
//! literal; unary minus is folded into the number token rather than left as
//! a separate `Minus` operator, matching the teaching tool this lexer was
//! modeled on.

pub mod cursor;
pub mod token;

#[cfg(test)]
mod tests;

use crate::error::{Diagnostic, DiagnosticKind, Span};
use cursor::Cursor;
use token::{keyword_group, lookup_keyword, AssignStyle, CommentStyle, KeywordGroup, QuoteStyle, Token, TokenKind};

pub struct LexResult {
    pub tokens: Vec<Token>,
    pub diagnostics: Vec<Diagnostic>,
}

impl LexResult {
    pub fn err_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }
}

struct StyleTracker {
    comment: Option<(CommentStyle, Span)>,
    quote: Option<(QuoteStyle, Span)>,
    assign: Option<(AssignStyle, Span)>,
    keywords: Vec<(KeywordGroup, String, Span)>,
}

impl StyleTracker {
    fn new() -> Self {
        Self { comment: None, quote: None, assign: None, keywords: Vec::new() }
    }
}

pub struct Lexer<'a> {
    cursor: Cursor<'a>,
    diagnostics: Vec<Diagnostic>,
    style: StyleTracker,
    /// True once a non-whitespace character has been produced on the
    /// current logical line; reset on every newline.
    line_started: bool,
}

#[must_use]
pub fn tokenize(source: &str) -> LexResult {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    loop {
        let tok = lexer.scan_one();
        let is_eof = tok.kind == TokenKind::Eof;
        tokens.push(tok);
        if is_eof {
            break;
        }
    }
    LexResult { tokens, diagnostics: lexer.diagnostics }
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            cursor: Cursor::new(source),
            diagnostics: Vec::new(),
            style: StyleTracker::new(),
            line_started: false,
        }
    }

    fn scan_one(&mut self) -> Token {
        loop {
            self.skip_whitespace_and_comments();
            if self.cursor.is_at_end() {
                let (l, c) = self.cursor.current_pos();
                return Token {
                    kind: TokenKind::Eof,
                    span: Span { line: l, col: c },
                    first_on_line: !self.line_started,
                    indent: c,
                };
            }
            if let Some(tok) = self.scan_token() {
                return tok;
            }
            // scan_token returns None only for a recovered error on a single
            // bad byte; loop around to try the next one.
        }
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.cursor.peek() {
                Some(' ') | Some('\t') => {
                    self.cursor.advance();
                }
                Some('\r') => {
                    self.cursor.advance();
                    if self.cursor.peek() == Some('\n') {
                        self.cursor.advance();
                    }
                    self.line_started = false;
                }
                Some('\n') => {
                    self.cursor.advance();
                    self.line_started = false;
                }
                Some('{') => self.consume_comment(CommentStyle::Brace),
                Some('/') if self.cursor.peek_at(1) == Some('/') => {
                    self.consume_comment(CommentStyle::SlashSlash)
                }
                Some('/') if self.cursor.peek_at(1) == Some('*') => {
                    self.consume_comment(CommentStyle::SlashStar)
                }
                Some('(') if self.cursor.peek_at(1) == Some('*') => {
                    self.consume_comment(CommentStyle::ParenStar)
                }
                _ => break,
            }
        }
    }

    fn consume_comment(&mut self, style: CommentStyle) {
        let (l, c) = self.cursor.current_pos();
        self.note_comment_style(style, Span { line: l, col: c });
        match style {
            CommentStyle::Brace => {
                self.cursor.advance(); // {
                while let Some(ch) = self.cursor.peek() {
                    self.cursor.advance();
                    if ch == '}' {
                        break;
                    }
                }
            }
            CommentStyle::SlashSlash => {
                while !matches!(self.cursor.peek(), None | Some('\n') | Some('\r')) {
                    self.cursor.advance();
                }
            }
            CommentStyle::ParenStar | CommentStyle::SlashStar => {
                self.cursor.advance();
                self.cursor.advance();
                loop {
                    match self.cursor.peek() {
                        None => break,
                        Some('*') if self.cursor.peek_at(1) == Some(')') && style == CommentStyle::ParenStar => {
                            self.cursor.advance();
                            self.cursor.advance();
                            break;
                        }
                        Some('*') if self.cursor.peek_at(1) == Some('/') && style == CommentStyle::SlashStar => {
                            self.cursor.advance();
                            self.cursor.advance();
                            break;
                        }
                        _ => {
                            self.cursor.advance();
                        }
                    }
                }
            }
        }
    }

    fn note_comment_style(&mut self, style: CommentStyle, span: Span) {
        match self.style.comment {
            None => self.style.comment = Some((style, span)),
            Some((first, first_span)) if first != style => {
                self.diagnostics.push(Diagnostic::warning(
                    DiagnosticKind::MixedCommentStyle,
                    format!(
                        "comment style {:?} mixed with {:?} first used at line {}",
                        style, first, first_span.line
                    ),
                    span,
                ));
            }
            _ => {}
        }
    }

    fn note_quote_style(&mut self, style: QuoteStyle, span: Span) {
        match self.style.quote {
            None => self.style.quote = Some((style, span)),
            Some((first, first_span)) if first != style => {
                self.diagnostics.push(Diagnostic::warning(
                    DiagnosticKind::MixedQuoteStyle,
                    format!(
                        "quote style {:?} mixed with {:?} first used at line {}",
                        style, first, first_span.line
                    ),
                    span,
                ));
            }
            _ => {}
        }
    }

    fn note_assign_style(&mut self, style: AssignStyle, span: Span) {
        match self.style.assign {
            None => self.style.assign = Some((style, span)),
            Some((first, first_span)) if first != style => {
                self.diagnostics.push(Diagnostic::warning(
                    DiagnosticKind::MixedAssignmentStyle,
                    format!(
                        "assignment style {:?} mixed with {:?} first used at line {}",
                        style, first, first_span.line
                    ),
                    span,
                ));
            }
            _ => {}
        }
    }

    fn note_keyword_spelling(&mut self, group: KeywordGroup, spelling: &str, span: Span) {
        if let Some((_, first_spelling, first_span)) =
            self.style.keywords.iter().find(|(g, _, _)| *g == group)
        {
            if first_spelling != spelling {
                self.diagnostics.push(Diagnostic::warning(
                    DiagnosticKind::InconsistentKeywordSpelling,
                    format!(
                        "keyword spelled '{}' here but '{}' at line {}",
                        spelling, first_spelling, first_span.line
                    ),
                    span,
                ));
            }
        } else {
            self.style.keywords.push((group, spelling.to_string(), span));
        }
    }

    fn scan_token(&mut self) -> Option<Token> {
        let (sl, sc) = self.cursor.current_pos();
        let first_on_line = !self.line_started;
        self.line_started = true;
        let span = Span { line: sl, col: sc };
        let ch = self.cursor.peek().unwrap();

        let kind = match ch {
            '"' => self.scan_string('"', QuoteStyle::Double, span),
            '\'' => self.scan_string('\'', QuoteStyle::Single, span),
            c if c.is_ascii_digit() => self.scan_number(span),
            '.' if matches!(self.cursor.peek_at(1), Some(c) if c.is_ascii_digit()) => {
                self.scan_number(span)
            }
            '-' if matches!(self.cursor.peek_at(1), Some(c) if c.is_ascii_digit()) => {
                self.scan_number(span)
            }
            c if is_letter_start(c) => self.scan_word(span),
            ':' if self.cursor.peek_at(1) == Some('=') => {
                self.cursor.advance();
                self.cursor.advance();
                self.note_assign_style(AssignStyle::ColonEq, span);
                TokenKind::Assign
            }
            ':' => {
                self.cursor.advance();
                TokenKind::Colon
            }
            '<' if self.cursor.peek_at(1) == Some('-') => {
                self.cursor.advance();
                self.cursor.advance();
                self.note_assign_style(AssignStyle::Arrow, span);
                TokenKind::Assign
            }
            '<' if self.cursor.peek_at(1) == Some('=') => {
                self.cursor.advance();
                self.cursor.advance();
                TokenKind::Leq
            }
            '<' if self.cursor.peek_at(1) == Some('>') => {
                self.cursor.advance();
                self.cursor.advance();
                TokenKind::Neq
            }
            '<' => {
                self.cursor.advance();
                TokenKind::Lt
            }
            '>' if self.cursor.peek_at(1) == Some('=') => {
                self.cursor.advance();
                self.cursor.advance();
                TokenKind::Geq
            }
            '>' => {
                self.cursor.advance();
                TokenKind::Gt
            }
            '=' if self.cursor.peek_at(1) == Some('=') => {
                self.cursor.advance();
                self.cursor.advance();
                TokenKind::Eq
            }
            '=' => {
                self.cursor.advance();
                TokenKind::MEq
            }
            '!' if self.cursor.peek_at(1) == Some('=') => {
                self.cursor.advance();
                self.cursor.advance();
                TokenKind::Neq
            }
            ',' => {
                self.cursor.advance();
                TokenKind::Comma
            }
            '(' => {
                self.cursor.advance();
                TokenKind::LeftPar
            }
            ')' => {
                self.cursor.advance();
                TokenKind::RightPar
            }
            '+' => {
                self.cursor.advance();
                TokenKind::Plus
            }
            '-' => {
                self.cursor.advance();
                TokenKind::Minus
            }
            '*' => {
                self.cursor.advance();
                TokenKind::Mult
            }
            '/' => {
                self.cursor.advance();
                TokenKind::Div
            }
            '%' => {
                self.cursor.advance();
                TokenKind::Mod
            }
            other => {
                self.cursor.advance();
                self.diagnostics.push(Diagnostic::error(
                    DiagnosticKind::UnexpectedToken,
                    format!("unexpected character '{other}'"),
                    span,
                ));
                return None;
            }
        };

        Some(Token {
            kind,
            span,
            first_on_line,
            indent: sc,
        })
    }

    fn scan_string(&mut self, quote: char, style: QuoteStyle, span: Span) -> TokenKind {
        self.note_quote_style(style, span);
        self.cursor.advance(); // opening quote
        let mut body = String::new();
        loop {
            match self.cursor.peek() {
                None | Some('\n') | Some('\r') => {
                    self.diagnostics.push(Diagnostic::error(
                        DiagnosticKind::UnexpectedToken,
                        "unterminated character-array literal",
                        span,
                    ));
                    break;
                }
                Some(c) if c == quote => {
                    self.cursor.advance();
                    break;
                }
                Some(c) => {
                    body.push(c);
                    self.cursor.advance();
                }
            }
        }
        TokenKind::CharArray(body)
    }

    fn scan_number(&mut self, _span: Span) -> TokenKind {
        let mut text = String::new();
        if self.cursor.peek() == Some('-') {
            text.push('-');
            self.cursor.advance();
        }
        while matches!(self.cursor.peek(), Some(c) if c.is_ascii_digit()) {
            text.push(self.cursor.advance().unwrap());
        }
        if self.cursor.peek() == Some('.')
            && matches!(self.cursor.peek_at(1), Some(c) if c.is_ascii_digit())
        {
            text.push(self.cursor.advance().unwrap());
            while matches!(self.cursor.peek(), Some(c) if c.is_ascii_digit()) {
                text.push(self.cursor.advance().unwrap());
            }
        }
        TokenKind::Number(text)
    }

    fn scan_word(&mut self, span: Span) -> TokenKind {
        let mut word = String::new();
        while matches!(self.cursor.peek(), Some(c) if is_letter(c) || c.is_ascii_digit()) {
            word.push(self.cursor.advance().unwrap());
        }
        if let Some(kind) = lookup_keyword(&word) {
            if let Some(group) = keyword_group(&kind) {
                self.note_keyword_spelling(group, &word.to_ascii_lowercase(), span);
            }
            kind
        } else {
            TokenKind::Name(word)
        }
    }
}

/// Letters = `a`-`z` plus the block `@`-`Z` (deliberately includes `@`,
/// matching the teaching tool's original scanner) plus `_`.
fn is_letter(c: char) -> bool {
    c == '_' || c.is_ascii_lowercase() || ('@'..='Z').contains(&c)
}

fn is_letter_start(c: char) -> bool {
    is_letter(c)
}

/// A forward-only, one-token-pushback view over an already-tokenized stream,
/// matching the `next()/peek()/push-back()/line-col()/err-count()` contract
/// the compiler is written against.
pub struct TokenStream {
    tokens: Vec<Token>,
    pos: usize,
}

impl TokenStream {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    pub fn next(&mut self) -> Token {
        let tok = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    pub fn peek(&self) -> Token {
        self.tokens[self.pos].clone()
    }

    /// Push back the most recently returned token (one level deep).
    pub fn push_back(&mut self) {
        if self.pos > 0 {
            self.pos -= 1;
        }
    }

    pub fn line_col(&self) -> (usize, usize) {
        let t = &self.tokens[self.pos];
        (t.span.line, t.span.col)
    }
}
