//! # DAP Compiler
//!
//! A recursive-descent, single-pass translator from a DAP token stream to a
//! symbolic instruction sequence, accumulating a symbol table and constant
//! folding expressions as it goes.
//!
//! ## Pipeline position
//!
//! `compile_source` wraps the full lexer→compiler path: it tokenizes,
//! reports lexer diagnostics, then runs the grammar. A non-zero aggregate
//! diagnostic count at the end of input aborts before assembly, per the
//! language's error-handling design — compilation never throws partway
//! through; every recoverable problem is counted and execution continues to
//! give the student the fullest possible error report.


use crate::error::{CompileError, Diagnostic, DiagnosticKind, Span};
use crate::ir::{Operand, SymLine};
use crate::lexer::token::{Token, TokenKind};
use crate::lexer::{tokenize, TokenStream};
use crate::symbols::{AssignmentRecord, ConstValue, DapType, Symbol, SymbolTable, SymbolValue};

pub struct CompileUnit {
    pub program_name: String,
    pub lines: Vec<SymLine>,
    pub symbols: SymbolTable,
    pub assignments: Vec<AssignmentRecord>,
}

/// Tokenize and compile a complete `.dap` source string.
pub fn compile_source(source: &str) -> Result<CompileUnit, CompileError> {
    let lexed = tokenize(source);
    let mut compiler = Compiler::new(TokenStream::new(lexed.tokens));
    compiler.diagnostics.extend(lexed.diagnostics);

    let unit = compiler.program();

    if compiler.diagnostics.iter().any(Diagnostic::is_error) {
        return Err(CompileError::Diagnostics(compiler.diagnostics));
    }
    for d in &compiler.diagnostics {
        tracing::warn!("{d}");
    }
    Ok(unit)
}

/// The result of folding an expression: either a value known entirely at
/// compile time, or a marker that the instructions to compute it at runtime
/// have already been appended to `code`.
#[derive(Debug, Clone, PartialEq)]
enum FoldedValue {
    Known(ConstValue),
    Unknown,
}

/// A partially-compiled expression: its static type, its folded value (if
/// any), and the instructions required to leave it on the stack at runtime
/// (empty when fully folded — deferred until a consumer needs it, so
/// nested constant subexpressions never emit anything).
struct Eval {
    ty: DapType,
    value: FoldedValue,
    code: Vec<SymLine>,
}

impl Eval {
    fn known(ty: DapType, value: ConstValue) -> Self {
        Self { ty, value: FoldedValue::Known(value), code: Vec::new() }
    }

    fn runtime(ty: DapType, code: Vec<SymLine>) -> Self {
        Self { ty, value: FoldedValue::Unknown, code }
    }
}

fn const_as_int(v: &ConstValue) -> i64 {
    match v {
        ConstValue::Number(n) => *n,
        ConstValue::Bool(b) => *b as i64,
        ConstValue::CharArray(s) => s.chars().next().map(|c| c as i64).unwrap_or(0),
    }
}

struct Compiler {
    tokens: TokenStream,
    diagnostics: Vec<Diagnostic>,
    symbols: SymbolTable,
    lines: Vec<SymLine>,
    assignments: Vec<AssignmentRecord>,
    label_counter: u32,
    last_line: usize,
    loc_counter: usize,
    tab_width: Option<usize>,
    block_level: usize,
}

impl Compiler {
    fn new(tokens: TokenStream) -> Self {
        Self {
            tokens,
            diagnostics: Vec::new(),
            symbols: SymbolTable::new(),
            lines: Vec::new(),
            assignments: Vec::new(),
            label_counter: 1001,
            last_line: 0,
            loc_counter: 0,
            tab_width: None,
            block_level: 0,
        }
    }

    // ---- token plumbing -------------------------------------------------

    fn peek(&self) -> Token {
        self.tokens.peek()
    }

    fn advance(&mut self) -> Token {
        self.tokens.next()
    }

    fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(&self.peek().kind) == std::mem::discriminant(kind)
    }

    fn accept(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> bool {
        if self.accept(&kind) {
            true
        } else {
            let tok = self.peek();
            self.error(
                DiagnosticKind::UnexpectedToken,
                format!("expected {what}, found {:?}", tok.kind),
                tok.span,
            );
            false
        }
    }

    fn expect_name(&mut self, what: &str) -> Option<String> {
        let tok = self.peek();
        if let TokenKind::Name(n) = tok.kind {
            self.advance();
            Some(n)
        } else {
            self.error(
                DiagnosticKind::UnexpectedToken,
                format!("expected {what}, found {:?}", tok.kind),
                tok.span,
            );
            None
        }
    }

    fn error(&mut self, kind: DiagnosticKind, message: impl Into<String>, span: Span) {
        self.diagnostics.push(Diagnostic::error(kind, message, span));
    }

    fn warn(&mut self, kind: DiagnosticKind, message: impl Into<String>, span: Span) {
        self.diagnostics.push(Diagnostic::warning(kind, message, span));
    }

    /// Skip tokens until something that plausibly starts a new statement or
    /// closes the current block, so one bad statement doesn't cascade into
    /// spurious downstream errors.
    fn sync(&mut self) {
        loop {
            let tok = self.peek();
            if matches!(tok.kind, TokenKind::Eof)
                || tok.first_on_line
                || is_block_terminator(&tok.kind)
            {
                return;
            }
            self.advance();
        }
    }

    fn fresh_label(&mut self) -> String {
        let name = format!("L{}", self.label_counter);
        self.label_counter += 1;
        name
    }

    // ---- indentation discipline ------------------------------------------

    fn enter_block(&mut self) {
        self.block_level += 1;
    }

    fn leave_block(&mut self) {
        self.block_level = self.block_level.saturating_sub(1);
    }

    /// A statement whose first-on-line column dedents to or below the
    /// enclosing level's column terminates the current block even without an
    /// explicit END* keyword — the keyword is optional, dedent is what
    /// actually closes the block. The top-level program body (nesting 0) has
    /// no enclosing level to dedent to; only blocks nested inside a
    /// while/if/case body can be closed this way.
    fn block_closed_by_dedent(&self, tok: &Token) -> bool {
        if !tok.first_on_line {
            return false;
        }
        let nesting = self.block_level.saturating_sub(1);
        if nesting == 0 {
            return false;
        }
        match self.tab_width {
            Some(tab) if tab > 0 => tok.indent <= nesting.saturating_sub(1) * tab,
            _ => false,
        }
    }

    fn check_block_indent(&mut self, tok: &Token) {
        if !tok.first_on_line {
            return;
        }
        let nesting = self.block_level.saturating_sub(1);
        if nesting == 0 {
            return;
        }
        match self.tab_width {
            None => {
                // First nested-block statement latches the tab width.
                self.tab_width = Some(tok.indent / nesting);
            }
            Some(tab) => {
                let expected = nesting * tab;
                if tok.indent != expected {
                    self.warn(
                        DiagnosticKind::BadIndentation,
                        format!(
                            "expected indentation column {expected} for nesting level {}, found column {}",
                            nesting, tok.indent
                        ),
                        tok.span,
                    );
                }
            }
        }
    }

    // ---- LINE emission ----------------------------------------------------

    fn mark_line(&mut self, tok: &Token) {
        if tok.span.line > self.last_line {
            self.last_line = tok.span.line;
            self.lines.push(SymLine::op2(
                "LINE",
                Operand::Int(tok.span.line as i64),
                Operand::Int(tok.span.col as i64),
            ));
        }
    }

    // ---- program ----------------------------------------------------------

    fn program(&mut self) -> CompileUnit {
        self.expect(TokenKind::Program, "'program'");
        let name = self.expect_name("program name").unwrap_or_default();

        self.declaration();

        self.expect(TokenKind::Code, "'code'");
        if self.loc_counter > 0 {
            self.lines.push(SymLine::push_int(self.loc_counter as i64));
            self.lines.push(SymLine::op0("CLAIM"));
        }

        self.block(&[TokenKind::Endprog]);

        if self.loc_counter > 0 {
            self.lines.push(SymLine::op0("FREE"));
        }
        self.lines.push(SymLine::op0("EXIT"));
        self.expect(TokenKind::Endprog, "'endprogram'");

        CompileUnit {
            program_name: name,
            lines: std::mem::take(&mut self.lines),
            symbols: std::mem::replace(&mut self.symbols, SymbolTable::new()),
            assignments: std::mem::take(&mut self.assignments),
        }
    }

    // ---- declaration --------------------------------------------------------

    fn declaration(&mut self) {
        self.expect(TokenKind::Dict, "'dictionary'");
        loop {
            let is_local = match self.peek().kind {
                TokenKind::Global => {
                    self.advance();
                    false
                }
                TokenKind::Local => {
                    self.advance();
                    true
                }
                TokenKind::Var => {
                    self.advance();
                    false
                }
                _ => false,
            };

            if self.accept(&TokenKind::Const) {
                self.const_declaration();
                continue;
            }

            if matches!(self.peek().kind, TokenKind::Name(_)) {
                self.variable_declaration(is_local);
                continue;
            }

            break;
        }
    }

    fn const_declaration(&mut self) {
        let tok = self.peek();
        let Some(name) = self.expect_name("constant name") else {
            self.sync();
            return;
        };
        if !(self.accept(&TokenKind::MEq) || self.accept(&TokenKind::Assign)) {
            self.error(
                DiagnosticKind::UnexpectedToken,
                "expected '=' or assignment in const declaration",
                tok.span,
            );
        }
        let eval = self.expression();
        let value = match eval.value {
            FoldedValue::Known(v) => v,
            FoldedValue::Unknown => {
                self.error(
                    DiagnosticKind::TypeMismatch,
                    "const initializer must be a compile-time constant",
                    tok.span,
                );
                ConstValue::Number(0)
            }
        };
        let declared = self.symbols.declare(Symbol {
            parent: String::new(),
            name: name.clone(),
            kind: eval.ty,
            value: SymbolValue::Const(value),
            location: 0,
            is_local: false,
        });
        if !declared {
            self.error(DiagnosticKind::DuplicateDeclaration, format!("'{name}' already declared"), tok.span);
        }
    }

    fn variable_declaration(&mut self, is_local: bool) {
        let tok = self.peek();
        let mut names = Vec::new();
        loop {
            match self.expect_name("variable name") {
                Some(n) => names.push(n),
                None => {
                    self.sync();
                    return;
                }
            }
            if !self.accept(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::Colon, "':'");
        let ty = self.parse_type();

        for name in names {
            self.loc_counter += 1;
            let declared = self.symbols.declare(Symbol {
                parent: String::new(),
                name: name.clone(),
                kind: ty,
                value: SymbolValue::Uninitialized,
                location: self.loc_counter,
                is_local,
            });
            if !declared {
                self.error(DiagnosticKind::DuplicateDeclaration, format!("'{name}' already declared"), tok.span);
            }
        }
    }

    fn parse_type(&mut self) -> DapType {
        let tok = self.advance();
        match tok.kind {
            TokenKind::TypeInt | TokenKind::TypeReal => DapType::Number,
            TokenKind::TypeChar => DapType::CharArray,
            TokenKind::TypeBool => DapType::Bool,
            other => {
                self.error(DiagnosticKind::UnexpectedToken, format!("expected a type, found {other:?}"), tok.span);
                DapType::Number
            }
        }
    }

    // ---- block / statement --------------------------------------------------

    fn block(&mut self, terminators: &[TokenKind]) {
        self.enter_block();
        loop {
            let tok = self.peek();
            if matches!(tok.kind, TokenKind::Eof) {
                break;
            }
            if terminators.iter().any(|t| std::mem::discriminant(t) == std::mem::discriminant(&tok.kind)) {
                break;
            }
            if self.block_closed_by_dedent(&tok) {
                break;
            }
            self.check_block_indent(&tok);
            self.statement();
        }
        self.leave_block();
    }

    fn statement(&mut self) {
        let tok = self.peek();
        self.mark_line(&tok);
        match tok.kind {
            TokenKind::Input => self.input_stmt(),
            TokenKind::Output => self.output_stmt(),
            TokenKind::While => self.while_stmt(),
            TokenKind::Repeat => self.repeat_stmt(),
            TokenKind::If => self.if_stmt(),
            TokenKind::Case => self.case_stmt(),
            TokenKind::Name(_) => self.assignment(),
            _ => {
                self.error(DiagnosticKind::UnexpectedToken, format!("unexpected token {:?} in statement", tok.kind), tok.span);
                self.advance();
                self.sync();
            }
        }
    }

    fn assignment(&mut self) {
        let tok = self.peek();
        let Some(name) = self.expect_name("variable name") else {
            self.sync();
            return;
        };
        if !(self.accept(&TokenKind::Assign) || self.accept(&TokenKind::MEq)) {
            self.error(DiagnosticKind::UnexpectedToken, "expected assignment operator", tok.span);
            self.sync();
            return;
        }
        let eval = self.expression();
        self.store_variable(&name, eval, tok.span);
    }

    fn store_variable(&mut self, name: &str, eval: Eval, span: Span) {
        let Some(sym) = self.symbols.get("", name) else {
            self.error(DiagnosticKind::UndeclaredName, format!("'{name}' is not declared"), span);
            return;
        };
        if matches!(sym.value, SymbolValue::Const(_)) {
            self.error(DiagnosticKind::IllegalOperation, format!("'{name}' is a constant and cannot be assigned"), span);
            return;
        }
        let loc = sym.location;
        let is_local = sym.is_local;
        self.materialize(eval);
        self.lines.push(SymLine::push_int(loc as i64));
        self.lines.push(SymLine::op0(if is_local { "LSTOR" } else { "STORE" }));
        self.assignments.push(AssignmentRecord { parent: String::new(), source_line: span.line, slot: loc });
    }

    fn input_stmt(&mut self) {
        self.advance();
        loop {
            let tok = self.peek();
            let Some(name) = self.expect_name("variable name") else {
                self.sync();
                return;
            };
            let Some(sym) = self.symbols.get("", &name) else {
                self.error(DiagnosticKind::UndeclaredName, format!("'{name}' is not declared"), tok.span);
                if !self.accept(&TokenKind::Comma) {
                    break;
                }
                continue;
            };
            let loc = sym.location;
            let is_local = sym.is_local;
            let opcode = match sym.kind {
                DapType::Number => "INPI",
                DapType::CharArray => "INPC",
                DapType::Bool => "INPB",
            };
            self.lines.push(SymLine::op0(opcode));
            self.lines.push(SymLine::push_int(loc as i64));
            self.lines.push(SymLine::op0(if is_local { "LSTOR" } else { "STORE" }));
            self.assignments.push(AssignmentRecord { parent: String::new(), source_line: tok.span.line, slot: loc });
            if !self.accept(&TokenKind::Comma) {
                break;
            }
        }
    }

    fn output_stmt(&mut self) {
        self.advance();
        loop {
            let tok = self.peek();
            let eval = self.expression();
            self.emit_output(eval, tok.span);
            if !self.accept(&TokenKind::Comma) {
                break;
            }
        }
    }

    fn emit_output(&mut self, eval: Eval, span: Span) {
        match (&eval.value, eval.ty) {
            (FoldedValue::Known(ConstValue::CharArray(s)), DapType::CharArray) if s.chars().count() != 1 => {
                for ch in s.chars() {
                    self.lines.push(SymLine::push_int(ch as i64));
                    self.lines.push(SymLine::op0("OUTC"));
                }
            }
            _ => {
                let ty = eval.ty;
                self.materialize(eval);
                let opcode = match ty {
                    DapType::Number => "OUTI",
                    DapType::CharArray => "OUTC",
                    DapType::Bool => "OUTB",
                };
                self.lines.push(SymLine::op0(opcode));
            }
        }
        let _ = span;
    }

    fn while_stmt(&mut self) {
        self.advance();
        let l1 = self.fresh_label();
        let l2 = self.fresh_label();
        self.lines.push(SymLine::label_def(&l1));
        let cond = self.expression();
        self.check_bool(&cond, "while condition");
        self.materialize(cond);
        self.lines.push(SymLine::push_label(&l2));
        self.lines.push(SymLine::op0("NCOND"));
        self.expect(TokenKind::Do, "'do'");
        self.block(&[TokenKind::Endwhile, TokenKind::Endif, TokenKind::Endprog, TokenKind::Elif, TokenKind::Else]);
        self.accept(&TokenKind::Endwhile);
        self.lines.push(SymLine::push_label(&l1));
        self.lines.push(SymLine::op0("GOTO"));
        self.lines.push(SymLine::label_def(&l2));
    }

    fn repeat_stmt(&mut self) {
        self.advance();
        let l1 = self.fresh_label();
        self.lines.push(SymLine::label_def(&l1));
        self.block(&[TokenKind::Until]);
        self.expect(TokenKind::Until, "'until'");
        let cond = self.expression();
        self.check_bool(&cond, "repeat condition");
        self.materialize(cond);
        self.lines.push(SymLine::push_label(&l1));
        self.lines.push(SymLine::op0("NCOND"));
    }

    fn if_stmt(&mut self) {
        self.advance();
        let lfin = self.fresh_label();
        self.if_branch(&lfin);
        self.accept(&TokenKind::Endif);
    }

    fn if_branch(&mut self, lfin: &str) {
        let cond = self.expression();
        self.check_bool(&cond, "if condition");
        self.materialize(cond);
        let lskip = self.fresh_label();
        self.lines.push(SymLine::push_label(&lskip));
        self.lines.push(SymLine::op0("NCOND"));
        self.expect(TokenKind::Then, "'then'");
        self.block(&[TokenKind::Elif, TokenKind::Else, TokenKind::Endif, TokenKind::Endprog]);
        self.lines.push(SymLine::push_label(lfin));
        self.lines.push(SymLine::op0("GOTO"));
        self.lines.push(SymLine::label_def(&lskip));

        if self.accept(&TokenKind::Elif) {
            self.if_branch(lfin);
            return;
        }
        if self.accept(&TokenKind::Else) {
            self.block(&[TokenKind::Endif, TokenKind::Endprog]);
        }
        self.lines.push(SymLine::label_def(lfin));
    }

    fn case_stmt(&mut self) {
        self.advance();
        let scrutinee = self.expression();
        self.materialize(scrutinee);
        self.expect(TokenKind::Of, "'of'");

        let lfin = self.fresh_label();
        while matches!(
            self.peek().kind,
            TokenKind::Number(_)
                | TokenKind::Minus
                | TokenKind::Not
                | TokenKind::CharArray(_)
                | TokenKind::True
                | TokenKind::False
                | TokenKind::LeftPar
                | TokenKind::Name(_)
        ) {
            self.lines.push(SymLine::op0("DUP"));
            let arm = self.expression();
            self.materialize(arm);
            self.lines.push(SymLine::op0("NEQ"));
            let lnext = self.fresh_label();
            self.lines.push(SymLine::push_label(&lnext));
            self.lines.push(SymLine::op0("COND"));
            if !(self.accept(&TokenKind::Colon) || self.accept(&TokenKind::RightPar)) {
                let tok = self.peek();
                self.error(DiagnosticKind::UnexpectedToken, "expected ':' after case label", tok.span);
            }
            self.block(&[TokenKind::Default, TokenKind::Endcase, TokenKind::Endprog]);
            self.lines.push(SymLine::push_label(&lfin));
            self.lines.push(SymLine::op0("GOTO"));
            self.lines.push(SymLine::label_def(&lnext));
        }

        if self.accept(&TokenKind::Default) {
            self.accept(&TokenKind::Colon);
            self.accept(&TokenKind::RightPar);
            self.block(&[TokenKind::Endcase, TokenKind::Endprog]);
        }

        self.lines.push(SymLine::label_def(&lfin));
        self.lines.push(SymLine::op0("POP"));
        self.accept(&TokenKind::Endcase);
    }

    fn check_bool(&mut self, eval: &Eval, where_: &str) {
        if eval.ty != DapType::Bool {
            let span = self.peek().span;
            self.error(DiagnosticKind::TypeMismatch, format!("{where_} must be boolean"), span);
        }
    }

    /// Ensures `eval`'s value is on the runtime stack: appends its deferred
    /// code, then — if it never emitted anything because it folded fully to
    /// a constant — pushes that constant now. This is the single point where
    /// a fully-folded subtree finally turns into bytecode.
    fn materialize(&mut self, eval: Eval) {
        self.lines.extend(eval.code);
        if let FoldedValue::Known(v) = eval.value {
            self.lines.push(SymLine::push_int(const_as_int(&v)));
        }
    }

    // ---- expressions --------------------------------------------------------

    fn expression(&mut self) -> Eval {
        let mut acc = self.mulexpr();
        loop {
            let tok = self.peek();
            let (mnemonic, span) = match tok.kind {
                TokenKind::Plus => ("ADD", tok.span),
                TokenKind::Minus => ("SUB", tok.span),
                TokenKind::Or => ("OR", tok.span),
                _ => break,
            };
            self.advance();
            let rhs = self.mulexpr();
            acc = self.combine(acc, mnemonic, rhs, span);
        }
        acc
    }

    fn mulexpr(&mut self) -> Eval {
        let mut acc = self.relexpr();
        loop {
            let tok = self.peek();
            let (mnemonic, span) = match tok.kind {
                TokenKind::Mult => ("MUL", tok.span),
                TokenKind::Div => ("DIV", tok.span),
                TokenKind::Mod => ("MOD", tok.span),
                TokenKind::And => ("AND", tok.span),
                _ => break,
            };
            self.advance();
            let rhs = self.relexpr();
            acc = self.combine(acc, mnemonic, rhs, span);
        }
        acc
    }

    fn relexpr(&mut self) -> Eval {
        let lhs = self.literal();
        let tok = self.peek();
        let mnemonic = match tok.kind {
            TokenKind::Lt => "LT",
            TokenKind::Leq => "LEQ",
            TokenKind::Gt => "GT",
            TokenKind::Geq => "GEQ",
            TokenKind::Eq => "EQ",
            TokenKind::Neq => "NEQ",
            _ => return lhs,
        };
        let span = tok.span;
        self.advance();
        let rhs = self.literal();
        self.combine_rel(lhs, mnemonic, rhs, span)
    }

    fn literal(&mut self) -> Eval {
        let tok = self.peek();
        match tok.kind.clone() {
            TokenKind::Number(text) => {
                self.advance();
                let n: f64 = text.parse().unwrap_or(0.0);
                Eval::known(DapType::Number, ConstValue::Number(n as i64))
            }
            TokenKind::CharArray(text) => {
                self.advance();
                Eval::known(DapType::CharArray, ConstValue::CharArray(text))
            }
            TokenKind::True => {
                self.advance();
                Eval::known(DapType::Bool, ConstValue::Bool(true))
            }
            TokenKind::False => {
                self.advance();
                Eval::known(DapType::Bool, ConstValue::Bool(false))
            }
            TokenKind::Name(name) => {
                self.advance();
                self.load_variable(&name, tok.span)
            }
            TokenKind::LeftPar => {
                self.advance();
                let inner = self.expression();
                self.expect(TokenKind::RightPar, "')'");
                inner
            }
            TokenKind::Minus => {
                self.advance();
                let operand = self.literal();
                self.negate(operand, tok.span)
            }
            TokenKind::Not => {
                self.advance();
                let operand = self.literal();
                self.logical_not(operand, tok.span)
            }
            other => {
                self.error(DiagnosticKind::UnexpectedToken, format!("expected an expression, found {other:?}"), tok.span);
                self.advance();
                Eval::known(DapType::Number, ConstValue::Number(0))
            }
        }
    }

    fn load_variable(&mut self, name: &str, span: Span) -> Eval {
        let Some(sym) = self.symbols.get("", name) else {
            self.error(DiagnosticKind::UndeclaredName, format!("'{name}' is not declared"), span);
            return Eval::known(DapType::Number, ConstValue::Number(0));
        };
        if let SymbolValue::Const(v) = &sym.value {
            return Eval::known(sym.kind, v.clone());
        }
        let loc = sym.location;
        let ty = sym.kind;
        let copy_op = if sym.is_local { "LCOPY" } else { "COPY" };
        let code = vec![SymLine::push_int(loc as i64), SymLine::op0(copy_op)];
        Eval::runtime(ty, code)
    }

    fn negate(&mut self, operand: Eval, span: Span) -> Eval {
        if operand.ty != DapType::Number {
            self.error(DiagnosticKind::TypeMismatch, "unary '-' requires a number", span);
        }
        match operand.value {
            FoldedValue::Known(ConstValue::Number(n)) => Eval::known(DapType::Number, ConstValue::Number(-n)),
            FoldedValue::Known(_) => Eval::known(DapType::Number, ConstValue::Number(0)),
            FoldedValue::Unknown => {
                let mut code = operand.code;
                code.push(SymLine::op0("NEG"));
                Eval::runtime(DapType::Number, code)
            }
        }
    }

    fn logical_not(&mut self, operand: Eval, span: Span) -> Eval {
        if operand.ty != DapType::Bool {
            self.error(DiagnosticKind::TypeMismatch, "'not' requires a boolean", span);
        }
        match operand.value {
            FoldedValue::Known(ConstValue::Bool(b)) => Eval::known(DapType::Bool, ConstValue::Bool(!b)),
            FoldedValue::Known(_) => Eval::known(DapType::Bool, ConstValue::Bool(false)),
            FoldedValue::Unknown => {
                let mut code = operand.code;
                code.push(SymLine::op0("NOT"));
                Eval::runtime(DapType::Bool, code)
            }
        }
    }

    fn combine(&mut self, left: Eval, mnemonic: &str, right: Eval, span: Span) -> Eval {
        let result_ty = self.check_arith_types(&left, mnemonic, &right, span);

        if (mnemonic == "DIV" || mnemonic == "MOD") && matches!(right.value, FoldedValue::Known(ConstValue::Number(0))) {
            self.warn(DiagnosticKind::ConstantDivisionByZero, "division by a constant zero", span);
            let forced_right = Eval::runtime(right.ty, vec![SymLine::push_int(0)]);
            return self.fold_or_emit(left, mnemonic, forced_right, result_ty);
        }

        self.fold_or_emit(left, mnemonic, right, result_ty)
    }

    fn combine_rel(&mut self, left: Eval, mnemonic: &str, right: Eval, span: Span) -> Eval {
        if left.ty != DapType::Number || right.ty != DapType::Number {
            self.error(DiagnosticKind::TypeMismatch, format!("relational operator requires numbers"), span);
        }
        self.fold_or_emit(left, mnemonic, right, DapType::Bool)
    }

    fn check_arith_types(&mut self, left: &Eval, mnemonic: &str, right: &Eval, span: Span) -> DapType {
        match mnemonic {
            "ADD" | "SUB" => {
                if left.ty == DapType::CharArray || right.ty == DapType::CharArray {
                    self.error(DiagnosticKind::IllegalOperation, "'+'/'-' over character arrays is not supported", span);
                } else if left.ty != DapType::Number || right.ty != DapType::Number {
                    self.error(DiagnosticKind::TypeMismatch, "'+'/'-' requires numbers", span);
                }
                DapType::Number
            }
            "OR" => {
                if left.ty != DapType::Bool || right.ty != DapType::Bool {
                    self.error(DiagnosticKind::TypeMismatch, "'or' requires booleans", span);
                }
                DapType::Bool
            }
            "AND" => {
                if left.ty == DapType::Bool && right.ty == DapType::Bool {
                    DapType::Bool
                } else if left.ty == DapType::Number && right.ty == DapType::Number {
                    DapType::Number
                } else {
                    self.error(DiagnosticKind::TypeMismatch, "'and' requires two numbers or two booleans", span);
                    DapType::Number
                }
            }
            _ => {
                if left.ty != DapType::Number || right.ty != DapType::Number {
                    self.error(DiagnosticKind::TypeMismatch, format!("'{mnemonic}' requires numbers"), span);
                }
                DapType::Number
            }
        }
    }

    fn fold_or_emit(&mut self, left: Eval, mnemonic: &str, right: Eval, result_ty: DapType) -> Eval {
        match (left.value, right.value) {
            (FoldedValue::Known(a), FoldedValue::Known(b)) => {
                match fold_const(mnemonic, &a, &b) {
                    Some(v) => Eval::known(result_ty, v),
                    None => Eval::runtime(result_ty, {
                        let mut code = vec![SymLine::push_int(const_as_int(&a)), SymLine::push_int(const_as_int(&b))];
                        code.push(SymLine::op0(mnemonic));
                        code
                    }),
                }
            }
            (FoldedValue::Known(a), FoldedValue::Unknown) => {
                let mut code = vec![SymLine::push_int(const_as_int(&a))];
                code.extend(right.code);
                code.push(SymLine::op0(mnemonic));
                Eval::runtime(result_ty, code)
            }
            (FoldedValue::Unknown, FoldedValue::Known(b)) => {
                let mut code = left.code;
                code.push(SymLine::push_int(const_as_int(&b)));
                code.push(SymLine::op0(mnemonic));
                Eval::runtime(result_ty, code)
            }
            (FoldedValue::Unknown, FoldedValue::Unknown) => {
                let mut code = left.code;
                code.extend(right.code);
                code.push(SymLine::op0(mnemonic));
                Eval::runtime(result_ty, code)
            }
        }
    }
}

fn fold_const(mnemonic: &str, a: &ConstValue, b: &ConstValue) -> Option<ConstValue> {
    let (an, bn) = (const_as_int(a), const_as_int(b));
    Some(match mnemonic {
        "ADD" => ConstValue::Number(an + bn),
        "SUB" => ConstValue::Number(an - bn),
        "MUL" => ConstValue::Number(an * bn),
        "DIV" => {
            if bn == 0 {
                return None;
            }
            ConstValue::Number(an / bn)
        }
        "MOD" => {
            if bn == 0 {
                return None;
            }
            ConstValue::Number(an % bn)
        }
        "AND" => ConstValue::Bool(an != 0 && bn != 0),
        "OR" => ConstValue::Bool(an != 0 || bn != 0),
        "LT" => ConstValue::Bool(an < bn),
        "LEQ" => ConstValue::Bool(an <= bn),
        "GT" => ConstValue::Bool(an > bn),
        "GEQ" => ConstValue::Bool(an >= bn),
        "EQ" => ConstValue::Bool(an == bn),
        "NEQ" => ConstValue::Bool(an != bn),
        _ => return None,
    })
}

fn is_block_terminator(kind: &TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Endwhile
            | TokenKind::Until
            | TokenKind::Endif
            | TokenKind::Elif
            | TokenKind::Else
            | TokenKind::Endcase
            | TokenKind::Default
            | TokenKind::Endprog
    )
}
