//! Single-pass Pratt parser and code generator (spec.md §4.4).
//!
//! Parsing and code generation are fused: each grammar construct emits
//! bytecode into the current function's [`Chunk`] as soon as it is
//! recognized. Compiler frames form an explicit stack rather than a
//! recursion-captured reference graph, per spec.md §9.

#[cfg(test)]
mod compiler_test;

use std::rc::Rc;

use crate::chunk::{op, Chunk};
use crate::object::{Heap, Object, ObjFunction};
use crate::scanner::{Scanner, Token, TokenKind};
use crate::value::Value;

/// Locals array must exceed 255 so wide-index opcodes get exercised
/// (spec.md §3: "cap ≥ 500").
const MAX_LOCALS: usize = 512;
const MAX_PARAMETERS: usize = 255;
const MAX_ARGUMENTS: usize = 255;

/// Marks a local as declared but not yet initialized (spec.md §3).
const UNINITIALIZED: i32 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    None,
    Assignment,
    Or,
    And,
    Equality,
    Comparison,
    Term,
    Factor,
    Unary,
    Call,
    Primary,
}

impl Precedence {
    fn next(self) -> Self {
        match self {
            Precedence::None => Precedence::Assignment,
            Precedence::Assignment => Precedence::Or,
            Precedence::Or => Precedence::And,
            Precedence::And => Precedence::Equality,
            Precedence::Equality => Precedence::Comparison,
            Precedence::Comparison => Precedence::Term,
            Precedence::Term => Precedence::Factor,
            Precedence::Factor => Precedence::Unary,
            Precedence::Unary => Precedence::Call,
            Precedence::Call | Precedence::Primary => Precedence::Primary,
        }
    }
}

type ParseFn = fn(&mut Compiler<'_, '_>, bool);

#[derive(Clone, Copy)]
struct ParseRule {
    prefix: Option<ParseFn>,
    infix: Option<ParseFn>,
    precedence: Precedence,
}

const fn rule(prefix: Option<ParseFn>, infix: Option<ParseFn>, precedence: Precedence) -> ParseRule {
    ParseRule { prefix, infix, precedence }
}

/// Table-driven like the teacher's `lookup_intrinsic`, but indexed by
/// token kind rather than name.
fn get_rule(kind: TokenKind) -> ParseRule {
    use Precedence as P;
    match kind {
        TokenKind::LeftParen => rule(Some(Compiler::grouping), Some(Compiler::call), P::Call),
        TokenKind::Minus => rule(Some(Compiler::unary), Some(Compiler::binary), P::Term),
        TokenKind::Plus => rule(None, Some(Compiler::binary), P::Term),
        TokenKind::Slash => rule(None, Some(Compiler::binary), P::Factor),
        TokenKind::Star => rule(None, Some(Compiler::binary), P::Factor),
        TokenKind::Bang => rule(Some(Compiler::unary), None, P::None),
        TokenKind::BangEqual => rule(None, Some(Compiler::binary), P::Equality),
        TokenKind::EqualEqual => rule(None, Some(Compiler::binary), P::Equality),
        TokenKind::Greater => rule(None, Some(Compiler::binary), P::Comparison),
        TokenKind::GreaterEqual => rule(None, Some(Compiler::binary), P::Comparison),
        TokenKind::Less => rule(None, Some(Compiler::binary), P::Comparison),
        // Open question decision: `<=` is infix-only (spec.md §9 flags a
        // revision where it was miswired as a prefix rule).
        TokenKind::LessEqual => rule(None, Some(Compiler::binary), P::Comparison),
        TokenKind::Number => rule(Some(Compiler::number), None, P::None),
        TokenKind::String => rule(Some(Compiler::string), None, P::None),
        TokenKind::Identifier => rule(Some(Compiler::variable), None, P::None),
        TokenKind::And => rule(None, Some(Compiler::and), P::And),
        TokenKind::Or => rule(None, Some(Compiler::or), P::Or),
        TokenKind::False | TokenKind::True | TokenKind::Nil => rule(Some(Compiler::literal), None, P::None),
        _ => rule(None, None, P::None),
    }
}

/// `(name_lexeme, depth)`; `depth == -1` means declared but not yet
/// initialized.
struct Local<'src> {
    name: &'src str,
    depth: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FunctionType {
    Script,
    Function,
}

/// One enclosing loop's recovery info for `continue` (spec.md §3).
struct LoopContext {
    start_offset: usize,
    body_scope_depth: i32,
}

/// One function being compiled. `enclosing` in spec.md §3 is modeled as
/// an explicit `Vec<FunctionFrame>` stack owned by [`Compiler`] rather
/// than a linked chain, per spec.md §9.
struct FunctionFrame<'src> {
    chunk: Chunk,
    name: Option<Rc<Object>>,
    arity: u8,
    function_type: FunctionType,
    locals: Vec<Local<'src>>,
    scope_depth: i32,
    loops: Vec<LoopContext>,
}

impl<'src> FunctionFrame<'src> {
    fn new(function_type: FunctionType, name: Option<Rc<Object>>) -> Self {
        // Slot 0 is reserved for the called function itself (spec.md §3:
        // "CallFrame... slots_base... holds the called function itself").
        let locals = vec![Local { name: "", depth: 0 }];
        Self {
            chunk: Chunk::new(),
            name,
            arity: 0,
            function_type,
            locals,
            scope_depth: 0,
            loops: Vec::new(),
        }
    }
}

/// Single-pass compiler: Pratt expression parsing fused with statement
/// and declaration handling, driving an explicit stack of
/// [`FunctionFrame`]s.
pub struct Compiler<'src, 'heap> {
    scanner: Scanner<'src>,
    previous: Token<'src>,
    current: Token<'src>,
    had_error: bool,
    panic_mode: bool,
    frames: Vec<FunctionFrame<'src>>,
    heap: &'heap mut Heap,
}

impl<'src, 'heap> Compiler<'src, 'heap> {
    fn new(source: &'src str, heap: &'heap mut Heap) -> Self {
        let eof = Token { kind: TokenKind::Eof, lexeme: "", line: 0 };
        Self {
            scanner: Scanner::new(source),
            previous: eof,
            current: eof,
            had_error: false,
            panic_mode: false,
            frames: vec![FunctionFrame::new(FunctionType::Script, None)],
            heap,
        }
    }

    fn frame(&mut self) -> &mut FunctionFrame<'src> {
        self.frames.last_mut().expect("compiler always has a current frame")
    }

    fn chunk(&mut self) -> &mut Chunk {
        &mut self.frame().chunk
    }

    // ---- token stream plumbing ----

    fn advance(&mut self) {
        self.previous = self.current;
        loop {
            self.current = self.scanner.scan_token();
            if self.current.kind != TokenKind::Error {
                break;
            }
            self.error_at_current(self.current.lexeme);
        }
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    fn matches(&mut self, kind: TokenKind) -> bool {
        if !self.check(kind) {
            return false;
        }
        self.advance();
        true
    }

    fn consume(&mut self, kind: TokenKind, message: &str) {
        if self.current.kind == kind {
            self.advance();
        } else {
            self.error_at_current(message);
        }
    }

    fn error_at_current(&mut self, message: &str) {
        let token = self.current;
        self.error_at(token, message);
    }

    fn error(&mut self, message: &str) {
        let token = self.previous;
        self.error_at(token, message);
    }

    fn error_at(&mut self, token: Token<'src>, message: &str) {
        if self.panic_mode {
            return;
        }
        self.panic_mode = true;
        eprint!("[line {}] Error", token.line);
        if token.kind == TokenKind::Eof {
            eprint!(" at end");
        } else if token.kind != TokenKind::Error {
            eprint!(" at '{}'", token.lexeme);
        }
        eprintln!(": {message}");
        self.had_error = true;
    }

    fn synchronize(&mut self) {
        self.panic_mode = false;
        while self.current.kind != TokenKind::Eof {
            if self.previous.kind == TokenKind::Semicolon {
                return;
            }
            match self.current.kind {
                TokenKind::Class
                | TokenKind::Fun
                | TokenKind::Var
                | TokenKind::For
                | TokenKind::If
                | TokenKind::While
                | TokenKind::Print
                | TokenKind::Return
                | TokenKind::Switch => return,
                _ => self.advance(),
            }
        }
    }

    // ---- byte / jump emission ----

    fn emit_byte(&mut self, byte: u8) {
        let line = self.previous.line;
        self.chunk().write_byte(byte, line);
    }

    fn emit_bytes(&mut self, a: u8, b: u8) {
        self.emit_byte(a);
        self.emit_byte(b);
    }

    fn emit_index_op(&mut self, index: usize, short_op: u8, long_op: u8) {
        let line = self.previous.line;
        self.chunk().write_index_op(index, line, short_op, long_op);
    }

    fn emit_constant(&mut self, value: Value) {
        let line = self.previous.line;
        self.chunk().write_constant(value, line);
    }

    /// Emit a jump opcode with a placeholder 24-bit operand; returns the
    /// offset of the operand's first byte, to be patched later.
    fn emit_jump(&mut self, opcode: u8) -> usize {
        self.emit_byte(opcode);
        let operand_offset = self.chunk().len();
        self.emit_byte(0xFF);
        self.emit_byte(0xFF);
        self.emit_byte(0xFF);
        operand_offset
    }

    /// Patch a forward jump's operand so it lands just past the current
    /// position.
    fn patch_jump(&mut self, operand_offset: usize) {
        let distance = self.chunk().len() - (operand_offset + 3);
        if distance > 0xFF_FFFF {
            self.error("Too much code to jump over.");
        }
        self.patch_jump_bytes(operand_offset, distance);
    }

    fn patch_jump_bytes(&mut self, operand_offset: usize, distance: usize) {
        let bytes = (distance as u32).to_le_bytes();
        let chunk = self.chunk();
        chunk.patch_byte(operand_offset, bytes[0]);
        chunk.patch_byte(operand_offset + 1, bytes[1]);
        chunk.patch_byte(operand_offset + 2, bytes[2]);
    }

    /// Emit a backward jump to `loop_start`.
    fn emit_loop(&mut self, loop_start: usize) {
        self.emit_byte(op::JUMP_BACK);
        // Distance is measured from just after the 3-byte operand back to
        // the loop start.
        let distance = self.chunk().len() + 3 - loop_start;
        if distance > 0xFF_FFFF {
            self.error("Loop body too large.");
        }
        let bytes = (distance as u32).to_le_bytes();
        self.emit_byte(bytes[0]);
        self.emit_byte(bytes[1]);
        self.emit_byte(bytes[2]);
    }

    // ---- expressions ----

    fn parse_precedence(&mut self, precedence: Precedence) {
        self.advance();
        let Some(prefix) = get_rule(self.previous.kind).prefix else {
            self.error("Expect expression.");
            return;
        };
        let can_assign = precedence <= Precedence::Assignment;
        prefix(self, can_assign);

        while precedence <= get_rule(self.current.kind).precedence {
            self.advance();
            let infix = get_rule(self.previous.kind)
                .infix
                .expect("tokens with a binding infix precedence always have an infix rule");
            infix(self, can_assign);
        }

        if can_assign && self.matches(TokenKind::Equal) {
            self.error("Invalid assignment target.");
        }
    }

    fn expression(&mut self) {
        self.parse_precedence(Precedence::Assignment);
    }

    fn number(&mut self, _can_assign: bool) {
        let value: f64 = self.previous.lexeme.parse().expect("scanner only emits valid number lexemes");
        self.emit_constant(Value::Number(value));
    }

    fn string(&mut self, _can_assign: bool) {
        let interned = self.heap.copy_string(self.previous.lexeme);
        self.emit_constant(Value::Obj(interned));
    }

    fn literal(&mut self, _can_assign: bool) {
        match self.previous.kind {
            TokenKind::False => self.emit_byte(op::FALSE),
            TokenKind::True => self.emit_byte(op::TRUE),
            TokenKind::Nil => self.emit_byte(op::NIL),
            _ => unreachable!("literal() only called for false/true/nil"),
        }
    }

    fn grouping(&mut self, _can_assign: bool) {
        self.expression();
        self.consume(TokenKind::RightParen, "Expect ')' after expression.");
    }

    fn unary(&mut self, _can_assign: bool) {
        let operator = self.previous.kind;
        self.parse_precedence(Precedence::Unary);
        match operator {
            TokenKind::Minus => self.emit_byte(op::NEGATE),
            TokenKind::Bang => self.emit_byte(op::NOT),
            _ => unreachable!("unary() only called for -/!"),
        }
    }

    fn binary(&mut self, _can_assign: bool) {
        let operator = self.previous.kind;
        let rule = get_rule(operator);
        self.parse_precedence(rule.precedence.next());

        match operator {
            TokenKind::Plus => self.emit_byte(op::ADD),
            TokenKind::Minus => self.emit_byte(op::SUBTRACT),
            // Open question decision: `/` maps to OP_DIVIDE (spec.md §9
            // flags a source revision that mapped TOKEN_SLASH to OP_MULT).
            TokenKind::Slash => self.emit_byte(op::DIVIDE),
            TokenKind::Star => self.emit_byte(op::MULTIPLY),
            TokenKind::BangEqual => self.emit_byte(op::NOT_EQUAL),
            TokenKind::EqualEqual => self.emit_byte(op::EQUAL),
            TokenKind::Greater => self.emit_byte(op::GREATER),
            TokenKind::GreaterEqual => self.emit_byte(op::GREATER_EQUAL),
            TokenKind::Less => self.emit_byte(op::LESS),
            TokenKind::LessEqual => self.emit_byte(op::LESS_EQUAL),
            _ => unreachable!("binary() only called for binary operators"),
        }
    }

    fn and(&mut self, _can_assign: bool) {
        let end_jump = self.emit_jump(op::JUMP_IF_FALSE);
        self.emit_byte(op::POP);
        self.parse_precedence(Precedence::And);
        self.patch_jump(end_jump);
    }

    fn or(&mut self, _can_assign: bool) {
        let end_jump = self.emit_jump(op::JUMP_IF_TRUE);
        self.emit_byte(op::POP);
        self.parse_precedence(Precedence::Or);
        self.patch_jump(end_jump);
    }

    fn call(&mut self, _can_assign: bool) {
        let arg_count = self.argument_list();
        self.emit_bytes(op::CALL, arg_count);
    }

    fn argument_list(&mut self) -> u8 {
        let mut count: usize = 0;
        if !self.check(TokenKind::RightParen) {
            loop {
                self.expression();
                if count == MAX_ARGUMENTS {
                    self.error("Can't have more than 255 arguments.");
                }
                count += 1;
                if !self.matches(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.consume(TokenKind::RightParen, "Expect ')' after arguments.");
        count as u8
    }

    fn variable(&mut self, can_assign: bool) {
        self.named_variable(self.previous, can_assign);
    }

    fn named_variable(&mut self, name: Token<'src>, can_assign: bool) {
        let (get_short, get_long, set_short, set_long, index) =
            if let Some(slot) = self.resolve_local(name.lexeme) {
                (op::GET_LOCAL, op::GET_LOCAL_LONG, op::SET_LOCAL, op::SET_LOCAL_LONG, slot)
            } else {
                let index = self.identifier_constant(name.lexeme);
                (op::GET_GLOBAL, op::GET_GLOBAL_LONG, op::SET_GLOBAL, op::SET_GLOBAL_LONG, index)
            };

        if can_assign && self.matches(TokenKind::Equal) {
            self.expression();
            self.emit_index_op(index, set_short, set_long);
        } else {
            self.emit_index_op(index, get_short, get_long);
        }
    }

    /// Scan the current frame's locals from the top down; the first name
    /// match wins (inner shadows outer).
    fn resolve_local(&mut self, name: &str) -> Option<usize> {
        let frame = self.frame();
        for (slot, local) in frame.locals.iter().enumerate().rev() {
            if local.name == name {
                if local.depth == UNINITIALIZED {
                    self.error("Can't use variable in its own initializer.");
                }
                return Some(slot);
            }
        }
        None
    }

    fn identifier_constant(&mut self, name: &str) -> usize {
        let interned = self.heap.copy_string(name);
        self.chunk().add_constant(Value::Obj(interned))
    }

    // ---- scope / local declarations ----

    fn begin_scope(&mut self) {
        self.frame().scope_depth += 1;
    }

    fn end_scope(&mut self) {
        let depth = self.frame().scope_depth - 1;
        self.frame().scope_depth = depth;

        let mut popped = 0u8;
        while let Some(local) = self.frame().locals.last() {
            if local.depth <= depth {
                break;
            }
            self.frame().locals.pop();
            popped += 1;
        }
        if popped == 1 {
            self.emit_byte(op::POP);
        } else if popped > 1 {
            self.emit_bytes(op::POPN, popped);
        }
    }

    fn declare_local(&mut self, name: &'src str) {
        let depth = self.frame().scope_depth;
        if depth == 0 {
            return;
        }

        let frame = self.frame();
        for local in frame.locals.iter().rev() {
            if local.depth != UNINITIALIZED && local.depth < depth {
                break;
            }
            if local.name == name {
                self.error("Already a variable with this name in this scope.");
                return;
            }
        }

        if frame.locals.len() >= MAX_LOCALS {
            self.error("Too many local variables in function.");
            return;
        }
        frame.locals.push(Local { name, depth: UNINITIALIZED });
    }

    fn define_local(&mut self) {
        let depth = self.frame().scope_depth;
        if let Some(local) = self.frame().locals.last_mut() {
            local.depth = depth;
        }
    }

    fn parse_variable(&mut self, message: &str) -> usize {
        self.consume(TokenKind::Identifier, message);
        let name = self.previous.lexeme;

        if self.frame().scope_depth > 0 {
            self.declare_local(name);
            return 0;
        }
        self.identifier_constant(name)
    }

    fn define_variable(&mut self, index: usize) {
        if self.frame().scope_depth > 0 {
            self.define_local();
            return;
        }
        self.emit_index_op(index, op::DEFINE_GLOBAL, op::DEFINE_GLOBAL_LONG);
    }

    // ---- statements ----

    fn declaration(&mut self) {
        if self.matches(TokenKind::Fun) {
            self.fun_declaration();
        } else if self.matches(TokenKind::Var) {
            self.var_declaration();
        } else {
            self.statement();
        }

        if self.panic_mode {
            self.synchronize();
        }
    }

    fn fun_declaration(&mut self) {
        let index = self.parse_variable("Expect function name.");
        // Marked initialized before the body compiles so recursive calls
        // to the function's own name resolve (spec.md §4.4, §9).
        if self.frame().scope_depth > 0 {
            self.define_local();
        }
        self.function(FunctionType::Function);
        self.define_variable(index);
    }

    fn function(&mut self, function_type: FunctionType) {
        let name_lexeme = self.previous.lexeme;
        let name = self.heap.copy_string(name_lexeme);
        self.frames.push(FunctionFrame::new(function_type, Some(name)));
        self.begin_scope();

        self.consume(TokenKind::LeftParen, "Expect '(' after function name.");
        if !self.check(TokenKind::RightParen) {
            loop {
                let frame = self.frame();
                if frame.arity as usize == MAX_PARAMETERS {
                    self.error_at_current("Can't have more than 255 parameters.");
                } else {
                    self.frame().arity += 1;
                }
                let index = self.parse_variable("Expect parameter name.");
                self.define_variable(index);
                if !self.matches(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.consume(TokenKind::RightParen, "Expect ')' after parameters.");
        self.consume(TokenKind::LeftBrace, "Expect '{' before function body.");
        self.block();

        let compiled = self.end_function();
        let function = ObjFunction { arity: compiled.arity, chunk: compiled.chunk, name: compiled.name };
        let function_obj = self.heap.alloc_function(function);

        let enclosing_line = self.previous.line;
        let index = self.frame().chunk.add_constant(Value::Obj(function_obj));
        self.frame().chunk.write_index_op(index, enclosing_line, op::CONSTANT, op::CONSTANT_LONG);
    }

    /// Pop the innermost frame, emitting the implicit `nil; return` every
    /// function body ends with, and hand back its finished pieces.
    fn end_function(&mut self) -> FunctionFrame<'src> {
        self.emit_byte(op::NIL);
        self.emit_byte(op::RETURN);
        self.frames.pop().expect("end_function always follows a pushed frame")
    }

    fn var_declaration(&mut self) {
        let index = self.parse_variable("Expect variable name.");

        if self.matches(TokenKind::Equal) {
            self.expression();
        } else {
            self.emit_byte(op::NIL);
        }
        self.consume(TokenKind::Semicolon, "Expect ';' after variable declaration.");
        self.define_variable(index);
    }

    fn statement(&mut self) {
        if self.matches(TokenKind::Print) {
            self.print_statement();
        } else if self.matches(TokenKind::If) {
            self.if_statement();
        } else if self.matches(TokenKind::While) {
            self.while_statement();
        } else if self.matches(TokenKind::For) {
            self.for_statement();
        } else if self.matches(TokenKind::Switch) {
            self.switch_statement();
        } else if self.matches(TokenKind::Continue) {
            self.continue_statement();
        } else if self.matches(TokenKind::Return) {
            self.return_statement();
        } else if self.matches(TokenKind::LeftBrace) {
            self.begin_scope();
            self.block();
            self.end_scope();
        } else {
            self.expression_statement();
        }
    }

    fn print_statement(&mut self) {
        self.expression();
        self.consume(TokenKind::Semicolon, "Expect ';' after value.");
        self.emit_byte(op::PRINT);
    }

    fn expression_statement(&mut self) {
        self.expression();
        self.consume(TokenKind::Semicolon, "Expect ';' after expression.");
        self.emit_byte(op::POP);
    }

    fn block(&mut self) {
        while !self.check(TokenKind::RightBrace) && !self.check(TokenKind::Eof) {
            self.declaration();
        }
        self.consume(TokenKind::RightBrace, "Expect '}' after block.");
    }

    fn if_statement(&mut self) {
        self.consume(TokenKind::LeftParen, "Expect '(' after 'if'.");
        self.expression();
        self.consume(TokenKind::RightParen, "Expect ')' after condition.");

        let then_jump = self.emit_jump(op::JUMP_IF_FALSE);
        self.emit_byte(op::POP);
        self.statement();

        let else_jump = self.emit_jump(op::JUMP);
        self.patch_jump(then_jump);
        self.emit_byte(op::POP);

        if self.matches(TokenKind::Else) {
            self.statement();
        }
        self.patch_jump(else_jump);
    }

    fn while_statement(&mut self) {
        let loop_start = self.chunk().len();
        let body_scope_depth = self.frame().scope_depth;
        self.frame().loops.push(LoopContext { start_offset: loop_start, body_scope_depth });

        self.consume(TokenKind::LeftParen, "Expect '(' after 'while'.");
        self.expression();
        self.consume(TokenKind::RightParen, "Expect ')' after condition.");

        let exit_jump = self.emit_jump(op::JUMP_IF_FALSE);
        self.emit_byte(op::POP);
        self.statement();
        self.emit_loop(loop_start);

        self.patch_jump(exit_jump);
        self.emit_byte(op::POP);
        self.frame().loops.pop();
    }

    /// Classic C-style `for`. Follows spec.md §9's cleaner header form
    /// (`cond; jump_if_false end; body; incr; jump header; end:`) rather
    /// than the source's condition-duplicating layout — observably
    /// identical, per the design note.
    fn for_statement(&mut self) {
        self.begin_scope();
        self.consume(TokenKind::LeftParen, "Expect '(' after 'for'.");

        if self.matches(TokenKind::Semicolon) {
            // no initializer
        } else if self.matches(TokenKind::Var) {
            self.var_declaration();
        } else {
            self.expression_statement();
        }

        let mut loop_start = self.chunk().len();
        let mut exit_jump: Option<usize> = None;
        if !self.matches(TokenKind::Semicolon) {
            self.expression();
            self.consume(TokenKind::Semicolon, "Expect ';' after loop condition.");
            exit_jump = Some(self.emit_jump(op::JUMP_IF_FALSE));
            self.emit_byte(op::POP);
        }

        if !self.matches(TokenKind::RightParen) {
            let body_jump = self.emit_jump(op::JUMP);
            let increment_start = self.chunk().len();
            self.expression();
            self.emit_byte(op::POP);
            self.consume(TokenKind::RightParen, "Expect ')' after for clauses.");

            self.emit_loop(loop_start);
            loop_start = increment_start;
            self.patch_jump(body_jump);
        }

        let body_scope_depth = self.frame().scope_depth;
        self.frame().loops.push(LoopContext { start_offset: loop_start, body_scope_depth });

        self.statement();
        self.emit_loop(loop_start);

        if let Some(exit_jump) = exit_jump {
            self.patch_jump(exit_jump);
            self.emit_byte(op::POP);
        }

        self.frame().loops.pop();
        self.end_scope();
    }

    /// `switch (expr) { case a: ...; case b: ...; default: ...; }`. The
    /// switched value lives in a synthetic local for the duration of the
    /// switch so it needn't be re-evaluated per case (spec.md §4.4).
    fn switch_statement(&mut self) {
        self.begin_scope();
        self.consume(TokenKind::LeftParen, "Expect '(' after 'switch'.");
        self.expression();
        self.consume(TokenKind::RightParen, "Expect ')' after switch value.");

        // The switched value becomes local slot `switched_slot`; declare
        // it under a name no source identifier can spell.
        self.declare_local("@switch");
        self.define_local();
        let switched_slot = self.frame().locals.len() - 1;

        self.consume(TokenKind::LeftBrace, "Expect '{' before switch body.");

        let mut end_jumps: Vec<usize> = Vec::new();
        let mut next_case_jump: Option<usize> = None;
        let mut seen_default = false;
        let mut seen_any_case = false;

        while !self.check(TokenKind::RightBrace) && !self.check(TokenKind::Eof) {
            if self.matches(TokenKind::Case) {
                if let Some(jump) = next_case_jump.take() {
                    self.patch_jump(jump);
                    self.emit_byte(op::POP);
                }
                seen_any_case = true;

                self.expression();
                self.emit_index_op(switched_slot, op::GET_LOCAL, op::GET_LOCAL_LONG);
                self.emit_byte(op::EQUAL);
                self.consume(TokenKind::Colon, "Expect ':' after case value.");

                next_case_jump = Some(self.emit_jump(op::JUMP_IF_FALSE));
                self.emit_byte(op::POP);

                while !self.check(TokenKind::Case)
                    && !self.check(TokenKind::Default)
                    && !self.check(TokenKind::RightBrace)
                    && !self.check(TokenKind::Eof)
                {
                    self.statement();
                }
                end_jumps.push(self.emit_jump(op::JUMP));
            } else if self.matches(TokenKind::Default) {
                if seen_default {
                    self.error("Can't have more than one default case.");
                }
                seen_default = true;
                if let Some(jump) = next_case_jump.take() {
                    self.patch_jump(jump);
                    self.emit_byte(op::POP);
                }
                self.consume(TokenKind::Colon, "Expect ':' after 'default'.");

                while !self.check(TokenKind::Case)
                    && !self.check(TokenKind::Default)
                    && !self.check(TokenKind::RightBrace)
                    && !self.check(TokenKind::Eof)
                {
                    self.statement();
                }
                end_jumps.push(self.emit_jump(op::JUMP));
            } else {
                self.error_at_current("Expect 'case' or 'default'.");
                self.advance();
            }
        }

        if !seen_any_case && !seen_default {
            self.error("Switch statement must have at least one case.");
        }

        if let Some(jump) = next_case_jump {
            self.patch_jump(jump);
            self.emit_byte(op::POP);
        }

        self.consume(TokenKind::RightBrace, "Expect '}' after switch body.");
        for jump in end_jumps {
            self.patch_jump(jump);
        }

        self.end_scope();
    }

    fn continue_statement(&mut self) {
        let Some(&LoopContext { start_offset, body_scope_depth }) = self.frame().loops.last() else {
            self.error("Can't use 'continue' outside of a loop.");
            self.consume(TokenKind::Semicolon, "Expect ';' after 'continue'.");
            return;
        };

        let popped = self
            .frame()
            .locals
            .iter()
            .rev()
            .take_while(|local| local.depth >= body_scope_depth)
            .count();
        if popped == 1 {
            self.emit_byte(op::POP);
        } else if popped > 1 {
            self.emit_bytes(op::POPN, popped as u8);
        }

        self.emit_loop(start_offset);
        self.consume(TokenKind::Semicolon, "Expect ';' after 'continue'.");
    }

    fn return_statement(&mut self) {
        if self.frame().function_type == FunctionType::Script {
            self.error("Can't return from top-level code.");
        }

        if self.matches(TokenKind::Semicolon) {
            self.emit_byte(op::NIL);
            self.emit_byte(op::RETURN);
        } else {
            self.expression();
            self.consume(TokenKind::Semicolon, "Expect ';' after return value.");
            self.emit_byte(op::RETURN);
        }
    }
}

/// Compile `source` into a top-level script `Function`. Returns `None`
/// if any compile error was reported (spec.md §7: "Compile errors
/// suppress execution").
#[must_use]
pub fn compile(source: &str, heap: &mut Heap) -> Option<Rc<Object>> {
    let mut compiler = Compiler::new(source, heap);
    compiler.advance();
    while !compiler.matches(TokenKind::Eof) {
        compiler.declaration();
    }

    let had_error = compiler.had_error;
    let script_frame = compiler.end_function();
    if had_error {
        return None;
    }

    let function = ObjFunction { arity: 0, chunk: script_frame.chunk, name: None };
    Some(compiler.heap.alloc_function(function))
}
