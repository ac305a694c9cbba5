//! Hand-written recursive descent parser.
//!
//! One entry point per nonterminal: [`Parser::parse_program`],
//! [`Parser::parse_decl`], [`Parser::parse_stmt`], [`Parser::parse_expr`],
//! [`Parser::parse_type`]. Each consumes exactly the tokens of its
//! production and leaves the stream positioned on the following token. The
//! first syntax error aborts with a located [`CompileError`]; no partial
//! nodes are ever built.
//!
//! Expression parsing is precedence climbing over the table in
//! [`crate::operator`]; see [`expr`]. Statement lists skip redundant
//! newlines at entry and between statements, and a closing brace may stand
//! in for the terminating newline.

mod decl;
mod expr;
mod stmt;
mod types;

use tarn_base::{CompileError, Result, Span};

use crate::ast::{AstContext, Decl, Program};
use crate::context::CompilationContext;
use crate::token::{Token, TokenKind};

/// Parser state: the token stream with its position, the AST arenas, and
/// the threaded compilation context (interner and type table).
pub struct Parser<'a, 'c> {
    tokens: Vec<Token>,
    pos: usize,
    ctx: AstContext<'a>,
    comp: &'c mut CompilationContext,
}

impl<'a, 'c> Parser<'a, 'c> {
    /// Takes a token stream ending in the `Eof` sentinel, as produced by
    /// [`crate::Lexer::tokenize`].
    pub fn new(tokens: Vec<Token>, ctx: AstContext<'a>, comp: &'c mut CompilationContext) -> Self {
        debug_assert!(matches!(
            tokens.last().map(|t| t.kind),
            Some(TokenKind::Eof)
        ));
        Parser {
            tokens,
            pos: 0,
            ctx,
            comp,
        }
    }

    /// `program := (decl | newline)* eof`
    pub fn parse_program(&mut self) -> Result<Program<'a>> {
        let mut decls: Vec<&'a Decl<'a>> = Vec::new();
        loop {
            self.skip_newlines();
            if self.check(TokenKind::Eof) {
                break;
            }
            decls.push(self.parse_decl()?);
            self.terminator()?;
        }
        Ok(Program {
            decls: self.ctx.alloc_decl_list(decls),
        })
    }

    // ---- token stream primitives ----

    pub(crate) fn token(&self) -> Token {
        self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    pub(crate) fn advance(&mut self) -> Token {
        let tok = self.token();
        if tok.kind != TokenKind::Eof {
            self.pos += 1;
        }
        tok
    }

    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        self.token().kind == kind
    }

    /// Consumes and returns the current token if it has the given kind.
    pub(crate) fn eat(&mut self, kind: TokenKind) -> Option<Token> {
        if self.check(kind) {
            Some(self.advance())
        } else {
            None
        }
    }

    pub(crate) fn expect(&mut self, kind: TokenKind, what: &str) -> Result<Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.error_here(format!(
                "expected {} but got {}",
                what,
                self.describe_current()
            )))
        }
    }

    pub(crate) fn skip_newlines(&mut self) {
        while self.check(TokenKind::Newline) {
            self.advance();
        }
    }

    /// A statement/declaration terminator: a newline, or a closing brace or
    /// end of input standing in for one.
    pub(crate) fn terminator(&mut self) -> Result<()> {
        if self.eat(TokenKind::Newline).is_some()
            || self.check(TokenKind::RBrace)
            || self.check(TokenKind::Eof)
        {
            Ok(())
        } else {
            Err(self.error_here(format!(
                "expected newline but got {}",
                self.describe_current()
            )))
        }
    }

    // ---- lexeme helpers ----

    pub(crate) fn lexeme(&self, tok: Token) -> &str {
        self.comp.interner.resolve(tok.lexeme)
    }

    /// Whether the current token is the exact operator `text`.
    pub(crate) fn at_op(&self, text: &str) -> bool {
        self.check(TokenKind::Operator) && self.lexeme(self.token()) == text
    }

    pub(crate) fn eat_op(&mut self, text: &str) -> bool {
        if self.at_op(text) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn expect_op(&mut self, text: &str) -> Result<Token> {
        if self.at_op(text) {
            Ok(self.advance())
        } else {
            Err(self.error_here(format!(
                "expected '{}' but got {}",
                text,
                self.describe_current()
            )))
        }
    }

    // ---- error helpers ----

    pub(crate) fn describe_current(&self) -> String {
        let tok = self.token();
        match tok.kind {
            TokenKind::Identifier
            | TokenKind::Operator
            | TokenKind::IntegerLiteral
            | TokenKind::DoubleLiteral => format!("'{}'", self.lexeme(tok)),
            other => other.describe().to_string(),
        }
    }

    pub(crate) fn error_here(&self, message: impl Into<String>) -> CompileError {
        CompileError::new(message, self.token().span)
    }

    pub(crate) fn error_at(&self, message: impl Into<String>, span: Span) -> CompileError {
        CompileError::new(message, span)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast_arenas;
    use crate::lexer::Lexer;

    fn parse_ok(source: &str) -> bool {
        let mut comp = CompilationContext::new();
        let tokens = Lexer::new(source, &mut comp.interner).tokenize().unwrap();
        ast_arenas!(ctx);
        let mut parser = Parser::new(tokens, ctx, &mut comp);
        parser.parse_program().is_ok()
    }

    #[test]
    fn empty_program_parses() {
        assert!(parse_ok(""));
        assert!(parse_ok("\n\n\n"));
    }

    #[test]
    fn top_level_declarations_parse() {
        assert!(parse_ok("let a: Integer = 5\n"));
        assert!(parse_ok("func f() -> Integer {\n return 1\n }\n"));
    }

    #[test]
    fn missing_terminator_is_rejected() {
        assert!(!parse_ok("let a = 1 let b = 2\n"));
    }

    #[test]
    fn top_level_expressions_are_rejected() {
        assert!(!parse_ok("1 + 2\n"));
    }
}
