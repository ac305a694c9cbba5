//! Statement parsing.
//!
//! Newlines terminate declaration and expression statements; block
//! statements end at their closing brace and need no terminator of their
//! own. Statement lists skip leading and separating newlines and collect
//! into flat vectors.

use tarn_base::Result;

use crate::ast::{Block, Clause, Stmt, StmtKind};
use crate::parser::Parser;
use crate::token::TokenKind;

impl<'a, 'c> Parser<'a, 'c> {
    pub fn parse_stmt(&mut self) -> Result<&'a Stmt<'a>> {
        self.skip_newlines();
        match self.token().kind {
            TokenKind::LBrace => {
                let block = self.parse_block()?;
                let span = block.span;
                Ok(self.ctx.alloc_stmt(Stmt::new(StmtKind::Compound(block), span)))
            }
            TokenKind::KwIf => self.parse_conditional(),
            TokenKind::KwWhile => self.parse_while(),
            TokenKind::KwReturn => self.parse_return(),
            TokenKind::KwLet
            | TokenKind::KwVar
            | TokenKind::KwFunc
            | TokenKind::KwExtern
            | TokenKind::KwTypealias => {
                let decl = self.parse_decl()?;
                self.terminator()?;
                let span = decl.span;
                Ok(self.ctx.alloc_stmt(Stmt::new(StmtKind::Decl(decl), span)))
            }
            _ => {
                let expr = self.parse_expr()?;
                self.terminator()?;
                let span = expr.span;
                Ok(self.ctx.alloc_stmt(Stmt::new(StmtKind::Expr(expr), span)))
            }
        }
    }

    /// `block := '{' newline* (stmt (newline+ stmt)*)? newline* '}'`
    pub fn parse_block(&mut self) -> Result<&'a Block<'a>> {
        let open = self.expect(TokenKind::LBrace, "'{'")?;
        self.skip_newlines();
        let mut stmts = Vec::new();
        while !self.check(TokenKind::RBrace) {
            if self.check(TokenKind::Eof) {
                return Err(self.error_here("expected '}' but got end of input"));
            }
            stmts.push(self.parse_stmt()?);
            self.skip_newlines();
        }
        let close = self.expect(TokenKind::RBrace, "'}'")?;
        Ok(self.ctx.alloc_block(Block::new(
            self.ctx.alloc_stmt_list(stmts),
            open.span.merge(close.span),
        )))
    }

    /// `if cond block ('else' 'if' cond block)* ('else' block)?`, collected
    /// into a single conditional node.
    fn parse_conditional(&mut self) -> Result<&'a Stmt<'a>> {
        let if_tok = self.expect(TokenKind::KwIf, "'if'")?;
        let mut clauses = Vec::new();
        let cond = self.parse_expr()?;
        let body = self.parse_block()?;
        let mut end = body.span;
        clauses.push(Clause { cond: Some(cond), body });
        while self.eat(TokenKind::KwElse).is_some() {
            if self.eat(TokenKind::KwIf).is_some() {
                let cond = self.parse_expr()?;
                let body = self.parse_block()?;
                end = body.span;
                clauses.push(Clause { cond: Some(cond), body });
            } else {
                let body = self.parse_block()?;
                end = body.span;
                clauses.push(Clause { cond: None, body });
                break;
            }
        }
        Ok(self.ctx.alloc_stmt(Stmt::new(
            StmtKind::Conditional {
                clauses: self.ctx.alloc_clauses(clauses),
            },
            if_tok.span.merge(end),
        )))
    }

    fn parse_while(&mut self) -> Result<&'a Stmt<'a>> {
        let while_tok = self.expect(TokenKind::KwWhile, "'while'")?;
        let cond = self.parse_expr()?;
        let body = self.parse_block()?;
        let span = while_tok.span.merge(body.span);
        Ok(self
            .ctx
            .alloc_stmt(Stmt::new(StmtKind::While { cond, body }, span)))
    }

    /// `return expr?` — the expression is absent when a newline, closing
    /// brace, or end of input follows immediately.
    fn parse_return(&mut self) -> Result<&'a Stmt<'a>> {
        let ret_tok = self.expect(TokenKind::KwReturn, "'return'")?;
        let expr = if self.check(TokenKind::Newline)
            || self.check(TokenKind::RBrace)
            || self.check(TokenKind::Eof)
        {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.terminator()?;
        let span = expr
            .map(|e| ret_tok.span.merge(e.span))
            .unwrap_or(ret_tok.span);
        Ok(self.ctx.alloc_stmt(Stmt::new(StmtKind::Return(expr), span)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast_arenas;
    use crate::context::CompilationContext;
    use crate::lexer::Lexer;

    fn with_stmt<R>(source: &str, f: impl FnOnce(Result<&Stmt<'_>>) -> R) -> R {
        let mut comp = CompilationContext::new();
        let tokens = Lexer::new(source, &mut comp.interner).tokenize().unwrap();
        ast_arenas!(ctx);
        let mut parser = Parser::new(tokens, ctx, &mut comp);
        f(parser.parse_stmt())
    }

    #[test]
    fn declaration_statement_requires_a_newline() {
        with_stmt("let a: Integer = 5\n", |r| assert!(r.is_ok()));
        with_stmt("let a: Integer = 5 let", |r| assert!(r.is_err()));
    }

    #[test]
    fn closing_brace_substitutes_for_the_newline() {
        with_stmt("{\nlet a: Integer = 5\nreturn a\n}", |r| {
            let stmt = r.unwrap();
            let StmtKind::Compound(block) = &stmt.kind else {
                panic!("expected compound statement");
            };
            assert_eq!(block.stmts.len(), 2);
        });
        with_stmt("{ return a }", |r| assert!(r.is_ok()));
    }

    #[test]
    fn empty_blocks_parse() {
        with_stmt("{\n\n}", |r| {
            let stmt = r.unwrap();
            let StmtKind::Compound(block) = &stmt.kind else {
                panic!("expected compound statement");
            };
            assert!(block.stmts.is_empty());
        });
    }

    #[test]
    fn redundant_newlines_between_statements_are_skipped() {
        with_stmt("{\n\n\nlet a = 1\n\n\nlet b = 2\n\n}", |r| {
            let stmt = r.unwrap();
            let StmtKind::Compound(block) = &stmt.kind else {
                panic!("expected compound statement");
            };
            assert_eq!(block.stmts.len(), 2);
        });
    }

    #[test]
    fn conditional_chain_collects_all_clauses() {
        with_stmt(
            "if a { return 1\n } else if b { return 2\n } else { return 3\n }",
            |r| {
                let stmt = r.unwrap();
                let StmtKind::Conditional { clauses } = &stmt.kind else {
                    panic!("expected conditional");
                };
                assert_eq!(clauses.len(), 3);
                assert!(clauses[0].cond.is_some());
                assert!(clauses[1].cond.is_some());
                assert!(clauses[2].cond.is_none());
            },
        );
    }

    #[test]
    fn if_without_else_has_one_clause() {
        with_stmt("if a { return 1\n }", |r| {
            let stmt = r.unwrap();
            let StmtKind::Conditional { clauses } = &stmt.kind else {
                panic!("expected conditional");
            };
            assert_eq!(clauses.len(), 1);
        });
    }

    #[test]
    fn return_without_expression() {
        with_stmt("return\n", |r| {
            let stmt = r.unwrap();
            assert!(matches!(stmt.kind, StmtKind::Return(None)));
        });
    }

    #[test]
    fn while_statement_parses() {
        with_stmt("while i < n { i = i + 1\n }", |r| {
            assert!(matches!(r.unwrap().kind, StmtKind::While { .. }));
        });
    }

    #[test]
    fn unterminated_block_reports_eof() {
        with_stmt("{ let a = 1\n", |r| {
            let err = r.unwrap_err();
            assert!(err.message.contains("'}'"));
        });
    }
}
