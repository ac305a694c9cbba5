//! Expression parsing: precedence climbing over the operator table.
//!
//! `parse_expr_at(p)` parses its operands at level `p - 1` and then
//! consumes operators of exactly level `p`, honoring the level's
//! associativity: left iterates, right recurses at the same level, none
//! admits at most one operator. Level 1 is the prefix group, level 0 a
//! value expression.
//!
//! Parentheses group unless they contain a top-level comma (or a trailing
//! comma), in which case they build a tuple. `(e)` is exactly `e`.

use std::cell::Cell;

use tarn_base::Result;

use crate::ast::{Expr, ExprKind};
use crate::operator::{self, Associativity};
use crate::parser::Parser;
use crate::token::TokenKind;

impl<'a, 'c> Parser<'a, 'c> {
    /// Parses a full expression (loosest precedence level).
    pub fn parse_expr(&mut self) -> Result<&'a Expr<'a>> {
        self.parse_expr_at(operator::size())
    }

    pub(crate) fn parse_expr_at(&mut self, p: usize) -> Result<&'a Expr<'a>> {
        match p {
            0 => self.parse_value_expr(),
            1 => self.parse_unary_expr(),
            _ => self.parse_binary_expr(p),
        }
    }

    /// Whether the current token is an operator of exactly level `p`.
    fn at_level(&self, p: usize) -> bool {
        self.check(TokenKind::Operator) && operator::level(p).contains(self.lexeme(self.token()))
    }

    fn parse_binary_expr(&mut self, p: usize) -> Result<&'a Expr<'a>> {
        match operator::associativity(p) {
            Associativity::Left => self.parse_infix_left(p),
            Associativity::Right => self.parse_infix_right(p),
            Associativity::None => self.parse_infix_none(p),
        }
    }

    fn parse_infix_left(&mut self, p: usize) -> Result<&'a Expr<'a>> {
        let mut left = self.parse_expr_at(p - 1)?;
        while self.at_level(p) {
            let op = self.advance();
            let right = self.parse_expr_at(p - 1)?;
            let span = left.span.merge(right.span);
            left = self.ctx.alloc_expr(Expr::new(
                ExprKind::Binary { left, op: op.lexeme, right },
                span,
            ));
        }
        Ok(left)
    }

    fn parse_infix_right(&mut self, p: usize) -> Result<&'a Expr<'a>> {
        let left = self.parse_expr_at(p - 1)?;
        if !self.at_level(p) {
            return Ok(left);
        }
        let op = self.advance();
        let right = self.parse_expr_at(p)?;
        let span = left.span.merge(right.span);
        Ok(self.ctx.alloc_expr(Expr::new(
            ExprKind::Binary { left, op: op.lexeme, right },
            span,
        )))
    }

    fn parse_infix_none(&mut self, p: usize) -> Result<&'a Expr<'a>> {
        let left = self.parse_expr_at(p - 1)?;
        if !self.at_level(p) {
            return Ok(left);
        }
        let op = self.advance();
        let right = self.parse_expr_at(p - 1)?;
        if self.at_level(p) {
            return Err(self.error_here(format!(
                "operators of the {} group cannot be chained",
                operator::level(p).name
            )));
        }
        let span = left.span.merge(right.span);
        Ok(self.ctx.alloc_expr(Expr::new(
            ExprKind::Binary { left, op: op.lexeme, right },
            span,
        )))
    }

    fn parse_unary_expr(&mut self) -> Result<&'a Expr<'a>> {
        if !self.at_level(1) {
            return self.parse_value_expr();
        }
        let op = self.advance();
        let operand = self.parse_value_expr()?;
        let span = op.span.merge(operand.span);
        Ok(self.ctx.alloc_expr(Expr::new(
            ExprKind::Unary { op: op.lexeme, operand },
            span,
        )))
    }

    pub(crate) fn parse_value_expr(&mut self) -> Result<&'a Expr<'a>> {
        match self.token().kind {
            TokenKind::Identifier => self.parse_identifier_call_or_accessor(),
            TokenKind::IntegerLiteral => {
                let tok = self.advance();
                let value: i64 = self
                    .lexeme(tok)
                    .parse()
                    .map_err(|_| self.error_at("integer literal out of range", tok.span))?;
                Ok(self
                    .ctx
                    .alloc_expr(Expr::new(ExprKind::IntegerLit(value), tok.span)))
            }
            TokenKind::DoubleLiteral => {
                let tok = self.advance();
                let value: f64 = self
                    .lexeme(tok)
                    .parse()
                    .map_err(|_| self.error_at("malformed double literal", tok.span))?;
                Ok(self
                    .ctx
                    .alloc_expr(Expr::new(ExprKind::DoubleLit(value), tok.span)))
            }
            TokenKind::CharacterLiteral => {
                let tok = self.advance();
                let byte = self.lexeme(tok).bytes().next().unwrap_or(0);
                Ok(self
                    .ctx
                    .alloc_expr(Expr::new(ExprKind::CharacterLit(byte), tok.span)))
            }
            TokenKind::StringLiteral => {
                let tok = self.advance();
                Ok(self
                    .ctx
                    .alloc_expr(Expr::new(ExprKind::StringLit(tok.lexeme), tok.span)))
            }
            TokenKind::KwTrue | TokenKind::KwFalse => {
                let tok = self.advance();
                let value = tok.kind == TokenKind::KwTrue;
                Ok(self
                    .ctx
                    .alloc_expr(Expr::new(ExprKind::BoolLit(value), tok.span)))
            }
            TokenKind::LSquare => self.parse_list_expr(),
            TokenKind::LParen => self.parse_tuple_or_grouping(),
            _ => Err(self.error_here(format!(
                "expected value but got {}",
                self.describe_current()
            ))),
        }
    }

    fn parse_identifier_call_or_accessor(&mut self) -> Result<&'a Expr<'a>> {
        let id = self.expect(TokenKind::Identifier, "identifier")?;
        let mut expr: &'a Expr<'a> = if self.check(TokenKind::LParen) {
            let args = self.parse_call_arguments()?;
            let end = self.previous_span();
            self.ctx.alloc_expr(Expr::new(
                ExprKind::Call {
                    callee: id.lexeme,
                    callee_decl: Cell::new(None),
                    args,
                },
                id.span.merge(end),
            ))
        } else {
            self.ctx.alloc_expr(Expr::new(
                ExprKind::Identifier {
                    name: id.lexeme,
                    decl: Cell::new(None),
                },
                id.span,
            ))
        };
        while self.check(TokenKind::LSquare) {
            self.advance();
            let index = self.parse_expr()?;
            let close = self.expect(TokenKind::RSquare, "']'")?;
            let span = expr.span.merge(close.span);
            expr = self.ctx.alloc_expr(Expr::new(
                ExprKind::Accessor {
                    aggregate: expr,
                    index,
                    member_index: Cell::new(None),
                },
                span,
            ));
        }
        Ok(expr)
    }

    fn parse_call_arguments(&mut self) -> Result<&'a [&'a Expr<'a>]> {
        self.expect(TokenKind::LParen, "'('")?;
        if self.eat(TokenKind::RParen).is_some() {
            return Ok(self.ctx.alloc_expr_list(Vec::new()));
        }
        let args = self.parse_expr_list()?;
        self.expect(TokenKind::RParen, "')'")?;
        Ok(self.ctx.alloc_expr_list(args))
    }

    /// A comma-separated expression list, parsed iteratively into a vector.
    pub(crate) fn parse_expr_list(&mut self) -> Result<Vec<&'a Expr<'a>>> {
        let mut elements = vec![self.parse_expr()?];
        while self.eat(TokenKind::Comma).is_some() {
            elements.push(self.parse_expr()?);
        }
        Ok(elements)
    }

    fn parse_list_expr(&mut self) -> Result<&'a Expr<'a>> {
        let open = self.expect(TokenKind::LSquare, "'['")?;
        let elements = self.parse_expr_list()?;
        let close = self.expect(TokenKind::RSquare, "']'")?;
        Ok(self.ctx.alloc_expr(Expr::new(
            ExprKind::List {
                elements: self.ctx.alloc_expr_list(elements),
            },
            open.span.merge(close.span),
        )))
    }

    /// `(e)` is grouping; a top-level or trailing comma builds a tuple.
    fn parse_tuple_or_grouping(&mut self) -> Result<&'a Expr<'a>> {
        let open = self.expect(TokenKind::LParen, "'('")?;
        let first = self.parse_expr()?;
        if self.eat(TokenKind::RParen).is_some() {
            return Ok(first);
        }
        let mut elements = vec![first];
        while self.eat(TokenKind::Comma).is_some() {
            if self.check(TokenKind::RParen) {
                break;
            }
            elements.push(self.parse_expr()?);
        }
        let close = self.expect(TokenKind::RParen, "')'")?;
        Ok(self.ctx.alloc_expr(Expr::new(
            ExprKind::Tuple {
                elements: self.ctx.alloc_expr_list(elements),
            },
            open.span.merge(close.span),
        )))
    }

    fn previous_span(&self) -> tarn_base::Span {
        if self.pos == 0 {
            self.token().span
        } else {
            self.tokens[self.pos - 1].span
        }
    }
}
