//! Declaration parsing.
//!
//! ```text
//! decl        := let_decl | var_decl | func_decl | extern_func | typealias
//! let_decl    := 'let' ident (':' type)? '=' expr
//! var_decl    := 'var' ident (':' type '=' expr | ':' type | '=' expr)
//! func_decl   := 'func' ident '(' params? ')' ('->' type)? block
//! extern_func := 'extern' 'func' ident '(' params? (',' '...')? ')' ('->' type)?
//! typealias   := 'typealias' ident '=' type
//! param       := ident ':' type ('=' expr)?
//! ```

use std::cell::Cell;

use tarn_base::Result;

use crate::ast::{Decl, DeclNode};
use crate::parser::Parser;
use crate::token::TokenKind;

impl<'a, 'c> Parser<'a, 'c> {
    pub fn parse_decl(&mut self) -> Result<&'a Decl<'a>> {
        match self.token().kind {
            TokenKind::KwLet => self.parse_let_decl(),
            TokenKind::KwVar => self.parse_var_decl(),
            TokenKind::KwFunc => self.parse_func_decl(),
            TokenKind::KwExtern => self.parse_extern_func_decl(),
            TokenKind::KwTypealias => self.parse_typealias_decl(),
            _ => Err(self.error_here(format!(
                "expected declaration but got {}",
                self.describe_current()
            ))),
        }
    }

    fn parse_let_decl(&mut self) -> Result<&'a Decl<'a>> {
        let kw = self.expect(TokenKind::KwLet, "'let'")?;
        let name = self.expect(TokenKind::Identifier, "identifier")?;
        let ty = if self.eat(TokenKind::Colon).is_some() {
            Some(self.parse_type()?)
        } else {
            None
        };
        self.expect_op("=")?;
        let init = self.parse_expr()?;
        Ok(self.ctx.alloc_decl(Decl::new(
            DeclNode::Let { name: name.lexeme, ty, init },
            kw.span.merge(init.span),
        )))
    }

    fn parse_var_decl(&mut self) -> Result<&'a Decl<'a>> {
        let kw = self.expect(TokenKind::KwVar, "'var'")?;
        let name = self.expect(TokenKind::Identifier, "identifier")?;
        if self.eat(TokenKind::Colon).is_some() {
            let ty = self.parse_type()?;
            if self.eat_op("=") {
                let init = self.parse_expr()?;
                Ok(self.ctx.alloc_decl(Decl::new(
                    DeclNode::Var { name: name.lexeme, ty: Some(ty), init },
                    kw.span.merge(init.span),
                )))
            } else {
                Ok(self.ctx.alloc_decl(Decl::new(
                    DeclNode::UninitializedVar { name: name.lexeme, ty },
                    kw.span.merge(name.span),
                )))
            }
        } else {
            self.expect_op("=")?;
            let init = self.parse_expr()?;
            Ok(self.ctx.alloc_decl(Decl::new(
                DeclNode::Var { name: name.lexeme, ty: None, init },
                kw.span.merge(init.span),
            )))
        }
    }

    fn parse_func_decl(&mut self) -> Result<&'a Decl<'a>> {
        let kw = self.expect(TokenKind::KwFunc, "'func'")?;
        let name = self.expect(TokenKind::Identifier, "identifier")?;
        let (params, var_arg) = self.parse_param_list()?;
        if var_arg {
            return Err(self.error_here("only extern functions may be variadic"));
        }
        let return_ty = if self.eat(TokenKind::Arrow).is_some() {
            self.parse_type()?
        } else {
            self.comp.types.void()
        };
        let body = self.parse_block()?;
        let span = kw.span.merge(body.span);
        Ok(self.ctx.alloc_decl(Decl::new(
            DeclNode::Func {
                name: name.lexeme,
                params,
                return_ty,
                body,
                context: Cell::new(None),
            },
            span,
        )))
    }

    fn parse_extern_func_decl(&mut self) -> Result<&'a Decl<'a>> {
        let kw = self.expect(TokenKind::KwExtern, "'extern'")?;
        self.expect(TokenKind::KwFunc, "'func'")?;
        let name = self.expect(TokenKind::Identifier, "identifier")?;
        let (params, is_var_arg) = self.parse_param_list()?;
        let return_ty = if self.eat(TokenKind::Arrow).is_some() {
            self.parse_type()?
        } else {
            self.comp.types.void()
        };
        let span = kw.span.merge(name.span);
        Ok(self.ctx.alloc_decl(Decl::new(
            DeclNode::ExternFunc {
                name: name.lexeme,
                params,
                return_ty,
                is_var_arg,
            },
            span,
        )))
    }

    /// Parses `'(' (param (',' param)* (',' '...')?)? ')'`; the trailing
    /// ellipsis marks a variadic signature.
    fn parse_param_list(&mut self) -> Result<(&'a [&'a Decl<'a>], bool)> {
        self.expect(TokenKind::LParen, "'('")?;
        let mut params = Vec::new();
        let mut is_var_arg = false;
        if !self.check(TokenKind::RParen) {
            loop {
                if self.eat(TokenKind::Ellipsis).is_some() {
                    is_var_arg = true;
                    break;
                }
                params.push(self.parse_param()?);
                if self.eat(TokenKind::Comma).is_none() {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen, "')'")?;
        Ok((self.ctx.alloc_decl_list(params), is_var_arg))
    }

    fn parse_param(&mut self) -> Result<&'a Decl<'a>> {
        let name = self.expect(TokenKind::Identifier, "parameter name")?;
        self.expect(TokenKind::Colon, "':'")?;
        let ty = self.parse_type()?;
        let default = if self.eat_op("=") {
            Some(self.parse_expr()?)
        } else {
            None
        };
        let span = default
            .map(|d| name.span.merge(d.span))
            .unwrap_or(name.span);
        Ok(self.ctx.alloc_decl(Decl::new(
            DeclNode::Param { name: name.lexeme, ty, default },
            span,
        )))
    }

    fn parse_typealias_decl(&mut self) -> Result<&'a Decl<'a>> {
        let kw = self.expect(TokenKind::KwTypealias, "'typealias'")?;
        let name = self.expect(TokenKind::Identifier, "identifier")?;
        self.expect_op("=")?;
        let target = self.parse_type()?;
        Ok(self.ctx.alloc_decl(Decl::new(
            DeclNode::TypeAlias { name: name.lexeme, target },
            kw.span.merge(name.span),
        )))
    }
}
