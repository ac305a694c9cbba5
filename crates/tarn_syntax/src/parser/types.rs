//! Type parsing.
//!
//! `type := ident | '(' type (',' type)* ')' | '[' type ';' int ']'
//!        | '[' type ']' | '*' type | '&' type`
//!
//! Types are interned into the [`TypeTable`](crate::types::TypeTable) as
//! they are parsed; the builtin names `Integer`, `Double`, `Boolean`, and
//! `Character` go straight to their singletons, anything else becomes a
//! `Named` type for the checker to bind. Parenthesized types follow the
//! expression rule: no top-level comma means grouping, not a one-tuple.

use tarn_base::Result;

use crate::parser::Parser;
use crate::token::TokenKind;
use crate::types::TypeId;

impl<'a, 'c> Parser<'a, 'c> {
    pub fn parse_type(&mut self) -> Result<TypeId> {
        match self.token().kind {
            TokenKind::Identifier => {
                let tok = self.advance();
                let id = match self.lexeme(tok) {
                    "Integer" => self.comp.types.integer(),
                    "Double" => self.comp.types.double(),
                    "Boolean" => self.comp.types.boolean(),
                    "Character" => self.comp.types.character(),
                    "Void" => self.comp.types.void(),
                    _ => self.comp.types.named(tok.lexeme),
                };
                Ok(id)
            }
            TokenKind::LParen => self.parse_tuple_type(),
            TokenKind::LSquare => self.parse_list_or_slice_type(),
            TokenKind::Operator => self.parse_pointer_or_reference_type(),
            _ => Err(self.error_here(format!(
                "expected type but got {}",
                self.describe_current()
            ))),
        }
    }

    fn parse_tuple_type(&mut self) -> Result<TypeId> {
        self.expect(TokenKind::LParen, "'('")?;
        let mut elements = vec![self.parse_type()?];
        let mut trailing_comma = false;
        while self.eat(TokenKind::Comma).is_some() {
            if self.check(TokenKind::RParen) {
                trailing_comma = true;
                break;
            }
            elements.push(self.parse_type()?);
        }
        self.expect(TokenKind::RParen, "')'")?;
        if elements.len() == 1 && !trailing_comma {
            Ok(elements[0])
        } else {
            Ok(self.comp.types.tuple(elements))
        }
    }

    fn parse_list_or_slice_type(&mut self) -> Result<TypeId> {
        self.expect(TokenKind::LSquare, "'['")?;
        let element = self.parse_type()?;
        if self.eat(TokenKind::Semicolon).is_some() {
            let len_tok = self.expect(TokenKind::IntegerLiteral, "list length")?;
            let length: u64 = self
                .lexeme(len_tok)
                .parse()
                .map_err(|_| self.error_at("list length out of range", len_tok.span))?;
            self.expect(TokenKind::RSquare, "']'")?;
            Ok(self.comp.types.list(element, length))
        } else {
            self.expect(TokenKind::RSquare, "']'")?;
            Ok(self.comp.types.slice(element))
        }
    }

    /// A prefix run of `*` and `&`. The lexer munches `**` into one
    /// operator token, so the lexeme is unwound character by character,
    /// outermost first.
    fn parse_pointer_or_reference_type(&mut self) -> Result<TypeId> {
        let tok = self.token();
        let lexeme = self.lexeme(tok).to_string();
        if lexeme.is_empty() || !lexeme.chars().all(|c| c == '*' || c == '&') {
            return Err(self.error_here(format!(
                "expected type but got '{lexeme}'"
            )));
        }
        self.advance();
        let mut ty = self.parse_type()?;
        for c in lexeme.chars().rev() {
            ty = match c {
                '*' => self.comp.types.pointer(ty),
                _ => self.comp.types.reference(ty),
            };
        }
        Ok(ty)
    }

}
