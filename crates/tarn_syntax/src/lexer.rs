//! Byte-walking lexer.
//!
//! The lexer maps source bytes to tokens deterministically and totally:
//! [`Lexer::next_token`] yields [`TokenKind::Eof`] forever once the input is
//! exhausted. Spaces, tabs, and carriage returns are skipped; newlines are
//! emitted as tokens because they terminate statements. `//` comments run to
//! end of line.
//!
//! Operator lexemes are the maximal munch of the operator character class
//! `+ - * / % < > = ! & |`; the run `->` is special-cased into the
//! [`TokenKind::Arrow`] token. Whether a munched run is a *known* operator
//! is the parser's business (the precedence table decides).
//!
//! String and character literals support the escapes
//! `\n \t \r \0 \\ \" \' \xNN`. The token's lexeme is the processed content,
//! so later stages never re-scan escapes.

use tarn_base::{CompileError, Interner, Result, Span};

use crate::token::{keyword_kind, Token, TokenKind};

const OPERATOR_CHARS: &[u8] = b"+-*/%<>=!&|";

fn is_operator_char(b: u8) -> bool {
    OPERATOR_CHARS.contains(&b)
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_ident_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Tokenizes one source buffer.
pub struct Lexer<'s, 'i> {
    bytes: &'s [u8],
    source: &'s str,
    pos: usize,
    interner: &'i mut Interner,
}

impl<'s, 'i> Lexer<'s, 'i> {
    pub fn new(source: &'s str, interner: &'i mut Interner) -> Self {
        Lexer {
            bytes: source.as_bytes(),
            source,
            pos: 0,
            interner,
        }
    }

    /// Lexes the whole input, ending with a single `Eof` sentinel token.
    pub fn tokenize(mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn error(&self, message: impl Into<String>, span: Span) -> CompileError {
        CompileError::new(message, span)
    }

    fn token(&mut self, kind: TokenKind, start: usize) -> Token {
        let span = Span::new(start, self.pos);
        let lexeme = self.interner.intern(&self.source[start..self.pos]);
        Token::new(kind, lexeme, span)
    }

    /// Produces the next token. Total: past the end it returns `Eof`.
    pub fn next_token(&mut self) -> Result<Token> {
        loop {
            match self.peek() {
                Some(b' ') | Some(b'\t') | Some(b'\r') => {
                    self.pos += 1;
                }
                Some(b'/') if self.peek_at(1) == Some(b'/') => {
                    while let Some(b) = self.peek() {
                        if b == b'\n' {
                            break;
                        }
                        self.pos += 1;
                    }
                }
                _ => break,
            }
        }

        let start = self.pos;
        let Some(byte) = self.peek() else {
            return Ok(self.token(TokenKind::Eof, start));
        };

        match byte {
            b'\n' => {
                self.pos += 1;
                Ok(self.token(TokenKind::Newline, start))
            }
            b'(' => self.punct(TokenKind::LParen, start),
            b')' => self.punct(TokenKind::RParen, start),
            b'{' => self.punct(TokenKind::LBrace, start),
            b'}' => self.punct(TokenKind::RBrace, start),
            b'[' => self.punct(TokenKind::LSquare, start),
            b']' => self.punct(TokenKind::RSquare, start),
            b',' => self.punct(TokenKind::Comma, start),
            b':' => self.punct(TokenKind::Colon, start),
            b';' => self.punct(TokenKind::Semicolon, start),
            b'.' => {
                if self.peek_at(1) == Some(b'.') && self.peek_at(2) == Some(b'.') {
                    self.pos += 3;
                    Ok(self.token(TokenKind::Ellipsis, start))
                } else {
                    Err(self.error("invalid character '.'", Span::new(start, start + 1)))
                }
            }
            b'"' => self.string_literal(start),
            b'\'' => self.character_literal(start),
            b if is_ident_start(b) => {
                while self.peek().is_some_and(is_ident_continue) {
                    self.pos += 1;
                }
                let word = &self.source[start..self.pos];
                let kind = keyword_kind(word).unwrap_or(TokenKind::Identifier);
                Ok(self.token(kind, start))
            }
            b if b.is_ascii_digit() => self.number(start),
            b if is_operator_char(b) => {
                while self.peek().is_some_and(is_operator_char) {
                    self.pos += 1;
                }
                let kind = if &self.source[start..self.pos] == "->" {
                    TokenKind::Arrow
                } else {
                    TokenKind::Operator
                };
                Ok(self.token(kind, start))
            }
            other => Err(self.error(
                format!("invalid character '{}'", other as char),
                Span::new(start, start + 1),
            )),
        }
    }

    fn punct(&mut self, kind: TokenKind, start: usize) -> Result<Token> {
        self.pos += 1;
        Ok(self.token(kind, start))
    }

    /// Integer and double literals, distinguished by the presence of `.`.
    /// The fractional digit run after the point may be empty.
    fn number(&mut self, start: usize) -> Result<Token> {
        while self.peek().is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 1;
        }
        // `1...` is an integer followed by an ellipsis, never a double.
        let dotted = self.peek() == Some(b'.') && self.peek_at(1) != Some(b'.');
        if dotted {
            self.pos += 1;
            while self.peek().is_some_and(|b| b.is_ascii_digit()) {
                self.pos += 1;
            }
            Ok(self.token(TokenKind::DoubleLiteral, start))
        } else {
            Ok(self.token(TokenKind::IntegerLiteral, start))
        }
    }

    /// Decodes one escape sequence; `self.pos` sits on the backslash.
    fn escape(&mut self) -> Result<u8> {
        let start = self.pos;
        self.pos += 1;
        let Some(code) = self.peek() else {
            return Err(self.error("unterminated escape sequence", Span::at(start)));
        };
        self.pos += 1;
        match code {
            b'n' => Ok(b'\n'),
            b't' => Ok(b'\t'),
            b'r' => Ok(b'\r'),
            b'0' => Ok(b'\0'),
            b'\\' => Ok(b'\\'),
            b'"' => Ok(b'"'),
            b'\'' => Ok(b'\''),
            b'x' => {
                let hi = self.peek();
                let lo = self.peek_at(1);
                match (
                    hi.and_then(|b| (b as char).to_digit(16)),
                    lo.and_then(|b| (b as char).to_digit(16)),
                ) {
                    (Some(hi), Some(lo)) => {
                        self.pos += 2;
                        Ok((hi * 16 + lo) as u8)
                    }
                    _ => Err(self.error(
                        "expected two hex digits after '\\x'",
                        Span::new(start, self.pos),
                    )),
                }
            }
            other => Err(self.error(
                format!("unsupported escape '\\{}'", other as char),
                Span::new(start, self.pos),
            )),
        }
    }

    fn string_literal(&mut self, start: usize) -> Result<Token> {
        self.pos += 1;
        let mut content = Vec::new();
        loop {
            match self.peek() {
                None | Some(b'\n') => {
                    return Err(self.error(
                        "unterminated string literal",
                        Span::new(start, self.pos),
                    ));
                }
                Some(b'"') => {
                    self.pos += 1;
                    break;
                }
                Some(b'\\') => content.push(self.escape()?),
                Some(other) => {
                    content.push(other);
                    self.pos += 1;
                }
            }
        }
        let span = Span::new(start, self.pos);
        let text = String::from_utf8_lossy(&content).into_owned();
        let lexeme = self.interner.intern(&text);
        Ok(Token::new(TokenKind::StringLiteral, lexeme, span))
    }

    fn character_literal(&mut self, start: usize) -> Result<Token> {
        self.pos += 1;
        let byte = match self.peek() {
            None | Some(b'\n') | Some(b'\'') => {
                return Err(self.error(
                    "character literal requires exactly one character",
                    Span::new(start, self.pos),
                ));
            }
            Some(b'\\') => self.escape()?,
            Some(other) => {
                if !other.is_ascii() {
                    return Err(self.error(
                        "character literal must be a single ASCII character",
                        Span::new(start, self.pos + 1),
                    ));
                }
                self.pos += 1;
                other
            }
        };
        if self.peek() != Some(b'\'') {
            return Err(self.error(
                "unterminated character literal",
                Span::new(start, self.pos),
            ));
        }
        self.pos += 1;
        let span = Span::new(start, self.pos);
        let text = (byte as char).to_string();
        let lexeme = self.interner.intern(&text);
        Ok(Token::new(TokenKind::CharacterLiteral, lexeme, span))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(source: &str) -> Vec<(TokenKind, String)> {
        let mut interner = Interner::new();
        let tokens = Lexer::new(source, &mut interner).tokenize().unwrap();
        tokens
            .into_iter()
            .map(|t| (t.kind, interner.resolve(t.lexeme).to_string()))
            .collect()
    }

    fn kinds(source: &str) -> Vec<TokenKind> {
        lex(source).into_iter().map(|(k, _)| k).collect()
    }

    #[test]
    fn keywords_and_identifiers() {
        assert_eq!(
            kinds("let abc"),
            vec![TokenKind::KwLet, TokenKind::Identifier, TokenKind::Eof]
        );
    }

    #[test]
    fn newlines_are_tokens_spaces_are_not() {
        assert_eq!(
            kinds("a \n b"),
            vec![
                TokenKind::Identifier,
                TokenKind::Newline,
                TokenKind::Identifier,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn integer_and_double_literals() {
        assert_eq!(
            kinds("123 4.5 6."),
            vec![
                TokenKind::IntegerLiteral,
                TokenKind::DoubleLiteral,
                TokenKind::DoubleLiteral,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn operators_munch_maximally() {
        let tokens = lex("a <<= b == c");
        assert_eq!(tokens[1], (TokenKind::Operator, "<<=".to_string()));
        assert_eq!(tokens[3], (TokenKind::Operator, "==".to_string()));
    }

    #[test]
    fn arrow_is_its_own_token() {
        assert_eq!(
            kinds("-> -"),
            vec![TokenKind::Arrow, TokenKind::Operator, TokenKind::Eof]
        );
    }

    #[test]
    fn comments_run_to_end_of_line() {
        assert_eq!(
            kinds("a // b c d\ne"),
            vec![
                TokenKind::Identifier,
                TokenKind::Newline,
                TokenKind::Identifier,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn string_literal_lexeme_is_unescaped() {
        let tokens = lex("\"a\\n\\x41\"");
        assert_eq!(tokens[0], (TokenKind::StringLiteral, "a\nA".to_string()));
    }

    #[test]
    fn character_literal_with_escape() {
        let tokens = lex("'\\0'");
        assert_eq!(tokens[0], (TokenKind::CharacterLiteral, "\0".to_string()));
    }

    #[test]
    fn unterminated_string_is_a_lexical_error() {
        let mut interner = Interner::new();
        let err = Lexer::new("\"abc", &mut interner).tokenize().unwrap_err();
        assert!(err.message.contains("unterminated string"));
    }

    #[test]
    fn invalid_character_reports_its_location() {
        let mut interner = Interner::new();
        let err = Lexer::new("a ?", &mut interner).tokenize().unwrap_err();
        assert!(err.message.contains("invalid character '?'"));
        assert_eq!(err.span.start, 2);
    }

    #[test]
    fn unknown_escape_is_rejected() {
        let mut interner = Interner::new();
        let err = Lexer::new("\"\\q\"", &mut interner).tokenize().unwrap_err();
        assert!(err.message.contains("unsupported escape"));
    }

    #[test]
    fn ellipsis_lexes_after_integer() {
        assert_eq!(
            kinds("1..."),
            vec![TokenKind::IntegerLiteral, TokenKind::Ellipsis, TokenKind::Eof]
        );
    }

    #[test]
    fn eof_is_total() {
        let mut interner = Interner::new();
        let mut lexer = Lexer::new("", &mut interner);
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Eof);
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Eof);
    }
}
