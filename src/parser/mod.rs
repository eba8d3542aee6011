// Author: godot-tscn contributors
// License: MIT

use crate::ast::{Document, Position, Value};
use crate::lexer::{Lexer, Token, TokenKind};
use crate::TscnError;

mod document;
mod value;

pub struct Parser<'a> {
    lexer: Lexer<'a>,
    peek: Option<Token>,
}

impl<'a> Parser<'a> {
    /// Creates a parser and lexes the first token, so lexical errors at the
    /// very start of the input surface here.
    pub fn new(input: &'a str) -> Result<Self, TscnError> {
        let mut lexer = Lexer::new(input);
        let peek = lexer.next_token()?;
        Ok(Self { lexer, peek })
    }

    pub(crate) fn bump(&mut self) -> Result<Token, TscnError> {
        let curr = self.peek.take().ok_or_else(|| TscnError::SyntaxError {
            expected: "a token".into(),
            found: "end of input".into(),
            position: self.lexer.current_position(),
        })?;
        self.peek = self.lexer.next_token()?;
        Ok(curr)
    }

    pub(crate) fn peek(&self) -> Option<&Token> {
        self.peek.as_ref()
    }

    pub(crate) fn peek_kind(&self) -> Option<&TokenKind> {
        self.peek.as_ref().map(|t| &t.kind)
    }

    pub(crate) fn at(&self, kind: &TokenKind) -> bool {
        self.peek_kind() == Some(kind)
    }

    /// Consume a punctuation token of the given kind.
    pub(crate) fn expect(&mut self, expected: TokenKind) -> Result<Token, TscnError> {
        if !self.at(&expected) {
            return Err(self.unexpected(&expected.describe()));
        }
        self.bump()
    }

    pub(crate) fn expect_ident(&mut self, what: &str) -> Result<(String, Position), TscnError> {
        match self.peek_kind() {
            Some(TokenKind::Ident(_)) => {
                let token = self.bump()?;
                match token.kind {
                    TokenKind::Ident(name) => Ok((name, token.position)),
                    _ => unreachable!(),
                }
            }
            _ => Err(self.unexpected(what)),
        }
    }

    /// Position of the next token, or of the end of input.
    pub(crate) fn position(&self) -> Position {
        self.peek
            .as_ref()
            .map_or_else(|| self.lexer.current_position(), |t| t.position)
    }

    pub(crate) fn unexpected(&self, expected: &str) -> TscnError {
        let found = self
            .peek_kind()
            .map_or_else(|| "end of input".to_string(), TokenKind::describe);
        TscnError::SyntaxError {
            expected: expected.to_string(),
            found,
            position: self.position(),
        }
    }

    pub fn parse_document(&mut self) -> Result<Document, TscnError> {
        document::parse_document(self)
    }

    /// Parse a single value, e.g. the text of a rendered [`Value`].
    pub fn parse_value(&mut self) -> Result<Value, TscnError> {
        let value = value::parse_value(self)?;
        if self.peek().is_some() {
            return Err(self.unexpected("end of input"));
        }
        Ok(value)
    }
}

/// Parse a whole file's text into a [`Document`].
pub fn parse(input: &str) -> Result<Document, TscnError> {
    Parser::new(input)?.parse_document()
}
