// Author: godot-tscn contributors
// License: MIT

use crate::ast::Position;
use crate::TscnError;

mod scanner;
mod tokenizer;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // --- literals ---
    /// Identifiers, keys and keywords; `0/name` and `bones/0/rest` are single identifiers.
    Ident(String),
    /// Quote-stripped string contents, verbatim.
    String(String),
    Int(i64),
    Float(f64),

    // --- punctuation ---
    LBracket,
    RBracket,
    Equals,
    LParen,
    RParen,
    Colon,
    Comma,
    LBrace,
    RBrace,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub position: Position,
}

impl TokenKind {
    /// How the token is written in source, for diagnostics.
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Ident(s) => format!("identifier '{}'", s),
            TokenKind::String(s) => format!("string \"{}\"", s),
            TokenKind::Int(i) => format!("integer {}", i),
            TokenKind::Float(f) => format!("float {}", f),
            TokenKind::LBracket => "'['".into(),
            TokenKind::RBracket => "']'".into(),
            TokenKind::Equals => "'='".into(),
            TokenKind::LParen => "'('".into(),
            TokenKind::RParen => "')'".into(),
            TokenKind::Colon => "':'".into(),
            TokenKind::Comma => "','".into(),
            TokenKind::LBrace => "'{'".into(),
            TokenKind::RBrace => "'}'".into(),
        }
    }
}

pub struct Lexer<'a> {
    input: &'a str,
    offset: usize,
    line: usize,
    column: usize,
    failed: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer {
            input,
            offset: 0,
            line: 1,
            column: 1,
            failed: false,
        }
    }

    /// Where the next unread character sits.
    pub fn current_position(&self) -> Position {
        Position::new(self.offset, self.line, self.column)
    }

    /// Next token, or `None` at end of input.
    pub fn next_token(&mut self) -> Result<Option<Token>, TscnError> {
        tokenizer::next_token(self)
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Token, TscnError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.next_token() {
            Ok(Some(token)) => Some(Ok(token)),
            Ok(None) => None,
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

/// Lex the whole input at once.
pub fn tokenize(input: &str) -> Result<Vec<Token>, TscnError> {
    Lexer::new(input).collect()
}
