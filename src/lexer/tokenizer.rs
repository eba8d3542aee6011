use once_cell::sync::Lazy;
use regex::Regex;

use super::*;
use super::scanner::{bump, bump_bytes, peek_char, rest, skip_whitespace_and_comments};

static IDENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[0-9]+/)?[A-Za-z_][A-Za-z0-9_/]*").expect("identifier pattern is valid")
});

// Tried before INT so `1.5` never splits into `1` and `.5`.
static FLOAT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^-?(?:[0-9]*\.[0-9]+(?:[eE][-+]?[0-9]+)?|[0-9]+[eE][-+]?[0-9]+)\b")
        .expect("float pattern is valid")
});

static INT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-?[0-9]+\b").expect("integer pattern is valid"));

pub(super) fn next_token(lexer: &mut Lexer) -> Result<Option<Token>, TscnError> {
    skip_whitespace_and_comments(lexer);

    let position = lexer.current_position();
    let kind = match peek_char(lexer) {
        None => return Ok(None),
        Some('[') => tokenize_symbol(lexer, TokenKind::LBracket),
        Some(']') => tokenize_symbol(lexer, TokenKind::RBracket),
        Some('=') => tokenize_symbol(lexer, TokenKind::Equals),
        Some('(') => tokenize_symbol(lexer, TokenKind::LParen),
        Some(')') => tokenize_symbol(lexer, TokenKind::RParen),
        Some(':') => tokenize_symbol(lexer, TokenKind::Colon),
        Some(',') => tokenize_symbol(lexer, TokenKind::Comma),
        Some('{') => tokenize_symbol(lexer, TokenKind::LBrace),
        Some('}') => tokenize_symbol(lexer, TokenKind::RBrace),
        Some('"') => tokenize_string(lexer, position)?,
        Some(c) if c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.' => {
            tokenize_word(lexer, position, c)?
        }
        Some(ch) => return Err(unexpected_char(lexer, ch, position)),
    };

    Ok(Some(Token { kind, position }))
}

fn tokenize_symbol(lexer: &mut Lexer, kind: TokenKind) -> TokenKind {
    bump(lexer);
    kind
}

fn tokenize_string(lexer: &mut Lexer, position: Position) -> Result<TokenKind, TscnError> {
    let body = &rest(lexer)[1..];
    let Some(end) = body.find('"') else {
        return Err(TscnError::LexError {
            message: "Unterminated string".into(),
            position,
            hint: Some("String literal not closed".into()),
        });
    };

    let content = body[..end].to_string();
    // opening quote + content + closing quote
    bump_bytes(lexer, end + 2);
    Ok(TokenKind::String(content))
}

/// Identifiers, floats and integers, in that order of preference.
fn tokenize_word(lexer: &mut Lexer, position: Position, first: char) -> Result<TokenKind, TscnError> {
    let text = rest(lexer);

    if let Some(m) = IDENT.find(text) {
        let ident = m.as_str().to_string();
        bump_bytes(lexer, m.end());
        return Ok(TokenKind::Ident(ident));
    }

    if let Some(m) = FLOAT.find(text) {
        let literal = m.as_str();
        let value = match literal.parse::<f64>() {
            Ok(v) if v.is_finite() => v,
            Ok(_) => {
                return Err(TscnError::LexError {
                    message: format!("Float '{}' out of range", literal),
                    position,
                    hint: Some("Floats must fit in 64 bits".into()),
                });
            }
            Err(_) => {
                return Err(TscnError::LexError {
                    message: format!("Invalid float '{}'", literal),
                    position,
                    hint: None,
                });
            }
        };
        bump_bytes(lexer, m.end());
        return Ok(TokenKind::Float(value));
    }

    if let Some(m) = INT.find(text) {
        let literal = m.as_str();
        let value = literal.parse::<i64>().map_err(|_| TscnError::LexError {
            message: format!("Integer '{}' out of range", literal),
            position,
            hint: Some("Integers must fit in 64 bits".into()),
        })?;
        bump_bytes(lexer, m.end());
        return Ok(TokenKind::Int(value));
    }

    Err(unexpected_char(lexer, first, position))
}

fn unexpected_char(lexer: &mut Lexer, ch: char, position: Position) -> TscnError {
    bump(lexer);
    TscnError::LexError {
        message: format!("Unexpected character '{}'", ch),
        position,
        hint: Some("Unexpected character in input".into()),
    }
}
