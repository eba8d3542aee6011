use super::*;
use crate::ast::{MapEntry, TypedCall, ValueKind};

pub(super) fn parse_value(parser: &mut Parser) -> Result<Value, TscnError> {
    match parser.peek_kind() {
        Some(TokenKind::LBrace) => parse_map_value(parser),
        Some(TokenKind::LBracket) => parse_array_value(parser),
        Some(TokenKind::String(_)) => parse_string_value(parser),
        Some(TokenKind::Int(_)) | Some(TokenKind::Float(_)) => parse_number_value(parser),
        Some(TokenKind::Ident(_)) => parse_ident_value(parser),
        _ => Err(parser.unexpected("a value")),
    }
}

/// A string, or a `"key": value` pair when a colon follows.
fn parse_string_value(parser: &mut Parser) -> Result<Value, TscnError> {
    let token = parser.bump()?;
    let TokenKind::String(s) = token.kind else {
        return Err(parser.unexpected("a string"));
    };

    if parser.at(&TokenKind::Colon) {
        parser.bump()?;
        let value = parse_value(parser)?;
        let entry = MapEntry {
            key: s,
            value,
            position: token.position,
        };
        return Ok(Value::new(ValueKind::Pair(Box::new(entry)), token.position));
    }

    Ok(Value::new(ValueKind::String(s), token.position))
}

fn parse_number_value(parser: &mut Parser) -> Result<Value, TscnError> {
    let token = parser.bump()?;
    let kind = match token.kind {
        TokenKind::Int(i) => ValueKind::Int(i),
        TokenKind::Float(f) => ValueKind::Float(f),
        _ => return Err(parser.unexpected("a number")),
    };
    Ok(Value::new(kind, token.position))
}

/// Keyword literals, bare identifiers and constructor calls.
fn parse_ident_value(parser: &mut Parser) -> Result<Value, TscnError> {
    let (name, position) = parser.expect_ident("an identifier")?;

    let kind = match name.as_str() {
        "true" => ValueKind::Bool(true),
        "false" => ValueKind::Bool(false),
        "null" => ValueKind::Null,
        _ => {
            let params = if parser.at(&TokenKind::LParen) {
                parse_call_params(parser)?
            } else {
                Vec::new()
            };
            ValueKind::Call(TypedCall {
                name,
                params,
                position,
            })
        }
    };

    Ok(Value::new(kind, position))
}

fn parse_call_params(parser: &mut Parser) -> Result<Vec<Value>, TscnError> {
    parser.expect(TokenKind::LParen)?;

    let mut params = Vec::new();
    if parser.at(&TokenKind::RParen) {
        parser.bump()?;
        return Ok(params);
    }

    loop {
        params.push(parse_value(parser)?);
        match parser.peek_kind() {
            Some(TokenKind::Comma) => {
                parser.bump()?;
            }
            Some(TokenKind::RParen) => {
                parser.bump()?;
                break;
            }
            _ => return Err(parser.unexpected("',' or ')'")),
        }
    }

    Ok(params)
}

fn parse_array_value(parser: &mut Parser) -> Result<Value, TscnError> {
    let open = parser.expect(TokenKind::LBracket)?;
    let mut items = Vec::new();

    loop {
        if parser.at(&TokenKind::RBracket) {
            parser.bump()?;
            break;
        }

        items.push(parse_value(parser)?);

        match parser.peek_kind() {
            // A trailing comma is fine: the loop head closes the array.
            Some(TokenKind::Comma) => {
                parser.bump()?;
            }
            Some(TokenKind::RBracket) => {
                parser.bump()?;
                break;
            }
            _ => return Err(parser.unexpected("',' or ']'")),
        }
    }

    Ok(Value::new(ValueKind::Array(items), open.position))
}

fn parse_map_value(parser: &mut Parser) -> Result<Value, TscnError> {
    let open = parser.expect(TokenKind::LBrace)?;
    let mut entries = Vec::new();

    if parser.at(&TokenKind::RBrace) {
        parser.bump()?;
        return Ok(Value::new(ValueKind::Map(entries), open.position));
    }

    loop {
        entries.push(parse_map_entry(parser)?);
        match parser.peek_kind() {
            Some(TokenKind::Comma) => {
                parser.bump()?;
            }
            Some(TokenKind::RBrace) => {
                parser.bump()?;
                break;
            }
            _ => return Err(parser.unexpected("',' or '}'")),
        }
    }

    Ok(Value::new(ValueKind::Map(entries), open.position))
}

fn parse_map_entry(parser: &mut Parser) -> Result<MapEntry, TscnError> {
    let Some(TokenKind::String(_)) = parser.peek_kind() else {
        return Err(parser.unexpected("a string key"));
    };
    let token = parser.bump()?;
    let TokenKind::String(key) = token.kind else {
        return Err(parser.unexpected("a string key"));
    };

    parser.expect(TokenKind::Colon)?;
    let value = parse_value(parser)?;

    Ok(MapEntry {
        key,
        value,
        position: token.position,
    })
}
