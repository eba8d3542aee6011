use tracing::trace;

use super::*;
use crate::ast::{Field, Header, Section};

pub(super) fn parse_document(parser: &mut Parser) -> Result<Document, TscnError> {
    let position = parser.position();

    // Only a file that opens with a bracket has a header; `project.godot`
    // starts with plain fields and every bracket after them is a section.
    let header = if parser.at(&TokenKind::LBracket) {
        let (key, attributes, position) = parse_bracketed(parser)?;
        Some(Header { key, attributes, position })
    } else {
        None
    };

    let fields = parse_fields(parser)?;

    let mut sections = Vec::new();
    while parser.peek().is_some() {
        if !parser.at(&TokenKind::LBracket) {
            return Err(parser.unexpected("a field or '['"));
        }
        sections.push(parse_section(parser)?);
    }

    trace!(
        header = header.as_ref().map(|h| h.key.as_str()),
        fields = fields.len(),
        sections = sections.len(),
        "parsed document"
    );

    Ok(Document {
        header,
        fields,
        sections,
        position,
    })
}

fn parse_section(parser: &mut Parser) -> Result<Section, TscnError> {
    let (tag, attributes, position) = parse_bracketed(parser)?;
    let fields = parse_fields(parser)?;
    Ok(Section {
        tag,
        attributes,
        fields,
        position,
    })
}

/// `'[' Ident Field* ']'`, shared by the header and by section openers.
fn parse_bracketed(parser: &mut Parser) -> Result<(String, Vec<Field>, Position), TscnError> {
    let open = parser.expect(TokenKind::LBracket)?;
    let (tag, _) = parser.expect_ident("a section name")?;

    let mut attributes = Vec::new();
    while let Some(TokenKind::Ident(_)) = parser.peek_kind() {
        attributes.push(parse_field(parser)?);
    }

    parser.expect(TokenKind::RBracket)?;
    Ok((tag, attributes, open.position))
}

fn parse_fields(parser: &mut Parser) -> Result<Vec<Field>, TscnError> {
    let mut fields = Vec::new();
    while let Some(TokenKind::Ident(_)) = parser.peek_kind() {
        fields.push(parse_field(parser)?);
    }
    Ok(fields)
}

pub(super) fn parse_field(parser: &mut Parser) -> Result<Field, TscnError> {
    let (key, position) = parser.expect_ident("a field name")?;
    parser.expect(TokenKind::Equals)?;
    let value = value::parse_value(parser)?;
    Ok(Field { key, value, position })
}
