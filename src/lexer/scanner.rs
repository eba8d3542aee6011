use super::*;

/// Unread remainder of the input.
pub(super) fn rest<'a>(lexer: &Lexer<'a>) -> &'a str {
    &lexer.input[lexer.offset..]
}

pub(super) fn peek_char(lexer: &Lexer) -> Option<char> {
    rest(lexer).chars().next()
}

/// Advance one character and update line/column tracking
pub(super) fn bump(lexer: &mut Lexer) -> Option<char> {
    let curr = peek_char(lexer)?;
    lexer.offset += curr.len_utf8();
    if curr == '\n' {
        lexer.line += 1;
        lexer.column = 1;
    } else {
        lexer.column += 1;
    }
    Some(curr)
}

/// Advance past `len` bytes of already-matched text.
pub(super) fn bump_bytes(lexer: &mut Lexer, len: usize) {
    let target = lexer.offset + len;
    while lexer.offset < target {
        if bump(lexer).is_none() {
            break;
        }
    }
}

/// Skip whitespace and `;` comments
pub(super) fn skip_whitespace_and_comments(lexer: &mut Lexer) {
    while let Some(c) = peek_char(lexer) {
        match c {
            ';' => {
                // Skip comment until end of line
                while let Some(ch) = bump(lexer) {
                    if ch == '\n' {
                        break;
                    }
                }
            }
            c if c.is_whitespace() => {
                bump(lexer);
            }
            _ => break,
        }
    }
}
