//! Conversions between LSP positions and byte offsets.
//!
//! `character` counts UTF-16 code units within the line, the encoding the
//! server advertises in its capabilities.

use tower_lsp::lsp_types::{Position, PositionEncodingKind, Range};

/// Position encoding used for every `Position` this crate reads or writes
pub const POSITION_ENCODING: PositionEncodingKind = PositionEncodingKind::UTF16;

/// Byte offset of `position`, clamped to the end of its line
///
/// Returns `None` when the line does not exist.
pub fn position_to_offset(text: &str, position: Position) -> Option<usize> {
    let mut line_start = 0;
    for (row, line) in text.split('\n').enumerate() {
        if row == position.line as usize {
            let line = line.strip_suffix('\r').unwrap_or(line);
            return Some(line_start + utf16_to_byte(line, position.character as usize));
        }
        line_start += line.len() + 1;
    }
    None
}

/// Position of a byte offset (clamped to the text length)
pub fn offset_to_position(text: &str, offset: usize) -> Position {
    let mut offset = offset.min(text.len());
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    let before = &text[..offset];
    let line = before.matches('\n').count();
    let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
    let character = before[line_start..].encode_utf16().count();
    Position::new(line as u32, character as u32)
}

/// Byte index of the character holding the `units`-th UTF-16 code unit, or the
/// end of the line
///
/// A column inside a surrogate pair resolves to the start of that character.
fn utf16_to_byte(line: &str, units: usize) -> usize {
    let mut seen = 0;
    for (index, c) in line.char_indices() {
        seen += c.len_utf16();
        if seen > units {
            return index;
        }
    }
    line.len()
}

/// Text covered by `range`, `None` when its start is outside the document
pub fn text_in_range(text: &str, range: Range) -> Option<&str> {
    let start = position_to_offset(text, range.start)?;
    let end = position_to_offset(text, range.end).unwrap_or(text.len());
    if end < start {
        return None;
    }
    Some(&text[start..end])
}

/// `a` sorts before or at `b`
pub fn position_le(a: Position, b: Position) -> bool {
    (a.line, a.character) <= (b.line, b.character)
}

/// `range` contains `position`, both ends inclusive
pub fn range_contains(range: Range, position: Position) -> bool {
    position_le(range.start, position) && position_le(position, range.end)
}

/// Overlap of two ranges, `None` when they do not touch
pub fn intersect(a: Range, b: Range) -> Option<Range> {
    let start = if position_le(a.start, b.start) { b.start } else { a.start };
    let end = if position_le(a.end, b.end) { a.end } else { b.end };
    position_le(start, end).then(|| Range::new(start, end))
}
