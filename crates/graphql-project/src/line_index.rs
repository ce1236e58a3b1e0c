use crate::Position;
use std::collections::HashMap;

/// Converts between byte offsets and editor positions.
///
/// Editors count columns in UTF-16 code units while the parser reports byte
/// offsets. The index records where every line starts plus the few characters
/// whose UTF-8 and UTF-16 widths differ, so both directions stay cheap.
///
/// # Example
///
/// ```
/// use graphql_project::{LineIndex, Position};
///
/// let index = LineIndex::new("line 0\nline 1\nline 2");
///
/// assert_eq!(index.position_to_offset(Position::new(1, 0)), Some(7));
/// assert_eq!(index.offset_to_position(10), Position::new(1, 3));
/// ```
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// Byte offset of the start of each line. Index 0 is always 0.
    line_starts: Vec<usize>,

    /// Non-ASCII characters per line
    wide_chars: HashMap<usize, Vec<WideChar>>,

    len: usize,
}

#[derive(Debug, Clone, Copy)]
struct WideChar {
    /// Byte offset from the start of the line
    byte_column: usize,
    len_utf8: usize,
    len_utf16: usize,
}

impl LineIndex {
    #[must_use]
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        let mut wide_chars: HashMap<usize, Vec<WideChar>> = HashMap::new();
        let mut line_start = 0;

        for (offset, ch) in text.char_indices() {
            if ch == '\n' {
                line_start = offset + 1;
                line_starts.push(line_start);
            } else if !ch.is_ascii() {
                wide_chars
                    .entry(line_starts.len() - 1)
                    .or_default()
                    .push(WideChar {
                        byte_column: offset - line_start,
                        len_utf8: ch.len_utf8(),
                        len_utf16: ch.len_utf16(),
                    });
            }
        }

        Self {
            line_starts,
            wide_chars,
            len: text.len(),
        }
    }

    /// Convert a position to a byte offset.
    ///
    /// Returns `None` when the line does not exist. A character past the end of
    /// the line is clamped to the line end.
    #[must_use]
    pub fn position_to_offset(&self, position: Position) -> Option<usize> {
        let line = position.line as usize;
        let line_start = *self.line_starts.get(line)?;
        let line_end = self
            .line_starts
            .get(line + 1)
            .map_or(self.len, |next| next.saturating_sub(1));

        let target = position.character as usize;
        let mut utf16_column = 0;
        let mut byte_column = 0;
        for ch in self.wide_chars.get(&line).map_or(&[][..], Vec::as_slice) {
            let ascii_run = ch.byte_column - byte_column;
            if utf16_column + ascii_run >= target {
                break;
            }
            utf16_column += ascii_run;
            byte_column = ch.byte_column;
            if utf16_column + ch.len_utf16 > target {
                // inside a surrogate pair: snap to the start of the character
                return Some(line_start + byte_column);
            }
            utf16_column += ch.len_utf16;
            byte_column += ch.len_utf8;
        }

        Some((line_start + byte_column + (target - utf16_column)).min(line_end))
    }

    /// Convert a byte offset to a position. Offsets past the end map to the end.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn offset_to_position(&self, offset: usize) -> Position {
        let offset = offset.min(self.len);
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(line) => line.saturating_sub(1),
        };

        let byte_column = offset - self.line_starts[line];
        let mut character = byte_column;
        if let Some(wide) = self.wide_chars.get(&line) {
            for ch in wide.iter().filter(|ch| ch.byte_column < byte_column) {
                character -= ch.len_utf8 - ch.len_utf16;
            }
        }

        Position::new(line as u32, character as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_string() {
        let index = LineIndex::new("");
        assert_eq!(index.position_to_offset(Position::new(0, 0)), Some(0));
        assert_eq!(index.offset_to_position(0), Position::new(0, 0));
    }

    #[test]
    fn test_multiple_lines() {
        let index = LineIndex::new("line 0\nline 1\nline 2");

        assert_eq!(index.position_to_offset(Position::new(0, 0)), Some(0));
        assert_eq!(index.position_to_offset(Position::new(1, 0)), Some(7));
        assert_eq!(index.position_to_offset(Position::new(2, 0)), Some(14));
        assert_eq!(index.position_to_offset(Position::new(1, 5)), Some(12));

        assert_eq!(index.offset_to_position(7), Position::new(1, 0));
        assert_eq!(index.offset_to_position(10), Position::new(1, 3));
        assert_eq!(index.offset_to_position(14), Position::new(2, 0));
    }

    #[test]
    fn test_out_of_bounds() {
        let index = LineIndex::new("line 0\nline 1");

        assert_eq!(index.position_to_offset(Position::new(10, 0)), None);
        // clamped to the end of line 0, before the newline
        assert_eq!(index.position_to_offset(Position::new(0, 1000)), Some(6));
        assert_eq!(index.offset_to_position(1000), Position::new(1, 6));
    }

    #[test]
    fn test_utf16_columns() {
        // 世 is 3 bytes and 1 UTF-16 unit, 😀 is 4 bytes and 2 units
        let source = "a世b😀c\nnext";
        let index = LineIndex::new(source);

        assert_eq!(index.position_to_offset(Position::new(1, 0)), Some(11));

        assert_eq!(index.position_to_offset(Position::new(0, 1)), Some(1));
        assert_eq!(index.position_to_offset(Position::new(0, 2)), Some(4));
        assert_eq!(index.position_to_offset(Position::new(0, 3)), Some(5));
        assert_eq!(index.position_to_offset(Position::new(0, 5)), Some(9));

        assert_eq!(index.offset_to_position(4), Position::new(0, 2));
        assert_eq!(index.offset_to_position(9), Position::new(0, 5));
        assert_eq!(index.offset_to_position(10), Position::new(0, 6));

        // the middle of the emoji snaps to its start
        assert_eq!(index.position_to_offset(Position::new(0, 4)), Some(5));
    }

    #[test]
    fn test_windows_line_endings() {
        let index = LineIndex::new("line 0\r\nline 1\r\nline 2");

        assert_eq!(index.position_to_offset(Position::new(1, 0)), Some(8));
        assert_eq!(index.position_to_offset(Position::new(2, 0)), Some(16));
    }

    #[test]
    fn test_roundtrip() {
        let source = "query {\n  user(name: \"Zoë\") {\n    id\n  }\n}\n";
        let index = LineIndex::new(source);

        for position in [
            Position::new(0, 0),
            Position::new(0, 6),
            Position::new(1, 4),
            Position::new(1, 20),
            Position::new(2, 4),
        ] {
            let offset = index.position_to_offset(position).unwrap();
            assert_eq!(index.offset_to_position(offset), position);
        }
    }
}
