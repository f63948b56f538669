//! Position conversion utilities.
//!
//! Tokens carry byte offsets; diagnostics want line/column.

/// Line and column of a byte offset (both 0-indexed, column in characters)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineCol {
    pub line: usize,
    pub col: usize,
}

/// Convert a byte offset to a line/column pair.
///
/// Offsets past the end clamp to the end of the source. An offset inside a
/// multi-byte character counts that character as not yet reached.
pub fn line_col(source: &str, byte_offset: usize) -> LineCol {
    let byte_offset = byte_offset.min(source.len());
    let mut line = 0;
    let mut line_start = 0;
    for (i, b) in source.as_bytes()[..byte_offset].iter().enumerate() {
        if *b == b'\n' {
            line += 1;
            line_start = i + 1;
        }
    }
    let col = source[line_start..]
        .char_indices()
        .take_while(|(i, _)| line_start + i < byte_offset)
        .count();
    LineCol { line, col }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_col_first_line() {
        assert_eq!(line_col("<div>", 0), LineCol { line: 0, col: 0 });
        assert_eq!(line_col("<div>", 4), LineCol { line: 0, col: 4 });
    }

    #[test]
    fn test_line_col_after_newlines() {
        let source = "<div>\n  <span>\n    text";
        assert_eq!(line_col(source, 8), LineCol { line: 1, col: 2 });
        assert_eq!(line_col(source, source.len()), LineCol { line: 2, col: 8 });
    }

    #[test]
    fn test_line_col_multibyte() {
        // é is 2 bytes but one column
        let source = "café <b>";
        assert_eq!(line_col(source, 6), LineCol { line: 0, col: 5 });
    }
}
