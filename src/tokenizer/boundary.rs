//! Boundary finders.
//!
//! Each finder starts at the opening delimiter of a construct and returns the
//! offset just past its closing delimiter, or `None` when the construct is never
//! closed. A construct starting at offset 0 is therefore unambiguous.

/// End of the opening (or closing) tag whose `<` is at `offset`.
///
/// Quoted attribute values and `{...}` attribute values are skipped, so a `>`
/// inside them does not end the tag.
pub fn find_markup(source: &str, offset: usize) -> Option<usize> {
    let bytes = source.as_bytes();
    if bytes.get(offset) != Some(&b'<') {
        return None;
    }

    let mut i = offset + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'"' | b'\'' => i = find_quote(source, i)?,
            b'{' => i = find_program(source, i)?,
            b'>' => return Some(i + 1),
            _ => i += 1,
        }
    }
    None
}

/// Offset past the unescaped quote matching the one at `offset`.
///
/// Handles `"`, `'` and `` ` ``. A backslash escapes the next byte.
pub fn find_quote(source: &str, offset: usize) -> Option<usize> {
    let bytes = source.as_bytes();
    let quote = *bytes.get(offset)?;
    if !matches!(quote, b'"' | b'\'' | b'`') {
        return None;
    }

    let mut i = offset + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b if b == quote => return Some(i + 1),
            _ => i += 1,
        }
    }
    None
}

/// Offset past the `}` matching the `{` at `offset`, respecting nested braces
/// and braces inside string literals.
pub fn find_program(source: &str, offset: usize) -> Option<usize> {
    let bytes = source.as_bytes();
    if bytes.get(offset) != Some(&b'{') {
        return None;
    }

    let mut depth = 0usize;
    let mut i = offset;
    while i < bytes.len() {
        match bytes[i] {
            b'"' | b'\'' | b'`' => {
                i = find_quote(source, i)?;
                continue;
            }
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// Offset past the `-->` of the comment whose `<!--` is at `offset`
pub fn find_comment(source: &str, offset: usize) -> Option<usize> {
    if !source.get(offset..)?.starts_with("<!--") {
        return None;
    }
    source[offset + 4..].find("-->").map(|at| offset + 4 + at + 3)
}

/// Offset past the literal `</name>` closing the raw-text element whose opening
/// tag starts at `offset`. Everything between the tags is opaque.
pub fn find_raw_text(source: &str, offset: usize, name: &str) -> Option<usize> {
    let content_start = find_markup(source, offset)?;
    find_close_tag(source, content_start, name).map(|(_, end)| end)
}

/// `find_raw_text` for `<script>`
pub fn find_script(source: &str, offset: usize) -> Option<usize> {
    find_raw_text(source, offset, "script")
}

/// `find_raw_text` for `<style>`
pub fn find_style(source: &str, offset: usize) -> Option<usize> {
    find_raw_text(source, offset, "style")
}

/// Locate `</name>` (ASCII case-insensitive, optional whitespace before `>`)
/// at or after `from`. Returns the tag's start and end offsets.
pub(crate) fn find_close_tag(source: &str, from: usize, name: &str) -> Option<(usize, usize)> {
    let bytes = source.as_bytes();
    let mut search = from;
    while let Some(at) = source.get(search..)?.find("</") {
        let tag_start = search + at;
        let name_start = tag_start + 2;
        let name_end = name_start + name.len();
        let named = source
            .get(name_start..name_end)
            .is_some_and(|candidate| candidate.eq_ignore_ascii_case(name));
        if named {
            let mut i = name_end;
            while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            if bytes.get(i) == Some(&b'>') {
                return Some((tag_start, i + 1));
            }
        }
        search = name_start;
    }
    None
}
