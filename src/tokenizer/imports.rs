//! Import declaration scanning for script blocks.
//!
//! The scanner walks a script's text once, skipping string literals and
//! comments, and recognizes `import` at statement start. The script text itself
//! is never modified.

use super::boundary::find_quote;
use crate::ast::{ImportSpecifier, ImportToken};

/// Every static import declaration in `script`. Offsets are shifted by `base`,
/// the position of the script text inside the document.
pub fn scan(script: &str, base: usize) -> Vec<ImportToken> {
    let bytes = script.as_bytes();
    let mut imports = Vec::new();
    let mut statement_start = true;
    // a `/` here opens a regex literal rather than dividing
    let mut regex_allowed = true;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        match b {
            b'"' | b'\'' | b'`' => {
                match find_quote(script, i) {
                    Some(end) => i = end,
                    None => i += 1,
                }
                statement_start = false;
                regex_allowed = false;
            }
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                i = script[i..].find('\n').map_or(bytes.len(), |at| i + at);
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i = script[i + 2..].find("*/").map_or(bytes.len(), |at| i + 2 + at + 2);
            }
            b'/' if regex_allowed => {
                i = regex_end(bytes, i).unwrap_or(i + 1);
                statement_start = false;
                regex_allowed = false;
            }
            b'\n' | b';' | b'{' | b'}' => {
                statement_start = true;
                regex_allowed = true;
                i += 1;
            }
            b if b.is_ascii_whitespace() => i += 1,
            b if is_word_start(b) => {
                let start = i;
                let end = word_end(bytes, i);
                let word = &script[start..end];
                if statement_start && word == "import" {
                    if let Some(mut import) = parse_import(script, start) {
                        log::trace!("import {:?} at {}", import.source, base + start);
                        i = import.end;
                        import.start += base;
                        import.end += base;
                        imports.push(import);
                        statement_start = true;
                        regex_allowed = true;
                        continue;
                    }
                }
                i = end;
                statement_start = false;
                regex_allowed = REGEX_KEYWORDS.contains(&word);
            }
            b if b.is_ascii_digit() => {
                i = word_end(bytes, i);
                statement_start = false;
                regex_allowed = false;
            }
            _ => {
                i += 1;
                statement_start = false;
                regex_allowed = !matches!(b, b')' | b']');
            }
        }
    }

    imports
}

/// Keywords after which `/` starts a regex literal
const REGEX_KEYWORDS: &[&str] = &[
    "return", "typeof", "instanceof", "in", "of", "new", "delete", "void", "throw", "case", "do",
    "else", "yield", "await",
];

/// End of the regex literal opening at `start`, past its closing `/`. Slashes
/// inside `[...]` classes and escaped characters do not close it. `None` when a
/// line ends first.
fn regex_end(bytes: &[u8], start: usize) -> Option<usize> {
    let mut i = start + 1;
    let mut in_class = false;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 1,
            b'\n' => return None,
            b'[' => in_class = true,
            b']' => in_class = false,
            b'/' if !in_class => return Some(i + 1),
            _ => {}
        }
        i += 1;
    }
    None
}

fn is_word_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b'$'
}

fn is_word_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

fn word_end(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && is_word_char(bytes[i]) {
        i += 1;
    }
    i
}

/// Minimal cursor over one import statement
struct Cursor<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn peek(&self) -> Option<u8> {
        self.src.as_bytes().get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn eat(&mut self, b: u8) -> bool {
        self.skip_whitespace();
        if self.peek() == Some(b) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn word(&mut self) -> Option<&'a str> {
        self.skip_whitespace();
        if !self.peek().is_some_and(is_word_start) {
            return None;
        }
        let start = self.pos;
        self.pos = word_end(self.src.as_bytes(), start);
        Some(&self.src[start..self.pos])
    }

    fn peek_word(&self) -> Option<&'a str> {
        let mut ahead = Cursor { src: self.src, pos: self.pos };
        ahead.word()
    }

    fn keyword(&mut self, keyword: &str) -> bool {
        if self.peek_word() == Some(keyword) {
            self.word();
            true
        } else {
            false
        }
    }

    /// A quoted module specifier, without its quotes
    fn string(&mut self) -> Option<&'a str> {
        self.skip_whitespace();
        if !matches!(self.peek(), Some(b'"' | b'\'')) {
            return None;
        }
        let start = self.pos;
        let end = find_quote(self.src, start)?;
        self.pos = end;
        Some(&self.src[start + 1..end - 1])
    }
}

/// Parse the statement whose `import` keyword starts at `start`
fn parse_import(script: &str, start: usize) -> Option<ImportToken> {
    let mut cursor = Cursor { src: script, pos: start + "import".len() };

    // import(...) and import.meta are expressions
    let after = cursor.peek()?;
    if !(after.is_ascii_whitespace() || matches!(after, b'{' | b'*' | b'"' | b'\'')) {
        return None;
    }

    let mut import = ImportToken {
        type_only: false,
        default: None,
        namespace: None,
        specifiers: Vec::new(),
        source: String::new(),
        start,
        end: start,
    };

    if let Some(source) = cursor.string() {
        import.source = source.to_string();
        return Some(finish(import, cursor));
    }

    // `import type X from ...`, but `import type from ...` imports a default named type
    if cursor.peek_word() == Some("type") {
        let mut ahead = Cursor { src: script, pos: cursor.pos };
        ahead.word();
        ahead.skip_whitespace();
        let clause_follows = match ahead.peek() {
            Some(b'{' | b'*') => true,
            _ => ahead.peek_word().is_some_and(|word| word != "from"),
        };
        if clause_follows {
            import.type_only = true;
            cursor = ahead;
        }
    }

    if cursor.eat(b'*') {
        import.namespace = Some(namespace(&mut cursor)?);
    } else if cursor.eat(b'{') {
        import.specifiers = specifiers(&mut cursor)?;
    } else {
        import.default = Some(cursor.word()?.to_string());
        if cursor.eat(b',') {
            if cursor.eat(b'*') {
                import.namespace = Some(namespace(&mut cursor)?);
            } else if cursor.eat(b'{') {
                import.specifiers = specifiers(&mut cursor)?;
            } else {
                return None;
            }
        }
    }

    if !cursor.keyword("from") {
        return None;
    }
    import.source = cursor.string()?.to_string();
    Some(finish(import, cursor))
}

fn namespace(cursor: &mut Cursor<'_>) -> Option<String> {
    if !cursor.keyword("as") {
        return None;
    }
    cursor.word().map(str::to_string)
}

/// Named specifiers after the opening `{`, through the closing `}`
fn specifiers(cursor: &mut Cursor<'_>) -> Option<Vec<ImportSpecifier>> {
    let mut specifiers = Vec::new();
    loop {
        if cursor.eat(b'}') {
            return Some(specifiers);
        }

        let mut imported = cursor.word()?;
        let mut type_only = false;
        if imported == "type" {
            if let Some(next) = cursor.peek_word().filter(|&word| word != "as") {
                cursor.word();
                imported = next;
                type_only = true;
            }
        }
        let local = if cursor.keyword("as") { cursor.word()? } else { imported };
        specifiers.push(ImportSpecifier {
            imported: imported.to_string(),
            local: local.to_string(),
            type_only,
        });

        if !cursor.eat(b',') {
            cursor.skip_whitespace();
            if cursor.peek() != Some(b'}') {
                return None;
            }
        }
    }
}

/// Take an optional trailing semicolon and record the end offset
fn finish(mut import: ImportToken, mut cursor: Cursor<'_>) -> ImportToken {
    let before = cursor.pos;
    if !cursor.eat(b';') {
        cursor.pos = before;
    }
    import.end = cursor.pos;
    import
}
