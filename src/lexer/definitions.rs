//! Definition registry and the built-in data-literal grammar.
//!
//! A definition recognizes exactly one production at a given offset. Composite
//! definitions (object, array) recurse through the [`Lexer`] they are handed, so
//! a custom registry can change what counts as a value inside them.

use super::Lexer;
use crate::ast::{
    ArrayToken, IdentifierToken, LiteralToken, ObjectToken, ProgramToken, PropertyToken, Scalar, Token,
};
use crate::tokenizer::boundary::find_program;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Recognizer for one production: `(source, offset, lexer) -> token`
pub type Definition = Arc<dyn Fn(&str, usize, &Lexer) -> Option<Token> + Send + Sync>;

/// Scalar literals, in the order they are tried
pub const SCALAR: &[&str] = &["Null", "Boolean", "String", "Float", "Integer"];

/// Everything a data position accepts
pub const DATA: &[&str] = &[
    "Null",
    "Boolean",
    "String",
    "Float",
    "Integer",
    "ObjectExpression",
    "ArrayExpression",
    "Identifier",
];

/// Ordered name -> definition map. Registration order is the default
/// alternation order; redefining a name keeps its original position.
#[derive(Clone, Default)]
pub struct Definitions {
    order: Vec<String>,
    table: HashMap<String, Definition>,
}

impl Definitions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or overwrite a definition
    pub fn define<F>(&mut self, name: impl Into<String>, definition: F)
    where
        F: Fn(&str, usize, &Lexer) -> Option<Token> + Send + Sync + 'static,
    {
        let name = name.into();
        if !self.table.contains_key(&name) {
            self.order.push(name.clone());
        }
        self.table.insert(name, Arc::new(definition));
    }

    pub fn get(&self, name: &str) -> Option<&Definition> {
        self.table.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.table.contains_key(name)
    }

    /// Names in registration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl fmt::Debug for Definitions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.order.iter()).finish()
    }
}

/// Registry holding every built-in definition
pub fn standard() -> Definitions {
    let mut definitions = Definitions::new();
    definitions.define("Null", null);
    definitions.define("Boolean", boolean);
    definitions.define("String", string);
    definitions.define("Float", float);
    definitions.define("Integer", integer);
    definitions.define("Identifier", identifier);
    definitions.define("ObjectExpression", object);
    definitions.define("ArrayExpression", array);
    definitions.define("ProgramExpression", program);
    definitions
}

fn is_identifier_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b'$'
}

fn is_identifier_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

fn skip_whitespace(code: &str, mut offset: usize) -> usize {
    let bytes = code.as_bytes();
    while offset < bytes.len() && bytes[offset].is_ascii_whitespace() {
        offset += 1;
    }
    offset
}

/// `word` at `start`, not followed by an identifier character
fn keyword(code: &str, start: usize, word: &str) -> bool {
    let Some(rest) = code.get(start..) else { return false };
    rest.starts_with(word)
        && !code
            .as_bytes()
            .get(start + word.len())
            .copied()
            .is_some_and(is_identifier_char)
}

fn scalar(value: Scalar, code: &str, start: usize, end: usize, escape: bool) -> Token {
    Token::Literal(LiteralToken {
        value,
        raw: code[start..end].to_string(),
        escape,
        start,
        end,
    })
}

pub fn null(code: &str, start: usize, _lexer: &Lexer) -> Option<Token> {
    keyword(code, start, "null").then(|| scalar(Scalar::Null, code, start, start + 4, false))
}

pub fn boolean(code: &str, start: usize, _lexer: &Lexer) -> Option<Token> {
    if keyword(code, start, "true") {
        Some(scalar(Scalar::Boolean(true), code, start, start + 4, false))
    } else if keyword(code, start, "false") {
        Some(scalar(Scalar::Boolean(false), code, start, start + 5, false))
    } else {
        None
    }
}

/// `"..."` or `'...'` with backslash escapes decoded
pub fn string(code: &str, start: usize, _lexer: &Lexer) -> Option<Token> {
    let rest = code.get(start..)?;
    let mut chars = rest.char_indices();
    let (_, quote) = chars.next()?;
    if quote != '"' && quote != '\'' {
        return None;
    }

    let mut value = String::new();
    let mut escape = false;
    while let Some((i, ch)) = chars.next() {
        if ch == quote {
            let end = start + i + 1;
            return Some(scalar(Scalar::String(value), code, start, end, escape));
        }
        if ch != '\\' {
            value.push(ch);
            continue;
        }

        escape = true;
        let (_, escaped) = chars.next()?;
        match escaped {
            'n' => value.push('\n'),
            't' => value.push('\t'),
            'r' => value.push('\r'),
            '0' => value.push('\0'),
            'u' => match unicode_escape(rest, i + 2) {
                Some((decoded, consumed)) => {
                    value.push(decoded);
                    chars.nth(consumed - 1);
                }
                None => value.push('u'),
            },
            other => value.push(other),
        }
    }
    None
}

/// Four hex digits at `at`, read without consuming anything else
fn hex4(rest: &str, at: usize) -> Option<u32> {
    let hex = rest.get(at..at + 4)?;
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(hex, 16).ok()
}

/// Decode the digits of a `\u` escape starting at `at`. Returns the char and
/// how many bytes after `u` it used. A high surrogate followed by a `\uXXXX`
/// low surrogate combines into one char; a lone surrogate becomes U+FFFD.
fn unicode_escape(rest: &str, at: usize) -> Option<(char, usize)> {
    let unit = hex4(rest, at)?;
    if (0xD800..0xDC00).contains(&unit) {
        let low = rest
            .get(at + 4..at + 6)
            .filter(|prefix| *prefix == "\\u")
            .and_then(|_| hex4(rest, at + 6))
            .filter(|low| (0xDC00..0xE000).contains(low));
        if let Some(low) = low {
            let combined = 0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00);
            return Some((char::from_u32(combined)?, 10));
        }
    }
    Some((char::from_u32(unit).unwrap_or(char::REPLACEMENT_CHARACTER), 4))
}

/// Length of `-?digits` at `start`, zero when there are no digits
fn digits(code: &str, start: usize) -> usize {
    let bytes = code.as_bytes();
    let mut i = start;
    if bytes.get(i) == Some(&b'-') {
        i += 1;
    }
    let first = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    if i == first { 0 } else { i - start }
}

/// `-?digits.digits`
pub fn float(code: &str, start: usize, _lexer: &Lexer) -> Option<Token> {
    let bytes = code.as_bytes();
    let whole = digits(code, start);
    if whole == 0 || bytes.get(start + whole) != Some(&b'.') {
        return None;
    }
    let fraction_start = start + whole + 1;
    let mut end = fraction_start;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end == fraction_start {
        return None;
    }

    let value: f64 = code[start..end].parse().ok()?;
    value
        .is_finite()
        .then(|| scalar(Scalar::Float(value), code, start, end, false))
}

/// `-?digits`. Values beyond `i64` become floats.
pub fn integer(code: &str, start: usize, _lexer: &Lexer) -> Option<Token> {
    let len = digits(code, start);
    if len == 0 {
        return None;
    }
    let end = start + len;
    let text = &code[start..end];
    let value = match text.parse::<i64>() {
        Ok(value) => Scalar::Integer(value),
        Err(_) => {
            let value: f64 = text.parse().ok()?;
            if !value.is_finite() {
                return None;
            }
            Scalar::Float(value)
        }
    };
    Some(scalar(value, code, start, end, false))
}

fn identifier_token(code: &str, start: usize) -> Option<IdentifierToken> {
    let bytes = code.as_bytes();
    if !bytes.get(start).copied().is_some_and(is_identifier_start) {
        return None;
    }
    let mut end = start + 1;
    while end < bytes.len() && is_identifier_char(bytes[end]) {
        end += 1;
    }
    Some(IdentifierToken { name: code[start..end].to_string(), start, end })
}

pub fn identifier(code: &str, start: usize, _lexer: &Lexer) -> Option<Token> {
    identifier_token(code, start).map(Token::Identifier)
}

/// Property key: an identifier, or a string literal standing in for one
fn property_key(code: &str, start: usize, lexer: &Lexer) -> Option<IdentifierToken> {
    if let Some(key) = identifier_token(code, start) {
        return Some(key);
    }
    match string(code, start, lexer)? {
        Token::Literal(LiteralToken { value: Scalar::String(name), start, end, .. }) => {
            Some(IdentifierToken { name, start, end })
        }
        _ => None,
    }
}

fn data_value(offset: usize, lexer: &Lexer) -> Option<Token> {
    lexer.match_at(offset, Some(DATA)).ok().flatten()
}

/// `{ key: value, ... }` with an optional trailing comma
pub fn object(code: &str, start: usize, lexer: &Lexer) -> Option<Token> {
    let bytes = code.as_bytes();
    if bytes.get(start) != Some(&b'{') {
        return None;
    }
    lexer.nested(|| object_body(code, start, lexer))
}

fn object_body(code: &str, start: usize, lexer: &Lexer) -> Option<Token> {
    let bytes = code.as_bytes();
    let mut properties = Vec::new();
    let mut i = skip_whitespace(code, start + 1);
    loop {
        if bytes.get(i) == Some(&b'}') {
            return Some(Token::ObjectExpression(ObjectToken { properties, start, end: i + 1 }));
        }

        let key = property_key(code, i, lexer)?;
        i = skip_whitespace(code, key.end);
        if bytes.get(i) != Some(&b':') {
            return None;
        }
        let value = data_value(skip_whitespace(code, i + 1), lexer)?;
        i = skip_whitespace(code, value.end());
        properties.push(PropertyToken {
            start: key.start,
            end: value.end(),
            key: Some(key),
            value: Box::new(value),
            spread: false,
            computed: false,
        });

        match bytes.get(i) {
            Some(b',') => i = skip_whitespace(code, i + 1),
            Some(b'}') => {}
            _ => return None,
        }
    }
}

/// `[ value, ... ]` with an optional trailing comma
pub fn array(code: &str, start: usize, lexer: &Lexer) -> Option<Token> {
    let bytes = code.as_bytes();
    if bytes.get(start) != Some(&b'[') {
        return None;
    }
    lexer.nested(|| array_body(code, start, lexer))
}

fn array_body(code: &str, start: usize, lexer: &Lexer) -> Option<Token> {
    let bytes = code.as_bytes();
    let mut elements = Vec::new();
    let mut i = skip_whitespace(code, start + 1);
    loop {
        if bytes.get(i) == Some(&b']') {
            return Some(Token::ArrayExpression(ArrayToken { elements, start, end: i + 1 }));
        }

        let value = data_value(i, lexer)?;
        i = skip_whitespace(code, value.end());
        elements.push(value);

        match bytes.get(i) {
            Some(b',') => i = skip_whitespace(code, i + 1),
            Some(b']') => {}
            _ => return None,
        }
    }
}

/// Brace-balanced `{ ... }` blob, kept as trimmed source text
pub fn program(code: &str, start: usize, _lexer: &Lexer) -> Option<Token> {
    let end = find_program(code, start)?;
    Some(Token::ProgramExpression(ProgramToken {
        source: code[start + 1..end - 1].trim().to_string(),
        start,
        end,
    }))
}
