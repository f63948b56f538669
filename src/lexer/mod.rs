//! Generic backtracking lexer.
//!
//! The lexer owns a cursor over a source text and a shared [`Definitions`]
//! registry. It knows nothing about any grammar; callers pick which definitions
//! to try and in what order.

pub mod definitions;

pub use definitions::{Definition, Definitions, DATA, SCALAR};

use crate::ast::Token;
use crate::error::LexerError;
use std::cell::Cell;
use std::sync::Arc;

/// Longest remainder quoted in an unexpected-token error
const PREVIEW_CHARS: usize = 10;

/// Deepest object/array nesting the standard definitions will lex
pub const MAX_NESTING: usize = 256;

/// Cursor plus registry. Cloning shares the source text and the registry but
/// gives the clone its own cursor.
#[derive(Debug, Clone)]
pub struct Lexer {
    code: Arc<str>,
    index: usize,
    definitions: Arc<Definitions>,
    depth: Cell<usize>,
}

impl Default for Lexer {
    fn default() -> Self {
        Self::new(Definitions::new())
    }
}

impl Lexer {
    pub fn new(definitions: Definitions) -> Self {
        Self::with_shared(Arc::new(definitions))
    }

    /// Lexer over a registry that is already shared
    pub fn with_shared(definitions: Arc<Definitions>) -> Self {
        Self { code: Arc::from(""), index: 0, definitions, depth: Cell::new(0) }
    }

    /// Lexer with the built-in data-literal grammar
    pub fn standard() -> Self {
        Self::new(definitions::standard())
    }

    /// Register or overwrite a definition. A registry still shared with clones
    /// is copied first, so the clones keep the old set.
    pub fn define<F>(&mut self, name: impl Into<String>, definition: F)
    where
        F: Fn(&str, usize, &Lexer) -> Option<Token> + Send + Sync + 'static,
    {
        Arc::make_mut(&mut self.definitions).define(name, definition);
    }

    /// Replace the source text and rewind the cursor
    pub fn load(&mut self, code: &str) {
        self.load_at(code, 0);
    }

    /// Replace the source text and place the cursor at `index`, clamped to the
    /// text and moved back to the nearest char boundary
    pub fn load_at(&mut self, code: &str, index: usize) {
        self.code = Arc::from(code);
        let mut index = index.min(self.code.len());
        while !self.code.is_char_boundary(index) {
            index -= 1;
        }
        self.index = index;
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn definitions(&self) -> &Definitions {
        &self.definitions
    }

    /// Registered names in registration order
    pub fn names(&self) -> Vec<&str> {
        self.definitions.names().collect()
    }

    pub fn has(&self, name: &str) -> bool {
        self.definitions.contains(name)
    }

    /// Try `names` (or every definition, in registration order) at `offset`
    /// and return the first non-empty match. The cursor never moves.
    pub fn match_at(&self, offset: usize, names: Option<&[&str]>) -> Result<Option<Token>, LexerError> {
        let candidates: Vec<&str> = match names {
            Some(names) => names.to_vec(),
            None => self.definitions.names().collect(),
        };

        let mut resolved = Vec::with_capacity(candidates.len());
        for name in &candidates {
            let definition = self
                .definitions
                .get(name)
                .ok_or_else(|| LexerError::UnknownDefinition(name.to_string()))?;
            resolved.push(definition);
        }

        for definition in resolved {
            if let Some(token) = (**definition)(self.code(), offset, self) {
                if !token.is_empty() {
                    return Ok(Some(token));
                }
            }
        }
        Ok(None)
    }

    /// Whether any of `names` matches at the cursor. Never moves the cursor.
    pub fn next(&self, names: &[&str]) -> Result<bool, LexerError> {
        Ok(self.match_at(self.index, Some(names))?.is_some())
    }

    /// Run `f` one nesting level deeper. Past [`MAX_NESTING`] levels the
    /// result is `None` without calling `f`.
    pub fn nested<T>(&self, f: impl FnOnce() -> Option<T>) -> Option<T> {
        let depth = self.depth.get();
        if depth >= MAX_NESTING {
            log::trace!("nesting limit reached at depth {}", depth);
            return None;
        }
        self.depth.set(depth + 1);
        let result = f();
        self.depth.set(depth);
        result
    }

    /// Match at the cursor and advance past the token. Failure of any kind
    /// leaves the cursor untouched.
    pub fn optional(&mut self, names: &[&str]) -> Option<Token> {
        let token = self.match_at(self.index, Some(names)).ok().flatten()?;
        self.index = token.end();
        Some(token)
    }

    /// Like [`optional`](Self::optional), but a missing match is an error
    pub fn expect(&mut self, names: &[&str]) -> Result<Token, LexerError> {
        if names.is_empty() {
            return Err(LexerError::UnknownDefinitions);
        }

        match self.match_at(self.index, Some(names))? {
            Some(token) => {
                self.index = token.end();
                Ok(token)
            }
            None => Err(LexerError::UnexpectedToken {
                preview: self.preview(self.index),
                expected: names.iter().map(|name| name.to_string()).collect(),
                offset: self.index,
            }),
        }
    }

    /// Succeed only when nothing but whitespace remains after the cursor
    pub fn expect_end(&self) -> Result<(), LexerError> {
        let rest = &self.code[self.index..];
        let offset = self.index + (rest.len() - rest.trim_start().len());
        if offset == self.code.len() {
            return Ok(());
        }
        Err(LexerError::UnexpectedToken { preview: self.preview(offset), expected: Vec::new(), offset })
    }

    /// Skip whitespace, then try `name` at each following offset. On success the
    /// cursor moves past the match; on failure it is restored.
    pub fn find(&mut self, name: &str) -> Result<Option<Token>, LexerError> {
        if !self.has(name) {
            return Err(LexerError::UnknownDefinition(name.to_string()));
        }

        let saved = self.index;
        let rest = &self.code[saved..];
        let mut offset = saved + (rest.len() - rest.trim_start().len());
        while offset < self.code.len() {
            if let Some(token) = self.match_at(offset, Some(&[name]))? {
                self.index = token.end();
                return Ok(Some(token));
            }
            offset += self.code[offset..].chars().next().map_or(1, char::len_utf8);
        }

        self.index = saved;
        Ok(None)
    }

    /// Slice of the source, clamped to its bounds
    pub fn substring(&self, start: usize, end: usize) -> &str {
        let end = end.min(self.code.len());
        let start = start.min(end);
        self.code.get(start..end).unwrap_or("")
    }

    /// Offset of the next whitespace at or after the cursor, or the source length
    pub fn next_space(&self) -> usize {
        self.code[self.index..]
            .find(char::is_whitespace)
            .map_or(self.code.len(), |at| self.index + at)
    }

    fn preview(&self, offset: usize) -> String {
        let word = self.code[offset..]
            .split_whitespace()
            .next()
            .unwrap_or("");
        if word.is_empty() {
            "end of input".to_string()
        } else {
            word.chars().take(PREVIEW_CHARS).collect()
        }
    }
}
