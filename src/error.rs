use crate::positions::line_col;
use std::fmt;
use thiserror::Error;

/// Failures raised by [`Lexer`](crate::lexer::Lexer)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexerError {
    /// A requested definition name is not registered
    #[error("Unknown definition {0}")]
    UnknownDefinition(String),

    /// `expect` was called with an empty name set
    #[error("Unknown definitions")]
    UnknownDefinitions,

    /// Nothing matched at a required position
    #[error("Unexpected {preview}{}", expecting(.expected))]
    UnexpectedToken {
        /// At most ten characters of the unmatched remainder
        preview: String,
        expected: Vec<String>,
        offset: usize,
    },
}

fn expecting(expected: &[String]) -> String {
    if expected.is_empty() {
        String::new()
    } else {
        format!(" expecting {}", expected.join(", "))
    }
}

/// Failures raised by [`Parser`](crate::parser::Parser)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataError {
    #[error("Unknown reference {0}")]
    UnknownReference(String),

    #[error("Invalid data token type")]
    InvalidDataTokenType,

    #[error("Malformed property")]
    MalformedProperty,

    #[error("Malformed object")]
    MalformedObject,

    #[error("Malformed array")]
    MalformedArray,
}

/// Kind of tokenize error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    UnclosedElement,
    MismatchedCloseTag,
    UnexpectedCloseTag,
    UnterminatedTag,
    UnterminatedQuote,
    UnterminatedProgram,
    UnterminatedComment,
    UnterminatedRawText,
    NestingTooDeep,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::UnclosedElement => "Unclosed element",
            ErrorKind::MismatchedCloseTag => "Mismatched close tag",
            ErrorKind::UnexpectedCloseTag => "Unexpected close tag",
            ErrorKind::UnterminatedTag => "Unterminated tag",
            ErrorKind::UnterminatedQuote => "Unterminated quote",
            ErrorKind::UnterminatedProgram => "Unterminated expression",
            ErrorKind::UnterminatedComment => "Unterminated comment",
            ErrorKind::UnterminatedRawText => "Unterminated raw text element",
            ErrorKind::NestingTooDeep => "Nesting too deep",
        }
    }
}

/// Document-level tokenize failure. No partial tree accompanies it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenizeError {
    pub kind: ErrorKind,
    pub message: String,
    /// Byte offset where the offending construct starts
    pub start: usize,
    pub end: usize,
    /// e.g. the open tag a mismatched close tag should have closed
    pub related: Option<usize>,
    pub related_label: Option<String>,
    pub help: Option<String>,
}

impl TokenizeError {
    /// Create a new tokenize error
    pub fn new(kind: ErrorKind, message: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            kind,
            message: message.into(),
            start,
            end,
            related: None,
            related_label: None,
            help: None,
        }
    }

    /// Add a related offset with a label (e.g., "opened here")
    pub fn with_related(mut self, offset: usize, label: impl Into<String>) -> Self {
        self.related = Some(offset);
        self.related_label = Some(label.into());
        self
    }

    /// Add help text
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Render the error with source context
    pub fn render(&self, source: &str, filename: &str) -> String {
        self.render_inner(source, filename, false)
    }

    /// Render the error with ANSI color codes
    pub fn render_color(&self, source: &str, filename: &str) -> String {
        self.render_inner(source, filename, true)
    }

    fn render_inner(&self, source: &str, filename: &str, color: bool) -> String {
        let red = if color { "\x1b[1;31m" } else { "" };
        let dim = if color { "\x1b[2m" } else { "" };
        let cyan = if color { "\x1b[1;38;5;73m" } else { "" };
        let reset = if color { "\x1b[0m" } else { "" };

        let mut output = String::new();
        output.push('\n');

        let location = line_col(source, self.start);
        output.push_str(&format!(
            " {}file:{} {}:{}:{}\n",
            dim,
            reset,
            filename,
            location.line + 1,
            location.col + 1
        ));

        let message = if color { highlight_inline_tags(&self.message) } else { self.message.clone() };
        output.push_str(&format!("{}error:{} {}\n", red, reset, message));

        let width = (location.line + 1).to_string().len().max(2);
        if let Some(source_line) = source.lines().nth(location.line) {
            let end = line_col(source, self.end.max(self.start));
            let underline_len = if end.line == location.line {
                end.col.saturating_sub(location.col).max(1)
            } else {
                source_line.chars().count().saturating_sub(location.col).max(1)
            };

            output.push_str(&format!("{}{:>width$} |{}\n", dim, "", reset, width = width));
            output.push_str(&format!(
                "{}{:>width$} |{} {}\n",
                dim, location.line + 1, reset, source_line, width = width
            ));
            output.push_str(&format!(
                "{}{:>width$} |{} {}{}{}{}\n",
                dim, "", reset,
                " ".repeat(location.col), red, "^".repeat(underline_len), reset,
                width = width
            ));
        }

        if let Some(related) = self.related {
            let at = line_col(source, related);
            if let Some(related_line) = source.lines().nth(at.line) {
                let label = self.related_label.as_deref().unwrap_or("opened here");
                output.push_str(&format!(
                    "{}{:>width$} |{} {}\n",
                    dim, at.line + 1, reset, related_line, width = width
                ));
                output.push_str(&format!(
                    "{}{:>width$} |{} {}{}^ {}{}\n",
                    dim, "", reset,
                    " ".repeat(at.col), dim, label, reset,
                    width = width
                ));
            }
        }

        if let Some(ref help) = self.help {
            output.push('\n');
            for (i, help_line) in help.lines().enumerate() {
                let content = if color { highlight_inline_tags(help_line) } else { help_line.to_string() };
                if i == 0 {
                    output.push_str(&format!(" {}help:{} {}\n", cyan, reset, content));
                } else {
                    output.push_str(&format!("       {}\n", content));
                }
            }
        }

        output.push('\n');
        output
    }
}

impl fmt::Display for TokenizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for TokenizeError {}

/// Any failure from the front end
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Lexer(#[from] LexerError),

    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Tokenize(#[from] TokenizeError),
}

impl Error {
    /// Render the error with source context (no color)
    pub fn render(&self, source: &str, filename: &str) -> String {
        match self {
            Error::Tokenize(err) => err.render(source, filename),
            other => format!("error: {}\n", other),
        }
    }

    /// Render the error with ANSI color codes
    pub fn render_color(&self, source: &str, filename: &str) -> String {
        match self {
            Error::Tokenize(err) => err.render_color(source, filename),
            other => format!("\x1b[1;31merror\x1b[0m: \x1b[1m{}\x1b[0m\n", other),
        }
    }
}

/// Highlight `<tag>` and `</tag>` mentions in prose text
fn highlight_inline_tags(text: &str) -> String {
    const TAG: &str = "\x1b[38;5;180m";
    const RESET: &str = "\x1b[0m";

    let mut result = String::with_capacity(text.len() * 2);
    let mut rest = text;
    while let Some(open) = rest.find('<') {
        result.push_str(&rest[..open]);
        let candidate = &rest[open..];
        let close = candidate.find('>');
        let is_tag = close.is_some_and(|close| {
            let inner = candidate[1..close].trim_start_matches('/');
            !inner.is_empty()
                && inner.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        });
        match close {
            Some(close) if is_tag => {
                result.push_str(TAG);
                result.push_str(&candidate[..=close]);
                result.push_str(RESET);
                rest = &candidate[close + 1..];
            }
            _ => {
                result.push('<');
                rest = &candidate[1..];
            }
        }
    }
    result.push_str(rest);
    result
}
