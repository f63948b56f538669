//! Template tokenizer.
//!
//! A single left-to-right pass over the template. Each position is classified
//! (comment, declaration, close tag, open tag, program expression, text) and
//! handed to the matching boundary finder. Element children are tokenized
//! recursively; raw-text elements keep their content as one verbatim literal.

pub mod boundary;
pub mod imports;

use crate::ast::{
    Document, IdentifierToken, LiteralToken, MarkupToken, ObjectToken, ProgramToken, PropertyToken, RawBlock,
    Scalar, Token,
};
use crate::error::{ErrorKind, TokenizeError};
use crate::html::{is_raw_text_element, is_void_element};
use boundary::{find_comment, find_markup, find_program, find_quote};

/// Tokenizer limits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenizeOptions {
    /// Deepest allowed element nesting
    pub max_depth: usize,
}

impl Default for TokenizeOptions {
    fn default() -> Self {
        Self { max_depth: 256 }
    }
}

/// Innermost open element while its children are being tokenized
struct OpenElement<'s> {
    name: &'s str,
    start: usize,
}

pub struct Tokenizer<'a> {
    source: &'a str,
    bytes: &'a [u8],
    position: usize,
    options: TokenizeOptions,
}

impl<'a> Tokenizer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self::with_options(source, TokenizeOptions::default())
    }

    pub fn with_options(source: &'a str, options: TokenizeOptions) -> Self {
        Self { source, bytes: source.as_bytes(), position: 0, options }
    }

    /// Tokenize the entire source into a document
    pub fn tokenize(&mut self) -> Result<Document, TokenizeError> {
        self.position = 0;
        let nodes = self.tokenize_nodes(None, 0)?;

        let mut document = Document::default();
        for node in nodes {
            classify_root(node, &mut document);
        }

        log::debug!(
            "tokenized {} bytes: {} components, {} scripts, {} styles, {} markup, {} imports",
            self.source.len(),
            document.components.len(),
            document.scripts.len(),
            document.styles.len(),
            document.markup.len(),
            document.imports.len()
        );
        Ok(document)
    }

    /// Tokenize sibling nodes until the parent's close tag (or end of input at the root)
    fn tokenize_nodes(&mut self, parent: Option<OpenElement<'a>>, depth: usize) -> Result<Vec<Token>, TokenizeError> {
        let mut nodes = Vec::new();
        let mut text_start = self.position;

        loop {
            if self.at_eof() {
                self.flush_text(&mut nodes, text_start);
                if let Some(open) = &parent {
                    return Err(TokenizeError::new(
                        ErrorKind::UnclosedElement,
                        format!("Unclosed element <{}>.", open.name),
                        open.start,
                        open.start + open.name.len() + 1,
                    )
                    .with_help(format!("Add </{}> to close it.", open.name)));
                }
                break;
            }

            match self.bytes[self.position] {
                b'<' if self.starts_with("<!--") => {
                    self.flush_text(&mut nodes, text_start);
                    nodes.push(self.tokenize_comment()?);
                }
                b'<' if self.starts_with("</") && self.peek_alpha(2) => {
                    self.flush_text(&mut nodes, text_start);
                    self.tokenize_close_tag(parent.as_ref())?;
                    return Ok(drop_layout_whitespace(nodes, false));
                }
                b'<' if self.starts_with("<!") => {
                    self.flush_text(&mut nodes, text_start);
                    nodes.push(self.tokenize_declaration()?);
                }
                b'<' if self.peek_alpha(1) => {
                    self.flush_text(&mut nodes, text_start);
                    nodes.push(self.tokenize_element(depth)?);
                }
                b'{' => {
                    self.flush_text(&mut nodes, text_start);
                    nodes.push(self.tokenize_program()?);
                }
                _ => {
                    self.position += 1;
                    continue;
                }
            }
            text_start = self.position;
        }

        Ok(drop_layout_whitespace(nodes, parent.is_none()))
    }

    fn flush_text(&self, nodes: &mut Vec<Token>, text_start: usize) {
        if self.position > text_start {
            let text = &self.source[text_start..self.position];
            nodes.push(Token::Literal(LiteralToken::text(text, text_start)));
        }
    }

    fn tokenize_comment(&mut self) -> Result<Token, TokenizeError> {
        let start = self.position;
        let end = find_comment(self.source, start).ok_or_else(|| {
            TokenizeError::new(ErrorKind::UnterminatedComment, "Unterminated comment.", start, start + 4)
                .with_help("Close the comment with -->.")
        })?;
        self.position = end;
        Ok(Token::Literal(LiteralToken::text(&self.source[start..end], start)))
    }

    /// `<!DOCTYPE html>` and friends, kept as literal text
    fn tokenize_declaration(&mut self) -> Result<Token, TokenizeError> {
        let start = self.position;
        let end = find_markup(self.source, start).ok_or_else(|| self.unterminated_tag(start))?;
        self.position = end;
        Ok(Token::Literal(LiteralToken::text(&self.source[start..end], start)))
    }

    fn tokenize_program(&mut self) -> Result<Token, TokenizeError> {
        let start = self.position;
        let end = find_program(self.source, start).ok_or_else(|| unterminated_program(start))?;
        self.position = end;
        log::trace!("program expression at {}..{}", start, end);
        Ok(Token::ProgramExpression(ProgramToken {
            source: self.source[start + 1..end - 1].trim().to_string(),
            start,
            end,
        }))
    }

    /// Consume `</name>` and check it closes `parent`
    fn tokenize_close_tag(&mut self, parent: Option<&OpenElement<'a>>) -> Result<(), TokenizeError> {
        let start = self.position;
        let end = find_markup(self.source, start).ok_or_else(|| self.unterminated_tag(start))?;
        let name = self.tag_name(start + 2);

        match parent {
            Some(open) if open.name.eq_ignore_ascii_case(name) => {
                self.position = end;
                Ok(())
            }
            Some(open) => Err(TokenizeError::new(
                ErrorKind::MismatchedCloseTag,
                format!("Expected </{}> to close <{}>, found </{}>.", open.name, open.name, name),
                start,
                end,
            )
            .with_related(open.start, format!("<{}> opened here", open.name))
            .with_help(format!("Close <{}> before </{}>.", open.name, name))),
            None => Err(TokenizeError::new(
                ErrorKind::UnexpectedCloseTag,
                format!("Unexpected </{}> with no open element.", name),
                start,
                end,
            )),
        }
    }

    /// Opening tag, then its children as the element kind requires
    fn tokenize_element(&mut self, depth: usize) -> Result<Token, TokenizeError> {
        let start = self.position;
        let tag_end = find_markup(self.source, start).ok_or_else(|| self.unterminated_tag(start))?;
        let name = self.tag_name(start + 1);
        let name_end = start + 1 + name.len();

        let (attributes, self_closing) = self.tokenize_attributes(name_end, tag_end - 1)?;
        self.position = tag_end;

        let children = if self_closing || is_void_element(name) {
            Vec::new()
        } else if is_raw_text_element(name) {
            let (close_start, close_end) = boundary::find_close_tag(self.source, tag_end, name).ok_or_else(|| {
                TokenizeError::new(
                    ErrorKind::UnterminatedRawText,
                    format!("Unterminated <{}> element.", name),
                    start,
                    tag_end,
                )
                .with_help(format!("Add </{}> after its content.", name))
            })?;
            self.position = close_end;
            if close_start > tag_end {
                vec![Token::Literal(LiteralToken::text(&self.source[tag_end..close_start], tag_end))]
            } else {
                Vec::new()
            }
        } else {
            if depth >= self.options.max_depth {
                return Err(TokenizeError::new(
                    ErrorKind::NestingTooDeep,
                    format!("Elements nested deeper than {} levels.", self.options.max_depth),
                    start,
                    tag_end,
                ));
            }
            self.tokenize_nodes(Some(OpenElement { name, start }), depth + 1)?
        };

        log::trace!("element <{}> at {}..{}", name, start, self.position);
        Ok(Token::MarkupExpression(MarkupToken {
            name: name.to_string(),
            attributes,
            children,
            start,
            end: self.position,
        }))
    }

    /// Attribute list between the tag name and `>`, plus whether the tag ends
    /// with `/>`. Only a `/` where an attribute name could start counts; in
    /// `href=/>` it belongs to the value.
    fn tokenize_attributes(&self, from: usize, to: usize) -> Result<(ObjectToken, bool), TokenizeError> {
        let mut properties = Vec::new();
        let mut self_closing = false;
        let mut i = from;

        loop {
            while i < to && self.bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            if i >= to {
                break;
            }

            if self.bytes[i] == b'{' {
                let property = self.tokenize_brace_attribute(i, to)?;
                i = property.end;
                properties.push(property);
            } else if is_attribute_name_char(self.bytes[i]) {
                let property = self.tokenize_named_attribute(i, to)?;
                i = property.end;
                properties.push(property);
            } else {
                self_closing = self.bytes[i] == b'/' && i + 1 == to;
                i += 1;
            }
        }

        let (start, end) = match (properties.first(), properties.last()) {
            (Some(first), Some(last)) => (first.start, last.end),
            _ => (from, from),
        };
        Ok((ObjectToken { properties, start, end }, self_closing))
    }

    /// `{...spread}` or computed `{name}`
    fn tokenize_brace_attribute(&self, start: usize, to: usize) -> Result<PropertyToken, TokenizeError> {
        let end = find_program(self.source, start)
            .filter(|&end| end <= to)
            .ok_or_else(|| unterminated_program(start))?;
        let raw = &self.source[start + 1..end - 1];
        let inner = raw.trim();

        if let Some(expr) = inner.strip_prefix("...") {
            let value = program_token(expr.trim(), start, end);
            return Ok(PropertyToken {
                key: None,
                value: Box::new(value),
                spread: true,
                computed: false,
                start,
                end,
            });
        }

        let key_start = start + 1 + (raw.len() - raw.trim_start().len());
        Ok(PropertyToken {
            key: Some(IdentifierToken { name: inner.to_string(), start: key_start, end: key_start + inner.len() }),
            value: Box::new(program_token(inner, start, end)),
            spread: false,
            computed: true,
            start,
            end,
        })
    }

    /// `name`, `name="v"`, `name='v'`, `name=v` or `name={expr}`
    fn tokenize_named_attribute(&self, start: usize, to: usize) -> Result<PropertyToken, TokenizeError> {
        let mut name_end = start;
        while name_end < to && is_attribute_name_char(self.bytes[name_end]) {
            name_end += 1;
        }
        let key = IdentifierToken { name: self.source[start..name_end].to_string(), start, end: name_end };

        let mut i = name_end;
        while i < to && self.bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i >= to || self.bytes[i] != b'=' {
            let value = Token::Literal(LiteralToken {
                value: Scalar::Boolean(true),
                raw: key.name.clone(),
                escape: false,
                start,
                end: name_end,
            });
            return Ok(property(key, value));
        }

        i += 1;
        while i < to && self.bytes[i].is_ascii_whitespace() {
            i += 1;
        }

        let value = match self.bytes.get(i) {
            Some(b'"' | b'\'') if i < to => {
                let end = find_quote(self.source, i).filter(|&end| end <= to).ok_or_else(|| {
                    TokenizeError::new(ErrorKind::UnterminatedQuote, "Unterminated attribute value.", i, i + 1)
                })?;
                Token::Literal(LiteralToken {
                    value: Scalar::String(self.source[i + 1..end - 1].to_string()),
                    raw: self.source[i..end].to_string(),
                    escape: false,
                    start: i,
                    end,
                })
            }
            Some(b'{') if i < to => {
                let end = find_program(self.source, i)
                    .filter(|&end| end <= to)
                    .ok_or_else(|| unterminated_program(i))?;
                program_token(self.source[i + 1..end - 1].trim(), i, end)
            }
            _ => {
                let mut end = i;
                while end < to && !self.bytes[end].is_ascii_whitespace() {
                    end += 1;
                }
                Token::Literal(LiteralToken::text(&self.source[i..end], i))
            }
        };
        Ok(property(key, value))
    }

    fn tag_name(&self, from: usize) -> &'a str {
        let source = self.source;
        let mut end = from;
        while end < self.bytes.len() && is_tag_name_char(self.bytes[end]) {
            end += 1;
        }
        &source[from..end]
    }

    /// Why `find_markup` failed at `start`: an open quote or brace inside the
    /// tag, or a tag that simply never reaches `>`
    fn unterminated_tag(&self, start: usize) -> TokenizeError {
        let mut i = start + 1;
        while i < self.bytes.len() {
            match self.bytes[i] {
                b'"' | b'\'' => match find_quote(self.source, i) {
                    Some(end) => i = end,
                    None => {
                        return TokenizeError::new(
                            ErrorKind::UnterminatedQuote,
                            "Unterminated attribute value.",
                            i,
                            i + 1,
                        )
                        .with_help("Close the quoted value with a matching quote.");
                    }
                },
                b'{' => match find_program(self.source, i) {
                    Some(end) => i = end,
                    None => return unterminated_program(i),
                },
                _ => i += 1,
            }
        }

        let from = if self.bytes.get(start + 1) == Some(&b'/') { start + 2 } else { start + 1 };
        let name = self.tag_name(from);
        let err = TokenizeError::new(ErrorKind::UnterminatedTag, "Unterminated tag.", start, from + name.len());
        if name.is_empty() {
            err
        } else {
            err.with_help(format!("Close the <{}> tag with >.", name))
        }
    }

    // === Low-level helpers ===

    fn at_eof(&self) -> bool {
        self.position >= self.bytes.len()
    }

    fn starts_with(&self, prefix: &str) -> bool {
        self.source[self.position..].starts_with(prefix)
    }

    fn peek_alpha(&self, ahead: usize) -> bool {
        self.bytes.get(self.position + ahead).is_some_and(|b| b.is_ascii_alphabetic())
    }
}

/// Tokenize a template with default options
pub fn tokenize(source: &str) -> Result<Document, TokenizeError> {
    Tokenizer::new(source).tokenize()
}

/// Tokenize a template with explicit limits
pub fn tokenize_with(source: &str, options: TokenizeOptions) -> Result<Document, TokenizeError> {
    Tokenizer::with_options(source, options).tokenize()
}

/// Sort one root node into its document collection
fn classify_root(node: Token, document: &mut Document) {
    let markup = match node {
        Token::MarkupExpression(markup) => markup,
        other => {
            document.markup.push(other);
            return;
        }
    };

    if markup.name.eq_ignore_ascii_case("link")
        && markup.attributes.get_str("rel").is_some_and(|rel| rel.eq_ignore_ascii_case("import"))
    {
        document.components.push(markup);
    } else if markup.name.eq_ignore_ascii_case("script") && markup.attributes.get("src").is_none() {
        let content_start = markup.children.first().map(Token::start);
        let block = raw_block(markup);
        if let Some(offset) = content_start {
            document.imports.extend(imports::scan(&block.source, offset));
        }
        document.scripts.push(block);
    } else if markup.name.eq_ignore_ascii_case("style") {
        document.styles.push(raw_block(markup));
    } else {
        document.markup.push(Token::MarkupExpression(markup));
    }
}

fn is_tag_name_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b':' | b'.')
}

fn is_attribute_name_char(b: u8) -> bool {
    !b.is_ascii_whitespace() && !matches!(b, b'=' | b'"' | b'\'' | b'{' | b'}' | b'<' | b'>' | b'/')
}

fn unterminated_program(start: usize) -> TokenizeError {
    TokenizeError::new(ErrorKind::UnterminatedProgram, "Unterminated expression.", start, start + 1)
        .with_help("Close the expression with a matching }.")
}

fn program_token(source: &str, start: usize, end: usize) -> Token {
    Token::ProgramExpression(ProgramToken { source: source.to_string(), start, end })
}

fn property(key: IdentifierToken, value: Token) -> PropertyToken {
    PropertyToken {
        start: key.start,
        end: value.end(),
        key: Some(key),
        value: Box::new(value),
        spread: false,
        computed: false,
    }
}

fn raw_block(markup: MarkupToken) -> RawBlock {
    let source = match markup.children.first() {
        Some(Token::Literal(content)) => content.raw.clone(),
        _ => String::new(),
    };
    RawBlock { name: markup.name, attributes: markup.attributes, source, start: markup.start, end: markup.end }
}

/// Drop whitespace-only text that is only layout.
///
/// At the root every whitespace-only run goes. Inside an element a run is layout
/// when it spans a line break, unless it is the element's sole content.
fn drop_layout_whitespace(nodes: Vec<Token>, root: bool) -> Vec<Token> {
    if !root && nodes.len() == 1 {
        return nodes;
    }
    nodes
        .into_iter()
        .filter(|node| match node {
            Token::Literal(text) if text.raw.trim().is_empty() => !root && !text.raw.contains('\n'),
            _ => true,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn markup(token: &Token) -> &MarkupToken {
        token.as_markup().expect("markup token")
    }

    #[test]
    fn test_simple_element() {
        let doc = tokenize("<div>Hello</div>").unwrap();
        assert_eq!(doc.markup.len(), 1);
        let div = markup(&doc.markup[0]);
        assert_eq!(div.name, "div");
        assert_eq!((div.start, div.end), (0, 16));
        assert_eq!(div.children[0].as_literal().unwrap().raw, "Hello");
    }

    #[test]
    fn test_dollar_text() {
        let doc = tokenize("<div><span>$</span>ok</div>").unwrap();
        let div = markup(&doc.markup[0]);
        let span = markup(&div.children[0]);
        assert_eq!(span.name, "span");
        assert_eq!(span.children[0].as_literal().unwrap().value, Scalar::String("$".to_string()));
        assert_eq!(div.children[1].as_literal().unwrap().raw, "ok");
    }

    #[test]
    fn test_unclosed_element() {
        let err = tokenize("<div><span>text").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnclosedElement);
        assert_eq!(err.start, 5);
    }

    #[test]
    fn test_mismatched_close_tag() {
        let err = tokenize("<div><span>text</div>").unwrap_err();
        assert_eq!(err.kind, ErrorKind::MismatchedCloseTag);
        assert_eq!(err.start, 15);
        assert_eq!(err.related, Some(5));
    }

    #[test]
    fn test_unexpected_close_tag() {
        let err = tokenize("text</p>").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnexpectedCloseTag);
        assert_eq!(err.start, 4);
    }

    #[test]
    fn test_unterminated_constructs() {
        assert_eq!(tokenize("<div class").unwrap_err().kind, ErrorKind::UnterminatedTag);
        assert_eq!(tokenize("<div class=\"x").unwrap_err().kind, ErrorKind::UnterminatedQuote);
        assert_eq!(tokenize("<div data={x").unwrap_err().kind, ErrorKind::UnterminatedProgram);
        assert_eq!(tokenize("<p>{open</p>").unwrap_err().kind, ErrorKind::UnterminatedProgram);
        assert_eq!(tokenize("<!-- never").unwrap_err().kind, ErrorKind::UnterminatedComment);
        assert_eq!(tokenize("<script>run()").unwrap_err().kind, ErrorKind::UnterminatedRawText);
    }

    #[test]
    fn test_close_tag_is_case_insensitive() {
        let doc = tokenize("<DIV>x</div>").unwrap();
        assert_eq!(markup(&doc.markup[0]).name, "DIV");
    }

    #[test]
    fn test_void_and_self_closing() {
        let doc = tokenize("<p><br>line<img src=\"a.png\"/><x-icon /></p>").unwrap();
        let p = markup(&doc.markup[0]);
        assert_eq!(p.children.len(), 4);
        assert!(markup(&p.children[0]).children.is_empty());
        assert_eq!(markup(&p.children[2]).attributes.get_str("src"), Some("a.png"));
        assert_eq!(markup(&p.children[3]).name, "x-icon");
    }

    #[test]
    fn test_nested_script_is_verbatim() {
        let doc = tokenize("<div><script>if (a < b) { x = '<p>'; }</script></div>").unwrap();
        let script = markup(&markup(&doc.markup[0]).children[0]);
        assert_eq!(script.children.len(), 1);
        let content = script.children[0].as_literal().unwrap();
        assert_eq!(content.raw, "if (a < b) { x = '<p>'; }");
        assert_eq!(content.start, 13);
    }

    #[test]
    fn test_empty_raw_text_has_no_children() {
        let doc = tokenize("<p><style></style></p>").unwrap();
        let style = markup(&markup(&doc.markup[0]).children[0]);
        assert!(style.children.is_empty());
    }

    #[test]
    fn test_attribute_kinds() {
        let doc = tokenize("<div class=\"x\" data-value={y} {...z} {w} flag></div>").unwrap();
        let props = &markup(&doc.markup[0]).attributes.properties;
        assert_eq!(props.len(), 5);

        assert_eq!(props[0].key.as_ref().unwrap().name, "class");
        assert_eq!(props[0].value.as_literal().unwrap().value, Scalar::String("x".to_string()));

        assert_eq!(props[1].key.as_ref().unwrap().name, "data-value");
        assert_eq!(props[1].value.as_program().unwrap().source, "y");

        assert!(props[2].spread);
        assert!(props[2].key.is_none());
        assert_eq!(props[2].value.as_program().unwrap().source, "z");

        assert!(props[3].computed);
        assert_eq!(props[3].key.as_ref().unwrap().name, "w");

        assert_eq!(props[4].value.as_literal().unwrap().value, Scalar::Boolean(true));
    }

    #[test]
    fn test_unquoted_value_ending_in_slash() {
        let doc = tokenize("<a href=/>Home</a>").unwrap();
        let a = markup(&doc.markup[0]);
        assert_eq!(a.attributes.get_str("href"), Some("/"));
        assert_eq!(a.children[0].as_literal().unwrap().raw, "Home");

        let doc = tokenize("<p><x-icon name=star /></p>").unwrap();
        let icon = markup(&markup(&doc.markup[0]).children[0]);
        assert_eq!(icon.attributes.get_str("name"), Some("star"));
        assert!(icon.children.is_empty());
    }

    #[test]
    fn test_unterminated_quote_error() {
        let err = tokenize("<p title='open>text</p>").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnterminatedQuote);
        assert_eq!(err.start, 9);
    }

    #[test]
    fn test_computed_attribute_key_span() {
        let doc = tokenize("<div { w }></div>").unwrap();
        let key = markup(&doc.markup[0]).attributes.properties[0].key.clone().unwrap();
        assert_eq!(key.name, "w");
        assert_eq!((key.start, key.end), (7, 8));
    }

    #[test]
    fn test_unquoted_attribute() {
        let doc = tokenize("<input type=text disabled>").unwrap();
        let input = markup(&doc.markup[0]);
        assert_eq!(input.attributes.get_str("type"), Some("text"));
        assert!(input.attributes.get("disabled").is_some());
    }

    #[test]
    fn test_attribute_value_with_gt() {
        let doc = tokenize("<a title=\"1 > 0\" hidden={n > 2}>x</a>").unwrap();
        let a = markup(&doc.markup[0]);
        assert_eq!(a.attributes.get_str("title"), Some("1 > 0"));
        assert_eq!(a.attributes.get("hidden").unwrap().value.as_program().unwrap().source, "n > 2");
    }

    #[test]
    fn test_layout_whitespace() {
        let doc = tokenize("\n<ul>\n  <li>a</li>\n  <li> </li>\n</ul>\n").unwrap();
        assert_eq!(doc.markup.len(), 1);
        let ul = markup(&doc.markup[0]);
        assert_eq!(ul.children.len(), 2);
        let li = markup(&ul.children[1]);
        assert_eq!(li.children[0].as_literal().unwrap().raw, " ");
    }

    #[test]
    fn test_whitespace_only_content_kept() {
        let doc = tokenize("<div>\n\n</div>").unwrap();
        assert_eq!(markup(&doc.markup[0]).children.len(), 1);
    }

    #[test]
    fn test_inline_program() {
        let doc = tokenize("<div>Hello {name}!</div>").unwrap();
        let div = markup(&doc.markup[0]);
        assert_eq!(div.children.len(), 3);
        assert_eq!(div.children[1].as_program().unwrap().source, "name");
    }

    #[test]
    fn test_comment_and_doctype_are_literals() {
        let doc = tokenize("<!DOCTYPE html><!-- note --><html></html>").unwrap();
        assert_eq!(doc.markup.len(), 3);
        assert_eq!(doc.markup[0].as_literal().unwrap().raw, "<!DOCTYPE html>");
        assert_eq!(doc.markup[1].as_literal().unwrap().raw, "<!-- note -->");
    }

    #[test]
    fn test_lone_angle_bracket_is_text() {
        let doc = tokenize("<p>a < b</p>").unwrap();
        assert_eq!(markup(&doc.markup[0]).children[0].as_literal().unwrap().raw, "a < b");
    }

    #[test]
    fn test_root_classification() {
        let source = r#"<link rel="import" href="./header.tml">
<script src="cdn.js"></script>
<script>import Header from './header.tml'</script>
<style>p { margin: 0; }</style>
<main></main>"#;
        let doc = tokenize(source).unwrap();
        assert_eq!(doc.components.len(), 1);
        assert_eq!(doc.scripts.len(), 1);
        assert_eq!(doc.styles.len(), 1);
        assert_eq!(doc.markup.len(), 2);
        assert_eq!(doc.styles[0].source, "p { margin: 0; }");

        let import = &doc.imports[0];
        assert_eq!(&source[import.start..import.end], "import Header from './header.tml'");
    }

    #[test]
    fn test_nesting_limit() {
        let source = "<a><b><c></c></b></a>";
        let options = TokenizeOptions { max_depth: 2 };
        let err = tokenize_with(source, options).unwrap_err();
        assert_eq!(err.kind, ErrorKind::NestingTooDeep);
        assert_eq!(err.start, 6);
        assert!(tokenize_with(source, TokenizeOptions { max_depth: 3 }).is_ok());
    }

    #[test]
    fn test_multibyte_text() {
        let doc = tokenize("<p>café ☕ {drink}</p>").unwrap();
        let p = markup(&doc.markup[0]);
        assert_eq!(p.children[0].as_literal().unwrap().raw, "café ☕ ");
        assert_eq!(p.children[1].as_program().unwrap().source, "drink");
    }
}
