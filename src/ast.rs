use serde::Serialize;

/// Scalar value carried by a [`LiteralToken`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Integer(i64),
    Float(f64),
    String(String),
    Boolean(bool),
    Null,
}

impl Scalar {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::String(value) => Some(value),
            _ => None,
        }
    }
}

/// Tokens produced by the lexer definitions and the tokenizer.
///
/// Every variant spans `[start, end)` in the source it was produced from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Token {
    Literal(LiteralToken),
    Identifier(IdentifierToken),
    ObjectExpression(ObjectToken),
    Property(PropertyToken),
    ArrayExpression(ArrayToken),
    ProgramExpression(ProgramToken),
    MarkupExpression(MarkupToken),
    ImportDeclaration(ImportToken),
}

impl Token {
    pub fn start(&self) -> usize {
        match self {
            Token::Literal(t) => t.start,
            Token::Identifier(t) => t.start,
            Token::ObjectExpression(t) => t.start,
            Token::Property(t) => t.start,
            Token::ArrayExpression(t) => t.start,
            Token::ProgramExpression(t) => t.start,
            Token::MarkupExpression(t) => t.start,
            Token::ImportDeclaration(t) => t.start,
        }
    }

    pub fn end(&self) -> usize {
        match self {
            Token::Literal(t) => t.end,
            Token::Identifier(t) => t.end,
            Token::ObjectExpression(t) => t.end,
            Token::Property(t) => t.end,
            Token::ArrayExpression(t) => t.end,
            Token::ProgramExpression(t) => t.end,
            Token::MarkupExpression(t) => t.end,
            Token::ImportDeclaration(t) => t.end,
        }
    }

    /// Name of the variant, as it appears in the serialized `type` field
    pub fn kind(&self) -> &'static str {
        match self {
            Token::Literal(_) => "Literal",
            Token::Identifier(_) => "Identifier",
            Token::ObjectExpression(_) => "ObjectExpression",
            Token::Property(_) => "Property",
            Token::ArrayExpression(_) => "ArrayExpression",
            Token::ProgramExpression(_) => "ProgramExpression",
            Token::MarkupExpression(_) => "MarkupExpression",
            Token::ImportDeclaration(_) => "ImportDeclaration",
        }
    }

    pub fn is_empty(&self) -> bool {
        self.end() <= self.start()
    }

    pub fn as_literal(&self) -> Option<&LiteralToken> {
        match self {
            Token::Literal(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_markup(&self) -> Option<&MarkupToken> {
        match self {
            Token::MarkupExpression(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_program(&self) -> Option<&ProgramToken> {
        match self {
            Token::ProgramExpression(t) => Some(t),
            _ => None,
        }
    }
}

/// Scalar literal, or a run of markup text
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LiteralToken {
    pub value: Scalar,
    pub raw: String,
    /// true when `raw` held escape sequences that were decoded into `value`
    pub escape: bool,
    pub start: usize,
    pub end: usize,
}

impl LiteralToken {
    /// Verbatim text literal (markup text, comments, raw-text content)
    pub fn text(text: &str, start: usize) -> Self {
        Self {
            value: Scalar::String(text.to_string()),
            raw: text.to_string(),
            escape: false,
            start,
            end: start + text.len(),
        }
    }
}

/// Bare reference
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IdentifierToken {
    pub name: String,
    pub start: usize,
    pub end: usize,
}

/// `{ key: value, ... }`, also used for a tag's attribute list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectToken {
    pub properties: Vec<PropertyToken>,
    pub start: usize,
    pub end: usize,
}

impl ObjectToken {
    /// First property whose key is `name`
    pub fn get(&self, name: &str) -> Option<&PropertyToken> {
        self.properties
            .iter()
            .find(|p| p.key.as_ref().is_some_and(|k| k.name == name))
    }

    /// String value of a plain `name="value"` attribute
    pub fn get_str(&self, name: &str) -> Option<&str> {
        match self.get(name).map(|p| p.value.as_ref()) {
            Some(Token::Literal(lit)) => lit.value.as_str(),
            _ => None,
        }
    }
}

/// One object entry. `key` is absent only for spread entries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyToken {
    pub key: Option<IdentifierToken>,
    pub value: Box<Token>,
    pub spread: bool,
    pub computed: bool,
    pub start: usize,
    pub end: usize,
}

/// `[ value, ... ]`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArrayToken {
    pub elements: Vec<Token>,
    pub start: usize,
    pub end: usize,
}

/// Embedded expression, consumed verbatim downstream
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgramToken {
    pub source: String,
    pub start: usize,
    pub end: usize,
}

/// One markup element and its children
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkupToken {
    pub name: String,
    pub attributes: ObjectToken,
    pub children: Vec<Token>,
    pub start: usize,
    pub end: usize,
}

/// `import ... from '...'` found in a script block
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportToken {
    pub type_only: bool,
    /// `import Default from ...`
    pub default: Option<String>,
    /// `import * as ns from ...`
    pub namespace: Option<String>,
    /// `import { a, b as c } from ...`
    pub specifiers: Vec<ImportSpecifier>,
    pub source: String,
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSpecifier {
    pub imported: String,
    pub local: String,
    /// `import { type Foo } from ...`
    pub type_only: bool,
}

/// Root-level `<script>` or `<style>` block
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawBlock {
    pub name: String,
    pub attributes: ObjectToken,
    /// Verbatim inner text
    pub source: String,
    pub start: usize,
    pub end: usize,
}

/// Tokenizer result for one template file
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Document {
    pub components: Vec<MarkupToken>,
    pub scripts: Vec<RawBlock>,
    pub styles: Vec<RawBlock>,
    pub markup: Vec<Token>,
    pub imports: Vec<ImportToken>,
}

impl Document {
    pub fn summary(&self) -> DocumentSummary {
        DocumentSummary {
            components: self.components.len(),
            scripts: self.scripts.len(),
            styles: self.styles.len(),
            markup: self.markup.len(),
            imports: self.imports.len(),
            roots: self
                .markup
                .iter()
                .map(|token| match token {
                    Token::MarkupExpression(m) => m.name.clone(),
                    other => format!("#{}", other.kind()),
                })
                .collect(),
            sources: self.imports.iter().map(|i| i.source.clone()).collect(),
        }
    }
}

/// Shape of a document, used by the CLI and the fixture tests
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentSummary {
    pub components: usize,
    pub scripts: usize,
    pub styles: usize,
    pub markup: usize,
    pub imports: usize,
    /// Root markup names; non-element roots appear as `#Literal` etc.
    pub roots: Vec<String>,
    /// Import sources in document order
    pub sources: Vec<String>,
}
