//! Temple compiler front end.
//!
//! Three pieces, leaf first:
//!
//! - [`lexer`]: a backtracking scanner over a registry of named definitions,
//!   used for data literals in expression positions
//! - [`tokenizer`]: splits a template into markup, program expressions,
//!   raw-text blocks and import declarations
//! - [`parser`]: turns literal tokens into `serde_json::Value`s
//!
//! ```
//! use temple_compiler::{tokenize, Parser};
//!
//! let doc = tokenize("<p class=\"lead\">Hi {name}</p>").unwrap();
//! assert_eq!(doc.markup.len(), 1);
//!
//! let value = Parser::parse("{ size: 2, tags: ['a'] }", None).unwrap();
//! assert_eq!(value["size"], 2);
//! ```

pub mod ast;
pub mod error;
pub mod html;
pub mod lexer;
pub mod parser;
pub mod positions;
pub mod tokenizer;

pub use ast::{Document, DocumentSummary, Scalar, Token};
pub use error::{DataError, Error, ErrorKind, LexerError, TokenizeError};
pub use lexer::{Definitions, Lexer, DATA, SCALAR};
pub use parser::{Parser, References};
pub use tokenizer::{tokenize, tokenize_with, TokenizeOptions, Tokenizer};
