//! Structural invariants checked over every fixture.
//!
//! Run with: cargo test --test invariants

use libtest_mimic::{Arguments, Failed, Trial};
use std::fs;
use std::path::{Path, PathBuf};
use temple_compiler::ast::MarkupToken;
use temple_compiler::{tokenize, Document, Token};

fn fixtures() -> Vec<PathBuf> {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures");
    let mut files = Vec::new();
    for pattern in ["**/*.tml", "**/*.dtml"] {
        let pattern = root.join(pattern);
        let entries = glob::glob(&pattern.to_string_lossy()).expect("valid glob pattern");
        files.extend(entries.filter_map(Result::ok));
    }
    files.sort();
    files
}

fn load(path: &Path) -> Result<(String, Document), Failed> {
    let source = fs::read_to_string(path).map_err(|e| format!("read {}: {}", path.display(), e))?;
    let document = tokenize(&source).map_err(|e| e.render(&source, &path.display().to_string()))?;
    Ok((source, document))
}

fn roots(document: &Document) -> Vec<Token> {
    let mut tokens: Vec<Token> = document
        .components
        .iter()
        .cloned()
        .map(Token::MarkupExpression)
        .collect();
    tokens.extend(document.markup.iter().cloned());
    tokens.sort_by_key(Token::start);
    tokens
}

/// Siblings are ordered, disjoint and contained in their parent
fn check_spans(tokens: &[Token], outer: (usize, usize), source: &str) -> Result<(), String> {
    let mut previous_end = outer.0;
    for token in tokens {
        let (start, end) = (token.start(), token.end());
        if start < previous_end || end > outer.1 || start >= end {
            return Err(format!(
                "{} [{}-{}] out of place inside [{}-{}] (previous sibling ended at {})",
                token.kind(),
                start,
                end,
                outer.0,
                outer.1,
                previous_end
            ));
        }
        previous_end = end;

        if let Token::MarkupExpression(markup) = token {
            check_spans(&markup.children, (start, end), source)?;
        }
    }
    Ok(())
}

/// Text literals are verbatim slices of the source
fn check_literals(tokens: &[Token], source: &str) -> Result<(), String> {
    for token in tokens {
        match token {
            Token::Literal(literal) if !literal.escape => {
                let slice = &source[literal.start..literal.end];
                if literal.raw != slice {
                    return Err(format!("literal at {} is {:?} but source has {:?}", literal.start, literal.raw, slice));
                }
            }
            Token::MarkupExpression(markup) => check_literals(&markup.children, source)?,
            _ => {}
        }
    }
    Ok(())
}

fn check_raw_element(markup: &MarkupToken, source: &str) -> Result<(), String> {
    match markup.children.as_slice() {
        [] => Ok(()),
        [Token::Literal(content)] => {
            let close = &source[content.end..markup.end];
            if close.to_ascii_lowercase().starts_with(&format!("</{}", markup.name.to_ascii_lowercase())) {
                Ok(())
            } else {
                Err(format!("<{}> content is not followed by its close tag", markup.name))
            }
        }
        _ => Err(format!("<{}> at {} has tokenized children", markup.name, markup.start)),
    }
}

/// Script and style content stays one verbatim literal everywhere
fn check_raw_text(tokens: &[Token], source: &str) -> Result<(), String> {
    for token in tokens {
        if let Token::MarkupExpression(markup) = token {
            if temple_compiler::html::is_raw_text_element(&markup.name) {
                check_raw_element(markup, source)?;
            } else {
                check_raw_text(&markup.children, source)?;
            }
        }
    }
    Ok(())
}

fn check_blocks(document: &Document, source: &str) -> Result<(), String> {
    for block in document.scripts.iter().chain(&document.styles) {
        if !source[block.start..block.end].contains(block.source.as_str()) {
            return Err(format!("<{}> block at {} lost its source text", block.name, block.start));
        }
    }
    for import in &document.imports {
        let inside = document
            .scripts
            .iter()
            .any(|script| script.start < import.start && import.end <= script.end);
        if !inside {
            return Err(format!("import {:?} at {} is outside every script", import.source, import.start));
        }
    }
    Ok(())
}

fn fixture_trials(path: PathBuf) -> Vec<Trial> {
    let name = path
        .strip_prefix(Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures"))
        .unwrap_or(&path)
        .display()
        .to_string();

    if name.starts_with("errors") {
        return vec![Trial::test(format!("rejects::{}", name), move || {
            let source = fs::read_to_string(&path).map_err(|e| e.to_string())?;
            match tokenize(&source) {
                Ok(_) => Err("tokenized without error".into()),
                Err(e) if e.start < source.len() && e.start <= e.end => Ok(()),
                Err(e) => Err(format!("error offset {} is outside the source", e.start).into()),
            }
        })];
    }

    let spans = path.clone();
    let literals = path.clone();
    let raw = path.clone();
    vec![
        Trial::test(format!("spans::{}", name), move || {
            let (source, document) = load(&spans)?;
            check_spans(&roots(&document), (0, source.len()), &source).map_err(Failed::from)
        }),
        Trial::test(format!("literals::{}", name), move || {
            let (source, document) = load(&literals)?;
            check_literals(&roots(&document), &source).map_err(Failed::from)
        }),
        Trial::test(format!("raw_text::{}", name), move || {
            let (source, document) = load(&raw)?;
            check_raw_text(&roots(&document), &source)?;
            check_blocks(&document, &source).map_err(Failed::from)
        }),
    ]
}

fn main() {
    let args = Arguments::from_args();
    let trials: Vec<Trial> = fixtures().into_iter().flat_map(fixture_trials).collect();
    libtest_mimic::run(&args, trials).exit()
}
