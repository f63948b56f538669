//! Data-literal interpreter.
//!
//! Turns `Literal`, `Identifier`, `ObjectExpression` and `ArrayExpression`
//! tokens into `serde_json::Value`s, resolving identifiers against an optional
//! reference table.

use crate::ast::{Scalar, Token};
use crate::error::{DataError, Error};
use crate::lexer::{Lexer, DATA};
use serde_json::{Map, Number, Value};

/// Named values identifiers resolve against, in insertion order
pub type References = Map<String, Value>;

/// Stateless token-to-value converter
pub struct Parser;

impl Parser {
    /// Convert any data token. Without a reference table an identifier becomes
    /// the deferred reference string `${name}`.
    pub fn data(token: &Token, references: Option<&References>) -> Result<Value, DataError> {
        match token {
            Token::Literal(literal) => Ok(scalar(&literal.value)),
            Token::Identifier(identifier) => match references {
                Some(references) => references
                    .get(&identifier.name)
                    .cloned()
                    .ok_or_else(|| DataError::UnknownReference(identifier.name.clone())),
                None => Ok(Value::String(format!("${{{}}}", identifier.name))),
            },
            Token::ObjectExpression(_) => Self::object(token, references).map(Value::Object),
            Token::ArrayExpression(_) => Self::array(token, references).map(Value::Array),
            _ => Err(DataError::InvalidDataTokenType),
        }
    }

    /// Convert an object token. Later duplicates overwrite earlier keys in place.
    pub fn object(token: &Token, references: Option<&References>) -> Result<Map<String, Value>, DataError> {
        let Token::ObjectExpression(object) = token else {
            return Err(DataError::MalformedObject);
        };

        let mut map = Map::new();
        for property in &object.properties {
            let key = property.key.as_ref().ok_or(DataError::MalformedProperty)?;
            map.insert(key.name.clone(), Self::data(&property.value, references)?);
        }
        Ok(map)
    }

    pub fn array(token: &Token, references: Option<&References>) -> Result<Vec<Value>, DataError> {
        let Token::ArrayExpression(array) = token else {
            return Err(DataError::MalformedArray);
        };

        array
            .elements
            .iter()
            .map(|element| Self::data(element, references))
            .collect()
    }

    /// Lex exactly one data literal from `source` with the standard registry,
    /// then convert it. Trailing input other than whitespace is an error.
    pub fn parse(source: &str, references: Option<&References>) -> Result<Value, Error> {
        let mut lexer = Lexer::standard();
        lexer.load(source.trim_start());
        let token = lexer.expect(DATA)?;
        lexer.expect_end()?;
        Ok(Self::data(&token, references)?)
    }
}

fn scalar(value: &Scalar) -> Value {
    match value {
        Scalar::Integer(n) => Value::from(*n),
        Scalar::Float(f) => Number::from_f64(*f).map_or(Value::Null, Value::Number),
        Scalar::String(s) => Value::String(s.clone()),
        Scalar::Boolean(b) => Value::Bool(*b),
        Scalar::Null => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{ArrayToken, IdentifierToken, LiteralToken, ObjectToken, ProgramToken, PropertyToken};
    use serde_json::json;

    fn lex(code: &str) -> Token {
        let mut lexer = Lexer::standard();
        lexer.load(code);
        lexer.expect(DATA).unwrap()
    }

    fn program(source: &str) -> Token {
        Token::ProgramExpression(ProgramToken { source: source.to_string(), start: 0, end: source.len() })
    }

    fn object_with(value: Token, key: Option<&str>) -> Token {
        Token::ObjectExpression(ObjectToken {
            properties: vec![PropertyToken {
                key: key.map(|name| IdentifierToken { name: name.to_string(), start: 0, end: name.len() }),
                value: Box::new(value),
                spread: key.is_none(),
                computed: false,
                start: 0,
                end: 1,
            }],
            start: 0,
            end: 1,
        })
    }

    #[test]
    fn test_basic_object() {
        let actual = Parser::object(&lex("{ foo: \"bar\", bar: 4.4 }"), None).unwrap();
        assert_eq!(actual["foo"], "bar");
        assert_eq!(actual["bar"], 4.4);
    }

    #[test]
    fn test_nested_object() {
        let token = lex("{ foo: \"bar\", bar: 4.4, zoo: { foo: false, bar: null } }");
        let actual = Parser::data(&token, None).unwrap();
        assert_eq!(actual, json!({ "foo": "bar", "bar": 4.4, "zoo": { "foo": false, "bar": null } }));
    }

    #[test]
    fn test_array_in_object() {
        let actual = Parser::object(&lex("{ foo: \"bar\", bar: 4.4, zoo: [ 4, true ] }"), None).unwrap();
        assert_eq!(actual["zoo"], json!([4, true]));
    }

    #[test]
    fn test_empty_structures() {
        assert_eq!(Parser::data(&lex("{}"), None).unwrap(), json!({}));
        assert_eq!(Parser::data(&lex("[]"), None).unwrap(), json!([]));
        assert_eq!(
            Parser::data(&lex("{ a: {}, b: [], c: [[], {}] }"), None).unwrap(),
            json!({ "a": {}, "b": [], "c": [[], {}] })
        );
    }

    #[test]
    fn test_special_values() {
        let token = lex(
            "{
      nullValue: null,
      boolValue: true,
      numberValue: 123.45,
      stringValue: \"test\",
      emptyObject: {},
      emptyArray: []
    }",
        );
        let actual = Parser::object(&token, None).unwrap();
        assert_eq!(actual["nullValue"], Value::Null);
        assert_eq!(actual["boolValue"], true);
        assert_eq!(actual["numberValue"], 123.45);
        assert_eq!(actual["stringValue"], "test");
        assert_eq!(actual["emptyObject"], json!({}));
        assert_eq!(actual["emptyArray"], json!([]));
    }

    #[test]
    fn test_identifier_deferred() {
        let actual = Parser::object(&lex("{ key: someIdentifier }"), None).unwrap();
        assert_eq!(actual["key"], "${someIdentifier}");
    }

    #[test]
    fn test_identifier_resolved() {
        let mut refs = References::new();
        refs.insert("user".to_string(), json!({ "name": "Ada" }));
        let actual = Parser::data(&lex("[user, 1]"), Some(&refs)).unwrap();
        assert_eq!(actual, json!([{ "name": "Ada" }, 1]));
    }

    #[test]
    fn test_unknown_reference() {
        let token = lex("{ key: someIdentifier }");
        let err = Parser::data(&token, Some(&References::new())).unwrap_err();
        assert_eq!(err.to_string(), "Unknown reference someIdentifier");
    }

    #[test]
    fn test_integer_stays_integer() {
        let actual = Parser::object(&lex("{ intValue: 42 }"), None).unwrap();
        assert_eq!(actual["intValue"], 42);
        assert!(actual["intValue"].is_i64());
    }

    #[test]
    fn test_duplicate_keys_last_wins_in_place() {
        let actual = Parser::object(&lex("{ a: 1, b: 2, a: 3 }"), None).unwrap();
        let keys: Vec<&String> = actual.keys().collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(actual["a"], 3);
    }

    #[test]
    fn test_invalid_value_types() {
        let err = Parser::object(&object_with(program("x"), Some("k")), None).unwrap_err();
        assert_eq!(err, DataError::InvalidDataTokenType);

        let array = Token::ArrayExpression(ArrayToken { elements: vec![program("x")], start: 0, end: 1 });
        assert_eq!(Parser::array(&array, None).unwrap_err(), DataError::InvalidDataTokenType);

        assert_eq!(Parser::data(&program("x"), None).unwrap_err(), DataError::InvalidDataTokenType);
        assert_eq!(
            Parser::data(&program("x"), Some(&References::new())).unwrap_err(),
            DataError::InvalidDataTokenType
        );
    }

    #[test]
    fn test_missing_key() {
        let token = object_with(lex("1"), None);
        assert_eq!(Parser::object(&token, None).unwrap_err(), DataError::MalformedProperty);
    }

    #[test]
    fn test_wrong_container() {
        let literal = Token::Literal(LiteralToken::text("x", 0));
        assert_eq!(Parser::object(&lex("[]"), None).unwrap_err(), DataError::MalformedObject);
        assert_eq!(Parser::array(&lex("{}"), None).unwrap_err(), DataError::MalformedArray);
        assert_eq!(Parser::array(&literal, None).unwrap_err(), DataError::MalformedArray);
    }

    #[test]
    fn test_parse_convenience() {
        let value = Parser::parse("{ list: [1, 2.5, 'three'] }", None).unwrap();
        assert_eq!(value, json!({ "list": [1, 2.5, "three"] }));

        let err = Parser::parse("@oops", None).unwrap_err();
        assert!(matches!(err, Error::Lexer(_)));

        let err = Parser::parse("[1, 2] extra", None).unwrap_err();
        assert_eq!(err.to_string(), "Unexpected extra");
    }

    #[test]
    fn test_parse_rejects_unrepresentable_number() {
        let err = Parser::parse(&"9".repeat(400), None).unwrap_err();
        assert!(matches!(err, Error::Lexer(_)));
    }

    #[test]
    fn test_parse_rejects_excessive_nesting() {
        let deep = format!("{}{}", "[".repeat(5000), "]".repeat(5000));
        let err = Parser::parse(&deep, None).unwrap_err();
        assert!(matches!(err, Error::Lexer(_)));

        let nested = format!("{}1{}", "{ a: ".repeat(100), " }".repeat(100));
        assert!(Parser::parse(&nested, None).is_ok());
    }
}
