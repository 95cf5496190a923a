//! Recursive descent JSON parser.
//!
//! Drives the token scanner and builds a [`JsonValue`] tree while
//! enforcing the structural limits and the per-parse memory budget. Any
//! breach fails the enclosing call; partially built subtrees unwind with
//! the error.
//!
//! The parser context carries running counters (strings, arrays, objects,
//! bytes debited) exposed through [`Parser::stats`] for diagnostics.

use std::mem;

use crate::alloc::AllocBudget;
use crate::error::{Error, JsonkResult};
use crate::lexer::{Lexer, Token};
use crate::limits::Limits;
use crate::value::{JsonArray, JsonNumber, JsonObject, JsonString, JsonValue};

/// Parse a complete JSON document with the standard limit set.
pub fn parse(input: &[u8]) -> JsonkResult<JsonValue> {
    parse_with_limits(input, Limits::standard())
}

/// Parse a complete JSON document with a custom limit set.
pub fn parse_with_limits(input: &[u8], limits: Limits) -> JsonkResult<JsonValue> {
    let mut parser = Parser::new(input, limits);
    parser.parse()
}

/// Counters accumulated over a single parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseStats {
    /// String values built.
    pub strings: usize,
    /// Arrays built.
    pub arrays: usize,
    /// Objects built.
    pub objects: usize,
    /// Bytes debited against the memory budget.
    pub bytes_charged: usize,
}

/// Parser context over one input byte range.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    limits: Limits,
    budget: AllocBudget,
    depth: usize,
    strings: usize,
    arrays: usize,
    objects: usize,
}

impl<'a> Parser<'a> {
    /// Create a parser over `input`.
    pub fn new(input: &'a [u8], limits: Limits) -> Self {
        Self {
            lexer: Lexer::new(input),
            limits,
            budget: AllocBudget::limited(limits.max_total_memory),
            depth: 0,
            strings: 0,
            arrays: 0,
            objects: 0,
        }
    }

    /// Parse the input as a single document. Trailing bytes after the
    /// root value fail.
    pub fn parse(&mut self) -> JsonkResult<JsonValue> {
        let token = self.lexer.next_token()?;
        let value = self.parse_value(token)?;
        match self.lexer.next_token()? {
            Token::Eof => Ok(value),
            _ => Err(Error::InvalidSyntax(self.lexer.position())),
        }
    }

    /// Counters for the work done so far.
    pub fn stats(&self) -> ParseStats {
        ParseStats {
            strings: self.strings,
            arrays: self.arrays,
            objects: self.objects,
            bytes_charged: self.budget.used(),
        }
    }

    /// Parse one value starting from an already-fetched token.
    fn parse_value(&mut self, token: Token<'a>) -> JsonkResult<JsonValue> {
        if self.depth >= self.limits.max_depth {
            tracing::warn!(
                depth = self.depth + 1,
                limit = self.limits.max_depth,
                "nesting too deep"
            );
            return Err(Error::DepthExceeded(self.depth + 1, self.limits.max_depth));
        }
        self.depth += 1;
        let value = match token {
            Token::ObjectStart => self.parse_object(),
            Token::ArrayStart => self.parse_array(),
            Token::String(raw) => self.string_value(raw),
            Token::Number(literal) => self.number_value(literal),
            Token::True => self.literal_value(JsonValue::Bool(true)),
            Token::False => self.literal_value(JsonValue::Bool(false)),
            Token::Null => self.literal_value(JsonValue::Null),
            Token::Eof => Err(Error::UnexpectedEnd),
            _ => Err(Error::InvalidSyntax(self.lexer.position())),
        };
        self.depth -= 1;
        value
    }

    fn literal_value(&mut self, value: JsonValue) -> JsonkResult<JsonValue> {
        self.budget.charge(mem::size_of::<JsonValue>())?;
        Ok(value)
    }

    fn string_value(&mut self, raw: &[u8]) -> JsonkResult<JsonValue> {
        if raw.len() > self.limits.max_string_length {
            tracing::warn!(
                len = raw.len(),
                limit = self.limits.max_string_length,
                "string too long"
            );
            return Err(Error::StringTooLong(raw.len(), self.limits.max_string_length));
        }
        self.budget.charge(mem::size_of::<JsonValue>())?;
        let payload = JsonString::from_escaped(raw, &mut self.budget)?;
        self.strings += 1;
        Ok(JsonValue::String(payload))
    }

    fn number_value(&mut self, literal: &[u8]) -> JsonkResult<JsonValue> {
        self.budget.charge(mem::size_of::<JsonValue>())?;
        Ok(JsonValue::Number(JsonNumber::from_literal(literal)?))
    }

    /// Parse an object body; the opening brace is already consumed.
    fn parse_object(&mut self) -> JsonkResult<JsonValue> {
        self.objects += 1;
        self.budget.charge(mem::size_of::<JsonValue>())?;
        let mut object = JsonObject::new();

        let mut token = self.lexer.next_token()?;
        if token == Token::ObjectEnd {
            return Ok(JsonValue::Object(object));
        }

        loop {
            let key = match token {
                Token::String(raw) => raw,
                Token::Eof => return Err(Error::UnexpectedEnd),
                _ => return Err(Error::InvalidSyntax(self.lexer.position())),
            };
            if key.len() > self.limits.max_key_length {
                tracing::warn!(
                    len = key.len(),
                    limit = self.limits.max_key_length,
                    "object key too long"
                );
                return Err(Error::KeyTooLong(key.len(), self.limits.max_key_length));
            }

            match self.lexer.next_token()? {
                Token::Colon => {}
                Token::Eof => return Err(Error::UnexpectedEnd),
                _ => return Err(Error::InvalidSyntax(self.lexer.position())),
            }

            let value_token = self.lexer.next_token()?;
            let value = self.parse_value(value_token)?;

            if object.len() >= self.limits.max_object_members {
                tracing::warn!(
                    members = object.len() + 1,
                    limit = self.limits.max_object_members,
                    "too many object members"
                );
                return Err(Error::TooManyMembers(
                    object.len() + 1,
                    self.limits.max_object_members,
                ));
            }
            object.add_member_budgeted(key, value, &mut self.budget)?;

            match self.lexer.next_token()? {
                Token::Comma => token = self.lexer.next_token()?,
                Token::ObjectEnd => break,
                Token::Eof => return Err(Error::UnexpectedEnd),
                _ => return Err(Error::InvalidSyntax(self.lexer.position())),
            }
        }

        Ok(JsonValue::Object(object))
    }

    /// Parse an array body; the opening bracket is already consumed.
    fn parse_array(&mut self) -> JsonkResult<JsonValue> {
        self.arrays += 1;
        self.budget.charge(mem::size_of::<JsonValue>())?;
        let mut array = JsonArray::new();

        let mut token = self.lexer.next_token()?;
        if token == Token::ArrayEnd {
            return Ok(JsonValue::Array(array));
        }

        loop {
            let value = self.parse_value(token)?;

            if array.len() >= self.limits.max_array_size {
                tracing::warn!(
                    elements = array.len() + 1,
                    limit = self.limits.max_array_size,
                    "array too large"
                );
                return Err(Error::ArrayTooLong(array.len() + 1, self.limits.max_array_size));
            }
            array.push_budgeted(value, &mut self.budget)?;

            match self.lexer.next_token()? {
                Token::Comma => token = self.lexer.next_token()?,
                Token::ArrayEnd => break,
                Token::Eof => return Err(Error::UnexpectedEnd),
                _ => return Err(Error::InvalidSyntax(self.lexer.position())),
            }
        }

        Ok(JsonValue::Array(array))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Member;

    #[test]
    fn test_parse_null() {
        assert_eq!(parse(b"null").unwrap(), JsonValue::Null);
    }

    #[test]
    fn test_parse_booleans() {
        assert_eq!(parse(b"true").unwrap(), JsonValue::Bool(true));
        assert_eq!(parse(b"false").unwrap(), JsonValue::Bool(false));
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse(b"42").unwrap().as_i64(), Some(42));
        assert_eq!(parse(b"-123").unwrap().as_i64(), Some(-123));
        assert_eq!(parse(b"0").unwrap().as_i64(), Some(0));
    }

    #[test]
    fn test_parse_string() {
        assert_eq!(parse(br#""hello""#).unwrap().as_str(), Some("hello"));
    }

    #[test]
    fn test_parse_array() {
        let value = parse(b"[1, 2, 3]").unwrap();
        let array = value.as_array().unwrap();
        assert_eq!(array.len(), 3);
        let collected: Vec<i64> = array.iter().filter_map(JsonValue::as_i64).collect();
        assert_eq!(collected, vec![1, 2, 3]);
    }

    #[test]
    fn test_parse_object_preserves_order() {
        let value = parse(br#"{"b": 2, "a": 1}"#).unwrap();
        let object = value.as_object().unwrap();
        let keys: Vec<&[u8]> = object.members().map(Member::key).collect();
        assert_eq!(keys, vec![b"b".as_slice(), b"a"]);
        assert_eq!(value.get(b"a").and_then(JsonValue::as_i64), Some(1));
    }

    #[test]
    fn test_parse_empty_containers() {
        assert!(parse(b"{}").unwrap().as_object().unwrap().is_empty());
        assert!(parse(b"[]").unwrap().as_array().unwrap().is_empty());
    }

    #[test]
    fn test_parse_nested_structure() {
        let value = parse(br#"{"arr": [1, {"nested": true}], "num": 42}"#).unwrap();
        let arr = value.get(b"arr").unwrap().as_array().unwrap();
        assert_eq!(arr.len(), 2);
        assert_eq!(arr.get(1).unwrap().get(b"nested").unwrap().as_bool(), Some(true));
    }

    #[test]
    fn test_duplicate_keys_preserved_first_match_wins() {
        let value = parse(br#"{"a": 1, "a": 2}"#).unwrap();
        assert_eq!(value.as_object().unwrap().len(), 2);
        assert_eq!(value.get(b"a").and_then(JsonValue::as_i64), Some(1));
    }

    #[test]
    fn test_empty_input_rejected() {
        assert_eq!(parse(b""), Err(Error::UnexpectedEnd));
        assert_eq!(parse(b"   "), Err(Error::UnexpectedEnd));
    }

    #[test]
    fn test_trailing_content_rejected() {
        assert!(parse(b"null extra").is_err());
        assert!(parse(b"{} {}").is_err());
    }

    #[test]
    fn test_trailing_comma_rejected() {
        assert!(parse(b"[1, 2,]").is_err());
        assert!(parse(br#"{"a": 1,}"#).is_err());
    }

    #[test]
    fn test_missing_colon_rejected() {
        assert!(parse(br#"{"a" 1}"#).is_err());
    }

    #[test]
    fn test_non_string_key_rejected() {
        assert!(parse(b"{1: 2}").is_err());
    }

    #[test]
    fn test_unterminated_containers_rejected() {
        assert_eq!(parse(b"[1, 2"), Err(Error::UnexpectedEnd));
        assert_eq!(parse(br#"{"a": 1"#), Err(Error::UnexpectedEnd));
    }

    #[test]
    fn test_depth_at_limit_succeeds_one_deeper_fails() {
        let mut limits = Limits::standard();
        limits.max_depth = 3;

        assert!(parse_with_limits(b"[[1]]", limits).is_ok());
        assert!(matches!(
            parse_with_limits(b"[[[1]]]", limits),
            Err(Error::DepthExceeded(4, 3))
        ));
    }

    #[test]
    fn test_object_member_limit() {
        let mut limits = Limits::standard();
        limits.max_object_members = 2;

        assert!(parse_with_limits(br#"{"a": 1, "b": 2}"#, limits).is_ok());
        assert_eq!(
            parse_with_limits(br#"{"a": 1, "b": 2, "c": 3}"#, limits),
            Err(Error::TooManyMembers(3, 2))
        );
    }

    #[test]
    fn test_array_size_limit() {
        let mut limits = Limits::standard();
        limits.max_array_size = 2;

        assert!(parse_with_limits(b"[1, 2]", limits).is_ok());
        assert_eq!(
            parse_with_limits(b"[1, 2, 3]", limits),
            Err(Error::ArrayTooLong(3, 2))
        );
    }

    #[test]
    fn test_string_length_limit() {
        let mut limits = Limits::standard();
        limits.max_string_length = 4;

        assert!(parse_with_limits(br#""abcd""#, limits).is_ok());
        assert_eq!(
            parse_with_limits(br#""abcde""#, limits),
            Err(Error::StringTooLong(5, 4))
        );
    }

    #[test]
    fn test_key_length_limit() {
        let mut limits = Limits::standard();
        limits.max_key_length = 3;

        assert!(parse_with_limits(br#"{"abc": 1}"#, limits).is_ok());
        assert_eq!(
            parse_with_limits(br#"{"abcd": 1}"#, limits),
            Err(Error::KeyTooLong(4, 3))
        );
    }

    #[test]
    fn test_memory_budget_enforced() {
        let mut limits = Limits::standard();
        limits.max_total_memory = 64;

        let result = parse_with_limits(br#"["strings", "that", "need", "buffers"]"#, limits);
        assert!(matches!(result, Err(Error::MemoryLimit { .. })));
    }

    #[test]
    fn test_stats_track_construct_counts() {
        let mut parser = Parser::new(br#"{"a": ["x", "y"], "b": {"c": 1}}"#, Limits::standard());
        parser.parse().unwrap();
        let stats = parser.stats();
        assert_eq!(stats.objects, 2);
        assert_eq!(stats.arrays, 1);
        assert_eq!(stats.strings, 2);
        assert!(stats.bytes_charged > 0);
    }

    #[test]
    fn test_failed_parse_reports_no_value() {
        assert!(parse(br#"{"a": }"#).is_err());
        assert!(parse(b"[1, ]").is_err());
        assert!(parse(br#"{"a" "b"}"#).is_err());
    }
}
