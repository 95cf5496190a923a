//! Compact JSON serializer.
//!
//! Renders a value tree into a caller-provided buffer with no whitespace.
//! The writer fails with [`Error::BufferOverflow`] the moment the next
//! byte would not fit. Member and element order is the tree's insertion
//! order.
//!
//! Escaping on output covers exactly `"`, `\`, and the five control
//! escapes; every other payload byte is written verbatim. Preserved
//! `\uXXXX` sequences in string payloads therefore re-serialize with an
//! escaped backslash, which parses back to the identical payload. Object
//! keys are written verbatim because they are stored in source form.

use crate::error::{Error, JsonkResult};
use crate::value::{JsonNumber, JsonValue};

/// Render `value` compactly into `out`; returns the bytes written.
pub fn serialize(value: &JsonValue, out: &mut [u8]) -> JsonkResult<usize> {
    let mut writer = Writer { out, pos: 0 };
    write_value(value, &mut writer)?;
    Ok(writer.pos)
}

/// Exact size in bytes that [`serialize`] would produce for `value`.
pub fn serialized_len(value: &JsonValue) -> usize {
    match value {
        JsonValue::Null => 4,
        JsonValue::Bool(true) => 4,
        JsonValue::Bool(false) => 5,
        JsonValue::Number(n) => {
            let mut len = n.integer.to_string().len();
            if !n.is_integer {
                len += 1 + n.fraction.to_string().len();
            }
            len
        }
        JsonValue::String(s) => escaped_len(s.as_bytes()),
        JsonValue::Array(a) => {
            let mut len = 2 + a.iter().map(serialized_len).sum::<usize>();
            if a.len() > 1 {
                len += a.len() - 1;
            }
            len
        }
        JsonValue::Object(o) => {
            let mut len = 2;
            for member in o.members() {
                len += member.key().len() + 3 + serialized_len(member.value());
            }
            if o.len() > 1 {
                len += o.len() - 1;
            }
            len
        }
    }
}

struct Writer<'a> {
    out: &'a mut [u8],
    pos: usize,
}

impl Writer<'_> {
    fn put_byte(&mut self, b: u8) -> JsonkResult<()> {
        if self.pos >= self.out.len() {
            return Err(Error::BufferOverflow);
        }
        self.out[self.pos] = b;
        self.pos += 1;
        Ok(())
    }

    fn put_slice(&mut self, bytes: &[u8]) -> JsonkResult<()> {
        if bytes.len() > self.out.len() - self.pos {
            return Err(Error::BufferOverflow);
        }
        let end = self.pos + bytes.len();
        self.out[self.pos..end].copy_from_slice(bytes);
        self.pos = end;
        Ok(())
    }
}

fn write_value(value: &JsonValue, w: &mut Writer<'_>) -> JsonkResult<()> {
    match value {
        JsonValue::Null => w.put_slice(b"null"),
        JsonValue::Bool(true) => w.put_slice(b"true"),
        JsonValue::Bool(false) => w.put_slice(b"false"),
        JsonValue::Number(n) => write_number(n, w),
        JsonValue::String(s) => write_string(s.as_bytes(), w),
        JsonValue::Array(a) => {
            w.put_byte(b'[')?;
            for (i, element) in a.iter().enumerate() {
                if i > 0 {
                    w.put_byte(b',')?;
                }
                write_value(element, w)?;
            }
            w.put_byte(b']')
        }
        JsonValue::Object(o) => {
            w.put_byte(b'{')?;
            for (i, member) in o.members().enumerate() {
                if i > 0 {
                    w.put_byte(b',')?;
                }
                w.put_byte(b'"')?;
                w.put_slice(member.key())?;
                w.put_slice(b"\":")?;
                write_value(member.value(), w)?;
            }
            w.put_byte(b'}')
        }
    }
}

fn write_number(n: &JsonNumber, w: &mut Writer<'_>) -> JsonkResult<()> {
    // The sign comes from the integer part itself; is_negative is
    // advisory and must not be applied on top.
    w.put_slice(n.integer.to_string().as_bytes())?;
    if !n.is_integer {
        w.put_byte(b'.')?;
        w.put_slice(n.fraction.to_string().as_bytes())?;
    }
    Ok(())
}

fn write_string(bytes: &[u8], w: &mut Writer<'_>) -> JsonkResult<()> {
    w.put_byte(b'"')?;
    for &b in bytes {
        match b {
            b'"' => w.put_slice(b"\\\"")?,
            b'\\' => w.put_slice(b"\\\\")?,
            0x08 => w.put_slice(b"\\b")?,
            0x0C => w.put_slice(b"\\f")?,
            b'\n' => w.put_slice(b"\\n")?,
            b'\r' => w.put_slice(b"\\r")?,
            b'\t' => w.put_slice(b"\\t")?,
            _ => w.put_byte(b)?,
        }
    }
    w.put_byte(b'"')
}

fn escaped_len(bytes: &[u8]) -> usize {
    let payload: usize = bytes
        .iter()
        .map(|&b| match b {
            b'"' | b'\\' | 0x08 | 0x0C | b'\n' | b'\r' | b'\t' => 2,
            _ => 1,
        })
        .sum();
    payload + 2
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use crate::value::{JsonArray, JsonObject};

    fn render(value: &JsonValue) -> Vec<u8> {
        let mut buf = vec![0u8; serialized_len(value)];
        let written = serialize(value, &mut buf).unwrap();
        buf.truncate(written);
        buf
    }

    #[test]
    fn test_serialize_primitives() {
        assert_eq!(render(&JsonValue::Null), b"null");
        assert_eq!(render(&JsonValue::Bool(true)), b"true");
        assert_eq!(render(&JsonValue::Bool(false)), b"false");
        assert_eq!(render(&JsonValue::integer(42)), b"42");
        assert_eq!(render(&JsonValue::integer(-123)), b"-123");
    }

    #[test]
    fn test_serialize_i64_extremes() {
        assert_eq!(render(&JsonValue::integer(i64::MAX)), b"9223372036854775807");
        assert_eq!(render(&JsonValue::integer(i64::MIN)), b"-9223372036854775808");
    }

    #[test]
    fn test_serialize_fractional_number() {
        let v = JsonValue::number(b"3.14").unwrap();
        assert_eq!(render(&v), b"3.14");
        let v = JsonValue::number(b"-2.5").unwrap();
        assert_eq!(render(&v), b"-2.5");
    }

    #[test]
    fn test_serialize_string_with_escapes() {
        let v = JsonValue::string(b"plain").unwrap();
        assert_eq!(render(&v), b"\"plain\"");

        let v = JsonValue::string(br#"say \"hi\""#).unwrap();
        assert_eq!(render(&v), br#""say \"hi\"""#);
    }

    #[test]
    fn test_serialize_control_escapes() {
        let v = JsonValue::string(br"a\nb\tc").unwrap();
        assert_eq!(render(&v), br#""a\nb\tc""#);
    }

    #[test]
    fn test_serialize_array() {
        let mut arr = JsonArray::new();
        for n in [1, 2, 3] {
            arr.push(JsonValue::integer(n)).unwrap();
        }
        assert_eq!(render(&JsonValue::Array(arr)), b"[1,2,3]");
    }

    #[test]
    fn test_serialize_empty_containers() {
        assert_eq!(render(&JsonValue::Array(JsonArray::new())), b"[]");
        assert_eq!(render(&JsonValue::Object(JsonObject::new())), b"{}");
    }

    #[test]
    fn test_serialize_object_in_insertion_order() {
        let mut obj = JsonObject::new();
        obj.add_member(b"b", JsonValue::integer(2)).unwrap();
        obj.add_member(b"a", JsonValue::integer(1)).unwrap();
        assert_eq!(render(&JsonValue::Object(obj)), br#"{"b":2,"a":1}"#);
    }

    #[test]
    fn test_overflow_at_exact_boundary() {
        let value = parse(br#"{"name":"JSONK","version":1}"#).unwrap();
        let need = serialized_len(&value);

        let mut exact = vec![0u8; need];
        assert_eq!(serialize(&value, &mut exact), Ok(need));

        let mut short = vec![0u8; need - 1];
        assert_eq!(serialize(&value, &mut short), Err(Error::BufferOverflow));
    }

    #[test]
    fn test_serialized_len_matches_output() {
        let value = parse(br#"{"a":[1,2.5,"x\ty"],"b":{"c":null,"d":false}}"#).unwrap();
        let rendered = render(&value);
        assert_eq!(rendered.len(), serialized_len(&value));
    }

    #[test]
    fn test_no_whitespace_emitted() {
        let value = parse(b"{ \"a\" : [ 1 , 2 ] }").unwrap();
        assert_eq!(render(&value), br#"{"a":[1,2]}"#);
    }
}
