//! The JSON value tree.
//!
//! [`JsonValue`] is the universal node: a tagged union over null, boolean,
//! number, string, array, and object. Containers own their children;
//! objects and arrays preserve insertion order. String payloads are raw
//! bytes in source form: escape sequences are resolved at construction
//! except `\uXXXX`, which is preserved byte for byte.
//!
//! Sharing across contexts goes through [`SharedValue`]: cloning the
//! handle is the acquire operation, dropping it the release. A tree is
//! mutable only while uniquely owned; callers serialize access.
//!
//! Numbers use a split integer/fraction representation so the library
//! stays usable where floating point is unavailable. Exponents are
//! accepted in source text but not retained.

use std::mem;
use std::sync::Arc;

use crate::alloc::{self, AllocBudget};
use crate::error::{Error, JsonkResult};
use crate::lexer;
use crate::limits::{MAX_ARRAY_SIZE, MAX_DEPTH, MAX_KEY_LENGTH, MAX_OBJECT_MEMBERS, MAX_STRING_LENGTH};
use crate::pool;

/// Shared, read-only handle to a value tree.
///
/// Cloning increments an atomic reference count; dropping the last handle
/// releases the tree. Typical use: acquire a handle under the caller's
/// lock, drop the lock, and read without further synchronization while no
/// mutator holds the tree.
pub type SharedValue = Arc<JsonValue>;

/// A JSON value.
#[derive(Debug, PartialEq, Eq, Default)]
pub enum JsonValue {
    /// JSON null literal
    #[default]
    Null,
    /// JSON boolean
    Bool(bool),
    /// JSON number in split integer/fraction form
    Number(JsonNumber),
    /// JSON string (unescaped payload bytes)
    String(JsonString),
    /// JSON array of values
    Array(JsonArray),
    /// JSON object of key/value members
    Object(JsonObject),
}

/// Split representation of a JSON number.
///
/// `integer` carries the signed integer part; `fraction` carries up to
/// nine digits after the decimal point as an unsigned decimal. For pure
/// integers (`is_integer`), `integer` is the exact value with saturation
/// at the i64 range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsonNumber {
    /// Signed integer part.
    pub integer: i64,
    /// Fraction digits interpreted after the decimal point.
    pub fraction: u32,
    /// Sign of the source literal; informational for non-integers whose
    /// integer part is zero.
    pub is_negative: bool,
    /// True when the literal had neither fraction nor exponent.
    pub is_integer: bool,
}

impl JsonNumber {
    /// Convert a validated numeric literal.
    ///
    /// The whole slice must be a single number; trailing bytes fail. The
    /// integer part saturates at the i64 range, fraction digits beyond
    /// nine are dropped, and an exponent marks the value non-integer but
    /// is otherwise discarded.
    pub fn from_literal(literal: &[u8]) -> JsonkResult<Self> {
        let consumed = lexer::scan_number(literal)?;
        if consumed != literal.len() {
            return Err(Error::InvalidNumber(consumed));
        }
        Ok(Self::convert(literal))
    }

    /// Exact integer constructor.
    pub fn from_i64(value: i64) -> Self {
        Self {
            integer: value,
            fraction: 0,
            is_negative: value < 0,
            is_integer: true,
        }
    }

    /// The exact integer value, if this is a pure integer.
    pub fn as_i64(&self) -> Option<i64> {
        self.is_integer.then_some(self.integer)
    }

    fn convert(literal: &[u8]) -> Self {
        let negative = literal.first() == Some(&b'-');
        let mut i = usize::from(negative);

        // Accumulate toward the sign so i64::MIN parses exactly;
        // overflow saturates at the matching bound.
        let mut integer: i64 = 0;
        while let Some(&d) = literal.get(i) {
            if !d.is_ascii_digit() {
                break;
            }
            let d = i64::from(d - b'0');
            integer = if negative {
                integer
                    .checked_mul(10)
                    .and_then(|v| v.checked_sub(d))
                    .unwrap_or(i64::MIN)
            } else {
                integer
                    .checked_mul(10)
                    .and_then(|v| v.checked_add(d))
                    .unwrap_or(i64::MAX)
            };
            i += 1;
        }

        let mut fraction: u32 = 0;
        let mut is_integer = true;
        if literal.get(i) == Some(&b'.') {
            is_integer = false;
            i += 1;
            let mut digits = 0;
            while let Some(&d) = literal.get(i) {
                if !d.is_ascii_digit() {
                    break;
                }
                if digits < 9 {
                    fraction = fraction * 10 + u32::from(d - b'0');
                    digits += 1;
                }
                i += 1;
            }
        }
        if let Some(b'e' | b'E') = literal.get(i) {
            // Exponent accepted syntactically, not retained.
            is_integer = false;
        }

        Self {
            integer,
            fraction,
            is_negative: if is_integer { integer < 0 } else { negative },
            is_integer,
        }
    }
}

/// Owned string payload, length-authoritative raw bytes.
#[derive(Debug, PartialEq, Eq, Default)]
pub struct JsonString {
    bytes: Vec<u8>,
}

impl JsonString {
    /// Build from source-form bytes, resolving escape sequences.
    ///
    /// The eight single-character escapes are rewritten; `\uXXXX` is
    /// copied literally after its four hex digits are validated (fewer
    /// than four rejects the escape). Any other escape fails.
    pub(crate) fn from_escaped(raw: &[u8], budget: &mut AllocBudget) -> JsonkResult<Self> {
        if raw.len() > MAX_STRING_LENGTH {
            tracing::warn!(len = raw.len(), limit = MAX_STRING_LENGTH, "string too long");
            return Err(Error::StringTooLong(raw.len(), MAX_STRING_LENGTH));
        }
        // Unescaping never grows the payload past the source length.
        let mut bytes = alloc::take_bytes(budget, raw.len())?;
        match unescape_into(raw, &mut bytes) {
            Ok(()) => Ok(Self { bytes }),
            Err(e) => {
                pool::give_bytes(bytes);
                Err(e)
            }
        }
    }

    /// Copy already-resolved bytes verbatim.
    pub(crate) fn from_plain(source: &[u8], budget: &mut AllocBudget) -> JsonkResult<Self> {
        let mut bytes = alloc::take_bytes(budget, source.len())?;
        bytes.extend_from_slice(source);
        Ok(Self { bytes })
    }

    /// Payload bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Payload as `&str` when it happens to be valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.bytes).ok()
    }

    /// Payload length in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// True when the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl Drop for JsonString {
    fn drop(&mut self) {
        pool::give_bytes(mem::take(&mut self.bytes));
    }
}

fn unescape_into(raw: &[u8], out: &mut Vec<u8>) -> JsonkResult<()> {
    let mut i = 0;
    while i < raw.len() {
        let b = raw[i];
        if b != b'\\' {
            out.push(b);
            i += 1;
            continue;
        }
        let Some(&esc) = raw.get(i + 1) else {
            return Err(Error::InvalidEscape(i));
        };
        match esc {
            b'"' => out.push(b'"'),
            b'\\' => out.push(b'\\'),
            b'/' => out.push(b'/'),
            b'b' => out.push(0x08),
            b'f' => out.push(0x0C),
            b'n' => out.push(b'\n'),
            b'r' => out.push(b'\r'),
            b't' => out.push(b'\t'),
            b'u' => {
                let hex = raw.get(i + 2..i + 6).ok_or(Error::InvalidEscape(i))?;
                if !hex.iter().all(|h| h.is_ascii_hexdigit()) {
                    return Err(Error::InvalidEscape(i));
                }
                // Preserved literally, all six bytes.
                out.push(b'\\');
                out.push(b'u');
                out.extend_from_slice(hex);
                i += 6;
                continue;
            }
            _ => return Err(Error::InvalidEscape(i)),
        }
        i += 2;
    }
    Ok(())
}

/// Key/value pair owned by a [`JsonObject`].
///
/// Keys are kept in their source form: escape sequences in a key are
/// neither resolved at parse time nor re-escaped at serialization, and
/// lookup compares those raw bytes.
#[derive(Debug, PartialEq, Eq)]
pub struct Member {
    key: JsonString,
    value: JsonValue,
}

impl Member {
    /// Key bytes in source form.
    pub fn key(&self) -> &[u8] {
        self.key.as_bytes()
    }

    /// The member's value.
    pub fn value(&self) -> &JsonValue {
        &self.value
    }

    /// Mutable access to the member's value.
    pub fn value_mut(&mut self) -> &mut JsonValue {
        &mut self.value
    }

    pub(crate) fn replace_value(&mut self, value: JsonValue) -> JsonValue {
        mem::replace(&mut self.value, value)
    }
}

/// Insertion-ordered JSON object.
#[derive(Debug, PartialEq, Eq)]
pub struct JsonObject {
    members: Vec<Member>,
}

impl JsonObject {
    /// New empty object.
    pub fn new() -> Self {
        Self {
            members: pool::take_members(),
        }
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// True when the object has no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Iterate members in insertion order.
    pub fn members(&self) -> std::slice::Iter<'_, Member> {
        self.members.iter()
    }

    /// Find the first member with the given key bytes.
    pub fn find(&self, key: &[u8]) -> Option<&Member> {
        self.members.iter().find(|m| m.key() == key)
    }

    pub(crate) fn position(&self, key: &[u8]) -> Option<usize> {
        self.members.iter().position(|m| m.key() == key)
    }

    pub(crate) fn member_at_mut(&mut self, index: usize) -> Option<&mut Member> {
        self.members.get_mut(index)
    }

    /// Append a member, taking ownership of `value`.
    ///
    /// Fails (dropping `value`) when the member count or key length limit
    /// would be breached.
    pub fn add_member(&mut self, key: &[u8], value: JsonValue) -> JsonkResult<()> {
        self.add_member_budgeted(key, value, &mut AllocBudget::unlimited())
    }

    pub(crate) fn add_member_budgeted(
        &mut self,
        key: &[u8],
        value: JsonValue,
        budget: &mut AllocBudget,
    ) -> JsonkResult<()> {
        if self.members.len() >= MAX_OBJECT_MEMBERS {
            tracing::warn!(members = self.members.len(), limit = MAX_OBJECT_MEMBERS, "too many object members");
            return Err(Error::TooManyMembers(self.members.len() + 1, MAX_OBJECT_MEMBERS));
        }
        if key.len() > MAX_KEY_LENGTH {
            tracing::warn!(len = key.len(), limit = MAX_KEY_LENGTH, "object key too long");
            return Err(Error::KeyTooLong(key.len(), MAX_KEY_LENGTH));
        }
        budget.charge(mem::size_of::<Member>())?;
        let key = JsonString::from_plain(key, budget)?;
        self.members.push(Member { key, value });
        Ok(())
    }

    /// Remove the first member with the given key, returning its value.
    pub fn remove_member(&mut self, key: &[u8]) -> JsonkResult<JsonValue> {
        match self.position(key) {
            Some(index) => {
                let Member { key: _, value } = self.members.remove(index);
                Ok(value)
            }
            None => Err(Error::NoSuchEntry),
        }
    }
}

impl Default for JsonObject {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for JsonObject {
    fn drop(&mut self) {
        pool::give_members(mem::take(&mut self.members));
    }
}

/// Insertion-ordered JSON array.
#[derive(Debug, PartialEq, Eq)]
pub struct JsonArray {
    elements: Vec<JsonValue>,
}

impl JsonArray {
    /// New empty array.
    pub fn new() -> Self {
        Self {
            elements: pool::take_elements(),
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// True when the array has no elements.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Element at `index`.
    pub fn get(&self, index: usize) -> Option<&JsonValue> {
        self.elements.get(index)
    }

    /// Iterate elements in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, JsonValue> {
        self.elements.iter()
    }

    /// Append an element.
    pub fn push(&mut self, value: JsonValue) -> JsonkResult<()> {
        self.push_budgeted(value, &mut AllocBudget::unlimited())
    }

    pub(crate) fn push_budgeted(
        &mut self,
        value: JsonValue,
        budget: &mut AllocBudget,
    ) -> JsonkResult<()> {
        if self.elements.len() >= MAX_ARRAY_SIZE {
            tracing::warn!(elements = self.elements.len(), limit = MAX_ARRAY_SIZE, "array too large");
            return Err(Error::ArrayTooLong(self.elements.len() + 1, MAX_ARRAY_SIZE));
        }
        budget.charge(mem::size_of::<JsonValue>())?;
        self.elements.push(value);
        Ok(())
    }
}

impl Default for JsonArray {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for JsonArray {
    fn drop(&mut self) {
        pool::give_elements(mem::take(&mut self.elements));
    }
}

impl JsonValue {
    /// String value from source-form bytes (escape sequences resolved).
    pub fn string(source: &[u8]) -> JsonkResult<Self> {
        Ok(Self::String(JsonString::from_escaped(
            source,
            &mut AllocBudget::unlimited(),
        )?))
    }

    /// Number value from a numeric literal.
    pub fn number(literal: &[u8]) -> JsonkResult<Self> {
        Ok(Self::Number(JsonNumber::from_literal(literal)?))
    }

    /// Exact integer value.
    pub fn integer(value: i64) -> Self {
        Self::Number(JsonNumber::from_i64(value))
    }

    /// Returns true if this is a null value.
    pub fn is_null(&self) -> bool {
        matches!(self, JsonValue::Null)
    }

    /// Returns true if this is a boolean value.
    pub fn is_bool(&self) -> bool {
        matches!(self, JsonValue::Bool(_))
    }

    /// Returns true if this is a number value.
    pub fn is_number(&self) -> bool {
        matches!(self, JsonValue::Number(_))
    }

    /// Returns true if this is a string value.
    pub fn is_string(&self) -> bool {
        matches!(self, JsonValue::String(_))
    }

    /// Returns true if this is an array value.
    pub fn is_array(&self) -> bool {
        matches!(self, JsonValue::Array(_))
    }

    /// Returns true if this is an object value.
    pub fn is_object(&self) -> bool {
        matches!(self, JsonValue::Object(_))
    }

    /// The boolean value, if this is a Bool.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            JsonValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The number, if this is a Number.
    pub fn as_number(&self) -> Option<&JsonNumber> {
        match self {
            JsonValue::Number(n) => Some(n),
            _ => None,
        }
    }

    /// The exact integer value, if this is a pure-integer Number.
    pub fn as_i64(&self) -> Option<i64> {
        self.as_number().and_then(JsonNumber::as_i64)
    }

    /// The string payload, if this is a String with UTF-8 contents.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            JsonValue::String(s) => s.as_str(),
            _ => None,
        }
    }

    /// The string, if this is a String.
    pub fn as_string(&self) -> Option<&JsonString> {
        match self {
            JsonValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// The array, if this is an Array.
    pub fn as_array(&self) -> Option<&JsonArray> {
        match self {
            JsonValue::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Mutable array access.
    pub fn as_array_mut(&mut self) -> Option<&mut JsonArray> {
        match self {
            JsonValue::Array(a) => Some(a),
            _ => None,
        }
    }

    /// The object, if this is an Object.
    pub fn as_object(&self) -> Option<&JsonObject> {
        match self {
            JsonValue::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Mutable object access.
    pub fn as_object_mut(&mut self) -> Option<&mut JsonObject> {
        match self {
            JsonValue::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Member value by key, if this is an Object.
    pub fn get(&self, key: &[u8]) -> Option<&JsonValue> {
        self.as_object().and_then(|o| o.find(key)).map(Member::value)
    }

    /// Type name for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            JsonValue::Null => "null",
            JsonValue::Bool(_) => "boolean",
            JsonValue::Number(_) => "number",
            JsonValue::String(_) => "string",
            JsonValue::Array(_) => "array",
            JsonValue::Object(_) => "object",
        }
    }

    /// Structure-preserving clone with freshly owned children.
    ///
    /// Strict: depth overflow or allocation failure drops the partial
    /// copy and returns the error.
    pub fn deep_copy(&self) -> JsonkResult<JsonValue> {
        self.deep_copy_with(&mut AllocBudget::unlimited(), 0)
    }

    pub(crate) fn deep_copy_with(
        &self,
        budget: &mut AllocBudget,
        depth: usize,
    ) -> JsonkResult<JsonValue> {
        if depth >= MAX_DEPTH {
            return Err(Error::DepthExceeded(depth + 1, MAX_DEPTH));
        }
        match self {
            JsonValue::Null => Ok(JsonValue::Null),
            JsonValue::Bool(b) => Ok(JsonValue::Bool(*b)),
            JsonValue::Number(n) => Ok(JsonValue::Number(*n)),
            JsonValue::String(s) => Ok(JsonValue::String(JsonString::from_plain(
                s.as_bytes(),
                budget,
            )?)),
            JsonValue::Array(a) => {
                let mut copy = JsonArray::new();
                for element in a.iter() {
                    let element_copy = element.deep_copy_with(budget, depth + 1)?;
                    copy.push_budgeted(element_copy, budget)?;
                }
                Ok(JsonValue::Array(copy))
            }
            JsonValue::Object(o) => {
                let mut copy = JsonObject::new();
                for member in o.members() {
                    let value_copy = member.value().deep_copy_with(budget, depth + 1)?;
                    copy.add_member_budgeted(member.key(), value_copy, budget)?;
                }
                Ok(JsonValue::Object(copy))
            }
        }
    }

    /// Move this tree behind an atomically reference-counted handle.
    pub fn into_shared(self) -> SharedValue {
        Arc::new(self)
    }
}

impl From<bool> for JsonValue {
    fn from(value: bool) -> Self {
        JsonValue::Bool(value)
    }
}

impl From<i64> for JsonValue {
    fn from(value: i64) -> Self {
        JsonValue::integer(value)
    }
}
