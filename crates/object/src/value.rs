use crate::dictionary::Dictionary;
use crate::name::Name;
use crate::reference::{ObjectRef, References};
use chrono::{DateTime, FixedOffset, Local, Utc};

/// A PDF object value.
///
/// The three text kinds differ only in how they are written out:
/// - `LiteralString` holds pre-encoded bytes written in parentheses with
///   escaping, never transcoded
/// - `ByteString` holds opaque binary data written as a hex string
/// - `Text` holds general text, written as UTF-16BE hex outside content
///   streams and as its UTF-8 bytes inside them
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Real(f64),
    Name(Name),
    LiteralString(Vec<u8>),
    ByteString(Vec<u8>),
    Text(String),
    Array(Vec<Value>),
    Dictionary(Dictionary),
    Reference(ObjectRef),
    Timestamp(DateTime<FixedOffset>),
}

impl Value {
    pub fn name(name: impl Into<Name>) -> Self {
        Value::Name(name.into())
    }

    pub fn literal(bytes: impl Into<Vec<u8>>) -> Self {
        Value::LiteralString(bytes.into())
    }

    pub fn bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Value::ByteString(bytes.into())
    }

    /// A short lowercase description of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Real(_) => "real",
            Value::Name(_) => "name",
            Value::LiteralString(_) => "literal string",
            Value::ByteString(_) => "byte string",
            Value::Text(_) => "text",
            Value::Array(_) => "array",
            Value::Dictionary(_) => "dictionary",
            Value::Reference(_) => "reference",
            Value::Timestamp(_) => "timestamp",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_name(&self) -> Option<&Name> {
        match self {
            Value::Name(name) => Some(name),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_reference(&self) -> Option<ObjectRef> {
        match self {
            Value::Reference(r) => Some(*r),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_array_mut(&mut self) -> Option<&mut Vec<Value>> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&Dictionary> {
        match self {
            Value::Dictionary(dict) => Some(dict),
            _ => None,
        }
    }

    pub fn as_dict_mut(&mut self) -> Option<&mut Dictionary> {
        match self {
            Value::Dictionary(dict) => Some(dict),
            _ => None,
        }
    }

    /// Rewrites every reference reachable through arrays and dictionaries.
    ///
    /// Used after identifiers are renumbered so handles held inside payloads
    /// keep pointing at the same objects.
    pub fn rewrite_references<F>(&mut self, map: &mut F)
    where
        F: FnMut(ObjectRef) -> ObjectRef,
    {
        match self {
            Value::Reference(r) => *r = map(*r),
            Value::Array(items) => {
                for item in items {
                    item.rewrite_references(map);
                }
            }
            Value::Dictionary(dict) => {
                for (_, value) in dict.iter_mut() {
                    value.rewrite_references(map);
                }
            }
            _ => {}
        }
    }
}

impl References for Value {
    fn collect_references(&self, out: &mut Vec<ObjectRef>) {
        match self {
            Value::Reference(r) => out.push(*r),
            Value::Array(items) => items.iter().for_each(|item| item.collect_references(out)),
            Value::Dictionary(dict) => dict.values().for_each(|value| value.collect_references(out)),
            _ => {}
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Null
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Integer(i64::from(i))
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Value::Integer(i64::from(i))
    }
}

impl From<usize> for Value {
    fn from(i: usize) -> Self {
        Value::Integer(i as i64)
    }
}

impl From<f32> for Value {
    fn from(r: f32) -> Self {
        Value::Real(f64::from(r))
    }
}

impl From<f64> for Value {
    fn from(r: f64) -> Self {
        Value::Real(r)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<Name> for Value {
    fn from(name: Name) -> Self {
        Value::Name(name)
    }
}

impl From<ObjectRef> for Value {
    fn from(r: ObjectRef) -> Self {
        Value::Reference(r)
    }
}

impl From<Dictionary> for Value {
    fn from(dict: Dictionary) -> Self {
        Value::Dictionary(dict)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<DateTime<FixedOffset>> for Value {
    fn from(t: DateTime<FixedOffset>) -> Self {
        Value::Timestamp(t)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(t: DateTime<Utc>) -> Self {
        Value::Timestamp(t.fixed_offset())
    }
}

impl From<DateTime<Local>> for Value {
    fn from(t: DateTime<Local>) -> Self {
        Value::Timestamp(t.fixed_offset())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

impl<T: Into<Value>> FromIterator<T> for Value {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Value::Array(iter.into_iter().map(Into::into).collect())
    }
}
