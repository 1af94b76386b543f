//! PDF name atoms.

use crate::error::ValueError;
use crate::value::Value;
use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

/// A PDF name atom such as `Type` or `FlateDecode`, stored without the
/// leading slash.
///
/// Names are cheap to clone. Whitespace is rejected when the name is
/// encoded, not when it is built, so a `Name` can be constructed from any
/// text.
#[derive(Debug, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct Name(Arc<str>);

impl Name {
    /// Creates a new Name from a string
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self(name.into())
    }

    /// Returns the atom text without the leading slash
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the atom can be written as a PDF name.
    pub fn is_valid(&self) -> bool {
        !self.0.chars().any(char::is_whitespace)
    }
}

impl From<String> for Name {
    fn from(s: String) -> Self {
        Self(s.into())
    }
}

impl From<&str> for Name {
    fn from(s: &str) -> Self {
        Self(s.into())
    }
}

impl From<&Name> for Name {
    fn from(name: &Name) -> Self {
        name.clone()
    }
}

impl AsRef<str> for Name {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Name {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.0)
    }
}

/// Dictionary keys may be given as names or as text; anything else is
/// rejected here so an ill-keyed dictionary can never be built.
impl TryFrom<Value> for Name {
    type Error = ValueError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Name(name) => Ok(name),
            Value::Text(text) => Ok(Name::from(text)),
            Value::LiteralString(bytes) | Value::ByteString(bytes) => String::from_utf8(bytes)
                .map(Name::from)
                .map_err(|e| ValueError::InvalidDictionaryKey(format!("{:?}", e.into_bytes()))),
            other => Err(ValueError::InvalidDictionaryKey(other.kind().to_string())),
        }
    }
}
