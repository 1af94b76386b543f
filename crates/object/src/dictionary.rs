use crate::error::ValueError;
use crate::name::Name;
use crate::value::Value;

/// A PDF dictionary.
///
/// Entries keep their insertion order so emitted files read the way they
/// were built. Setting an existing key replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dictionary {
    entries: Vec<(Name, Value)>,
}

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { entries: Vec::with_capacity(capacity) }
    }

    /// Builds a dictionary from untyped key/value pairs, rejecting any key
    /// that is not a name or text.
    pub fn try_from_pairs<I>(pairs: I) -> Result<Self, ValueError>
    where
        I: IntoIterator<Item = (Value, Value)>,
    {
        let mut dict = Dictionary::new();
        for (key, value) in pairs {
            dict.try_insert(key, value)?;
        }
        Ok(dict)
    }

    /// Inserts an entry keyed by an arbitrary value.
    pub fn try_insert(&mut self, key: Value, value: impl Into<Value>) -> Result<Option<Value>, ValueError> {
        let key = Name::try_from(key)?;
        Ok(self.set(key, value))
    }

    /// Sets `key` to `value`, returning the previous value if there was one.
    pub fn set(&mut self, key: impl Into<Name>, value: impl Into<Value>) -> Option<Value> {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k.as_str() == key).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.entries.iter_mut().find(|(k, _)| k.as_str() == key).map(|(_, v)| v)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let index = self.entries.iter().position(|(k, _)| k.as_str() == key)?;
        Some(self.entries.remove(index).1)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Name, &Value)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&Name, &mut Value)> {
        self.entries.iter_mut().map(|(k, v)| (&*k, v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &Name> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(_, v)| v)
    }

    /// Copies every entry of `other` into `self`, overriding shared keys.
    pub fn merge(&mut self, other: &Dictionary) {
        for (key, value) in other.iter() {
            self.set(key.clone(), value.clone());
        }
    }
}

impl<K: Into<Name>, V: Into<Value>> FromIterator<(K, V)> for Dictionary {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut dict = Dictionary::new();
        dict.extend(iter);
        dict
    }
}

impl<K: Into<Name>, V: Into<Value>> Extend<(K, V)> for Dictionary {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.set(key, value);
        }
    }
}

impl IntoIterator for Dictionary {
    type Item = (Name, Value);
    type IntoIter = std::vec::IntoIter<(Name, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
