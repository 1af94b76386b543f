use quire_object::ValueError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("A PDF name cannot contain whitespace: {0:?}")]
    InvalidName(String),

    #[error("A PDF dictionary must be keyed by names, got {0}")]
    InvalidDictionaryKey(String),

    #[error("This value cannot be serialized to PDF: {0}")]
    UnsupportedValue(String),
}

impl From<ValueError> for EncodeError {
    fn from(err: ValueError) -> Self {
        match err {
            ValueError::InvalidDictionaryKey(key) => EncodeError::InvalidDictionaryKey(key),
        }
    }
}
