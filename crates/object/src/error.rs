use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValueError {
    #[error("A PDF dictionary must be keyed by names, got {0}")]
    InvalidDictionaryKey(String),
}
