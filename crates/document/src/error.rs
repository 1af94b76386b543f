use quire_encode::EncodeError;
use quire_nametree::NameTreeError;
use quire_store::StoreError;
use thiserror::Error;

/// Errors raised while building or writing a document.
#[derive(Error, Debug)]
pub enum PdfError {
    #[error("Object store error: {0}")]
    Store(#[from] StoreError),

    #[error("Encoding failed: {0}")]
    Encode(#[from] EncodeError),

    #[error("Name tree error: {0}")]
    NameTree(#[from] NameTreeError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid document options: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Page {page} does not exist; the document has {count} page(s)")]
    PageOutOfRange { page: usize, count: usize },

    #[error("Object {0} is expected to hold a dictionary")]
    NotADictionary(u32),

    #[error("No name tree is attached under /{0}")]
    UnknownNameTree(String),
}
