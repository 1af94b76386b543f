use quire_encode::EncodeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("No object with identifier {0} in the store")]
    NotFound(u32),

    #[error("Encoding failed: {0}")]
    Encode(#[from] EncodeError),

    #[error("Object {0} cannot carry a stream: its payload is not a dictionary")]
    StreamOnNonDictionary(u32),

    #[error("Object {0} has a compressed stream and cannot be appended to")]
    StreamAlreadyCompressed(u32),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
