use quire_store::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NameTreeError {
    #[error("Name tree nodes must allow at least 2 children, got {0}")]
    LimitTooSmall(usize),

    #[error(transparent)]
    Store(#[from] StoreError),
}
