//! Indirect objects and the store that owns them.
//!
//! The store is an arena: objects never point at each other directly, only
//! through `ObjectRef` handles, which keeps the cyclic page tree (parent and
//! kids pointing at each other) safe to build and to walk.

mod error;
mod object;
mod store;

pub use error::StoreError;
pub use object::IndirectObject;
pub use store::{ObjectStore, Renumbering};
