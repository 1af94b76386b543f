//! Balanced PDF name trees.
//!
//! A name tree maps sorted text keys to values and is written out as a tree
//! of indirect objects with a bounded number of entries per node (PDF
//! Reference 1.7, section 3.8.5). Nodes live in an arena inside the tree;
//! each node that has been given a backing object in the [`ObjectStore`]
//! has its projection written into that object after every insertion.
//!
//! [`ObjectStore`]: quire_store::ObjectStore

mod error;
mod tree;

pub use error::NameTreeError;
pub use tree::{Entry, NameTree, NodeView};
