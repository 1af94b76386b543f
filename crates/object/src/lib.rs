//! Value model for the quire PDF object graph.
//!
//! This crate provides the types every other quire crate builds on:
//! - `Value`, the closed set of PDF object kinds a document can hold
//! - `Name` and `Dictionary`, with key validation at construction time
//! - `ObjectRef`, the `(id, generation)` handle used instead of pointers
//! - `References`, the capability shared by everything that can point at
//!   other indirect objects

mod dictionary;
mod error;
mod name;
mod reference;
mod value;

pub use dictionary::Dictionary;
pub use error::ValueError;
pub use name::Name;
pub use reference::{ObjectRef, References};
pub use value::Value;

/// Builds a [`Dictionary`] from `key => value` pairs.
///
/// Keys are anything convertible into a [`Name`], values anything
/// convertible into a [`Value`].
#[macro_export]
macro_rules! dictionary {
    () => {
        $crate::Dictionary::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut dict = $crate::Dictionary::new();
        $(
            dict.set($key, $value);
        )+
        dict
    }};
}
