//! Document facade and file assembly.
//!
//! [`Document`] owns an object store, manages the page tree and appends
//! content to the current page. [`Assembler`] turns any store into the final
//! file: header, body, cross-reference table and trailer.

mod config;
mod document;
mod error;
mod graphics;
mod page;
mod render;

pub use config::{DEFAULT_VERSION, DocumentOptions, PageSize, json_object_to_dictionary, json_to_value};
pub use document::{Document, DocumentBuilder};
pub use error::PdfError;
pub use graphics::Graphics;
pub use page::Page;
pub use render::Assembler;
