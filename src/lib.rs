//! quire: build PDF files as an in-memory object graph.
//!
//! Values are stored as indirect objects in an [`ObjectStore`] and linked
//! through [`ObjectRef`] handles. Unreachable objects are collected before
//! output, large sorted tables can be stored as a balanced [`NameTree`], and
//! the [`Document`] facade adds pages and content on top.
//!
//! ```no_run
//! use quire::{Document, Graphics, PdfError};
//!
//! fn main() -> Result<(), PdfError> {
//!     let mut doc = Document::builder().info("Title", "Hello").compress(true).build();
//!     doc.move_to(72.0, 72.0)?;
//!     doc.line_to(540.0, 720.0)?;
//!     doc.stroke()?;
//!     doc.render_file("hello.pdf")
//! }
//! ```

pub use quire_document::{
    Assembler, DEFAULT_VERSION, Document, DocumentBuilder, DocumentOptions, Graphics, Page, PageSize, PdfError,
    json_object_to_dictionary, json_to_value,
};
pub use quire_encode::{EncodeError, encode, encode_to};
pub use quire_nametree::{Entry, NameTree, NameTreeError, NodeView};
pub use quire_object::{Dictionary, Name, ObjectRef, References, Value, ValueError, dictionary};
pub use quire_store::{IndirectObject, ObjectStore, Renumbering, StoreError};
