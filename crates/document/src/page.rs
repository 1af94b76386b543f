use crate::config::PageSize;
use quire_object::ObjectRef;
use quire_store::Renumbering;

/// Handles to the two objects that make up a page: its dictionary in the
/// page tree and its content stream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Page {
    dictionary: ObjectRef,
    content: ObjectRef,
    size: PageSize,
}

impl Page {
    pub(crate) fn new(dictionary: ObjectRef, content: ObjectRef, size: PageSize) -> Self {
        Self { dictionary, content, size }
    }

    pub fn dictionary(&self) -> ObjectRef {
        self.dictionary
    }

    pub fn content(&self) -> ObjectRef {
        self.content
    }

    pub fn size(&self) -> PageSize {
        self.size
    }

    /// Follows a compaction; false if either object was collected.
    pub(crate) fn renumber(&mut self, renumbering: &Renumbering) -> bool {
        match (renumbering.apply(self.dictionary), renumbering.apply(self.content)) {
            (Some(dictionary), Some(content)) => {
                self.dictionary = dictionary;
                self.content = content;
                true
            }
            _ => false,
        }
    }
}
