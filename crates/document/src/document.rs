use crate::config::{DocumentOptions, PageSize};
use crate::error::PdfError;
use crate::graphics::Graphics;
use crate::page::Page;
use crate::render::Assembler;
use quire_nametree::NameTree;
use quire_object::{Dictionary, Name, ObjectRef, Value, dictionary};
use quire_store::{IndirectObject, ObjectStore, Renumbering};
use std::fs;
use std::io::Write;
use std::path::Path;

/// An in-memory PDF document.
///
/// The document owns its [`ObjectStore`] and keeps track of the pages it
/// created. Content is always appended to the current page; a first page is
/// started on demand.
#[derive(Debug, Clone)]
pub struct Document {
    store: ObjectStore,
    version: String,
    page_size: PageSize,
    compress: bool,
    compact: bool,
    trailer: Dictionary,
    pages: Vec<Page>,
    current: Option<usize>,
    name_trees: Vec<(Name, NameTree)>,
}

impl Document {
    pub fn new() -> Self {
        Self::with_options(DocumentOptions::default())
    }

    pub fn builder() -> DocumentBuilder {
        DocumentBuilder::default()
    }

    pub fn with_options(options: DocumentOptions) -> Self {
        Self::from_parts(options.info_dictionary(), options.trailer_dictionary(), options)
    }

    fn from_parts(info: Dictionary, trailer: Dictionary, options: DocumentOptions) -> Self {
        Self {
            store: ObjectStore::new(info),
            version: options.version,
            page_size: options.page_size,
            compress: options.compress,
            compact: options.compact,
            trailer,
            pages: Vec::new(),
            current: None,
            name_trees: Vec::new(),
        }
    }

    /// Stores `value` as a new indirect object and returns its handle.
    pub fn allocate(&mut self, value: impl Into<Value>) -> ObjectRef {
        self.store.allocate(value)
    }

    /// Like [`Document::allocate`], returning only the identifier.
    pub fn allocate_id(&mut self, value: impl Into<Value>) -> u32 {
        self.allocate(value).id
    }

    pub fn store(&self) -> &ObjectStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ObjectStore {
        &mut self.store
    }

    pub fn get(&self, id: u32) -> Result<&IndirectObject, PdfError> {
        Ok(self.store.get(id)?)
    }

    pub fn get_mut(&mut self, id: u32) -> Result<&mut IndirectObject, PdfError> {
        Ok(self.store.get_mut(id)?)
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn page_size(&self) -> PageSize {
        self.page_size
    }

    /// Size used for pages started from now on.
    pub fn set_page_size(&mut self, page_size: PageSize) {
        self.page_size = page_size;
    }

    /// The catalog dictionary.
    pub fn catalog_mut(&mut self) -> Result<&mut Dictionary, PdfError> {
        let id = self.store.root().id;
        self.dictionary_mut(id)
    }

    fn dictionary_mut(&mut self, id: u32) -> Result<&mut Dictionary, PdfError> {
        self.store.get_mut(id)?.dict_mut().ok_or(PdfError::NotADictionary(id))
    }

    /// Starts a new page and makes it current.
    ///
    /// The page gets an empty content stream and is appended to the page
    /// tree's `Kids`, with `Count` updated to match.
    pub fn start_new_page(&mut self) -> Result<Page, PdfError> {
        let content = self.store.allocate(Value::Null);
        self.store.append_stream(content, b"")?;

        let pages = self.store.pages();
        let dictionary = self.store.allocate(dictionary! {
            "Type" => Value::name("Page"),
            "Parent" => pages,
            "MediaBox" => self.page_size.media_box(),
            "Contents" => content,
            "Resources" => dictionary! {
                "ProcSet" => Value::Array(vec![Value::name("PDF"), Value::name("Text")]),
            },
        });

        let tree = self.dictionary_mut(pages.id)?;
        let count = match tree.get_mut("Kids").and_then(Value::as_array_mut) {
            Some(kids) => {
                kids.push(dictionary.into());
                kids.len()
            }
            None => {
                tree.set("Kids", Value::Array(vec![dictionary.into()]));
                1
            }
        };
        tree.set("Count", count);

        let page = Page::new(dictionary, content, self.page_size);
        self.pages.push(page);
        self.current = Some(self.pages.len() - 1);
        log::trace!("Started page {} as object {}", self.pages.len(), dictionary);
        Ok(page)
    }

    /// Makes the 1-based page `number` current.
    pub fn go_to_page(&mut self, number: usize) -> Result<Page, PdfError> {
        let page = number
            .checked_sub(1)
            .and_then(|index| self.pages.get(index).map(|page| (index, *page)));
        match page {
            Some((index, page)) => {
                self.current = Some(index);
                Ok(page)
            }
            None => Err(PdfError::PageOutOfRange {
                page: number,
                count: self.pages.len(),
            }),
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn current_page(&self) -> Option<Page> {
        self.current.map(|index| self.pages[index])
    }

    /// 1-based number of the current page.
    pub fn current_page_number(&self) -> Option<usize> {
        self.current.map(|index| index + 1)
    }

    /// Hangs `tree` under the catalog's `/Names` dictionary as `category`
    /// (for example `Dests` or `EmbeddedFiles`).
    ///
    /// The document keeps the tree from then on, so that compaction can
    /// renumber it; further entries go through [`Document::add_name`]. A tree
    /// already attached under `category` is replaced.
    pub fn attach_name_tree(&mut self, category: impl Into<Name>, mut tree: NameTree) -> Result<ObjectRef, PdfError> {
        let category = category.into();
        let reference = tree.reference(&mut self.store)?;
        let catalog = self.catalog_mut()?;
        match catalog.get_mut("Names").and_then(Value::as_dict_mut) {
            Some(names) => {
                names.set(category.clone(), reference);
            }
            None => {
                let mut names = Dictionary::new();
                names.set(category.clone(), reference);
                catalog.set("Names", names);
            }
        }

        match self.name_trees.iter_mut().find(|(key, _)| *key == category) {
            Some((_, slot)) => *slot = tree,
            None => self.name_trees.push((category, tree)),
        }
        Ok(reference)
    }

    /// The tree attached under `category`.
    pub fn name_tree(&self, category: &str) -> Option<&NameTree> {
        self.name_trees
            .iter()
            .find(|(key, _)| key.as_str() == category)
            .map(|(_, tree)| tree)
    }

    /// Adds `name => value` to the tree attached under `category`.
    pub fn add_name(
        &mut self,
        category: &str,
        name: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<(), PdfError> {
        let tree = self
            .name_trees
            .iter_mut()
            .find(|(key, _)| key.as_str() == category)
            .map(|(_, tree)| tree)
            .ok_or_else(|| PdfError::UnknownNameTree(category.to_string()))?;
        tree.add(&mut self.store, name, value)?;
        Ok(())
    }

    /// Drops unreachable objects and renumbers the rest, keeping the page
    /// handles and name trees held by this document valid.
    ///
    /// Pages whose objects were collected, because they were unlinked from
    /// the page tree, are forgotten.
    pub fn compact(&mut self) -> Renumbering {
        let renumbering = self.store.compact();
        if renumbering.is_unchanged() {
            return renumbering;
        }

        let current = self.current.take();
        for (index, mut page) in std::mem::take(&mut self.pages).into_iter().enumerate() {
            if !page.renumber(&renumbering) {
                log::warn!("Page {} was collected by compaction", index + 1);
                continue;
            }
            if current == Some(index) {
                self.current = Some(self.pages.len());
            }
            self.pages.push(page);
        }
        for (_, tree) in &mut self.name_trees {
            tree.renumber(&renumbering);
        }
        renumbering
    }

    /// Deflates every page content stream that is not yet compressed.
    pub fn compress_pages(&mut self) -> Result<(), PdfError> {
        for page in &self.pages {
            self.store.compress_stream(page.content())?;
        }
        Ok(())
    }

    pub fn render(&mut self) -> Result<Vec<u8>, PdfError> {
        self.render_to(Vec::new())
    }

    /// Writes the complete file to `writer`, applying the configured
    /// compression and compaction first.
    pub fn render_to<W: Write>(&mut self, writer: W) -> Result<W, PdfError> {
        if self.compress {
            self.compress_pages()?;
        }
        if self.compact {
            self.compact();
        }
        log::debug!(
            "Rendering PDF {} with {} page(s) and {} object(s)",
            self.version,
            self.pages.len(),
            self.store.len()
        );
        Assembler::new(&mut self.store)
            .version(&self.version)
            .trailer(&self.trailer)
            .write(writer)
    }

    pub fn render_file(&mut self, path: impl AsRef<Path>) -> Result<(), PdfError> {
        let bytes = self.render()?;
        fs::write(path, bytes)?;
        Ok(())
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Graphics for Document {
    /// Appends `text` and a newline to the current page's content stream.
    fn add_content(&mut self, text: &str) -> Result<(), PdfError> {
        let page = match self.current_page() {
            Some(page) => page,
            None => self.start_new_page()?,
        };
        let mut line = Vec::with_capacity(text.len() + 1);
        line.extend_from_slice(text.as_bytes());
        line.push(b'\n');
        self.store.append_stream(page.content(), &line)?;
        Ok(())
    }
}

/// Fluent construction of a [`Document`].
#[derive(Debug, Clone, Default)]
pub struct DocumentBuilder {
    options: DocumentOptions,
    info: Dictionary,
    trailer: Dictionary,
}

impl DocumentBuilder {
    /// Starts from `options`; entries added through the builder are applied
    /// on top of the JSON `info` and `trailer` maps.
    pub fn from_options(options: DocumentOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn info(mut self, key: impl Into<Name>, value: impl Into<Value>) -> Self {
        self.info.set(key, value);
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.options.version = version.into();
        self
    }

    pub fn page_size(mut self, page_size: PageSize) -> Self {
        self.options.page_size = page_size;
        self
    }

    pub fn compress(mut self, compress: bool) -> Self {
        self.options.compress = compress;
        self
    }

    pub fn compact(mut self, compact: bool) -> Self {
        self.options.compact = compact;
        self
    }

    pub fn trailer_entry(mut self, key: impl Into<Name>, value: impl Into<Value>) -> Self {
        self.trailer.set(key, value);
        self
    }

    pub fn build(self) -> Document {
        let mut info = self.options.info_dictionary();
        info.merge(&self.info);
        let mut trailer = self.options.trailer_dictionary();
        trailer.merge(&self.trailer);
        Document::from_parts(info, trailer, self.options)
    }
}
