use crate::error::StoreError;
use crate::object::IndirectObject;
use quire_object::{Dictionary, ObjectRef, References, Value, dictionary};
use std::collections::HashMap;

/// Owns every indirect object of a document.
///
/// Objects are kept in allocation order, which is also the order they are
/// written out in. Three objects always exist: the document information
/// dictionary, the page tree root and the catalog.
#[derive(Debug, Clone)]
pub struct ObjectStore {
    objects: Vec<IndirectObject>,
    index: HashMap<u32, usize>,
    info: u32,
    pages: u32,
    root: u32,
}

impl ObjectStore {
    /// Creates a store holding the `info` dictionary, an empty page tree and
    /// a catalog pointing at it.
    pub fn new(info: Dictionary) -> Self {
        let mut store = Self {
            objects: Vec::new(),
            index: HashMap::new(),
            info: 0,
            pages: 0,
            root: 0,
        };

        let info = store.allocate(info);
        let pages = store.allocate(dictionary! {
            "Type" => Value::name("Pages"),
            "Count" => 0,
            "Kids" => Value::Array(Vec::new()),
        });
        let root = store.allocate(dictionary! {
            "Type" => Value::name("Catalog"),
            "Pages" => pages,
        });

        store.info = info.id;
        store.pages = pages.id;
        store.root = root.id;
        store
    }

    /// Wraps `value` in a new indirect object with the next free identifier.
    pub fn allocate(&mut self, value: impl Into<Value>) -> ObjectRef {
        let mut id = self.objects.len() as u32 + 1;
        // Only reachable when `push` placed an object at an arbitrary id.
        while self.index.contains_key(&id) {
            id += 1;
        }
        let reference = self.push(IndirectObject::new(id, value));
        log::trace!("Allocated object {}", reference);
        reference
    }

    /// Adds a caller-built object under its own identifier.
    ///
    /// An object already stored under that identifier is replaced in place
    /// and keeps its position in the output order.
    pub fn push(&mut self, object: IndirectObject) -> ObjectRef {
        let reference = object.reference();
        match self.index.get(&object.id()) {
            Some(&slot) => self.objects[slot] = object,
            None => {
                self.index.insert(object.id(), self.objects.len());
                self.objects.push(object);
            }
        }
        reference
    }

    pub fn get(&self, id: u32) -> Result<&IndirectObject, StoreError> {
        self.index
            .get(&id)
            .map(|&slot| &self.objects[slot])
            .ok_or(StoreError::NotFound(id))
    }

    pub fn get_mut(&mut self, id: u32) -> Result<&mut IndirectObject, StoreError> {
        match self.index.get(&id) {
            Some(&slot) => Ok(&mut self.objects[slot]),
            None => Err(StoreError::NotFound(id)),
        }
    }

    pub fn contains(&self, id: u32) -> bool {
        self.index.contains_key(&id)
    }

    pub fn append_stream(&mut self, handle: ObjectRef, bytes: &[u8]) -> Result<(), StoreError> {
        self.get_mut(handle.id)?.append_stream(bytes)
    }

    pub fn compress_stream(&mut self, handle: ObjectRef) -> Result<(), StoreError> {
        self.get_mut(handle.id)?.compress_stream()
    }

    /// Handle to the document information dictionary.
    pub fn info(&self) -> ObjectRef {
        self.handle(self.info)
    }

    /// Handle to the root of the page tree.
    pub fn pages(&self) -> ObjectRef {
        self.handle(self.pages)
    }

    /// Handle to the document catalog.
    pub fn root(&self) -> ObjectRef {
        self.handle(self.root)
    }

    fn handle(&self, id: u32) -> ObjectRef {
        self.get(id).map_or(ObjectRef::new(id), IndirectObject::reference)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn size(&self) -> usize {
        self.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Objects in allocation order.
    pub fn iter(&self) -> std::slice::Iter<'_, IndirectObject> {
        self.objects.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, IndirectObject> {
        self.objects.iter_mut()
    }

    pub fn ids(&self) -> Vec<u32> {
        self.objects.iter().map(IndirectObject::id).collect()
    }

    /// Drops every object unreachable from the catalog and the information
    /// dictionary, then renumbers the survivors densely from 1 in their
    /// original order.
    ///
    /// References held inside surviving payloads are rewritten to the new
    /// identifiers. The returned [`Renumbering`] lets callers update handles
    /// they keep outside the store.
    pub fn compact(&mut self) -> Renumbering {
        for object in &mut self.objects {
            object.clear_live();
        }
        self.mark_live_from(self.root);
        self.mark_live_from(self.info);

        let before = self.objects.len();
        if self.objects.iter().all(IndirectObject::is_live) {
            log::debug!("Compaction found no dead objects among {}", before);
            return Renumbering::unchanged();
        }

        self.objects.retain(IndirectObject::is_live);
        let mut map = HashMap::with_capacity(self.objects.len());
        for (slot, object) in self.objects.iter_mut().enumerate() {
            let new_id = slot as u32 + 1;
            map.insert(object.id(), new_id);
            object.set_id(new_id);
        }
        let renumbering = Renumbering {
            map: Some(map),
            removed: before - self.objects.len(),
        };

        // Live payloads only point at live objects, or at identifiers the
        // store never held; the latter are left as written.
        for object in &mut self.objects {
            object
                .payload_mut()
                .rewrite_references(&mut |r| renumbering.apply(r).unwrap_or(r));
        }
        self.index = self
            .objects
            .iter()
            .enumerate()
            .map(|(slot, object)| (object.id(), slot))
            .collect();
        self.info = renumbering.get(self.info).unwrap_or(self.info);
        self.pages = renumbering.get(self.pages).unwrap_or(self.pages);
        self.root = renumbering.get(self.root).unwrap_or(self.root);

        log::debug!("Compaction removed {} of {} objects", renumbering.removed, before);
        renumbering
    }

    fn mark_live_from(&mut self, start: u32) {
        let mut pending = vec![start];
        let mut found = Vec::new();
        while let Some(id) = pending.pop() {
            // References to identifiers the store never held are not followed.
            let Some(&slot) = self.index.get(&id) else {
                continue;
            };
            let object = &mut self.objects[slot];
            if !object.mark_live() {
                continue;
            }
            found.clear();
            object.collect_references(&mut found);
            pending.extend(found.iter().map(|r| r.id));
        }
    }
}

impl Default for ObjectStore {
    fn default() -> Self {
        Self::new(Dictionary::new())
    }
}

impl<'a> IntoIterator for &'a ObjectStore {
    type Item = &'a IndirectObject;
    type IntoIter = std::slice::Iter<'a, IndirectObject>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// The old-to-new identifier mapping produced by [`ObjectStore::compact`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Renumbering {
    map: Option<HashMap<u32, u32>>,
    removed: usize,
}

impl Renumbering {
    fn unchanged() -> Self {
        Self::default()
    }

    /// The new identifier for `old`, or `None` if that object was removed.
    pub fn get(&self, old: u32) -> Option<u32> {
        match &self.map {
            None => Some(old),
            Some(map) => map.get(&old).copied(),
        }
    }

    /// Maps a handle to its new identifier, or `None` if compaction removed
    /// the object it pointed at.
    pub fn apply(&self, r: ObjectRef) -> Option<ObjectRef> {
        self.get(r.id).map(|id| ObjectRef::with_generation(id, r.generation))
    }

    /// Number of objects compaction removed.
    pub fn removed(&self) -> usize {
        self.removed
    }

    pub fn is_unchanged(&self) -> bool {
        self.map.is_none()
    }
}
