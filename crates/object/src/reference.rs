use std::fmt;

/// A handle to an indirect object: its identifier and generation number.
///
/// Handles are plain values. The object itself lives in the store, which
/// is the only owner; everything else points at it through one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectRef {
    pub id: u32,
    pub generation: u16,
}

impl ObjectRef {
    /// A handle to generation 0 of `id`.
    pub fn new(id: u32) -> Self {
        Self { id, generation: 0 }
    }

    pub fn with_generation(id: u32, generation: u16) -> Self {
        Self { id, generation }
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} R", self.id, self.generation)
    }
}

/// Anything that can point at indirect objects.
///
/// Liveness marking walks the object graph through this trait, so it must
/// report every handle reachable without following another indirection.
pub trait References {
    /// Pushes every directly reachable handle onto `out`.
    fn collect_references(&self, out: &mut Vec<ObjectRef>);

    fn references(&self) -> Vec<ObjectRef> {
        let mut out = Vec::new();
        self.collect_references(&mut out);
        out
    }
}
