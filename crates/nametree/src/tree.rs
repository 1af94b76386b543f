use crate::error::NameTreeError;
use quire_object::{Dictionary, ObjectRef, Value};
use quire_store::{ObjectStore, Renumbering};
use std::collections::BTreeSet;

type NodeId = usize;

const ROOT: NodeId = 0;

/// A single `name => value` pair stored in a leaf.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub name: String,
    pub value: Value,
}

/// A node is a leaf while it has no kids; inner nodes hold no entries.
#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    entries: Vec<Entry>,
    kids: Vec<NodeId>,
    reference: Option<ObjectRef>,
}

impl Node {
    fn is_leaf(&self) -> bool {
        self.kids.is_empty()
    }

    fn len(&self) -> usize {
        if self.is_leaf() { self.entries.len() } else { self.kids.len() }
    }

    /// Moves the upper half out; the upper half gets the extra element when
    /// the count is odd.
    fn split_off_upper(&mut self) -> (Vec<Entry>, Vec<NodeId>) {
        let entries = self.entries.split_off(self.entries.len() / 2);
        let kids = self.kids.split_off(self.kids.len() / 2);
        (entries, kids)
    }
}

/// A name tree whose nodes hold at most `limit` entries or kids.
#[derive(Debug, Clone)]
pub struct NameTree {
    limit: usize,
    nodes: Vec<Node>,
    /// Set when compaction collected backing objects of non-root nodes.
    detached: bool,
}

impl NameTree {
    /// Creates an empty tree. The root gets its backing object lazily, on the
    /// first call to [`NameTree::reference`].
    pub fn new(limit: usize) -> Result<Self, NameTreeError> {
        if limit < 2 {
            return Err(NameTreeError::LimitTooSmall(limit));
        }
        Ok(Self {
            limit,
            nodes: vec![Node {
                parent: None,
                entries: Vec::new(),
                kids: Vec::new(),
                reference: None,
            }],
            detached: false,
        })
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn root(&self) -> NodeView<'_> {
        NodeView { tree: self, id: ROOT }
    }

    /// Number of entries in the whole tree.
    pub fn len(&self) -> usize {
        self.nodes.iter().map(|node| node.entries.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of levels, counting the root.
    pub fn depth(&self) -> usize {
        let mut depth = 1;
        let mut node = ROOT;
        while let Some(&kid) = self.nodes[node].kids.first() {
            node = kid;
            depth += 1;
        }
        depth
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        let entries = &self.nodes[self.leaf_for(name)].entries;
        entries
            .binary_search_by(|entry| entry.name.as_str().cmp(name))
            .ok()
            .map(|i| &entries[i].value)
    }

    /// All entries in ascending name order.
    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        let mut out = Vec::with_capacity(self.len());
        self.collect_entries(ROOT, &mut out);
        out.into_iter()
    }

    fn collect_entries<'a>(&'a self, node: NodeId, out: &mut Vec<&'a Entry>) {
        let node = &self.nodes[node];
        out.extend(node.entries.iter());
        for &kid in &node.kids {
            self.collect_entries(kid, out);
        }
    }

    /// Inserts `name => value`, splitting nodes that overflow.
    ///
    /// Adding a name that is already present replaces its value.
    pub fn add(
        &mut self,
        store: &mut ObjectStore,
        name: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<(), NameTreeError> {
        let name = name.into();
        let value = value.into();
        let mut touched = self.rebind(store);

        let leaf = self.leaf_for(&name);
        let first_new = self.nodes.len();
        let entries = &mut self.nodes[leaf].entries;
        match entries.binary_search_by(|entry| entry.name.as_str().cmp(name.as_str())) {
            Ok(i) => entries[i].value = value,
            Err(i) => entries.insert(i, Entry { name, value }),
        }

        touched.push(leaf);
        if entries.len() > self.limit {
            self.split(leaf, store, &mut touched);
        }
        touched.extend(first_new..self.nodes.len());
        self.sync(store, &touched)
    }

    /// The handle of the root's backing object, allocating it on first use.
    ///
    /// This is what a catalog's `/Names` dictionary points at.
    pub fn reference(&mut self, store: &mut ObjectStore) -> Result<ObjectRef, NameTreeError> {
        let rebound = self.rebind(store);
        let reference = match self.nodes[ROOT].reference {
            Some(reference) => reference,
            None => {
                let reference = store.allocate(self.node_dictionary(ROOT));
                self.nodes[ROOT].reference = Some(reference);
                reference
            }
        };
        self.sync(store, &rebound)?;
        Ok(reference)
    }

    /// The root's projection.
    pub fn to_dictionary(&self) -> Dictionary {
        self.node_dictionary(ROOT)
    }

    /// Points every backing handle at its post-compaction identifier.
    ///
    /// Nodes whose objects were collected lose their handle and get a fresh
    /// object the next time the tree is written to the store. References held
    /// in entry values follow the renumbering too.
    pub fn renumber(&mut self, renumbering: &Renumbering) {
        for (id, node) in self.nodes.iter_mut().enumerate() {
            if let Some(old) = node.reference {
                node.reference = renumbering.apply(old);
                if node.reference.is_none() && id != ROOT {
                    self.detached = true;
                }
            }
            for entry in &mut node.entries {
                entry
                    .value
                    .rewrite_references(&mut |r| renumbering.apply(r).unwrap_or(r));
            }
        }
    }

    /// Gives fresh backing objects to non-root nodes that lost theirs in a
    /// compaction, returning the nodes that now need their projection written.
    fn rebind(&mut self, store: &mut ObjectStore) -> Vec<NodeId> {
        if !std::mem::take(&mut self.detached) {
            return Vec::new();
        }
        let mut rebound = Vec::new();
        for (id, node) in self.nodes.iter_mut().enumerate().skip(1) {
            if node.reference.is_none() {
                node.reference = Some(store.allocate(Dictionary::new()));
                rebound.push(id);
            }
        }
        log::debug!("Name tree rebound {} node(s) after compaction", rebound.len());
        rebound
    }

    /// Descends to the leaf whose range should hold `name`: the first child
    /// whose greatest name is not below it, or the last child.
    fn leaf_for(&self, name: &str) -> NodeId {
        let mut node = ROOT;
        while let Some(&last) = self.nodes[node].kids.last() {
            node = self.nodes[node]
                .kids
                .iter()
                .copied()
                .find(|&kid| self.greatest(kid).is_none_or(|greatest| greatest >= name))
                .unwrap_or(last);
        }
        node
    }

    fn split(&mut self, node: NodeId, store: &mut ObjectStore, touched: &mut Vec<NodeId>) {
        touched.push(node);
        match self.nodes[node].parent {
            None => {
                // The root keeps its identity and becomes an inner node over
                // two fresh halves.
                let left = self.new_node(node, store);
                let right = self.new_node(node, store);
                let (upper_entries, upper_kids) = self.nodes[node].split_off_upper();
                let lower_entries = std::mem::take(&mut self.nodes[node].entries);
                let lower_kids = std::mem::replace(&mut self.nodes[node].kids, vec![left, right]);
                self.adopt(left, lower_entries, lower_kids);
                self.adopt(right, upper_entries, upper_kids);
                log::debug!("Name tree root split; depth is now {}", self.depth());
            }
            Some(parent) => {
                let sibling = self.new_node(parent, store);
                let (upper_entries, upper_kids) = self.nodes[node].split_off_upper();
                self.adopt(sibling, upper_entries, upper_kids);

                touched.push(parent);
                let kids = &mut self.nodes[parent].kids;
                let at = kids.iter().position(|&kid| kid == node).map_or(kids.len(), |i| i + 1);
                kids.insert(at, sibling);
                if kids.len() > self.limit {
                    self.split(parent, store, touched);
                }
            }
        }
    }

    fn new_node(&mut self, parent: NodeId, store: &mut ObjectStore) -> NodeId {
        let id = self.nodes.len();
        let reference = store.allocate(Dictionary::new());
        self.nodes.push(Node {
            parent: Some(parent),
            entries: Vec::new(),
            kids: Vec::new(),
            reference: Some(reference),
        });
        id
    }

    fn adopt(&mut self, node: NodeId, entries: Vec<Entry>, kids: Vec<NodeId>) {
        for &kid in &kids {
            self.nodes[kid].parent = Some(node);
        }
        self.nodes[node].entries = entries;
        self.nodes[node].kids = kids;
    }

    /// Rewrites the backing objects of `touched` nodes and of all their
    /// ancestors, whose limits may have moved.
    fn sync(&self, store: &mut ObjectStore, touched: &[NodeId]) -> Result<(), NameTreeError> {
        let mut dirty = BTreeSet::new();
        for &start in touched {
            let mut node = Some(start);
            while let Some(id) = node {
                if !dirty.insert(id) {
                    break;
                }
                node = self.nodes[id].parent;
            }
        }

        for id in dirty {
            if let Some(reference) = self.nodes[id].reference {
                store.get_mut(reference.id)?.set_payload(self.node_dictionary(id));
            }
        }
        Ok(())
    }

    fn least(&self, node: NodeId) -> Option<&str> {
        let node = &self.nodes[node];
        match node.kids.first() {
            Some(&kid) => self.least(kid),
            None => node.entries.first().map(|entry| entry.name.as_str()),
        }
    }

    fn greatest(&self, node: NodeId) -> Option<&str> {
        let node = &self.nodes[node];
        match node.kids.last() {
            Some(&kid) => self.greatest(kid),
            None => node.entries.last().map(|entry| entry.name.as_str()),
        }
    }

    /// `{Names}` or `{Kids}` for the root; non-root nodes also carry
    /// `{Limits: [least, greatest]}`.
    fn node_dictionary(&self, id: NodeId) -> Dictionary {
        let node = &self.nodes[id];
        let mut dict = Dictionary::with_capacity(2);

        if node.parent.is_some()
            && let (Some(least), Some(greatest)) = (self.least(id), self.greatest(id))
        {
            dict.set("Limits", Value::Array(vec![least.into(), greatest.into()]));
        }

        if node.is_leaf() {
            let names: Vec<Value> = node
                .entries
                .iter()
                .flat_map(|entry| [Value::from(entry.name.as_str()), entry.value.clone()])
                .collect();
            dict.set("Names", names);
        } else {
            let kids: Vec<Value> = node
                .kids
                .iter()
                .filter_map(|&kid| self.nodes[kid].reference)
                .map(Value::Reference)
                .collect();
            dict.set("Kids", kids);
        }
        dict
    }
}

/// A read-only view of one node, for inspecting the tree's shape.
#[derive(Debug, Clone, Copy)]
pub struct NodeView<'a> {
    tree: &'a NameTree,
    id: NodeId,
}

impl<'a> NodeView<'a> {
    pub fn is_root(&self) -> bool {
        self.id == ROOT
    }

    pub fn is_leaf(&self) -> bool {
        self.tree.nodes[self.id].is_leaf()
    }

    /// Number of entries (leaf) or kids (inner node).
    pub fn len(&self) -> usize {
        self.tree.nodes[self.id].len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entries of a leaf; empty for inner nodes.
    pub fn entries(&self) -> &'a [Entry] {
        &self.tree.nodes[self.id].entries
    }

    /// Kids of an inner node; empty for leaves.
    pub fn children(&self) -> Vec<NodeView<'a>> {
        self.tree.nodes[self.id]
            .kids
            .iter()
            .map(|&id| NodeView { tree: self.tree, id })
            .collect()
    }

    pub fn reference(&self) -> Option<ObjectRef> {
        self.tree.nodes[self.id].reference
    }

    pub fn limits(&self) -> Option<(&'a str, &'a str)> {
        Some((self.tree.least(self.id)?, self.tree.greatest(self.id)?))
    }

    pub fn to_dictionary(&self) -> Dictionary {
        self.tree.node_dictionary(self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quire_encode::encode;
    use quire_object::dictionary;

    fn tree_add(tree: &mut NameTree, store: &mut ObjectStore, pairs: &[(&str, i64)]) {
        for &(name, value) in pairs {
            tree.add(store, name, value).unwrap();
        }
    }

    fn dump(node: NodeView<'_>) -> String {
        let parts: Vec<String> = if node.is_leaf() {
            node.entries()
                .iter()
                .map(|entry| format!("{}={}", entry.name, entry.value.as_integer().unwrap_or_default()))
                .collect()
        } else {
            node.children().into_iter().map(dump).collect()
        };
        format!("[{}]", parts.join(","))
    }

    fn names(pairs: &[(&str, i64)]) -> Value {
        pairs
            .iter()
            .flat_map(|&(name, value)| [Value::from(name), Value::Integer(value)])
            .collect()
    }

    fn first_four() -> [(&'static str, i64); 4] {
        [("one", 1), ("two", 2), ("three", 3), ("four", 4)]
    }

    #[test]
    fn test_limit_must_allow_two_children() {
        assert!(matches!(NameTree::new(1), Err(NameTreeError::LimitTooSmall(1))));
        assert!(NameTree::new(2).is_ok());
    }

    #[test]
    fn test_new_tree_has_no_children() {
        let tree = NameTree::new(3).unwrap();
        assert_eq!(tree.root().len(), 0);
        assert!(tree.is_empty());
    }

    #[test]
    fn test_no_subtrees_while_limit_not_reached() {
        let mut store = ObjectStore::default();
        let mut tree = NameTree::new(3).unwrap();
        tree_add(&mut tree, &mut store, &[("one", 1), ("two", 2), ("three", 3)]);
        assert_eq!(dump(tree.root()), "[one=1,three=3,two=2]");
    }

    #[test]
    fn test_splits_into_subtrees_when_limit_exceeded() {
        let mut store = ObjectStore::default();
        let mut tree = NameTree::new(3).unwrap();
        tree_add(&mut tree, &mut store, &first_four());
        assert_eq!(dump(tree.root()), "[[four=4,one=1],[three=3,two=2]]");
    }

    #[test]
    fn test_root_split_allocates_two_objects() {
        let mut store = ObjectStore::default();
        let ref_count = store.size();
        let mut tree = NameTree::new(3).unwrap();
        tree_add(&mut tree, &mut store, &first_four());
        assert_eq!(store.size(), ref_count + 2);
    }

    #[test]
    fn test_subtree_split_allocates_one_object() {
        let mut store = ObjectStore::default();
        let mut tree = NameTree::new(3).unwrap();
        tree_add(&mut tree, &mut store, &first_four());

        let ref_count = store.size();
        tree_add(&mut tree, &mut store, &[("five", 5), ("six", 6), ("seven", 7)]);

        assert_eq!(
            dump(tree.root()),
            "[[five=5,four=4,one=1],[seven=7,six=6],[three=3,two=2]]"
        );
        assert_eq!(store.size(), ref_count + 1);
    }

    #[test]
    fn test_cascading_split_keeps_tree_balanced() {
        let mut store = ObjectStore::default();
        let mut tree = NameTree::new(3).unwrap();
        tree_add(&mut tree, &mut store, &first_four());
        tree_add(&mut tree, &mut store, &[("five", 5), ("six", 6), ("seven", 7), ("eight", 8)]);

        assert_eq!(
            dump(tree.root()),
            "[[[eight=8,five=5],[four=4,one=1]],[[seven=7,six=6],[three=3,two=2]]]"
        );
        assert_eq!(tree.depth(), 3);
    }

    #[test]
    fn test_ordered_input_stays_ordered() {
        let mut store = ObjectStore::default();
        let mut tree = NameTree::new(3).unwrap();
        tree_add(&mut tree, &mut store, &[("eight", 8), ("five", 5), ("four", 4), ("one", 1)]);
        tree_add(&mut tree, &mut store, &[("seven", 7), ("six", 6), ("three", 3), ("two", 2)]);

        assert_eq!(
            dump(tree.root()),
            "[[[eight=8,five=5],[four=4,one=1]],[[seven=7,six=6],[three=3,two=2]]]"
        );
    }

    #[test]
    fn test_root_only_projection_has_names() {
        let mut store = ObjectStore::default();
        let mut tree = NameTree::new(3).unwrap();
        tree_add(&mut tree, &mut store, &[("one", 1), ("two", 2), ("three", 3)]);

        let expected = dictionary! { "Names" => names(&[("one", 1), ("three", 3), ("two", 2)]) };
        assert_eq!(tree.to_dictionary(), expected);
    }

    #[test]
    fn test_split_root_projection_has_kids() {
        let mut store = ObjectStore::default();
        let mut tree = NameTree::new(3).unwrap();
        tree_add(&mut tree, &mut store, &first_four());

        let kids: Value = tree
            .root()
            .children()
            .iter()
            .map(|child| Value::Reference(child.reference().unwrap()))
            .collect();
        assert_eq!(tree.to_dictionary(), dictionary! { "Kids" => kids });
    }

    #[test]
    fn test_leaf_projection_has_limits_and_names() {
        let mut store = ObjectStore::default();
        let mut tree = NameTree::new(3).unwrap();
        tree_add(&mut tree, &mut store, &first_four());

        let expected = dictionary! {
            "Limits" => Value::Array(vec!["four".into(), "one".into()]),
            "Names" => names(&[("four", 4), ("one", 1)]),
        };
        let first = tree.root().children()[0];
        assert_eq!(first.to_dictionary(), expected);

        // The backing object carries the same projection.
        let backing = store.get(first.reference().unwrap().id).unwrap();
        assert_eq!(backing.payload(), &Value::Dictionary(expected));
    }

    #[test]
    fn test_inner_projection_has_limits_and_kids() {
        let mut store = ObjectStore::default();
        let mut tree = NameTree::new(3).unwrap();
        tree_add(&mut tree, &mut store, &first_four());
        tree_add(&mut tree, &mut store, &[("five", 5), ("six", 6), ("seven", 7), ("eight", 8)]);
        tree_add(&mut tree, &mut store, &[("nine", 9), ("ten", 10), ("eleven", 11), ("twelve", 12)]);
        tree_add(&mut tree, &mut store, &[("thirteen", 13), ("fourteen", 14), ("fifteen", 15), ("sixteen", 16)]);

        let first = tree.root().children()[0];
        let kids: Value = first
            .children()
            .iter()
            .map(|child| Value::Reference(child.reference().unwrap()))
            .collect();
        let expected = dictionary! {
            "Limits" => Value::Array(vec!["eight".into(), "one".into()]),
            "Kids" => kids,
        };
        assert_eq!(first.to_dictionary(), expected);

        let backing = store.get(first.reference().unwrap().id).unwrap();
        assert_eq!(backing.payload(), &Value::Dictionary(expected));
    }

    #[test]
    fn test_entries_stay_sorted_and_leaves_bounded() {
        let mut store = ObjectStore::default();
        let mut tree = NameTree::new(4).unwrap();
        let words = [
            "kilo", "alpha", "juliet", "echo", "golf", "bravo", "lima", "charlie", "india", "delta",
            "hotel", "foxtrot", "mike", "oscar", "november",
        ];
        for (i, word) in words.iter().enumerate() {
            tree.add(&mut store, *word, i as i64).unwrap();
        }

        let mut sorted = words.to_vec();
        sorted.sort();
        let in_tree: Vec<&str> = tree.entries().map(|entry| entry.name.as_str()).collect();
        assert_eq!(in_tree, sorted);
        assert_eq!(tree.len(), words.len());

        fn check(node: NodeView<'_>, limit: usize) {
            assert!(node.len() <= limit);
            for child in node.children() {
                check(child, limit);
            }
        }
        check(tree.root(), tree.limit());
    }

    #[test]
    fn test_get_and_replace() {
        let mut store = ObjectStore::default();
        let mut tree = NameTree::new(3).unwrap();
        tree_add(&mut tree, &mut store, &first_four());
        tree.add(&mut store, "three", 33).unwrap();

        assert_eq!(tree.get("three"), Some(&Value::Integer(33)));
        assert_eq!(tree.get("zero"), None);
        assert_eq!(tree.len(), 4);
    }

    #[test]
    fn test_root_reference_is_lazy() {
        let mut store = ObjectStore::default();
        let mut tree = NameTree::new(10).unwrap();
        tree.add(&mut store, "hello", 1.0).unwrap();
        tree.add(&mut store, "world", 2.0).unwrap();
        assert_eq!(store.size(), 3);

        let reference = tree.reference(&mut store).unwrap();
        assert_eq!(tree.reference(&mut store).unwrap(), reference);
        assert_eq!(store.size(), 4);

        let encoded = encode(store.get(reference.id).unwrap().payload(), false).unwrap();
        assert_eq!(
            String::from_utf8(encoded).unwrap(),
            "<< /Names [<FEFF00680065006C006C006F> 1 <FEFF0077006F0072006C0064> 2]\n>>"
        );
    }

    #[test]
    fn test_renumber_follows_compaction() {
        let mut store = ObjectStore::default();
        store.allocate("garbage");
        let mut tree = NameTree::new(3).unwrap();
        tree_add(&mut tree, &mut store, &first_four());
        let root = tree.reference(&mut store).unwrap();
        let catalog = store.root().id;
        store
            .get_mut(catalog)
            .unwrap()
            .dict_mut()
            .unwrap()
            .set("Names", dictionary! { "Dests" => root });

        let renumbering = store.compact();
        tree.renumber(&renumbering);

        let root = tree.reference(&mut store).unwrap();
        assert_eq!(store.get(root.id).unwrap().payload(), &Value::Dictionary(tree.to_dictionary()));
        assert_eq!(store.size(), 6);

        // Later inserts land in the renumbered objects, not in whatever took
        // the old identifiers.
        let content = store.allocate(dictionary! { "Length" => 0 });
        tree.add(&mut store, "zzz", 9).unwrap();
        assert_eq!(store.get(content.id).unwrap().payload(), &Value::Dictionary(dictionary! { "Length" => 0 }));
        for child in tree.root().children() {
            let backing = store.get(child.reference().unwrap().id).unwrap();
            assert_eq!(backing.payload(), &Value::Dictionary(child.to_dictionary()));
        }
    }

    #[test]
    fn test_collected_nodes_get_fresh_objects() {
        let mut store = ObjectStore::default();
        let mut tree = NameTree::new(3).unwrap();
        tree_add(&mut tree, &mut store, &first_four());
        let old_kids: Vec<ObjectRef> = tree.root().children().iter().filter_map(NodeView::reference).collect();

        // Nothing points at the tree, so compaction collects both halves.
        let renumbering = store.compact();
        tree.renumber(&renumbering);
        assert!(tree.root().children().iter().all(|child| child.reference().is_none()));

        let survivor = store.allocate("unrelated");
        let survivor_again = store.allocate("also unrelated");
        assert!(old_kids.contains(&survivor) && old_kids.contains(&survivor_again));

        tree.add(&mut store, "zero", 0).unwrap();
        assert_eq!(store.get(survivor.id).unwrap().payload(), &Value::from("unrelated"));
        assert_eq!(store.get(survivor_again.id).unwrap().payload(), &Value::from("also unrelated"));

        let root = tree.reference(&mut store).unwrap();
        assert_eq!(store.get(root.id).unwrap().payload(), &Value::Dictionary(tree.to_dictionary()));
        for child in tree.root().children() {
            let reference = child.reference().unwrap();
            assert!(!old_kids.contains(&reference));
            assert_eq!(store.get(reference.id).unwrap().payload(), &Value::Dictionary(child.to_dictionary()));
        }
    }

    #[test]
    fn test_renumber_rewrites_entry_values() {
        let mut store = ObjectStore::default();
        store.allocate("garbage");
        let target = store.allocate(dictionary! { "Type" => Value::name("Page") });
        let info = store.info().id;
        store.get_mut(info).unwrap().dict_mut().unwrap().set("Target", target);

        let mut tree = NameTree::new(3).unwrap();
        tree.add(&mut store, "cover", target).unwrap();
        let renumbering = store.compact();
        tree.renumber(&renumbering);

        assert_eq!(tree.get("cover"), Some(&Value::Reference(ObjectRef::new(4))));
    }
}
