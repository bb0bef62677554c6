//! Handle table behind the `NodeId`s given to the engine.
//!
//! Elements the host created are dropped from the table once removed from
//! the document, together with any created descendants. Elements adopted
//! from the page (the container, user content) stay registered for the life
//! of the host.

use scratchcard_core::NodeId;
use std::collections::HashMap;

struct Entry<E> {
    element: E,
    created: bool,
}

pub struct Registry<E> {
    entries: HashMap<NodeId, Entry<E>>,
    next: u32,
}

impl<E> Default for Registry<E> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            next: 0,
        }
    }
}

impl<E: Clone + PartialEq> Registry<E> {
    pub fn get(&self, node: NodeId) -> Option<E> {
        self.entries.get(&node).map(|entry| entry.element.clone())
    }

    pub fn lookup(&self, element: &E) -> Option<NodeId> {
        self.entries
            .iter()
            .find(|(_, entry)| entry.element == *element)
            .map(|(&node, _)| node)
    }

    /// Register an element owned by the page. Idempotent.
    pub fn adopt(&mut self, element: E) -> NodeId {
        if let Some(node) = self.lookup(&element) {
            return node;
        }
        self.insert(element, false)
    }

    /// Register an element the host just created.
    pub fn create(&mut self, element: E) -> NodeId {
        self.insert(element, true)
    }

    fn insert(&mut self, element: E, created: bool) -> NodeId {
        let node = NodeId(self.next);
        self.next += 1;
        self.entries.insert(node, Entry { element, created });
        node
    }

    /// Forget a created element that has left the document, plus every
    /// created element `contains` places inside it. Adopted elements are
    /// kept.
    pub fn release(&mut self, node: NodeId, contains: impl Fn(&E, &E) -> bool) {
        let Some(root) = self.entries.get(&node).filter(|entry| entry.created) else {
            return;
        };
        let root = root.element.clone();
        self.entries.remove(&node);
        self.entries
            .retain(|_, entry| !(entry.created && contains(&root, &entry.element)));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
