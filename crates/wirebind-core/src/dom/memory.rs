//! In-memory DOM tree.
//!
//! [`MemoryDom`] implements [`Dom`] without a browser. Headless hosts and the
//! test harness build markup with [`MemoryDom::append_element`], fire events
//! with [`MemoryDom::dispatch`] and inspect listener bookkeeping with
//! [`MemoryDom::listener_count`] to check that adapters detach symmetrically.

use std::cell::RefCell;
use std::collections::BTreeMap;

use ahash::AHashMap;

use super::{Dom, DomHandler, ListenerId, NodeId};

#[derive(Default)]
struct Element {
    tag: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    attrs: BTreeMap<String, String>,
    classes: Vec<String>,
    value: String,
    checked: bool,
    listeners: Vec<(ListenerId, String, DomHandler)>,
}

struct Tree {
    nodes: AHashMap<NodeId, Element>,
    root: NodeId,
    next_node: u64,
    next_listener: u64,
    focused: Option<NodeId>,
}

impl Tree {
    fn insert(&mut self, tag: &str) -> NodeId {
        let id = NodeId(self.next_node);
        self.next_node += 1;
        self.nodes.insert(
            id,
            Element {
                tag: tag.to_ascii_lowercase(),
                ..Element::default()
            },
        );
        id
    }

    fn detach(&mut self, node: NodeId) {
        let parent = self.nodes.get_mut(&node).and_then(|el| el.parent.take());
        if let Some(parent) = parent.and_then(|p| self.nodes.get_mut(&p)) {
            parent.children.retain(|c| *c != node);
        }
    }
}

/// A DOM tree held entirely in memory.
pub struct MemoryDom {
    tree: RefCell<Tree>,
}

impl Default for MemoryDom {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDom {
    /// Create a document containing only a `<body>` root.
    #[must_use]
    pub fn new() -> Self {
        let mut tree = Tree {
            nodes: AHashMap::new(),
            root: NodeId(0),
            next_node: 0,
            next_listener: 1,
            focused: None,
        };
        tree.root = tree.insert("body");
        Self {
            tree: RefCell::new(tree),
        }
    }

    /// The document root.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.tree.borrow().root
    }

    /// Create an element with attributes and append it to `parent`.
    ///
    /// A `class` attribute is split on whitespace into the class list.
    pub fn append_element(&self, parent: NodeId, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
        let node = self.create_element(tag);
        for (name, value) in attrs {
            self.set_attr(node, name, value);
        }
        self.append_child(parent, node);
        node
    }

    /// Fire `event` on `node`, returning how many handlers ran.
    ///
    /// Handlers are collected before any runs, so a handler may add or remove
    /// listeners without affecting the current dispatch.
    pub fn dispatch(&self, node: NodeId, event: &str) -> usize {
        let handlers: Vec<DomHandler> = self
            .tree
            .borrow()
            .nodes
            .get(&node)
            .map(|el| {
                el.listeners
                    .iter()
                    .filter(|(_, name, _)| name == event)
                    .map(|(_, _, h)| h.clone())
                    .collect()
            })
            .unwrap_or_default();
        for handler in &handlers {
            handler();
        }
        handlers.len()
    }

    /// Number of listeners currently registered on `node`.
    #[must_use]
    pub fn listener_count(&self, node: NodeId) -> usize {
        self.tree
            .borrow()
            .nodes
            .get(&node)
            .map_or(0, |el| el.listeners.len())
    }

    /// Total listeners across the document.
    #[must_use]
    pub fn total_listeners(&self) -> usize {
        self.tree
            .borrow()
            .nodes
            .values()
            .map(|el| el.listeners.len())
            .sum()
    }

    /// The element that last received focus, if it still exists.
    #[must_use]
    pub fn focused(&self) -> Option<NodeId> {
        let tree = self.tree.borrow();
        tree.focused.filter(|n| tree.nodes.contains_key(n))
    }

    /// Number of live elements, including the root.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.borrow().nodes.len()
    }

    /// Whether the document holds only its root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }
}

impl Dom for MemoryDom {
    fn tag(&self, node: NodeId) -> Option<String> {
        self.tree.borrow().nodes.get(&node).map(|el| el.tag.clone())
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.tree.borrow().nodes.get(&node).and_then(|el| el.parent)
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.tree
            .borrow()
            .nodes
            .get(&node)
            .map(|el| el.children.clone())
            .unwrap_or_default()
    }

    fn attr(&self, node: NodeId, name: &str) -> Option<String> {
        let tree = self.tree.borrow();
        let el = tree.nodes.get(&node)?;
        if name == "class" {
            return Some(el.classes.join(" "));
        }
        el.attrs.get(name).cloned()
    }

    fn set_attr(&self, node: NodeId, name: &str, value: &str) {
        let mut tree = self.tree.borrow_mut();
        let Some(el) = tree.nodes.get_mut(&node) else {
            return;
        };
        match name {
            "class" => {
                el.classes = value.split_whitespace().map(str::to_owned).collect();
            }
            "value" => {
                el.value = value.to_owned();
                el.attrs.insert(name.to_owned(), value.to_owned());
            }
            _ => {
                el.attrs.insert(name.to_owned(), value.to_owned());
            }
        }
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.tree
            .borrow()
            .nodes
            .get(&node)
            .is_some_and(|el| el.classes.iter().any(|c| c == class))
    }

    fn add_class(&self, node: NodeId, class: &str) {
        if let Some(el) = self.tree.borrow_mut().nodes.get_mut(&node) {
            if !el.classes.iter().any(|c| c == class) {
                el.classes.push(class.to_owned());
            }
        }
    }

    fn remove_class(&self, node: NodeId, class: &str) {
        if let Some(el) = self.tree.borrow_mut().nodes.get_mut(&node) {
            el.classes.retain(|c| c != class);
        }
    }

    fn value(&self, node: NodeId) -> String {
        self.tree
            .borrow()
            .nodes
            .get(&node)
            .map(|el| el.value.clone())
            .unwrap_or_default()
    }

    fn set_value(&self, node: NodeId, value: &str) {
        if let Some(el) = self.tree.borrow_mut().nodes.get_mut(&node) {
            el.value = value.to_owned();
        }
    }

    fn checked(&self, node: NodeId) -> bool {
        self.tree
            .borrow()
            .nodes
            .get(&node)
            .is_some_and(|el| el.checked)
    }

    fn set_checked(&self, node: NodeId, checked: bool) {
        if let Some(el) = self.tree.borrow_mut().nodes.get_mut(&node) {
            el.checked = checked;
        }
    }

    fn create_element(&self, tag: &str) -> NodeId {
        self.tree.borrow_mut().insert(tag)
    }

    fn append_child(&self, parent: NodeId, child: NodeId) {
        let mut tree = self.tree.borrow_mut();
        if parent == child || !tree.nodes.contains_key(&parent) || !tree.nodes.contains_key(&child)
        {
            return;
        }
        tree.detach(child);
        if let Some(el) = tree.nodes.get_mut(&child) {
            el.parent = Some(parent);
        }
        if let Some(el) = tree.nodes.get_mut(&parent) {
            el.children.push(child);
        }
    }

    fn remove(&self, node: NodeId) {
        let removed: Vec<Element> = {
            let mut tree = self.tree.borrow_mut();
            if node == tree.root {
                return;
            }
            tree.detach(node);
            let mut stack = vec![node];
            let mut removed = Vec::new();
            while let Some(n) = stack.pop() {
                if let Some(el) = tree.nodes.remove(&n) {
                    stack.extend(el.children.iter().copied());
                    removed.push(el);
                }
            }
            removed
        };
        // Handlers may own adapters; drop them outside the borrow.
        drop(removed);
    }

    fn contains(&self, node: NodeId) -> bool {
        self.tree.borrow().nodes.contains_key(&node)
    }

    fn focus(&self, node: NodeId) {
        let mut tree = self.tree.borrow_mut();
        if tree.nodes.contains_key(&node) {
            tree.focused = Some(node);
        }
    }

    fn on(&self, node: NodeId, event: &str, handler: DomHandler) -> ListenerId {
        let mut tree = self.tree.borrow_mut();
        let id = ListenerId(tree.next_listener);
        tree.next_listener += 1;
        if let Some(el) = tree.nodes.get_mut(&node) {
            el.listeners.push((id, event.to_owned(), handler));
        }
        id
    }

    fn off(&self, node: NodeId, listener: ListenerId) -> bool {
        let removed = {
            let mut tree = self.tree.borrow_mut();
            let Some(el) = tree.nodes.get_mut(&node) else {
                return false;
            };
            let pos = el.listeners.iter().position(|(id, _, _)| *id == listener);
            pos.map(|p| el.listeners.remove(p))
        };
        removed.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn class_attribute_round_trips() {
        let dom = MemoryDom::new();
        let n = dom.append_element(dom.root(), "div", &[("class", "ui  dropdown")]);
        assert!(dom.has_class(n, "ui"));
        assert!(dom.has_class(n, "dropdown"));
        assert_eq!(dom.attr(n, "class").as_deref(), Some("ui dropdown"));
        dom.remove_class(n, "ui");
        assert!(!dom.has_class(n, "ui"));
    }

    #[test]
    fn value_attribute_seeds_value() {
        let dom = MemoryDom::new();
        let n = dom.append_element(dom.root(), "input", &[("value", "42")]);
        assert_eq!(dom.value(n), "42");
        dom.set_value(n, "7");
        assert_eq!(dom.value(n), "7");
    }

    #[test]
    fn dispatch_and_off() {
        let dom = MemoryDom::new();
        let n = dom.append_element(dom.root(), "label", &[]);
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        let id = dom.on(n, "click", Rc::new(move || h.set(h.get() + 1)));
        assert_eq!(dom.dispatch(n, "click"), 1);
        assert_eq!(dom.dispatch(n, "focus"), 0);
        assert!(dom.off(n, id));
        assert!(!dom.off(n, id));
        assert_eq!(dom.dispatch(n, "click"), 0);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn append_moves_node() {
        let dom = MemoryDom::new();
        let a = dom.append_element(dom.root(), "div", &[]);
        let b = dom.append_element(dom.root(), "div", &[]);
        let child = dom.append_element(a, "span", &[]);
        dom.append_child(b, child);
        assert!(dom.children(a).is_empty());
        assert_eq!(dom.children(b), vec![child]);
        assert_eq!(dom.parent(child), Some(b));
    }

    #[test]
    fn remove_drops_subtree_and_listeners() {
        let dom = MemoryDom::new();
        let a = dom.append_element(dom.root(), "div", &[]);
        let child = dom.append_element(a, "span", &[]);
        dom.on(child, "click", Rc::new(|| {}));
        assert_eq!(dom.total_listeners(), 1);
        dom.remove(a);
        assert!(!dom.contains(a));
        assert!(!dom.contains(child));
        assert_eq!(dom.total_listeners(), 0);
        assert!(dom.is_empty());
    }

    #[test]
    fn unknown_nodes_are_total() {
        let dom = MemoryDom::new();
        let ghost = NodeId(999);
        assert_eq!(dom.tag(ghost), None);
        assert!(dom.children(ghost).is_empty());
        assert_eq!(dom.value(ghost), "");
        assert!(!dom.has_class(ghost, "x"));
        dom.set_attr(ghost, "id", "x");
        assert_eq!(dom.attr(ghost, "id"), None);
    }

    #[test]
    fn focus_tracks_live_nodes() {
        let dom = MemoryDom::new();
        let n = dom.append_element(dom.root(), "input", &[]);
        dom.focus(n);
        assert_eq!(dom.focused(), Some(n));
        dom.remove(n);
        assert_eq!(dom.focused(), None);
    }
}
