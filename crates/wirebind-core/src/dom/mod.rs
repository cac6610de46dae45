//! Synchronous DOM contract consumed by widget adapters.
//!
//! Adapters only need a small jQuery-like subset: tree navigation, attributes,
//! classes, form values and event (un)registration. Every query is total:
//! asking about an unknown node yields `None`, an empty string or an empty
//! list, never a panic, so chained lookups stay safe.
//!
//! # Invariants
//!
//! 1. A [`NodeId`] is never reused for a different element.
//! 2. [`Dom::on`] returns a [`ListenerId`] that [`Dom::off`] accepts exactly
//!    once; a second `off` returns `false`.
//! 3. Removing a node removes its whole subtree and every listener on it.

mod memory;

pub use memory::MemoryDom;

use core::fmt;
use std::rc::Rc;

/// Stable handle for an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Handle for a registered DOM event listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Callback invoked when a DOM event fires.
pub type DomHandler = Rc<dyn Fn()>;

/// The DOM operations adapters rely on.
///
/// Methods take `&self`; implementations use interior mutability because the
/// tree is shared by every adapter attached to it.
pub trait Dom {
    /// Lower-case tag name, or `None` for an unknown node.
    fn tag(&self, node: NodeId) -> Option<String>;
    fn parent(&self, node: NodeId) -> Option<NodeId>;
    fn children(&self, node: NodeId) -> Vec<NodeId>;

    fn attr(&self, node: NodeId, name: &str) -> Option<String>;
    fn set_attr(&self, node: NodeId, name: &str, value: &str);

    fn has_class(&self, node: NodeId, class: &str) -> bool;
    fn add_class(&self, node: NodeId, class: &str);
    fn remove_class(&self, node: NodeId, class: &str);

    /// Current form value (`val()`); empty for non-form elements.
    fn value(&self, node: NodeId) -> String;
    fn set_value(&self, node: NodeId, value: &str);
    /// Checked state (`prop("checked")`).
    fn checked(&self, node: NodeId) -> bool;
    fn set_checked(&self, node: NodeId, checked: bool);

    /// Create a detached element.
    fn create_element(&self, tag: &str) -> NodeId;
    /// Append `child` to `parent`, detaching it from any previous parent.
    fn append_child(&self, parent: NodeId, child: NodeId);
    /// Remove `node` and its subtree from the document.
    fn remove(&self, node: NodeId);
    /// Whether `node` still exists.
    fn contains(&self, node: NodeId) -> bool;
    fn focus(&self, node: NodeId);

    fn on(&self, node: NodeId, event: &str, handler: DomHandler) -> ListenerId;
    fn off(&self, node: NodeId, listener: ListenerId) -> bool;
}

/// Iterate over the ancestors of `node`, nearest first (excluding `node`).
pub fn ancestors(dom: &dyn Dom, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
    std::iter::successors(dom.parent(node), move |n| dom.parent(*n))
}

/// Nearest element matching `pred`, starting at `node` itself (`closest()`).
pub fn closest(dom: &dyn Dom, node: NodeId, pred: impl Fn(NodeId) -> bool) -> Option<NodeId> {
    if pred(node) {
        return Some(node);
    }
    ancestors(dom, node).find(|n| pred(*n))
}

/// First descendant of `node` in document order matching `pred` (`find()`).
pub fn find_descendant(
    dom: &dyn Dom,
    node: NodeId,
    pred: impl Fn(NodeId) -> bool,
) -> Option<NodeId> {
    let mut stack: Vec<NodeId> = dom.children(node).into_iter().rev().collect();
    while let Some(n) = stack.pop() {
        if pred(n) {
            return Some(n);
        }
        stack.extend(dom.children(n).into_iter().rev());
    }
    None
}

/// Whether `node` is a form control that carries a value.
pub fn is_input_like(dom: &dyn Dom, node: NodeId) -> bool {
    matches!(
        dom.tag(node).as_deref(),
        Some("input" | "select" | "textarea")
    )
}

/// The attribute value if present and non-empty.
pub fn non_empty_attr(dom: &dyn Dom, node: NodeId, name: &str) -> Option<String> {
    dom.attr(node, name).filter(|v| !v.is_empty())
}
