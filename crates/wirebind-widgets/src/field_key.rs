//! Field key resolution.
//!
//! A field key names a field for the validation engine. Keys come from the
//! element's own `id`, `name` or `data-validate` marker. Elements without one
//! inherit a key from the nearest keyed widget container (`calendar_start`
//! for an input inside `div.calendar#start`), or get a fresh `f_NNN` key.
//! Derived and fresh keys are stamped onto the element as the marker, so the
//! second call finds them. A derived key another element of the same form
//! already answers to is not reused; that element keeps it and this one gets
//! a fresh key.
//!
//! # Invariants
//!
//! 1. **Idempotent**: `ensure_field_key` returns the same key for the same
//!    element every time.
//! 2. **Bounded walk**: the ancestor walk stops at the first form boundary.
//! 3. **Distinct**: two elements of one form never resolve to the same
//!    derived or fresh key.

use wirebind_core::dom::{Dom, ancestors, find_descendant, non_empty_attr};
use wirebind_core::{NodeId, next_id};

/// Marker attribute holding a derived or synthesized key.
pub const FIELD_KEY_ATTR: &str = "data-validate";

/// Container classes a key can be derived from, in match priority.
pub const CONTAINER_CLASSES: [&str; 5] = ["calendar", "dropdown", "checkbox", "slider", "field"];

/// Whether `node` delimits a form.
pub fn is_form_boundary(dom: &dyn Dom, node: NodeId) -> bool {
    dom.tag(node).as_deref() == Some("form") || dom.has_class(node, "form")
}

/// The key `node` already carries, without deriving one.
pub fn existing_key(dom: &dyn Dom, node: NodeId) -> Option<String> {
    non_empty_attr(dom, node, "id")
        .or_else(|| non_empty_attr(dom, node, "name"))
        .or_else(|| non_empty_attr(dom, node, FIELD_KEY_ATTR))
}

/// Resolve, and if needed stamp, the key of `element`.
pub fn ensure_field_key(dom: &dyn Dom, element: NodeId) -> String {
    if let Some(key) = existing_key(dom, element) {
        return key;
    }
    let derived = ancestors(dom, element)
        .take_while(|anc| !is_form_boundary(dom, *anc))
        .find_map(|anc| {
            let class = CONTAINER_CLASSES.iter().find(|c| dom.has_class(anc, c))?;
            existing_key(dom, anc).map(|parent| format!("{class}_{parent}"))
        })
        .filter(|key| !key_taken(dom, element, key));
    let key = derived.unwrap_or_else(|| format!("f_{}", next_id()));
    dom.set_attr(element, FIELD_KEY_ATTR, &key);
    key
}

/// Whether another element of `element`'s form already answers to `key`.
fn key_taken(dom: &dyn Dom, element: NodeId, key: &str) -> bool {
    let scope = ancestors(dom, element)
        .find(|anc| is_form_boundary(dom, *anc))
        .or_else(|| ancestors(dom, element).last());
    scope.is_some_and(|scope| {
        find_descendant(dom, scope, |n| {
            n != element && existing_key(dom, n).as_deref() == Some(key)
        })
        .is_some()
    })
}
