//! Dropdown adapter.
//!
//! Single-select dropdowns bind a [`TypedValue::Text`]; multi-select
//! dropdowns bind a [`TypedValue::List`]. Multi-select writes use "set
//! exactly" so deselected items go away; "set selected" only ever adds.

use std::fmt;
use std::rc::Rc;

use wirebind_core::dom::{Dom, find_descendant};
use wirebind_core::{NodeId, TypedValue};
use wirebind_i18n::FormatError;
use wirebind_runtime::Observable;

use super::{AttachSpec, Attachment, LabelAction, attach_with, inner_input};
use crate::controller::{WidgetSync, mismatch};
use crate::error::BindError;
use crate::host::Host;
use crate::native::{Command, NativeHandler, NativeWidget, WidgetEvent, WidgetKind};

#[derive(Clone, Default)]
pub struct DropdownSettings {
    /// Multi-select; detected from the markup when unset.
    pub multiple: Option<bool>,
    pub on_change: Option<NativeHandler>,
}

impl fmt::Debug for DropdownSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DropdownSettings")
            .field("multiple", &self.multiple)
            .field("on_change", &self.on_change.is_some())
            .finish()
    }
}

impl DropdownSettings {
    #[must_use]
    pub fn with_multiple(mut self, multiple: bool) -> Self {
        self.multiple = Some(multiple);
        self
    }

    #[must_use]
    pub fn with_on_change(mut self, callback: impl Fn(&TypedValue) + 'static) -> Self {
        self.on_change = Some(Rc::new(callback));
        self
    }
}

/// Whether the dropdown on `node` is a multi-select.
#[must_use]
pub fn detect_multiple(dom: &dyn Dom, node: NodeId) -> bool {
    let is_multi_select =
        |n: NodeId| dom.tag(n).as_deref() == Some("select") && dom.attr(n, "multiple").is_some();
    dom.has_class(node, "multiple")
        || is_multi_select(node)
        || find_descendant(dom, node, is_multi_select).is_some()
}

fn split_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

struct DropdownSync {
    native: Rc<dyn NativeWidget>,
    multiple: bool,
}

impl DropdownSync {
    fn normalize(&self, value: TypedValue) -> Option<TypedValue> {
        match (self.multiple, value) {
            (true, TypedValue::List(items)) => Some(TypedValue::List(items)),
            (true, TypedValue::Text(text)) => Some(TypedValue::List(split_list(&text))),
            (true, TypedValue::Undefined) => Some(TypedValue::List(Vec::new())),
            (false, TypedValue::Text(text)) => Some(TypedValue::Text(text)),
            (false, TypedValue::Undefined) => Some(TypedValue::Text(String::new())),
            (false, TypedValue::List(mut items)) if items.len() <= 1 => {
                Some(TypedValue::Text(items.pop().unwrap_or_default()))
            }
            _ => None,
        }
    }
}

impl WidgetSync for DropdownSync {
    fn read(&self) -> TypedValue {
        let raw = self.native.invoke(Command::GetValue);
        self.normalize(raw).unwrap_or(TypedValue::Undefined)
    }

    fn write(&self, value: &TypedValue) -> Result<(), FormatError> {
        let command = match (self.multiple, value) {
            (true, TypedValue::List(items)) if items.is_empty() => Command::Clear,
            (true, TypedValue::List(items)) => Command::SetExactly(items.clone()),
            (false, TypedValue::Text(text)) if text.is_empty() => Command::Clear,
            (false, TypedValue::Text(text)) => Command::SetSelected(vec![text.clone()]),
            (_, TypedValue::Undefined) => Command::Clear,
            (true, other) => return Err(mismatch(WidgetKind::Dropdown, "list", other)),
            (false, other) => return Err(mismatch(WidgetKind::Dropdown, "text", other)),
        };
        self.native.invoke(command);
        Ok(())
    }

    fn holds(&self, value: &TypedValue) -> bool {
        let current = self.read();
        current == *value || (value.is_undefined() && current.is_empty())
    }

    fn decode(&self, native: &TypedValue) -> Option<TypedValue> {
        self.normalize(native.clone())
    }
}

/// Bind `store` to the dropdown on `node`.
pub fn attach(
    host: &Host,
    node: NodeId,
    store: Observable<TypedValue>,
    settings: DropdownSettings,
) -> Result<Attachment, BindError> {
    let native = host.native(node, WidgetKind::Dropdown)?;
    let dom = host.dom();
    let multiple = settings.multiple.unwrap_or_else(|| detect_multiple(dom, node));
    let field = inner_input(dom, node).unwrap_or(node);
    attach_with(
        host,
        store,
        AttachSpec {
            kind: WidgetKind::Dropdown,
            node,
            field,
            sync: Box::new(DropdownSync {
                native: Rc::clone(&native),
                multiple,
            }),
            native: Some(native),
            events: &[WidgetEvent::Change],
            dom_event: None,
            on_change: settings.on_change,
            label: Some(LabelAction::Show),
            owned_nodes: Vec::new(),
            relocates: false,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use wirebind_core::MemoryDom;

    #[test]
    fn multiple_from_class_or_select() {
        let dom = MemoryDom::new();
        let a = dom.append_element(dom.root(), "div", &[("class", "ui multiple dropdown")]);
        let b = dom.append_element(dom.root(), "div", &[("class", "ui dropdown")]);
        dom.append_element(b, "select", &[("multiple", "")]);
        let c = dom.append_element(dom.root(), "div", &[("class", "ui dropdown")]);
        dom.append_element(c, "input", &[("type", "hidden")]);
        assert!(detect_multiple(&dom, a));
        assert!(detect_multiple(&dom, b));
        assert!(!detect_multiple(&dom, c));
    }

    #[test]
    fn list_text_splits_on_commas() {
        assert_eq!(split_list("a, b,,c"), vec!["a", "b", "c"]);
        assert!(split_list("").is_empty());
    }
}
