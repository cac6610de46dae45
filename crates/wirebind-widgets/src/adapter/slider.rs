//! Slider adapter.
//!
//! The store holds a [`TypedValue::Number`]. A hidden `<input>` owned by the
//! adapter mirrors the value as text so form serialization and validation
//! see the slider like any other field. The shadow input is removed on
//! teardown.

use std::fmt;
use std::rc::Rc;

use wirebind_core::dom::{Dom, non_empty_attr};
use wirebind_core::{NodeId, TypedValue};
use wirebind_i18n::FormatError;
use wirebind_runtime::Observable;

use super::{AttachSpec, Attachment, LabelAction, attach_with};
use crate::controller::{WidgetSync, mismatch};
use crate::error::BindError;
use crate::host::Host;
use crate::native::{Command, NativeHandler, NativeWidget, WidgetEvent, WidgetKind};

#[derive(Clone, Default)]
pub struct SliderSettings {
    /// `name` of the shadow input; the slider's `data-name` when unset.
    pub name: Option<String>,
    pub on_change: Option<NativeHandler>,
}

impl fmt::Debug for SliderSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SliderSettings")
            .field("name", &self.name)
            .field("on_change", &self.on_change.is_some())
            .finish()
    }
}

impl SliderSettings {
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_on_change(mut self, callback: impl Fn(&TypedValue) + 'static) -> Self {
        self.on_change = Some(Rc::new(callback));
        self
    }
}

struct SliderSync {
    native: Rc<dyn NativeWidget>,
    dom: Rc<dyn Dom>,
    shadow: NodeId,
}

impl WidgetSync for SliderSync {
    fn read(&self) -> TypedValue {
        match self.native.invoke(Command::GetValue) {
            value @ TypedValue::Number(_) => value,
            _ => TypedValue::Undefined,
        }
    }

    fn write(&self, value: &TypedValue) -> Result<(), FormatError> {
        match value {
            TypedValue::Number(_) => {
                self.native.invoke(Command::SetValue(value.clone()));
                Ok(())
            }
            TypedValue::Undefined => Ok(()),
            other => Err(mismatch(WidgetKind::Slider, "number", other)),
        }
    }

    fn holds(&self, value: &TypedValue) -> bool {
        value.is_undefined() || self.read() == *value
    }

    fn decode(&self, native: &TypedValue) -> Option<TypedValue> {
        match native {
            TypedValue::Number(_) => Some(native.clone()),
            TypedValue::Text(text) => text.trim().parse::<f64>().ok().map(TypedValue::Number),
            _ => None,
        }
    }

    fn settled(&self, value: &TypedValue) {
        self.dom.set_value(self.shadow, &value.to_input_text());
    }
}

/// Bind `store` to the slider on `node`.
pub fn attach(
    host: &Host,
    node: NodeId,
    store: Observable<TypedValue>,
    settings: SliderSettings,
) -> Result<Attachment, BindError> {
    let native = host.native(node, WidgetKind::Slider)?;
    let dom = host.dom();
    let shadow = dom.create_element("input");
    dom.set_attr(shadow, "type", "hidden");
    if let Some(name) = settings.name.or_else(|| non_empty_attr(dom, node, "data-name")) {
        dom.set_attr(shadow, "name", &name);
    }
    dom.append_child(node, shadow);
    let initial = native.invoke(Command::GetValue);
    dom.set_value(shadow, &initial.to_input_text());

    let attached = attach_with(
        host,
        store,
        AttachSpec {
            kind: WidgetKind::Slider,
            node,
            field: shadow,
            sync: Box::new(SliderSync {
                native: Rc::clone(&native),
                dom: host.dom_rc(),
                shadow,
            }),
            native: Some(native),
            events: &[WidgetEvent::Change],
            dom_event: None,
            on_change: settings.on_change,
            label: Some(LabelAction::Focus(node)),
            owned_nodes: vec![shadow],
            relocates: false,
        },
    );
    if attached.is_err() && dom.contains(shadow) {
        dom.remove(shadow);
    }
    attached
}
