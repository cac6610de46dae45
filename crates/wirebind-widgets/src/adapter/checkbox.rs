//! Checkbox and toggle adapter. The store holds a [`TypedValue::Bool`].

use std::fmt;
use std::rc::Rc;

use wirebind_core::{NodeId, TypedValue};
use wirebind_i18n::FormatError;
use wirebind_runtime::Observable;

use super::{AttachSpec, Attachment, LabelAction, attach_with, inner_input};
use crate::controller::{WidgetSync, mismatch};
use crate::error::BindError;
use crate::host::Host;
use crate::native::{Command, NativeHandler, NativeWidget, WidgetEvent, WidgetKind};

#[derive(Clone, Default)]
pub struct CheckboxSettings {
    pub on_change: Option<NativeHandler>,
}

impl fmt::Debug for CheckboxSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckboxSettings")
            .field("on_change", &self.on_change.is_some())
            .finish()
    }
}

impl CheckboxSettings {
    #[must_use]
    pub fn with_on_change(mut self, callback: impl Fn(&TypedValue) + 'static) -> Self {
        self.on_change = Some(Rc::new(callback));
        self
    }
}

struct CheckboxSync {
    native: Rc<dyn NativeWidget>,
}

impl WidgetSync for CheckboxSync {
    fn read(&self) -> TypedValue {
        TypedValue::Bool(self.native.invoke(Command::IsChecked).as_bool().unwrap_or(false))
    }

    fn write(&self, value: &TypedValue) -> Result<(), FormatError> {
        let command = match value {
            TypedValue::Bool(true) => Command::Check,
            TypedValue::Bool(false) => Command::Uncheck,
            TypedValue::Undefined => return Ok(()),
            other => return Err(mismatch(WidgetKind::Checkbox, "bool", other)),
        };
        self.native.invoke(command);
        Ok(())
    }

    fn holds(&self, value: &TypedValue) -> bool {
        value.is_undefined() || self.read() == *value
    }

    fn decode(&self, native: &TypedValue) -> Option<TypedValue> {
        match native {
            TypedValue::Bool(_) => Some(native.clone()),
            TypedValue::Text(text) => match text.as_str() {
                "true" | "on" => Some(TypedValue::Bool(true)),
                "false" | "off" | "" => Some(TypedValue::Bool(false)),
                _ => None,
            },
            _ => None,
        }
    }
}

/// Bind `store` to the checkbox on `node`.
pub fn attach(
    host: &Host,
    node: NodeId,
    store: Observable<TypedValue>,
    settings: CheckboxSettings,
) -> Result<Attachment, BindError> {
    let native = host.native(node, WidgetKind::Checkbox)?;
    let field = inner_input(host.dom(), node).unwrap_or(node);
    attach_with(
        host,
        store,
        AttachSpec {
            kind: WidgetKind::Checkbox,
            node,
            field,
            sync: Box::new(CheckboxSync {
                native: Rc::clone(&native),
            }),
            native: Some(native),
            events: &[WidgetEvent::Change],
            dom_event: None,
            on_change: settings.on_change,
            label: Some(LabelAction::Toggle),
            owned_nodes: Vec::new(),
            relocates: false,
        },
    )
}
