//! Modal adapter.
//!
//! The store holds a [`TypedValue::Bool`] visibility flag. The native modal
//! moves its node under a page-level dimmer the first time it is shown, so
//! destroying the attachment removes the node explicitly.

use std::fmt;
use std::rc::Rc;

use wirebind_core::{NodeId, TypedValue};
use wirebind_i18n::FormatError;
use wirebind_runtime::Observable;

use super::{AttachSpec, Attachment, attach_with};
use crate::controller::{WidgetSync, mismatch};
use crate::error::BindError;
use crate::host::Host;
use crate::native::{Command, NativeHandler, NativeWidget, WidgetEvent, WidgetKind};

#[derive(Clone, Default)]
pub struct ModalSettings {
    /// Called on every show and hide.
    pub on_change: Option<NativeHandler>,
}

impl fmt::Debug for ModalSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModalSettings")
            .field("on_change", &self.on_change.is_some())
            .finish()
    }
}

impl ModalSettings {
    #[must_use]
    pub fn with_on_change(mut self, callback: impl Fn(&TypedValue) + 'static) -> Self {
        self.on_change = Some(Rc::new(callback));
        self
    }
}

struct ModalSync {
    native: Rc<dyn NativeWidget>,
}

impl WidgetSync for ModalSync {
    fn read(&self) -> TypedValue {
        TypedValue::Bool(self.native.invoke(Command::IsActive).as_bool().unwrap_or(false))
    }

    fn write(&self, value: &TypedValue) -> Result<(), FormatError> {
        let command = match value {
            TypedValue::Bool(true) => Command::Show,
            TypedValue::Bool(false) | TypedValue::Undefined => Command::Hide,
            other => return Err(mismatch(WidgetKind::Modal, "bool", other)),
        };
        self.native.invoke(command);
        Ok(())
    }

    fn holds(&self, value: &TypedValue) -> bool {
        let shown = self.read();
        shown == *value || (value.is_undefined() && shown.is_empty())
    }

    fn decode(&self, native: &TypedValue) -> Option<TypedValue> {
        native.as_bool().map(TypedValue::Bool)
    }
}

/// Bind `store` to the modal on `node`.
pub fn attach(
    host: &Host,
    node: NodeId,
    store: Observable<TypedValue>,
    settings: ModalSettings,
) -> Result<Attachment, BindError> {
    let native = host.native(node, WidgetKind::Modal)?;
    attach_with(
        host,
        store,
        AttachSpec {
            kind: WidgetKind::Modal,
            node,
            field: node,
            sync: Box::new(ModalSync {
                native: Rc::clone(&native),
            }),
            native: Some(native),
            events: &[WidgetEvent::Shown, WidgetEvent::Hidden],
            dom_event: None,
            on_change: settings.on_change,
            label: None,
            owned_nodes: Vec::new(),
            relocates: true,
        },
    )
}
