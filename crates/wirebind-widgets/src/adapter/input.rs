//! Plain input adapter.
//!
//! Binds an `<input>`, `<select>` or `<textarea>` through a [`Formatter`].
//! The formatter is built from the current locale defaults at attach time,
//! so a bad formatter setting fails the attach.

use std::fmt;
use std::rc::Rc;

use wirebind_core::dom::Dom;
use wirebind_core::{NodeId, TypedValue};
use wirebind_i18n::{Format, FormatError, Formatter, FormatterSettings};
use wirebind_runtime::Observable;

use super::{AttachSpec, Attachment, LabelAction, attach_with, inner_input};
use crate::controller::WidgetSync;
use crate::error::BindError;
use crate::host::Host;
use crate::native::{NativeHandler, WidgetKind};

/// DOM event that commits user edits to the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum InputEvent {
    /// On blur after an edit.
    #[default]
    Change,
    /// On every keystroke.
    Input,
}

impl InputEvent {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Change => "change",
            Self::Input => "input",
        }
    }
}

#[derive(Clone)]
pub struct InputSettings {
    pub formatter: FormatterSettings,
    pub event: InputEvent,
    pub on_change: Option<NativeHandler>,
}

impl Default for InputSettings {
    fn default() -> Self {
        Self {
            formatter: FormatterSettings::new("text"),
            event: InputEvent::default(),
            on_change: None,
        }
    }
}

impl fmt::Debug for InputSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputSettings")
            .field("formatter", &self.formatter)
            .field("event", &self.event)
            .field("on_change", &self.on_change.is_some())
            .finish()
    }
}

impl InputSettings {
    #[must_use]
    pub fn with_formatter(mut self, formatter: FormatterSettings) -> Self {
        self.formatter = formatter;
        self
    }

    #[must_use]
    pub fn with_event(mut self, event: InputEvent) -> Self {
        self.event = event;
        self
    }

    #[must_use]
    pub fn with_on_change(mut self, callback: impl Fn(&TypedValue) + 'static) -> Self {
        self.on_change = Some(Rc::new(callback));
        self
    }
}

struct InputSync {
    dom: Rc<dyn Dom>,
    input: NodeId,
    formatter: Formatter,
}

impl WidgetSync for InputSync {
    fn read(&self) -> TypedValue {
        self.formatter.parse(&self.dom.value(self.input))
    }

    fn write(&self, value: &TypedValue) -> Result<(), FormatError> {
        let text = self.formatter.format(value)?;
        self.dom.set_value(self.input, &text);
        Ok(())
    }

    /// Formatting rounds and transforms, so the widget also holds any value
    /// that would render as the text already shown.
    fn holds(&self, value: &TypedValue) -> bool {
        let text = self.dom.value(self.input);
        self.formatter.parse(&text) == *value
            || self.formatter.format(value).is_ok_and(|rendered| rendered == text)
    }

    fn decode(&self, native: &TypedValue) -> Option<TypedValue> {
        let text = native.to_input_text();
        let parsed = self.formatter.parse(&text);
        (!parsed.is_undefined() || text.trim().is_empty()).then_some(parsed)
    }

    fn describe(&self, value: &TypedValue) -> String {
        self.formatter.format(value).unwrap_or_else(|_| value.to_string())
    }
}

/// Bind `store` to the input on or inside `node`.
pub fn attach(
    host: &Host,
    node: NodeId,
    store: Observable<TypedValue>,
    settings: InputSettings,
) -> Result<Attachment, BindError> {
    let input = inner_input(host.dom(), node).ok_or(BindError::MissingInput { node })?;
    let formatter = Formatter::from_settings(&settings.formatter, &host.defaults().current())?;
    attach_with(
        host,
        store,
        AttachSpec {
            kind: WidgetKind::Input,
            node,
            field: input,
            sync: Box::new(InputSync {
                dom: host.dom_rc(),
                input,
                formatter,
            }),
            native: None,
            events: &[],
            dom_event: Some(settings.event.as_str()),
            on_change: settings.on_change,
            label: Some(LabelAction::Focus(input)),
            owned_nodes: Vec::new(),
            relocates: false,
        },
    )
}
