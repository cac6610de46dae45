#![forbid(unsafe_code)]

//! Widget bindings for wirebind.
//!
//! Binds reactive stores to imperative widgets and forms:
//!
//! - [`adapter`]: one `attach` per widget kind, returning an [`Attachment`]
//!   whose [`DataController`] keeps store and widget in sync.
//! - [`validation`]: rule vocabulary, [`FormController`] and
//!   [`FieldController`].
//! - [`headless`]: a widget library and form engine that run against any
//!   [`Dom`](wirebind_core::Dom), for tests and server-side hosts.
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//! use wirebind_core::{MemoryDom, TypedValue};
//! use wirebind_runtime::Observable;
//! use wirebind_widgets::headless::HeadlessWidgets;
//! use wirebind_widgets::{Host, WidgetKind, adapter::checkbox};
//!
//! let dom = Rc::new(MemoryDom::new());
//! let node = dom.append_element(dom.root(), "div", &[("class", "ui checkbox")]);
//! dom.append_element(node, "input", &[("type", "checkbox"), ("name", "terms")]);
//!
//! let widgets = Rc::new(HeadlessWidgets::new(dom.clone()));
//! widgets.init(node, WidgetKind::Checkbox);
//! let host = Host::new(dom.clone(), widgets.clone());
//!
//! let store = Observable::new(TypedValue::Bool(true));
//! let attachment = checkbox::attach(&host, node, store.clone(), Default::default()).unwrap();
//! assert_eq!(widgets.widget(node, WidgetKind::Checkbox).unwrap().value(), TypedValue::Bool(true));
//!
//! widgets.user_change(node, WidgetKind::Checkbox, TypedValue::Bool(false));
//! assert_eq!(store.get(), TypedValue::Bool(false));
//! attachment.destroy();
//! ```

pub mod adapter;
pub mod controller;
pub mod error;
pub mod field_key;
pub mod headless;
pub mod host;
pub mod native;
pub mod registry;
pub mod validation;

pub use adapter::Attachment;
pub use adapter::calendar::{CalendarMode, CalendarSettings};
pub use adapter::checkbox::CheckboxSettings;
pub use adapter::dropdown::DropdownSettings;
pub use adapter::input::{InputEvent, InputSettings};
pub use adapter::modal::ModalSettings;
pub use adapter::slider::SliderSettings;
pub use controller::{ControllerState, DataController, WidgetSync};
pub use error::BindError;
pub use field_key::{FIELD_KEY_ATTR, ensure_field_key};
pub use host::Host;
pub use native::{Command, NativeHandler, NativeWidget, WidgetEvent, WidgetKind, WidgetLibrary};
pub use registry::Registry;
pub use validation::{
    FieldController, FormAttachment, FormController, FormSettings, Rule, RuleDefinition,
};
