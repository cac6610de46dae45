#![forbid(unsafe_code)]

//! wirebind: two-way binding between reactive stores and imperative UI
//! widgets, with typed formatters and form validation.
//!
//! This crate re-exports the workspace crates under short names and offers
//! a [`prelude`] for the common case.
//!
//! ```
//! use std::rc::Rc;
//! use wirebind::prelude::*;
//!
//! let dom = Rc::new(MemoryDom::new());
//! let node = dom.append_element(dom.root(), "div", &[("class", "ui input")]);
//! let field = dom.append_element(node, "input", &[("name", "price")]);
//!
//! let widgets = Rc::new(HeadlessWidgets::new(dom.clone()));
//! let host = Host::new(dom.clone(), widgets).with_defaults(DefaultsContext::with_builtin("en"));
//!
//! let price = Observable::new(TypedValue::Number(1234.5));
//! let settings = InputSettings::default().with_formatter(FormatterSettings::new("money"));
//! let _binding = input::attach(&host, node, price.clone(), settings).unwrap();
//! assert_eq!(dom.value(field), "$1 234.50");
//! ```

pub use wirebind_core as core;
pub use wirebind_i18n as i18n;
pub use wirebind_runtime as runtime;
pub use wirebind_widgets as widgets;

pub mod prelude {
    pub use wirebind_core::{Dom, MemoryDom, NodeId, TypedValue};
    pub use wirebind_i18n::{
        ConfigError, Format, FormatError, Formatter, FormatterSettings, LocaleTable,
    };
    pub use wirebind_runtime::{DefaultsContext, Observable, Scheduler, StateView, Subscription};
    pub use wirebind_widgets::adapter::{calendar, checkbox, dropdown, input, modal, slider};
    pub use wirebind_widgets::headless::HeadlessWidgets;
    pub use wirebind_widgets::validation::rules;
    pub use wirebind_widgets::{
        Attachment, BindError, CalendarMode, CalendarSettings, CheckboxSettings, DropdownSettings,
        FieldController, FormController, FormSettings, Host, InputEvent, InputSettings,
        ModalSettings, Rule, RuleDefinition, SliderSettings, WidgetKind,
    };
}
