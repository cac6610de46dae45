#![forbid(unsafe_code)]

//! Markup fixtures and scenario helpers for wirebind.
//!
//! A [`Page`] bundles an in-memory document, the headless widget library and
//! a [`Host`] with its own scheduler and the built-in `en` defaults, so each
//! test starts from a clean turn queue and a known locale.
//!
//! ```
//! use wirebind_core::dom::Dom;
//! use wirebind_harness::Page;
//!
//! let page = Page::new();
//! let form = page.form();
//! let (field, input) = page.text_field(form, "email");
//! assert_eq!(page.dom().parent(input), Some(field));
//! page.type_into(input, "a@b.c");
//! assert_eq!(page.dom().value(input), "a@b.c");
//! ```

pub mod strategies;

use std::fmt;
use std::rc::Rc;

use tracing::trace;
use wirebind_core::dom::Dom;
use wirebind_core::{MemoryDom, NodeId};
use wirebind_runtime::{DefaultsContext, Scheduler};
use wirebind_widgets::headless::{CommandLog, HeadlessWidgets};
use wirebind_widgets::{Host, WidgetKind};

/// Document, widget library and host for one test.
pub struct Page {
    dom: Rc<MemoryDom>,
    widgets: Rc<HeadlessWidgets>,
    host: Host,
}

impl fmt::Debug for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Page")
            .field("nodes", &self.dom.len())
            .field("widgets", &self.widgets)
            .field("host", &self.host)
            .finish()
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new()
    }
}

impl Page {
    #[must_use]
    pub fn new() -> Self {
        Self::with_locale("en")
    }

    /// Page whose format defaults start from the built-in `locale` table.
    #[must_use]
    pub fn with_locale(locale: &str) -> Self {
        let dom = Rc::new(MemoryDom::new());
        let widgets = Rc::new(HeadlessWidgets::new(dom.clone()));
        let host = Host::new(dom.clone(), widgets.clone())
            .with_scheduler(Scheduler::new())
            .with_defaults(DefaultsContext::with_builtin(locale));
        Self { dom, widgets, host }
    }

    #[must_use]
    pub fn dom(&self) -> &MemoryDom {
        &self.dom
    }

    #[must_use]
    pub fn widgets(&self) -> &HeadlessWidgets {
        &self.widgets
    }

    #[must_use]
    pub fn host(&self) -> &Host {
        &self.host
    }

    #[must_use]
    pub fn log(&self) -> &CommandLog {
        self.widgets.log()
    }

    /// Run every deferred task of the current turn.
    pub fn flush(&self) -> usize {
        self.host.flush()
    }

    // -----------------------------------------------------------------------
    // Markup
    // -----------------------------------------------------------------------

    /// `form.ui.form` under the root, with the form engine bootstrapped.
    pub fn form(&self) -> NodeId {
        let form = self.dom.append_element(self.dom.root(), "form", &[("class", "ui form")]);
        self.widgets.init(form, WidgetKind::Form);
        form
    }

    /// `div.field > label[for=_] + input[name]`. Returns the wrapper and
    /// the input.
    pub fn text_field(&self, parent: NodeId, name: &str) -> (NodeId, NodeId) {
        let field = self.dom.append_element(parent, "div", &[("class", "field")]);
        self.dom.append_element(field, "label", &[("for", "_")]);
        let input = self.dom.append_element(field, "input", &[("type", "text"), ("name", name)]);
        (field, input)
    }

    /// `div.field > label[for=_] + div.ui.<class>#<id> > input`, with the
    /// widget of `kind` bootstrapped on the inner div.
    pub fn widget(
        &self,
        parent: NodeId,
        kind: WidgetKind,
        id: &str,
        input_attrs: &[(&str, &str)],
    ) -> NodeId {
        let field = self.dom.append_element(parent, "div", &[("class", "field")]);
        self.dom.append_element(field, "label", &[("for", "_")]);
        let class = format!("ui {}", kind.as_str());
        let node = self.dom.append_element(field, "div", &[("class", class.as_str()), ("id", id)]);
        self.dom.append_element(node, "input", input_attrs);
        if kind != WidgetKind::Input {
            self.widgets.init(node, kind);
        }
        node
    }

    /// `div.field > label[for=_] + div.ui.multiple.dropdown#<id> >
    /// input[type=hidden]`, preselecting `selected`.
    pub fn multi_dropdown(&self, parent: NodeId, id: &str, selected: &[&str]) -> NodeId {
        let field = self.dom.append_element(parent, "div", &[("class", "field")]);
        self.dom.append_element(field, "label", &[("for", "_")]);
        let node =
            self.dom.append_element(field, "div", &[("class", "ui multiple dropdown"), ("id", id)]);
        let value = selected.join(",");
        self.dom.append_element(
            node,
            "input",
            &[("type", "hidden"), ("name", id), ("value", value.as_str())],
        );
        self.widgets.init(node, WidgetKind::Dropdown);
        node
    }

    /// The sentinel label of the field wrapping `node`.
    #[must_use]
    pub fn label_of(&self, node: NodeId) -> Option<NodeId> {
        let dom: &dyn Dom = self.dom.as_ref();
        let field = wirebind_core::dom::closest(dom, node, |n| dom.has_class(n, "field"))?;
        wirebind_core::dom::find_descendant(dom, field, |n| dom.tag(n).as_deref() == Some("label"))
    }

    // -----------------------------------------------------------------------
    // User actions
    // -----------------------------------------------------------------------

    /// Replace the text of `input` and fire `change`.
    pub fn type_into(&self, input: NodeId, text: &str) -> usize {
        trace!(%input, text, "typing");
        self.dom.set_value(input, text);
        self.dom.dispatch(input, "change")
    }

    /// Click `node`.
    pub fn click(&self, node: NodeId) -> usize {
        self.dom.dispatch(node, "click")
    }

    /// Whether the `.field` wrapper of `input` carries the error class.
    #[must_use]
    pub fn has_error(&self, input: NodeId) -> bool {
        let dom: &dyn Dom = self.dom.as_ref();
        wirebind_core::dom::closest(dom, input, |n| dom.has_class(n, "field"))
            .is_some_and(|field| dom.has_class(field, "error"))
    }
}
