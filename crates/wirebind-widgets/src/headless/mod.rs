//! Headless widget library.
//!
//! A complete [`WidgetLibrary`] over any [`Dom`]: widgets keep their own
//! state, mirror it into their inner `<input>`, and raise change, shown and
//! hidden callbacks the way the browser library does. That includes firing
//! `Change` on a redundant `set`, which is what makes equality gating in the
//! adapters necessary.
//!
//! Every command an adapter sends is appended to a [`CommandLog`], so tests
//! can assert on exactly which native calls a binding made.

mod form;
mod widget;

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use ahash::AHashMap;
use wirebind_core::dom::Dom;
use wirebind_core::{NodeId, TypedValue};

pub use form::HeadlessForm;
pub use widget::HeadlessWidget;

use crate::native::{Command, NativeWidget, WidgetKind, WidgetLibrary};

/// Shared record of commands sent to headless widgets.
#[derive(Clone, Default)]
pub struct CommandLog {
    entries: Rc<RefCell<Vec<(NodeId, Command)>>>,
}

impl fmt::Debug for CommandLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandLog")
            .field("entries", &self.entries.borrow().len())
            .finish()
    }
}

impl CommandLog {
    pub(crate) fn record(&self, node: NodeId, command: &Command) {
        self.entries.borrow_mut().push((node, command.clone()));
    }

    /// Commands sent to `node`, oldest first.
    #[must_use]
    pub fn commands(&self, node: NodeId) -> Vec<Command> {
        self.entries
            .borrow()
            .iter()
            .filter(|(n, _)| *n == node)
            .map(|(_, c)| c.clone())
            .collect()
    }

    /// How many commands named `name` reached `node`.
    #[must_use]
    pub fn count(&self, node: NodeId, name: &str) -> usize {
        self.entries
            .borrow()
            .iter()
            .filter(|(n, c)| *n == node && c.name() == name)
            .count()
    }

    /// How many state-changing commands reached `node`.
    #[must_use]
    pub fn writes(&self, node: NodeId) -> usize {
        self.entries
            .borrow()
            .iter()
            .filter(|(n, c)| *n == node && c.is_write())
            .count()
    }

    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }
}

#[derive(Clone)]
enum Entry {
    Widget(Rc<HeadlessWidget>),
    Form(Rc<HeadlessForm>),
}

impl Entry {
    fn native(&self) -> Rc<dyn NativeWidget> {
        match self {
            Self::Widget(w) => Rc::clone(w) as Rc<dyn NativeWidget>,
            Self::Form(f) => Rc::clone(f) as Rc<dyn NativeWidget>,
        }
    }
}

/// Headless widget library bound to one document.
pub struct HeadlessWidgets {
    dom: Rc<dyn Dom>,
    entries: RefCell<AHashMap<(NodeId, WidgetKind), Entry>>,
    log: CommandLog,
}

impl fmt::Debug for HeadlessWidgets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeadlessWidgets")
            .field("widgets", &self.entries.borrow().len())
            .field("log", &self.log)
            .finish()
    }
}

impl HeadlessWidgets {
    #[must_use]
    pub fn new(dom: Rc<dyn Dom>) -> Self {
        Self {
            dom,
            entries: RefCell::new(AHashMap::new()),
            log: CommandLog::default(),
        }
    }

    /// Bootstrap a widget of `kind` on `node`, seeding it from the markup.
    /// Bootstrapping twice returns the existing widget.
    pub fn init(&self, node: NodeId, kind: WidgetKind) -> Rc<dyn NativeWidget> {
        if let Some(entry) = self.entries.borrow().get(&(node, kind)) {
            return entry.native();
        }
        let entry = match kind {
            WidgetKind::Form => Entry::Form(Rc::new(HeadlessForm::new(
                Rc::clone(&self.dom),
                node,
                self.log.clone(),
            ))),
            _ => Entry::Widget(Rc::new(HeadlessWidget::new(
                Rc::clone(&self.dom),
                node,
                kind,
                self.log.clone(),
            ))),
        };
        let native = entry.native();
        self.entries.borrow_mut().insert((node, kind), entry);
        native
    }

    /// The headless widget of `kind` on `node`.
    #[must_use]
    pub fn widget(&self, node: NodeId, kind: WidgetKind) -> Option<Rc<HeadlessWidget>> {
        match self.entries.borrow().get(&(node, kind)) {
            Some(Entry::Widget(w)) => Some(Rc::clone(w)),
            _ => None,
        }
    }

    /// The headless form engine on `node`.
    #[must_use]
    pub fn form(&self, node: NodeId) -> Option<Rc<HeadlessForm>> {
        match self.entries.borrow().get(&(node, WidgetKind::Form)) {
            Some(Entry::Form(f)) => Some(Rc::clone(f)),
            _ => None,
        }
    }

    /// Simulate the user changing the widget. Returns false when no such
    /// widget was bootstrapped.
    pub fn user_change(&self, node: NodeId, kind: WidgetKind, value: TypedValue) -> bool {
        match self.widget(node, kind) {
            Some(widget) => {
                widget.user_change(value);
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn log(&self) -> &CommandLog {
        &self.log
    }
}

impl WidgetLibrary for HeadlessWidgets {
    fn handle(&self, node: NodeId, kind: WidgetKind) -> Option<Rc<dyn NativeWidget>> {
        if !self.dom.contains(node) {
            return None;
        }
        self.entries.borrow().get(&(node, kind)).map(Entry::native)
    }
}
