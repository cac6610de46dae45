//! Bidirectional sync between a store and one widget.
//!
//! A [`DataController`] sits between an [`Observable`] store and a native
//! widget. Store changes are pushed to the widget, widget change events are
//! pulled into the store, and both directions are equality-gated: native
//! widgets re-fire their change event on every `set`, so an ungated push
//! would bounce straight back as a pull, and an ungated pull would notify
//! every store subscriber again.
//!
//! Per-kind behavior (what "read", "write" and "decode" mean for a calendar
//! versus a dropdown) lives behind [`WidgetSync`].
//!
//! # State Machine
//!
//! ```text
//! attach ──► Attached ──(push / pull)──► Attached
//!                │
//!                └──(destroy or replacement)──► Destroyed
//! ```
//!
//! # Invariants
//!
//! 1. **Equality-gated push**: the native `set` runs only when the widget
//!    does not already hold the pushed value ([`WidgetSync::holds`]), so
//!    pushing the same value twice writes at most once.
//! 2. **Equality-gated pull**: the store is written only when the decoded
//!    widget value differs from the stored one.
//! 3. **No nested push**: a push triggered while a push is running is
//!    skipped; the pull it caused already brought the store in line.
//! 4. **Unparseable input never overrides**: a widget value that cannot be
//!    decoded leaves the store untouched.
//! 5. **Teardown is complete and single**: detaching releases the store
//!    subscription, every native and DOM listener and every owned node, once.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Wrong store variant | Binding wiring bug | `push_to_widget` returns `BindError::Format` |
//! | Unparseable widget text | User input | Store keeps last value, trace event |
//! | Sync after teardown | Late event | Ignored |

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use tracing::{debug, debug_span, trace};
use wirebind_core::{ListenerId, NodeId, TypedValue};
use wirebind_i18n::FormatError;
use wirebind_runtime::{Observable, Subscription};

use crate::error::BindError;
use crate::field_key::existing_key;
use crate::host::Host;
use crate::native::{NativeHandler, NativeWidget, WidgetKind};

/// Per-kind access to a widget's value.
pub trait WidgetSync {
    /// The widget's current value.
    fn read(&self) -> TypedValue;

    /// Make the widget show `value`.
    fn write(&self, value: &TypedValue) -> Result<(), FormatError>;

    /// Whether the widget already shows `value`, so writing it would not
    /// change anything the user sees.
    fn holds(&self, value: &TypedValue) -> bool {
        self.read() == *value
    }

    /// Turn a native event payload into a store value. `None` means the
    /// payload could not be understood and the store must keep its value.
    fn decode(&self, native: &TypedValue) -> Option<TypedValue>;

    /// Render a value for log lines.
    fn describe(&self, value: &TypedValue) -> String {
        value.to_string()
    }

    /// Called after the store and widget agree on `value`.
    fn settled(&self, _value: &TypedValue) {}
}

/// Type-mismatch error for a widget kind.
pub(crate) fn mismatch(
    kind: WidgetKind,
    expected: &'static str,
    found: &TypedValue,
) -> FormatError {
    FormatError::TypeMismatch {
        formatter: kind.as_str(),
        expected,
        found: found.variant_name(),
    }
}

/// Lifecycle of a [`DataController`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Attached,
    Destroyed,
}

/// Everything a controller must release on teardown.
#[derive(Default)]
pub(crate) struct Teardown {
    /// The store subscription driving pushes.
    pub(crate) subscription: Option<Subscription>,
    pub(crate) native: Vec<(Rc<dyn NativeWidget>, ListenerId)>,
    pub(crate) dom: Vec<(NodeId, ListenerId)>,
    /// Nodes the adapter created.
    pub(crate) owned_nodes: Vec<NodeId>,
    /// Node the widget moved elsewhere in the tree; removed on destroy only.
    pub(crate) relocated: Option<NodeId>,
}

/// Sync controller for one attached widget.
pub struct DataController {
    id: String,
    kind: WidgetKind,
    node: NodeId,
    field: NodeId,
    store: Observable<TypedValue>,
    sync: Box<dyn WidgetSync>,
    host: Host,
    on_change: Option<NativeHandler>,
    pushing: Cell<bool>,
    state: Cell<ControllerState>,
    pub(crate) teardown: RefCell<Teardown>,
}

impl fmt::Debug for DataController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataController")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("node", &self.node)
            .field("value", &self.store.get())
            .field("state", &self.state.get())
            .finish_non_exhaustive()
    }
}

impl DataController {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        id: String,
        host: Host,
        kind: WidgetKind,
        node: NodeId,
        field: NodeId,
        store: Observable<TypedValue>,
        sync: Box<dyn WidgetSync>,
        on_change: Option<NativeHandler>,
    ) -> Self {
        Self {
            id,
            kind,
            node,
            field,
            store,
            sync,
            host,
            on_change,
            pushing: Cell::new(false),
            state: Cell::new(ControllerState::Attached),
            teardown: RefCell::new(Teardown::default()),
        }
    }

    /// Debug correlation id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn kind(&self) -> WidgetKind {
        self.kind
    }

    /// The widget node.
    #[must_use]
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// The form control carrying the field's value and key.
    #[must_use]
    pub fn field(&self) -> NodeId {
        self.field
    }

    #[must_use]
    pub fn store(&self) -> &Observable<TypedValue> {
        &self.store
    }

    /// Current store value.
    #[must_use]
    pub fn value(&self) -> TypedValue {
        self.store.get()
    }

    #[must_use]
    pub fn state(&self) -> ControllerState {
        self.state.get()
    }

    pub(crate) fn host(&self) -> &Host {
        &self.host
    }

    /// Store → widget. Returns whether the native `set` ran.
    pub fn push_to_widget(&self, value: &TypedValue) -> Result<bool, BindError> {
        if self.state.get() == ControllerState::Destroyed {
            return Ok(false);
        }
        if self.pushing.get() {
            trace!(id = %self.id, kind = %self.kind, "nested push skipped");
            return Ok(false);
        }
        if self.sync.holds(value) {
            trace!(
                id = %self.id,
                kind = %self.kind,
                value = %self.sync.describe(value),
                "push skipped: widget already holds value"
            );
            return Ok(false);
        }
        self.pushing.set(true);
        let written = self.sync.write(value);
        self.pushing.set(false);
        written?;
        self.sync.settled(value);
        trace!(id = %self.id, kind = %self.kind, value = %self.sync.describe(value), "pushed");
        self.revalidate();
        Ok(true)
    }

    /// Widget → store for a user change. Returns whether the store changed.
    pub fn pull_from_widget(&self, value: TypedValue) -> bool {
        self.pull(value, true)
    }

    /// Handle a native event payload, then chain to the caller's callback.
    pub fn on_native(&self, native: &TypedValue) -> bool {
        let changed = match self.sync.decode(native) {
            Some(value) => self.pull_from_widget(value),
            None => {
                trace!(
                    id = %self.id,
                    kind = %self.kind,
                    payload = %native,
                    "unparseable widget value kept out of store"
                );
                false
            }
        };
        if let Some(callback) = &self.on_change {
            callback(native);
        }
        changed
    }

    /// Pull the widget's current value without marking the form dirty.
    pub(crate) fn sync_from_widget(&self) -> bool {
        let current = self.sync.read();
        self.pull(current, false)
    }

    fn pull(&self, value: TypedValue, from_user: bool) -> bool {
        if self.state.get() == ControllerState::Destroyed {
            return false;
        }
        if self.store.with(|current| *current == value) {
            trace!(
                id = %self.id,
                kind = %self.kind,
                value = %self.sync.describe(&value),
                "pull skipped: store already holds value"
            );
            return false;
        }
        trace!(id = %self.id, kind = %self.kind, value = %self.sync.describe(&value), "pulled");
        self.sync.settled(&value);
        self.store.set(value);
        if from_user {
            if let Some(form) = self.host.form_controller_for(self.node) {
                form.mark_dirty();
            }
        }
        self.revalidate();
        true
    }

    /// Ask the enclosing form to revalidate this field, if it has rules.
    fn revalidate(&self) {
        let Some(form) = self.host.form_controller_for(self.node) else {
            return;
        };
        let Some(key) = existing_key(self.host.dom(), self.field) else {
            return;
        };
        if form.has_rule(&key) {
            form.revalidate_field(&key);
        }
    }

    /// Release everything. `remove_relocated` is false when a new controller
    /// takes over the same node.
    pub(crate) fn detach(&self, remove_relocated: bool) {
        if self.state.replace(ControllerState::Destroyed) == ControllerState::Destroyed {
            return;
        }
        let _span =
            debug_span!("detach", id = %self.id, kind = %self.kind, node = %self.node).entered();
        let teardown = std::mem::take(&mut *self.teardown.borrow_mut());
        let Teardown {
            subscription,
            native,
            dom: dom_listeners,
            owned_nodes,
            relocated,
        } = teardown;
        drop(subscription);
        for (widget, listener) in native {
            widget.unlisten(listener);
        }
        let dom = self.host.dom();
        for (node, listener) in dom_listeners {
            dom.off(node, listener);
        }
        for node in owned_nodes {
            dom.remove(node);
        }
        if remove_relocated {
            if let Some(node) = relocated {
                dom.remove(node);
            }
        }
        self.host.registry().remove_data(self.node, self);
        debug!("detached");
    }
}
