use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use wirebind_core::dom::{Dom, ancestors, find_descendant, is_input_like, non_empty_attr};
use wirebind_core::{ListenerId, NodeId, TypedValue};

use super::CommandLog;
use crate::adapter::dropdown::detect_multiple;
use crate::native::{Command, NativeHandler, NativeWidget, WidgetEvent, WidgetKind};

#[derive(Debug)]
struct WidgetState {
    value: TypedValue,
    active: bool,
    relocated: bool,
}

/// One headless calendar, dropdown, modal, slider or checkbox.
pub struct HeadlessWidget {
    dom: Rc<dyn Dom>,
    node: NodeId,
    kind: WidgetKind,
    multiple: bool,
    log: CommandLog,
    state: RefCell<WidgetState>,
    listeners: RefCell<Vec<(ListenerId, WidgetEvent, NativeHandler)>>,
    next_listener: Cell<u64>,
}

impl fmt::Debug for HeadlessWidget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeadlessWidget")
            .field("node", &self.node)
            .field("kind", &self.kind)
            .field("state", &self.state.borrow())
            .field("listeners", &self.listeners.borrow().len())
            .finish()
    }
}

impl HeadlessWidget {
    pub(crate) fn new(dom: Rc<dyn Dom>, node: NodeId, kind: WidgetKind, log: CommandLog) -> Self {
        let multiple = kind == WidgetKind::Dropdown && detect_multiple(dom.as_ref(), node);
        let value = seed(dom.as_ref(), node, kind, multiple);
        Self {
            dom,
            node,
            kind,
            multiple,
            log,
            state: RefCell::new(WidgetState {
                value,
                active: false,
                relocated: false,
            }),
            listeners: RefCell::new(Vec::new()),
            next_listener: Cell::new(1),
        }
    }

    #[must_use]
    pub fn kind(&self) -> WidgetKind {
        self.kind
    }

    /// The widget's own value.
    #[must_use]
    pub fn value(&self) -> TypedValue {
        self.state.borrow().value.clone()
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state.borrow().active
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Apply a change as if the user made it. Not recorded in the log.
    pub fn user_change(&self, value: TypedValue) {
        match (self.kind, value) {
            (WidgetKind::Modal, TypedValue::Bool(true)) => self.show(),
            (WidgetKind::Modal, _) => self.hide(),
            (_, value) => self.set(value),
        }
    }

    fn set(&self, value: TypedValue) {
        self.state.borrow_mut().value = value.clone();
        self.mirror(&value);
        self.fire(WidgetEvent::Change, &value);
    }

    /// Copy the value into the inner form control.
    fn mirror(&self, value: &TypedValue) {
        if matches!(self.kind, WidgetKind::Slider | WidgetKind::Modal) {
            return;
        }
        let dom = self.dom.as_ref();
        let Some(input) = find_descendant(dom, self.node, |n| is_input_like(dom, n)) else {
            return;
        };
        match value {
            TypedValue::Bool(checked) => dom.set_checked(input, *checked),
            other => dom.set_value(input, &other.to_input_text()),
        }
    }

    fn show(&self) {
        let relocate = {
            let mut state = self.state.borrow_mut();
            state.active = true;
            self.kind == WidgetKind::Modal && !std::mem::replace(&mut state.relocated, true)
        };
        if relocate {
            let dom = self.dom.as_ref();
            if let Some(top) = ancestors(dom, self.node).last() {
                let dimmer = dom.create_element("div");
                dom.set_attr(dimmer, "class", "ui dimmer modals");
                dom.append_child(top, dimmer);
                dom.append_child(dimmer, self.node);
            }
        }
        if self.kind == WidgetKind::Modal {
            self.fire(WidgetEvent::Shown, &TypedValue::Bool(true));
        }
    }

    fn hide(&self) {
        self.state.borrow_mut().active = false;
        if self.kind == WidgetKind::Modal {
            self.fire(WidgetEvent::Hidden, &TypedValue::Bool(false));
        }
    }

    fn empty_value(&self) -> TypedValue {
        match self.kind {
            WidgetKind::Dropdown if self.multiple => TypedValue::List(Vec::new()),
            WidgetKind::Dropdown => TypedValue::Text(String::new()),
            WidgetKind::Checkbox => TypedValue::Bool(false),
            _ => TypedValue::Undefined,
        }
    }

    fn fire(&self, event: WidgetEvent, payload: &TypedValue) {
        let handlers: Vec<NativeHandler> = self
            .listeners
            .borrow()
            .iter()
            .filter(|(_, e, _)| *e == event)
            .map(|(_, _, h)| Rc::clone(h))
            .collect();
        for handler in handlers {
            handler(payload);
        }
    }
}

fn seed(dom: &dyn Dom, node: NodeId, kind: WidgetKind, multiple: bool) -> TypedValue {
    let input = find_descendant(dom, node, |n| is_input_like(dom, n));
    match kind {
        WidgetKind::Dropdown => {
            let text = input.map(|i| dom.value(i)).unwrap_or_default();
            if multiple {
                TypedValue::List(
                    text.split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_owned)
                        .collect(),
                )
            } else {
                TypedValue::Text(text)
            }
        }
        WidgetKind::Checkbox => TypedValue::Bool(input.is_some_and(|i| dom.checked(i))),
        WidgetKind::Slider => TypedValue::Number(
            non_empty_attr(dom, node, "data-value")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(0.0),
        ),
        _ => TypedValue::Undefined,
    }
}

impl NativeWidget for HeadlessWidget {
    fn invoke(&self, command: Command) -> TypedValue {
        self.log.record(self.node, &command);
        match command {
            Command::GetValue => self.value(),
            Command::SetValue(value) => {
                self.set(value);
                TypedValue::Undefined
            }
            Command::SetExactly(items) => {
                self.set(TypedValue::List(items));
                TypedValue::Undefined
            }
            Command::SetSelected(items) => {
                let next = match self.value() {
                    TypedValue::List(mut current) if self.multiple => {
                        for item in items {
                            if !current.contains(&item) {
                                current.push(item);
                            }
                        }
                        TypedValue::List(current)
                    }
                    _ => TypedValue::Text(items.last().cloned().unwrap_or_default()),
                };
                self.set(next);
                TypedValue::Undefined
            }
            Command::Clear => {
                self.set(self.empty_value());
                TypedValue::Undefined
            }
            Command::GetDate => match self.value() {
                value @ TypedValue::Date(_) => value,
                _ => TypedValue::Undefined,
            },
            Command::SetDate(date) => {
                self.set(date.into());
                TypedValue::Undefined
            }
            Command::Show => {
                self.show();
                TypedValue::Undefined
            }
            Command::Hide => {
                self.hide();
                TypedValue::Undefined
            }
            Command::IsActive => TypedValue::Bool(self.is_active()),
            Command::IsChecked => TypedValue::Bool(self.value().as_bool().unwrap_or(false)),
            Command::Check => {
                self.set(TypedValue::Bool(true));
                TypedValue::Undefined
            }
            Command::Uncheck => {
                self.set(TypedValue::Bool(false));
                TypedValue::Undefined
            }
            _ => TypedValue::Undefined,
        }
    }

    fn listen(&self, event: WidgetEvent, handler: NativeHandler) -> ListenerId {
        let id = ListenerId(self.next_listener.get());
        self.next_listener.set(id.0 + 1);
        self.listeners.borrow_mut().push((id, event, handler));
        id
    }

    fn unlisten(&self, listener: ListenerId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(id, _, _)| *id != listener);
        listeners.len() != before
    }
}
