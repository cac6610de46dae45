use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use wirebind_core::dom::{Dom, closest, find_descendant, is_input_like};
use wirebind_core::{ListenerId, NodeId, TypedValue};

use super::CommandLog;
use crate::field_key::FIELD_KEY_ATTR;
use crate::native::{Command, NativeHandler, NativeWidget, WidgetEvent};
use crate::validation::{Rule, evaluate, prompt_for};

/// Headless form validation engine.
///
/// Field values are read from the DOM on every check, so the engine always
/// sees what the inputs hold right now. Failing fields get the `error` class
/// on their closest `.field` wrapper.
pub struct HeadlessForm {
    dom: Rc<dyn Dom>,
    node: NodeId,
    log: CommandLog,
    rules: RefCell<BTreeMap<String, Vec<Rule>>>,
    errors: RefCell<BTreeMap<String, Vec<String>>>,
    validations: Cell<u64>,
}

impl fmt::Debug for HeadlessForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeadlessForm")
            .field("node", &self.node)
            .field("rules", &self.rules.borrow())
            .field("errors", &self.errors.borrow())
            .finish()
    }
}

impl HeadlessForm {
    pub(crate) fn new(dom: Rc<dyn Dom>, node: NodeId, log: CommandLog) -> Self {
        Self {
            dom,
            node,
            log,
            rules: RefCell::new(BTreeMap::new()),
            errors: RefCell::new(BTreeMap::new()),
            validations: Cell::new(0),
        }
    }

    /// Rules the engine currently enforces for `key`.
    #[must_use]
    pub fn rules_for(&self, key: &str) -> Vec<Rule> {
        self.rules.borrow().get(key).cloned().unwrap_or_default()
    }

    /// Fields with at least one rule.
    #[must_use]
    pub fn fields(&self) -> Vec<String> {
        self.rules.borrow().keys().cloned().collect()
    }

    /// Full-form validations run.
    #[must_use]
    pub fn validations(&self) -> u64 {
        self.validations.get()
    }

    fn input_for(&self, key: &str) -> Option<NodeId> {
        let dom = self.dom.as_ref();
        find_descendant(dom, self.node, |n| {
            is_input_like(dom, n)
                && ["id", "name", FIELD_KEY_ATTR]
                    .iter()
                    .any(|attr| dom.attr(n, attr).as_deref() == Some(key))
        })
    }

    /// Current value of field `key` as the engine sees it.
    #[must_use]
    pub fn field_value(&self, key: &str) -> TypedValue {
        let dom = self.dom.as_ref();
        match self.input_for(key) {
            Some(input) if dom.attr(input, "type").as_deref() == Some("checkbox") => {
                TypedValue::Bool(dom.checked(input))
            }
            Some(input) => TypedValue::Text(dom.value(input)),
            None => TypedValue::Undefined,
        }
    }

    /// Failure prompts for `key` without touching decorations.
    fn check(&self, key: &str) -> Vec<String> {
        let value = self.field_value(key);
        let lookup = |other: &str| self.field_value(other);
        self.rules_for(key)
            .iter()
            .filter(|rule| !evaluate(rule, &value, &lookup).passed())
            .map(|rule| prompt_for(rule, key, &value))
            .collect()
    }

    fn validate_key(&self, key: &str) -> bool {
        let failures = self.check(key);
        let ok = failures.is_empty();
        self.decorate(key, !ok);
        if ok {
            self.errors.borrow_mut().remove(key);
        } else {
            self.errors.borrow_mut().insert(key.to_owned(), failures);
        }
        ok
    }

    fn decorate(&self, key: &str, failed: bool) {
        let dom = self.dom.as_ref();
        let Some(input) = self.input_for(key) else {
            return;
        };
        let Some(field) = closest(dom, input, |n| dom.has_class(n, "field")) else {
            return;
        };
        if failed {
            dom.add_class(field, "error");
        } else {
            dom.remove_class(field, "error");
        }
    }

    fn clear_decorations(&self) {
        let keys: Vec<String> = self.errors.borrow().keys().cloned().collect();
        for key in keys {
            self.decorate(&key, false);
        }
        self.errors.borrow_mut().clear();
        self.dom.remove_class(self.node, "error");
    }
}

impl NativeWidget for HeadlessForm {
    fn invoke(&self, command: Command) -> TypedValue {
        self.log.record(self.node, &command);
        match command {
            Command::AddRule { field, rules } => {
                self.rules
                    .borrow_mut()
                    .entry(field)
                    .or_default()
                    .extend(rules.rules().iter().cloned());
                TypedValue::Undefined
            }
            Command::RemoveField(field) => {
                self.rules.borrow_mut().remove(&field);
                self.decorate(&field, false);
                self.errors.borrow_mut().remove(&field);
                TypedValue::Undefined
            }
            Command::ValidateForm => {
                self.validations.set(self.validations.get() + 1);
                let keys = self.fields();
                let valid = keys
                    .iter()
                    .map(|key| self.validate_key(key))
                    .fold(true, |acc, ok| acc && ok);
                if valid {
                    self.dom.remove_class(self.node, "error");
                } else {
                    self.dom.add_class(self.node, "error");
                }
                TypedValue::Bool(valid)
            }
            Command::ValidateField(field) => TypedValue::Bool(self.validate_key(&field)),
            Command::IsValid => {
                TypedValue::Bool(self.fields().iter().all(|key| self.check(key).is_empty()))
            }
            Command::GetErrors => {
                TypedValue::List(self.errors.borrow().values().flatten().cloned().collect())
            }
            Command::GetFieldValue(field) => self.field_value(&field),
            Command::ClearDecorations => {
                self.clear_decorations();
                TypedValue::Undefined
            }
            _ => TypedValue::Undefined,
        }
    }

    fn listen(&self, _event: WidgetEvent, _handler: NativeHandler) -> ListenerId {
        ListenerId(0)
    }

    fn unlisten(&self, _listener: ListenerId) -> bool {
        false
    }
}
