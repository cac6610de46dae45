//! Field controller: owns the rules one field contributes to its form.
//!
//! Registration is deferred one scheduling turn so the widget library can
//! finish wiring the field before rules are added. Markup errors (no input,
//! no form, no form controller) are still reported synchronously.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::{debug, trace};
use wirebind_core::NodeId;

use super::form::FormController;
use super::rules::RuleDefinition;
use crate::adapter::inner_input;
use crate::error::BindError;
use crate::field_key::ensure_field_key;
use crate::host::Host;

struct FieldInner {
    host: Host,
    input: NodeId,
    rules: RefCell<Option<RuleDefinition>>,
    resolved: RefCell<Option<(String, FormController)>>,
    pending: Cell<bool>,
    removed: Cell<bool>,
}

impl FieldInner {
    fn resolve(&self) -> Result<(String, FormController), BindError> {
        if let Some(resolved) = self.resolved.borrow().as_ref() {
            return Ok(resolved.clone());
        }
        let key = ensure_field_key(self.host.dom(), self.input);
        let form_node = self
            .host
            .form_node(self.input)
            .ok_or_else(|| BindError::OutsideForm { key: key.clone() })?;
        let form = self
            .host
            .registry()
            .form(form_node)
            .ok_or(BindError::FormControllerMissing { form: form_node })?;
        *self.resolved.borrow_mut() = Some((key.clone(), form.clone()));
        Ok((key, form))
    }

    fn register(&self) {
        self.pending.set(false);
        if self.removed.get() {
            return;
        }
        let Some(rules) = self.rules.borrow().clone() else {
            return;
        };
        let Some((key, form)) = self.resolved.borrow().clone() else {
            return;
        };
        debug!(form = %form.id(), key, rules = %rules, "field registered");
        form.add_rule(&key, rules);
        form.revalidate_field(&key);
    }
}

/// Rules of one field, kept in sync with the enclosing form controller.
pub struct FieldController {
    inner: Rc<FieldInner>,
}

impl fmt::Debug for FieldController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldController")
            .field("input", &self.inner.input)
            .field("key", &self.key())
            .field("rules", &self.inner.rules.borrow())
            .field("pending", &self.inner.pending.get())
            .finish()
    }
}

impl FieldController {
    /// Attach to the field on `node`. With rules, the field must sit inside
    /// a form that already has a controller.
    pub fn attach(
        host: &Host,
        node: NodeId,
        rules: Option<RuleDefinition>,
    ) -> Result<Self, BindError> {
        let input = inner_input(host.dom(), node).ok_or(BindError::MissingInput { node })?;
        let rules = rules.and_then(RuleDefinition::non_empty);
        let controller = Self {
            inner: Rc::new(FieldInner {
                host: host.clone(),
                input,
                rules: RefCell::new(rules),
                resolved: RefCell::new(None),
                pending: Cell::new(false),
                removed: Cell::new(false),
            }),
        };
        if controller.inner.rules.borrow().is_some() {
            controller.inner.resolve()?;
            controller.schedule_registration();
        }
        Ok(controller)
    }

    fn schedule_registration(&self) {
        self.inner.pending.set(true);
        let weak: Weak<FieldInner> = Rc::downgrade(&self.inner);
        self.inner.host.scheduler().defer(move || {
            if let Some(inner) = weak.upgrade() {
                inner.register();
            }
        });
    }

    /// Field key, once resolved.
    #[must_use]
    pub fn key(&self) -> Option<String> {
        self.inner.resolved.borrow().as_ref().map(|(key, _)| key.clone())
    }

    #[must_use]
    pub fn rules(&self) -> Option<RuleDefinition> {
        self.inner.rules.borrow().clone()
    }

    /// Whether the form currently knows this field's rules.
    #[must_use]
    pub fn is_registered(&self) -> bool {
        !self.inner.pending.get()
            && !self.inner.removed.get()
            && self.inner.rules.borrow().is_some()
    }

    /// Swap the field's rules. Structurally equal rules are a no-op.
    pub fn replace_rules(&self, rules: Option<RuleDefinition>) -> Result<(), BindError> {
        let new = rules.and_then(RuleDefinition::non_empty);
        let old = self.inner.rules.borrow().clone();
        if old == new {
            trace!(key = ?self.key(), "rules unchanged");
            return Ok(());
        }
        if self.inner.pending.get() {
            if new.is_some() {
                self.inner.resolve()?;
            }
            *self.inner.rules.borrow_mut() = new;
            return Ok(());
        }
        let (key, form) = self.inner.resolve()?;
        match (&old, &new) {
            (None, Some(added)) => form.add_rule(&key, added.clone()),
            (Some(removed), None) => {
                form.remove_rule(&key, removed);
            }
            (Some(removed), Some(added)) => {
                form.remove_rule(&key, removed);
                form.add_rule(&key, added.clone());
            }
            (None, None) => {}
        }
        *self.inner.rules.borrow_mut() = new;
        form.revalidate_field(&key);
        Ok(())
    }

    /// Withdraw the field's rules and revalidate.
    pub fn remove_rules(&self) {
        let Some(old) = self.inner.rules.borrow_mut().take() else {
            return;
        };
        if self.inner.pending.get() {
            return;
        }
        let Some((key, form)) = self.inner.resolved.borrow().clone() else {
            return;
        };
        form.remove_rule(&key, &old);
        form.revalidate_field(&key);
    }

    /// Withdraw the rules and stop tracking the field.
    pub fn destroy(self) {}
}

impl Drop for FieldController {
    fn drop(&mut self) {
        if !self.inner.removed.get() {
            self.remove_rules();
            self.inner.removed.set(true);
        }
    }
}
