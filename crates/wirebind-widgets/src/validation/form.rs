//! Form validation controller.
//!
//! Owns the field → rules map of one form and drives the native validation
//! engine through commands. Field changes call
//! [`FormController::revalidate_field`]; with live validation on, any number
//! of those within one scheduling turn collapse into a single full pass.
//!
//! # Invariants
//!
//! 1. **One pass per turn**: re-arming an already armed validation is a
//!    no-op; the deferred check clears the flag and validates once.
//! 2. **Ignored fields have no native rules**: with ignore-empty on, a key is
//!    in the ignored set exactly when its rules were withheld from (or
//!    removed from) the engine because the field was empty.
//! 3. **Whole-field removal**: the engine can only drop all of a field's
//!    rules, so removing one definition clears the field and re-adds the
//!    definitions that remain.
//! 4. No `RefCell` borrow is held across a native command; the engine reads
//!    field values back through the DOM and may re-enter.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Form library not bootstrapped | Markup bug | `attach` returns `BindError::NotInitialized` |
//! | Controller dropped with a pass armed | Teardown mid-turn | Deferred check finds nothing and returns |

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::{debug, debug_span, trace};
use wirebind_core::{NodeId, TypedValue, next_id};
use wirebind_runtime::{Observable, Scheduler, StateView};

use super::rules::RuleDefinition;
use crate::error::BindError;
use crate::host::Host;
use crate::native::{Command, NativeWidget, WidgetKind};
use crate::registry::Registry;

/// Form-level validation policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FormSettings {
    /// Validate live on every field change.
    pub active: bool,
    /// Withhold rules of empty fields from the engine.
    pub ignore_empty: bool,
}

impl FormSettings {
    #[must_use]
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    #[must_use]
    pub fn with_ignore_empty(mut self, ignore_empty: bool) -> Self {
        self.ignore_empty = ignore_empty;
        self
    }
}

#[derive(Debug, Default)]
struct FormState {
    rules: BTreeMap<String, Vec<RuleDefinition>>,
    ignored: BTreeSet<String>,
    active: bool,
    ignore_empty: bool,
    must_validate: bool,
}

struct FormInner {
    id: String,
    node: NodeId,
    native: Rc<dyn NativeWidget>,
    scheduler: Scheduler,
    state: RefCell<FormState>,
    valid: Observable<bool>,
    errors: Observable<Vec<String>>,
    dirty: Observable<bool>,
    passes: Cell<u64>,
}

/// Validation controller of one form. Clones share state.
#[derive(Clone)]
pub struct FormController {
    inner: Rc<FormInner>,
}

impl fmt::Debug for FormController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("FormController")
            .field("id", &self.inner.id)
            .field("node", &self.inner.node)
            .field("fields", &state.rules.len())
            .field("ignored", &state.ignored)
            .field("active", &state.active)
            .field("ignore_empty", &state.ignore_empty)
            .finish()
    }
}

impl FormController {
    fn new(
        id: String,
        node: NodeId,
        native: Rc<dyn NativeWidget>,
        scheduler: Scheduler,
        settings: FormSettings,
    ) -> Self {
        Self {
            inner: Rc::new(FormInner {
                id,
                node,
                native,
                scheduler,
                state: RefCell::new(FormState {
                    active: settings.active,
                    ignore_empty: settings.ignore_empty,
                    ..FormState::default()
                }),
                valid: Observable::new(true),
                errors: Observable::new(Vec::new()),
                dirty: Observable::new(false),
                passes: Cell::new(0),
            }),
        }
    }

    /// Attach a controller to the form on `node` and register it.
    pub fn attach(
        host: &Host,
        node: NodeId,
        settings: FormSettings,
    ) -> Result<FormAttachment, BindError> {
        let native = host.native(node, WidgetKind::Form)?;
        let controller = Self::new(next_id(), node, native, host.scheduler().clone(), settings);
        let _span =
            debug_span!("attach", id = %controller.id(), kind = %WidgetKind::Form, node = %node)
                .entered();
        if let Some(previous) = host.registry().insert_form(node, controller.clone()) {
            debug!(previous = %previous.id(), "replacing form controller");
            previous.disarm();
        }
        controller.refresh(None);
        if settings.active {
            controller.schedule_validation();
        }
        debug!(active = settings.active, ignore_empty = settings.ignore_empty, "form attached");
        Ok(FormAttachment {
            controller,
            registry: host.registry().clone(),
        })
    }

    /// Debug correlation id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.inner.id
    }

    #[must_use]
    pub fn node(&self) -> NodeId {
        self.inner.node
    }

    /// Whether both handles share one controller.
    #[must_use]
    pub fn same_as(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.inner.state.borrow().active
    }

    #[must_use]
    pub fn ignores_empty(&self) -> bool {
        self.inner.state.borrow().ignore_empty
    }

    #[must_use]
    pub fn has_rule(&self, key: &str) -> bool {
        self.inner.state.borrow().rules.contains_key(key)
    }

    /// Rule definitions registered for `key`.
    #[must_use]
    pub fn rules(&self, key: &str) -> Vec<RuleDefinition> {
        self.inner.state.borrow().rules.get(key).cloned().unwrap_or_default()
    }

    /// Keys whose rules are withheld because the field is empty.
    #[must_use]
    pub fn ignored(&self) -> BTreeSet<String> {
        self.inner.state.borrow().ignored.clone()
    }

    /// Full validation passes run so far.
    #[must_use]
    pub fn pass_count(&self) -> u64 {
        self.inner.passes.get()
    }

    /// Whether a validation pass is armed for the end of this turn.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.inner.state.borrow().must_validate
    }

    #[must_use]
    pub fn valid(&self) -> StateView<bool> {
        StateView::of(&self.inner.valid)
    }

    #[must_use]
    pub fn errors(&self) -> StateView<Vec<String>> {
        StateView::of(&self.inner.errors)
    }

    #[must_use]
    pub fn dirty(&self) -> StateView<bool> {
        StateView::of(&self.inner.dirty)
    }

    /// Record that a field was edited by the user.
    pub fn mark_dirty(&self) {
        self.inner.dirty.set(true);
    }

    // -----------------------------------------------------------------------
    // Rules
    // -----------------------------------------------------------------------

    /// Register `rule` for `key`.
    pub fn add_rule(&self, key: &str, rule: impl Into<RuleDefinition>) {
        let rule = rule.into();
        let ignore_empty = self.ignores_empty();
        let park = ignore_empty && self.field_is_empty(key);
        let (withdraw, to_push) = {
            let mut state = self.inner.state.borrow_mut();
            let held = !state.ignored.contains(key)
                && state.rules.get(key).is_some_and(|d| !d.is_empty());
            state.rules.entry(key.to_owned()).or_default().push(rule.clone());
            if park {
                state.ignored.insert(key.to_owned());
                (held, None)
            } else if state.ignored.remove(key) {
                (false, state.rules.get(key).cloned())
            } else {
                (false, Some(vec![rule]))
            }
        };
        if withdraw {
            self.inner.native.invoke(Command::RemoveField(key.to_owned()));
        }
        match to_push {
            None => debug!(form = %self.inner.id, key, withdraw, "rule parked: field is empty"),
            Some(definitions) => {
                debug!(form = %self.inner.id, key, count = definitions.len(), "rule added");
                self.push_rules(key, definitions);
            }
        }
    }

    /// Remove one definition from `key`. Returns false if it was not
    /// registered.
    pub fn remove_rule(&self, key: &str, rule: &RuleDefinition) -> bool {
        let (was_ignored, remaining) = {
            let mut state = self.inner.state.borrow_mut();
            let Some(definitions) = state.rules.get_mut(key) else {
                return false;
            };
            let Some(pos) = definitions.iter().position(|r| r == rule) else {
                return false;
            };
            definitions.remove(pos);
            let remaining = definitions.clone();
            if remaining.is_empty() {
                state.rules.remove(key);
                (state.ignored.remove(key), remaining)
            } else {
                (state.ignored.contains(key), remaining)
            }
        };
        debug!(form = %self.inner.id, key, remaining = remaining.len(), "rule removed");
        if !was_ignored {
            self.inner.native.invoke(Command::RemoveField(key.to_owned()));
            self.push_rules(key, remaining);
        }
        true
    }

    fn push_rules(&self, key: &str, definitions: Vec<RuleDefinition>) {
        for rules in definitions {
            self.inner.native.invoke(Command::AddRule {
                field: key.to_owned(),
                rules,
            });
        }
    }

    fn field_is_empty(&self, key: &str) -> bool {
        self.inner
            .native
            .invoke(Command::GetFieldValue(key.to_owned()))
            .is_empty()
    }

    /// Move `key` between the active and ignored sets to match its
    /// emptiness.
    fn sync_ignored(&self, key: &str) {
        if !self.has_rule(key) {
            return;
        }
        let empty = self.field_is_empty(key);
        let change = {
            let mut state = self.inner.state.borrow_mut();
            let ignored = state.ignored.contains(key);
            if empty && !ignored {
                state.ignored.insert(key.to_owned());
                Some(None)
            } else if !empty && ignored {
                state.ignored.remove(key);
                Some(state.rules.get(key).cloned())
            } else {
                None
            }
        };
        match change {
            Some(None) => {
                debug!(form = %self.inner.id, key, "rule deactivated: field is empty");
                self.inner.native.invoke(Command::RemoveField(key.to_owned()));
            }
            Some(Some(definitions)) => {
                debug!(form = %self.inner.id, key, "rule reactivated");
                self.push_rules(key, definitions);
            }
            None => {}
        }
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    /// React to a change of field `key`.
    pub fn revalidate_field(&self, key: &str) {
        if self.ignores_empty() {
            self.sync_ignored(key);
        }
        if self.is_active() {
            self.schedule_validation();
        } else {
            self.validate_field_now(key);
        }
    }

    fn schedule_validation(&self) {
        {
            let mut state = self.inner.state.borrow_mut();
            if state.must_validate {
                trace!(form = %self.inner.id, "validation already armed");
                return;
            }
            state.must_validate = true;
        }
        let weak: Weak<FormInner> = Rc::downgrade(&self.inner);
        self.inner.scheduler.defer(move || {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let form = FormController { inner };
            let armed = std::mem::replace(&mut form.inner.state.borrow_mut().must_validate, false);
            if armed && form.is_active() {
                form.run_validation();
            }
        });
    }

    fn disarm(&self) {
        let mut state = self.inner.state.borrow_mut();
        state.must_validate = false;
        state.active = false;
    }

    fn run_validation(&self) -> bool {
        let pass = self.inner.passes.get() + 1;
        self.inner.passes.set(pass);
        let _span = debug_span!("validate_form", form = %self.inner.id, pass).entered();
        let valid = self.inner.native.invoke(Command::ValidateForm).as_bool().unwrap_or(false);
        self.refresh(Some(valid));
        debug!(valid, "validation pass");
        valid
    }

    fn validate_field_now(&self, key: &str) -> bool {
        let _span = debug_span!("validate_field", form = %self.inner.id, key).entered();
        let valid = self
            .inner
            .native
            .invoke(Command::ValidateField(key.to_owned()))
            .as_bool()
            .unwrap_or(false);
        self.refresh(None);
        debug!(valid, "field validated");
        valid
    }

    /// Re-read the aggregate state from the engine.
    fn refresh(&self, valid: Option<bool>) {
        let valid = valid.unwrap_or_else(|| {
            self.inner.native.invoke(Command::IsValid).as_bool().unwrap_or(false)
        });
        let errors = match self.inner.native.invoke(Command::GetErrors) {
            TypedValue::List(items) => items,
            _ => Vec::new(),
        };
        self.inner.valid.set(valid);
        self.inner.errors.set(errors);
    }

    /// Turn live validation on (validating now) or off (clearing errors).
    pub fn set_active(&self, active: bool) {
        {
            let mut state = self.inner.state.borrow_mut();
            state.active = active;
            if !active {
                state.must_validate = false;
            }
        }
        debug!(form = %self.inner.id, active, "live validation toggled");
        if active {
            self.run_validation();
        } else {
            self.inner.native.invoke(Command::ClearDecorations);
            self.inner.errors.set(Vec::new());
        }
    }

    /// Switch the ignore-empty policy, moving rules in or out of the engine.
    pub fn set_ignore_empty(&self, ignore_empty: bool) {
        let keys: Vec<String> = {
            let mut state = self.inner.state.borrow_mut();
            state.ignore_empty = ignore_empty;
            state.rules.keys().cloned().collect()
        };
        debug!(form = %self.inner.id, ignore_empty, "ignore-empty toggled");
        if ignore_empty {
            for key in keys {
                self.sync_ignored(&key);
            }
        } else {
            let ignored = std::mem::take(&mut self.inner.state.borrow_mut().ignored);
            for key in ignored {
                let definitions = self.rules(&key);
                debug!(form = %self.inner.id, key, "rule reactivated");
                self.push_rules(&key, definitions);
            }
        }
        if self.is_active() {
            self.schedule_validation();
        }
    }

    /// Validate the whole form now, regardless of the live setting.
    pub fn do_validate_form(&self) -> bool {
        self.run_validation()
    }

    /// Validate one field now, regardless of the live setting.
    pub fn do_validate_field(&self, key: &str) -> bool {
        self.validate_field_now(key)
    }

    /// Forget edits; without live validation, also clear decorations.
    pub fn do_reset_form(&self) {
        self.inner.native.invoke(Command::SetAsClean);
        self.inner.dirty.set(false);
        if !self.is_active() {
            self.inner.native.invoke(Command::ClearDecorations);
            self.inner.errors.set(Vec::new());
        }
    }
}

/// Keeps a [`FormController`] registered; dropping it unregisters.
#[must_use = "dropping the attachment unregisters the form controller"]
pub struct FormAttachment {
    controller: FormController,
    registry: Registry,
}

impl fmt::Debug for FormAttachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormAttachment")
            .field("controller", &self.controller)
            .finish()
    }
}

impl FormAttachment {
    #[must_use]
    pub fn controller(&self) -> &FormController {
        &self.controller
    }

    pub fn destroy(self) {}
}

impl Drop for FormAttachment {
    fn drop(&mut self) {
        self.controller.disarm();
        self.registry.remove_form(self.controller.node(), &self.controller);
        debug!(form = %self.controller.id(), "form detached");
    }
}
