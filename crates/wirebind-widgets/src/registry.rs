//! Node-keyed controller registry.
//!
//! Controllers are looked up by the DOM node they are attached to: data
//! controllers by their widget node, form controllers by their form node.
//! Entries are inserted on attach and removed on teardown; nothing is
//! collected implicitly.
//!
//! # Invariants
//!
//! 1. At most one data controller and one form controller per node.
//! 2. Removal is keyed by controller identity as well as node, so tearing
//!    down a replaced controller never evicts its replacement. Debug ids
//!    cycle and may repeat; they play no part in identity.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use ahash::AHashMap;
use wirebind_core::NodeId;

use crate::controller::DataController;
use crate::validation::FormController;

#[derive(Default)]
struct Entries {
    data: AHashMap<NodeId, Rc<DataController>>,
    forms: AHashMap<NodeId, FormController>,
}

/// Shared registry; clones see the same entries.
#[derive(Clone, Default)]
pub struct Registry {
    entries: Rc<RefCell<Entries>>,
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self.entries.borrow();
        f.debug_struct("Registry")
            .field("data", &entries.data.len())
            .field("forms", &entries.forms.len())
            .finish()
    }
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `controller` for `node`, returning the one it replaces.
    pub fn insert_data(
        &self,
        node: NodeId,
        controller: Rc<DataController>,
    ) -> Option<Rc<DataController>> {
        self.entries.borrow_mut().data.insert(node, controller)
    }

    #[must_use]
    pub fn data(&self, node: NodeId) -> Option<Rc<DataController>> {
        self.entries.borrow().data.get(&node).cloned()
    }

    /// Remove the entry for `node` if it is still `controller`.
    pub fn remove_data(&self, node: NodeId, controller: &DataController) -> bool {
        let removed = {
            let mut entries = self.entries.borrow_mut();
            match entries.data.get(&node) {
                Some(current) if std::ptr::eq(current.as_ref(), controller) => {
                    entries.data.remove(&node)
                }
                _ => None,
            }
        };
        removed.is_some()
    }

    pub fn insert_form(&self, node: NodeId, controller: FormController) -> Option<FormController> {
        self.entries.borrow_mut().forms.insert(node, controller)
    }

    #[must_use]
    pub fn form(&self, node: NodeId) -> Option<FormController> {
        self.entries.borrow().forms.get(&node).cloned()
    }

    /// Remove the form entry for `node` if it is still `controller`.
    pub fn remove_form(&self, node: NodeId, controller: &FormController) -> bool {
        let removed = {
            let mut entries = self.entries.borrow_mut();
            match entries.forms.get(&node) {
                Some(current) if current.same_as(controller) => entries.forms.remove(&node),
                _ => None,
            }
        };
        removed.is_some()
    }

    /// Live data controllers.
    #[must_use]
    pub fn data_len(&self) -> usize {
        self.entries.borrow().data.len()
    }

    /// Live form controllers.
    #[must_use]
    pub fn form_len(&self) -> usize {
        self.entries.borrow().forms.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::{ControllerState, WidgetSync};
    use crate::headless::HeadlessWidgets;
    use crate::host::Host;
    use crate::native::WidgetKind;
    use wirebind_core::{MemoryDom, TypedValue};
    use wirebind_i18n::FormatError;
    use wirebind_runtime::{Observable, Scheduler};

    struct Inert;

    impl WidgetSync for Inert {
        fn read(&self) -> TypedValue {
            TypedValue::Undefined
        }

        fn write(&self, _value: &TypedValue) -> Result<(), FormatError> {
            Ok(())
        }

        fn decode(&self, native: &TypedValue) -> Option<TypedValue> {
            Some(native.clone())
        }
    }

    fn controller(host: &Host, node: NodeId, id: &str) -> Rc<DataController> {
        Rc::new(DataController::new(
            id.to_owned(),
            host.clone(),
            WidgetKind::Input,
            node,
            node,
            Observable::default(),
            Box::new(Inert),
            None,
        ))
    }

    #[test]
    fn replaced_controller_with_same_id_does_not_evict_successor() {
        let dom = Rc::new(MemoryDom::new());
        let widgets = Rc::new(HeadlessWidgets::new(dom.clone()));
        let host = Host::new(dom.clone(), widgets).with_scheduler(Scheduler::new());
        let node = dom.append_element(dom.root(), "input", &[("name", "email")]);
        let first = controller(&host, node, "001");
        let second = controller(&host, node, "001");
        let registry = host.registry();

        assert!(registry.insert_data(node, Rc::clone(&first)).is_none());
        assert!(registry.insert_data(node, Rc::clone(&second)).is_some());
        first.detach(true);
        assert_eq!(first.state(), ControllerState::Destroyed);
        let current = registry.data(node).unwrap();
        assert!(Rc::ptr_eq(&current, &second));

        assert!(!registry.remove_data(node, &first));
        assert!(registry.remove_data(node, &second));
        assert_eq!(registry.data_len(), 0);
    }
}
