//! The collaborators an adapter talks to.

use std::fmt;
use std::rc::Rc;

use wirebind_core::dom::{Dom, closest};
use wirebind_core::NodeId;
use wirebind_runtime::{DefaultsContext, Scheduler};

use crate::controller::DataController;
use crate::error::BindError;
use crate::field_key::is_form_boundary;
use crate::native::{NativeWidget, WidgetKind, WidgetLibrary};
use crate::registry::Registry;
use crate::validation::FormController;

/// DOM, widget library, scheduler, format defaults and controller registry.
///
/// Cheap to clone; clones share everything.
#[derive(Clone)]
pub struct Host {
    dom: Rc<dyn Dom>,
    widgets: Rc<dyn WidgetLibrary>,
    scheduler: Scheduler,
    defaults: DefaultsContext,
    registry: Registry,
}

impl fmt::Debug for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Host")
            .field("scheduler", &self.scheduler)
            .field("locale", &self.defaults.locale())
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

impl Host {
    /// Host using the thread's scheduler and format defaults.
    #[must_use]
    pub fn new(dom: Rc<dyn Dom>, widgets: Rc<dyn WidgetLibrary>) -> Self {
        Self {
            dom,
            widgets,
            scheduler: Scheduler::global(),
            defaults: DefaultsContext::global(),
            registry: Registry::new(),
        }
    }

    #[must_use]
    pub fn with_scheduler(mut self, scheduler: Scheduler) -> Self {
        self.scheduler = scheduler;
        self
    }

    #[must_use]
    pub fn with_defaults(mut self, defaults: DefaultsContext) -> Self {
        self.defaults = defaults;
        self
    }

    #[must_use]
    pub fn dom(&self) -> &dyn Dom {
        self.dom.as_ref()
    }

    pub(crate) fn dom_rc(&self) -> Rc<dyn Dom> {
        Rc::clone(&self.dom)
    }

    #[must_use]
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    #[must_use]
    pub fn defaults(&self) -> &DefaultsContext {
        &self.defaults
    }

    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Run deferred work queued during this turn.
    pub fn flush(&self) -> usize {
        self.scheduler.flush()
    }

    /// The live widget of `kind` on `node`.
    pub fn native(
        &self,
        node: NodeId,
        kind: WidgetKind,
    ) -> Result<Rc<dyn NativeWidget>, BindError> {
        self.widgets
            .handle(node, kind)
            .ok_or(BindError::NotInitialized { kind, node })
    }

    /// Data controller attached to `node`.
    #[must_use]
    pub fn data_controller(&self, node: NodeId) -> Option<Rc<DataController>> {
        self.registry.data(node)
    }

    /// Nearest form boundary at or above `node`.
    #[must_use]
    pub fn form_node(&self, node: NodeId) -> Option<NodeId> {
        let dom = self.dom();
        closest(dom, node, |n| is_form_boundary(dom, n))
    }

    /// Form controller of the form enclosing `node`.
    #[must_use]
    pub fn form_controller_for(&self, node: NodeId) -> Option<FormController> {
        self.form_node(node).and_then(|form| self.registry.form(form))
    }
}
