//! Per-kind widget adapters.
//!
//! Every adapter follows the same protocol:
//!
//! 1. Look up the live native widget on the node, failing with
//!    [`BindError::NotInitialized`] when the library was never bootstrapped.
//! 2. Build a [`DataController`] with a fresh id and register it for the
//!    node, tearing down whichever controller it replaces.
//! 3. Bring the two sides in line: an undefined store adopts the widget's
//!    value, any other store value is pushed to the widget.
//! 4. Subscribe to the store (push) and to the native change events (pull).
//! 5. Wire a `label[for="_"]` next to the widget to open or focus it.
//!
//! The returned [`Attachment`] undoes all of it on [`Attachment::destroy`]
//! or drop.

pub mod calendar;
pub mod checkbox;
pub mod dropdown;
pub mod input;
pub mod modal;
pub mod slider;

use std::fmt;
use std::rc::{Rc, Weak};

use tracing::{debug, debug_span, error};
use wirebind_core::dom::{Dom, closest, find_descendant, is_input_like};
use wirebind_core::{NodeId, TypedValue, next_id};
use wirebind_runtime::Observable;

use crate::controller::{DataController, WidgetSync};
use crate::error::BindError;
use crate::host::Host;
use crate::native::{Command, NativeHandler, NativeWidget, WidgetEvent, WidgetKind};

/// What a click on the sentinel label does.
#[derive(Debug, Clone, Copy)]
pub(crate) enum LabelAction {
    Show,
    Focus(NodeId),
    Toggle,
}

/// Everything the shared attach path needs from a kind module.
pub(crate) struct AttachSpec {
    pub(crate) kind: WidgetKind,
    pub(crate) node: NodeId,
    pub(crate) field: NodeId,
    pub(crate) sync: Box<dyn WidgetSync>,
    pub(crate) native: Option<Rc<dyn NativeWidget>>,
    pub(crate) events: &'static [WidgetEvent],
    /// DOM event on `field` that carries user edits.
    pub(crate) dom_event: Option<&'static str>,
    pub(crate) on_change: Option<NativeHandler>,
    pub(crate) label: Option<LabelAction>,
    pub(crate) owned_nodes: Vec<NodeId>,
    pub(crate) relocates: bool,
}

/// Handle returned by every `attach`; dropping it detaches the widget.
#[must_use = "dropping the attachment detaches the widget"]
pub struct Attachment {
    controller: Rc<DataController>,
}

impl fmt::Debug for Attachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attachment")
            .field("controller", &self.controller)
            .finish()
    }
}

impl Attachment {
    #[must_use]
    pub fn controller(&self) -> &Rc<DataController> {
        &self.controller
    }

    /// Tear down the binding and remove any node the widget relocated.
    pub fn destroy(self) {}
}

impl Drop for Attachment {
    fn drop(&mut self) {
        self.controller.detach(true);
    }
}

/// The input element of a widget: the node itself or its first form control.
pub(crate) fn inner_input(dom: &dyn Dom, node: NodeId) -> Option<NodeId> {
    if is_input_like(dom, node) {
        return Some(node);
    }
    find_descendant(dom, node, |n| is_input_like(dom, n))
}

/// A `label[for="_"]` inside the widget's field wrapper.
fn sentinel_label(dom: &dyn Dom, node: NodeId) -> Option<NodeId> {
    let scope = closest(dom, node, |n| dom.has_class(n, "field")).or_else(|| dom.parent(node))?;
    find_descendant(dom, scope, |n| {
        dom.tag(n).as_deref() == Some("label") && dom.attr(n, "for").as_deref() == Some("_")
    })
}

pub(crate) fn attach_with(
    host: &Host,
    store: Observable<TypedValue>,
    spec: AttachSpec,
) -> Result<Attachment, BindError> {
    let AttachSpec {
        kind,
        node,
        field,
        sync,
        native,
        events,
        dom_event,
        on_change,
        label,
        owned_nodes,
        relocates,
    } = spec;
    let id = next_id();
    let _span = debug_span!("attach", id = %id, kind = %kind, node = %node).entered();

    let controller = Rc::new(DataController::new(
        id,
        host.clone(),
        kind,
        node,
        field,
        store.clone(),
        sync,
        on_change,
    ));
    {
        let mut teardown = controller.teardown.borrow_mut();
        teardown.owned_nodes = owned_nodes;
        if relocates {
            teardown.relocated = Some(node);
        }
    }

    if let Some(previous) = host.registry().insert_data(node, Rc::clone(&controller)) {
        debug!(previous = %previous.id(), "replacing controller");
        previous.detach(false);
    }

    let initial = if store.with(TypedValue::is_undefined) {
        controller.sync_from_widget();
        Ok(())
    } else {
        controller.push_to_widget(&store.get()).map(|_| ())
    };
    if let Err(err) = initial {
        controller.detach(false);
        return Err(err);
    }

    let weak = Rc::downgrade(&controller);
    let subscription = store.subscribe(move |value| {
        let Some(controller) = weak.upgrade() else {
            return;
        };
        if let Err(err) = controller.push_to_widget(value) {
            error!(
                id = %controller.id(),
                kind = %controller.kind(),
                %err,
                "store value rejected by widget"
            );
        }
    });
    controller.teardown.borrow_mut().subscription = Some(subscription);

    if let Some(widget) = &native {
        for event in events {
            let weak = Rc::downgrade(&controller);
            let listener = widget.listen(
                *event,
                Rc::new(move |payload: &TypedValue| {
                    if let Some(controller) = weak.upgrade() {
                        controller.on_native(payload);
                    }
                }),
            );
            controller
                .teardown
                .borrow_mut()
                .native
                .push((Rc::clone(widget), listener));
        }
    }

    let dom = host.dom();
    if let Some(event) = dom_event {
        let weak = Rc::downgrade(&controller);
        let listener = dom.on(
            field,
            event,
            Rc::new(move || {
                if let Some(controller) = weak.upgrade() {
                    let text = controller.host().dom().value(controller.field());
                    controller.on_native(&TypedValue::Text(text));
                }
            }),
        );
        controller.teardown.borrow_mut().dom.push((field, listener));
    }

    if let Some(action) = label {
        if let Some(target) = sentinel_label(dom, node) {
            let handler = label_handler(Rc::downgrade(&controller), native, action);
            let listener = dom.on(target, "click", handler);
            controller.teardown.borrow_mut().dom.push((target, listener));
        }
    }

    debug!(value = %controller.value(), "attached");
    Ok(Attachment { controller })
}

fn label_handler(
    controller: Weak<DataController>,
    native: Option<Rc<dyn NativeWidget>>,
    action: LabelAction,
) -> Rc<dyn Fn()> {
    Rc::new(move || {
        if controller.upgrade().is_none() {
            return;
        }
        match (action, &native) {
            (LabelAction::Show, Some(widget)) => {
                widget.invoke(Command::Show);
            }
            (LabelAction::Toggle, Some(widget)) => {
                let checked = widget.invoke(Command::IsChecked).as_bool().unwrap_or(false);
                widget.invoke(if checked { Command::Uncheck } else { Command::Check });
            }
            (LabelAction::Focus(target), _) => {
                if let Some(controller) = controller.upgrade() {
                    controller.host().dom().focus(target);
                }
            }
            _ => {}
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::{calendar, checkbox, dropdown, input, modal, slider};
    use crate::controller::ControllerState;
    use crate::headless::HeadlessWidgets;
    use chrono::NaiveDate;
    use wirebind_core::MemoryDom;
    use wirebind_i18n::FormatterSettings;
    use wirebind_runtime::{DefaultsContext, Scheduler};

    struct Fixture {
        dom: Rc<MemoryDom>,
        widgets: Rc<HeadlessWidgets>,
        host: Host,
    }

    fn fixture() -> Fixture {
        let dom = Rc::new(MemoryDom::new());
        let widgets = Rc::new(HeadlessWidgets::new(dom.clone()));
        let host = Host::new(dom.clone(), widgets.clone())
            .with_scheduler(Scheduler::new())
            .with_defaults(DefaultsContext::with_builtin("en"));
        Fixture { dom, widgets, host }
    }

    impl Fixture {
        /// `div.field > label[for=_] + div.<class>#<id> > input`
        fn widget(&self, class: &str, id: &str, input_attrs: &[(&str, &str)]) -> NodeId {
            let field = self.dom.append_element(self.dom.root(), "div", &[("class", "field")]);
            self.dom.append_element(field, "label", &[("for", "_")]);
            let node = self.dom.append_element(field, "div", &[("class", class), ("id", id)]);
            self.dom.append_element(node, "input", input_attrs);
            node
        }

        fn label_of(&self, node: NodeId) -> NodeId {
            sentinel_label(self.dom.as_ref(), node).expect("label")
        }
    }

    fn list(items: &[&str]) -> TypedValue {
        TypedValue::from(items)
    }

    #[test]
    fn uninitialized_widget_is_reported() {
        let fx = fixture();
        let node = fx.widget("ui calendar", "start", &[]);
        let store = Observable::default();
        let err = calendar::attach(&fx.host, node, store, Default::default()).unwrap_err();
        assert!(matches!(
            err,
            BindError::NotInitialized { kind: WidgetKind::Calendar, node: n } if n == node
        ));
    }

    #[test]
    fn repeated_push_sets_widget_once() {
        let fx = fixture();
        let node = fx.widget("ui dropdown", "color", &[("type", "hidden")]);
        fx.widgets.init(node, WidgetKind::Dropdown);
        let store = Observable::new(TypedValue::from("red"));
        let att = dropdown::attach(&fx.host, node, store.clone(), Default::default()).unwrap();
        fx.widgets.log().clear();

        let blue = TypedValue::from("blue");
        assert!(att.controller().push_to_widget(&blue).unwrap());
        assert!(!att.controller().push_to_widget(&blue).unwrap());
        assert_eq!(fx.widgets.log().writes(node), 1);
        assert_eq!(store.get(), blue);
    }

    #[test]
    fn equal_native_change_does_not_write_store() {
        let fx = fixture();
        let node = fx.widget("ui dropdown", "color", &[("type", "hidden")]);
        fx.widgets.init(node, WidgetKind::Dropdown);
        let store = Observable::new(TypedValue::from("red"));
        let _att = dropdown::attach(&fx.host, node, store.clone(), Default::default()).unwrap();
        let version = store.version();

        fx.widgets.user_change(node, WidgetKind::Dropdown, TypedValue::from("red"));
        assert_eq!(store.version(), version);

        fx.widgets.user_change(node, WidgetKind::Dropdown, TypedValue::from("green"));
        assert_eq!(store.version(), version + 1);
        assert_eq!(store.get(), TypedValue::from("green"));
    }

    #[test]
    fn multi_select_uses_one_set_exactly() {
        let fx = fixture();
        let node = fx.widget("ui multiple dropdown", "tags", &[("type", "hidden")]);
        let hidden = fx.dom.children(node)[0];
        fx.dom.set_value(hidden, "a,b");
        fx.widgets.init(node, WidgetKind::Dropdown);
        let store = Observable::new(list(&["a", "b"]));
        let _att = dropdown::attach(&fx.host, node, store.clone(), Default::default()).unwrap();
        fx.widgets.log().clear();

        store.set(list(&["a", "c"]));
        let log = fx.widgets.log();
        assert_eq!(log.count(node, "set exactly"), 1);
        assert_eq!(log.count(node, "set selected"), 0);
        assert!(log.commands(node).contains(&Command::SetExactly(vec!["a".into(), "c".into()])));
        assert_eq!(fx.dom.value(hidden), "a,c");
    }

    #[test]
    fn undefined_store_adopts_widget_value() {
        let fx = fixture();
        let node = fx.widget("ui checkbox", "terms", &[("type", "checkbox")]);
        let input = fx.dom.children(node)[0];
        fx.dom.set_checked(input, true);
        fx.widgets.init(node, WidgetKind::Checkbox);
        let store = Observable::default();
        let _att = checkbox::attach(&fx.host, node, store.clone(), Default::default()).unwrap();
        assert_eq!(store.get(), TypedValue::Bool(true));
        assert_eq!(fx.widgets.log().writes(node), 0);
    }

    #[test]
    fn wrong_store_variant_fails_attach_cleanly() {
        let fx = fixture();
        let node = fx.widget("ui checkbox", "terms", &[("type", "checkbox")]);
        fx.widgets.init(node, WidgetKind::Checkbox);
        let listeners = fx.dom.total_listeners();
        let store = Observable::new(TypedValue::from("yes"));
        let err = checkbox::attach(&fx.host, node, store, Default::default()).unwrap_err();
        assert!(matches!(err, BindError::Format(_)));
        assert_eq!(fx.host.registry().data_len(), 0);
        assert_eq!(fx.dom.total_listeners(), listeners);
    }

    #[test]
    fn attach_and_destroy_are_symmetric() {
        let fx = fixture();
        let cal = fx.widget("ui calendar", "start", &[]);
        let drop_node = fx.widget("ui dropdown", "color", &[("type", "hidden")]);
        let check = fx.widget("ui checkbox", "terms", &[("type", "checkbox")]);
        let slide = fx.widget("ui slider", "volume", &[]);
        let text = fx.widget("ui input", "name", &[("type", "text")]);
        let dialog = fx.dom.append_element(fx.dom.root(), "div", &[("class", "ui modal")]);
        for (node, kind) in [
            (cal, WidgetKind::Calendar),
            (drop_node, WidgetKind::Dropdown),
            (check, WidgetKind::Checkbox),
            (slide, WidgetKind::Slider),
            (dialog, WidgetKind::Modal),
        ] {
            fx.widgets.init(node, kind);
        }
        let dom_before = fx.dom.total_listeners();
        let elements_before = fx.dom.len();
        let store = Observable::<TypedValue>::default();

        let attachments = vec![
            calendar::attach(&fx.host, cal, store.clone(), Default::default()).unwrap(),
            dropdown::attach(&fx.host, drop_node, Observable::default(), Default::default())
                .unwrap(),
            checkbox::attach(&fx.host, check, Observable::default(), Default::default()).unwrap(),
            slider::attach(&fx.host, slide, Observable::default(), Default::default()).unwrap(),
            input::attach(&fx.host, text, Observable::default(), Default::default()).unwrap(),
        ];
        assert_eq!(fx.host.registry().data_len(), 5);
        assert!(fx.dom.total_listeners() > dom_before);
        assert_eq!(store.subscriber_count(), 1);
        for node in [cal, drop_node, check, slide] {
            assert_eq!(fx.dom.listener_count(fx.label_of(node)), 1);
        }

        drop(attachments);
        assert_eq!(fx.host.registry().data_len(), 0);
        assert_eq!(fx.dom.total_listeners(), dom_before);
        assert_eq!(fx.dom.len(), elements_before);
        assert_eq!(store.subscriber_count(), 0);
        for (node, kind) in [
            (cal, WidgetKind::Calendar),
            (drop_node, WidgetKind::Dropdown),
            (check, WidgetKind::Checkbox),
            (slide, WidgetKind::Slider),
        ] {
            assert_eq!(fx.widgets.widget(node, kind).unwrap().listener_count(), 0);
        }

        let modal_att =
            modal::attach(&fx.host, dialog, Observable::default(), Default::default()).unwrap();
        assert_eq!(fx.widgets.widget(dialog, WidgetKind::Modal).unwrap().listener_count(), 2);
        modal_att.destroy();
        assert_eq!(fx.widgets.widget(dialog, WidgetKind::Modal).unwrap().listener_count(), 0);
    }

    #[test]
    fn reattach_replaces_previous_controller() {
        let fx = fixture();
        let node = fx.widget("ui dropdown", "color", &[("type", "hidden")]);
        fx.widgets.init(node, WidgetKind::Dropdown);
        let first_store = Observable::new(TypedValue::from("red"));
        let first =
            dropdown::attach(&fx.host, node, first_store.clone(), Default::default()).unwrap();
        let second_store = Observable::new(TypedValue::from("blue"));
        let second = dropdown::attach(&fx.host, node, second_store, Default::default()).unwrap();

        assert_eq!(first.controller().state(), ControllerState::Destroyed);
        assert_eq!(first_store.subscriber_count(), 0);
        let current = fx.host.data_controller(node).unwrap();
        assert!(Rc::ptr_eq(&current, second.controller()));

        drop(first);
        assert!(fx.host.data_controller(node).is_some());
        drop(second);
        assert!(fx.host.data_controller(node).is_none());
    }

    #[test]
    fn modal_node_is_removed_after_relocation() {
        let fx = fixture();
        let wrapper = fx.dom.append_element(fx.dom.root(), "div", &[("class", "page")]);
        let dialog = fx.dom.append_element(wrapper, "div", &[("class", "ui modal")]);
        fx.widgets.init(dialog, WidgetKind::Modal);
        let visible = Observable::new(TypedValue::Bool(false));
        let att = modal::attach(&fx.host, dialog, visible.clone(), Default::default()).unwrap();

        visible.set(TypedValue::Bool(true));
        assert!(fx.widgets.widget(dialog, WidgetKind::Modal).unwrap().is_active());
        assert_ne!(fx.dom.parent(dialog), Some(wrapper));

        fx.widgets.user_change(dialog, WidgetKind::Modal, TypedValue::Bool(false));
        assert_eq!(visible.get(), TypedValue::Bool(false));

        att.destroy();
        assert!(!fx.dom.contains(dialog));
    }

    #[test]
    fn replaced_modal_keeps_its_node() {
        let fx = fixture();
        let dialog = fx.dom.append_element(fx.dom.root(), "div", &[("class", "ui modal")]);
        fx.widgets.init(dialog, WidgetKind::Modal);
        let attach = || {
            modal::attach(&fx.host, dialog, Observable::default(), Default::default()).unwrap()
        };
        let first = attach();
        let _second = attach();
        drop(first);
        assert!(fx.dom.contains(dialog));
    }

    #[test]
    fn slider_mirrors_into_shadow_input() {
        let fx = fixture();
        let attrs = [("class", "ui slider"), ("data-value", "3")];
        let node = fx.dom.append_element(fx.dom.root(), "div", &attrs);
        fx.widgets.init(node, WidgetKind::Slider);
        let store = Observable::default();
        let settings = slider::SliderSettings::default().with_name("volume");
        let att = slider::attach(&fx.host, node, store.clone(), settings).unwrap();
        let shadow = att.controller().field();
        assert_eq!(fx.dom.attr(shadow, "name").as_deref(), Some("volume"));
        assert_eq!(store.get(), TypedValue::Number(3.0));
        assert_eq!(fx.dom.value(shadow), "3");

        store.set(TypedValue::Number(7.5));
        assert_eq!(fx.dom.value(shadow), "7.5");
        fx.widgets.user_change(node, WidgetKind::Slider, TypedValue::Number(2.0));
        assert_eq!(fx.dom.value(shadow), "2");

        att.destroy();
        assert!(!fx.dom.contains(shadow));
        assert!(fx.dom.contains(node));
    }

    #[test]
    fn unparseable_input_keeps_last_value() {
        let fx = fixture();
        let node = fx.widget("ui input", "age", &[("type", "text")]);
        let field = fx.dom.children(node)[0];
        let store = Observable::new(TypedValue::Number(4.0));
        let settings = input::InputSettings::default()
            .with_formatter(FormatterSettings::new("number").with_precision(0));
        let _att = input::attach(&fx.host, node, store.clone(), settings).unwrap();
        assert_eq!(fx.dom.value(field), "4");

        fx.dom.set_value(field, "abc");
        fx.dom.dispatch(field, "change");
        assert_eq!(store.get(), TypedValue::Number(4.0));

        fx.dom.set_value(field, "12");
        fx.dom.dispatch(field, "change");
        assert_eq!(store.get(), TypedValue::Number(12.0));
    }

    #[test]
    fn input_without_control_is_rejected() {
        let fx = fixture();
        let node = fx.dom.append_element(fx.dom.root(), "div", &[("class", "ui input")]);
        let err =
            input::attach(&fx.host, node, Observable::default(), Default::default()).unwrap_err();
        assert!(matches!(err, BindError::MissingInput { .. }));
    }

    #[test]
    fn calendar_pulls_dates_and_label_opens_it() {
        let fx = fixture();
        let node = fx.widget("ui calendar", "start", &[("type", "text")]);
        fx.widgets.init(node, WidgetKind::Calendar);
        let store = Observable::default();
        let _att = calendar::attach(&fx.host, node, store.clone(), Default::default()).unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 3, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .unwrap();

        fx.widgets.user_change(node, WidgetKind::Calendar, TypedValue::Date(date));
        assert_eq!(store.get(), TypedValue::Date(date));

        fx.dom.dispatch(fx.label_of(node), "click");
        assert!(fx.widgets.widget(node, WidgetKind::Calendar).unwrap().is_active());
    }

    #[test]
    fn checkbox_label_toggles() {
        let fx = fixture();
        let node = fx.widget("ui checkbox", "terms", &[("type", "checkbox")]);
        fx.widgets.init(node, WidgetKind::Checkbox);
        let store = Observable::new(TypedValue::Bool(false));
        let _att = checkbox::attach(&fx.host, node, store.clone(), Default::default()).unwrap();
        let label = fx.label_of(node);

        fx.dom.dispatch(label, "click");
        assert_eq!(store.get(), TypedValue::Bool(true));
        fx.dom.dispatch(label, "click");
        assert_eq!(store.get(), TypedValue::Bool(false));
    }

    #[test]
    fn caller_callback_is_chained() {
        let fx = fixture();
        let node = fx.widget("ui dropdown", "color", &[("type", "hidden")]);
        fx.widgets.init(node, WidgetKind::Dropdown);
        let seen = Rc::new(std::cell::RefCell::new(Vec::new()));
        let sink = seen.clone();
        let settings = dropdown::DropdownSettings::default()
            .with_on_change(move |v| sink.borrow_mut().push(v.clone()));
        let store = Observable::new(TypedValue::from("red"));
        let _att = dropdown::attach(&fx.host, node, store, settings).unwrap();
        fx.widgets.user_change(node, WidgetKind::Dropdown, TypedValue::from("blue"));
        assert_eq!(seen.borrow().last(), Some(&TypedValue::from("blue")));
    }

    #[test]
    fn rounded_number_is_set_once() {
        let fx = fixture();
        let node = fx.widget("ui input", "amount", &[("type", "text")]);
        let field = fx.dom.children(node)[0];
        let settings =
            input::InputSettings::default().with_formatter(FormatterSettings::new("number"));
        let att = input::attach(&fx.host, node, Observable::default(), settings).unwrap();

        let precise = TypedValue::Number(1234.567);
        assert!(att.controller().push_to_widget(&precise).unwrap());
        assert_eq!(fx.dom.value(field), "1 234.57");
        assert!(!att.controller().push_to_widget(&precise).unwrap());
        assert!(!att.controller().push_to_widget(&TypedValue::Number(1234.57)).unwrap());
    }

    #[test]
    fn case_transformed_text_is_set_once() {
        let fx = fixture();
        let node = fx.widget("ui input", "code", &[("type", "text")]);
        let field = fx.dom.children(node)[0];
        let settings = input::InputSettings::default()
            .with_formatter(FormatterSettings::new("text").with_case("upper"));
        let att = input::attach(&fx.host, node, Observable::default(), settings).unwrap();

        let value = TypedValue::from("ab12");
        assert!(att.controller().push_to_widget(&value).unwrap());
        assert_eq!(fx.dom.value(field), "AB12");
        assert!(!att.controller().push_to_widget(&value).unwrap());
    }

    #[test]
    fn undefined_push_leaves_widgets_alone() {
        let fx = fixture();
        let slide = fx.dom.append_element(fx.dom.root(), "div", &[("class", "ui slider")]);
        let check = fx.widget("ui checkbox", "terms", &[("type", "checkbox")]);
        let color = fx.widget("ui dropdown", "color", &[("type", "hidden")]);
        let dialog = fx.dom.append_element(fx.dom.root(), "div", &[("class", "ui modal")]);
        for (node, kind) in [
            (slide, WidgetKind::Slider),
            (check, WidgetKind::Checkbox),
            (color, WidgetKind::Dropdown),
            (dialog, WidgetKind::Modal),
        ] {
            fx.widgets.init(node, kind);
        }
        let store = |value: TypedValue| Observable::new(value);
        let attachments = vec![
            slider::attach(&fx.host, slide, store(4.0.into()), Default::default()).unwrap(),
            checkbox::attach(&fx.host, check, store(false.into()), Default::default()).unwrap(),
            dropdown::attach(&fx.host, color, store("".into()), Default::default()).unwrap(),
            modal::attach(&fx.host, dialog, store(false.into()), Default::default()).unwrap(),
        ];
        fx.widgets.log().clear();

        for att in &attachments {
            let pushed = att.controller().push_to_widget(&TypedValue::Undefined).unwrap();
            assert!(!pushed, "{}", att.controller().kind());
        }
        for node in [slide, check, color, dialog] {
            assert_eq!(fx.widgets.log().writes(node), 0);
        }
    }
}
