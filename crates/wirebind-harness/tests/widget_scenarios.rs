#![forbid(unsafe_code)]

//! Integration tests: data controllers against the headless widget library.

use chrono::NaiveDate;
use proptest::prelude::*;
use tracing_subscriber::EnvFilter;
use wirebind_core::dom::Dom;
use wirebind_core::{NodeId, TypedValue};
use wirebind_harness::Page;
use wirebind_harness::strategies::{selection, whole_number};
use wirebind_i18n::FormatterSettings;
use wirebind_runtime::Observable;
use wirebind_widgets::adapter::{calendar, checkbox, dropdown, input, modal, slider};
use wirebind_widgets::validation::rules::empty;
use wirebind_widgets::{
    Attachment, BindError, Command, ControllerState, FieldController, FormController,
    FormSettings, InputSettings, WidgetKind,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn list(items: &[&str]) -> TypedValue {
    TypedValue::from(items)
}

fn attach_kind(
    page: &Page,
    node: NodeId,
    kind: WidgetKind,
    store: Observable<TypedValue>,
) -> Result<Attachment, BindError> {
    let host = page.host();
    match kind {
        WidgetKind::Calendar => calendar::attach(host, node, store, Default::default()),
        WidgetKind::Dropdown => dropdown::attach(host, node, store, Default::default()),
        WidgetKind::Modal => modal::attach(host, node, store, Default::default()),
        WidgetKind::Slider => slider::attach(host, node, store, Default::default()),
        WidgetKind::Input => input::attach(host, node, store, Default::default()),
        WidgetKind::Checkbox => checkbox::attach(host, node, store, Default::default()),
        WidgetKind::Form => unreachable!("forms attach through FormController"),
    }
}

// ============================================================================
// Dropdown
// ============================================================================

#[test]
fn multi_select_change_is_one_set_exactly() {
    init_tracing();
    let page = Page::new();
    let node = page.multi_dropdown(page.dom().root(), "tags", &["a", "b"]);
    let store = Observable::new(list(&["a", "b"]));
    let att = dropdown::attach(page.host(), node, store.clone(), Default::default()).unwrap();
    assert_eq!(page.log().writes(node), 0);

    store.set(list(&["a", "c"]));
    assert_eq!(page.log().writes(node), 1);
    assert_eq!(page.log().count(node, "set exactly"), 1);
    assert_eq!(page.log().count(node, "set selected"), 0);
    assert!(
        page.log()
            .commands(node)
            .contains(&Command::SetExactly(vec!["a".into(), "c".into()]))
    );
    assert_eq!(att.controller().value(), list(&["a", "c"]));

    store.set(list(&[]));
    assert_eq!(page.log().count(node, "clear"), 1);
}

#[test]
fn user_selection_reaches_the_store_once() {
    let page = Page::new();
    let node = page.multi_dropdown(page.dom().root(), "tags", &["x"]);
    let store = Observable::new(TypedValue::Undefined);
    let _att = dropdown::attach(page.host(), node, store.clone(), Default::default()).unwrap();
    assert_eq!(store.get(), list(&["x"]));
    let version = store.version();

    page.widgets().user_change(node, WidgetKind::Dropdown, list(&["x", "y"]));
    assert_eq!(store.get(), list(&["x", "y"]));
    assert_eq!(store.version(), version + 1);
    assert_eq!(page.log().writes(node), 0);
}

proptest! {
    #[test]
    fn repeated_push_writes_at_most_once(initial in selection(4), next in selection(4)) {
        let page = Page::new();
        let refs: Vec<&str> = initial.iter().map(String::as_str).collect();
        let node = page.multi_dropdown(page.dom().root(), "tags", &refs);
        let store = Observable::new(TypedValue::List(initial.clone()));
        let att = dropdown::attach(page.host(), node, store, Default::default()).unwrap();
        page.log().clear();

        let value = TypedValue::List(next.clone());
        let first = att.controller().push_to_widget(&value).unwrap();
        let second = att.controller().push_to_widget(&value).unwrap();
        prop_assert!(!second);
        prop_assert_eq!(first, initial != next);
        prop_assert_eq!(page.log().writes(node), usize::from(first));
    }

    #[test]
    fn repeated_number_push_sets_the_text_once(v in -1_000_000f64..1_000_000f64) {
        let page = Page::new();
        let node = page.widget(page.dom().root(), WidgetKind::Input, "amount", &[("type", "text")]);
        let field = page.dom().children(node)[0];
        let settings = InputSettings::default().with_formatter(FormatterSettings::new("number"));
        let att = input::attach(page.host(), node, Observable::default(), settings).unwrap();

        let value = TypedValue::Number(v);
        att.controller().push_to_widget(&value).unwrap();
        let shown = page.dom().value(field);
        prop_assert!(!att.controller().push_to_widget(&value).unwrap());
        prop_assert_eq!(page.dom().value(field), shown);
    }

    #[test]
    fn echoed_slider_value_never_rewrites_the_store(v in whole_number()) {
        let page = Page::new();
        let node = page.widget(page.dom().root(), WidgetKind::Slider, "volume", &[]);
        let store = Observable::new(TypedValue::Number(v));
        let _att = slider::attach(page.host(), node, store.clone(), Default::default()).unwrap();
        let version = store.version();

        page.widgets().user_change(node, WidgetKind::Slider, TypedValue::Number(v));
        prop_assert_eq!(store.version(), version);
        prop_assert_eq!(store.get(), TypedValue::Number(v));
    }
}

// ============================================================================
// Lifecycle
// ============================================================================

#[test]
fn attach_and_destroy_leave_nothing_behind() {
    init_tracing();
    let page = Page::new();
    let root = page.dom().root();
    for kind in [
        WidgetKind::Calendar,
        WidgetKind::Dropdown,
        WidgetKind::Slider,
        WidgetKind::Input,
        WidgetKind::Checkbox,
    ] {
        let node = page.widget(root, kind, &format!("w_{kind}"), &[("type", "text")]);
        let nodes = page.dom().len();
        let listeners = page.dom().total_listeners();
        let store = Observable::new(TypedValue::Undefined);

        let att = attach_kind(&page, node, kind, store.clone()).unwrap();
        assert_eq!(store.subscriber_count(), 1, "{kind}");
        assert!(page.host().data_controller(node).is_some(), "{kind}");
        let controller = std::rc::Rc::clone(att.controller());

        att.destroy();
        assert_eq!(controller.state(), ControllerState::Destroyed, "{kind}");
        assert_eq!(store.subscriber_count(), 0, "{kind}");
        assert_eq!(page.dom().total_listeners(), listeners, "{kind}");
        assert_eq!(page.dom().len(), nodes, "{kind}");
        assert!(page.host().data_controller(node).is_none(), "{kind}");
        if let Some(widget) = page.widgets().widget(node, kind) {
            assert_eq!(widget.listener_count(), 0, "{kind}");
        }
    }
}

#[test]
fn modal_visibility_follows_the_store_and_its_node_goes_with_it() {
    let page = Page::new();
    let node = page.widget(page.dom().root(), WidgetKind::Modal, "confirm", &[]);
    let store = Observable::new(TypedValue::Bool(false));
    let att = modal::attach(page.host(), node, store.clone(), Default::default()).unwrap();

    store.set(TypedValue::Bool(true));
    let widget = page.widgets().widget(node, WidgetKind::Modal).unwrap();
    assert!(widget.is_active());

    page.widgets().user_change(node, WidgetKind::Modal, TypedValue::Bool(false));
    assert_eq!(store.get(), TypedValue::Bool(false));

    att.destroy();
    assert!(!page.dom().contains(node));
}

#[test]
fn failed_attach_leaves_no_registry_entry() {
    let page = Page::new();
    let root = page.dom().root();
    let node = page.widget(root, WidgetKind::Checkbox, "terms", &[("type", "checkbox")]);
    let store = Observable::new(TypedValue::Text("yes please".into()));
    let err = checkbox::attach(page.host(), node, store.clone(), Default::default()).unwrap_err();
    assert!(matches!(err, BindError::Format(_)));
    assert!(page.host().data_controller(node).is_none());
    assert_eq!(store.subscriber_count(), 0);

    let bare = page.dom().append_element(page.dom().root(), "div", &[("class", "ui calendar")]);
    let err = calendar::attach(page.host(), bare, Observable::default(), Default::default())
        .unwrap_err();
    assert!(matches!(err, BindError::NotInitialized { .. }));
}

// ============================================================================
// Formatting through inputs
// ============================================================================

#[test]
fn number_input_follows_the_page_locale() {
    let en = Page::new();
    let node = en.widget(en.dom().root(), WidgetKind::Input, "amount", &[("type", "text")]);
    let field = en.dom().children(node)[0];
    let store = Observable::new(TypedValue::Number(1234.5));
    let settings = InputSettings::default().with_formatter(FormatterSettings::new("number"));
    let _att = input::attach(en.host(), node, store.clone(), settings.clone()).unwrap();
    assert_eq!(en.dom().value(field), "1 234.50");
    en.type_into(field, "2 000.25");
    assert_eq!(store.get(), TypedValue::Number(2000.25));

    let de = Page::with_locale("de");
    let node = de.widget(de.dom().root(), WidgetKind::Input, "amount", &[("type", "text")]);
    let field = de.dom().children(node)[0];
    let store = Observable::new(TypedValue::Number(1234.5));
    let _att = input::attach(de.host(), node, store.clone(), settings).unwrap();
    assert_eq!(de.dom().value(field), "1.234,50");
    de.type_into(field, "7,5");
    assert_eq!(store.get(), TypedValue::Number(7.5));
}

#[test]
fn bad_formatter_settings_fail_attach() {
    let page = Page::new();
    let node = page.widget(page.dom().root(), WidgetKind::Input, "amount", &[("type", "text")]);
    let settings = InputSettings::default()
        .with_formatter(FormatterSettings::new("number").with_precision(7));
    let err = input::attach(page.host(), node, Observable::default(), settings).unwrap_err();
    assert!(matches!(err, BindError::Config(_)));
}

// ============================================================================
// Widgets inside forms
// ============================================================================

#[test]
fn picked_date_revalidates_the_calendar_field() {
    init_tracing();
    let page = Page::new();
    let form_node = page.form();
    let settings = FormSettings::default().with_active(true);
    let att = FormController::attach(page.host(), form_node, settings).unwrap();
    let cal = page.widget(form_node, WidgetKind::Calendar, "start", &[]);
    let _field = FieldController::attach(page.host(), cal, Some(empty().into())).unwrap();
    let store = Observable::new(TypedValue::Undefined);
    let _binding = calendar::attach(page.host(), cal, store.clone(), Default::default()).unwrap();
    page.flush();
    assert!(att.controller().has_rule("calendar_start"));
    assert!(!att.controller().valid().get());

    let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
    page.widgets().user_change(cal, WidgetKind::Calendar, TypedValue::Date(date));
    assert_eq!(store.get(), TypedValue::Date(date));
    assert!(att.controller().dirty().get());
    page.flush();
    assert!(att.controller().valid().get());

    let label = page.label_of(cal).unwrap();
    page.click(label);
    assert!(page.widgets().widget(cal, WidgetKind::Calendar).unwrap().is_active());
}

#[test]
fn checkbox_in_form_toggles_from_its_label() {
    let page = Page::new();
    let form_node = page.form();
    let _att = FormController::attach(page.host(), form_node, FormSettings::default()).unwrap();
    let attrs = [("type", "checkbox"), ("name", "terms")];
    let node = page.widget(form_node, WidgetKind::Checkbox, "terms", &attrs);
    let store = Observable::new(TypedValue::Bool(false));
    let _binding = checkbox::attach(page.host(), node, store.clone(), Default::default()).unwrap();

    let label = page.label_of(node).unwrap();
    page.click(label);
    assert_eq!(store.get(), TypedValue::Bool(true));
    let engine = page.widgets().form(form_node).unwrap();
    assert_eq!(engine.field_value("terms"), TypedValue::Bool(true));
    page.click(label);
    assert_eq!(store.get(), TypedValue::Bool(false));
}
