//! Calendar adapter.
//!
//! The store holds a [`TypedValue::Date`]. The display pattern depends on the
//! calendar mode and defaults to the current locale's date and time patterns.
//! Text payloads are parsed with that pattern; text that does not parse keeps
//! the previous date.

use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use wirebind_core::{NodeId, TypedValue};
use wirebind_i18n::{ConfigError, DateFormat, Format, FormatError, LocaleTable};
use wirebind_runtime::Observable;

use super::{AttachSpec, Attachment, LabelAction, attach_with, inner_input};
use crate::controller::{WidgetSync, mismatch};
use crate::error::BindError;
use crate::host::Host;
use crate::native::{Command, NativeHandler, NativeWidget, WidgetEvent, WidgetKind};

/// Which parts of the date the calendar edits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum CalendarMode {
    #[default]
    Date,
    Time,
    DateTime,
}

impl FromStr for CalendarMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "date" => Ok(Self::Date),
            "time" => Ok(Self::Time),
            "datetime" => Ok(Self::DateTime),
            other => Err(ConfigError::Unsupported {
                what: "calendar type",
                tag: other.to_owned(),
            }),
        }
    }
}

#[derive(Clone, Default)]
pub struct CalendarSettings {
    pub mode: CalendarMode,
    /// Display pattern; the locale pattern for `mode` when unset.
    pub pattern: Option<String>,
    pub on_change: Option<NativeHandler>,
}

impl fmt::Debug for CalendarSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CalendarSettings")
            .field("mode", &self.mode)
            .field("pattern", &self.pattern)
            .field("on_change", &self.on_change.is_some())
            .finish()
    }
}

impl CalendarSettings {
    #[must_use]
    pub fn with_mode(mut self, mode: CalendarMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    #[must_use]
    pub fn with_on_change(mut self, callback: impl Fn(&TypedValue) + 'static) -> Self {
        self.on_change = Some(Rc::new(callback));
        self
    }

    /// The pattern in effect for `locale`.
    #[must_use]
    pub fn resolve_pattern(&self, locale: &LocaleTable) -> String {
        if let Some(pattern) = &self.pattern {
            return pattern.clone();
        }
        match self.mode {
            CalendarMode::Date => locale.date.date_pattern.clone(),
            CalendarMode::Time => locale.date.time_pattern.clone(),
            CalendarMode::DateTime => {
                format!("{} {}", locale.date.date_pattern, locale.date.time_pattern)
            }
        }
    }
}

struct CalendarSync {
    native: Rc<dyn NativeWidget>,
    format: DateFormat,
}

impl WidgetSync for CalendarSync {
    fn read(&self) -> TypedValue {
        match self.native.invoke(Command::GetDate) {
            value @ TypedValue::Date(_) => value,
            _ => TypedValue::Undefined,
        }
    }

    fn write(&self, value: &TypedValue) -> Result<(), FormatError> {
        match value {
            TypedValue::Date(date) => {
                self.native.invoke(Command::SetDate(Some(*date)));
                Ok(())
            }
            TypedValue::Undefined => {
                self.native.invoke(Command::Clear);
                Ok(())
            }
            other => Err(mismatch(WidgetKind::Calendar, "date", other)),
        }
    }

    fn decode(&self, native: &TypedValue) -> Option<TypedValue> {
        match native {
            TypedValue::Date(_) | TypedValue::Undefined => Some(native.clone()),
            TypedValue::Text(text) => {
                let parsed = self.format.parse(text);
                (!parsed.is_undefined() || text.trim().is_empty()).then_some(parsed)
            }
            _ => None,
        }
    }

    fn describe(&self, value: &TypedValue) -> String {
        self.format.format(value).unwrap_or_else(|_| value.to_string())
    }
}

/// Bind `store` to the calendar on `node`.
pub fn attach(
    host: &Host,
    node: NodeId,
    store: Observable<TypedValue>,
    settings: CalendarSettings,
) -> Result<Attachment, BindError> {
    let native = host.native(node, WidgetKind::Calendar)?;
    let locale = host.defaults().current();
    let format = DateFormat::new(settings.resolve_pattern(&locale), locale.date.clone())?;
    let field = inner_input(host.dom(), node).unwrap_or(node);
    attach_with(
        host,
        store,
        AttachSpec {
            kind: WidgetKind::Calendar,
            node,
            field,
            sync: Box::new(CalendarSync {
                native: Rc::clone(&native),
                format,
            }),
            native: Some(native),
            events: &[WidgetEvent::Change],
            dom_event: None,
            on_change: settings.on_change,
            label: Some(LabelAction::Show),
            owned_nodes: Vec::new(),
            relocates: false,
        },
    )
}
