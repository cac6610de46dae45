//! Contract with the imperative widget library.
//!
//! The library owns widget state; adapters only talk to it through
//! [`NativeWidget::invoke`] with a typed [`Command`], and receive its
//! change/shown/hidden callbacks through [`NativeWidget::listen`].
//! [`WidgetLibrary::handle`] answers `None` when the library was never
//! bootstrapped on a node, which adapters report as
//! [`BindError::NotInitialized`](crate::BindError::NotInitialized).

use core::fmt;
use std::rc::Rc;

use chrono::NaiveDateTime;
use wirebind_core::{ListenerId, NodeId, TypedValue};

use crate::validation::RuleDefinition;

/// Widget kinds the library provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum WidgetKind {
    Calendar,
    Dropdown,
    Modal,
    Slider,
    Input,
    Checkbox,
    Form,
}

impl WidgetKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Calendar => "calendar",
            Self::Dropdown => "dropdown",
            Self::Modal => "modal",
            Self::Slider => "slider",
            Self::Input => "input",
            Self::Checkbox => "checkbox",
            Self::Form => "form",
        }
    }
}

impl fmt::Display for WidgetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Callbacks a native widget can raise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WidgetEvent {
    /// The widget's value changed (user input or a `set` command).
    Change,
    /// A modal finished showing.
    Shown,
    /// A modal finished hiding.
    Hidden,
}

/// Commands understood by native widgets.
///
/// `Display` renders the library's own command name.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    GetValue,
    SetValue(TypedValue),
    /// Replace a dropdown's selection with exactly these values.
    SetExactly(Vec<String>),
    /// Add values to a dropdown's selection.
    SetSelected(Vec<String>),
    Clear,
    GetDate,
    SetDate(Option<NaiveDateTime>),
    Show,
    Hide,
    IsActive,
    IsChecked,
    Check,
    Uncheck,
    AddRule { field: String, rules: RuleDefinition },
    /// Drop every rule of a field. The engine cannot remove single rules.
    RemoveField(String),
    ValidateForm,
    ValidateField(String),
    IsValid,
    GetErrors,
    GetFieldValue(String),
    /// Remove error classes, messages and inline prompts.
    ClearDecorations,
    SetAsClean,
}

impl Command {
    /// The library's command name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::GetValue => "get value",
            Self::SetValue(_) => "set value",
            Self::SetExactly(_) => "set exactly",
            Self::SetSelected(_) => "set selected",
            Self::Clear => "clear",
            Self::GetDate => "get date",
            Self::SetDate(_) => "set date",
            Self::Show => "show",
            Self::Hide => "hide",
            Self::IsActive => "is active",
            Self::IsChecked => "is checked",
            Self::Check => "check",
            Self::Uncheck => "uncheck",
            Self::AddRule { .. } => "add rule",
            Self::RemoveField(_) => "remove field",
            Self::ValidateForm => "validate form",
            Self::ValidateField(_) => "validate field",
            Self::IsValid => "is valid",
            Self::GetErrors => "get errors",
            Self::GetFieldValue(_) => "get value",
            Self::ClearDecorations => "remove errors",
            Self::SetAsClean => "set as clean",
        }
    }

    /// Whether the command changes widget state.
    #[must_use]
    pub const fn is_write(&self) -> bool {
        matches!(
            self,
            Self::SetValue(_)
                | Self::SetExactly(_)
                | Self::SetSelected(_)
                | Self::Clear
                | Self::SetDate(_)
                | Self::Show
                | Self::Hide
                | Self::Check
                | Self::Uncheck
        )
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Callback installed on a native widget event.
pub type NativeHandler = Rc<dyn Fn(&TypedValue)>;

/// One live widget instance.
pub trait NativeWidget {
    /// Run a command; queries answer through the returned value.
    fn invoke(&self, command: Command) -> TypedValue;

    /// Install `handler` for `event`.
    fn listen(&self, event: WidgetEvent, handler: NativeHandler) -> ListenerId;

    /// Remove a handler; `false` if it was not installed.
    fn unlisten(&self, listener: ListenerId) -> bool;
}

/// The widget library.
pub trait WidgetLibrary {
    /// Widget of `kind` bootstrapped on `node`, if any.
    fn handle(&self, node: NodeId, kind: WidgetKind) -> Option<Rc<dyn NativeWidget>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_names_match_library() {
        assert_eq!(Command::SetExactly(vec![]).to_string(), "set exactly");
        assert_eq!(Command::RemoveField("a".into()).to_string(), "remove field");
        assert_eq!(
            Command::AddRule {
                field: "a".into(),
                rules: RuleDefinition::from("empty"),
            }
            .to_string(),
            "add rule"
        );
    }

    #[test]
    fn writes_are_classified() {
        assert!(Command::SetExactly(vec![]).is_write());
        assert!(Command::Show.is_write());
        assert!(!Command::GetValue.is_write());
        assert!(!Command::ValidateForm.is_write());
    }

    #[test]
    fn kind_display() {
        assert_eq!(WidgetKind::Dropdown.to_string(), "dropdown");
        assert_eq!(WidgetKind::Form.as_str(), "form");
    }
}
