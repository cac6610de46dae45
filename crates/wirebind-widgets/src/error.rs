//! Initialization errors.
//!
//! Everything here is a markup or wiring mistake, reported synchronously at
//! attach time. Unparseable input and failed validation are data, not
//! errors, and never show up in this type.

use thiserror::Error;
use wirebind_core::NodeId;
use wirebind_i18n::{ConfigError, FormatError};

use crate::native::WidgetKind;

#[derive(Debug, Error)]
pub enum BindError {
    /// The widget library was never bootstrapped on the node.
    #[error("{kind} widget is not initialized on node {node}")]
    NotInitialized { kind: WidgetKind, node: NodeId },
    /// The field has no input, select or textarea inside it.
    #[error("no input element found in field {node}")]
    MissingInput { node: NodeId },
    /// A field with rules is not inside any form.
    #[error("validated field {key:?} is not inside a form")]
    OutsideForm { key: String },
    /// The enclosing form has no form controller attached.
    #[error("form {form} has no form controller attached")]
    FormControllerMissing { form: NodeId },
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Format(#[from] FormatError),
}
