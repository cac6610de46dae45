//! Form validation: rule vocabulary, form and field controllers, and the
//! rule evaluator used by the headless engine.

mod evaluate;
mod field;
mod form;
pub mod rules;

pub use evaluate::{Verdict, evaluate, prompt_for};
pub use field::FieldController;
pub use form::{FormAttachment, FormController, FormSettings};
pub use rules::{Rule, RuleDefinition};
