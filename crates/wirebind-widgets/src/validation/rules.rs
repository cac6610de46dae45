//! Rule definitions and the rule vocabulary.
//!
//! Rule strings are the validation engine's own grammar: a name, optionally
//! followed by one bracketed argument (`minLength[8]`, `is[yes]`,
//! `regExp[/^[a-z]+$/i]`). The constructors here only build those strings;
//! they do not check that an argument makes sense.

use core::fmt;

/// One rule, optionally with a custom prompt.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rule {
    /// Rule string, e.g. `minLength[8]`.
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub kind: String,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub prompt: Option<String>,
}

impl Rule {
    #[must_use]
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            prompt: None,
        }
    }

    /// Attach a custom error prompt.
    #[must_use]
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    /// Name before the bracketed argument.
    #[must_use]
    pub fn name(&self) -> &str {
        match self.kind.find('[') {
            Some(open) => &self.kind[..open],
            None => &self.kind,
        }
    }

    /// Bracketed argument, if any.
    #[must_use]
    pub fn argument(&self) -> Option<&str> {
        let open = self.kind.find('[')?;
        let close = self.kind.rfind(']')?;
        (close > open).then(|| &self.kind[open + 1..close])
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.prompt {
            Some(prompt) => write!(f, "{{type: {:?}, prompt: {prompt:?}}}", self.kind),
            None => f.write_str(&self.kind),
        }
    }
}

impl From<&str> for Rule {
    fn from(kind: &str) -> Self {
        Self::new(kind)
    }
}

impl From<String> for Rule {
    fn from(kind: String) -> Self {
        Self::new(kind)
    }
}

/// A field's rules: one rule or an ordered list.
///
/// Order only affects the order in which failures are reported.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum RuleDefinition {
    One(Rule),
    Many(Vec<Rule>),
}

impl RuleDefinition {
    /// All rules in order.
    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        match self {
            Self::One(rule) => std::slice::from_ref(rule),
            Self::Many(rules) => rules,
        }
    }

    /// Whether there is nothing to enforce.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules().is_empty()
    }

    /// `None` for an empty definition.
    #[must_use]
    pub fn non_empty(self) -> Option<Self> {
        (!self.is_empty()).then_some(self)
    }
}

impl fmt::Display for RuleDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::One(rule) => write!(f, "{rule}"),
            Self::Many(rules) => {
                f.write_str("[")?;
                for (i, rule) in rules.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{rule}")?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<Rule> for RuleDefinition {
    fn from(rule: Rule) -> Self {
        Self::One(rule)
    }
}

impl From<&str> for RuleDefinition {
    fn from(kind: &str) -> Self {
        Self::One(Rule::new(kind))
    }
}

impl From<Vec<Rule>> for RuleDefinition {
    fn from(rules: Vec<Rule>) -> Self {
        Self::Many(rules)
    }
}

impl<const N: usize> From<[Rule; N]> for RuleDefinition {
    fn from(rules: [Rule; N]) -> Self {
        Self::Many(rules.into())
    }
}

// ---------------------------------------------------------------------------
// Vocabulary
// ---------------------------------------------------------------------------

fn with_arg(name: &str, arg: impl fmt::Display) -> Rule {
    Rule::new(format!("{name}[{arg}]"))
}

#[must_use]
pub fn empty() -> Rule {
    Rule::new("empty")
}

#[must_use]
pub fn checked() -> Rule {
    Rule::new("checked")
}

#[must_use]
pub fn email() -> Rule {
    Rule::new("email")
}

#[must_use]
pub fn url() -> Rule {
    Rule::new("url")
}

#[must_use]
pub fn integer() -> Rule {
    Rule::new("integer")
}

/// Integer within `min..=max`.
#[must_use]
pub fn integer_range(min: i64, max: i64) -> Rule {
    with_arg("integer", format_args!("{min}..{max}"))
}

#[must_use]
pub fn decimal() -> Rule {
    Rule::new("decimal")
}

#[must_use]
pub fn number() -> Rule {
    Rule::new("number")
}

/// Regular expression rule, e.g. `reg_exp("^[a-z]+$", "i")`.
#[must_use]
pub fn reg_exp(pattern: &str, flags: &str) -> Rule {
    with_arg("regExp", format_args!("/{pattern}/{flags}"))
}

#[must_use]
pub fn credit_card() -> Rule {
    Rule::new("creditCard")
}

/// Credit card restricted to card types such as `visa` or `amex`.
#[must_use]
pub fn credit_card_types(types: &[&str]) -> Rule {
    with_arg("creditCard", types.join(","))
}

/// Case-insensitive equality.
#[must_use]
pub fn is(value: &str) -> Rule {
    with_arg("is", value)
}

#[must_use]
pub fn is_exactly(value: &str) -> Rule {
    with_arg("isExactly", value)
}

/// Case-insensitive inequality.
#[must_use]
pub fn not(value: &str) -> Rule {
    with_arg("not", value)
}

#[must_use]
pub fn not_exactly(value: &str) -> Rule {
    with_arg("notExactly", value)
}

#[must_use]
pub fn contains(value: &str) -> Rule {
    with_arg("contains", value)
}

#[must_use]
pub fn contains_exactly(value: &str) -> Rule {
    with_arg("containsExactly", value)
}

#[must_use]
pub fn doesnt_contain(value: &str) -> Rule {
    with_arg("doesntContain", value)
}

#[must_use]
pub fn min_length(n: usize) -> Rule {
    with_arg("minLength", n)
}

#[must_use]
pub fn max_length(n: usize) -> Rule {
    with_arg("maxLength", n)
}

#[must_use]
pub fn exact_length(n: usize) -> Rule {
    with_arg("exactLength", n)
}

/// Must equal the value of another field.
#[must_use]
pub fn match_field(field: &str) -> Rule {
    with_arg("match", field)
}

/// Must differ from the value of another field.
#[must_use]
pub fn different(field: &str) -> Rule {
    with_arg("different", field)
}

#[must_use]
pub fn min_count(n: usize) -> Rule {
    with_arg("minCount", n)
}

#[must_use]
pub fn max_count(n: usize) -> Rule {
    with_arg("maxCount", n)
}

#[must_use]
pub fn exact_count(n: usize) -> Rule {
    with_arg("exactCount", n)
}

/// `rule` with a custom prompt.
#[must_use]
pub fn prompted(rule: Rule, prompt: &str) -> Rule {
    rule.with_prompt(prompt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vocabulary_strings() {
        assert_eq!(min_length(8).kind, "minLength[8]");
        assert_eq!(reg_exp("^[a-z]+$", "i").kind, "regExp[/^[a-z]+$/i]");
        assert_eq!(integer_range(1, 10).kind, "integer[1..10]");
        assert_eq!(credit_card_types(&["visa", "amex"]).kind, "creditCard[visa,amex]");
        assert_eq!(match_field("password").kind, "match[password]");
        assert_eq!(doesnt_contain("x").kind, "doesntContain[x]");
    }

    #[test]
    fn name_and_argument() {
        let rule = reg_exp("a[b]c", "");
        assert_eq!(rule.name(), "regExp");
        assert_eq!(rule.argument(), Some("/a[b]c/"));
        assert_eq!(empty().name(), "empty");
        assert_eq!(empty().argument(), None);
    }

    #[test]
    fn definition_shapes() {
        let one = RuleDefinition::from("empty");
        assert_eq!(one.rules().len(), 1);
        let many = RuleDefinition::from([empty(), prompted(email(), "Need mail")]);
        assert_eq!(many.rules()[1].prompt.as_deref(), Some("Need mail"));
        assert!(RuleDefinition::Many(vec![]).is_empty());
        assert_eq!(RuleDefinition::Many(vec![]).non_empty(), None);
    }

    #[test]
    fn deep_equality_ignores_allocation() {
        let a = RuleDefinition::from(vec![empty(), prompted(min_length(3), "short")]);
        let b = RuleDefinition::from(vec![empty(), prompted(min_length(3), "short")]);
        assert_eq!(a, b);
        let c = RuleDefinition::from(vec![empty(), prompted(min_length(3), "too short")]);
        assert_ne!(a, c);
        assert_ne!(RuleDefinition::from("empty"), RuleDefinition::from(vec![empty()]));
    }

    #[test]
    fn display() {
        let def = RuleDefinition::from(vec![empty(), prompted(email(), "mail")]);
        assert_eq!(def.to_string(), r#"[empty, {type: "email", prompt: "mail"}]"#);
    }
}
