//! Rule evaluation for the headless form engine.
//!
//! Values are evaluated as the text a form field holds; checkbox fields hold
//! `Bool`. Unknown rule names pass with a warning, matching engines that
//! ignore rules they do not know.

use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};
use tracing::warn;
use wirebind_core::TypedValue;

use super::rules::Rule;

static EMAIL: LazyLock<Option<Regex>> = LazyLock::new(|| {
    RegexBuilder::new(r"^[a-z0-9!#$%&'*+/=?^_`{|}~.-]+@[a-z0-9]([a-z0-9-]*[a-z0-9])?(\.[a-z0-9]([a-z0-9-]*[a-z0-9])?)+$")
        .case_insensitive(true)
        .build()
        .ok()
});
static URL: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^(https?|ftp)://[^\s/$.?#][^\s]*$").ok());
static INTEGER: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"^-?\d+$").ok());
static DECIMAL: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^-?(\d+(\.\d+)?|\.\d+)$").ok());
static NUMBER: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^-?(\d+\.?\d*|\.\d+)([eE][-+]?\d+)?$").ok());

fn matches(re: &LazyLock<Option<Regex>>, text: &str) -> bool {
    re.as_ref().is_some_and(|re| re.is_match(text))
}

/// Outcome of one rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    Fail,
    /// Not in the vocabulary; treated as passing.
    Unknown,
}

impl Verdict {
    #[must_use]
    pub const fn passed(&self) -> bool {
        !matches!(self, Self::Fail)
    }

    fn from_bool(ok: bool) -> Self {
        if ok { Self::Pass } else { Self::Fail }
    }
}

/// Evaluate `rule` against `value`. `lookup` answers other fields' values
/// for `match`/`different`.
pub fn evaluate(rule: &Rule, value: &TypedValue, lookup: &dyn Fn(&str) -> TypedValue) -> Verdict {
    let text = value.to_input_text();
    let text = text.trim();
    let arg = rule.argument().unwrap_or("");
    let verdict = match rule.name() {
        "empty" => Verdict::from_bool(!value.is_empty()),
        "checked" => Verdict::from_bool(match value {
            TypedValue::Bool(b) => *b,
            other => matches!(other.as_text(), Some("on" | "true")),
        }),
        "email" => Verdict::from_bool(matches(&EMAIL, text)),
        "url" => Verdict::from_bool(matches(&URL, text)),
        "integer" => Verdict::from_bool(matches(&INTEGER, text) && in_range(text, arg)),
        "decimal" => Verdict::from_bool(matches(&DECIMAL, text)),
        "number" => Verdict::from_bool(matches(&NUMBER, text)),
        "regExp" => Verdict::from_bool(reg_exp(arg).is_some_and(|re| re.is_match(text))),
        "creditCard" => Verdict::from_bool(credit_card(text, arg)),
        "is" => Verdict::from_bool(text.to_lowercase() == arg.to_lowercase()),
        "isExactly" => Verdict::from_bool(text == arg),
        "not" => Verdict::from_bool(text.to_lowercase() != arg.to_lowercase()),
        "notExactly" => Verdict::from_bool(text != arg),
        "contains" | "contain" => {
            Verdict::from_bool(text.to_lowercase().contains(&arg.to_lowercase()))
        }
        "containsExactly" | "containExactly" => Verdict::from_bool(text.contains(arg)),
        "doesntContain" => {
            Verdict::from_bool(!text.to_lowercase().contains(&arg.to_lowercase()))
        }
        "doesntContainExactly" => Verdict::from_bool(!text.contains(arg)),
        "minLength" => length_rule(text, arg, |len, n| len >= n),
        "maxLength" => length_rule(text, arg, |len, n| len <= n),
        "exactLength" => length_rule(text, arg, |len, n| len == n),
        "match" => Verdict::from_bool(lookup(arg).to_input_text().trim() == text),
        "different" => Verdict::from_bool(lookup(arg).to_input_text().trim() != text),
        "minCount" => count_rule(value, arg, |count, n| count >= n),
        "maxCount" => count_rule(value, arg, |count, n| count <= n),
        "exactCount" => count_rule(value, arg, |count, n| count == n),
        _ => Verdict::Unknown,
    };
    if verdict == Verdict::Unknown {
        warn!(rule = %rule.kind, "unknown validation rule ignored");
    }
    verdict
}

/// Default error prompt for `rule` on field `name`.
#[must_use]
pub fn prompt_for(rule: &Rule, name: &str, value: &TypedValue) -> String {
    let arg = rule.argument().unwrap_or("");
    let template = match &rule.prompt {
        Some(custom) => custom.as_str(),
        None => default_prompt(rule.name()),
    };
    template
        .replace("{name}", name)
        .replace("{ruleValue}", arg)
        .replace("{value}", value.to_input_text().trim())
}

fn default_prompt(name: &str) -> &'static str {
    match name {
        "empty" => "{name} must have a value",
        "checked" => "{name} must be checked",
        "email" => "{name} must be a valid e-mail",
        "url" => "{name} must be a valid url",
        "regExp" => "{name} is not formatted correctly",
        "integer" => "{name} must be an integer",
        "decimal" => "{name} must be a decimal number",
        "number" => "{name} must be set to a number",
        "is" => "{name} must be \"{ruleValue}\"",
        "isExactly" => "{name} must be exactly \"{ruleValue}\"",
        "not" => "{name} cannot be set to \"{ruleValue}\"",
        "notExactly" => "{name} cannot be set to exactly \"{ruleValue}\"",
        "contains" | "contain" => "{name} must contain \"{ruleValue}\"",
        "containsExactly" | "containExactly" => "{name} must contain exactly \"{ruleValue}\"",
        "doesntContain" => "{name} cannot contain \"{ruleValue}\"",
        "doesntContainExactly" => "{name} cannot contain exactly \"{ruleValue}\"",
        "minLength" => "{name} must be at least {ruleValue} characters",
        "maxLength" => "{name} cannot be longer than {ruleValue} characters",
        "exactLength" => "{name} must be exactly {ruleValue} characters",
        "match" => "{name} must match {ruleValue} field",
        "different" => "{name} must have a different value than {ruleValue} field",
        "creditCard" => "{name} must be a valid credit card number",
        "minCount" => "{name} must have at least {ruleValue} choices",
        "maxCount" => "{name} must have {ruleValue} or less choices",
        "exactCount" => "{name} must have exactly {ruleValue} choices",
        _ => "{name} is invalid",
    }
}

fn length_rule(text: &str, arg: &str, check: impl Fn(usize, usize) -> bool) -> Verdict {
    match arg.trim().parse::<usize>() {
        Ok(n) => Verdict::from_bool(check(text.chars().count(), n)),
        Err(_) => Verdict::Unknown,
    }
}

fn count_rule(value: &TypedValue, arg: &str, check: impl Fn(usize, usize) -> bool) -> Verdict {
    let count = match value {
        TypedValue::List(items) => items.len(),
        other => other
            .to_input_text()
            .split(',')
            .filter(|s| !s.trim().is_empty())
            .count(),
    };
    match arg.trim().parse::<usize>() {
        Ok(n) => Verdict::from_bool(check(count, n)),
        Err(_) => Verdict::Unknown,
    }
}

/// `integer[min..max]` bounds; no argument means unbounded.
fn in_range(text: &str, arg: &str) -> bool {
    let Some((min, max)) = arg.split_once("..") else {
        return true;
    };
    let Ok(n) = text.parse::<i64>() else {
        return false;
    };
    let above_min = min.trim().parse::<i64>().map_or(true, |min| n >= min);
    let below_max = max.trim().parse::<i64>().map_or(true, |max| n <= max);
    above_min && below_max
}

/// Compile `/pattern/flags`; a bare pattern is accepted too.
fn reg_exp(arg: &str) -> Option<Regex> {
    let (pattern, flags) = match arg.strip_prefix('/').and_then(|rest| rest.rsplit_once('/')) {
        Some((pattern, flags)) => (pattern, flags),
        None => (arg, ""),
    };
    let built = RegexBuilder::new(pattern)
        .case_insensitive(flags.contains('i'))
        .multi_line(flags.contains('m'))
        .dot_matches_new_line(flags.contains('s'))
        .build();
    match built {
        Ok(re) => Some(re),
        Err(err) => {
            warn!(pattern, %err, "invalid regExp rule");
            None
        }
    }
}

/// Luhn checksum plus an optional card-type prefix filter.
fn credit_card(text: &str, types: &str) -> bool {
    let digits: Vec<u32> = text
        .chars()
        .filter(|c| !matches!(c, ' ' | '-'))
        .map(|c| c.to_digit(10))
        .collect::<Option<_>>()
        .unwrap_or_default();
    if !(12..=19).contains(&digits.len()) {
        return false;
    }
    let sum: u32 = digits
        .iter()
        .rev()
        .enumerate()
        .map(|(i, d)| {
            if i % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 { doubled - 9 } else { doubled }
            } else {
                *d
            }
        })
        .sum();
    if sum % 10 != 0 {
        return false;
    }
    if types.trim().is_empty() {
        return true;
    }
    let number: String = digits.iter().filter_map(|d| char::from_digit(*d, 10)).collect();
    types
        .split(',')
        .any(|t| card_prefix_matches(t.trim(), &number))
}

fn card_prefix_matches(card_type: &str, number: &str) -> bool {
    let starts = |prefixes: &[&str]| prefixes.iter().any(|p| number.starts_with(p));
    match card_type {
        "visa" => starts(&["4"]),
        "amex" => starts(&["34", "37"]),
        "mastercard" => {
            starts(&["51", "52", "53", "54", "55", "22", "23", "24", "25", "26", "27"])
        }
        "discover" => starts(&["6011", "65", "644", "645", "646", "647", "648", "649"]),
        "jcb" => starts(&["35"]),
        "dinersClub" => starts(&["300", "301", "302", "303", "304", "305", "36", "38"]),
        "unionPay" => starts(&["62"]),
        "maestro" => starts(&["5018", "5020", "5038", "6304", "6759", "6761", "6762", "6763"]),
        _ => false,
    }
}
