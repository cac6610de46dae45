//! The typed value union bound between stores and widgets.
//!
//! # Invariants
//!
//! 1. **Structural equality**: lists compare element-wise in order, dates by
//!    epoch millisecond, everything else by value. There is no recursion past
//!    one level because values never nest.
//! 2. **`Undefined` means "no value"**: formatters return it for unparseable
//!    text and adapters treat it as "do not override".
//! 3. `PartialEq` for [`TypedValue`] is [`equal_typed`], so reactive cells
//!    holding a `TypedValue` skip notifications on structurally equal sets.

use chrono::NaiveDateTime;
use core::fmt;

/// A value exchanged between a reactive store, a widget and a formatter.
#[derive(Debug, Clone, Default)]
pub enum TypedValue {
    /// No value, or a value that could not be parsed.
    #[default]
    Undefined,
    /// Plain text.
    Text(String),
    /// Ordered list of strings (multi-select, list formatter).
    List(Vec<String>),
    /// Boolean flag (checkbox, modal visibility).
    Bool(bool),
    /// Local date and time.
    Date(NaiveDateTime),
    /// Floating point number.
    Number(f64),
}

impl TypedValue {
    /// Short variant name, used in type-mismatch errors and logs.
    #[must_use]
    pub const fn variant_name(&self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Text(_) => "text",
            Self::List(_) => "list",
            Self::Bool(_) => "bool",
            Self::Date(_) => "date",
            Self::Number(_) => "number",
        }
    }

    /// Whether this is [`TypedValue::Undefined`].
    #[must_use]
    pub const fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    /// Whether the value counts as "empty" for validation purposes.
    ///
    /// Undefined, blank text, empty lists and `false` are empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Undefined => true,
            Self::Text(s) => s.trim().is_empty(),
            Self::List(items) => items.is_empty(),
            Self::Bool(b) => !b,
            Self::Date(_) | Self::Number(_) => false,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_date(&self) -> Option<&NaiveDateTime> {
        match self {
            Self::Date(d) => Some(d),
            _ => None,
        }
    }

    /// Render the value as the text an `<input>` element would hold.
    ///
    /// Lists are joined with `,`, the way multi-select hidden inputs store
    /// them.
    #[must_use]
    pub fn to_input_text(&self) -> String {
        match self {
            Self::Undefined => String::new(),
            Self::Text(s) => s.clone(),
            Self::List(items) => items.join(","),
            Self::Bool(b) => b.to_string(),
            Self::Date(d) => d.format("%Y-%m-%d %H:%M:%S").to_string(),
            Self::Number(n) => n.to_string(),
        }
    }
}

/// Structural equality over [`TypedValue`].
///
/// Numbers use IEEE comparison, so `NaN` never equals itself.
#[must_use]
pub fn equal_typed(a: &TypedValue, b: &TypedValue) -> bool {
    match (a, b) {
        (TypedValue::Undefined, TypedValue::Undefined) => true,
        (TypedValue::Text(x), TypedValue::Text(y)) => x == y,
        (TypedValue::List(x), TypedValue::List(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(l, r)| l == r)
        }
        (TypedValue::Bool(x), TypedValue::Bool(y)) => x == y,
        (TypedValue::Date(x), TypedValue::Date(y)) => epoch_millis(x) == epoch_millis(y),
        (TypedValue::Number(x), TypedValue::Number(y)) => x == y,
        _ => false,
    }
}

/// Milliseconds since the Unix epoch, treating the naive value as UTC.
#[must_use]
pub fn epoch_millis(date: &NaiveDateTime) -> i64 {
    date.and_utc().timestamp_millis()
}

impl PartialEq for TypedValue {
    fn eq(&self, other: &Self) -> bool {
        equal_typed(self, other)
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undefined => write!(f, "undefined"),
            Self::Text(s) => write!(f, "{s:?}"),
            Self::List(items) => write!(f, "{items:?}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Date(d) => write!(f, "{}", d.format("%Y-%m-%dT%H:%M:%S%.3f")),
            Self::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for TypedValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<String> for TypedValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<Vec<String>> for TypedValue {
    fn from(items: Vec<String>) -> Self {
        Self::List(items)
    }
}

impl From<&[&str]> for TypedValue {
    fn from(items: &[&str]) -> Self {
        Self::List(items.iter().map(|s| (*s).to_owned()).collect())
    }
}

impl From<bool> for TypedValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<f64> for TypedValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<NaiveDateTime> for TypedValue {
    fn from(d: NaiveDateTime) -> Self {
        Self::Date(d)
    }
}

impl<T: Into<TypedValue>> From<Option<T>> for TypedValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Undefined, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn lists_compare_in_order() {
        let ab = TypedValue::from(&["a", "b"][..]);
        let ba = TypedValue::from(&["b", "a"][..]);
        assert!(equal_typed(&ab, &ab.clone()));
        assert!(!equal_typed(&ab, &ba));
        assert!(!equal_typed(&ab, &TypedValue::from(&["a"][..])));
    }

    #[test]
    fn dates_compare_by_millisecond() {
        let a = date(2024, 3, 1);
        let b = a + chrono::Duration::microseconds(300);
        assert!(equal_typed(&a.into(), &b.into()));
        let c = a + chrono::Duration::milliseconds(1);
        assert!(!equal_typed(&a.into(), &c.into()));
    }

    #[test]
    fn variants_never_cross_compare() {
        assert!(!equal_typed(&TypedValue::from("1"), &TypedValue::from(1.0)));
        assert!(!equal_typed(&TypedValue::Undefined, &TypedValue::from("")));
        assert!(!equal_typed(&TypedValue::from(false), &TypedValue::Undefined));
    }

    #[test]
    fn nan_is_not_equal_to_itself() {
        let nan = TypedValue::from(f64::NAN);
        assert!(!equal_typed(&nan, &nan));
    }

    #[test]
    fn emptiness() {
        assert!(TypedValue::Undefined.is_empty());
        assert!(TypedValue::from("  ").is_empty());
        assert!(TypedValue::List(Vec::new()).is_empty());
        assert!(TypedValue::from(false).is_empty());
        assert!(!TypedValue::from(0.0).is_empty());
        assert!(!TypedValue::from("x").is_empty());
    }

    #[test]
    fn option_conversion() {
        assert!(TypedValue::from(None::<f64>).is_undefined());
        assert_eq!(TypedValue::from(Some(2.5)), TypedValue::Number(2.5));
    }

    #[test]
    fn input_text_joins_lists() {
        assert_eq!(TypedValue::from(&["a", "c"][..]).to_input_text(), "a,c");
        assert_eq!(TypedValue::Undefined.to_input_text(), "");
    }

    mod laws {
        use super::*;
        use chrono::DateTime;
        use proptest::collection::vec;
        use proptest::prelude::*;

        fn value() -> impl Strategy<Value = TypedValue> {
            prop_oneof![
                Just(TypedValue::Undefined),
                any::<bool>().prop_map(TypedValue::Bool),
                (-1e9f64..1e9).prop_map(TypedValue::Number),
                "[ -~]{0,8}".prop_map(TypedValue::Text),
                vec("[a-z]{1,4}", 0..4).prop_map(TypedValue::List),
                (0i64..4_000_000_000_000).prop_map(|ms| {
                    let at = DateTime::from_timestamp_millis(ms).unwrap_or_default();
                    TypedValue::Date(at.naive_utc())
                }),
            ]
        }

        proptest! {
            #[test]
            fn equality_is_reflexive(a in value()) {
                prop_assert!(equal_typed(&a, &a));
                prop_assert!(equal_typed(&a, &a.clone()));
            }

            #[test]
            fn equality_is_symmetric(a in value(), b in value()) {
                prop_assert_eq!(equal_typed(&a, &b), equal_typed(&b, &a));
            }

            #[test]
            fn lists_compare_item_by_item(a in vec("[a-c]", 0..3), b in vec("[a-c]", 0..3)) {
                let same = a == b;
                prop_assert_eq!(TypedValue::List(a) == TypedValue::List(b), same);
            }
        }
    }
}
