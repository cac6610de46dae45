//! Proptest strategies for bound values and markup names.

use proptest::collection::vec;
use proptest::prelude::*;
use wirebind_core::TypedValue;

/// Identifier usable as an `id` or `name` attribute.
pub fn field_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,11}"
}

/// Dropdown item values: no separators, no surrounding whitespace.
pub fn item() -> impl Strategy<Value = String> {
    "[a-z0-9]{1,6}"
}

/// Distinct items, in the order they were drawn.
pub fn selection(max: usize) -> impl Strategy<Value = Vec<String>> {
    vec(item(), 0..=max).prop_map(|mut items| {
        let mut seen = std::collections::BTreeSet::new();
        items.retain(|it| seen.insert(it.clone()));
        items
    })
}

/// Whole numbers in a range every formatter renders exactly.
pub fn whole_number() -> impl Strategy<Value = f64> {
    (-1_000_000_i64..1_000_000).prop_map(|n| n as f64)
}

/// Any store value a widget could be bound to.
pub fn typed_value() -> impl Strategy<Value = TypedValue> {
    prop_oneof![
        Just(TypedValue::Undefined),
        any::<bool>().prop_map(TypedValue::Bool),
        whole_number().prop_map(TypedValue::Number),
        "[ -~]{0,12}".prop_map(TypedValue::Text),
        selection(4).prop_map(TypedValue::List),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn selections_have_no_duplicates(items in selection(8)) {
            let unique: std::collections::BTreeSet<_> = items.iter().collect();
            prop_assert_eq!(unique.len(), items.len());
        }

        #[test]
        fn typed_values_equal_themselves(value in typed_value()) {
            prop_assert_eq!(value.clone(), value);
        }
    }
}
