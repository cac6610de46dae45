#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use wirebind_core::TypedValue;
use wirebind_i18n::{Format, Formatter, FormatterSettings, LocaleTable, builtin_tables};

#[derive(Debug, Arbitrary)]
struct Input {
    kind: u8,
    locale: u8,
    precision: i8,
    text: String,
}

const KINDS: [&str; 5] = ["number", "money", "text", "list", "date"];

fuzz_target!(|input: Input| {
    let tables = builtin_tables();
    let table: LocaleTable = tables[usize::from(input.locale) % tables.len()].clone();
    let kind = KINDS[usize::from(input.kind) % KINDS.len()];
    let settings = FormatterSettings::new(kind).with_precision(i32::from(input.precision));
    let Ok(formatter) = Formatter::from_settings(&settings, &table) else {
        return;
    };

    // Parsing never panics; whatever it accepts must format again.
    let parsed = formatter.parse(&input.text);
    if matches!(parsed, TypedValue::Undefined) {
        return;
    }
    let _ = formatter.format(&parsed);
});
