#![no_main]

use libfuzzer_sys::fuzz_target;
use wirebind_i18n::{DateFormat, DateLocale, Format, parse_by_pattern};

fuzz_target!(|data: (&str, &str)| {
    let (pattern, text) = data;
    let Ok(format) = DateFormat::new(pattern, DateLocale::default()) else {
        return;
    };
    let _ = parse_by_pattern(text, &format);
    let parsed = format.parse(text);
    let _ = format.format(&parsed);
});
