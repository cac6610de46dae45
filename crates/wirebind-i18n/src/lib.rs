#![forbid(unsafe_code)]

//! Locale tables and typed formatters for wirebind.
//!
//! A [`LocaleTable`] carries separators, money markers and calendar text.
//! Formatters built from a table convert between [`TypedValue`] and display
//! text:
//!
//! ```
//! use wirebind_i18n::{Format, Formatter, FormatterSettings, LocaleRegistry};
//! use wirebind_core::TypedValue;
//!
//! let en = LocaleRegistry::with_builtin().resolve("en");
//! let money = Formatter::from_settings(&FormatterSettings::new("money"), &en).unwrap();
//! assert_eq!(money.format(&TypedValue::Number(1000.0)).unwrap(), "$1 000.00");
//! assert_eq!(money.parse("$1 000.00"), TypedValue::Number(1000.0));
//! assert!(money.parse("a lot").is_undefined());
//! ```
//!
//! [`TypedValue`]: wirebind_core::TypedValue

pub mod error;
pub mod format;
pub mod locale;

pub use error::{ConfigError, FormatError};
pub use format::{
    Case, Charset, DateFormat, DateParser, Format, Formatter, FormatterKind, FormatterSettings,
    MAX_PRECISION, MoneyFormat, NumberFormat, NumberSettings, TextFormat, TextSettings,
    parse_by_pattern, week_number,
};
pub use locale::{DateLocale, Locale, LocaleRegistry, LocaleTable, NumberLocale, builtin_tables};
