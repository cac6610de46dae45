//! Typed formatters.
//!
//! Every formatter converts between a [`TypedValue`] and the text a widget
//! displays. `format` is total over its own variant and `Undefined`; `parse`
//! never fails loudly and answers `Undefined` for unreadable text, meaning
//! "keep the current value".
//!
//! # Invariants
//!
//! 1. **Fail fast**: bad configuration is rejected by the constructor, never
//!    at first use.
//! 2. **Round trip**: `parse(format(v)) == v` for any `v` representable at
//!    the configured precision.
//! 3. **Stateless**: a built formatter holds only its configuration.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Precision out of range | `|precision| > 6` | `ConfigError::InvalidPrecision` |
//! | Unknown tag | kind / case / charset not recognised | `ConfigError::Unsupported` |
//! | Empty list separator | list mode with `""` | `ConfigError::EmptySeparator` |
//! | Wrong variant | binding wiring bug | `FormatError::TypeMismatch` |
//! | Unreadable text | user input | `TypedValue::Undefined` |

pub mod date;
pub mod number;
pub mod text;

use core::str::FromStr;

use wirebind_core::TypedValue;

use crate::error::{ConfigError, FormatError};
use crate::locale::LocaleTable;

pub use date::{DateFormat, DateParser, parse_by_pattern, week_number};
pub use number::{MAX_PRECISION, MoneyFormat, NumberFormat, NumberSettings};
pub use text::{Case, Charset, TextFormat, TextSettings};

/// The format/parse contract shared by all formatters.
pub trait Format {
    /// Render `value`; `Undefined` renders as the empty string.
    fn format(&self, value: &TypedValue) -> Result<String, FormatError>;

    /// Read `text`, answering `Undefined` when it cannot be parsed.
    fn parse(&self, text: &str) -> TypedValue;
}

/// Formatter kind selected by [`FormatterSettings::kind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatterKind {
    Number,
    Money,
    Text,
    List,
    Date,
}

impl FromStr for FormatterKind {
    type Err = ConfigError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "number" => Ok(Self::Number),
            "money" => Ok(Self::Money),
            "" | "text" | "string" => Ok(Self::Text),
            "list" => Ok(Self::List),
            "date" => Ok(Self::Date),
            _ => Err(ConfigError::Unsupported {
                what: "formatter",
                tag: tag.to_owned(),
            }),
        }
    }
}

/// Declarative formatter configuration.
///
/// Unset fields fall back to the locale table handed to
/// [`Formatter::from_settings`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FormatterSettings {
    /// `number`, `money`, `text`, `list` or `date`.
    pub kind: String,
    pub precision: Option<i32>,
    pub decimal_separator: Option<String>,
    pub thousand_separator: Option<String>,
    pub prefix: Option<String>,
    pub suffix: Option<String>,
    pub case: Option<String>,
    pub charset: Option<String>,
    pub max_length: Option<usize>,
    /// List separator.
    pub separator: Option<String>,
    /// Date pattern.
    pub pattern: Option<String>,
}

impl FormatterSettings {
    #[must_use]
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_precision(mut self, precision: i32) -> Self {
        self.precision = Some(precision);
        self
    }

    #[must_use]
    pub fn with_separators(
        mut self,
        decimal: impl Into<String>,
        thousand: impl Into<String>,
    ) -> Self {
        self.decimal_separator = Some(decimal.into());
        self.thousand_separator = Some(thousand.into());
        self
    }

    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    #[must_use]
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = Some(suffix.into());
        self
    }

    #[must_use]
    pub fn with_case(mut self, case: impl Into<String>) -> Self {
        self.case = Some(case.into());
        self
    }

    #[must_use]
    pub fn with_charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = Some(charset.into());
        self
    }

    #[must_use]
    pub fn with_max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    #[must_use]
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = Some(separator.into());
        self
    }

    #[must_use]
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    fn number_settings(&self, locale: &LocaleTable) -> NumberSettings {
        let mut settings = NumberSettings::from_locale(&locale.number);
        if let Some(precision) = self.precision {
            settings.precision = precision;
        }
        if let Some(decimal) = &self.decimal_separator {
            settings.decimal_separator.clone_from(decimal);
        }
        if let Some(thousand) = &self.thousand_separator {
            settings.thousand_separator.clone_from(thousand);
        }
        settings
    }

    fn text_settings(&self, list_separator: Option<String>) -> Result<TextSettings, ConfigError> {
        Ok(TextSettings {
            case: self.case.as_deref().map(str::parse).transpose()?.unwrap_or_default(),
            charset: self.charset.as_deref().map(str::parse).transpose()?,
            max_length: self.max_length,
            list_separator,
        })
    }
}

/// A built formatter of any kind.
#[derive(Debug, Clone)]
pub enum Formatter {
    Number(NumberFormat),
    Money(MoneyFormat),
    Text(TextFormat),
    Date(DateFormat),
}

impl Formatter {
    /// Build the formatter described by `settings`, defaulting unset fields
    /// from `locale`.
    pub fn from_settings(
        settings: &FormatterSettings,
        locale: &LocaleTable,
    ) -> Result<Self, ConfigError> {
        let kind: FormatterKind = settings.kind.parse()?;
        Ok(match kind {
            FormatterKind::Number => {
                Self::Number(NumberFormat::new(settings.number_settings(locale))?)
            }
            FormatterKind::Money => Self::Money(MoneyFormat::new(
                settings.number_settings(locale),
                settings.prefix.clone().unwrap_or_else(|| locale.number.money_prefix.clone()),
                settings.suffix.clone().unwrap_or_else(|| locale.number.money_suffix.clone()),
            )?),
            FormatterKind::Text => Self::Text(TextFormat::new(settings.text_settings(None)?)?),
            FormatterKind::List => {
                let separator = settings
                    .separator
                    .clone()
                    .unwrap_or_else(|| locale.number.list_separator.clone());
                Self::Text(TextFormat::new(settings.text_settings(Some(separator))?)?)
            }
            FormatterKind::Date => Self::Date(DateFormat::new(
                settings
                    .pattern
                    .clone()
                    .unwrap_or_else(|| locale.date.date_pattern.clone()),
                locale.date.clone(),
            )?),
        })
    }

    /// Kind name used in log fields.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Number(_) => "number",
            Self::Money(_) => "money",
            Self::Text(t) if t.is_list() => "list",
            Self::Text(_) => "text",
            Self::Date(_) => "date",
        }
    }
}

impl Format for Formatter {
    fn format(&self, value: &TypedValue) -> Result<String, FormatError> {
        match self {
            Self::Number(f) => f.format(value),
            Self::Money(f) => f.format(value),
            Self::Text(f) => f.format(value),
            Self::Date(f) => f.format(value),
        }
    }

    fn parse(&self, text: &str) -> TypedValue {
        match self {
            Self::Number(f) => f.parse(text),
            Self::Money(f) => f.parse(text),
            Self::Text(f) => f.parse(text),
            Self::Date(f) => f.parse(text),
        }
    }
}

impl From<NumberFormat> for Formatter {
    fn from(f: NumberFormat) -> Self {
        Self::Number(f)
    }
}

impl From<MoneyFormat> for Formatter {
    fn from(f: MoneyFormat) -> Self {
        Self::Money(f)
    }
}

impl From<TextFormat> for Formatter {
    fn from(f: TextFormat) -> Self {
        Self::Text(f)
    }
}

impl From<DateFormat> for Formatter {
    fn from(f: DateFormat) -> Self {
        Self::Date(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale::LocaleRegistry;

    fn table(tag: &str) -> LocaleTable {
        LocaleRegistry::with_builtin().resolve(tag)
    }

    #[test]
    fn kinds_from_settings() {
        let en = table("en");
        for (kind, name) in [
            ("number", "number"),
            ("money", "money"),
            ("text", "text"),
            ("list", "list"),
            ("date", "date"),
        ] {
            let f = Formatter::from_settings(&FormatterSettings::new(kind), &en).unwrap();
            assert_eq!(f.kind_name(), name);
        }
    }

    #[test]
    fn unknown_kind_fails_at_construction() {
        let err =
            Formatter::from_settings(&FormatterSettings::new("roman"), &table("en")).unwrap_err();
        assert!(matches!(err, ConfigError::Unsupported { what: "formatter", .. }));
    }

    #[test]
    fn bad_precision_fails_at_construction() {
        let err = Formatter::from_settings(
            &FormatterSettings::new("money").with_precision(7),
            &table("en"),
        )
        .unwrap_err();
        assert_eq!(err, ConfigError::InvalidPrecision(7));
    }

    #[test]
    fn bad_case_and_charset_fail() {
        let en = table("en");
        let build = |settings: FormatterSettings| Formatter::from_settings(&settings, &en);
        assert!(build(FormatterSettings::new("text").with_case("loud")).is_err());
        assert!(build(FormatterSettings::new("list").with_charset("emoji")).is_err());
        assert_eq!(
            build(FormatterSettings::new("list").with_separator("")).unwrap_err(),
            ConfigError::EmptySeparator
        );
    }

    #[test]
    fn money_uses_locale_markers() {
        let de = table("de");
        let f = Formatter::from_settings(&FormatterSettings::new("money"), &de).unwrap();
        assert_eq!(f.format(&TypedValue::Number(1234.5)).unwrap(), "1.234,50 €");
        assert_eq!(f.parse("1.234,50 €"), TypedValue::Number(1234.5));
    }

    #[test]
    fn explicit_settings_override_locale() {
        let f = Formatter::from_settings(
            &FormatterSettings::new("number")
                .with_precision(0)
                .with_separators(".", ","),
            &table("de"),
        )
        .unwrap();
        assert_eq!(f.format(&TypedValue::Number(1234.5)).unwrap(), "1,235");
    }

    #[test]
    fn list_separator_defaults_from_locale() {
        let f = Formatter::from_settings(&FormatterSettings::new("list"), &table("de")).unwrap();
        assert_eq!(f.format(&TypedValue::from(&["a", "b"][..])).unwrap(), "a; b");
    }

    #[test]
    fn date_pattern_defaults_from_locale() {
        let f = Formatter::from_settings(&FormatterSettings::new("date"), &table("de")).unwrap();
        let dt = chrono::NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(f.format(&dt.into()).unwrap(), "01.03.2024");
    }
}
