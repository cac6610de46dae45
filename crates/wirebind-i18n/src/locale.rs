//! Locale tables with fallback resolution.
//!
//! A [`LocaleTable`] is pure data: separators, money markers, month and day
//! names, am/pm markers, the first day of the week and default patterns.
//! [`LocaleRegistry`] stores tables and resolves a requested tag through an
//! exact match, then its language prefix, then the fallback chain.
//!
//! # Invariants
//!
//! 1. **Fallback chain terminates**: every lookup walks the chain once and
//!    returns `None` if no table matches.
//! 2. **Tables are replaced whole**: registering a tag twice replaces the
//!    earlier table; tables are never merged field by field.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Unknown tag | Locale not registered | Language prefix, then chain |
//! | Empty registry | No tables loaded | `resolve` returns the base table |
//! | Short name list | Table omits names | Number rendered instead |

use std::collections::HashMap;

use chrono::Weekday;

use crate::error::ConfigError;

/// Locale identifier (e.g., `"en"`, `"de-AT"`).
pub type Locale = String;

/// Number and money conventions.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NumberLocale {
    pub decimal_separator: String,
    pub thousand_separator: String,
    pub money_prefix: String,
    pub money_suffix: String,
    pub precision: i32,
    pub list_separator: String,
}

impl Default for NumberLocale {
    fn default() -> Self {
        Self {
            decimal_separator: ".".into(),
            thousand_separator: " ".into(),
            money_prefix: "$".into(),
            money_suffix: String::new(),
            precision: 2,
            list_separator: ", ".into(),
        }
    }
}

/// Calendar text and conventions.
///
/// Day name lists start on Sunday.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DateLocale {
    pub months: Vec<String>,
    pub months_short: Vec<String>,
    pub days: Vec<String>,
    pub days_short: Vec<String>,
    pub days_min: Vec<String>,
    pub am: String,
    pub pm: String,
    /// 0 = Sunday, 1 = Monday, ...
    pub first_day_of_week: u8,
    pub date_pattern: String,
    pub time_pattern: String,
}

impl Default for DateLocale {
    fn default() -> Self {
        Self {
            months: names(&[
                "January",
                "February",
                "March",
                "April",
                "May",
                "June",
                "July",
                "August",
                "September",
                "October",
                "November",
                "December",
            ]),
            months_short: names(&[
                "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
            ]),
            days: names(&[
                "Sunday",
                "Monday",
                "Tuesday",
                "Wednesday",
                "Thursday",
                "Friday",
                "Saturday",
            ]),
            days_short: names(&["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"]),
            days_min: names(&["Su", "Mo", "Tu", "We", "Th", "Fr", "Sa"]),
            am: "AM".into(),
            pm: "PM".into(),
            first_day_of_week: 0,
            date_pattern: "YYYY-MM-DD".into(),
            time_pattern: "HH:mm".into(),
        }
    }
}

impl DateLocale {
    /// Full month name for a 1-based month, or the number if absent.
    #[must_use]
    pub fn month_name(&self, month: u32) -> String {
        pick(&self.months, month.wrapping_sub(1), month)
    }

    /// Short month name for a 1-based month.
    #[must_use]
    pub fn month_short(&self, month: u32) -> String {
        pick(&self.months_short, month.wrapping_sub(1), month)
    }

    /// Day name for a weekday index counted from Sunday.
    #[must_use]
    pub fn day_name(&self, day: u32) -> String {
        pick(&self.days, day, day)
    }

    #[must_use]
    pub fn day_short(&self, day: u32) -> String {
        pick(&self.days_short, day, day)
    }

    #[must_use]
    pub fn day_min(&self, day: u32) -> String {
        pick(&self.days_min, day, day)
    }

    /// First day of the week as a [`Weekday`]; values above 6 wrap.
    #[must_use]
    pub fn first_weekday(&self) -> Weekday {
        match self.first_day_of_week % 7 {
            0 => Weekday::Sun,
            1 => Weekday::Mon,
            2 => Weekday::Tue,
            3 => Weekday::Wed,
            4 => Weekday::Thu,
            5 => Weekday::Fri,
            _ => Weekday::Sat,
        }
    }
}

fn pick(list: &[String], index: u32, fallback: u32) -> String {
    list.get(index as usize)
        .cloned()
        .unwrap_or_else(|| fallback.to_string())
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| (*s).to_owned()).collect()
}

/// Everything formatters need to know about one locale.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LocaleTable {
    pub tag: Locale,
    pub number: NumberLocale,
    pub date: DateLocale,
}

impl Default for LocaleTable {
    fn default() -> Self {
        Self {
            tag: "en".into(),
            number: NumberLocale::default(),
            date: DateLocale::default(),
        }
    }
}

impl LocaleTable {
    /// Base table tagged with `tag`.
    #[must_use]
    pub fn new(tag: impl Into<Locale>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    /// Parse a table from a TOML document.
    ///
    /// Missing keys take the base table's values.
    #[cfg(feature = "toml-config")]
    pub fn from_toml_str(doc: &str) -> Result<Self, ConfigError> {
        toml::from_str(doc).map_err(|e| ConfigError::InvalidLocale(e.to_string()))
    }

    /// Check the table for values no formatter could work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tag.trim().is_empty() {
            return Err(ConfigError::InvalidLocale("empty tag".into()));
        }
        if self.number.list_separator.is_empty() {
            return Err(ConfigError::EmptySeparator);
        }
        if self.number.decimal_separator.is_empty() {
            return Err(ConfigError::InvalidLocale(format!(
                "{}: empty decimal separator",
                self.tag
            )));
        }
        if self.number.precision.unsigned_abs() > 6 {
            return Err(ConfigError::InvalidPrecision(self.number.precision));
        }
        Ok(())
    }
}

/// Registry of locale tables with a fallback chain.
///
/// # Example
///
/// ```
/// use wirebind_i18n::locale::{LocaleRegistry, LocaleTable};
///
/// let registry = LocaleRegistry::with_builtin();
/// assert_eq!(registry.get("de-AT").map(|t| t.tag.as_str()), Some("de"));
/// assert_eq!(registry.resolve("xx").tag, "en");
/// ```
#[derive(Debug, Clone)]
pub struct LocaleRegistry {
    tables: HashMap<Locale, LocaleTable>,
    fallback_chain: Vec<Locale>,
}

impl Default for LocaleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl LocaleRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tables: HashMap::new(),
            fallback_chain: Vec::new(),
        }
    }

    /// Registry preloaded with the bundled tables and an `en` fallback.
    #[must_use]
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        for table in builtin_tables() {
            registry.add(table);
        }
        registry.set_fallback_chain(vec!["en".into()]);
        registry
    }

    /// Register a table under its own tag, replacing any previous one.
    pub fn add(&mut self, table: LocaleTable) {
        self.tables.insert(table.tag.clone(), table);
    }

    /// Set the chain tried, in order, when a tag has no table.
    pub fn set_fallback_chain(&mut self, chain: Vec<Locale>) {
        self.fallback_chain = chain;
    }

    /// Look up a table: exact tag, then language prefix, then the chain.
    #[must_use]
    pub fn get(&self, locale: &str) -> Option<&LocaleTable> {
        if let Some(table) = self.tables.get(locale) {
            return Some(table);
        }
        if let Some((language, _)) = locale.split_once('-') {
            if let Some(table) = self.tables.get(language) {
                return Some(table);
            }
        }
        self.fallback_chain
            .iter()
            .filter(|fallback| fallback.as_str() != locale)
            .find_map(|fallback| self.tables.get(fallback.as_str()))
    }

    /// Like [`get`](Self::get) but never fails: unknown tags get the base table.
    #[must_use]
    pub fn resolve(&self, locale: &str) -> LocaleTable {
        self.get(locale).cloned().unwrap_or_default()
    }

    /// All registered tags.
    #[must_use]
    pub fn locales(&self) -> Vec<&str> {
        self.tables.keys().map(String::as_str).collect()
    }
}

/// Tables shipped with the crate.
#[must_use]
pub fn builtin_tables() -> Vec<LocaleTable> {
    let en = LocaleTable::default();

    let mut en_us = LocaleTable::new("en-US");
    en_us.number.thousand_separator = ",".into();
    en_us.date.date_pattern = "MM/DD/YYYY".into();
    en_us.date.time_pattern = "h:mm A".into();

    let mut de = LocaleTable::new("de");
    de.number = NumberLocale {
        decimal_separator: ",".into(),
        thousand_separator: ".".into(),
        money_prefix: String::new(),
        money_suffix: " €".into(),
        precision: 2,
        list_separator: "; ".into(),
    };
    de.date = DateLocale {
        months: names(&[
            "Januar",
            "Februar",
            "März",
            "April",
            "Mai",
            "Juni",
            "Juli",
            "August",
            "September",
            "Oktober",
            "November",
            "Dezember",
        ]),
        months_short: names(&[
            "Jan", "Feb", "Mär", "Apr", "Mai", "Jun", "Jul", "Aug", "Sep", "Okt", "Nov", "Dez",
        ]),
        days: names(&[
            "Sonntag",
            "Montag",
            "Dienstag",
            "Mittwoch",
            "Donnerstag",
            "Freitag",
            "Samstag",
        ]),
        days_short: names(&["So", "Mo", "Di", "Mi", "Do", "Fr", "Sa"]),
        days_min: names(&["So", "Mo", "Di", "Mi", "Do", "Fr", "Sa"]),
        am: "AM".into(),
        pm: "PM".into(),
        first_day_of_week: 1,
        date_pattern: "DD.MM.YYYY".into(),
        time_pattern: "HH:mm".into(),
    };

    let mut fr = LocaleTable::new("fr");
    fr.number = NumberLocale {
        decimal_separator: ",".into(),
        thousand_separator: " ".into(),
        money_prefix: String::new(),
        money_suffix: " €".into(),
        precision: 2,
        list_separator: "; ".into(),
    };
    fr.date = DateLocale {
        months: names(&[
            "janvier",
            "février",
            "mars",
            "avril",
            "mai",
            "juin",
            "juillet",
            "août",
            "septembre",
            "octobre",
            "novembre",
            "décembre",
        ]),
        months_short: names(&[
            "janv.", "févr.", "mars", "avr.", "mai", "juin", "juil.", "août", "sept.", "oct.",
            "nov.", "déc.",
        ]),
        days: names(&[
            "dimanche", "lundi", "mardi", "mercredi", "jeudi", "vendredi", "samedi",
        ]),
        days_short: names(&["dim.", "lun.", "mar.", "mer.", "jeu.", "ven.", "sam."]),
        days_min: names(&["di", "lu", "ma", "me", "je", "ve", "sa"]),
        am: "AM".into(),
        pm: "PM".into(),
        first_day_of_week: 1,
        date_pattern: "DD/MM/YYYY".into(),
        time_pattern: "HH:mm".into(),
    };

    let mut ru = LocaleTable::new("ru");
    ru.number = NumberLocale {
        decimal_separator: ",".into(),
        thousand_separator: " ".into(),
        money_prefix: String::new(),
        money_suffix: " ₽".into(),
        precision: 2,
        list_separator: "; ".into(),
    };
    ru.date = DateLocale {
        months: names(&[
            "января",
            "февраля",
            "марта",
            "апреля",
            "мая",
            "июня",
            "июля",
            "августа",
            "сентября",
            "октября",
            "ноября",
            "декабря",
        ]),
        months_short: names(&[
            "янв", "фев", "мар", "апр", "мая", "июн", "июл", "авг", "сен", "окт", "ноя", "дек",
        ]),
        days: names(&[
            "воскресенье",
            "понедельник",
            "вторник",
            "среда",
            "четверг",
            "пятница",
            "суббота",
        ]),
        days_short: names(&["вс", "пн", "вт", "ср", "чт", "пт", "сб"]),
        days_min: names(&["вс", "пн", "вт", "ср", "чт", "пт", "сб"]),
        am: "AM".into(),
        pm: "PM".into(),
        first_day_of_week: 1,
        date_pattern: "DD.MM.YYYY".into(),
        time_pattern: "HH:mm".into(),
    };

    vec![en, en_us, de, fr, ru]
}
