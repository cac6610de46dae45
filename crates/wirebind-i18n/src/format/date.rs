//! Date formatting by pattern tokens.
//!
//! | Token | Output |
//! |-------|--------|
//! | `D` `DD` | day of month, plain / two digits |
//! | `M` `MM` | month number, plain / two digits |
//! | `MMM` `MMMM` | short / full month name |
//! | `Y` `YY` `YYYY` | year, plain / two digits / four digits |
//! | `d` | weekday number, Sunday = 0 |
//! | `dd` `ddd` `dddd` | min / short / full weekday name |
//! | `h` `hh` `H` `HH` | 12-hour / 24-hour clock |
//! | `m` `mm` `s` `ss` | minutes, seconds |
//! | `a` `A` | am/pm marker, lower / upper case |
//! | `S` | milliseconds, three digits |
//! | `w` `ww` | week of year |
//! | `[text]` | literal text |
//!
//! Week numbers follow the ISO 8601 scheme generalised to the locale's first
//! day of the week: a week belongs to the year that holds its fourth day, and
//! week 1 is the week containing the fourth day of that year. With Monday as
//! the first day this is exactly the ISO week.
//!
//! Parsing is delegated to a [`DateParser`]. Free-form date input is locale
//! specific, so locales may install their own; the default,
//! [`parse_by_pattern`], inverts numeric tokens, month names and am/pm
//! markers of the configured pattern.

use core::fmt;
use std::sync::Arc;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Weekday};
use wirebind_core::TypedValue;

use super::Format;
use super::number::mismatch;
use crate::error::{ConfigError, FormatError};
use crate::locale::DateLocale;

/// Locale-supplied date parser.
pub type DateParser = Arc<dyn Fn(&str, &DateFormat) -> Option<NaiveDateTime> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Day,
    Day2,
    Month,
    Month2,
    MonthShort,
    MonthLong,
    Year,
    Year2,
    Year4,
    Weekday,
    WeekdayMin,
    WeekdayShort,
    WeekdayLong,
    Hour12,
    Hour12Pad,
    Hour24,
    Hour24Pad,
    Minute,
    Minute2,
    Second,
    Second2,
    MeridiemLower,
    MeridiemUpper,
    Millis,
    Week,
    Week2,
}

/// Recognised tokens, longest first within each letter.
const TOKENS: &[(&str, Field)] = &[
    ("YYYY", Field::Year4),
    ("YY", Field::Year2),
    ("Y", Field::Year),
    ("MMMM", Field::MonthLong),
    ("MMM", Field::MonthShort),
    ("MM", Field::Month2),
    ("M", Field::Month),
    ("DD", Field::Day2),
    ("D", Field::Day),
    ("dddd", Field::WeekdayLong),
    ("ddd", Field::WeekdayShort),
    ("dd", Field::WeekdayMin),
    ("d", Field::Weekday),
    ("HH", Field::Hour24Pad),
    ("H", Field::Hour24),
    ("hh", Field::Hour12Pad),
    ("h", Field::Hour12),
    ("mm", Field::Minute2),
    ("m", Field::Minute),
    ("ss", Field::Second2),
    ("s", Field::Second),
    ("ww", Field::Week2),
    ("w", Field::Week),
    ("a", Field::MeridiemLower),
    ("A", Field::MeridiemUpper),
    ("S", Field::Millis),
];

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Literal(String),
    Field(Field),
}

fn tokenize(pattern: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut literal = String::new();
    let mut rest = pattern;
    while let Some(ch) = rest.chars().next() {
        if ch == '[' {
            if let Some(end) = rest.find(']') {
                literal.push_str(&rest[1..end]);
                rest = &rest[end + 1..];
                continue;
            }
        }
        if let Some((text, field)) = TOKENS.iter().find(|(text, _)| rest.starts_with(text)) {
            if !literal.is_empty() {
                tokens.push(Token::Literal(std::mem::take(&mut literal)));
            }
            tokens.push(Token::Field(*field));
            rest = &rest[text.len()..];
        } else {
            literal.push(ch);
            rest = &rest[ch.len_utf8()..];
        }
    }
    if !literal.is_empty() {
        tokens.push(Token::Literal(literal));
    }
    tokens
}

/// Week of the year for `date`, with weeks starting on `first_day`.
#[must_use]
pub fn week_number(date: NaiveDate, first_day: Weekday) -> u32 {
    let offset =
        (date.weekday().num_days_from_sunday() + 7 - first_day.num_days_from_sunday()) % 7;
    // At the ends of the calendar the anchor may not exist; count from the
    // date itself there.
    let anchor = date
        .checked_sub_signed(Duration::days(i64::from(offset)))
        .and_then(|week_start| week_start.checked_add_signed(Duration::days(3)))
        .unwrap_or(date);
    anchor.ordinal0() / 7 + 1
}

/// Formats `Date` values by pattern against a locale's calendar text.
#[derive(Clone)]
pub struct DateFormat {
    pattern: String,
    tokens: Vec<Token>,
    locale: DateLocale,
    parser: DateParser,
}

impl fmt::Debug for DateFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DateFormat")
            .field("pattern", &self.pattern)
            .field("first_day_of_week", &self.locale.first_day_of_week)
            .finish_non_exhaustive()
    }
}

impl DateFormat {
    /// Build a formatter for `pattern` using the default pattern parser.
    pub fn new(pattern: impl Into<String>, locale: DateLocale) -> Result<Self, ConfigError> {
        let pattern = pattern.into();
        let tokens = tokenize(&pattern);
        if tokens.is_empty() {
            return Err(ConfigError::EmptyPattern);
        }
        Ok(Self {
            pattern,
            tokens,
            locale,
            parser: Arc::new(parse_by_pattern),
        })
    }

    /// Replace the parser, e.g. with a locale's free-form parser.
    #[must_use]
    pub fn with_parser(mut self, parser: DateParser) -> Self {
        self.parser = parser;
        self
    }

    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    #[must_use]
    pub fn locale(&self) -> &DateLocale {
        &self.locale
    }

    /// Expand the pattern for `dt`.
    #[must_use]
    pub fn format_date(&self, dt: &NaiveDateTime) -> String {
        let mut out = String::with_capacity(self.pattern.len() + 8);
        for token in &self.tokens {
            match token {
                Token::Literal(text) => out.push_str(text),
                Token::Field(field) => out.push_str(&self.expand(*field, dt)),
            }
        }
        out
    }

    fn expand(&self, field: Field, dt: &NaiveDateTime) -> String {
        let loc = &self.locale;
        let weekday = dt.weekday().num_days_from_sunday();
        let hour12 = match dt.hour() % 12 {
            0 => 12,
            h => h,
        };
        let meridiem = if dt.hour() < 12 { &loc.am } else { &loc.pm };
        match field {
            Field::Day => dt.day().to_string(),
            Field::Day2 => format!("{:02}", dt.day()),
            Field::Month => dt.month().to_string(),
            Field::Month2 => format!("{:02}", dt.month()),
            Field::MonthShort => loc.month_short(dt.month()),
            Field::MonthLong => loc.month_name(dt.month()),
            Field::Year => dt.year().to_string(),
            Field::Year2 => format!("{:02}", dt.year().rem_euclid(100)),
            Field::Year4 => format!("{:04}", dt.year()),
            Field::Weekday => weekday.to_string(),
            Field::WeekdayMin => loc.day_min(weekday),
            Field::WeekdayShort => loc.day_short(weekday),
            Field::WeekdayLong => loc.day_name(weekday),
            Field::Hour12 => hour12.to_string(),
            Field::Hour12Pad => format!("{hour12:02}"),
            Field::Hour24 => dt.hour().to_string(),
            Field::Hour24Pad => format!("{:02}", dt.hour()),
            Field::Minute => dt.minute().to_string(),
            Field::Minute2 => format!("{:02}", dt.minute()),
            Field::Second => dt.second().to_string(),
            Field::Second2 => format!("{:02}", dt.second()),
            Field::MeridiemLower => meridiem.to_lowercase(),
            Field::MeridiemUpper => meridiem.to_uppercase(),
            Field::Millis => format!("{:03}", (dt.nanosecond() / 1_000_000).min(999)),
            Field::Week => week_number(dt.date(), loc.first_weekday()).to_string(),
            Field::Week2 => format!("{:02}", week_number(dt.date(), loc.first_weekday())),
        }
    }
}

impl Format for DateFormat {
    fn format(&self, value: &TypedValue) -> Result<String, FormatError> {
        match value {
            TypedValue::Undefined => Ok(String::new()),
            TypedValue::Date(dt) => Ok(self.format_date(dt)),
            other => Err(mismatch("date", "date", other)),
        }
    }

    fn parse(&self, text: &str) -> TypedValue {
        let text = text.trim();
        if text.is_empty() {
            return TypedValue::Undefined;
        }
        (self.parser)(text, self).into()
    }
}

#[derive(Default)]
struct Parts {
    year: Option<i32>,
    month: Option<u32>,
    day: Option<u32>,
    hour: u32,
    minute: u32,
    second: u32,
    millis: u32,
    pm: Option<bool>,
}

/// Parse `text` by inverting the formatter's own pattern.
///
/// Missing date parts default to 1970-01-01 and missing time parts to zero.
/// Two-digit years below 50 land in the 2000s. Weekday and week tokens are
/// consumed but not cross-checked.
#[must_use]
pub fn parse_by_pattern(text: &str, format: &DateFormat) -> Option<NaiveDateTime> {
    let loc = &format.locale;
    let mut parts = Parts::default();
    let mut rest = text.trim();
    for token in &format.tokens {
        rest = rest.trim_start();
        match token {
            Token::Literal(lit) => {
                let lit = lit.trim();
                if !lit.is_empty() {
                    rest = rest.strip_prefix(lit)?;
                }
            }
            Token::Field(field) => {
                rest = parse_field(*field, rest, loc, &mut parts)?;
            }
        }
    }
    if !rest.trim().is_empty() {
        return None;
    }
    let mut hour = parts.hour;
    if let Some(pm) = parts.pm {
        if hour == 0 || hour > 12 {
            return None;
        }
        hour = hour % 12 + if pm { 12 } else { 0 };
    }
    let date = NaiveDate::from_ymd_opt(
        parts.year.unwrap_or(1970),
        parts.month.unwrap_or(1),
        parts.day.unwrap_or(1),
    )?;
    let time = NaiveTime::from_hms_milli_opt(hour, parts.minute, parts.second, parts.millis)?;
    Some(date.and_time(time))
}

fn parse_field<'a>(
    field: Field,
    rest: &'a str,
    loc: &DateLocale,
    parts: &mut Parts,
) -> Option<&'a str> {
    let (value, rest) = match field {
        Field::MonthShort | Field::MonthLong => {
            let (index, rest) = match_name(rest, &[&loc.months, &loc.months_short])?;
            parts.month = Some(index as u32 + 1);
            return Some(rest);
        }
        Field::WeekdayMin | Field::WeekdayShort | Field::WeekdayLong => {
            let (_, rest) = match_name(rest, &[&loc.days, &loc.days_short, &loc.days_min])?;
            return Some(rest);
        }
        Field::MeridiemLower | Field::MeridiemUpper => {
            let am = vec![loc.am.clone()];
            let pm = vec![loc.pm.clone()];
            let (index, rest) = match_name(rest, &[&am, &pm])?;
            parts.pm = Some(index == 1);
            return Some(rest);
        }
        Field::Year | Field::Year4 => take_number(rest, 4)?,
        Field::Millis => take_number(rest, 3)?,
        Field::Weekday => take_number(rest, 1)?,
        _ => take_number(rest, 2)?,
    };
    match field {
        Field::Year | Field::Year4 => parts.year = Some(value as i32),
        Field::Year2 => {
            parts.year = Some(if value < 50 { 2000 } else { 1900 } + value as i32);
        }
        Field::Month | Field::Month2 => parts.month = Some(value),
        Field::Day | Field::Day2 => parts.day = Some(value),
        Field::Hour12 | Field::Hour12Pad | Field::Hour24 | Field::Hour24Pad => parts.hour = value,
        Field::Minute | Field::Minute2 => parts.minute = value,
        Field::Second | Field::Second2 => parts.second = value,
        Field::Millis => parts.millis = value,
        _ => {}
    }
    Some(rest)
}

/// Read between one and `max` ASCII digits.
fn take_number(text: &str, max: usize) -> Option<(u32, &str)> {
    let len = text
        .bytes()
        .take(max)
        .take_while(u8::is_ascii_digit)
        .count();
    if len == 0 {
        return None;
    }
    let value = text[..len].parse().ok()?;
    Some((value, &text[len..]))
}

/// Longest case-insensitive name match across `lists`, returning the index
/// within its list and the remaining text.
fn match_name<'a>(text: &'a str, lists: &[&Vec<String>]) -> Option<(usize, &'a str)> {
    let mut best: Option<(usize, usize)> = None;
    for list in lists {
        for (index, name) in list.iter().enumerate() {
            if name.is_empty() || best.is_some_and(|(_, len)| len >= name.len()) {
                continue;
            }
            let Some(candidate) = text.get(..name.len()) else {
                continue;
            };
            if candidate.to_lowercase() == name.to_lowercase() {
                best = Some((index, name.len()));
            }
        }
    }
    best.map(|(index, len)| (index, &text[len..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    fn monday_first() -> DateLocale {
        DateLocale {
            first_day_of_week: 1,
            ..DateLocale::default()
        }
    }

    #[test]
    fn iso_date() {
        let f = DateFormat::new("YYYY-MM-DD", monday_first()).unwrap();
        assert_eq!(f.format(&at(2024, 3, 1, 0, 0, 0).into()).unwrap(), "2024-03-01");
        assert_eq!(f.parse("2024-03-01"), at(2024, 3, 1, 0, 0, 0).into());
    }

    #[test]
    fn names_and_clock() {
        let f = DateFormat::new("dddd, D MMMM YY h:mm a", DateLocale::default()).unwrap();
        let dt = at(2024, 3, 1, 15, 7, 0);
        assert_eq!(f.format_date(&dt), "Friday, 1 March 24 3:07 pm");
        assert_eq!(f.parse("Friday, 1 March 24 3:07 pm"), dt.into());
        assert_eq!(f.parse("friday, 1 march 24 3:07 PM"), dt.into());
    }

    #[test]
    fn midnight_and_noon_on_twelve_hour_clock() {
        let f = DateFormat::new("hh:mm A", DateLocale::default()).unwrap();
        assert_eq!(f.format_date(&at(2024, 1, 1, 0, 5, 0)), "12:05 AM");
        assert_eq!(f.format_date(&at(2024, 1, 1, 12, 5, 0)), "12:05 PM");
        assert_eq!(f.parse("12:05 AM"), at(1970, 1, 1, 0, 5, 0).into());
        assert_eq!(f.parse("12:05 PM"), at(1970, 1, 1, 12, 5, 0).into());
        assert!(f.parse("13:05 PM").is_undefined());
    }

    #[test]
    fn short_names_and_weekday_tokens() {
        let f = DateFormat::new("ddd dd d MMM", DateLocale::default()).unwrap();
        assert_eq!(f.format_date(&at(2024, 3, 3, 0, 0, 0)), "Sun Su 0 Mar");
    }

    #[test]
    fn literal_brackets() {
        let f = DateFormat::new("[Week] w [of] YYYY", monday_first()).unwrap();
        assert_eq!(f.format_date(&at(2024, 1, 1, 0, 0, 0)), "Week 1 of 2024");
    }

    #[test]
    fn week_tokens_survive_the_ends_of_the_calendar() {
        let f = DateFormat::new("w ww", monday_first()).unwrap();
        for date in [NaiveDate::MIN, NaiveDate::MAX] {
            let dt = date.and_hms_opt(0, 0, 0).unwrap();
            let text = f.format_date(&dt);
            let in_range = |n: &str| n.parse::<u32>().is_ok_and(|w| (1..=54).contains(&w));
            assert!(text.split(' ').all(in_range), "{text}");
            for first in [Weekday::Sun, Weekday::Mon, Weekday::Sat] {
                assert!(week_number(date, first) >= 1);
            }
        }
    }

    #[test]
    fn iso_week_numbers() {
        let mon = Weekday::Mon;
        let d = |y, m, day| NaiveDate::from_ymd_opt(y, m, day).unwrap();
        assert_eq!(week_number(d(2024, 1, 1), mon), 1);
        assert_eq!(week_number(d(2023, 1, 1), mon), 52);
        assert_eq!(week_number(d(2021, 1, 3), mon), 53);
        assert_eq!(week_number(d(2020, 12, 31), mon), 53);
        assert_eq!(week_number(d(2024, 12, 30), mon), 1);
        for day in 1..=28 {
            let date = d(2024, 2, day);
            assert_eq!(week_number(date, mon), date.iso_week().week());
        }
    }

    #[test]
    fn sunday_first_weeks() {
        let sun = Weekday::Sun;
        let d = |y, m, day| NaiveDate::from_ymd_opt(y, m, day).unwrap();
        assert_eq!(week_number(d(2023, 1, 1), sun), 1);
        assert_eq!(week_number(d(2022, 12, 31), sun), 52);
    }

    #[test]
    fn two_digit_week_token() {
        let f = DateFormat::new("ww", monday_first()).unwrap();
        assert_eq!(f.format_date(&at(2024, 1, 1, 0, 0, 0)), "01");
    }

    #[test]
    fn millis_token() {
        let f = DateFormat::new("HH:mm:ss.S", DateLocale::default()).unwrap();
        let dt = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_milli_opt(8, 9, 10, 42)
            .unwrap();
        assert_eq!(f.format_date(&dt), "08:09:10.042");
        let epoch_day = NaiveDate::from_ymd_opt(1970, 1, 1)
            .unwrap()
            .and_hms_milli_opt(8, 9, 10, 42)
            .unwrap();
        assert_eq!(f.parse("08:09:10.042"), epoch_day.into());
    }

    #[test]
    fn invalid_input_is_undefined() {
        let f = DateFormat::new("YYYY-MM-DD", DateLocale::default()).unwrap();
        assert!(f.parse("").is_undefined());
        assert!(f.parse("2024-02-30").is_undefined());
        assert!(f.parse("2024-03-01 trailing").is_undefined());
        assert!(f.parse("yesterday").is_undefined());
    }

    #[test]
    fn custom_parser_is_used() {
        let f = DateFormat::new("YYYY-MM-DD", DateLocale::default())
            .unwrap()
            .with_parser(Arc::new(|text, _| {
                (text == "epoch").then(|| at(1970, 1, 1, 0, 0, 0))
            }));
        assert_eq!(f.parse("epoch"), at(1970, 1, 1, 0, 0, 0).into());
        assert!(f.parse("2024-03-01").is_undefined());
    }

    #[test]
    fn type_mismatch_and_empty() {
        let f = DateFormat::new("YYYY", DateLocale::default()).unwrap();
        assert!(f.format(&TypedValue::Number(1.0)).is_err());
        assert_eq!(f.format(&TypedValue::Undefined).unwrap(), "");
        assert_eq!(
            DateFormat::new("", DateLocale::default()).unwrap_err(),
            ConfigError::EmptyPattern
        );
    }

    #[test]
    fn localized_month_names() {
        let de = crate::locale::builtin_tables()
            .into_iter()
            .find(|t| t.tag == "de")
            .unwrap();
        let f = DateFormat::new("D. MMMM YYYY", de.date).unwrap();
        let dt = at(2024, 3, 1, 0, 0, 0);
        assert_eq!(f.format_date(&dt), "1. März 2024");
        assert_eq!(f.parse("1. März 2024"), dt.into());
    }
}
