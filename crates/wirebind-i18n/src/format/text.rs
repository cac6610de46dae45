//! Text and list formatting.
//!
//! The scalar transform runs in a fixed order: case, then charset filter,
//! then trim, then max-length truncation. List mode applies the same
//! transform to each element.

use core::str::FromStr;

use wirebind_core::TypedValue;

use super::Format;
use super::number::mismatch;
use crate::error::{ConfigError, FormatError};

/// Case transform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Case {
    #[default]
    None,
    Upper,
    Lower,
    /// Upper-case the first letter of each word, lower-case the rest.
    Title,
}

impl FromStr for Case {
    type Err = ConfigError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Ok(Self::None),
            "upper" | "uppercase" => Ok(Self::Upper),
            "lower" | "lowercase" => Ok(Self::Lower),
            "title" | "titlecase" => Ok(Self::Title),
            _ => Err(ConfigError::Unsupported {
                what: "case",
                tag: tag.to_owned(),
            }),
        }
    }
}

impl Case {
    fn apply(self, text: &str) -> String {
        match self {
            Self::None => text.to_owned(),
            Self::Upper => text.to_uppercase(),
            Self::Lower => text.to_lowercase(),
            Self::Title => title_case(text),
        }
    }
}

fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for ch in text.chars() {
        if ch.is_alphanumeric() {
            if at_word_start {
                out.extend(ch.to_uppercase());
            } else {
                out.extend(ch.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(ch);
            at_word_start = ch.is_whitespace() || ch == '-';
        }
    }
    out
}

/// Character-set filter.
///
/// Display charsets replace disallowed characters with `_`; identifier
/// charsets drop them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Charset {
    /// Printable ASCII.
    Ascii,
    /// ASCII plus the Latin-1 supplement and Latin extended blocks.
    Latin,
    /// Latin plus Greek, Cyrillic and the euro sign.
    Euro,
    /// Digits only.
    IdNumeric,
    /// Hexadecimal digits only.
    IdHex,
    /// ASCII letters and digits only.
    IdAlphanumeric,
}

impl FromStr for Charset {
    type Err = ConfigError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "ascii" => Ok(Self::Ascii),
            "latin" => Ok(Self::Latin),
            "euro" => Ok(Self::Euro),
            "id-numeric" => Ok(Self::IdNumeric),
            "id-hex" => Ok(Self::IdHex),
            "id-alphanumeric" => Ok(Self::IdAlphanumeric),
            _ => Err(ConfigError::Unsupported {
                what: "charset",
                tag: tag.to_owned(),
            }),
        }
    }
}

impl Charset {
    const fn is_identifier(self) -> bool {
        matches!(self, Self::IdNumeric | Self::IdHex | Self::IdAlphanumeric)
    }

    fn allows(self, ch: char) -> bool {
        let cp = ch as u32;
        let ascii = (0x20..=0x7E).contains(&cp);
        let latin = ascii || (0xA0..=0x24F).contains(&cp);
        match self {
            Self::Ascii => ascii,
            Self::Latin => latin,
            Self::Euro => latin || (0x370..=0x4FF).contains(&cp) || ch == '€',
            Self::IdNumeric => ch.is_ascii_digit(),
            Self::IdHex => ch.is_ascii_hexdigit(),
            Self::IdAlphanumeric => ch.is_ascii_alphanumeric(),
        }
    }

    fn apply(self, text: &str) -> String {
        if self.is_identifier() {
            text.chars().filter(|c| self.allows(*c)).collect()
        } else {
            text.chars()
                .map(|c| if self.allows(c) { c } else { '_' })
                .collect()
        }
    }
}

/// Settings for [`TextFormat`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextSettings {
    pub case: Case,
    pub charset: Option<Charset>,
    pub max_length: Option<usize>,
    /// `Some` switches on list mode with this separator.
    pub list_separator: Option<String>,
}

impl TextSettings {
    #[must_use]
    pub fn with_case(mut self, case: Case) -> Self {
        self.case = case;
        self
    }

    #[must_use]
    pub fn with_charset(mut self, charset: Charset) -> Self {
        self.charset = Some(charset);
        self
    }

    #[must_use]
    pub fn with_max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    #[must_use]
    pub fn with_list(mut self, separator: impl Into<String>) -> Self {
        self.list_separator = Some(separator.into());
        self
    }
}

/// Formats `Text` values, or `List` values in list mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextFormat {
    settings: TextSettings,
}

impl TextFormat {
    /// Build a formatter; list mode requires a non-empty separator.
    pub fn new(settings: TextSettings) -> Result<Self, ConfigError> {
        if settings.list_separator.as_deref() == Some("") {
            return Err(ConfigError::EmptySeparator);
        }
        Ok(Self { settings })
    }

    #[must_use]
    pub fn is_list(&self) -> bool {
        self.settings.list_separator.is_some()
    }

    /// Apply case, charset, trim and truncation to one string.
    #[must_use]
    pub fn transform(&self, text: &str) -> String {
        let cased = self.settings.case.apply(text);
        let filtered = match self.settings.charset {
            Some(charset) => charset.apply(&cased),
            None => cased,
        };
        let trimmed = filtered.trim();
        match self.settings.max_length {
            Some(max) => trimmed.chars().take(max).collect(),
            None => trimmed.to_owned(),
        }
    }

    fn split<'a>(&self, sep: &str, text: &'a str) -> Vec<&'a str> {
        let key = sep.trim();
        if key.is_empty() {
            text.split_whitespace().collect()
        } else {
            text.split(key).collect()
        }
    }
}

impl Format for TextFormat {
    fn format(&self, value: &TypedValue) -> Result<String, FormatError> {
        match (&self.settings.list_separator, value) {
            (_, TypedValue::Undefined) => Ok(String::new()),
            (None, TypedValue::Text(s)) => Ok(self.transform(s)),
            (None, other) => Err(mismatch("text", "text", other)),
            (Some(sep), TypedValue::List(items)) => Ok(items
                .iter()
                .map(|item| self.transform(item))
                .collect::<Vec<_>>()
                .join(sep)),
            (Some(_), other) => Err(mismatch("list", "list", other)),
        }
    }

    fn parse(&self, text: &str) -> TypedValue {
        match &self.settings.list_separator {
            None => TypedValue::Text(self.transform(text)),
            Some(sep) => TypedValue::List(
                self.split(sep, text)
                    .into_iter()
                    .map(|item| self.transform(item))
                    .filter(|item| !item.is_empty())
                    .collect(),
            ),
        }
    }
}
