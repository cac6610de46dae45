//! Number and money formatting.
//!
//! Rounding is half away from zero to `10^-precision`; negative precision
//! rounds to tens, hundreds, ... and renders no decimals. Round-tripping a
//! value through `format` then `parse` returns the value rounded to the
//! configured precision.

use regex::Regex;
use wirebind_core::TypedValue;

use super::Format;
use crate::error::{ConfigError, FormatError};
use crate::locale::NumberLocale;

/// Largest accepted precision magnitude.
pub const MAX_PRECISION: i32 = 6;

/// Settings for [`NumberFormat`] and [`MoneyFormat`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberSettings {
    pub precision: i32,
    pub decimal_separator: String,
    pub thousand_separator: String,
}

impl Default for NumberSettings {
    fn default() -> Self {
        Self::from_locale(&NumberLocale::default())
    }
}

impl NumberSettings {
    /// Settings taken from a locale's number conventions.
    #[must_use]
    pub fn from_locale(locale: &NumberLocale) -> Self {
        Self {
            precision: locale.precision,
            decimal_separator: locale.decimal_separator.clone(),
            thousand_separator: locale.thousand_separator.clone(),
        }
    }

    #[must_use]
    pub fn with_precision(mut self, precision: i32) -> Self {
        self.precision = precision;
        self
    }

    #[must_use]
    pub fn with_separators(
        mut self,
        decimal: impl Into<String>,
        thousand: impl Into<String>,
    ) -> Self {
        self.decimal_separator = decimal.into();
        self.thousand_separator = thousand.into();
        self
    }
}

/// Formats `Number` values with grouping and fixed precision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberFormat {
    precision: i32,
    decimal_separator: String,
    thousand_separator: String,
}

impl NumberFormat {
    /// Build a formatter, rejecting precision magnitudes above six.
    pub fn new(settings: NumberSettings) -> Result<Self, ConfigError> {
        if settings.precision.unsigned_abs() > MAX_PRECISION.unsigned_abs() {
            return Err(ConfigError::InvalidPrecision(settings.precision));
        }
        let decimal_separator = if settings.decimal_separator.is_empty() {
            ".".to_owned()
        } else {
            settings.decimal_separator
        };
        Ok(Self {
            precision: settings.precision,
            decimal_separator,
            thousand_separator: settings.thousand_separator,
        })
    }

    #[must_use]
    pub const fn precision(&self) -> i32 {
        self.precision
    }

    /// Round half away from zero to the configured precision.
    #[must_use]
    pub fn round(&self, n: f64) -> f64 {
        if self.precision >= 0 {
            let factor = 10f64.powi(self.precision);
            (n * factor).round() / factor
        } else {
            let step = 10f64.powi(-self.precision);
            (n / step).round() * step
        }
    }

    /// Render the magnitude of `n` and report its sign separately, so money
    /// markers can go between the sign and the digits.
    #[must_use]
    pub fn format_parts(&self, n: f64) -> (bool, String) {
        let rounded = self.round(n);
        let decimals = self.precision.max(0) as usize;
        let digits = format!("{:.*}", decimals, rounded.abs());
        let (int_part, frac_part) = match digits.split_once('.') {
            Some((i, f)) => (i, Some(f)),
            None => (digits.as_str(), None),
        };
        let mut out = group_thousands(int_part, &self.thousand_separator);
        if let Some(frac) = frac_part {
            out.push_str(&self.decimal_separator);
            out.push_str(frac);
        }
        (rounded < 0.0, out)
    }

    /// Format a raw number.
    #[must_use]
    pub fn format_number(&self, n: f64) -> String {
        let (negative, body) = self.format_parts(n);
        if negative { format!("-{body}") } else { body }
    }

    /// Parse text into a number, or `None` if it is not a finite number.
    #[must_use]
    pub fn parse_number(&self, text: &str) -> Option<f64> {
        let mut cleaned: String = text.chars().filter(|c| !c.is_whitespace()).collect();
        let thousand = self.thousand_separator.trim();
        if !thousand.is_empty() && thousand != self.decimal_separator {
            cleaned = cleaned.replace(thousand, "");
        }
        if self.decimal_separator != "." {
            cleaned = cleaned.replace(self.decimal_separator.as_str(), ".");
        }
        if cleaned.is_empty() || !cleaned.bytes().any(|b| b.is_ascii_digit()) {
            return None;
        }
        let n: f64 = cleaned.parse().ok()?;
        n.is_finite().then(|| self.round(n))
    }
}

/// Insert `sep` every three digits counted from the right.
fn group_thousands(digits: &str, sep: &str) -> String {
    if sep.is_empty() || digits.len() <= 3 {
        return digits.to_owned();
    }
    let mut out = String::with_capacity(digits.len() + sep.len() * (digits.len() / 3));
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push_str(sep);
        }
        out.push(ch);
    }
    out
}

impl Format for NumberFormat {
    fn format(&self, value: &TypedValue) -> Result<String, FormatError> {
        match value {
            TypedValue::Undefined => Ok(String::new()),
            TypedValue::Number(n) => Ok(self.format_number(*n)),
            other => Err(mismatch("number", "number", other)),
        }
    }

    fn parse(&self, text: &str) -> TypedValue {
        self.parse_number(text).into()
    }
}

/// Money: a [`NumberFormat`] wrapped in a prefix and suffix.
#[derive(Debug, Clone)]
pub struct MoneyFormat {
    number: NumberFormat,
    prefix: String,
    suffix: String,
    prefix_re: Option<Regex>,
    suffix_re: Option<Regex>,
}

impl MoneyFormat {
    pub fn new(
        settings: NumberSettings,
        prefix: impl Into<String>,
        suffix: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let prefix = prefix.into();
        let suffix = suffix.into();
        let prefix_re = marker_regex(&prefix, |m| format!(r"^\s*(-?)\s*{m}\s*"))?;
        let suffix_re = marker_regex(&suffix, |m| format!(r"\s*{m}\s*$"))?;
        Ok(Self {
            number: NumberFormat::new(settings)?,
            prefix,
            suffix,
            prefix_re,
            suffix_re,
        })
    }

    #[must_use]
    pub fn number(&self) -> &NumberFormat {
        &self.number
    }

    fn strip_markers<'a>(&self, text: &'a str) -> std::borrow::Cow<'a, str> {
        let mut out = std::borrow::Cow::Borrowed(text);
        if let Some(re) = &self.suffix_re {
            out = std::borrow::Cow::Owned(re.replace(&out, "").into_owned());
        }
        if let Some(re) = &self.prefix_re {
            out = std::borrow::Cow::Owned(re.replace(&out, "$1").into_owned());
        }
        out
    }
}

fn marker_regex(
    marker: &str,
    build: impl Fn(&str) -> String,
) -> Result<Option<Regex>, ConfigError> {
    let trimmed = marker.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    Regex::new(&build(&regex::escape(trimmed)))
        .map(Some)
        .map_err(|e| ConfigError::Unsupported {
            what: "money marker",
            tag: format!("{marker}: {e}"),
        })
}

impl PartialEq for MoneyFormat {
    fn eq(&self, other: &Self) -> bool {
        self.number == other.number && self.prefix == other.prefix && self.suffix == other.suffix
    }
}

impl Format for MoneyFormat {
    fn format(&self, value: &TypedValue) -> Result<String, FormatError> {
        match value {
            TypedValue::Undefined => Ok(String::new()),
            TypedValue::Number(n) => {
                let (negative, body) = self.number.format_parts(*n);
                let sign = if negative { "-" } else { "" };
                Ok(format!("{sign}{}{body}{}", self.prefix, self.suffix))
            }
            other => Err(mismatch("money", "number", other)),
        }
    }

    fn parse(&self, text: &str) -> TypedValue {
        self.number.parse_number(&self.strip_markers(text)).into()
    }
}

pub(crate) fn mismatch(
    formatter: &'static str,
    expected: &'static str,
    found: &TypedValue,
) -> FormatError {
    FormatError::TypeMismatch {
        formatter,
        expected,
        found: found.variant_name(),
    }
}
