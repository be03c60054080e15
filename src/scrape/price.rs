//! Price-text normalization.
//!
//! Vietnamese shops print prices as `1.090.000đ`, `740.000 ₫` or
//! `1,290,000 VND`: `.` or `,` group thousands and a trailing `,` followed by
//! one or two digits is a decimal part. Bare numbers count only from four
//! digits up, so discount badges like `Giảm 10%` never read as prices.

use regex_lite::Regex;
use serde::{Deserialize, Serialize};

/// Locale rules for reading prices, carried by a site profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceFormat {
    /// Separator between the integer and fractional part
    #[serde(default = "default_decimal_separator")]
    pub decimal_separator: char,

    /// Minimum digits for an ungrouped number to count as a price
    #[serde(default = "default_min_bare_digits")]
    pub min_bare_digits: usize,

    /// Currency markers that may follow the amount (ASCII case-insensitive)
    #[serde(default = "default_currency_markers")]
    pub currency_markers: Vec<String>,
}

fn default_decimal_separator() -> char {
    ','
}

fn default_min_bare_digits() -> usize {
    4
}

fn default_currency_markers() -> Vec<String> {
    ["đ", "₫", "vnđ", "VNĐ", "vnd"].iter().map(|s| s.to_string()).collect()
}

impl Default for PriceFormat {
    fn default() -> Self {
        Self::vnd()
    }
}

impl PriceFormat {
    /// Vietnamese dong formatting.
    pub fn vnd() -> Self {
        Self {
            decimal_separator: default_decimal_separator(),
            min_bare_digits: default_min_bare_digits(),
            currency_markers: default_currency_markers(),
        }
    }

    /// Compiles the matcher for this format. Fails when the configured
    /// digit count or markers do not make a valid pattern.
    pub fn compile(&self) -> Result<PriceParser, regex_lite::Error> {
        let bare = self.min_bare_digits.max(1);
        let amount = format!(r"(\d{{1,3}}(?:[.,]\d{{3}})+(?:[.,]\d+)?|\d{{{bare},}})");

        let mut markers: Vec<&str> =
            self.currency_markers.iter().map(String::as_str).filter(|m| !m.is_empty()).collect();
        // Longest first so "vnđ" wins over "đ".
        markers.sort_by_key(|m| std::cmp::Reverse(m.chars().count()));
        let alternatives =
            markers.iter().map(|m| regex_lite::escape(m)).collect::<Vec<_>>().join("|");

        let number = Regex::new(&amount)?;
        let marked = if alternatives.is_empty() {
            None
        } else {
            Some(Regex::new(&format!(r"(?i){amount}\s*(?:{alternatives})"))?)
        };

        Ok(PriceParser { number, marked, decimal_separator: self.decimal_separator })
    }
}

/// Compiled price matcher.
#[derive(Debug, Clone)]
pub struct PriceParser {
    number: Regex,
    marked: Option<Regex>,
    decimal_separator: char,
}

impl PriceParser {
    /// Parses the first price-looking number in `text`.
    ///
    /// Returns `None` when nothing matches or the amount is not a positive
    /// finite number. Never fails.
    pub fn parse(&self, text: &str) -> Option<f64> {
        let text = text.replace('\u{a0}', " ");
        let m = self.number.captures(&text)?.get(1)?;
        self.normalize(m.as_str())
    }

    /// Like [`parse`](Self::parse), but only accepts amounts followed by a
    /// currency marker. Used to tell price lines apart from other numbers.
    pub fn parse_marked(&self, text: &str) -> Option<f64> {
        let text = text.replace('\u{a0}', " ");
        let m = self.marked.as_ref()?.captures(&text)?.get(1)?;
        self.normalize(m.as_str())
    }

    /// True if `line` carries an amount followed by a currency marker.
    pub fn is_price_line(&self, line: &str) -> bool {
        self.parse_marked(line).is_some()
    }

    /// Reads a `data-price` style attribute: plain digits, possibly with
    /// separators, no currency.
    pub fn parse_attribute(&self, value: &str) -> Option<f64> {
        let cleaned: String =
            value.chars().filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',').collect();
        if cleaned.is_empty() {
            return None;
        }
        // Attributes are often machine-formatted ("459000" or "459000.00"),
        // but a separator followed by exactly three digits is grouping.
        let grouped = cleaned.rfind(['.', ',']).is_some_and(|idx| cleaned.len() - idx == 4);
        if !grouped {
            if let Ok(value) = cleaned.parse::<f64>() {
                return positive(value);
            }
        }
        self.normalize(&cleaned)
    }

    /// Strips grouping separators and parses. A final separator followed by
    /// one or two digits is taken as the decimal point when it is the
    /// configured decimal separator.
    fn normalize(&self, amount: &str) -> Option<f64> {
        let (integer, fraction) = match amount.rfind(['.', ',']) {
            Some(idx) => {
                let sep = amount[idx..].chars().next()?;
                let tail = &amount[idx + 1..];
                if sep == self.decimal_separator && (1..=2).contains(&tail.len()) {
                    (&amount[..idx], Some(tail))
                } else {
                    (amount, None)
                }
            }
            None => (amount, None),
        };

        let mut digits: String = integer.chars().filter(char::is_ascii_digit).collect();
        if let Some(fraction) = fraction {
            digits.push('.');
            digits.push_str(fraction);
        }

        digits.parse::<f64>().ok().and_then(positive)
    }
}

fn positive(value: f64) -> Option<f64> {
    (value.is_finite() && value > 0.0).then_some(value)
}
