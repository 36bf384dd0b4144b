use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Locale {
    /// Reference convention: `18 Oct 2026`, `$1,234.50`.
    #[default]
    EnAu,
    EnGb,
    EnUs,
}

impl Locale {
    pub fn tag(&self) -> &'static str {
        match self {
            Self::EnAu => "en-AU",
            Self::EnGb => "en-GB",
            Self::EnUs => "en-US",
        }
    }

    /// Accepts `en-AU`, `en_au`, `AU` and similar spellings.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "en-au" | "au" => Some(Self::EnAu),
            "en-gb" | "en-uk" | "gb" | "uk" => Some(Self::EnGb),
            "en-us" | "us" => Some(Self::EnUs),
            _ => None,
        }
    }

    fn currency_symbol(&self) -> &'static str {
        match self {
            Self::EnAu | Self::EnUs => "$",
            Self::EnGb => "£",
        }
    }

    fn group_separator(&self) -> char {
        ','
    }

    fn month_first(&self) -> bool {
        matches!(self, Self::EnUs)
    }
}

/// Renders numbers and dates for one locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Formatter {
    locale: Locale,
}

impl Formatter {
    pub fn new(locale: Locale) -> Self {
        Self { locale }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Fixed `dp` decimals with thousands grouping, e.g. `1,234.50`.
    pub fn number(
        &self,
        value: Decimal,
        dp: u32,
    ) -> String {
        let mut rounded = value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
        if rounded.is_zero() {
            rounded.set_sign_positive(true);
        }
        rounded.rescale(dp);

        let text = rounded.abs().to_string();
        let (int_part, frac_part) = match text.split_once('.') {
            Some((i, f)) => (i, Some(f)),
            None => (text.as_str(), None),
        };

        let mut out = String::with_capacity(text.len() + text.len() / 3 + 1);
        if rounded.is_sign_negative() {
            out.push('-');
        }
        out.push_str(&self.group(int_part));
        if let Some(frac) = frac_part {
            out.push('.');
            out.push_str(frac);
        }
        out
    }

    /// Two-decimal currency, sign before the symbol: `-$1,234.50`.
    pub fn currency(
        &self,
        value: Decimal,
    ) -> String {
        let digits = self.number(value.abs(), 2);
        let negative = value.is_sign_negative() && digits.chars().any(|c| matches!(c, '1'..='9'));
        let sign = if negative { "-" } else { "" };
        format!("{sign}{}{digits}", self.locale.currency_symbol())
    }

    /// Currency with an explicit sign for non-negative values too: `+$2,000.00`.
    pub fn signed_currency(
        &self,
        value: Decimal,
    ) -> String {
        if value.is_sign_negative() {
            self.currency(value)
        } else {
            format!("+{}", self.currency(value))
        }
    }

    /// Thousands with one decimal, e.g. `$14.5k`.
    pub fn compact_thousands(
        &self,
        value: Decimal,
    ) -> String {
        let thousands = value / Decimal::ONE_THOUSAND;
        let sign = if value.is_sign_negative() { "-" } else { "" };
        format!(
            "{sign}{}{}k",
            self.locale.currency_symbol(),
            self.number(thousands.abs(), 1)
        )
    }

    /// `18 Oct 2026` (day first) or `Oct 18, 2026` (US).
    pub fn date_short(
        &self,
        date: NaiveDate,
    ) -> String {
        if self.locale.month_first() {
            date.format("%b %-d, %Y").to_string()
        } else {
            date.format("%-d %b %Y").to_string()
        }
    }

    /// `18 October 2026` (day first) or `October 18, 2026` (US).
    pub fn date_long(
        &self,
        date: NaiveDate,
    ) -> String {
        if self.locale.month_first() {
            date.format("%B %-d, %Y").to_string()
        } else {
            date.format("%-d %B %Y").to_string()
        }
    }

    fn group(
        &self,
        digits: &str,
    ) -> String {
        let sep = self.locale.group_separator();
        let len = digits.len();
        let mut out = String::with_capacity(len + len / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (len - i) % 3 == 0 {
                out.push(sep);
            }
            out.push(ch);
        }
        out
    }
}
