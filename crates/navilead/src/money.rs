//! Money helpers
//!
//! All arithmetic runs on `rust_decimal::Decimal`. Amounts cross the API
//! boundary as `f64` rounded to two decimal places.

use std::fmt;
use std::str::FromStr;

use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{DataError, NavileadError};

/// Monetary values are rounded to 2 decimal places, half away from zero
const DECIMAL_PLACES: u32 = 2;

/// Convert f64 to Decimal; missing or non-finite values become zero.
///
/// Returns `None` for finite values outside the `Decimal` range.
#[inline]
pub fn checked_decimal(value: f64) -> Option<Decimal> {
    if !value.is_finite() {
        return Some(Decimal::ZERO);
    }
    Decimal::from_f64(value)
}

/// Convert f64 to Decimal for display; out of range values saturate
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    match checked_decimal(value) {
        Some(decimal) => decimal,
        None if value < 0.0 => Decimal::MIN,
        None => Decimal::MAX,
    }
}

/// Round a Decimal to the monetary precision
#[inline]
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Convert Decimal back to f64, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    round_money(value).to_f64().unwrap_or_default()
}

/// Apply a percentage to an amount: `amount * percent / 100`.
///
/// `None` when the product overflows.
#[inline]
pub fn percent_of(amount: Decimal, percent: Decimal) -> Option<Decimal> {
    amount.checked_mul(percent)?.checked_div(Decimal::ONE_HUNDRED)
}

/// Currencies merchants can quote in
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Dkk,
    Sek,
    Nok,
    Eur,
    Usd,
    Gbp,
}

impl Currency {
    /// ISO 4217 code
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Dkk => "DKK",
            Currency::Sek => "SEK",
            Currency::Nok => "NOK",
            Currency::Eur => "EUR",
            Currency::Usd => "USD",
            Currency::Gbp => "GBP",
        }
    }

    /// Format an amount the way it is printed on offers and emails.
    ///
    /// ```
    /// use navilead::Currency;
    ///
    /// assert_eq!(Currency::Dkk.format(1234.5), "1.234,50 kr.");
    /// assert_eq!(Currency::Usd.format(1234.5), "$1,234.50");
    /// ```
    pub fn format(&self, amount: f64) -> String {
        self.format_decimal(to_decimal(amount))
    }

    /// Format a Decimal amount, see [`Currency::format`]
    pub fn format_decimal(&self, amount: Decimal) -> String {
        let (thousands, decimal) = match self {
            Currency::Usd | Currency::Gbp => (',', '.'),
            _ => ('.', ','),
        };
        let number = group_digits(amount, thousands, decimal);
        match self {
            Currency::Dkk => format!("{} kr.", number),
            Currency::Sek | Currency::Nok => format!("{} kr", number),
            Currency::Eur => prefix_symbol("€", number),
            Currency::Usd => prefix_symbol("$", number),
            Currency::Gbp => prefix_symbol("£", number),
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = NavileadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DKK" => Ok(Currency::Dkk),
            "SEK" => Ok(Currency::Sek),
            "NOK" => Ok(Currency::Nok),
            "EUR" => Ok(Currency::Eur),
            "USD" => Ok(Currency::Usd),
            "GBP" => Ok(Currency::Gbp),
            _ => Err(NavileadError::Data(DataError::UnsupportedCurrency {
                code: s.to_string(),
            })),
        }
    }
}

// keeps the minus sign in front of the symbol: -€10,00
fn prefix_symbol(symbol: &str, number: String) -> String {
    match number.strip_prefix('-') {
        Some(rest) => format!("-{}{}", symbol, rest),
        None => format!("{}{}", symbol, number),
    }
}

fn group_digits(amount: Decimal, thousands: char, decimal: char) -> String {
    let rounded = round_money(amount);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let plain = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(thousands);
        }
        grouped.push(ch);
    }

    let sign = if negative { "-" } else { "" };
    format!("{}{}{}{}", sign, grouped, decimal, frac_part)
}
