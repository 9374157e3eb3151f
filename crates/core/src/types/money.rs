//! Store currency and money formatting.

use core::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Error returned for a currency code the store does not support.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unsupported currency: {0}")]
pub struct UnknownCurrency(pub String);

/// Currencies the store can price in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Usd,
    Eur,
    Gbp,
    Inr,
    Cad,
    Aud,
}

impl Currency {
    /// Every supported currency, for settings dropdowns.
    pub const ALL: &'static [Self] = &[
        Self::Usd,
        Self::Eur,
        Self::Gbp,
        Self::Inr,
        Self::Cad,
        Self::Aud,
    ];

    /// ISO 4217 code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Usd => "USD",
            Self::Eur => "EUR",
            Self::Gbp => "GBP",
            Self::Inr => "INR",
            Self::Cad => "CAD",
            Self::Aud => "AUD",
        }
    }

    /// Symbol shown before amounts.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Usd => "$",
            Self::Eur => "€",
            Self::Gbp => "£",
            Self::Inr => "₹",
            Self::Cad => "CA$",
            Self::Aud => "A$",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for Currency {
    type Err = UnknownCurrency;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.code().eq_ignore_ascii_case(code))
            .ok_or_else(|| UnknownCurrency(code.to_owned()))
    }
}

/// An amount in a specific currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    pub amount: Decimal,
    pub currency: Currency,
}

impl Money {
    #[must_use]
    pub const fn new(amount: Decimal, currency: Currency) -> Self {
        Self { amount, currency }
    }

    /// Symbol followed by the amount rounded to two places, e.g. `$12.50`.
    #[must_use]
    pub fn display(&self) -> String {
        let rounded = self
            .amount
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };
        format!("{sign}{}{:.2}", self.currency.symbol(), rounded.abs())
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_parse_is_case_insensitive() {
        assert_eq!("inr".parse::<Currency>().unwrap(), Currency::Inr);
        assert_eq!(" GBP ".parse::<Currency>().unwrap(), Currency::Gbp);
        assert_eq!(
            "JPY".parse::<Currency>(),
            Err(UnknownCurrency("JPY".to_owned()))
        );
    }

    #[test]
    fn test_money_display() {
        let m = Money::new(Decimal::new(125, 1), Currency::Usd);
        assert_eq!(m.display(), "$12.50");

        let m = Money::new(Decimal::new(1250, 0), Currency::Inr);
        assert_eq!(m.display(), "₹1250.00");

        let m = Money::new(Decimal::new(10005, 3), Currency::Eur);
        assert_eq!(m.display(), "€10.01");

        let m = Money::new(Decimal::new(-350, 2), Currency::Gbp);
        assert_eq!(m.to_string(), "-£3.50");
    }

    #[test]
    fn test_currency_serde_uses_code() {
        assert_eq!(serde_json::to_string(&Currency::Aud).unwrap(), "\"AUD\"");
        let c: Currency = serde_json::from_str("\"CAD\"").unwrap();
        assert_eq!(c, Currency::Cad);
    }
}
