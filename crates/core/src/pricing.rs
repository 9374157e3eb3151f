//! Site settings and the pricing helper.
//!
//! [`SiteSettings`] is a flat record stored as a single JSON document. The
//! functions below derive delivery fees, tax and order totals from it and are
//! used by the cart, checkout and back office alike.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::types::{Currency, FulfillmentMethod, Money};
use crate::validation::ValidationErrors;

/// Store-wide configuration edited from the back office.
///
/// Every field has a default, so documents written by older versions load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteSettings {
    pub store_name: String,
    pub tagline: String,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    /// Store owner's WhatsApp number, receives order alerts.
    pub whatsapp_number: Option<String>,
    pub currency: Currency,
    pub delivery_fee: Decimal,
    /// Orders at or above this subtotal ship free. `None` disables free delivery.
    pub free_delivery_threshold: Option<Decimal>,
    /// Percent, 0-100.
    pub tax_rate: Decimal,
    /// Prices already include tax.
    pub tax_inclusive: bool,
    pub minimum_order: Decimal,
    pub custom_cake_min_notice_days: u32,
    pub delivery_slots: Vec<String>,
    pub pickup_address: Option<String>,
    pub instagram_handle: Option<String>,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            store_name: "Hearth Bakery".to_owned(),
            tagline: "Baked fresh every morning".to_owned(),
            contact_email: None,
            contact_phone: None,
            whatsapp_number: None,
            currency: Currency::Usd,
            delivery_fee: Decimal::new(500, 2),
            free_delivery_threshold: Some(Decimal::new(50, 0)),
            tax_rate: Decimal::ZERO,
            tax_inclusive: false,
            minimum_order: Decimal::ZERO,
            custom_cake_min_notice_days: DEFAULT_MIN_NOTICE_DAYS,
            delivery_slots: vec![
                "09:00 - 12:00".to_owned(),
                "12:00 - 15:00".to_owned(),
                "15:00 - 18:00".to_owned(),
            ],
            pickup_address: None,
            instagram_handle: None,
        }
    }
}

/// Custom cakes need this many days' notice unless configured otherwise.
pub const DEFAULT_MIN_NOTICE_DAYS: u32 = 2;

/// Upper bound accepted for `custom_cake_min_notice_days`.
pub const MAX_MIN_NOTICE_DAYS: u32 = 60;

impl SiteSettings {
    /// Check the ranges enforced by the settings form.
    ///
    /// # Errors
    ///
    /// Returns every out-of-range field.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.store_name.trim().is_empty() {
            errors.add("store_name", "Store name is required");
        }
        if self.delivery_fee.is_sign_negative() {
            errors.add("delivery_fee", "Delivery fee cannot be negative");
        }
        if self
            .free_delivery_threshold
            .is_some_and(|t| t.is_sign_negative())
        {
            errors.add(
                "free_delivery_threshold",
                "Free delivery threshold cannot be negative",
            );
        }
        if self.tax_rate.is_sign_negative() || self.tax_rate > Decimal::ONE_HUNDRED {
            errors.add("tax_rate", "Tax rate must be between 0 and 100");
        }
        if self.minimum_order.is_sign_negative() {
            errors.add("minimum_order", "Minimum order cannot be negative");
        }
        if self.custom_cake_min_notice_days > MAX_MIN_NOTICE_DAYS {
            errors.add(
                "custom_cake_min_notice_days",
                format!("Notice must be between 0 and {MAX_MIN_NOTICE_DAYS} days"),
            );
        }

        errors.into_result()
    }

    /// Symbol for the configured currency.
    #[must_use]
    pub const fn currency_symbol(&self) -> &'static str {
        self.currency.symbol()
    }

    /// Format an amount in the store currency.
    #[must_use]
    pub fn format(&self, amount: Decimal) -> String {
        format_money(amount, self.currency)
    }
}

/// Errors from checking a cart against the store's order rules.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PricingError {
    #[error("your cart is empty")]
    EmptyCart,
    #[error("the minimum order is {minimum}")]
    BelowMinimum {
        /// Formatted minimum, e.g. `$15.00`.
        minimum: String,
    },
}

/// Breakdown shown on the cart, checkout and order pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTotals {
    pub subtotal: Decimal,
    pub delivery_fee: Decimal,
    /// Tax charged, or for tax-inclusive stores the tax contained in the subtotal.
    pub tax: Decimal,
    pub total: Decimal,
}

/// Symbol for a currency code. Unknown codes fall back to `$`.
#[must_use]
pub fn currency_symbol(code: &str) -> &'static str {
    code.parse::<Currency>()
        .map_or(Currency::Usd.symbol(), Currency::symbol)
}

/// Delivery fee for a subtotal.
///
/// Pickup and empty carts are free. With a threshold configured, subtotals at
/// or above it are free. Otherwise the configured fee applies.
#[must_use]
pub fn delivery_fee(
    subtotal: Decimal,
    method: FulfillmentMethod,
    settings: &SiteSettings,
) -> Decimal {
    if method == FulfillmentMethod::Pickup || subtotal <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    match settings.free_delivery_threshold {
        Some(threshold) if subtotal >= threshold => Decimal::ZERO,
        _ => settings.delivery_fee,
    }
}

/// How much more the customer must add to qualify for free delivery.
///
/// `None` when free delivery is disabled or already reached.
#[must_use]
pub fn amount_until_free_delivery(subtotal: Decimal, settings: &SiteSettings) -> Option<Decimal> {
    let threshold = settings.free_delivery_threshold?;
    let remaining = threshold - subtotal;
    (remaining > Decimal::ZERO).then_some(remaining)
}

/// Tax on a subtotal, rounded to cents with midpoints away from zero.
///
/// For tax-inclusive stores this is the portion of the subtotal that is tax.
#[must_use]
pub fn tax(subtotal: Decimal, settings: &SiteSettings) -> Decimal {
    let rate = settings.tax_rate;
    if rate <= Decimal::ZERO || subtotal <= Decimal::ZERO {
        return Decimal::ZERO;
    }

    let raw = if settings.tax_inclusive {
        subtotal - subtotal / (Decimal::ONE + rate / Decimal::ONE_HUNDRED)
    } else {
        subtotal * rate / Decimal::ONE_HUNDRED
    };
    round_cents(raw)
}

/// Compute subtotal, delivery fee, tax and total.
#[must_use]
pub fn order_totals(
    subtotal: Decimal,
    method: FulfillmentMethod,
    settings: &SiteSettings,
) -> OrderTotals {
    let subtotal = round_cents(subtotal);
    let delivery_fee = delivery_fee(subtotal, method, settings);
    let tax = tax(subtotal, settings);
    let total = if settings.tax_inclusive {
        subtotal + delivery_fee
    } else {
        subtotal + delivery_fee + tax
    };

    OrderTotals {
        subtotal,
        delivery_fee,
        tax,
        total,
    }
}

/// Reject empty carts and carts below the store minimum.
///
/// # Errors
///
/// Returns [`PricingError`] describing the rule that failed.
pub fn check_minimum_order(subtotal: Decimal, settings: &SiteSettings) -> Result<(), PricingError> {
    if subtotal <= Decimal::ZERO {
        return Err(PricingError::EmptyCart);
    }
    if subtotal < settings.minimum_order {
        return Err(PricingError::BelowMinimum {
            minimum: settings.format(settings.minimum_order),
        });
    }
    Ok(())
}

/// Format an amount with its currency symbol, e.g. `$12.50`.
#[must_use]
pub fn format_money(amount: Decimal, currency: Currency) -> String {
    Money::new(amount, currency).display()
}

fn round_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn dec(cents: i64) -> Decimal {
        Decimal::new(cents, 2)
    }

    fn settings() -> SiteSettings {
        SiteSettings {
            delivery_fee: dec(500),
            free_delivery_threshold: Some(dec(5000)),
            ..SiteSettings::default()
        }
    }

    #[test]
    fn test_currency_symbol_fallback() {
        assert_eq!(currency_symbol("INR"), "₹");
        assert_eq!(currency_symbol("eur"), "€");
        assert_eq!(currency_symbol("XYZ"), "$");
        assert_eq!(currency_symbol(""), "$");
    }

    #[test]
    fn test_free_delivery_at_threshold() {
        let s = settings();
        assert_eq!(delivery_fee(dec(5000), FulfillmentMethod::Delivery, &s), Decimal::ZERO);
        assert_eq!(delivery_fee(dec(7500), FulfillmentMethod::Delivery, &s), Decimal::ZERO);
        assert_eq!(delivery_fee(dec(4999), FulfillmentMethod::Delivery, &s), dec(500));
    }

    #[test]
    fn test_delivery_fee_without_threshold() {
        let s = SiteSettings {
            free_delivery_threshold: None,
            ..settings()
        };
        assert_eq!(delivery_fee(dec(100_000), FulfillmentMethod::Delivery, &s), dec(500));
        assert_eq!(amount_until_free_delivery(dec(100), &s), None);
    }

    #[test]
    fn test_pickup_and_empty_cart_pay_no_fee() {
        let s = settings();
        assert_eq!(delivery_fee(dec(1000), FulfillmentMethod::Pickup, &s), Decimal::ZERO);
        assert_eq!(delivery_fee(Decimal::ZERO, FulfillmentMethod::Delivery, &s), Decimal::ZERO);
    }

    #[test]
    fn test_amount_until_free_delivery() {
        let s = settings();
        assert_eq!(amount_until_free_delivery(dec(3250), &s), Some(dec(1750)));
        assert_eq!(amount_until_free_delivery(dec(5000), &s), None);
    }

    #[test]
    fn test_tax_rounds_half_away_from_zero() {
        let s = SiteSettings {
            tax_rate: Decimal::new(5, 0),
            ..settings()
        };
        // 10.50 * 5% = 0.525
        assert_eq!(tax(dec(1050), &s), dec(53));
        assert_eq!(tax(Decimal::ZERO, &s), Decimal::ZERO);
    }

    #[test]
    fn test_order_totals_exclusive() {
        let s = SiteSettings {
            tax_rate: Decimal::new(8, 0),
            ..settings()
        };
        let totals = order_totals(dec(2000), FulfillmentMethod::Delivery, &s);
        assert_eq!(totals.subtotal, dec(2000));
        assert_eq!(totals.delivery_fee, dec(500));
        assert_eq!(totals.tax, dec(160));
        assert_eq!(totals.total, dec(2660));
    }

    #[test]
    fn test_order_totals_inclusive() {
        let s = SiteSettings {
            tax_rate: Decimal::new(10, 0),
            tax_inclusive: true,
            ..settings()
        };
        let totals = order_totals(dec(1100), FulfillmentMethod::Pickup, &s);
        assert_eq!(totals.tax, dec(100));
        assert_eq!(totals.delivery_fee, Decimal::ZERO);
        assert_eq!(totals.total, dec(1100));
    }

    #[test]
    fn test_check_minimum_order() {
        let s = SiteSettings {
            minimum_order: dec(1500),
            ..settings()
        };
        assert_eq!(
            check_minimum_order(Decimal::ZERO, &s),
            Err(PricingError::EmptyCart)
        );
        assert_eq!(
            check_minimum_order(dec(1000), &s),
            Err(PricingError::BelowMinimum {
                minimum: "$15.00".to_owned()
            })
        );
        assert!(check_minimum_order(dec(1500), &s).is_ok());
    }

    #[test]
    fn test_settings_missing_fields_default() {
        let s: SiteSettings =
            serde_json::from_str(r#"{"store_name":"Crumbs","currency":"GBP"}"#).unwrap();
        assert_eq!(s.store_name, "Crumbs");
        assert_eq!(s.currency, Currency::Gbp);
        assert_eq!(s.custom_cake_min_notice_days, 2);
        assert_eq!(s.delivery_fee, dec(500));
        assert_eq!(s.format(dec(420)), "£4.20");
    }

    #[test]
    fn test_settings_validation_ranges() {
        assert!(SiteSettings::default().validate().is_ok());

        let bad = SiteSettings {
            store_name: "  ".to_owned(),
            delivery_fee: dec(-1),
            free_delivery_threshold: Some(dec(-100)),
            tax_rate: Decimal::new(101, 0),
            custom_cake_min_notice_days: 61,
            ..SiteSettings::default()
        };
        let errors = bad.validate().unwrap_err();
        for field in [
            "store_name",
            "delivery_fee",
            "free_delivery_threshold",
            "tax_rate",
            "custom_cake_min_notice_days",
        ] {
            assert!(errors.has(field), "expected error for {field}");
        }
    }
}
