//! Checkout: form validation, order numbers and order placement.

use chrono::{Datelike, NaiveDate};
use rand::Rng;
use serde::Deserialize;
use sqlx::PgPool;

use hearth_core::custom_request::check_date;
use hearth_core::models::{Order, OrderItem};
use hearth_core::pricing::{self, SiteSettings};
use hearth_core::validation::ValidationErrors;
use hearth_core::{Email, FulfillmentMethod, Phone, UserId};

use crate::db::orders::{NewOrder, NewOrderItem};
use crate::db::{OrderRepository, RepositoryError};
use crate::models::PricedCart;

/// Suffix alphabet without look-alikes (0/O, 1/I/L).
const ORDER_SUFFIX_CHARS: &[u8] = b"23456789ABCDEFGHJKMNPQRSTUVWXYZ";
const ORDER_SUFFIX_LEN: usize = 4;

/// Attempts at finding an unused order number before giving up.
const ORDER_NUMBER_ATTEMPTS: usize = 3;

const MAX_NOTES: usize = 1000;

/// Raw checkout form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckoutForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub fulfillment_method: String,
    #[serde(default)]
    pub delivery_date: String,
    #[serde(default)]
    pub delivery_slot: String,
    #[serde(default)]
    pub delivery_address: String,
    #[serde(default)]
    pub notes: String,
}

/// A checkout form that passed validation.
#[derive(Debug, Clone)]
pub struct ValidCheckout {
    pub name: String,
    pub email: Email,
    pub phone: Phone,
    pub method: FulfillmentMethod,
    pub delivery_date: NaiveDate,
    pub delivery_slot: Option<String>,
    pub delivery_address: Option<String>,
    pub notes: Option<String>,
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_owned())
}

impl CheckoutForm {
    /// Validate every field, collecting all failures.
    ///
    /// # Errors
    ///
    /// Returns each failed field with a display message.
    pub fn validate(
        &self,
        today: NaiveDate,
        settings: &SiteSettings,
    ) -> Result<ValidCheckout, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let name = self.name.trim();
        if name.is_empty() {
            errors.add("name", "Name is required");
        }
        let email = Email::parse(&self.email)
            .map_err(|e| errors.add("email", format!("Email: {e}")))
            .ok();
        let phone = Phone::parse(&self.phone)
            .map_err(|e| errors.add("phone", format!("Phone: {e}")))
            .ok();
        let method = self
            .fulfillment_method
            .parse::<FulfillmentMethod>()
            .map_err(|_| errors.add("fulfillment_method", "Choose delivery or pickup"))
            .ok();
        let delivery_date = check_date(self.delivery_date.trim(), today, 0)
            .map_err(|message| errors.add("delivery_date", message))
            .ok();

        let delivery_address = non_empty(&self.delivery_address);
        if method == Some(FulfillmentMethod::Delivery) && delivery_address.is_none() {
            errors.add("delivery_address", "Delivery address is required");
        }

        let delivery_slot = non_empty(&self.delivery_slot);
        if let Some(slot) = &delivery_slot
            && !settings.delivery_slots.is_empty()
            && !settings.delivery_slots.contains(slot)
        {
            errors.add("delivery_slot", "Choose one of the available time slots");
        }

        let notes = non_empty(&self.notes);
        if notes.as_ref().is_some_and(|n| n.chars().count() > MAX_NOTES) {
            errors.add(
                "notes",
                format!("Notes must be at most {MAX_NOTES} characters"),
            );
        }

        let (Some(email), Some(phone), Some(method), Some(delivery_date)) =
            (email, phone, method, delivery_date)
        else {
            return Err(errors);
        };
        errors.into_result()?;

        Ok(ValidCheckout {
            name: name.to_owned(),
            email,
            phone,
            method,
            delivery_date,
            delivery_slot,
            delivery_address: if method == FulfillmentMethod::Delivery {
                delivery_address
            } else {
                None
            },
            notes,
        })
    }
}

/// `HB-YYMMDD-XXXX` for the given date and random suffix.
pub fn generate_order_number(date: NaiveDate, rng: &mut impl Rng) -> String {
    let suffix: String = (0..ORDER_SUFFIX_LEN)
        .map(|_| {
            let i = rng.random_range(0..ORDER_SUFFIX_CHARS.len());
            ORDER_SUFFIX_CHARS.get(i).copied().map_or('X', char::from)
        })
        .collect();
    format!(
        "HB-{:02}{:02}{:02}-{suffix}",
        date.year() % 100,
        date.month(),
        date.day()
    )
}

/// Store the order and its lines. Retries with a fresh number when the
/// generated one is already taken.
///
/// # Errors
///
/// Returns `RepositoryError` if the insert fails, including repeated number
/// collisions.
pub async fn place_order(
    pool: &PgPool,
    checkout: &ValidCheckout,
    cart: &PricedCart,
    settings: &SiteSettings,
    user_id: Option<UserId>,
    today: NaiveDate,
) -> Result<(Order, Vec<OrderItem>), RepositoryError> {
    let totals = pricing::order_totals(cart.subtotal, checkout.method, settings);
    let items: Vec<NewOrderItem> = cart
        .lines
        .iter()
        .map(|line| NewOrderItem {
            product_id: line.product.id,
            product_name: line.product.name.clone(),
            unit_price: line.product.price,
            quantity: i32::try_from(line.quantity).unwrap_or(i32::MAX),
            cake_message: line.cake_message.clone(),
        })
        .collect();

    let repo = OrderRepository::new(pool);
    let mut last_error = RepositoryError::Conflict("order number".to_owned());

    for _ in 0..ORDER_NUMBER_ATTEMPTS {
        let order_number = generate_order_number(today, &mut rand::rng());
        let new_order = NewOrder {
            order_number: &order_number,
            user_id,
            customer_name: &checkout.name,
            customer_email: &checkout.email,
            customer_phone: checkout.phone.as_str(),
            fulfillment_method: checkout.method,
            delivery_date: checkout.delivery_date,
            delivery_slot: checkout.delivery_slot.as_deref(),
            delivery_address: checkout.delivery_address.as_deref(),
            notes: checkout.notes.as_deref(),
            totals,
        };

        match repo.create(&new_order, &items).await {
            Ok(order) => {
                let stored = repo.items(order.id).await?;
                return Ok((order, stored));
            }
            Err(RepositoryError::Conflict(msg)) => {
                tracing::warn!(order_number = %order_number, "Order number collision, retrying");
                last_error = RepositoryError::Conflict(msg);
            }
            Err(e) => return Err(e),
        }
    }

    Err(last_error)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 4, 10).unwrap()
    }

    fn form() -> CheckoutForm {
        CheckoutForm {
            name: "Ada Baker".to_owned(),
            email: "Ada@Example.com".to_owned(),
            phone: "+1 (555) 010-0100".to_owned(),
            fulfillment_method: "delivery".to_owned(),
            delivery_date: "2026-04-11".to_owned(),
            delivery_slot: String::new(),
            delivery_address: "1 High Street".to_owned(),
            notes: String::new(),
        }
    }

    #[test]
    fn test_valid_form() {
        let valid = form().validate(today(), &SiteSettings::default()).unwrap();
        assert_eq!(valid.email.as_str(), "ada@example.com");
        assert_eq!(valid.method, FulfillmentMethod::Delivery);
        assert_eq!(valid.delivery_address.as_deref(), Some("1 High Street"));
        assert_eq!(valid.notes, None);
    }

    #[test]
    fn test_past_date_rejected() {
        let mut f = form();
        f.delivery_date = "2026-04-09".to_owned();
        let errors = f.validate(today(), &SiteSettings::default()).unwrap_err();
        assert_eq!(errors.get("delivery_date"), Some("Date cannot be in the past"));
    }

    #[test]
    fn test_missing_date_rejected() {
        let mut f = form();
        f.delivery_date = String::new();
        let errors = f.validate(today(), &SiteSettings::default()).unwrap_err();
        assert!(errors.has("delivery_date"));
    }

    #[test]
    fn test_delivery_requires_address_but_pickup_does_not() {
        let mut f = form();
        f.delivery_address = "  ".to_owned();
        let errors = f.validate(today(), &SiteSettings::default()).unwrap_err();
        assert!(errors.has("delivery_address"));

        f.fulfillment_method = "pickup".to_owned();
        let valid = f.validate(today(), &SiteSettings::default()).unwrap();
        assert_eq!(valid.delivery_address, None);
    }

    #[test]
    fn test_collects_all_errors() {
        let errors = CheckoutForm::default()
            .validate(today(), &SiteSettings::default())
            .unwrap_err();
        for field in ["name", "email", "phone", "fulfillment_method", "delivery_date"] {
            assert!(errors.has(field), "{field}");
        }
    }

    #[test]
    fn test_unknown_slot_rejected() {
        let mut f = form();
        f.delivery_slot = "midnight".to_owned();
        let errors = f.validate(today(), &SiteSettings::default()).unwrap_err();
        assert!(errors.has("delivery_slot"));
    }

    #[test]
    fn test_order_number_format() {
        let mut rng = StdRng::seed_from_u64(7);
        let number = generate_order_number(today(), &mut rng);
        assert_eq!(number.len(), "HB-260410-XXXX".len());
        assert!(number.starts_with("HB-260410-"));
        assert!(
            number
                .chars()
                .skip(10)
                .all(|c| ORDER_SUFFIX_CHARS.contains(&(c as u8)))
        );
    }
}
