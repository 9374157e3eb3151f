//! Fan-out of order and custom request notifications.
//!
//! Each channel is attempted independently. A failure is logged and never
//! propagated: the order or request is already stored by the time these run.

use sqlx::PgPool;

use hearth_core::models::{CustomRequest, Order, OrderItem};
use hearth_core::pricing::SiteSettings;
use hearth_core::{NotificationKind, Phone};

use crate::db::NotificationRepository;
use crate::services::email::EmailService;
use crate::services::whatsapp::WhatsAppClient;

pub struct Notifier<'a> {
    pool: &'a PgPool,
    email: Option<&'a EmailService>,
    whatsapp: Option<&'a WhatsAppClient>,
}

impl<'a> Notifier<'a> {
    #[must_use]
    pub const fn new(
        pool: &'a PgPool,
        email: Option<&'a EmailService>,
        whatsapp: Option<&'a WhatsAppClient>,
    ) -> Self {
        Self {
            pool,
            email,
            whatsapp,
        }
    }

    /// In-app notice for an account holder, confirmation email to the
    /// customer and a WhatsApp alert to the store.
    #[tracing::instrument(skip_all, fields(order_number = %order.order_number))]
    pub async fn order_placed(&self, order: &Order, items: &[OrderItem], settings: &SiteSettings) {
        if let Some(user_id) = order.user_id {
            let link = format!("/account/orders/{}", order.order_number);
            let body = format!(
                "We received order {} for {}. We'll let you know when it's ready.",
                order.order_number,
                settings.format(order.total)
            );
            if let Err(e) = NotificationRepository::new(self.pool)
                .create(
                    user_id,
                    NotificationKind::OrderPlaced,
                    "Order received",
                    &body,
                    Some(&link),
                )
                .await
            {
                tracing::warn!(error = %e, "Failed to store order notification");
            }
        }

        if let Some(email) = self.email
            && let Err(e) = email.send_order_confirmation(order, items, settings).await
        {
            tracing::warn!(error = %e, "Failed to send order confirmation email");
        }

        self.alert_store(settings, &order_alert_text(order, items, settings))
            .await;
    }

    #[tracing::instrument(skip_all, fields(request_id = %request.id))]
    pub async fn custom_request_submitted(&self, request: &CustomRequest, settings: &SiteSettings) {
        if let Some(user_id) = request.user_id {
            let body = format!(
                "Thanks! We'll review your {} cake request and send a quote soon.",
                request.occasion
            );
            if let Err(e) = NotificationRepository::new(self.pool)
                .create(
                    user_id,
                    NotificationKind::CustomRequest,
                    "Custom cake request received",
                    &body,
                    Some("/account/custom-requests"),
                )
                .await
            {
                tracing::warn!(error = %e, "Failed to store custom request notification");
            }
        }

        if let Some(email) = self.email
            && let Err(e) = email.send_custom_request_received(request, settings).await
        {
            tracing::warn!(error = %e, "Failed to send custom request email");
        }

        self.alert_store(settings, &custom_request_alert_text(request, settings))
            .await;
    }

    async fn alert_store(&self, settings: &SiteSettings, text: &str) {
        let Some(client) = self.whatsapp else {
            return;
        };
        let Some(number) = settings.whatsapp_number.as_deref() else {
            tracing::debug!("No store WhatsApp number configured, skipping alert");
            return;
        };
        let phone = match Phone::parse(number) {
            Ok(phone) => phone,
            Err(e) => {
                tracing::warn!(error = %e, "Store WhatsApp number is invalid");
                return;
            }
        };
        if let Err(e) = client.send_text(phone.wa_digits(), text).await {
            tracing::warn!(error = %e, "Failed to send WhatsApp alert");
        }
    }
}

/// Store alert for a new order.
#[must_use]
pub fn order_alert_text(order: &Order, items: &[OrderItem], settings: &SiteSettings) -> String {
    let mut text = format!(
        "New order {}\n{} ({})\n{} on {}",
        order.order_number,
        order.customer_name,
        order.customer_phone,
        order.fulfillment_method.label(),
        order.delivery_date.format("%a %d %b %Y"),
    );
    if let Some(slot) = &order.delivery_slot {
        text.push_str(&format!(", {slot}"));
    }
    text.push('\n');
    for item in items {
        text.push_str(&format!("- {} x {}", item.quantity, item.product_name));
        if let Some(message) = &item.cake_message {
            text.push_str(&format!(" (\"{message}\")"));
        }
        text.push('\n');
    }
    text.push_str(&format!("Total: {}", settings.format(order.total)));
    text
}

/// Store alert for a new custom cake request.
#[must_use]
pub fn custom_request_alert_text(request: &CustomRequest, settings: &SiteSettings) -> String {
    let mut text = format!(
        "New custom cake request #{}\n{} ({})\n{}: {} servings, {} tier(s), {} {}\nNeeded {} ({})",
        request.id,
        request.name,
        request.phone,
        request.occasion,
        request.servings,
        request.tiers,
        request.flavor,
        request.shape,
        request.delivery_date.format("%a %d %b %Y"),
        request.fulfillment_method.label(),
    );
    if let Some(budget) = request.budget {
        text.push_str(&format!("\nBudget: {}", settings.format(budget)));
    }
    text
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{NaiveDate, Utc};
    use rust_decimal::Decimal;

    use hearth_core::{Email, FulfillmentMethod, OrderId, OrderItemId, OrderStatus, ProductId};

    use super::*;

    fn order() -> Order {
        Order {
            id: OrderId::new(1),
            order_number: "HB-260412-7KQ2".to_owned(),
            user_id: None,
            customer_name: "Ada Baker".to_owned(),
            customer_email: Email::parse("ada@example.com").unwrap(),
            customer_phone: "+1 555 0100".to_owned(),
            fulfillment_method: FulfillmentMethod::Pickup,
            delivery_date: NaiveDate::from_ymd_opt(2026, 4, 14).unwrap(),
            delivery_slot: Some("9am - 12pm".to_owned()),
            delivery_address: None,
            notes: None,
            status: OrderStatus::Pending,
            subtotal: Decimal::new(2400, 2),
            delivery_fee: Decimal::ZERO,
            tax: Decimal::ZERO,
            total: Decimal::new(2400, 2),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_order_alert_lists_items_and_total() {
        let items = vec![OrderItem {
            id: OrderItemId::new(1),
            order_id: OrderId::new(1),
            product_id: Some(ProductId::new(3)),
            product_name: "Chocolate Cake".to_owned(),
            unit_price: Decimal::new(2400, 2),
            quantity: 1,
            cake_message: Some("Happy 30th".to_owned()),
        }];
        let text = order_alert_text(&order(), &items, &SiteSettings::default());
        assert!(text.starts_with("New order HB-260412-7KQ2"));
        assert!(text.contains("Pickup on Tue 14 Apr 2026, 9am - 12pm"));
        assert!(text.contains("- 1 x Chocolate Cake (\"Happy 30th\")"));
        assert!(text.ends_with("Total: $24.00"));
    }
}
