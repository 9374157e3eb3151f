//! Customer email sent from the back office via SMTP (lettre).
//!
//! Status changes on orders and custom requests are mailed to the customer
//! with a link back to their storefront account.

use askama::Template;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{MultiPart, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;
use thiserror::Error;

use hearth_core::models::{CustomRequest, Order};
use hearth_core::pricing::SiteSettings;
use hearth_core::{CustomRequestStatus, FulfillmentMethod, OrderStatus};

use crate::config::EmailConfig;
use crate::filters;

#[derive(Template)]
#[template(path = "email/order_status.html")]
struct OrderStatusHtml<'a> {
    store_name: &'a str,
    order: &'a Order,
    headline: &'a str,
    account_url: &'a str,
}

#[derive(Template)]
#[template(path = "email/order_status.txt")]
struct OrderStatusText<'a> {
    store_name: &'a str,
    order: &'a Order,
    headline: &'a str,
    account_url: &'a str,
}

#[derive(Template)]
#[template(path = "email/custom_request_update.html")]
struct CustomRequestUpdateHtml<'a> {
    store_name: &'a str,
    request: &'a CustomRequest,
    headline: &'a str,
    account_url: &'a str,
}

#[derive(Template)]
#[template(path = "email/custom_request_update.txt")]
struct CustomRequestUpdateText<'a> {
    store_name: &'a str,
    request: &'a CustomRequest,
    headline: &'a str,
    account_url: &'a str,
}

#[derive(Debug, Error)]
pub enum EmailError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Template rendering error.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

#[derive(Clone)]
pub struct EmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
    storefront_url: String,
}

impl EmailService {
    /// # Errors
    ///
    /// Returns error if the SMTP relay cannot be configured.
    pub fn new(config: &EmailConfig, storefront_url: &str) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.expose_secret().to_string(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            mailer,
            from_address: config.from_address.clone(),
            storefront_url: storefront_url.trim_end_matches('/').to_owned(),
        })
    }

    /// Tell the customer their order moved to a new status.
    ///
    /// # Errors
    ///
    /// Returns error if email fails to send or template fails to render.
    pub async fn send_order_status(
        &self,
        order: &Order,
        settings: &SiteSettings,
    ) -> Result<(), EmailError> {
        let store_name = settings.store_name.as_str();
        let headline = order_headline(order);
        let account_url = format!(
            "{}/account/orders/{}",
            self.storefront_url, order.order_number
        );

        let html = OrderStatusHtml {
            store_name,
            order,
            headline: &headline,
            account_url: &account_url,
        }
        .render()?;
        let text = OrderStatusText {
            store_name,
            order,
            headline: &headline,
            account_url: &account_url,
        }
        .render()?;

        let subject = format!(
            "{store_name}: order {} is {}",
            order.order_number,
            order.status.label().to_lowercase()
        );
        self.send_multipart_email(order.customer_email.as_str(), &subject, &text, &html)
            .await
    }

    /// Tell the customer about a quote or decision on their custom cake.
    ///
    /// # Errors
    ///
    /// Returns error if email fails to send or template fails to render.
    pub async fn send_custom_request_update(
        &self,
        request: &CustomRequest,
        settings: &SiteSettings,
    ) -> Result<(), EmailError> {
        let store_name = settings.store_name.as_str();
        let headline = custom_request_headline(request, settings);
        let account_url = format!("{}/account/custom-requests", self.storefront_url);

        let html = CustomRequestUpdateHtml {
            store_name,
            request,
            headline: &headline,
            account_url: &account_url,
        }
        .render()?;
        let text = CustomRequestUpdateText {
            store_name,
            request,
            headline: &headline,
            account_url: &account_url,
        }
        .render()?;

        let subject = format!("{store_name}: update on your custom cake request");
        self.send_multipart_email(request.email.as_str(), &subject, &text, &html)
            .await
    }

    async fn send_multipart_email(
        &self,
        to: &str,
        subject: &str,
        text_body: &str,
        html_body: &str,
    ) -> Result<(), EmailError> {
        let email = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|_| EmailError::InvalidAddress(self.from_address.clone()))?,
            )
            .to(to
                .parse()
                .map_err(|_| EmailError::InvalidAddress(to.to_string()))?)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text_body.to_string()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_body.to_string()),
                    ),
            )?;

        self.mailer.send(email).await?;

        tracing::info!(subject = %subject, "Email sent");
        Ok(())
    }
}

/// One sentence describing where the order is now.
#[must_use]
pub fn order_headline(order: &Order) -> String {
    let number = &order.order_number;
    match order.status {
        OrderStatus::Pending => format!("Order {number} is waiting for confirmation."),
        OrderStatus::Confirmed => format!("Order {number} is confirmed."),
        OrderStatus::Baking => format!("Order {number} is in the oven."),
        OrderStatus::Ready => match order.fulfillment_method {
            FulfillmentMethod::Pickup => format!("Order {number} is ready for pickup."),
            FulfillmentMethod::Delivery => format!("Order {number} is packed and ready to go."),
        },
        OrderStatus::OutForDelivery => format!("Order {number} is out for delivery."),
        OrderStatus::Delivered => format!("Order {number} has been delivered. Enjoy!"),
        OrderStatus::Cancelled => format!("Order {number} has been cancelled."),
    }
}

/// One sentence describing the decision on a custom request.
#[must_use]
pub fn custom_request_headline(request: &CustomRequest, settings: &SiteSettings) -> String {
    let occasion = &request.occasion;
    match request.status {
        CustomRequestStatus::Pending | CustomRequestStatus::Reviewing => {
            format!("We're reviewing your {occasion} cake request.")
        }
        CustomRequestStatus::Quoted => request.quoted_price.map_or_else(
            || format!("We've prepared a quote for your {occasion} cake."),
            |price| {
                format!(
                    "Your {occasion} cake is quoted at {}.",
                    settings.format(price)
                )
            },
        ),
        CustomRequestStatus::Accepted => format!("Your {occasion} cake is booked in."),
        CustomRequestStatus::Rejected => {
            format!("Unfortunately we can't take on your {occasion} cake request.")
        }
        CustomRequestStatus::Completed => format!("Your {occasion} cake is complete."),
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    #![allow(clippy::unwrap_used)]

    use chrono::{NaiveDate, Utc};
    use rust_decimal::Decimal;

    use hearth_core::models::{CustomRequest, Order};
    use hearth_core::{
        CustomRequestId, CustomRequestStatus, Email, FulfillmentMethod, OrderId, OrderStatus,
    };

    pub fn order(status: OrderStatus, method: FulfillmentMethod) -> Order {
        let now = Utc::now();
        Order {
            id: OrderId::new(12),
            order_number: "HB-261019-0012".to_owned(),
            user_id: None,
            customer_name: "Ada Baker".to_owned(),
            customer_email: Email::parse("ada@example.com").unwrap(),
            customer_phone: "+15550001111".to_owned(),
            fulfillment_method: method,
            delivery_date: NaiveDate::from_ymd_opt(2026, 10, 24).unwrap(),
            delivery_slot: None,
            delivery_address: None,
            notes: None,
            status,
            subtotal: Decimal::new(4000, 2),
            delivery_fee: Decimal::ZERO,
            tax: Decimal::ZERO,
            total: Decimal::new(4000, 2),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn custom_request(status: CustomRequestStatus, quoted: Option<Decimal>) -> CustomRequest {
        let now = Utc::now();
        CustomRequest {
            id: CustomRequestId::new(3),
            user_id: None,
            status,
            name: "Ada Baker".to_owned(),
            email: Email::parse("ada@example.com").unwrap(),
            phone: "+15550001111".to_owned(),
            occasion: "birthday".to_owned(),
            servings: 20,
            tiers: 2,
            shape: "round".to_owned(),
            flavor: "lemon".to_owned(),
            filling: None,
            frosting: None,
            dietary_notes: None,
            design_description: "Pale yellow with pressed flowers".to_owned(),
            cake_message: None,
            color_theme: None,
            reference_image_url: None,
            budget: None,
            fulfillment_method: FulfillmentMethod::Pickup,
            delivery_date: NaiveDate::from_ymd_opt(2026, 11, 2).unwrap(),
            delivery_slot: None,
            delivery_address: None,
            notes: None,
            quoted_price: quoted,
            admin_notes: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::fixtures::{custom_request, order};
    use super::*;

    #[test]
    fn test_ready_headline_depends_on_fulfillment() {
        let pickup = order(OrderStatus::Ready, FulfillmentMethod::Pickup);
        assert_eq!(
            order_headline(&pickup),
            "Order HB-261019-0012 is ready for pickup."
        );
        let delivery = order(OrderStatus::Ready, FulfillmentMethod::Delivery);
        assert!(order_headline(&delivery).contains("ready to go"));
    }

    #[test]
    fn test_quoted_headline_includes_price() {
        let settings = SiteSettings::default();
        let request = custom_request(CustomRequestStatus::Quoted, Some(Decimal::new(8500, 2)));
        let headline = custom_request_headline(&request, &settings);
        assert!(headline.contains(&settings.format(Decimal::new(8500, 2))));
    }

    #[test]
    fn test_quoted_headline_without_price() {
        let request = custom_request(CustomRequestStatus::Quoted, None);
        assert_eq!(
            custom_request_headline(&request, &SiteSettings::default()),
            "We've prepared a quote for your birthday cake."
        );
    }
}
