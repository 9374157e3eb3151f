//! Customer email via SMTP (lettre) with Askama templates.

use askama::Template;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{MultiPart, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;
use thiserror::Error;

use hearth_core::models::{CustomRequest, Order, OrderItem};
use hearth_core::pricing::SiteSettings;

use crate::config::EmailConfig;
use crate::filters;

/// One line of an order as shown in email.
pub struct EmailLine {
    pub name: String,
    pub quantity: i32,
    pub total: String,
    pub cake_message: Option<String>,
}

#[derive(Template)]
#[template(path = "email/order_confirmation.html")]
struct OrderConfirmationHtml<'a> {
    store_name: &'a str,
    order: &'a Order,
    lines: &'a [EmailLine],
    subtotal: String,
    delivery_fee: String,
    tax: String,
    total: String,
    order_url: &'a str,
}

#[derive(Template)]
#[template(path = "email/order_confirmation.txt")]
struct OrderConfirmationText<'a> {
    store_name: &'a str,
    order: &'a Order,
    lines: &'a [EmailLine],
    total: String,
    order_url: &'a str,
}

#[derive(Template)]
#[template(path = "email/custom_request_received.html")]
struct CustomRequestHtml<'a> {
    store_name: &'a str,
    request: &'a CustomRequest,
}

#[derive(Template)]
#[template(path = "email/custom_request_received.txt")]
struct CustomRequestText<'a> {
    store_name: &'a str,
    request: &'a CustomRequest,
}

/// Errors that can occur when sending email.
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

/// Email service for transactional customer email.
#[derive(Clone)]
pub struct EmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
    base_url: String,
}

impl EmailService {
    /// Create a new email service from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the SMTP relay cannot be configured.
    pub fn new(config: &EmailConfig, base_url: &str) -> Result<Self, SmtpError> {
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
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    /// Send the order confirmation to the customer.
    ///
    /// # Errors
    ///
    /// Returns error if email fails to send or template fails to render.
    pub async fn send_order_confirmation(
        &self,
        order: &Order,
        items: &[OrderItem],
        settings: &SiteSettings,
    ) -> Result<(), EmailError> {
        let lines: Vec<EmailLine> = items
            .iter()
            .map(|i| EmailLine {
                name: i.product_name.clone(),
                quantity: i.quantity,
                total: settings.format(i.line_total()),
                cake_message: i.cake_message.clone(),
            })
            .collect();
        let order_url = format!(
            "{}/orders/{}/confirmation",
            self.base_url, order.order_number
        );

        let html = OrderConfirmationHtml {
            store_name: &settings.store_name,
            order,
            lines: &lines,
            subtotal: settings.format(order.subtotal),
            delivery_fee: settings.format(order.delivery_fee),
            tax: settings.format(order.tax),
            total: settings.format(order.total),
            order_url: &order_url,
        }
        .render()?;
        let text = OrderConfirmationText {
            store_name: &settings.store_name,
            order,
            lines: &lines,
            total: settings.format(order.total),
            order_url: &order_url,
        }
        .render()?;

        let subject = format!(
            "{}: order {} received",
            settings.store_name, order.order_number
        );
        self.send_multipart_email(order.customer_email.as_str(), &subject, &text, &html)
            .await
    }

    /// Acknowledge a custom cake request.
    ///
    /// # Errors
    ///
    /// Returns error if email fails to send or template fails to render.
    pub async fn send_custom_request_received(
        &self,
        request: &CustomRequest,
        settings: &SiteSettings,
    ) -> Result<(), EmailError> {
        let store_name = settings.store_name.as_str();
        let html = CustomRequestHtml {
            store_name,
            request,
        }
        .render()?;
        let text = CustomRequestText {
            store_name,
            request,
        }
        .render()?;

        let subject = format!("{store_name}: we received your custom cake request");
        self.send_multipart_email(request.email.as_str(), &subject, &text, &html)
            .await
    }

    /// Send a multipart email with both plain text and HTML versions.
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

        tracing::info!(to = %to, subject = %subject, "Email sent successfully");
        Ok(())
    }
}
