//! Customer notifications on workflow changes.
//!
//! Each channel is attempted independently and failures are only logged:
//! the status change is already committed when these run.

use sqlx::PgPool;

use hearth_core::models::{CustomRequest, Order};
use hearth_core::pricing::SiteSettings;
use hearth_core::{CustomRequestStatus, NotificationKind};

use crate::db::NotificationRepository;
use crate::services::email::{EmailService, custom_request_headline, order_headline};

pub struct Notifier<'a> {
    pool: &'a PgPool,
    email: Option<&'a EmailService>,
}

impl<'a> Notifier<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool, email: Option<&'a EmailService>) -> Self {
        Self { pool, email }
    }

    /// In-app notice for an account holder and an email to the customer.
    #[tracing::instrument(skip_all, fields(order_number = %order.order_number, status = %order.status))]
    pub async fn order_status_changed(&self, order: &Order, settings: &SiteSettings) {
        if let Some(user_id) = order.user_id {
            let title = format!("Order {}", order.status.label().to_lowercase());
            let link = format!("/account/orders/{}", order.order_number);
            if let Err(e) = NotificationRepository::new(self.pool)
                .create(
                    user_id,
                    NotificationKind::OrderStatus,
                    &title,
                    &order_headline(order),
                    Some(&link),
                )
                .await
            {
                tracing::warn!(error = %e, "Failed to store order status notification");
            }
        }

        if let Some(email) = self.email
            && let Err(e) = email.send_order_status(order, settings).await
        {
            tracing::warn!(error = %e, "Failed to send order status email");
        }
    }

    /// Notify only when the status moved; note edits alone are silent.
    #[tracing::instrument(skip_all, fields(request_id = %request.id, status = %request.status))]
    pub async fn custom_request_updated(
        &self,
        request: &CustomRequest,
        previous: CustomRequestStatus,
        settings: &SiteSettings,
    ) {
        if !should_notify_request(previous, request.status) {
            return;
        }

        if let Some(user_id) = request.user_id {
            if let Err(e) = NotificationRepository::new(self.pool)
                .create(
                    user_id,
                    NotificationKind::CustomRequestUpdate,
                    "Custom cake update",
                    &custom_request_headline(request, settings),
                    Some("/account/custom-requests"),
                )
                .await
            {
                tracing::warn!(error = %e, "Failed to store custom request notification");
            }
        }

        if let Some(email) = self.email
            && let Err(e) = email.send_custom_request_update(request, settings).await
        {
            tracing::warn!(error = %e, "Failed to send custom request email");
        }
    }
}

/// A customer hears about a request when its status changes, except for the
/// internal move from pending to reviewing.
#[must_use]
pub fn should_notify_request(previous: CustomRequestStatus, next: CustomRequestStatus) -> bool {
    previous != next
        && !matches!(
            (previous, next),
            (CustomRequestStatus::Pending, CustomRequestStatus::Reviewing)
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unchanged_status_is_silent() {
        for status in CustomRequestStatus::ALL {
            assert!(!should_notify_request(*status, *status));
        }
    }

    #[test]
    fn test_internal_review_is_silent() {
        assert!(!should_notify_request(
            CustomRequestStatus::Pending,
            CustomRequestStatus::Reviewing
        ));
    }

    #[test]
    fn test_quote_notifies() {
        assert!(should_notify_request(
            CustomRequestStatus::Reviewing,
            CustomRequestStatus::Quoted
        ));
        assert!(should_notify_request(
            CustomRequestStatus::Pending,
            CustomRequestStatus::Rejected
        ));
    }
}
