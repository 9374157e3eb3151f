//! Domain records shared by the storefront and the back office.
//!
//! These are plain data. Each binary's repositories map database rows into
//! them and handle lenient decoding of status columns.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{
    AdminRole, AdminUserId, AnnouncementId, CategoryId, CustomRequestId, CustomRequestStatus,
    Email, FulfillmentMethod, HeroSlideId, ModerationStatus, NotificationId, NotificationKind,
    OrderId, OrderItemId, OrderStatus, ProductId, Rating, ReviewId, TestimonialId, UserId,
    WishlistItemId,
};

// =============================================================================
// Catalog
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub sort_order: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub category_id: Option<CategoryId>,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub price: Decimal,
    pub image_url: Option<String>,
    /// Hidden from the catalog and dropped from carts when false.
    pub is_available: bool,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Orders
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    /// Customer-facing reference, `HB-YYMMDD-XXXX`.
    pub order_number: String,
    /// Set when the order was placed while signed in.
    pub user_id: Option<UserId>,
    pub customer_name: String,
    pub customer_email: Email,
    pub customer_phone: String,
    pub fulfillment_method: FulfillmentMethod,
    pub delivery_date: NaiveDate,
    pub delivery_slot: Option<String>,
    pub delivery_address: Option<String>,
    pub notes: Option<String>,
    pub status: OrderStatus,
    pub subtotal: Decimal,
    pub delivery_fee: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    /// `None` once the product has been deleted from the catalog.
    pub product_id: Option<ProductId>,
    /// Snapshot of the name at order time.
    pub product_name: String,
    /// Snapshot of the price at order time.
    pub unit_price: Decimal,
    pub quantity: i32,
    pub cake_message: Option<String>,
}

impl OrderItem {
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

// =============================================================================
// Custom cake requests
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomRequest {
    pub id: CustomRequestId,
    pub user_id: Option<UserId>,
    pub status: CustomRequestStatus,
    pub name: String,
    pub email: Email,
    pub phone: String,
    pub occasion: String,
    pub servings: i32,
    pub tiers: i32,
    pub shape: String,
    pub flavor: String,
    pub filling: Option<String>,
    pub frosting: Option<String>,
    pub dietary_notes: Option<String>,
    pub design_description: String,
    pub cake_message: Option<String>,
    pub color_theme: Option<String>,
    pub reference_image_url: Option<String>,
    pub budget: Option<Decimal>,
    pub fulfillment_method: FulfillmentMethod,
    pub delivery_date: NaiveDate,
    pub delivery_slot: Option<String>,
    pub delivery_address: Option<String>,
    pub notes: Option<String>,
    /// Set by staff when the request is quoted.
    pub quoted_price: Option<Decimal>,
    /// Internal notes, never shown to the customer.
    pub admin_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Social proof
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub id: ReviewId,
    pub product_id: ProductId,
    pub user_id: Option<UserId>,
    pub author_name: String,
    pub rating: Rating,
    pub comment: String,
    pub status: ModerationStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Testimonial {
    pub id: TestimonialId,
    pub author_name: String,
    /// Short context line such as "Wedding cake, June".
    pub author_title: Option<String>,
    pub content: String,
    pub rating: Rating,
    pub image_url: Option<String>,
    pub status: ModerationStatus,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Content
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Announcement {
    pub id: AnnouncementId,
    pub message: String,
    pub link_url: Option<String>,
    pub is_active: bool,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Announcement {
    /// Active and inside its optional start/end window.
    #[must_use]
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.is_active
            && self.starts_at.is_none_or(|start| start <= now)
            && self.ends_at.is_none_or(|end| now < end)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeroSlide {
    pub id: HeroSlideId,
    pub title: String,
    pub subtitle: Option<String>,
    pub image_url: String,
    pub cta_label: Option<String>,
    pub cta_url: Option<String>,
    pub position: i32,
}

/// Markdown page such as "about" or "faq".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentPage {
    pub slug: String,
    pub title: String,
    pub body_markdown: String,
    pub is_published: bool,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Accounts
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub user_id: UserId,
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
    pub link: Option<String>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WishlistEntry {
    pub id: WishlistItemId,
    pub product: Product,
    pub added_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: UserId,
    pub email: Email,
    pub name: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminUser {
    pub id: AdminUserId,
    pub email: Email,
    pub name: String,
    pub role: AdminRole,
    pub is_active: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn announcement(
        is_active: bool,
        starts_at: Option<DateTime<Utc>>,
        ends_at: Option<DateTime<Utc>>,
    ) -> Announcement {
        Announcement {
            id: AnnouncementId::new(1),
            message: "Pre-order Easter hot cross buns".to_owned(),
            link_url: None,
            is_active,
            starts_at,
            ends_at,
            created_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_announcement_window() {
        let now = Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap();
        let day = Duration::days(1);

        assert!(announcement(true, None, None).is_live(now));
        assert!(!announcement(false, None, None).is_live(now));
        assert!(announcement(true, Some(now - day), Some(now + day)).is_live(now));
        assert!(!announcement(true, Some(now + day), None).is_live(now));
        assert!(!announcement(true, None, Some(now)).is_live(now));
    }

    #[test]
    fn test_line_total() {
        let item = OrderItem {
            id: OrderItemId::new(1),
            order_id: OrderId::new(1),
            product_id: Some(ProductId::new(3)),
            product_name: "Sourdough loaf".to_owned(),
            unit_price: Decimal::new(650, 2),
            quantity: 3,
            cake_message: None,
        };
        assert_eq!(item.line_total(), Decimal::new(1950, 2));
    }
}
