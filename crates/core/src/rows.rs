//! Database row shapes and their conversion into domain records.
//!
//! Both binaries read the same tables with runtime `sqlx::query_as`. Rows hold
//! raw column values; status columns are read leniently through `from_db`, while
//! emails and ratings that fail validation are reported as corrupt data.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

use crate::models::{
    Announcement, Category, ContentPage, CustomRequest, HeroSlide, Notification, Order, OrderItem,
    Product, Review, Testimonial,
};
use crate::types::{
    AnnouncementId, CategoryId, CustomRequestId, CustomRequestStatus, Email, FulfillmentMethod,
    HeroSlideId, ModerationStatus, NotificationId, NotificationKind, OrderId, OrderItemId,
    OrderStatus, ProductId, Rating, ReviewId, TestimonialId, UserId,
};

/// A stored value that no longer passes domain validation.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid {column} in row {id}: {reason}")]
pub struct RowError {
    pub column: &'static str,
    pub id: i32,
    pub reason: String,
}

fn email(column: &'static str, id: i32, raw: &str) -> Result<Email, RowError> {
    Email::parse(raw).map_err(|e| RowError {
        column,
        id,
        reason: e.to_string(),
    })
}

fn rating(id: i32, raw: i32) -> Result<Rating, RowError> {
    Rating::new(raw).map_err(|e| RowError {
        column: "rating",
        id,
        reason: e.to_string(),
    })
}

// =============================================================================
// Catalog
// =============================================================================

pub const CATEGORY_COLUMNS: &str = "id, name, slug, description, sort_order";

#[derive(Debug, sqlx::FromRow)]
pub struct CategoryRow {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub sort_order: i32,
}

impl From<CategoryRow> for Category {
    fn from(r: CategoryRow) -> Self {
        Self {
            id: r.id,
            name: r.name,
            slug: r.slug,
            description: r.description,
            sort_order: r.sort_order,
        }
    }
}

pub const PRODUCT_COLUMNS: &str = "id, category_id, name, slug, description, price, image_url, \
     is_available, is_featured, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
pub struct ProductRow {
    pub id: ProductId,
    pub category_id: Option<CategoryId>,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub price: Decimal,
    pub image_url: Option<String>,
    pub is_available: bool,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(r: ProductRow) -> Self {
        Self {
            id: r.id,
            category_id: r.category_id,
            name: r.name,
            slug: r.slug,
            description: r.description,
            price: r.price,
            image_url: r.image_url,
            is_available: r.is_available,
            is_featured: r.is_featured,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

// =============================================================================
// Orders
// =============================================================================

pub const ORDER_COLUMNS: &str = "id, order_number, user_id, customer_name, customer_email, \
     customer_phone, fulfillment_method, delivery_date, delivery_slot, delivery_address, notes, \
     status, subtotal, delivery_fee, tax, total, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
pub struct OrderRow {
    pub id: OrderId,
    pub order_number: String,
    pub user_id: Option<UserId>,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub fulfillment_method: Option<String>,
    pub delivery_date: NaiveDate,
    pub delivery_slot: Option<String>,
    pub delivery_address: Option<String>,
    pub notes: Option<String>,
    pub status: Option<String>,
    pub subtotal: Decimal,
    pub delivery_fee: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = RowError;

    fn try_from(r: OrderRow) -> Result<Self, Self::Error> {
        Ok(Self {
            customer_email: email("customer_email", r.id.as_i32(), &r.customer_email)?,
            id: r.id,
            order_number: r.order_number,
            user_id: r.user_id,
            customer_name: r.customer_name,
            customer_phone: r.customer_phone,
            fulfillment_method: FulfillmentMethod::from_db(r.fulfillment_method.as_deref()),
            delivery_date: r.delivery_date,
            delivery_slot: r.delivery_slot,
            delivery_address: r.delivery_address,
            notes: r.notes,
            status: OrderStatus::from_db(r.status.as_deref()),
            subtotal: r.subtotal,
            delivery_fee: r.delivery_fee,
            tax: r.tax,
            total: r.total,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

pub const ORDER_ITEM_COLUMNS: &str =
    "id, order_id, product_id, product_name, unit_price, quantity, cake_message";

#[derive(Debug, sqlx::FromRow)]
pub struct OrderItemRow {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: Option<ProductId>,
    pub product_name: String,
    pub unit_price: Decimal,
    pub quantity: i32,
    pub cake_message: Option<String>,
}

impl From<OrderItemRow> for OrderItem {
    fn from(r: OrderItemRow) -> Self {
        Self {
            id: r.id,
            order_id: r.order_id,
            product_id: r.product_id,
            product_name: r.product_name,
            unit_price: r.unit_price,
            quantity: r.quantity,
            cake_message: r.cake_message,
        }
    }
}

pub const CUSTOM_REQUEST_COLUMNS: &str = "id, user_id, status, name, email, phone, occasion, \
     servings, tiers, shape, flavor, filling, frosting, dietary_notes, design_description, \
     cake_message, color_theme, reference_image_url, budget, fulfillment_method, delivery_date, \
     delivery_slot, delivery_address, notes, quoted_price, admin_notes, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
pub struct CustomRequestRow {
    pub id: CustomRequestId,
    pub user_id: Option<UserId>,
    pub status: Option<String>,
    pub name: String,
    pub email: String,
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
    pub fulfillment_method: Option<String>,
    pub delivery_date: NaiveDate,
    pub delivery_slot: Option<String>,
    pub delivery_address: Option<String>,
    pub notes: Option<String>,
    pub quoted_price: Option<Decimal>,
    pub admin_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<CustomRequestRow> for CustomRequest {
    type Error = RowError;

    fn try_from(r: CustomRequestRow) -> Result<Self, Self::Error> {
        Ok(Self {
            email: email("email", r.id.as_i32(), &r.email)?,
            id: r.id,
            user_id: r.user_id,
            status: CustomRequestStatus::from_db(r.status.as_deref()),
            name: r.name,
            phone: r.phone,
            occasion: r.occasion,
            servings: r.servings,
            tiers: r.tiers,
            shape: r.shape,
            flavor: r.flavor,
            filling: r.filling,
            frosting: r.frosting,
            dietary_notes: r.dietary_notes,
            design_description: r.design_description,
            cake_message: r.cake_message,
            color_theme: r.color_theme,
            reference_image_url: r.reference_image_url,
            budget: r.budget,
            fulfillment_method: FulfillmentMethod::from_db(r.fulfillment_method.as_deref()),
            delivery_date: r.delivery_date,
            delivery_slot: r.delivery_slot,
            delivery_address: r.delivery_address,
            notes: r.notes,
            quoted_price: r.quoted_price,
            admin_notes: r.admin_notes,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

// =============================================================================
// Moderated content
// =============================================================================

pub const REVIEW_COLUMNS: &str =
    "id, product_id, user_id, author_name, rating, comment, status, created_at";

#[derive(Debug, sqlx::FromRow)]
pub struct ReviewRow {
    pub id: ReviewId,
    pub product_id: ProductId,
    pub user_id: Option<UserId>,
    pub author_name: String,
    pub rating: i32,
    pub comment: String,
    pub status: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<ReviewRow> for Review {
    type Error = RowError;

    fn try_from(r: ReviewRow) -> Result<Self, Self::Error> {
        Ok(Self {
            rating: rating(r.id.as_i32(), r.rating)?,
            id: r.id,
            product_id: r.product_id,
            user_id: r.user_id,
            author_name: r.author_name,
            comment: r.comment,
            status: ModerationStatus::from_db(r.status.as_deref()),
            created_at: r.created_at,
        })
    }
}

pub const TESTIMONIAL_COLUMNS: &str =
    "id, author_name, author_title, content, rating, image_url, status, is_featured, created_at";

#[derive(Debug, sqlx::FromRow)]
pub struct TestimonialRow {
    pub id: TestimonialId,
    pub author_name: String,
    pub author_title: Option<String>,
    pub content: String,
    pub rating: i32,
    pub image_url: Option<String>,
    pub status: Option<String>,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<TestimonialRow> for Testimonial {
    type Error = RowError;

    fn try_from(r: TestimonialRow) -> Result<Self, Self::Error> {
        Ok(Self {
            rating: rating(r.id.as_i32(), r.rating)?,
            id: r.id,
            author_name: r.author_name,
            author_title: r.author_title,
            content: r.content,
            image_url: r.image_url,
            status: ModerationStatus::from_db(r.status.as_deref()),
            is_featured: r.is_featured,
            created_at: r.created_at,
        })
    }
}

// =============================================================================
// Site content
// =============================================================================

pub const ANNOUNCEMENT_COLUMNS: &str =
    "id, message, link_url, is_active, starts_at, ends_at, created_at";

#[derive(Debug, sqlx::FromRow)]
pub struct AnnouncementRow {
    pub id: AnnouncementId,
    pub message: String,
    pub link_url: Option<String>,
    pub is_active: bool,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<AnnouncementRow> for Announcement {
    fn from(r: AnnouncementRow) -> Self {
        Self {
            id: r.id,
            message: r.message,
            link_url: r.link_url,
            is_active: r.is_active,
            starts_at: r.starts_at,
            ends_at: r.ends_at,
            created_at: r.created_at,
        }
    }
}

pub const HERO_SLIDE_COLUMNS: &str =
    "id, title, subtitle, image_url, cta_label, cta_url, position";

#[derive(Debug, sqlx::FromRow)]
pub struct HeroSlideRow {
    pub id: HeroSlideId,
    pub title: String,
    pub subtitle: Option<String>,
    pub image_url: String,
    pub cta_label: Option<String>,
    pub cta_url: Option<String>,
    pub position: i32,
}

impl From<HeroSlideRow> for HeroSlide {
    fn from(r: HeroSlideRow) -> Self {
        Self {
            id: r.id,
            title: r.title,
            subtitle: r.subtitle,
            image_url: r.image_url,
            cta_label: r.cta_label,
            cta_url: r.cta_url,
            position: r.position,
        }
    }
}

pub const PAGE_COLUMNS: &str = "slug, title, body_markdown, is_published, updated_at";

#[derive(Debug, sqlx::FromRow)]
pub struct PageRow {
    pub slug: String,
    pub title: String,
    pub body_markdown: String,
    pub is_published: bool,
    pub updated_at: DateTime<Utc>,
}

impl From<PageRow> for ContentPage {
    fn from(r: PageRow) -> Self {
        Self {
            slug: r.slug,
            title: r.title,
            body_markdown: r.body_markdown,
            is_published: r.is_published,
            updated_at: r.updated_at,
        }
    }
}

pub const NOTIFICATION_COLUMNS: &str = "id, user_id, kind, title, body, link, is_read, created_at";

#[derive(Debug, sqlx::FromRow)]
pub struct NotificationRow {
    pub id: NotificationId,
    pub user_id: UserId,
    pub kind: Option<String>,
    pub title: String,
    pub body: String,
    pub link: Option<String>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl From<NotificationRow> for Notification {
    fn from(r: NotificationRow) -> Self {
        Self {
            id: r.id,
            user_id: r.user_id,
            kind: NotificationKind::from_db(r.kind.as_deref()),
            title: r.title,
            body: r.body,
            link: r.link,
            is_read: r.is_read,
            created_at: r.created_at,
        }
    }
}

/// Convert a batch of rows, failing on the first corrupt one.
///
/// # Errors
///
/// Returns the first row that fails domain validation.
pub fn convert_all<R, T>(rows: Vec<R>) -> Result<Vec<T>, RowError>
where
    T: TryFrom<R, Error = RowError>,
{
    rows.into_iter().map(T::try_from).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn order_row(status: Option<&str>, email: &str) -> OrderRow {
        let now = Utc::now();
        OrderRow {
            id: OrderId::new(7),
            order_number: "HB-260401-0007".to_owned(),
            user_id: None,
            customer_name: "Ada".to_owned(),
            customer_email: email.to_owned(),
            customer_phone: "5550100".to_owned(),
            fulfillment_method: None,
            delivery_date: now.date_naive(),
            delivery_slot: None,
            delivery_address: None,
            notes: None,
            status: status.map(str::to_owned),
            subtotal: Decimal::TEN,
            delivery_fee: Decimal::ZERO,
            tax: Decimal::ZERO,
            total: Decimal::TEN,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_missing_status_reads_as_pending() {
        let order = Order::try_from(order_row(None, "ada@example.com")).unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.fulfillment_method, FulfillmentMethod::Delivery);

        let order = Order::try_from(order_row(Some("teleported"), "ada@example.com")).unwrap();
        assert_eq!(order.status, OrderStatus::Pending);

        let order = Order::try_from(order_row(Some("baking"), "ada@example.com")).unwrap();
        assert_eq!(order.status, OrderStatus::Baking);
    }

    #[test]
    fn test_corrupt_email_is_reported() {
        let err = Order::try_from(order_row(None, "not-an-email")).unwrap_err();
        assert_eq!(err.column, "customer_email");
        assert_eq!(err.id, 7);
    }

    #[test]
    fn test_out_of_range_rating_is_reported() {
        let row = ReviewRow {
            id: ReviewId::new(3),
            product_id: ProductId::new(1),
            user_id: None,
            author_name: "Jo".to_owned(),
            rating: 9,
            comment: "Great".to_owned(),
            status: Some("approved".to_owned()),
            created_at: Utc::now(),
        };
        let err = Review::try_from(row).unwrap_err();
        assert_eq!(err.column, "rating");
    }
}
