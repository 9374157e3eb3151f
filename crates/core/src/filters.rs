//! Search and filter predicates for back-office list pages.
//!
//! List pages load a collection and narrow it in memory. Query parameters are
//! parsed leniently: blank or unrecognised values mean "no filter".

use chrono::NaiveDate;

use crate::models::{CustomRequest, Order, Review, Testimonial};
use crate::types::{CustomRequestStatus, ModerationStatus, OrderStatus};

/// Parse an optional query value, treating blanks and bad input as absent.
fn lenient<T: std::str::FromStr>(raw: Option<&str>) -> Option<T> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse().ok())
}

fn search_term(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase)
}

fn contains(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

// =============================================================================
// Orders
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    /// Lowercased search term.
    pub search: Option<String>,
    /// Inclusive lower bound on the day the order was placed.
    pub from: Option<NaiveDate>,
    /// Inclusive upper bound on the day the order was placed.
    pub to: Option<NaiveDate>,
}

impl OrderFilter {
    /// Build from raw query parameters.
    #[must_use]
    pub fn from_params(
        status: Option<&str>,
        search: Option<&str>,
        from: Option<&str>,
        to: Option<&str>,
    ) -> Self {
        Self {
            status: lenient(status),
            search: search_term(search),
            from: lenient(from),
            to: lenient(to),
        }
    }

    /// Matches on status, search over number, name, email and phone, and the
    /// placement date range.
    #[must_use]
    pub fn matches(&self, order: &Order) -> bool {
        if self.status.is_some_and(|s| s != order.status) {
            return false;
        }

        let placed = order.created_at.date_naive();
        if self.from.is_some_and(|from| placed < from) || self.to.is_some_and(|to| placed > to) {
            return false;
        }

        self.search.as_deref().is_none_or(|q| {
            contains(&order.order_number, q)
                || contains(&order.customer_name, q)
                || order.customer_email.as_str().contains(q)
                || order.customer_phone.contains(q)
        })
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.status.is_some() || self.search.is_some() || self.from.is_some() || self.to.is_some()
    }
}

/// Orders matching `filter`, in their original order.
#[must_use]
pub fn filter_orders<'a>(orders: &'a [Order], filter: &OrderFilter) -> Vec<&'a Order> {
    orders.iter().filter(|o| filter.matches(o)).collect()
}

// =============================================================================
// Custom requests
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomRequestFilter {
    pub status: Option<CustomRequestStatus>,
    pub search: Option<String>,
}

impl CustomRequestFilter {
    #[must_use]
    pub fn from_params(status: Option<&str>, search: Option<&str>) -> Self {
        Self {
            status: lenient(status),
            search: search_term(search),
        }
    }

    #[must_use]
    pub fn matches(&self, request: &CustomRequest) -> bool {
        if self.status.is_some_and(|s| s != request.status) {
            return false;
        }
        self.search.as_deref().is_none_or(|q| {
            contains(&request.name, q)
                || request.email.as_str().contains(q)
                || request.phone.contains(q)
                || contains(&request.occasion, q)
                || contains(&request.flavor, q)
        })
    }
}

#[must_use]
pub fn filter_custom_requests<'a>(
    requests: &'a [CustomRequest],
    filter: &CustomRequestFilter,
) -> Vec<&'a CustomRequest> {
    requests.iter().filter(|r| filter.matches(r)).collect()
}

// =============================================================================
// Moderated content
// =============================================================================

/// Content that passes through moderation before it is shown publicly.
pub trait Moderated {
    fn moderation_status(&self) -> ModerationStatus;

    /// Text searched by the moderation queue.
    fn search_fields(&self) -> [&str; 2];
}

impl Moderated for Review {
    fn moderation_status(&self) -> ModerationStatus {
        self.status
    }

    fn search_fields(&self) -> [&str; 2] {
        [self.author_name.as_str(), self.comment.as_str()]
    }
}

impl Moderated for Testimonial {
    fn moderation_status(&self) -> ModerationStatus {
        self.status
    }

    fn search_fields(&self) -> [&str; 2] {
        [self.author_name.as_str(), self.content.as_str()]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModerationFilter {
    pub status: Option<ModerationStatus>,
    pub search: Option<String>,
}

impl ModerationFilter {
    #[must_use]
    pub fn from_params(status: Option<&str>, search: Option<&str>) -> Self {
        Self {
            status: lenient(status),
            search: search_term(search),
        }
    }

    #[must_use]
    pub fn matches<T: Moderated>(&self, item: &T) -> bool {
        if self.status.is_some_and(|s| s != item.moderation_status()) {
            return false;
        }
        self.search
            .as_deref()
            .is_none_or(|q| item.search_fields().iter().any(|f| contains(f, q)))
    }

    #[must_use]
    pub fn apply<'a, T: Moderated>(&self, items: &'a [T]) -> Vec<&'a T> {
        items.iter().filter(|i| self.matches(*i)).collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod fixtures {
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    use crate::models::Order;
    use crate::types::{Email, FulfillmentMethod, OrderId, OrderStatus};

    pub fn order(id: i32, status: OrderStatus, total_cents: i64, day: u32) -> Order {
        let created_at = Utc.with_ymd_and_hms(2026, 4, day, 10, 30, 0).unwrap();
        Order {
            id: OrderId::new(id),
            order_number: format!("HB-2604{day:02}-{id:04}"),
            user_id: None,
            customer_name: format!("Customer {id}"),
            customer_email: Email::parse(&format!("customer{id}@example.com")).unwrap(),
            customer_phone: format!("55501{id:05}"),
            fulfillment_method: FulfillmentMethod::Delivery,
            delivery_date: created_at.date_naive(),
            delivery_slot: None,
            delivery_address: Some("1 High Street".to_owned()),
            notes: None,
            status,
            subtotal: Decimal::new(total_cents, 2),
            delivery_fee: Decimal::ZERO,
            tax: Decimal::ZERO,
            total: Decimal::new(total_cents, 2),
            created_at,
            updated_at: created_at,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use chrono::Utc;

    use super::fixtures::order;
    use super::*;
    use crate::types::{ProductId, Rating, ReviewId};

    #[test]
    fn test_status_filter_returns_only_matching_orders() {
        let orders = vec![
            order(1, OrderStatus::Pending, 1000, 1),
            order(2, OrderStatus::Baking, 2000, 1),
            order(3, OrderStatus::Pending, 3000, 2),
            order(4, OrderStatus::Delivered, 4000, 3),
        ];
        let filter = OrderFilter::from_params(Some("pending"), None, None, None);
        let matched = filter_orders(&orders, &filter);
        assert_eq!(matched.len(), 2);
        assert!(matched.iter().all(|o| o.status == OrderStatus::Pending));
    }

    #[test]
    fn test_blank_and_unknown_params_mean_no_filter() {
        let filter = OrderFilter::from_params(Some(""), Some("   "), Some("not-a-date"), None);
        assert_eq!(filter, OrderFilter::default());
        assert!(!filter.is_active());

        let filter = OrderFilter::from_params(Some("teleported"), None, None, None);
        assert_eq!(filter.status, None);
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let orders = vec![
            order(1, OrderStatus::Pending, 1000, 1),
            order(2, OrderStatus::Pending, 1000, 1),
        ];
        let by_name = OrderFilter::from_params(None, Some("CUSTOMER 2"), None, None);
        assert_eq!(filter_orders(&orders, &by_name).len(), 1);

        let by_number = OrderFilter::from_params(None, Some("hb-260401-0001"), None, None);
        assert_eq!(filter_orders(&orders, &by_number)[0].id.as_i32(), 1);

        let by_email = OrderFilter::from_params(None, Some("Customer2@"), None, None);
        assert_eq!(filter_orders(&orders, &by_email).len(), 1);
    }

    #[test]
    fn test_date_range_is_inclusive() {
        let orders = vec![
            order(1, OrderStatus::Pending, 1000, 1),
            order(2, OrderStatus::Pending, 1000, 2),
            order(3, OrderStatus::Pending, 1000, 3),
            order(4, OrderStatus::Pending, 1000, 4),
        ];
        let filter = OrderFilter::from_params(None, None, Some("2026-04-02"), Some("2026-04-03"));
        let ids: Vec<i32> = filter_orders(&orders, &filter)
            .iter()
            .map(|o| o.id.as_i32())
            .collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn test_moderation_filter() {
        let review = |id: i32, status, comment: &str| Review {
            id: ReviewId::new(id),
            product_id: ProductId::new(1),
            user_id: None,
            author_name: "Jo".to_owned(),
            rating: Rating::new(5).unwrap(),
            comment: comment.to_owned(),
            status,
            created_at: Utc::now(),
        };
        let reviews = vec![
            review(1, ModerationStatus::Pending, "Best croissant in town"),
            review(2, ModerationStatus::Approved, "Lovely sourdough"),
            review(3, ModerationStatus::Pending, "Sourdough was stale"),
        ];

        let pending = ModerationFilter::from_params(Some("pending"), None);
        assert_eq!(pending.apply(&reviews).len(), 2);

        let sourdough = ModerationFilter::from_params(None, Some("SOURDOUGH"));
        assert_eq!(sourdough.apply(&reviews).len(), 2);

        let both = ModerationFilter::from_params(Some("pending"), Some("sourdough"));
        assert_eq!(both.apply(&reviews)[0].id, ReviewId::new(3));
    }
}
