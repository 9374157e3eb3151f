//! Aggregates for the dashboard and analytics pages.

use std::collections::HashMap;

use chrono::{Days, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::filters::Moderated;
use crate::models::{CustomRequest, Order, OrderItem};
use crate::types::{CustomRequestStatus, ModerationStatus, OrderStatus, Rating};

/// Number of orders in each status. Every status is present, zero or not.
#[must_use]
pub fn status_counts(orders: &[Order]) -> Vec<(OrderStatus, usize)> {
    OrderStatus::ALL
        .iter()
        .map(|&status| (status, orders.iter().filter(|o| o.status == status).count()))
        .collect()
}

/// Number of custom requests in each status, in workflow order.
#[must_use]
pub fn request_status_counts(requests: &[CustomRequest]) -> Vec<(CustomRequestStatus, usize)> {
    CustomRequestStatus::ALL
        .iter()
        .map(|&status| (status, requests.iter().filter(|r| r.status == status).count()))
        .collect()
}

/// Number of reviews or testimonials in each moderation state.
#[must_use]
pub fn moderation_counts<T: Moderated>(items: &[T]) -> Vec<(ModerationStatus, usize)> {
    ModerationStatus::ALL
        .iter()
        .map(|&status| {
            let n = items
                .iter()
                .filter(|i| i.moderation_status() == status)
                .count();
            (status, n)
        })
        .collect()
}

/// Headline numbers for the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrderStats {
    pub total_orders: usize,
    /// Sum of totals, cancelled orders excluded.
    pub revenue: Decimal,
    /// Revenue divided by revenue-counting orders.
    pub average_order_value: Decimal,
    pub open_orders: usize,
    pub orders_today: usize,
}

impl OrderStats {
    #[must_use]
    pub fn compute(orders: &[Order], today: NaiveDate) -> Self {
        let mut revenue = Decimal::ZERO;
        let mut counted = 0u32;
        let mut open_orders = 0;
        let mut orders_today = 0;

        for order in orders {
            if order.status.counts_toward_revenue() {
                revenue += order.total;
                counted += 1;
            }
            if order.status.is_open() {
                open_orders += 1;
            }
            if order.created_at.date_naive() == today {
                orders_today += 1;
            }
        }

        let average_order_value = if counted == 0 {
            Decimal::ZERO
        } else {
            (revenue / Decimal::from(counted))
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        };

        Self {
            total_orders: orders.len(),
            revenue,
            average_order_value,
            open_orders,
            orders_today,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DailyRevenue {
    pub date: NaiveDate,
    pub orders: usize,
    pub revenue: Decimal,
}

/// Revenue per day for the `days` days ending `today`, oldest first.
///
/// Days without orders are present with zero revenue. Cancelled orders are
/// excluded.
#[must_use]
pub fn daily_revenue(orders: &[Order], days: u32, today: NaiveDate) -> Vec<DailyRevenue> {
    let mut series: Vec<DailyRevenue> = (0..days)
        .rev()
        .filter_map(|back| today.checked_sub_days(Days::new(u64::from(back))))
        .map(|date| DailyRevenue {
            date,
            orders: 0,
            revenue: Decimal::ZERO,
        })
        .collect();

    let index: HashMap<NaiveDate, usize> = series
        .iter()
        .enumerate()
        .map(|(i, d)| (d.date, i))
        .collect();

    for order in orders.iter().filter(|o| o.status.counts_toward_revenue()) {
        if let Some(day) = index
            .get(&order.created_at.date_naive())
            .and_then(|&i| series.get_mut(i))
        {
            day.orders += 1;
            day.revenue += order.total;
        }
    }

    series
}

/// Units and revenue for one product across orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductSales {
    pub name: String,
    pub quantity: i64,
    pub revenue: Decimal,
}

/// Best sellers by units sold, then by revenue, then by name.
///
/// Items are grouped by their name snapshot so sales of since-deleted products
/// still count.
#[must_use]
pub fn top_products(items: &[OrderItem], n: usize) -> Vec<ProductSales> {
    let mut by_name: HashMap<&str, ProductSales> = HashMap::new();
    for item in items {
        let entry = by_name
            .entry(item.product_name.as_str())
            .or_insert_with(|| ProductSales {
                name: item.product_name.clone(),
                quantity: 0,
                revenue: Decimal::ZERO,
            });
        entry.quantity += i64::from(item.quantity);
        entry.revenue += item.line_total();
    }

    let mut sales: Vec<ProductSales> = by_name.into_values().collect();
    sales.sort_by(|a, b| {
        b.quantity
            .cmp(&a.quantity)
            .then_with(|| b.revenue.cmp(&a.revenue))
            .then_with(|| a.name.cmp(&b.name))
    });
    sales.truncate(n);
    sales
}

/// Mean rating to one decimal place, `None` when there are no ratings.
#[must_use]
pub fn average_rating(ratings: impl IntoIterator<Item = Rating>) -> Option<Decimal> {
    let (sum, count) = ratings
        .into_iter()
        .fold((0u32, 0u32), |(sum, count), r| (sum + u32::from(r.get()), count + 1));
    (count > 0).then(|| {
        (Decimal::from(sum) / Decimal::from(count))
            .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
    })
}

/// Count of each star value, from 5 down to 1.
#[must_use]
pub fn rating_histogram(ratings: impl IntoIterator<Item = Rating>) -> Vec<(u8, usize)> {
    let mut counts = [0usize; 5];
    for r in ratings {
        if let Some(slot) = counts.get_mut(usize::from(r.get() - 1)) {
            *slot += 1;
        }
    }
    (Rating::MIN..=Rating::MAX)
        .rev()
        .map(|star| (star, counts.get(usize::from(star - 1)).copied().unwrap_or(0)))
        .collect()
}

/// Share of a total as a whole percentage, for bar widths.
#[must_use]
pub fn percent(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    u32::try_from(part.saturating_mul(100) / whole).unwrap_or(100)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::filters::fixtures::order;
    use crate::types::{OrderId, OrderItemId, ProductId};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 4, d).unwrap()
    }

    #[test]
    fn test_status_counts_include_every_status() {
        let orders = vec![
            order(1, OrderStatus::Pending, 1000, 1),
            order(2, OrderStatus::Pending, 1000, 1),
            order(3, OrderStatus::Delivered, 1000, 1),
        ];
        let counts = status_counts(&orders);
        assert_eq!(counts.len(), OrderStatus::ALL.len());
        assert_eq!(counts[0], (OrderStatus::Pending, 2));
        assert!(counts.contains(&(OrderStatus::Delivered, 1)));
        assert!(counts.contains(&(OrderStatus::Baking, 0)));
    }

    #[test]
    fn test_order_stats_exclude_cancelled_revenue() {
        let orders = vec![
            order(1, OrderStatus::Delivered, 2000, 1),
            order(2, OrderStatus::Baking, 1000, 5),
            order(3, OrderStatus::Cancelled, 9900, 5),
        ];
        let stats = OrderStats::compute(&orders, day(5));
        assert_eq!(stats.total_orders, 3);
        assert_eq!(stats.revenue, Decimal::new(3000, 2));
        assert_eq!(stats.average_order_value, Decimal::new(1500, 2));
        assert_eq!(stats.open_orders, 1);
        assert_eq!(stats.orders_today, 2);
    }

    #[test]
    fn test_order_stats_empty() {
        let stats = OrderStats::compute(&[], day(1));
        assert_eq!(stats.revenue, Decimal::ZERO);
        assert_eq!(stats.average_order_value, Decimal::ZERO);
    }

    #[test]
    fn test_daily_revenue_zero_fills() {
        let orders = vec![
            order(1, OrderStatus::Delivered, 1000, 3),
            order(2, OrderStatus::Pending, 500, 3),
            order(3, OrderStatus::Cancelled, 700, 4),
            order(4, OrderStatus::Ready, 250, 1),
        ];
        let series = daily_revenue(&orders, 3, day(5));
        assert_eq!(series.len(), 3);
        assert_eq!(series[0].date, day(3));
        assert_eq!(series[0].orders, 2);
        assert_eq!(series[0].revenue, Decimal::new(1500, 2));
        assert_eq!(series[1].revenue, Decimal::ZERO);
        assert_eq!(series[2].date, day(5));
    }

    #[test]
    fn test_top_products_orders_by_quantity_then_revenue() {
        let item = |name: &str, cents: i64, qty: i32| OrderItem {
            id: OrderItemId::new(1),
            order_id: OrderId::new(1),
            product_id: Some(ProductId::new(1)),
            product_name: name.to_owned(),
            unit_price: Decimal::new(cents, 2),
            quantity: qty,
            cake_message: None,
        };
        let items = vec![
            item("Baguette", 300, 4),
            item("Croissant", 250, 3),
            item("Croissant", 250, 1),
            item("Brownie", 400, 1),
            item("Cookie", 150, 1),
        ];
        let top = top_products(&items, 3);
        assert_eq!(top.len(), 3);
        assert_eq!(top[0].name, "Baguette");
        assert_eq!(top[1].name, "Croissant");
        assert_eq!(top[1].quantity, 4);
        assert_eq!(top[1].revenue, Decimal::new(1000, 2));
        assert_eq!(top[2].name, "Brownie");
    }

    #[test]
    fn test_rating_aggregates() {
        let ratings: Vec<Rating> = [5, 4, 4, 1]
            .into_iter()
            .map(|r| Rating::new(r).unwrap())
            .collect();
        assert_eq!(average_rating(ratings.clone()), Some(Decimal::new(35, 1)));
        assert_eq!(average_rating(Vec::<Rating>::new()), None);
        assert_eq!(
            rating_histogram(ratings),
            vec![(5, 1), (4, 2), (3, 0), (2, 0), (1, 1)]
        );
    }

    #[test]
    fn test_moderation_counts() {
        use chrono::Utc;

        use crate::models::Testimonial;
        use crate::types::TestimonialId;

        let testimonial = |id: i32, status| Testimonial {
            id: TestimonialId::new(id),
            author_name: "Maya".to_owned(),
            author_title: None,
            content: "Best sourdough in town".to_owned(),
            rating: Rating::new(5).unwrap(),
            image_url: None,
            status,
            is_featured: false,
            created_at: Utc::now(),
        };
        let items = vec![
            testimonial(1, ModerationStatus::Pending),
            testimonial(2, ModerationStatus::Approved),
            testimonial(3, ModerationStatus::Pending),
        ];
        assert_eq!(
            moderation_counts(&items),
            vec![
                (ModerationStatus::Pending, 2),
                (ModerationStatus::Approved, 1),
                (ModerationStatus::Rejected, 0),
            ]
        );
    }

    #[test]
    fn test_percent() {
        assert_eq!(percent(1, 4), 25);
        assert_eq!(percent(0, 0), 0);
        assert_eq!(percent(3, 3), 100);
    }
}
