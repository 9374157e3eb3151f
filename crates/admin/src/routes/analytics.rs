//! Sales and feedback analytics over a trailing window.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Router,
    extract::{Query, State},
    routing::get,
};
use chrono::{Days, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Deserialize;
use tracing::instrument;

use hearth_core::CustomRequestStatus;
use hearth_core::analytics::{
    DailyRevenue, OrderStats, ProductSales, average_rating, daily_revenue, percent,
    rating_histogram, request_status_counts, top_products,
};

use crate::db::{CustomRequestRepository, OrderRepository, ReviewRepository};
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAdminAuth;
use crate::routes::context::PageContext;
use crate::state::AppState;

/// Window lengths offered on the page.
pub const WINDOWS: [u32; 3] = [7, 30, 90];
const DEFAULT_WINDOW: u32 = 30;
const TOP_PRODUCTS: usize = 10;

#[derive(Debug, Default, Deserialize)]
pub struct AnalyticsQuery {
    pub days: Option<u32>,
}

/// Snap a requested window to the nearest offered one.
#[must_use]
pub fn window_days(requested: Option<u32>) -> u32 {
    requested.map_or(DEFAULT_WINDOW, |days| {
        WINDOWS
            .iter()
            .copied()
            .min_by_key(|w| w.abs_diff(days))
            .unwrap_or(DEFAULT_WINDOW)
    })
}

/// A window choice in the range picker.
#[derive(Debug, Clone, Copy)]
pub struct WindowLink {
    pub days: u32,
    pub active: bool,
}

/// One day in the revenue chart.
#[derive(Debug, Clone)]
pub struct RevenueBar {
    pub day: DailyRevenue,
    /// Height relative to the best day, 0-100.
    pub height: u32,
}

/// Scale each day against the best day in the window.
#[must_use]
pub fn revenue_bars(series: Vec<DailyRevenue>) -> Vec<RevenueBar> {
    let peak = series
        .iter()
        .map(|d| d.revenue)
        .max()
        .unwrap_or(Decimal::ZERO);
    series
        .into_iter()
        .map(|day| {
            let height = if peak.is_zero() {
                0
            } else {
                (day.revenue * Decimal::ONE_HUNDRED / peak)
                    .round()
                    .to_u32()
                    .unwrap_or(0)
            };
            RevenueBar { day, height }
        })
        .collect()
}

/// A labelled count with its share of the total.
#[derive(Debug, Clone)]
pub struct Bar {
    pub label: String,
    pub count: usize,
    pub percent: u32,
}

fn bars<I>(counts: I) -> Vec<Bar>
where
    I: IntoIterator<Item = (String, usize)>,
{
    let counts: Vec<(String, usize)> = counts.into_iter().collect();
    let total: usize = counts.iter().map(|(_, n)| n).sum();
    counts
        .into_iter()
        .map(|(label, count)| Bar {
            label,
            count,
            percent: percent(count, total),
        })
        .collect()
}

#[derive(Template, WebTemplate)]
#[template(path = "analytics.html")]
pub struct AnalyticsTemplate {
    pub ctx: PageContext,
    pub days: u32,
    pub windows: Vec<WindowLink>,
    pub stats: OrderStats,
    pub revenue: Vec<RevenueBar>,
    pub top_products: Vec<ProductSales>,
    pub request_funnel: Vec<Bar>,
    pub ratings: Vec<Bar>,
    pub average_rating: Option<Decimal>,
}

/// Build the analytics router.
pub fn router() -> Router<AppState> {
    Router::new().route("/analytics", get(index))
}

/// GET /analytics
#[instrument(skip_all, fields(days))]
async fn index(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    ctx: PageContext,
    Query(query): Query<AnalyticsQuery>,
) -> Result<AnalyticsTemplate> {
    let days = window_days(query.days);
    tracing::Span::current().record("days", days);

    let now = Utc::now();
    let today = now.date_naive();
    let since = now
        .checked_sub_days(Days::new(u64::from(days)))
        .unwrap_or(now);

    let orders_repo = OrderRepository::new(state.pool());
    let orders = orders_repo.list_since(since).await?;
    let items = orders_repo.items_since(since).await?;
    let requests = CustomRequestRepository::new(state.pool()).list().await?;
    let ratings = ReviewRepository::new(state.pool())
        .approved_ratings()
        .await?;

    let request_funnel = bars(
        request_status_counts(&requests)
            .into_iter()
            .filter(|(s, _)| *s != CustomRequestStatus::Rejected)
            .map(|(s, n)| (s.label().to_owned(), n)),
    );
    let rating_bars = bars(
        rating_histogram(ratings.iter().copied())
            .into_iter()
            .map(|(star, n)| (format!("{star} stars"), n)),
    );

    Ok(AnalyticsTemplate {
        ctx,
        days,
        windows: WINDOWS
            .iter()
            .map(|&w| WindowLink {
                days: w,
                active: w == days,
            })
            .collect(),
        stats: OrderStats::compute(&orders, today),
        revenue: revenue_bars(daily_revenue(&orders, days, today)),
        top_products: top_products(&items, TOP_PRODUCTS),
        request_funnel,
        ratings: rating_bars,
        average_rating: average_rating(ratings),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn test_window_days_snaps() {
        assert_eq!(window_days(None), 30);
        assert_eq!(window_days(Some(1)), 7);
        assert_eq!(window_days(Some(45)), 30);
        assert_eq!(window_days(Some(365)), 90);
    }

    #[test]
    fn test_revenue_bars_scale_to_peak() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 1).unwrap();
        let day = |revenue: i64| DailyRevenue {
            date,
            orders: 1,
            revenue: Decimal::new(revenue, 0),
        };
        let bars = revenue_bars(vec![day(0), day(50), day(200)]);
        assert_eq!(
            bars.iter().map(|b| b.height).collect::<Vec<_>>(),
            [0, 25, 100]
        );
    }

    #[test]
    fn test_revenue_bars_all_zero() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 1).unwrap();
        let bars = revenue_bars(vec![DailyRevenue {
            date,
            orders: 0,
            revenue: Decimal::ZERO,
        }]);
        assert_eq!(bars[0].height, 0);
    }

    #[test]
    fn test_bars_share_total() {
        let result = bars([("a".to_owned(), 1), ("b".to_owned(), 3)]);
        assert_eq!(result[0].percent, 25);
        assert_eq!(result[1].percent, 75);
    }
}
