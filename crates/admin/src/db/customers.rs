//! Customer directory with order aggregates.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use hearth_core::models::Customer;
use hearth_core::{Email, UserId};

use super::RepositoryError;

/// A customer with lifetime order figures. Cancelled orders don't count.
#[derive(Debug, Clone)]
pub struct CustomerSummary {
    pub customer: Customer,
    pub order_count: i64,
    pub total_spent: Decimal,
    pub last_order_at: Option<DateTime<Utc>>,
}

#[derive(Debug, sqlx::FromRow)]
struct CustomerSummaryRow {
    id: UserId,
    email: String,
    name: String,
    phone: Option<String>,
    created_at: DateTime<Utc>,
    order_count: i64,
    total_spent: Decimal,
    last_order_at: Option<DateTime<Utc>>,
}

impl TryFrom<CustomerSummaryRow> for CustomerSummary {
    type Error = RepositoryError;

    fn try_from(r: CustomerSummaryRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&r.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email for customer {}: {e}", r.id))
        })?;
        Ok(Self {
            customer: Customer {
                id: r.id,
                email,
                name: r.name,
                phone: r.phone,
                created_at: r.created_at,
            },
            order_count: r.order_count,
            total_spent: r.total_spent,
            last_order_at: r.last_order_at,
        })
    }
}

pub struct CustomerRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CustomerRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Customers matching `search` on name or email (all when `None`),
    /// newest accounts first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored email is invalid.
    pub async fn list(&self, search: Option<&str>) -> Result<Vec<CustomerSummary>, RepositoryError> {
        let pattern = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", escape_like(s)));

        let rows = sqlx::query_as::<_, CustomerSummaryRow>(
            r"
            SELECT u.id, u.email, u.name, u.phone, u.created_at,
                   COUNT(o.id) AS order_count,
                   COALESCE(SUM(o.total), 0) AS total_spent,
                   MAX(o.created_at) AS last_order_at
            FROM bakery.user u
            LEFT JOIN bakery.customer_order o
                   ON o.user_id = u.id AND o.status IS DISTINCT FROM 'cancelled'
            WHERE $1::text IS NULL OR u.name ILIKE $1 OR u.email ILIKE $1
            GROUP BY u.id
            ORDER BY u.created_at DESC
            ",
        )
        .bind(pattern)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(CustomerSummary::try_from).collect()
    }
}

/// Escape `%`, `_` and `\` so user input matches literally inside ILIKE.
fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like_plain_text_unchanged() {
        assert_eq!(escape_like("maria"), "maria");
    }

    #[test]
    fn test_escape_like_escapes_wildcards() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
    }
}
