//! Order workflow repository.
//!
//! List pages load orders and narrow them in memory with
//! `hearth_core::filters`, so the queries here are deliberately plain.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use hearth_core::models::{Order, OrderItem};
use hearth_core::rows::{ORDER_COLUMNS, ORDER_ITEM_COLUMNS, OrderItemRow, OrderRow, convert_all};
use hearth_core::{OrderId, OrderStatus};

use super::{RepositoryError, expect_one};

pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Every order, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored email is invalid.
    pub async fn list(&self) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM bakery.customer_order ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;
        Ok(convert_all(rows)?)
    }

    /// Orders placed at or after `since`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_since(&self, since: DateTime<Utc>) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            SELECT {ORDER_COLUMNS}
            FROM bakery.customer_order
            WHERE created_at >= $1
            ORDER BY created_at DESC
            "
        ))
        .bind(since)
        .fetch_all(self.pool)
        .await?;
        Ok(convert_all(rows)?)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM bakery.customer_order WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(row.map(Order::try_from).transpose()?)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn items(&self, order_id: OrderId) -> Result<Vec<OrderItem>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderItemRow>(&format!(
            "SELECT {ORDER_ITEM_COLUMNS} FROM bakery.order_item WHERE order_id = $1 ORDER BY id"
        ))
        .bind(order_id)
        .fetch_all(self.pool)
        .await?;
        Ok(rows.into_iter().map(OrderItem::from).collect())
    }

    /// Lines of revenue-counting orders placed at or after `since`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn items_since(&self, since: DateTime<Utc>) -> Result<Vec<OrderItem>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderItemRow>(
            r"
            SELECT i.id, i.order_id, i.product_id, i.product_name, i.unit_price, i.quantity,
                   i.cake_message
            FROM bakery.order_item i
            JOIN bakery.customer_order o ON o.id = i.order_id
            WHERE o.created_at >= $1
              AND o.status IS DISTINCT FROM 'cancelled'
            ",
        )
        .bind(since)
        .fetch_all(self.pool)
        .await?;
        Ok(rows.into_iter().map(OrderItem::from).collect())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such order exists.
    pub async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            UPDATE bakery.customer_order
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {ORDER_COLUMNS}
            "
        ))
        .bind(id)
        .bind(status.as_str())
        .fetch_optional(self.pool)
        .await?;
        row.map(Order::try_from)
            .transpose()?
            .ok_or(RepositoryError::NotFound)
    }

    /// Delete an order and, by cascade, its lines.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such order exists.
    pub async fn delete(&self, id: OrderId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM bakery.customer_order WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        expect_one(result.rows_affected())
    }
}
