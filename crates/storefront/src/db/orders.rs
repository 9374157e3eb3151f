//! Order repository.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;

use hearth_core::models::{Order, OrderItem};
use hearth_core::pricing::OrderTotals;
use hearth_core::rows::{ORDER_COLUMNS, ORDER_ITEM_COLUMNS, OrderItemRow, OrderRow, convert_all};
use hearth_core::{Email, FulfillmentMethod, OrderId, OrderStatus, ProductId, UserId};

use super::{RepositoryError, conflict_on_unique};

/// Everything needed to insert an order header.
#[derive(Debug, Clone)]
pub struct NewOrder<'a> {
    pub order_number: &'a str,
    pub user_id: Option<UserId>,
    pub customer_name: &'a str,
    pub customer_email: &'a Email,
    pub customer_phone: &'a str,
    pub fulfillment_method: FulfillmentMethod,
    pub delivery_date: NaiveDate,
    pub delivery_slot: Option<&'a str>,
    pub delivery_address: Option<&'a str>,
    pub notes: Option<&'a str>,
    pub totals: OrderTotals,
}

/// One priced line, snapshotted at order time.
#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub product_id: ProductId,
    pub product_name: String,
    pub unit_price: Decimal,
    pub quantity: i32,
    pub cake_message: Option<String>,
}

pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert an order and its lines in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the order number is taken.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        order: &NewOrder<'_>,
        items: &[NewOrderItem],
    ) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            INSERT INTO bakery.customer_order (
                order_number, user_id, customer_name, customer_email, customer_phone,
                fulfillment_method, delivery_date, delivery_slot, delivery_address, notes,
                status, subtotal, delivery_fee, tax, total
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING {ORDER_COLUMNS}
            "
        ))
        .bind(order.order_number)
        .bind(order.user_id)
        .bind(order.customer_name)
        .bind(order.customer_email.as_str())
        .bind(order.customer_phone)
        .bind(order.fulfillment_method.as_str())
        .bind(order.delivery_date)
        .bind(order.delivery_slot)
        .bind(order.delivery_address)
        .bind(order.notes)
        .bind(OrderStatus::Pending.as_str())
        .bind(order.totals.subtotal)
        .bind(order.totals.delivery_fee)
        .bind(order.totals.tax)
        .bind(order.totals.total)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| conflict_on_unique(e, "order number"))?;

        for item in items {
            sqlx::query(
                r"
                INSERT INTO bakery.order_item
                    (order_id, product_id, product_name, unit_price, quantity, cake_message)
                VALUES ($1, $2, $3, $4, $5, $6)
                ",
            )
            .bind(row.id)
            .bind(item.product_id)
            .bind(&item.product_name)
            .bind(item.unit_price)
            .bind(item.quantity)
            .bind(item.cake_message.as_deref())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(Order::try_from(row)?)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_number(&self, number: &str) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM bakery.customer_order WHERE order_number = $1"
        ))
        .bind(number)
        .fetch_optional(self.pool)
        .await?;
        Ok(row.map(Order::try_from).transpose()?)
    }

    /// A customer's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            SELECT {ORDER_COLUMNS}
            FROM bakery.customer_order
            WHERE user_id = $1
            ORDER BY created_at DESC
            "
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;
        Ok(convert_all(rows)?)
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
}
