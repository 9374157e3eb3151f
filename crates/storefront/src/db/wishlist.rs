//! Wishlist repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use hearth_core::models::{Product, WishlistEntry};
use hearth_core::rows::ProductRow;
use hearth_core::{ProductId, UserId, WishlistItemId};

use super::RepositoryError;

#[derive(Debug, sqlx::FromRow)]
struct WishlistRow {
    wishlist_id: WishlistItemId,
    added_at: DateTime<Utc>,
    #[sqlx(flatten)]
    product: ProductRow,
}

pub struct WishlistRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> WishlistRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Saved products, most recently added first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, user_id: UserId) -> Result<Vec<WishlistEntry>, RepositoryError> {
        let rows = sqlx::query_as::<_, WishlistRow>(
            r"
            SELECT w.id AS wishlist_id, w.created_at AS added_at,
                   p.id, p.category_id, p.name, p.slug, p.description, p.price, p.image_url,
                   p.is_available, p.is_featured, p.created_at, p.updated_at
            FROM bakery.wishlist_item w
            JOIN bakery.product p ON p.id = w.product_id
            WHERE w.user_id = $1
            ORDER BY w.created_at DESC
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| WishlistEntry {
                id: r.wishlist_id,
                product: Product::from(r.product),
                added_at: r.added_at,
            })
            .collect())
    }

    /// Product IDs on the wishlist, for toggling heart icons.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn product_ids(&self, user_id: UserId) -> Result<Vec<ProductId>, RepositoryError> {
        let ids = sqlx::query_scalar::<_, ProductId>(
            "SELECT product_id FROM bakery.wishlist_item WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;
        Ok(ids)
    }

    /// Adding a product twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails (including an
    /// unknown product).
    pub async fn add(&self, user_id: UserId, product_id: ProductId) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO bakery.wishlist_item (user_id, product_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, product_id) DO NOTHING
            ",
        )
        .bind(user_id)
        .bind(product_id)
        .execute(self.pool)
        .await?;
        Ok(())
    }

    /// Returns whether anything was removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn remove(&self, user_id: UserId, product_id: ProductId) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "DELETE FROM bakery.wishlist_item WHERE user_id = $1 AND product_id = $2",
        )
        .bind(user_id)
        .bind(product_id)
        .execute(self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
