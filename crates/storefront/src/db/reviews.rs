//! Product review repository.

use sqlx::PgPool;

use hearth_core::models::Review;
use hearth_core::rows::{REVIEW_COLUMNS, ReviewRow, convert_all};
use hearth_core::{ModerationStatus, ProductId, Rating, UserId};

use super::RepositoryError;

pub struct ReviewRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReviewRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Approved reviews for a product, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn approved_for_product(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<Review>, RepositoryError> {
        let rows = sqlx::query_as::<_, ReviewRow>(&format!(
            r"
            SELECT {REVIEW_COLUMNS}
            FROM bakery.review
            WHERE product_id = $1 AND status = $2
            ORDER BY created_at DESC
            "
        ))
        .bind(product_id)
        .bind(ModerationStatus::Approved.as_str())
        .fetch_all(self.pool)
        .await?;
        Ok(convert_all(rows)?)
    }

    /// Submit a review. It stays hidden until approved.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        product_id: ProductId,
        user_id: Option<UserId>,
        author_name: &str,
        rating: Rating,
        comment: &str,
    ) -> Result<Review, RepositoryError> {
        let row = sqlx::query_as::<_, ReviewRow>(&format!(
            r"
            INSERT INTO bakery.review (product_id, user_id, author_name, rating, comment, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {REVIEW_COLUMNS}
            "
        ))
        .bind(product_id)
        .bind(user_id)
        .bind(author_name)
        .bind(i32::from(rating.get()))
        .bind(comment)
        .bind(ModerationStatus::Pending.as_str())
        .fetch_one(self.pool)
        .await?;
        Ok(Review::try_from(row)?)
    }
}
