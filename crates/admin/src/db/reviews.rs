//! Product review moderation.

use sqlx::PgPool;

use hearth_core::models::Review;
use hearth_core::rows::ReviewRow;
use hearth_core::{ModerationStatus, Rating, ReviewId};

use super::{RepositoryError, expect_one};

/// A review with the name of the product it belongs to.
#[derive(Debug, Clone)]
pub struct ReviewWithProduct {
    pub review: Review,
    pub product_name: String,
    pub product_slug: String,
}

#[derive(Debug, sqlx::FromRow)]
struct ReviewWithProductRow {
    #[sqlx(flatten)]
    review: ReviewRow,
    product_name: String,
    product_slug: String,
}

pub struct ReviewRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReviewRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Every review with its product, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored rating is out of range.
    pub async fn list(&self) -> Result<Vec<ReviewWithProduct>, RepositoryError> {
        let rows = sqlx::query_as::<_, ReviewWithProductRow>(
            r"
            SELECT r.id, r.product_id, r.user_id, r.author_name, r.rating, r.comment,
                   r.status, r.created_at,
                   p.name AS product_name, p.slug AS product_slug
            FROM bakery.review r
            JOIN bakery.product p ON p.id = r.product_id
            ORDER BY r.created_at DESC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter()
            .map(|r| -> Result<ReviewWithProduct, RepositoryError> {
                Ok(ReviewWithProduct {
                    review: Review::try_from(r.review)?,
                    product_name: r.product_name,
                    product_slug: r.product_slug,
                })
            })
            .collect()
    }

    /// Ratings of approved reviews, for the analytics histogram.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn approved_ratings(&self) -> Result<Vec<Rating>, RepositoryError> {
        let raw: Vec<i32> = sqlx::query_scalar("SELECT rating FROM bakery.review WHERE status = $1")
            .bind(ModerationStatus::Approved.as_str())
            .fetch_all(self.pool)
            .await?;
        // Out-of-range values are blocked by a CHECK constraint; skip any that slip through.
        Ok(raw.into_iter().filter_map(|r| Rating::new(r).ok()).collect())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such review exists.
    pub async fn set_status(
        &self,
        id: ReviewId,
        status: ModerationStatus,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE bakery.review SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(status.as_str())
            .execute(self.pool)
            .await?;
        expect_one(result.rows_affected())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such review exists.
    pub async fn delete(&self, id: ReviewId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM bakery.review WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        expect_one(result.rows_affected())
    }
}
