//! Testimonial moderation and editing.

use sqlx::PgPool;

use hearth_core::models::Testimonial;
use hearth_core::rows::{TESTIMONIAL_COLUMNS, TestimonialRow, convert_all};
use hearth_core::{ModerationStatus, Rating, TestimonialId};

use super::{RepositoryError, expect_one};

/// Fields written by the testimonial form.
#[derive(Debug, Clone)]
pub struct TestimonialInput<'a> {
    pub author_name: &'a str,
    pub author_title: Option<&'a str>,
    pub content: &'a str,
    pub rating: Rating,
    pub image_url: Option<&'a str>,
    pub status: ModerationStatus,
    pub is_featured: bool,
}

pub struct TestimonialRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TestimonialRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Every testimonial, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Testimonial>, RepositoryError> {
        let rows = sqlx::query_as::<_, TestimonialRow>(&format!(
            "SELECT {TESTIMONIAL_COLUMNS} FROM bakery.testimonial ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;
        Ok(convert_all(rows)?)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: TestimonialId) -> Result<Option<Testimonial>, RepositoryError> {
        let row = sqlx::query_as::<_, TestimonialRow>(&format!(
            "SELECT {TESTIMONIAL_COLUMNS} FROM bakery.testimonial WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(row.map(Testimonial::try_from).transpose()?)
    }

    /// Add a testimonial collected offline.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, input: &TestimonialInput<'_>) -> Result<Testimonial, RepositoryError> {
        let row = sqlx::query_as::<_, TestimonialRow>(&format!(
            r"
            INSERT INTO bakery.testimonial
                (author_name, author_title, content, rating, image_url, status, is_featured)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {TESTIMONIAL_COLUMNS}
            "
        ))
        .bind(input.author_name)
        .bind(input.author_title)
        .bind(input.content)
        .bind(i32::from(input.rating.get()))
        .bind(input.image_url)
        .bind(input.status.as_str())
        .bind(input.is_featured)
        .fetch_one(self.pool)
        .await?;
        Ok(Testimonial::try_from(row)?)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such testimonial exists.
    pub async fn update(
        &self,
        id: TestimonialId,
        input: &TestimonialInput<'_>,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE bakery.testimonial
            SET author_name = $2, author_title = $3, content = $4, rating = $5,
                image_url = $6, status = $7, is_featured = $8
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(input.author_name)
        .bind(input.author_title)
        .bind(input.content)
        .bind(i32::from(input.rating.get()))
        .bind(input.image_url)
        .bind(input.status.as_str())
        .bind(input.is_featured)
        .execute(self.pool)
        .await?;
        expect_one(result.rows_affected())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such testimonial exists.
    pub async fn set_status(
        &self,
        id: TestimonialId,
        status: ModerationStatus,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE bakery.testimonial SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(status.as_str())
            .execute(self.pool)
            .await?;
        expect_one(result.rows_affected())
    }

    /// Flip the featured flag and return the new value.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such testimonial exists.
    pub async fn toggle_featured(&self, id: TestimonialId) -> Result<bool, RepositoryError> {
        let featured: Option<bool> = sqlx::query_scalar(
            r"
            UPDATE bakery.testimonial
            SET is_featured = NOT is_featured
            WHERE id = $1
            RETURNING is_featured
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        featured.ok_or(RepositoryError::NotFound)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such testimonial exists.
    pub async fn delete(&self, id: TestimonialId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM bakery.testimonial WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        expect_one(result.rows_affected())
    }
}
