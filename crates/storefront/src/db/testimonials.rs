//! Testimonial repository.

use sqlx::PgPool;

use hearth_core::models::Testimonial;
use hearth_core::rows::{TESTIMONIAL_COLUMNS, TestimonialRow, convert_all};
use hearth_core::{ModerationStatus, Rating};

use super::RepositoryError;

pub struct TestimonialRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TestimonialRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Approved testimonials, featured first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn approved(&self) -> Result<Vec<Testimonial>, RepositoryError> {
        let rows = sqlx::query_as::<_, TestimonialRow>(&format!(
            r"
            SELECT {TESTIMONIAL_COLUMNS}
            FROM bakery.testimonial
            WHERE status = $1
            ORDER BY is_featured DESC, created_at DESC
            "
        ))
        .bind(ModerationStatus::Approved.as_str())
        .fetch_all(self.pool)
        .await?;
        Ok(convert_all(rows)?)
    }

    /// Approved and featured testimonials for the home page.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn featured(&self, limit: i64) -> Result<Vec<Testimonial>, RepositoryError> {
        let rows = sqlx::query_as::<_, TestimonialRow>(&format!(
            r"
            SELECT {TESTIMONIAL_COLUMNS}
            FROM bakery.testimonial
            WHERE status = $1 AND is_featured
            ORDER BY created_at DESC
            LIMIT $2
            "
        ))
        .bind(ModerationStatus::Approved.as_str())
        .bind(limit)
        .fetch_all(self.pool)
        .await?;
        Ok(convert_all(rows)?)
    }

    /// Submit a testimonial for moderation.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        author_name: &str,
        author_title: Option<&str>,
        content: &str,
        rating: Rating,
    ) -> Result<Testimonial, RepositoryError> {
        let row = sqlx::query_as::<_, TestimonialRow>(&format!(
            r"
            INSERT INTO bakery.testimonial (author_name, author_title, content, rating, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {TESTIMONIAL_COLUMNS}
            "
        ))
        .bind(author_name)
        .bind(author_title)
        .bind(content)
        .bind(i32::from(rating.get()))
        .bind(ModerationStatus::Pending.as_str())
        .fetch_one(self.pool)
        .await?;
        Ok(Testimonial::try_from(row)?)
    }
}
