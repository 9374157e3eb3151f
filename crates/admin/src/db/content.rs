//! Site content: announcements, hero slides and markdown pages.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use hearth_core::AnnouncementId;
use hearth_core::models::{Announcement, ContentPage, HeroSlide};
use hearth_core::rows::{
    ANNOUNCEMENT_COLUMNS, AnnouncementRow, HERO_SLIDE_COLUMNS, HeroSlideRow, PAGE_COLUMNS, PageRow,
};

use super::{RepositoryError, expect_one};

/// One slide as submitted by the slide editor. Position is its index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideInput {
    pub title: String,
    pub subtitle: Option<String>,
    pub image_url: String,
    pub cta_label: Option<String>,
    pub cta_url: Option<String>,
}

pub struct ContentRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ContentRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    // -------------------------------------------------------------------------
    // Announcements
    // -------------------------------------------------------------------------

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn announcements(&self) -> Result<Vec<Announcement>, RepositoryError> {
        let rows = sqlx::query_as::<_, AnnouncementRow>(&format!(
            "SELECT {ANNOUNCEMENT_COLUMNS} FROM bakery.announcement ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;
        Ok(rows.into_iter().map(Announcement::from).collect())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create_announcement(
        &self,
        message: &str,
        link_url: Option<&str>,
        starts_at: Option<DateTime<Utc>>,
        ends_at: Option<DateTime<Utc>>,
    ) -> Result<Announcement, RepositoryError> {
        let row = sqlx::query_as::<_, AnnouncementRow>(&format!(
            r"
            INSERT INTO bakery.announcement (message, link_url, starts_at, ends_at)
            VALUES ($1, $2, $3, $4)
            RETURNING {ANNOUNCEMENT_COLUMNS}
            "
        ))
        .bind(message)
        .bind(link_url)
        .bind(starts_at)
        .bind(ends_at)
        .fetch_one(self.pool)
        .await?;
        Ok(Announcement::from(row))
    }

    /// Flip the active flag and return the new value.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such announcement exists.
    pub async fn toggle_announcement(&self, id: AnnouncementId) -> Result<bool, RepositoryError> {
        let active: Option<bool> = sqlx::query_scalar(
            "UPDATE bakery.announcement SET is_active = NOT is_active WHERE id = $1 RETURNING is_active",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        active.ok_or(RepositoryError::NotFound)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such announcement exists.
    pub async fn delete_announcement(&self, id: AnnouncementId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM bakery.announcement WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        expect_one(result.rows_affected())
    }

    // -------------------------------------------------------------------------
    // Hero slides
    // -------------------------------------------------------------------------

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn hero_slides(&self) -> Result<Vec<HeroSlide>, RepositoryError> {
        let rows = sqlx::query_as::<_, HeroSlideRow>(&format!(
            "SELECT {HERO_SLIDE_COLUMNS} FROM bakery.hero_slide ORDER BY position, id"
        ))
        .fetch_all(self.pool)
        .await?;
        Ok(rows.into_iter().map(HeroSlide::from).collect())
    }

    /// Replace the whole slide set in one transaction. On failure the
    /// previous slides are left untouched.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails.
    pub async fn replace_hero_slides(&self, slides: &[SlideInput]) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM bakery.hero_slide")
            .execute(&mut *tx)
            .await?;

        for (position, slide) in (0i32..).zip(slides) {
            sqlx::query(
                r"
                INSERT INTO bakery.hero_slide
                    (title, subtitle, image_url, cta_label, cta_url, position)
                VALUES ($1, $2, $3, $4, $5, $6)
                ",
            )
            .bind(&slide.title)
            .bind(slide.subtitle.as_deref())
            .bind(&slide.image_url)
            .bind(slide.cta_label.as_deref())
            .bind(slide.cta_url.as_deref())
            .bind(position)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Pages
    // -------------------------------------------------------------------------

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn pages(&self) -> Result<Vec<ContentPage>, RepositoryError> {
        let rows = sqlx::query_as::<_, PageRow>(&format!(
            "SELECT {PAGE_COLUMNS} FROM bakery.page ORDER BY slug"
        ))
        .fetch_all(self.pool)
        .await?;
        Ok(rows.into_iter().map(ContentPage::from).collect())
    }

    /// A page by slug, published or not.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn page(&self, slug: &str) -> Result<Option<ContentPage>, RepositoryError> {
        let row = sqlx::query_as::<_, PageRow>(&format!(
            "SELECT {PAGE_COLUMNS} FROM bakery.page WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(self.pool)
        .await?;
        Ok(row.map(ContentPage::from))
    }

    /// Create or overwrite a page.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the upsert fails.
    pub async fn save_page(
        &self,
        slug: &str,
        title: &str,
        body_markdown: &str,
        is_published: bool,
    ) -> Result<ContentPage, RepositoryError> {
        let row = sqlx::query_as::<_, PageRow>(&format!(
            r"
            INSERT INTO bakery.page (slug, title, body_markdown, is_published)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (slug) DO UPDATE
            SET title = $2, body_markdown = $3, is_published = $4, updated_at = NOW()
            RETURNING {PAGE_COLUMNS}
            "
        ))
        .bind(slug)
        .bind(title)
        .bind(body_markdown)
        .bind(is_published)
        .fetch_one(self.pool)
        .await?;
        Ok(ContentPage::from(row))
    }
}
