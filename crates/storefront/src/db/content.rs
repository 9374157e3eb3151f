//! Site content: announcements, hero slides and markdown pages.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use hearth_core::models::{Announcement, ContentPage, HeroSlide};
use hearth_core::rows::{
    ANNOUNCEMENT_COLUMNS, AnnouncementRow, HERO_SLIDE_COLUMNS, HeroSlideRow, PAGE_COLUMNS, PageRow,
};

use super::RepositoryError;

pub struct ContentRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ContentRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Announcements that are active and inside their window at `now`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn live_announcements(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<Announcement>, RepositoryError> {
        let rows = sqlx::query_as::<_, AnnouncementRow>(&format!(
            r"
            SELECT {ANNOUNCEMENT_COLUMNS}
            FROM bakery.announcement
            WHERE is_active
            ORDER BY created_at DESC
            "
        ))
        .fetch_all(self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(Announcement::from)
            .filter(|a| a.is_live(now))
            .collect())
    }

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

    /// A published page by slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn published_page(&self, slug: &str) -> Result<Option<ContentPage>, RepositoryError> {
        let row = sqlx::query_as::<_, PageRow>(&format!(
            "SELECT {PAGE_COLUMNS} FROM bakery.page WHERE slug = $1 AND is_published"
        ))
        .bind(slug)
        .fetch_optional(self.pool)
        .await?;
        Ok(row.map(ContentPage::from))
    }
}
