//! In-app notifications sent to customers from the back office.

use sqlx::PgPool;

use hearth_core::{NotificationId, NotificationKind, UserId};

use super::RepositoryError;

pub struct NotificationRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> NotificationRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        user_id: UserId,
        kind: NotificationKind,
        title: &str,
        body: &str,
        link: Option<&str>,
    ) -> Result<NotificationId, RepositoryError> {
        let id: NotificationId = sqlx::query_scalar(
            r"
            INSERT INTO bakery.notification (user_id, kind, title, body, link)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            ",
        )
        .bind(user_id)
        .bind(kind.as_str())
        .bind(title)
        .bind(body)
        .bind(link)
        .fetch_one(self.pool)
        .await?;
        Ok(id)
    }
}
