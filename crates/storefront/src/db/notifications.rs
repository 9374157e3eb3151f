//! In-app notification repository.

use sqlx::PgPool;

use hearth_core::models::Notification;
use hearth_core::rows::{NOTIFICATION_COLUMNS, NotificationRow};
use hearth_core::{NotificationId, NotificationKind, UserId};

use super::RepositoryError;

/// Most notifications shown on the account page.
const LIST_LIMIT: i64 = 100;

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

    /// A customer's notifications, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Notification>, RepositoryError> {
        let rows = sqlx::query_as::<_, NotificationRow>(&format!(
            r"
            SELECT {NOTIFICATION_COLUMNS}
            FROM bakery.notification
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "
        ))
        .bind(user_id)
        .bind(LIST_LIMIT)
        .fetch_all(self.pool)
        .await?;
        Ok(rows.into_iter().map(Notification::from).collect())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn unread_count(&self, user_id: UserId) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM bakery.notification WHERE user_id = $1 AND NOT is_read",
        )
        .bind(user_id)
        .fetch_one(self.pool)
        .await?;
        Ok(count)
    }

    /// Mark one of the customer's notifications as read.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if it doesn't belong to the customer.
    pub async fn mark_read(&self, user_id: UserId, id: NotificationId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE bakery.notification SET is_read = TRUE WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Returns the number of notifications changed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn mark_all_read(&self, user_id: UserId) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            "UPDATE bakery.notification SET is_read = TRUE WHERE user_id = $1 AND NOT is_read",
        )
        .bind(user_id)
        .execute(self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}
