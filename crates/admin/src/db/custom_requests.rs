//! Custom cake request repository.

use rust_decimal::Decimal;
use sqlx::PgPool;

use hearth_core::models::CustomRequest;
use hearth_core::rows::{CUSTOM_REQUEST_COLUMNS, CustomRequestRow, convert_all};
use hearth_core::{CustomRequestId, CustomRequestStatus};

use super::RepositoryError;

pub struct CustomRequestRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CustomRequestRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Every request, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored email is invalid.
    pub async fn list(&self) -> Result<Vec<CustomRequest>, RepositoryError> {
        let rows = sqlx::query_as::<_, CustomRequestRow>(&format!(
            "SELECT {CUSTOM_REQUEST_COLUMNS} FROM bakery.custom_request ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;
        Ok(convert_all(rows)?)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: CustomRequestId) -> Result<Option<CustomRequest>, RepositoryError> {
        let row = sqlx::query_as::<_, CustomRequestRow>(&format!(
            "SELECT {CUSTOM_REQUEST_COLUMNS} FROM bakery.custom_request WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(row.map(CustomRequest::try_from).transpose()?)
    }

    /// Save the staff side of a request: status, quote and internal notes.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such request exists.
    pub async fn update_review(
        &self,
        id: CustomRequestId,
        status: CustomRequestStatus,
        quoted_price: Option<Decimal>,
        admin_notes: Option<&str>,
    ) -> Result<CustomRequest, RepositoryError> {
        let row = sqlx::query_as::<_, CustomRequestRow>(&format!(
            r"
            UPDATE bakery.custom_request
            SET status = $2, quoted_price = $3, admin_notes = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING {CUSTOM_REQUEST_COLUMNS}
            "
        ))
        .bind(id)
        .bind(status.as_str())
        .bind(quoted_price)
        .bind(admin_notes)
        .fetch_optional(self.pool)
        .await?;
        row.map(CustomRequest::try_from)
            .transpose()?
            .ok_or(RepositoryError::NotFound)
    }
}
