//! Custom cake request repository.

use sqlx::PgPool;

use hearth_core::custom_request::NewCustomRequest;
use hearth_core::models::CustomRequest;
use hearth_core::rows::{CUSTOM_REQUEST_COLUMNS, CustomRequestRow, convert_all};
use hearth_core::{CustomRequestStatus, UserId};

use super::RepositoryError;

pub struct CustomRequestRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CustomRequestRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Store a completed wizard submission as a pending request.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        request: &NewCustomRequest,
        user_id: Option<UserId>,
    ) -> Result<CustomRequest, RepositoryError> {
        let row = sqlx::query_as::<_, CustomRequestRow>(&format!(
            r"
            INSERT INTO bakery.custom_request (
                user_id, status, name, email, phone, occasion, servings, tiers, shape, flavor,
                filling, frosting, dietary_notes, design_description, cake_message, color_theme,
                reference_image_url, budget, fulfillment_method, delivery_date, delivery_slot,
                delivery_address, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16,
                    $17, $18, $19, $20, $21, $22, $23)
            RETURNING {CUSTOM_REQUEST_COLUMNS}
            "
        ))
        .bind(user_id)
        .bind(CustomRequestStatus::Pending.as_str())
        .bind(&request.name)
        .bind(request.email.as_str())
        .bind(request.phone.as_str())
        .bind(&request.occasion)
        .bind(request.servings)
        .bind(request.tiers)
        .bind(&request.shape)
        .bind(&request.flavor)
        .bind(request.filling.as_deref())
        .bind(request.frosting.as_deref())
        .bind(request.dietary_notes.as_deref())
        .bind(&request.design_description)
        .bind(request.cake_message.as_deref())
        .bind(request.color_theme.as_deref())
        .bind(request.reference_image_url.as_deref())
        .bind(request.budget)
        .bind(request.fulfillment_method.as_str())
        .bind(request.delivery_date)
        .bind(request.delivery_slot.as_deref())
        .bind(request.delivery_address.as_deref())
        .bind(request.notes.as_deref())
        .fetch_one(self.pool)
        .await?;

        Ok(CustomRequest::try_from(row)?)
    }

    /// A customer's requests, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<CustomRequest>, RepositoryError> {
        let rows = sqlx::query_as::<_, CustomRequestRow>(&format!(
            r"
            SELECT {CUSTOM_REQUEST_COLUMNS}
            FROM bakery.custom_request
            WHERE user_id = $1
            ORDER BY created_at DESC
            "
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;
        Ok(convert_all(rows)?)
    }
}
