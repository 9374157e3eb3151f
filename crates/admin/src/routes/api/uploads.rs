//! Image upload endpoint used by the product, slide and testimonial forms.

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use serde::Serialize;
use tracing::instrument;

use crate::middleware::RequireEditor;
use crate::services::ImageHostError;
use crate::services::image_host::MAX_IMAGE_BYTES;
use crate::state::AppState;

/// Multipart field carrying the file.
const FIELD: &str = "image";

/// Room for multipart framing on top of the image itself.
const BODY_LIMIT: usize = MAX_IMAGE_BYTES + 64 * 1024;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub url: String,
}

/// JSON error body: `{"error": "..."}`.
#[derive(Debug)]
pub struct UploadError {
    status: StatusCode,
    message: String,
}

impl UploadError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl From<ImageHostError> for UploadError {
    fn from(e: ImageHostError) -> Self {
        if e.is_client_error() {
            Self::new(StatusCode::BAD_REQUEST, e.to_string())
        } else {
            tracing::error!(error = %e, "Image host upload failed");
            Self::new(StatusCode::BAD_GATEWAY, "Image upload failed, try again")
        }
    }
}

impl IntoResponse for UploadError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct Body {
            error: String,
        }
        (self.status, Json(Body { error: self.message })).into_response()
    }
}

/// Build the uploads router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/uploads", post(upload))
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
}

/// POST /api/uploads
///
/// Accepts one `image` field and returns the hosted URL.
#[instrument(skip_all)]
async fn upload(
    RequireEditor(admin): RequireEditor,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, UploadError> {
    let Some(host) = state.image_host() else {
        return Err(UploadError::new(
            StatusCode::SERVICE_UNAVAILABLE,
            "Image uploads are not configured; paste an image URL instead",
        ));
    };

    let mut bytes = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| UploadError::new(StatusCode::BAD_REQUEST, e.body_text()))?
    {
        if field.name() == Some(FIELD) {
            let data = field
                .bytes()
                .await
                .map_err(|e| UploadError::new(StatusCode::BAD_REQUEST, e.body_text()))?;
            bytes = Some(data);
            break;
        }
    }

    let bytes = bytes.ok_or_else(|| {
        UploadError::new(StatusCode::BAD_REQUEST, "Choose an image to upload")
    })?;
    let url = host.upload(&bytes).await?;
    tracing::info!(admin_id = %admin.id, size = bytes.len(), "Image uploaded");

    Ok(Json(UploadResponse { url }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_are_bad_request() {
        let err = UploadError::from(ImageHostError::UnsupportedType);
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert!(err.message.contains("JPEG"));

        let err = UploadError::from(ImageHostError::Rejected("quota".to_owned()));
        assert_eq!(err.status, StatusCode::BAD_GATEWAY);
        assert!(!err.message.contains("quota"));
    }
}
