//! Image uploads to an ImgBB-compatible hosting API.
//!
//! Product photos, hero slides and testimonial portraits are stored off-site;
//! the database only keeps the returned URL.

use std::time::Duration;

use base64::{Engine, engine::general_purpose::STANDARD};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::config::ImageHostConfig;

/// Largest accepted upload.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

const UPLOAD_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum ImageHostError {
    /// Upload was empty.
    #[error("no image data received")]
    Empty,

    /// Upload exceeded [`MAX_IMAGE_BYTES`].
    #[error("image is {0} bytes; the limit is 5 MB")]
    TooLarge(usize),

    /// Not a JPEG, PNG, WebP or GIF.
    #[error("unsupported image type; use JPEG, PNG, WebP or GIF")]
    UnsupportedType,

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Host answered but refused the upload.
    #[error("upload rejected: {0}")]
    Rejected(String),
}

impl ImageHostError {
    /// Whether the uploader can fix this by choosing another file.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::Empty | Self::TooLarge(_) | Self::UnsupportedType)
    }
}

/// Image formats accepted for upload, sniffed from magic bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Png,
    Webp,
    Gif,
}

impl ImageKind {
    #[must_use]
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        match bytes {
            [0xFF, 0xD8, 0xFF, ..] => Some(Self::Jpeg),
            [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, ..] => Some(Self::Png),
            [b'G', b'I', b'F', b'8', ..] => Some(Self::Gif),
            [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => Some(Self::Webp),
            _ => None,
        }
    }

    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Webp => "webp",
            Self::Gif => "gif",
        }
    }
}

/// Check size and format before anything leaves the server.
///
/// # Errors
///
/// Returns the client-side [`ImageHostError`] variant that applies.
pub fn validate_image(bytes: &[u8]) -> Result<ImageKind, ImageHostError> {
    if bytes.is_empty() {
        return Err(ImageHostError::Empty);
    }
    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(ImageHostError::TooLarge(bytes.len()));
    }
    ImageKind::sniff(bytes).ok_or(ImageHostError::UnsupportedType)
}

/// Stable upload name: the first 16 hex digits of the content's SHA-256.
#[must_use]
pub fn content_name(bytes: &[u8], kind: ImageKind) -> String {
    let prefix: Vec<u8> = Sha256::digest(bytes).iter().take(8).copied().collect();
    format!("hearth-{}.{}", hex::encode(prefix), kind.extension())
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    #[serde(default)]
    success: bool,
    data: Option<UploadData>,
    error: Option<UploadErrorBody>,
}

#[derive(Debug, Deserialize)]
struct UploadData {
    url: String,
}

#[derive(Debug, Deserialize)]
struct UploadErrorBody {
    message: String,
}

#[derive(Clone)]
pub struct ImageHostClient {
    client: reqwest::Client,
    upload_url: String,
    api_key: SecretString,
}

impl ImageHostClient {
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &ImageHostConfig) -> Result<Self, ImageHostError> {
        let client = reqwest::Client::builder().timeout(UPLOAD_TIMEOUT).build()?;
        Ok(Self {
            client,
            upload_url: config.upload_url.clone(),
            api_key: config.api_key.clone(),
        })
    }

    /// Validate and upload an image, returning its public URL.
    ///
    /// # Errors
    ///
    /// Returns a client error for bad input, `Http` on transport failure and
    /// `Rejected` when the host refuses the upload.
    #[tracing::instrument(skip_all, fields(size = bytes.len()))]
    pub async fn upload(&self, bytes: &[u8]) -> Result<String, ImageHostError> {
        let kind = validate_image(bytes)?;
        let name = content_name(bytes, kind);
        let encoded = STANDARD.encode(bytes);

        let response = self
            .client
            .post(&self.upload_url)
            .form(&[
                ("key", self.api_key.expose_secret()),
                ("image", encoded.as_str()),
                ("name", name.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        let body: UploadResponse = response.json().await?;

        match body {
            UploadResponse {
                success: true,
                data: Some(data),
                ..
            } => {
                tracing::info!(name = %name, "Image uploaded");
                Ok(data.url)
            }
            UploadResponse { error, .. } => {
                let message = error.map_or_else(|| status.to_string(), |e| e.message);
                Err(ImageHostError::Rejected(message))
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const PNG_HEADER: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn test_sniff_known_formats() {
        assert_eq!(ImageKind::sniff(&[0xFF, 0xD8, 0xFF, 0xE0]), Some(ImageKind::Jpeg));
        assert_eq!(ImageKind::sniff(&PNG_HEADER), Some(ImageKind::Png));
        assert_eq!(ImageKind::sniff(b"GIF89a"), Some(ImageKind::Gif));
        assert_eq!(ImageKind::sniff(b"RIFF\x10\0\0\0WEBPVP8 "), Some(ImageKind::Webp));
        assert_eq!(ImageKind::sniff(b"%PDF-1.7"), None);
    }

    #[test]
    fn test_validate_rejects_empty_and_large() {
        assert!(matches!(validate_image(&[]), Err(ImageHostError::Empty)));

        let mut big = PNG_HEADER.to_vec();
        big.resize(MAX_IMAGE_BYTES + 1, 0);
        assert!(matches!(
            validate_image(&big),
            Err(ImageHostError::TooLarge(n)) if n == MAX_IMAGE_BYTES + 1
        ));
    }

    #[test]
    fn test_validate_rejects_non_images() {
        let err = validate_image(b"<svg></svg>").unwrap_err();
        assert!(matches!(err, ImageHostError::UnsupportedType));
        assert!(err.is_client_error());
    }

    #[test]
    fn test_content_name_is_stable() {
        let a = content_name(&PNG_HEADER, ImageKind::Png);
        let b = content_name(&PNG_HEADER, ImageKind::Png);
        assert_eq!(a, b);
        assert!(a.starts_with("hearth-"));
        assert!(a.ends_with(".png"));
        assert_eq!(a.len(), "hearth-".len() + 16 + ".png".len());
    }

    #[test]
    fn test_upload_response_shapes() {
        let ok: UploadResponse = serde_json::from_str(
            r#"{"data":{"url":"https://i.ibb.co/x/cake.png"},"success":true,"status":200}"#,
        )
        .unwrap();
        assert!(ok.success);
        assert_eq!(ok.data.unwrap().url, "https://i.ibb.co/x/cake.png");

        let err: UploadResponse = serde_json::from_str(
            r#"{"status_code":400,"error":{"message":"Invalid API v1 key.","code":100}}"#,
        )
        .unwrap();
        assert!(!err.success);
        assert_eq!(err.error.unwrap().message, "Invalid API v1 key.");
    }
}
