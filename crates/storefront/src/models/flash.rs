//! One-shot messages carried across a redirect.

use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use super::session::keys;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlashLevel {
    Success,
    Error,
    Info,
}

impl FlashLevel {
    /// CSS modifier used by the toast partial.
    #[must_use]
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::Success => "toast--success",
            Self::Error => "toast--error",
            Self::Info => "toast--info",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Error,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Info,
            message: message.into(),
        }
    }

    /// Store the message for the next page render, replacing any pending one.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be written.
    pub async fn push(self, session: &Session) -> Result<(), tower_sessions::session::Error> {
        session.insert(keys::FLASH, self).await
    }

    /// Take the pending message, if any.
    ///
    /// A session read failure is logged and treated as no message so a page
    /// still renders.
    pub async fn take(session: &Session) -> Option<Self> {
        match session.remove::<Self>(keys::FLASH).await {
            Ok(flash) => flash,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read flash message");
                None
            }
        }
    }
}
