//! Business logic services for the back office.
//!
//! - `auth` - Email/password staff login (Argon2id)
//! - `email` - Customer status emails via SMTP
//! - `image_host` - Image uploads to the external host
//! - `notify` - In-app and email notifications on status changes

pub mod auth;
pub mod email;
pub mod image_host;
pub mod notify;

pub use auth::{AdminAuthError, AdminAuthService, NewAdmin};
pub use email::{EmailError, EmailService};
pub use image_host::{ImageHostClient, ImageHostError};
pub use notify::Notifier;
