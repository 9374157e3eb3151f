//! Session-held models for the back office.
//!
//! Persistent records live in `hearth_core::models`.

pub mod flash;
pub mod session;

pub use flash::{Flash, FlashLevel};
pub use session::{CurrentAdmin, keys as session_keys};
