//! Session-held models for the storefront.
//!
//! Persistent records live in `hearth_core::models`; the types here only exist
//! between requests in the session store.

pub mod cart;
pub mod flash;
pub mod session;

pub use cart::{Cart, CartLine, PricedCart, PricedLine};
pub use flash::{Flash, FlashLevel};
pub use session::{CurrentUser, keys as session_keys};
