//! Session-related types.

use serde::{Deserialize, Serialize};

use hearth_core::models::Customer;
use hearth_core::{Email, UserId};

/// Session-stored customer identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: UserId,
    pub email: Email,
    pub name: String,
}

impl From<&Customer> for CurrentUser {
    fn from(c: &Customer) -> Self {
        Self {
            id: c.id,
            email: c.email.clone(),
            name: c.name.clone(),
        }
    }
}

/// Session keys.
pub mod keys {
    /// The logged-in customer.
    pub const CURRENT_USER: &str = "current_user";

    /// The shopping cart.
    pub const CART: &str = "cart";

    /// Custom cake wizard step and draft.
    pub const CUSTOM_CAKE_WIZARD: &str = "custom_cake_wizard";

    /// One-shot message shown on the next rendered page.
    pub const FLASH: &str = "flash";

    /// Order numbers placed from this session, for guest confirmation pages.
    pub const RECENT_ORDERS: &str = "recent_orders";
}
