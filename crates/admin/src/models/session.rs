//! Session-stored staff identity.

use serde::{Deserialize, Serialize};

use hearth_core::models::AdminUser;
use hearth_core::{AdminRole, AdminUserId, Email};

/// The signed-in admin, stored at login and refreshed by the auth extractors
/// whenever the account row changes role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentAdmin {
    pub id: AdminUserId,
    pub email: Email,
    pub name: String,
    pub role: AdminRole,
}

impl CurrentAdmin {
    #[must_use]
    pub const fn can_edit(&self) -> bool {
        self.role.can_edit()
    }

    #[must_use]
    pub const fn can_manage_orders(&self) -> bool {
        self.role.can_manage_orders()
    }

    #[must_use]
    pub const fn can_manage_users(&self) -> bool {
        self.role.can_manage_users()
    }
}

impl From<&AdminUser> for CurrentAdmin {
    fn from(a: &AdminUser) -> Self {
        Self {
            id: a.id,
            email: a.email.clone(),
            name: a.name.clone(),
            role: a.role,
        }
    }
}

/// Session keys.
pub mod keys {
    /// The logged-in admin.
    pub const CURRENT_ADMIN: &str = "current_admin";

    /// One-shot message shown on the next rendered page.
    pub const FLASH: &str = "flash";
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn admin(role: AdminRole) -> CurrentAdmin {
        CurrentAdmin {
            id: AdminUserId::new(1),
            email: Email::parse("owner@hearthbakery.shop").unwrap(),
            name: "Owner".to_owned(),
            role,
        }
    }

    #[test]
    fn test_permissions_follow_role() {
        let viewer = admin(AdminRole::Viewer);
        assert!(!viewer.can_edit());
        assert!(!viewer.can_manage_orders());

        let editor = admin(AdminRole::Editor);
        assert!(editor.can_edit());
        assert!(!editor.can_manage_orders());

        let super_admin = admin(AdminRole::SuperAdmin);
        assert!(super_admin.can_manage_users());
        assert!(super_admin.can_manage_orders());
    }

    #[test]
    fn test_session_round_trip_keeps_role() {
        let json = serde_json::to_string(&admin(AdminRole::Admin)).unwrap();
        let back: CurrentAdmin = serde_json::from_str(&json).unwrap();
        assert_eq!(back.role, AdminRole::Admin);
        assert_eq!(back.email.as_str(), "owner@hearthbakery.shop");
    }
}
