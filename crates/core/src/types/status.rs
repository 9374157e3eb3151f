//! Status and kind enums stored as `TEXT` columns.
//!
//! Every enum is `snake_case` on the wire and in the database. Rows are read
//! leniently: a missing or unrecognised value maps to the enum's default via
//! `from_db`, so an older row never fails to load.

use serde::{Deserialize, Serialize};

/// Error returned when a string does not name a known variant.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid {kind}: {value}")]
pub struct ParseStatusError {
    /// Name of the enum that failed to parse.
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

/// Implements `as_str`, `label`, `ALL`, `from_db`, `Display` and `FromStr` for
/// a fieldless enum.
macro_rules! text_enum {
    ($name:ident, $kind:literal, { $($variant:ident => ($db:literal, $label:literal)),+ $(,)? }) => {
        impl $name {
            /// Every variant, in display order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// The database / wire representation.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $db),+
                }
            }

            /// Human-readable label for templates.
            #[must_use]
            pub const fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }

            /// Read a possibly-missing column value, falling back to the default.
            #[must_use]
            pub fn from_db(value: Option<&str>) -> Self {
                value.and_then(|v| v.parse().ok()).unwrap_or_default()
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = ParseStatusError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim() {
                    $($db => Ok(Self::$variant),)+
                    other => Err(ParseStatusError {
                        kind: $kind,
                        value: other.to_owned(),
                    }),
                }
            }
        }
    };
}

// =============================================================================
// Orders
// =============================================================================

/// Lifecycle of a storefront order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Baking,
    Ready,
    OutForDelivery,
    Delivered,
    Cancelled,
}

text_enum!(OrderStatus, "order status", {
    Pending => ("pending", "Pending"),
    Confirmed => ("confirmed", "Confirmed"),
    Baking => ("baking", "Baking"),
    Ready => ("ready", "Ready"),
    OutForDelivery => ("out_for_delivery", "Out for delivery"),
    Delivered => ("delivered", "Delivered"),
    Cancelled => ("cancelled", "Cancelled"),
});

impl OrderStatus {
    /// Whether the order still needs work from the bakery.
    #[must_use]
    pub const fn is_open(self) -> bool {
        !matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Cancelled orders are excluded from revenue figures.
    #[must_use]
    pub const fn counts_toward_revenue(self) -> bool {
        !matches!(self, Self::Cancelled)
    }

    /// Delivered and cancelled are terminal. Any open status may move to any
    /// other status, including backwards, so staff can correct mistakes.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        self.is_open() && self as u8 != next as u8
    }
}

/// Delivery or in-store pickup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FulfillmentMethod {
    #[default]
    Delivery,
    Pickup,
}

text_enum!(FulfillmentMethod, "fulfillment method", {
    Delivery => ("delivery", "Delivery"),
    Pickup => ("pickup", "Pickup"),
});

// =============================================================================
// Custom cake requests
// =============================================================================

/// Lifecycle of a custom cake request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CustomRequestStatus {
    #[default]
    Pending,
    Reviewing,
    Quoted,
    Accepted,
    Rejected,
    Completed,
}

text_enum!(CustomRequestStatus, "custom request status", {
    Pending => ("pending", "Pending"),
    Reviewing => ("reviewing", "Reviewing"),
    Quoted => ("quoted", "Quoted"),
    Accepted => ("accepted", "Accepted"),
    Rejected => ("rejected", "Rejected"),
    Completed => ("completed", "Completed"),
});

impl CustomRequestStatus {
    /// Requests still waiting on the bakery or the customer.
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Pending | Self::Reviewing | Self::Quoted)
    }
}

// =============================================================================
// Moderation
// =============================================================================

/// Moderation state for reviews and testimonials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ModerationStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

text_enum!(ModerationStatus, "moderation status", {
    Pending => ("pending", "Pending"),
    Approved => ("approved", "Approved"),
    Rejected => ("rejected", "Rejected"),
});

impl ModerationStatus {
    /// Only approved content is shown publicly.
    #[must_use]
    pub const fn is_public(self) -> bool {
        matches!(self, Self::Approved)
    }
}

// =============================================================================
// Notifications
// =============================================================================

/// What an in-app notification is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    OrderPlaced,
    OrderStatus,
    CustomRequest,
    CustomRequestUpdate,
    ReviewApproved,
    #[default]
    General,
}

text_enum!(NotificationKind, "notification kind", {
    OrderPlaced => ("order_placed", "Order placed"),
    OrderStatus => ("order_status", "Order update"),
    CustomRequest => ("custom_request", "Custom cake request"),
    CustomRequestUpdate => ("custom_request_update", "Custom cake update"),
    ReviewApproved => ("review_approved", "Review approved"),
    General => ("general", "Notice"),
});

// =============================================================================
// Staff
// =============================================================================

/// Back-office role with different permission levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AdminRole {
    /// Full access including staff management.
    SuperAdmin,
    /// Store management: orders, requests, content, settings.
    Admin,
    /// Content and moderation only.
    #[default]
    Editor,
    /// Read-only access.
    Viewer,
}

text_enum!(AdminRole, "admin role", {
    SuperAdmin => ("super_admin", "Super admin"),
    Admin => ("admin", "Admin"),
    Editor => ("editor", "Editor"),
    Viewer => ("viewer", "Viewer"),
});

impl AdminRole {
    /// Create, promote, deactivate and delete staff accounts.
    #[must_use]
    pub const fn can_manage_users(self) -> bool {
        matches!(self, Self::SuperAdmin)
    }

    /// Any mutation at all.
    #[must_use]
    pub const fn can_edit(self) -> bool {
        !matches!(self, Self::Viewer)
    }

    /// Order and custom request workflow, settings.
    #[must_use]
    pub const fn can_manage_orders(self) -> bool {
        matches!(self, Self::SuperAdmin | Self::Admin)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_db_defaults_missing_and_unknown() {
        assert_eq!(OrderStatus::from_db(None), OrderStatus::Pending);
        assert_eq!(OrderStatus::from_db(Some("shipped")), OrderStatus::Pending);
        assert_eq!(
            OrderStatus::from_db(Some("out_for_delivery")),
            OrderStatus::OutForDelivery
        );
        assert_eq!(ModerationStatus::from_db(None), ModerationStatus::Pending);
        assert_eq!(NotificationKind::from_db(Some("")), NotificationKind::General);
        assert_eq!(AdminRole::from_db(Some("root")), AdminRole::Editor);
    }

    #[test]
    fn test_display_round_trips_through_from_str() {
        for status in CustomRequestStatus::ALL {
            let parsed: CustomRequestStatus = status.to_string().parse().unwrap();
            assert_eq!(parsed, *status);
        }
    }

    #[test]
    fn test_serde_matches_db_representation() {
        let json = serde_json::to_string(&OrderStatus::OutForDelivery).unwrap();
        assert_eq!(json, "\"out_for_delivery\"");
        let json = serde_json::to_string(&AdminRole::SuperAdmin).unwrap();
        assert_eq!(json, "\"super_admin\"");
    }

    #[test]
    fn test_parse_error_names_the_kind() {
        let err = "gold".parse::<AdminRole>().unwrap_err();
        assert_eq!(err.to_string(), "invalid admin role: gold");
    }

    #[test]
    fn test_terminal_order_statuses() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Baking));
        assert!(OrderStatus::Ready.can_transition_to(OrderStatus::Confirmed));
        assert!(OrderStatus::Baking.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Baking.can_transition_to(OrderStatus::Baking));
        assert!(!OrderStatus::Delivered.can_transition_to(OrderStatus::Pending));
        assert!(!OrderStatus::Cancelled.can_transition_to(OrderStatus::Confirmed));
    }

    #[test]
    fn test_revenue_and_open_flags() {
        assert!(OrderStatus::Delivered.counts_toward_revenue());
        assert!(!OrderStatus::Cancelled.counts_toward_revenue());
        assert!(OrderStatus::OutForDelivery.is_open());
        assert!(!OrderStatus::Delivered.is_open());
        assert!(CustomRequestStatus::Quoted.is_open());
        assert!(!CustomRequestStatus::Completed.is_open());
    }

    #[test]
    fn test_admin_role_permissions() {
        assert!(AdminRole::SuperAdmin.can_manage_users());
        assert!(!AdminRole::Admin.can_manage_users());
        assert!(AdminRole::Admin.can_manage_orders());
        assert!(!AdminRole::Editor.can_manage_orders());
        assert!(AdminRole::Editor.can_edit());
        assert!(!AdminRole::Viewer.can_edit());
    }
}
