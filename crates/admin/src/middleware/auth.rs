//! Authentication and permission extractors.
//!
//! The signed-in admin is a [`CurrentAdmin`] stored in the session at login.
//! Every request re-reads the account row: a deactivated or deleted account
//! loses its session at once, and a changed role applies on the next request.
//! Each extractor checks one permission on top of being signed in:
//!
//! | extractor | requires |
//! |-----------|----------|
//! | [`RequireAdminAuth`] | any active staff account |
//! | [`RequireEditor`] | `AdminRole::can_edit` |
//! | [`RequireOrderManager`] | `AdminRole::can_manage_orders` |
//! | [`RequireSuperAdmin`] | `AdminRole::can_manage_users` |

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use hearth_core::AdminRole;
use hearth_core::models::AdminUser;

use crate::db::AdminUserRepository;
use crate::error::set_sentry_user;
use crate::models::{CurrentAdmin, session_keys};
use crate::state::AppState;

/// Rejection for every auth extractor.
#[derive(Debug)]
pub enum AdminAuthRejection {
    /// Page request without a session admin.
    RedirectToLogin,
    /// API or HTMX request without a session admin, or no session layer.
    Unauthorized,
    /// Signed in, but the role lacks the permission.
    Forbidden(&'static str),
    /// The account could not be checked against the database.
    Unavailable,
}

impl IntoResponse for AdminAuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/auth/login").into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
            Self::Forbidden(message) => (StatusCode::FORBIDDEN, message).into_response(),
            Self::Unavailable => StatusCode::SERVICE_UNAVAILABLE.into_response(),
        }
    }
}

async fn session_admin(session: &Session) -> Option<CurrentAdmin> {
    match session.get::<CurrentAdmin>(session_keys::CURRENT_ADMIN).await {
        Ok(admin) => admin,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read current admin from session");
            None
        }
    }
}

/// The session admin refreshed from the stored account, or `None` when the
/// account is gone or deactivated.
#[must_use]
pub fn still_active(admin: &CurrentAdmin, stored: Option<&AdminUser>) -> Option<CurrentAdmin> {
    stored
        .filter(|user| user.id == admin.id && user.is_active)
        .map(CurrentAdmin::from)
}

fn signed_out(parts: &Parts) -> AdminAuthRejection {
    let wants_redirect =
        !parts.uri.path().starts_with("/api/") && !parts.headers.contains_key("hx-request");
    if wants_redirect {
        AdminAuthRejection::RedirectToLogin
    } else {
        AdminAuthRejection::Unauthorized
    }
}

/// Signed-in, still active admin whose current role passes `allowed`.
async fn require(
    parts: &Parts,
    state: &AppState,
    allowed: fn(AdminRole) -> bool,
    denied: &'static str,
) -> Result<CurrentAdmin, AdminAuthRejection> {
    let session = parts
        .extensions
        .get::<Session>()
        .ok_or(AdminAuthRejection::Unauthorized)?;

    let Some(snapshot) = session_admin(session).await else {
        return Err(signed_out(parts));
    };

    let stored = AdminUserRepository::new(state.pool())
        .get_by_id(snapshot.id)
        .await
        .map_err(|e| {
            tracing::error!(
                error = %e,
                admin_id = %snapshot.id,
                "Failed to re-check admin account"
            );
            AdminAuthRejection::Unavailable
        })?;

    let Some(admin) = still_active(&snapshot, stored.as_ref()) else {
        tracing::info!(admin_id = %snapshot.id, "Session ended for removed or deactivated admin");
        if let Err(e) = session.flush().await {
            tracing::warn!(error = %e, "Failed to flush revoked admin session");
        }
        return Err(signed_out(parts));
    };

    if admin.role != snapshot.role
        && let Err(e) = session.insert(session_keys::CURRENT_ADMIN, &admin).await
    {
        tracing::warn!(error = %e, "Failed to refresh admin role in session");
    }

    set_sentry_user(admin.id.as_i32(), Some(admin.email.as_str()));

    if !allowed(admin.role) {
        tracing::info!(admin_id = %admin.id, role = %admin.role, "Permission denied");
        return Err(AdminAuthRejection::Forbidden(denied));
    }
    Ok(admin)
}

/// Any signed-in admin, including viewers.
pub struct RequireAdminAuth(pub CurrentAdmin);

impl FromRequestParts<AppState> for RequireAdminAuth {
    type Rejection = AdminAuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        require(parts, state, |_| true, "").await.map(Self)
    }
}

/// Staff who may change content and moderation queues.
pub struct RequireEditor(pub CurrentAdmin);

impl FromRequestParts<AppState> for RequireEditor {
    type Rejection = AdminAuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        require(parts, state, AdminRole::can_edit, "Your role is read-only")
            .await
            .map(Self)
    }
}

/// Staff who run the order and custom request workflow and site settings.
pub struct RequireOrderManager(pub CurrentAdmin);

impl FromRequestParts<AppState> for RequireOrderManager {
    type Rejection = AdminAuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        require(
            parts,
            state,
            AdminRole::can_manage_orders,
            "Only admins can manage orders and settings",
        )
        .await
        .map(Self)
    }
}

/// Staff account management.
pub struct RequireSuperAdmin(pub CurrentAdmin);

impl FromRequestParts<AppState> for RequireSuperAdmin {
    type Rejection = AdminAuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        require(
            parts,
            state,
            AdminRole::can_manage_users,
            "Only super admins can manage staff accounts",
        )
        .await
        .map(Self)
    }
}

/// For the login page, which redirects an already signed-in admin.
pub struct OptionalAdminAuth(pub Option<CurrentAdmin>);

impl<S> FromRequestParts<S> for OptionalAdminAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let admin = match parts.extensions.get::<Session>() {
            Some(session) => session_admin(session).await,
            None => None,
        };
        Ok(Self(admin))
    }
}

/// Store the admin in the session after login, cycling the session ID first.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_admin(
    session: &Session,
    admin: &CurrentAdmin,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_ADMIN, admin).await
}

/// End the admin session entirely.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_admin(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;

    use hearth_core::{AdminUserId, Email};

    use super::*;

    fn stored(id: i32, role: AdminRole, is_active: bool) -> AdminUser {
        AdminUser {
            id: AdminUserId::new(id),
            email: Email::parse("baker@hearthbakery.shop").unwrap(),
            name: "Bea".to_owned(),
            role,
            is_active,
            last_login_at: None,
            created_at: Utc::now(),
        }
    }

    fn snapshot(role: AdminRole) -> CurrentAdmin {
        CurrentAdmin::from(&stored(7, role, true))
    }

    #[test]
    fn test_active_account_keeps_session() {
        let admin = still_active(
            &snapshot(AdminRole::Admin),
            Some(&stored(7, AdminRole::Admin, true)),
        )
        .unwrap();
        assert_eq!(admin.id, AdminUserId::new(7));
        assert_eq!(admin.role, AdminRole::Admin);
    }

    #[test]
    fn test_deactivated_account_loses_session() {
        let revoked = still_active(
            &snapshot(AdminRole::SuperAdmin),
            Some(&stored(7, AdminRole::SuperAdmin, false)),
        );
        assert!(revoked.is_none());
    }

    #[test]
    fn test_deleted_account_loses_session() {
        assert!(still_active(&snapshot(AdminRole::SuperAdmin), None).is_none());
    }

    #[test]
    fn test_role_change_applies_immediately() {
        let admin = still_active(
            &snapshot(AdminRole::SuperAdmin),
            Some(&stored(7, AdminRole::Viewer, true)),
        )
        .unwrap();
        assert_eq!(admin.role, AdminRole::Viewer);
        assert!(!admin.can_manage_users());
    }

    #[test]
    fn test_rejection_statuses() {
        assert_eq!(
            AdminAuthRejection::RedirectToLogin.into_response().status(),
            StatusCode::SEE_OTHER
        );
        assert_eq!(
            AdminAuthRejection::Unauthorized.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AdminAuthRejection::Forbidden("no").into_response().status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AdminAuthRejection::Unavailable.into_response().status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
