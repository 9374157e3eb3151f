//! Staff account management. Super admins only.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use hearth_core::models::AdminUser;
use hearth_core::{AdminRole, AdminUserId};

use crate::components::SelectOption;
use crate::db::AdminUserRepository;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::RequireSuperAdmin;
use crate::models::Flash;
use crate::routes::context::PageContext;
use crate::services::auth::{AdminAuthError, AdminAuthService, MIN_PASSWORD_LENGTH, NewAdmin};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct CreateAdminForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RoleForm {
    pub role: String,
}

/// A change one admin makes to another staff account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountChange {
    Role(AdminRole),
    Deactivate,
    Reactivate,
    Delete,
}

impl AccountChange {
    /// Whether the target stops being an active super admin afterwards.
    const fn removes_super_admin(self, target: &AdminUser) -> bool {
        let was_super = matches!(target.role, AdminRole::SuperAdmin) && target.is_active;
        let stays_super = match self {
            Self::Role(role) => matches!(role, AdminRole::SuperAdmin),
            Self::Reactivate => true,
            Self::Deactivate | Self::Delete => false,
        };
        was_super && !stays_super
    }
}

/// Refuse changes that would lock staff out of the back office.
///
/// # Errors
///
/// Returns the message to show when the change is not allowed.
pub fn check_account_change(
    actor: AdminUserId,
    target: &AdminUser,
    change: AccountChange,
    active_super_admins: i64,
) -> std::result::Result<(), &'static str> {
    if actor == target.id && change != AccountChange::Reactivate {
        return Err("You cannot change your own role, status or account here");
    }
    if change.removes_super_admin(target) && active_super_admins <= 1 {
        return Err("At least one active super admin must remain");
    }
    Ok(())
}

/// One row of the staff table.
#[derive(Debug, Clone)]
pub struct StaffRow {
    pub user: AdminUser,
    pub is_self: bool,
    pub roles: Vec<SelectOption>,
}

#[derive(Template, WebTemplate)]
#[template(path = "admin_users.html")]
pub struct AdminUsersTemplate {
    pub ctx: PageContext,
    pub staff: Vec<StaffRow>,
    pub roles: Vec<SelectOption>,
    pub min_password_length: usize,
}

/// Build the staff router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin-users", get(index).post(create))
        .route("/admin-users/{id}/role", post(update_role))
        .route("/admin-users/{id}/active", post(toggle_active))
        .route("/admin-users/{id}/delete", post(delete))
}

/// GET /admin-users
#[instrument(skip_all)]
async fn index(
    RequireSuperAdmin(admin): RequireSuperAdmin,
    State(state): State<AppState>,
    ctx: PageContext,
) -> Result<AdminUsersTemplate> {
    let staff = AdminUserRepository::new(state.pool())
        .list_all()
        .await?
        .into_iter()
        .map(|user| StaffRow {
            is_self: user.id == admin.id,
            roles: SelectOption::for_statuses(AdminRole::ALL, Some(user.role)),
            user,
        })
        .collect();

    Ok(AdminUsersTemplate {
        ctx,
        staff,
        roles: SelectOption::for_statuses(AdminRole::ALL, Some(AdminRole::Editor)),
        min_password_length: MIN_PASSWORD_LENGTH,
    })
}

/// POST /admin-users
#[instrument(skip_all)]
async fn create(
    RequireSuperAdmin(admin): RequireSuperAdmin,
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CreateAdminForm>,
) -> Result<Response> {
    let Ok(role) = form.role.parse::<AdminRole>() else {
        Flash::error("Choose a role").push(&session).await?;
        return Ok(Redirect::to("/admin-users").into_response());
    };

    let service = AdminAuthService::new(state.pool());
    let flash = match service
        .create(NewAdmin {
            email: &form.email,
            name: &form.name,
            role,
            password: &form.password,
        })
        .await
    {
        Ok(user) => {
            tracing::info!(admin_id = %admin.id, new_admin_id = %user.id, role = %role, "Staff account created");
            Flash::success(format!("{} can now sign in", user.email))
        }
        Err(AdminAuthError::UserAlreadyExists) => {
            Flash::error("An account with this email already exists")
        }
        Err(AdminAuthError::InvalidInput(message) | AdminAuthError::WeakPassword(message)) => {
            Flash::error(capitalize(&message))
        }
        Err(e) => return Err(e.into()),
    };

    flash.push(&session).await?;
    Ok(Redirect::to("/admin-users").into_response())
}

fn capitalize(message: &str) -> String {
    let mut chars = message.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// Load the target and run the lockout checks. `Ok(None)` means a flash
/// explaining the refusal has been queued.
async fn guarded_target(
    state: &AppState,
    session: &Session,
    actor: AdminUserId,
    id: AdminUserId,
    change: impl FnOnce(&AdminUser) -> AccountChange,
) -> Result<Option<(AdminUser, AccountChange)>> {
    let repo = AdminUserRepository::new(state.pool());
    let target = repo
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("admin user {id}")))?;
    let change = change(&target);
    let super_admins = repo.count_active_super_admins().await?;

    if let Err(message) = check_account_change(actor, &target, change, super_admins) {
        tracing::info!(admin_id = %actor, target_id = %id, ?change, "Staff change refused");
        Flash::error(message).push(session).await?;
        return Ok(None);
    }
    Ok(Some((target, change)))
}

/// POST /admin-users/{id}/role
#[instrument(skip_all, fields(target_id = %id))]
async fn update_role(
    RequireSuperAdmin(admin): RequireSuperAdmin,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<AdminUserId>,
    Form(form): Form<RoleForm>,
) -> Result<Response> {
    let role: AdminRole = form
        .role
        .parse()
        .map_err(|_| AppError::BadRequest(format!("unknown role {}", form.role)))?;

    if let Some((target, _)) =
        guarded_target(&state, &session, admin.id, id, |_| AccountChange::Role(role)).await?
    {
        AdminUserRepository::new(state.pool())
            .update_role(id, role)
            .await?;
        tracing::info!(admin_id = %admin.id, role = %role, "Staff role changed");
        Flash::success(format!("{} is now {}.", target.name, role.label()))
            .push(&session)
            .await?;
    }
    Ok(Redirect::to("/admin-users").into_response())
}

/// POST /admin-users/{id}/active
#[instrument(skip_all, fields(target_id = %id))]
async fn toggle_active(
    RequireSuperAdmin(admin): RequireSuperAdmin,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<AdminUserId>,
) -> Result<Response> {
    let change_for = |u: &AdminUser| {
        if u.is_active {
            AccountChange::Deactivate
        } else {
            AccountChange::Reactivate
        }
    };

    if let Some((target, change)) =
        guarded_target(&state, &session, admin.id, id, change_for).await?
    {
        let active = change == AccountChange::Reactivate;
        AdminUserRepository::new(state.pool())
            .set_active(id, active)
            .await?;
        tracing::info!(admin_id = %admin.id, active, "Staff account status changed");
        let verb = if active { "reactivated" } else { "deactivated" };
        Flash::success(format!("{} {verb}", target.name))
            .push(&session)
            .await?;
    }
    Ok(Redirect::to("/admin-users").into_response())
}

/// POST /admin-users/{id}/delete
#[instrument(skip_all, fields(target_id = %id))]
async fn delete(
    RequireSuperAdmin(admin): RequireSuperAdmin,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<AdminUserId>,
) -> Result<Response> {
    if let Some((target, _)) =
        guarded_target(&state, &session, admin.id, id, |_| AccountChange::Delete).await?
    {
        AdminUserRepository::new(state.pool()).delete(id).await?;
        tracing::info!(admin_id = %admin.id, "Staff account deleted");
        Flash::success(format!("{} removed", target.name))
            .push(&session)
            .await?;
    }
    Ok(Redirect::to("/admin-users").into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use hearth_core::Email;

    use super::*;

    fn user(id: i32, role: AdminRole, is_active: bool) -> AdminUser {
        AdminUser {
            id: AdminUserId::new(id),
            email: Email::parse(&format!("staff{id}@hearth.test")).unwrap(),
            name: format!("Staff {id}"),
            role,
            is_active,
            last_login_at: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_cannot_change_self() {
        let me = user(1, AdminRole::SuperAdmin, true);
        for change in [
            AccountChange::Role(AdminRole::Viewer),
            AccountChange::Deactivate,
            AccountChange::Delete,
        ] {
            assert!(check_account_change(me.id, &me, change, 3).is_err());
        }
    }

    #[test]
    fn test_last_super_admin_is_protected() {
        let other = user(2, AdminRole::SuperAdmin, true);
        let actor = AdminUserId::new(1);
        assert!(check_account_change(actor, &other, AccountChange::Delete, 1).is_err());
        assert!(
            check_account_change(actor, &other, AccountChange::Role(AdminRole::Admin), 1).is_err()
        );
        assert!(check_account_change(actor, &other, AccountChange::Delete, 2).is_ok());
        assert!(
            check_account_change(
                actor,
                &other,
                AccountChange::Role(AdminRole::SuperAdmin),
                1
            )
            .is_ok()
        );
    }

    #[test]
    fn test_inactive_super_admin_does_not_count() {
        let dormant = user(2, AdminRole::SuperAdmin, false);
        let actor = AdminUserId::new(1);
        assert!(check_account_change(actor, &dormant, AccountChange::Delete, 1).is_ok());
    }

    #[test]
    fn test_other_roles_change_freely() {
        let editor = user(3, AdminRole::Editor, true);
        let actor = AdminUserId::new(1);
        assert!(check_account_change(actor, &editor, AccountChange::Deactivate, 1).is_ok());
        assert!(
            check_account_change(actor, &editor, AccountChange::Role(AdminRole::Viewer), 1).is_ok()
        );
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(
            capitalize("password must be at least 10 characters"),
            "Password must be at least 10 characters"
        );
        assert_eq!(capitalize(""), "");
    }
}
