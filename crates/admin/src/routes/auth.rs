//! Staff login and logout.
//!
//! Email and password with argon2 hashes. The login form is rate limited per
//! client IP.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::State,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{
    CspNonce, OptionalAdminAuth, clear_current_admin, login_rate_limiter, set_current_admin,
};
use crate::models::{CurrentAdmin, Flash};
use crate::routes::context::PageContext;
use crate::services::{AdminAuthError, AdminAuthService};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub ctx: PageContext,
    pub email: String,
    pub error: Option<String>,
}

/// Build the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/login", get(login_page).post(login))
        .layer(login_rate_limiter())
        .route("/auth/logout", post(logout))
}

/// GET /auth/login
#[instrument(skip_all)]
async fn login_page(OptionalAdminAuth(admin): OptionalAdminAuth, ctx: PageContext) -> Response {
    if admin.is_some() {
        return Redirect::to("/").into_response();
    }
    LoginTemplate {
        ctx,
        email: String::new(),
        error: None,
    }
    .into_response()
}

/// POST /auth/login
#[instrument(skip_all)]
async fn login(
    State(state): State<AppState>,
    session: Session,
    CspNonce(nonce): CspNonce,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let message = match AdminAuthService::new(state.pool())
        .login(&form.email, &form.password)
        .await
    {
        Ok(user) => {
            let admin = CurrentAdmin::from(&user);
            set_current_admin(&session, &admin).await?;
            set_sentry_user(admin.id.as_i32(), Some(admin.email.as_str()));
            tracing::info!(admin_id = %admin.id, role = %admin.role, "Admin logged in");

            Flash::success(format!("Signed in as {}", admin.name))
                .push(&session)
                .await?;
            return Ok(Redirect::to("/").into_response());
        }
        Err(AdminAuthError::InvalidCredentials | AdminAuthError::InvalidInput(_)) => {
            "Incorrect email or password."
        }
        Err(AdminAuthError::Inactive) => "This account has been deactivated.",
        Err(e) => return Err(e.into()),
    };

    tracing::info!("Admin login rejected");
    let ctx = PageContext::build(&state, Some(&session), nonce, "/auth/login").await;
    Ok(LoginTemplate {
        ctx,
        email: form.email,
        error: Some(message.to_owned()),
    }
    .into_response())
}

/// POST /auth/logout
#[instrument(skip_all)]
async fn logout(session: Session) -> Result<Response> {
    clear_current_admin(&session).await?;
    clear_sentry_user();
    Flash::info("You have been signed out.").push(&session).await?;
    Ok(Redirect::to("/auth/login").into_response())
}
