//! Customer login, registration and logout.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{CspNonce, clear_current_user, set_current_user};
use crate::models::{CurrentUser, Flash};
use crate::routes::context::PageContext;
use crate::services::{AuthError, AuthService, Registration};
use crate::state::AppState;

// =============================================================================
// Forms
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub next: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub password_confirm: String,
    #[serde(default)]
    pub next: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

/// Only same-site paths are followed after login.
fn safe_next(next: Option<&str>) -> String {
    match next.map(str::trim) {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') => {
            path.to_owned()
        }
        _ => "/account".to_owned(),
    }
}

// =============================================================================
// Templates
// =============================================================================

#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub ctx: PageContext,
    pub email: String,
    pub next: String,
    pub error: Option<String>,
}

#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub ctx: PageContext,
    pub form: RegisterForm,
    pub error: Option<String>,
}

// =============================================================================
// Login
// =============================================================================

#[instrument(skip_all)]
pub async fn login_page(ctx: PageContext, Query(query): Query<NextQuery>) -> Response {
    if ctx.is_signed_in() {
        return Redirect::to(&safe_next(query.next.as_deref())).into_response();
    }
    LoginTemplate {
        ctx,
        email: String::new(),
        next: safe_next(query.next.as_deref()),
        error: None,
    }
    .into_response()
}

/// Verify credentials and start the customer session.
///
/// # Errors
///
/// Returns an error if the session cannot be written or the database fails.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    CspNonce(nonce): CspNonce,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let next = safe_next(Some(&form.next));

    match AuthService::new(state.pool()).login(&form.email, &form.password).await {
        Ok(customer) => {
            let user = CurrentUser::from(&customer);
            set_current_user(&session, &user).await?;
            set_sentry_user(&user.id, Some(user.email.as_str()));
            tracing::info!(user_id = %user.id, "Customer logged in");

            Flash::success(format!("Welcome back, {}!", user.name))
                .push(&session)
                .await?;
            Ok(Redirect::to(&next).into_response())
        }
        Err(AuthError::InvalidCredentials | AuthError::InvalidEmail(_) | AuthError::UserNotFound) => {
            tracing::info!("Login rejected");
            let ctx = PageContext::build(&state, Some(&session), nonce).await;
            Ok(LoginTemplate {
                ctx,
                email: form.email,
                next,
                error: Some("Incorrect email or password.".to_owned()),
            }
            .into_response())
        }
        Err(e) => Err(e.into()),
    }
}

// =============================================================================
// Registration
// =============================================================================

#[instrument(skip_all)]
pub async fn register_page(ctx: PageContext, Query(query): Query<NextQuery>) -> Response {
    if ctx.is_signed_in() {
        return Redirect::to("/account").into_response();
    }
    RegisterTemplate {
        ctx,
        form: RegisterForm {
            next: safe_next(query.next.as_deref()),
            ..RegisterForm::default()
        },
        error: None,
    }
    .into_response()
}

/// Create an account and sign the customer in.
///
/// # Errors
///
/// Returns an error if the session cannot be written or the database fails.
#[instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    CspNonce(nonce): CspNonce,
    Form(mut form): Form<RegisterForm>,
) -> Result<Response> {
    let error = if form.password == form.password_confirm {
        let registration = Registration {
            email: &form.email,
            name: &form.name,
            phone: Some(form.phone.as_str()),
            password: &form.password,
        };
        match AuthService::new(state.pool()).register(registration).await {
            Ok(customer) => {
                let user = CurrentUser::from(&customer);
                set_current_user(&session, &user).await?;
                set_sentry_user(&user.id, Some(user.email.as_str()));
                tracing::info!(user_id = %user.id, "Customer registered");

                let store_name = state.site_settings().await?.store_name;
                Flash::success(format!("Welcome to {store_name}, {}!", user.name))
                    .push(&session)
                    .await?;
                return Ok(Redirect::to(&safe_next(Some(&form.next))).into_response());
            }
            Err(AuthError::UserAlreadyExists) => {
                "An account with this email already exists.".to_owned()
            }
            Err(AuthError::InvalidEmail(_)) => "Enter a valid email address.".to_owned(),
            Err(AuthError::WeakPassword(msg) | AuthError::InvalidInput(msg)) => capitalize(&msg),
            Err(e) => return Err(e.into()),
        }
    } else {
        "Passwords do not match.".to_owned()
    };

    form.password.clear();
    form.password_confirm.clear();
    let ctx = PageContext::build(&state, Some(&session), nonce).await;
    Ok(RegisterTemplate {
        ctx,
        form,
        error: Some(error),
    }
    .into_response())
}

// =============================================================================
// Logout
// =============================================================================

/// End the customer session. The cart is kept.
///
/// # Errors
///
/// Returns an error if the session cannot be written.
#[instrument(skip_all)]
pub async fn logout(session: Session) -> Result<Response> {
    clear_current_user(&session).await?;
    clear_sentry_user();
    Flash::info("You have been signed out.").push(&session).await?;
    Ok(Redirect::to("/").into_response())
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_next_rejects_offsite_targets() {
        assert_eq!(safe_next(Some("/checkout")), "/checkout");
        assert_eq!(safe_next(Some("//evil.example")), "/account");
        assert_eq!(safe_next(Some("https://evil.example")), "/account");
        assert_eq!(safe_next(Some("/\\evil.example")), "/account");
        assert_eq!(safe_next(None), "/account");
    }
}
