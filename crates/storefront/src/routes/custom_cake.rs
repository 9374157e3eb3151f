//! Custom cake request wizard.
//!
//! The wizard (current step plus the raw draft) is kept in the session, so a
//! shopper can leave and come back to a half-finished request.

use std::collections::HashMap;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use hearth_core::custom_request::{CustomCakeWizard, OCCASIONS, SHAPES, WizardStep};
use hearth_core::validation::ValidationErrors;
use hearth_core::FulfillmentMethod;

use crate::db::{CustomRequestRepository, UserRepository};
use crate::error::Result;
use crate::filters;
use crate::middleware::{CspNonce, OptionalAuth};
use crate::models::{CurrentUser, Flash, session_keys};
use crate::routes::context::PageContext;
use crate::state::AppState;

#[derive(Template, WebTemplate)]
#[template(path = "custom_cake/step.html")]
pub struct WizardTemplate {
    pub ctx: PageContext,
    pub wizard: CustomCakeWizard,
    pub errors: ValidationErrors,
    pub steps: &'static [WizardStep],
    pub occasions: &'static [(&'static str, &'static str)],
    pub shapes: &'static [&'static str],
    pub methods: &'static [FulfillmentMethod],
    pub min_notice_days: u32,
}

impl WizardTemplate {
    fn new(
        ctx: PageContext,
        wizard: CustomCakeWizard,
        errors: ValidationErrors,
        min_notice_days: u32,
    ) -> Self {
        Self {
            ctx,
            wizard,
            errors,
            steps: WizardStep::ALL,
            occasions: OCCASIONS,
            shapes: SHAPES,
            methods: FulfillmentMethod::ALL,
            min_notice_days,
        }
    }

    #[must_use]
    pub fn is_current(&self, step: &WizardStep) -> bool {
        *step == self.wizard.step
    }

    #[must_use]
    pub fn is_done(&self, step: &WizardStep) -> bool {
        *step < self.wizard.step
    }

    /// Whether a select option matches the draft value.
    #[must_use]
    pub fn selected(&self, value: &str, option: &str) -> bool {
        value == option
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "custom_cake/submitted.html")]
pub struct SubmittedTemplate {
    pub ctx: PageContext,
}

async fn load_wizard(session: &Session) -> Result<CustomCakeWizard> {
    Ok(session
        .get::<CustomCakeWizard>(session_keys::CUSTOM_CAKE_WIZARD)
        .await?
        .unwrap_or_default())
}

async fn save_wizard(session: &Session, wizard: &CustomCakeWizard) -> Result<()> {
    session
        .insert(session_keys::CUSTOM_CAKE_WIZARD, wizard)
        .await?;
    Ok(())
}

async fn prefill(state: &AppState, wizard: &mut CustomCakeWizard, user: Option<&CurrentUser>) -> Result<()> {
    let Some(user) = user else {
        return Ok(());
    };
    let phone = UserRepository::new(state.pool())
        .get_by_id(user.id)
        .await?
        .and_then(|c| c.phone);
    wizard
        .draft
        .prefill_contact(&user.name, user.email.as_str(), phone.as_deref());
    Ok(())
}

#[derive(Debug, Default, Deserialize)]
pub struct StepQuery {
    pub step: Option<String>,
}

/// Current wizard step. `?step=` jumps back to an earlier step, or forward
/// when every step before it is complete.
///
/// # Errors
///
/// Returns an error if the session cannot be read or written.
#[instrument(skip(state, session, user, nonce))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    CspNonce(nonce): CspNonce,
    Query(query): Query<StepQuery>,
) -> Result<Response> {
    let mut wizard = load_wizard(&session).await?;
    prefill(&state, &mut wizard, user.as_ref()).await?;

    let settings = state.site_settings().await?;
    let mut errors = ValidationErrors::new();
    if let Some(target) = query.step.as_deref().and_then(|s| s.parse::<WizardStep>().ok())
        && let Err(e) = wizard.goto(
            target,
            Utc::now().date_naive(),
            settings.custom_cake_min_notice_days,
        )
    {
        errors = e;
    }
    save_wizard(&session, &wizard).await?;

    let ctx = PageContext::build(&state, Some(&session), nonce).await;
    let notice = settings.custom_cake_min_notice_days;
    Ok(WizardTemplate::new(ctx, wizard, errors, notice).into_response())
}

/// Which button submitted the step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StepAction {
    Next,
    Back,
    Submit,
}

impl StepAction {
    fn from_form(form: &HashMap<String, String>) -> Self {
        match form.get("action").map(String::as_str) {
            Some("back") => Self::Back,
            Some("submit") => Self::Submit,
            _ => Self::Next,
        }
    }
}

/// Save the current step's fields and move back, forward or submit.
///
/// # Errors
///
/// Returns an error if the session or the insert fails.
#[instrument(skip_all)]
pub async fn submit_step(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    CspNonce(nonce): CspNonce,
    Form(form): Form<HashMap<String, String>>,
) -> Result<Response> {
    let mut wizard = load_wizard(&session).await?;
    let settings = state.site_settings().await?;
    let today = Utc::now().date_naive();
    let notice = settings.custom_cake_min_notice_days;

    // A stale tab may post a different step than the session holds; the
    // session wins and the posted fields are applied only when they match.
    let posted_step = form.get("step").and_then(|s| s.parse::<WizardStep>().ok());
    if posted_step.is_none_or(|s| s == wizard.step) {
        let step = wizard.step;
        wizard.draft.apply_form(step, &form);
    }

    let result = match StepAction::from_form(&form) {
        StepAction::Back => {
            wizard.back();
            Ok(())
        }
        StepAction::Next => wizard.advance(today, notice).map(|_| ()),
        StepAction::Submit if wizard.step == WizardStep::Review => {
            match wizard.finish(today, notice) {
                Ok(request) => {
                    let stored = CustomRequestRepository::new(state.pool())
                        .create(&request, user.as_ref().map(|u| u.id))
                        .await?;
                    tracing::info!(request_id = %stored.id, occasion = %stored.occasion, "Custom cake request submitted");

                    session
                        .remove::<CustomCakeWizard>(session_keys::CUSTOM_CAKE_WIZARD)
                        .await?;
                    state
                        .notifier()
                        .custom_request_submitted(&stored, &settings)
                        .await;
                    return Ok(Redirect::to("/custom-cake/submitted").into_response());
                }
                Err(errors) => Err(errors),
            }
        }
        StepAction::Submit => wizard.advance(today, notice).map(|_| ()),
    };

    save_wizard(&session, &wizard).await?;
    let errors = match result {
        Ok(()) => ValidationErrors::new(),
        Err(errors) => errors,
    };
    let ctx = PageContext::build(&state, Some(&session), nonce).await;
    Ok(WizardTemplate::new(ctx, wizard, errors, notice).into_response())
}

/// Thank-you page.
#[instrument(skip_all)]
pub async fn submitted(ctx: PageContext) -> impl IntoResponse {
    SubmittedTemplate { ctx }
}

/// Throw away the draft and start over.
///
/// # Errors
///
/// Returns an error if the session cannot be written.
#[instrument(skip_all)]
pub async fn reset(session: Session) -> Result<Response> {
    session
        .remove::<CustomCakeWizard>(session_keys::CUSTOM_CAKE_WIZARD)
        .await?;
    Flash::info("Your custom cake request was cleared.")
        .push(&session)
        .await?;
    Ok(Redirect::to("/custom-cake").into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn test_action_defaults_to_next() {
        assert_eq!(StepAction::from_form(&form(&[])), StepAction::Next);
        assert_eq!(StepAction::from_form(&form(&[("action", "back")])), StepAction::Back);
        assert_eq!(
            StepAction::from_form(&form(&[("action", "submit")])),
            StepAction::Submit
        );
        assert_eq!(StepAction::from_form(&form(&[("action", "???")])), StepAction::Next);
    }
}
