//! Testimonials: moderation queue plus staff-written entries.

use std::str::FromStr;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use hearth_core::analytics::moderation_counts;
use hearth_core::filters::ModerationFilter;
use hearth_core::models::Testimonial;
use hearth_core::validation::ValidationErrors;
use hearth_core::{ModerationStatus, Rating, TestimonialId};

use crate::components::{SelectOption, StatusTab, status_tabs};
use crate::db::TestimonialRepository;
use crate::db::testimonials::TestimonialInput;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{CspNonce, RequireAdminAuth, RequireEditor};
use crate::models::Flash;
use crate::routes::context::PageContext;
use crate::state::AppState;

const MAX_CONTENT_LENGTH: usize = 2000;

#[derive(Debug, Default, Deserialize)]
pub struct ModerationQuery {
    pub status: Option<String>,
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusForm {
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TestimonialForm {
    #[serde(default)]
    pub author_name: String,
    #[serde(default)]
    pub author_title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub rating: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub status: String,
    /// Checkbox: present when ticked.
    pub is_featured: Option<String>,
}

/// Validated testimonial fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTestimonial {
    pub author_name: String,
    pub author_title: Option<String>,
    pub content: String,
    pub rating: Rating,
    pub image_url: Option<String>,
    pub status: ModerationStatus,
    pub is_featured: bool,
}

impl ParsedTestimonial {
    fn as_input(&self) -> TestimonialInput<'_> {
        TestimonialInput {
            author_name: &self.author_name,
            author_title: self.author_title.as_deref(),
            content: &self.content,
            rating: self.rating,
            image_url: self.image_url.as_deref(),
            status: self.status,
            is_featured: self.is_featured,
        }
    }
}

fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

impl TestimonialForm {
    fn from_testimonial(t: &Testimonial) -> Self {
        Self {
            author_name: t.author_name.clone(),
            author_title: t.author_title.clone().unwrap_or_default(),
            content: t.content.clone(),
            rating: t.rating.get().to_string(),
            image_url: t.image_url.clone().unwrap_or_default(),
            status: t.status.as_str().to_owned(),
            is_featured: t.is_featured.then(|| "on".to_owned()),
        }
    }

    fn blank() -> Self {
        Self {
            rating: "5".to_owned(),
            status: ModerationStatus::Approved.as_str().to_owned(),
            ..Self::default()
        }
    }

    /// # Errors
    ///
    /// Returns every invalid field.
    pub fn parse(&self) -> std::result::Result<ParsedTestimonial, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let author_name = self.author_name.trim();
        if author_name.is_empty() {
            errors.add("author_name", "Name is required");
        }
        let content = self.content.trim();
        if content.is_empty() {
            errors.add("content", "Testimonial text is required");
        } else if content.chars().count() > MAX_CONTENT_LENGTH {
            errors.add(
                "content",
                format!("Keep it under {MAX_CONTENT_LENGTH} characters"),
            );
        }
        let rating = self
            .rating
            .trim()
            .parse::<i32>()
            .ok()
            .and_then(|r| Rating::new(r).ok());
        if rating.is_none() {
            errors.add("rating", "Rating must be between 1 and 5");
        }
        let image_url = optional(&self.image_url);
        if image_url
            .as_deref()
            .is_some_and(|u| !u.starts_with("https://") && !u.starts_with("http://"))
        {
            errors.add("image_url", "Image must be a web address");
        }
        let status = ModerationStatus::from_str(&self.status).unwrap_or_else(|_| {
            errors.add("status", "Choose a status");
            ModerationStatus::default()
        });

        let (Some(rating), true) = (rating, errors.is_empty()) else {
            return Err(errors);
        };
        Ok(ParsedTestimonial {
            author_name: author_name.to_owned(),
            author_title: optional(&self.author_title),
            content: content.to_owned(),
            rating,
            image_url,
            status,
            is_featured: self.is_featured.is_some(),
        })
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "testimonials/index.html")]
pub struct TestimonialsIndexTemplate {
    pub ctx: PageContext,
    pub testimonials: Vec<Testimonial>,
    pub tabs: Vec<StatusTab>,
    pub q: String,
}

#[derive(Template, WebTemplate)]
#[template(path = "testimonials/form.html")]
pub struct TestimonialFormTemplate {
    pub ctx: PageContext,
    /// `None` when creating.
    pub id: Option<TestimonialId>,
    pub form: TestimonialForm,
    pub statuses: Vec<SelectOption>,
    pub errors: ValidationErrors,
}

impl TestimonialFormTemplate {
    fn new(
        ctx: PageContext,
        id: Option<TestimonialId>,
        form: TestimonialForm,
        errors: ValidationErrors,
    ) -> Self {
        let selected = form.status.parse().ok();
        Self {
            ctx,
            id,
            statuses: SelectOption::for_statuses(ModerationStatus::ALL, selected),
            form,
            errors,
        }
    }

    fn action(&self) -> String {
        self.id
            .map_or_else(|| "/testimonials".to_owned(), |id| format!("/testimonials/{id}"))
    }
}

/// Build the testimonials router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/testimonials", get(index).post(create))
        .route("/testimonials/new", get(new_form))
        .route("/testimonials/{id}", post(update))
        .route("/testimonials/{id}/edit", get(edit_form))
        .route("/testimonials/{id}/status", post(set_status))
        .route("/testimonials/{id}/feature", post(toggle_featured))
        .route("/testimonials/{id}/delete", post(delete))
}

/// GET /testimonials
#[instrument(skip_all)]
async fn index(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    ctx: PageContext,
    Query(query): Query<ModerationQuery>,
) -> Result<TestimonialsIndexTemplate> {
    let testimonials = TestimonialRepository::new(state.pool()).list().await?;
    let filter = ModerationFilter::from_params(query.status.as_deref(), query.q.as_deref());

    let q = query.q.unwrap_or_default();
    let tabs = status_tabs(
        "/testimonials",
        &moderation_counts(&testimonials),
        filter.status,
        &[("q", &q)],
    );

    Ok(TestimonialsIndexTemplate {
        ctx,
        testimonials: filter.apply(&testimonials).into_iter().cloned().collect(),
        tabs,
        q,
    })
}

/// GET /testimonials/new
#[instrument(skip_all)]
async fn new_form(RequireEditor(_admin): RequireEditor, ctx: PageContext) -> TestimonialFormTemplate {
    TestimonialFormTemplate::new(ctx, None, TestimonialForm::blank(), ValidationErrors::new())
}

/// POST /testimonials
#[instrument(skip_all)]
async fn create(
    RequireEditor(admin): RequireEditor,
    State(state): State<AppState>,
    session: Session,
    CspNonce(nonce): CspNonce,
    Form(form): Form<TestimonialForm>,
) -> Result<Response> {
    let parsed = match form.parse() {
        Ok(parsed) => parsed,
        Err(errors) => {
            let ctx = PageContext::build(&state, Some(&session), nonce, "/testimonials").await;
            return Ok(TestimonialFormTemplate::new(ctx, None, form, errors).into_response());
        }
    };

    let testimonial = TestimonialRepository::new(state.pool())
        .create(&parsed.as_input())
        .await?;
    tracing::info!(admin_id = %admin.id, testimonial_id = %testimonial.id, "Testimonial created");

    Flash::success("Testimonial added").push(&session).await?;
    Ok(Redirect::to("/testimonials").into_response())
}

/// GET /testimonials/{id}/edit
#[instrument(skip_all, fields(testimonial_id = %id))]
async fn edit_form(
    RequireEditor(_admin): RequireEditor,
    State(state): State<AppState>,
    ctx: PageContext,
    Path(id): Path<TestimonialId>,
) -> Result<TestimonialFormTemplate> {
    let testimonial = TestimonialRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("testimonial {id}")))?;
    Ok(TestimonialFormTemplate::new(
        ctx,
        Some(id),
        TestimonialForm::from_testimonial(&testimonial),
        ValidationErrors::new(),
    ))
}

/// POST /testimonials/{id}
#[instrument(skip_all, fields(testimonial_id = %id))]
async fn update(
    RequireEditor(admin): RequireEditor,
    State(state): State<AppState>,
    session: Session,
    CspNonce(nonce): CspNonce,
    Path(id): Path<TestimonialId>,
    Form(form): Form<TestimonialForm>,
) -> Result<Response> {
    let parsed = match form.parse() {
        Ok(parsed) => parsed,
        Err(errors) => {
            let path = format!("/testimonials/{id}/edit");
            let ctx = PageContext::build(&state, Some(&session), nonce, &path).await;
            return Ok(TestimonialFormTemplate::new(ctx, Some(id), form, errors).into_response());
        }
    };

    TestimonialRepository::new(state.pool())
        .update(id, &parsed.as_input())
        .await?;
    tracing::info!(admin_id = %admin.id, "Testimonial updated");

    Flash::success("Testimonial saved").push(&session).await?;
    Ok(Redirect::to("/testimonials").into_response())
}

/// POST /testimonials/{id}/status
#[instrument(skip_all, fields(testimonial_id = %id))]
async fn set_status(
    RequireEditor(admin): RequireEditor,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<TestimonialId>,
    Form(form): Form<StatusForm>,
) -> Result<Response> {
    let status: ModerationStatus = form
        .status
        .parse()
        .map_err(|_| AppError::BadRequest(format!("unknown status {}", form.status)))?;

    TestimonialRepository::new(state.pool())
        .set_status(id, status)
        .await?;
    tracing::info!(admin_id = %admin.id, status = %status, "Testimonial moderated");

    Flash::success(format!("Testimonial {}", status.label().to_lowercase()))
        .push(&session)
        .await?;
    Ok(Redirect::to("/testimonials").into_response())
}

/// POST /testimonials/{id}/feature
#[instrument(skip_all, fields(testimonial_id = %id))]
async fn toggle_featured(
    RequireEditor(_admin): RequireEditor,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<TestimonialId>,
) -> Result<Response> {
    let featured = TestimonialRepository::new(state.pool())
        .toggle_featured(id)
        .await?;

    let message = if featured {
        "Testimonial featured on the home page"
    } else {
        "Testimonial no longer featured"
    };
    Flash::success(message).push(&session).await?;
    Ok(Redirect::to("/testimonials").into_response())
}

/// POST /testimonials/{id}/delete
#[instrument(skip_all, fields(testimonial_id = %id))]
async fn delete(
    RequireEditor(admin): RequireEditor,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<TestimonialId>,
) -> Result<Response> {
    TestimonialRepository::new(state.pool()).delete(id).await?;
    tracing::info!(admin_id = %admin.id, "Testimonial deleted");

    Flash::success("Testimonial deleted").push(&session).await?;
    Ok(Redirect::to("/testimonials").into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn valid() -> TestimonialForm {
        TestimonialForm {
            author_name: " Priya ".to_owned(),
            author_title: String::new(),
            content: "The wedding cake was perfect.".to_owned(),
            rating: "5".to_owned(),
            image_url: String::new(),
            status: "approved".to_owned(),
            is_featured: Some("on".to_owned()),
        }
    }

    #[test]
    fn test_parse_valid_form() {
        let parsed = valid().parse().unwrap();
        assert_eq!(parsed.author_name, "Priya");
        assert_eq!(parsed.author_title, None);
        assert_eq!(parsed.rating.get(), 5);
        assert_eq!(parsed.status, ModerationStatus::Approved);
        assert!(parsed.is_featured);
    }

    #[test]
    fn test_parse_collects_errors() {
        let form = TestimonialForm {
            author_name: String::new(),
            rating: "9".to_owned(),
            image_url: "javascript:alert(1)".to_owned(),
            ..valid()
        };
        let errors = form.parse().unwrap_err();
        assert!(errors.has("author_name"));
        assert!(errors.has("rating"));
        assert!(errors.has("image_url"));
        assert!(!errors.has("content"));
    }

    #[test]
    fn test_unticked_checkbox_is_not_featured() {
        let form = TestimonialForm {
            is_featured: None,
            ..valid()
        };
        assert!(!form.parse().unwrap().is_featured);
    }
}
