//! Testimonial wall and submission.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use hearth_core::Rating;
use hearth_core::models::Testimonial;
use hearth_core::validation::ValidationErrors;

use crate::db::TestimonialRepository;
use crate::error::Result;
use crate::filters;
use crate::middleware::CspNonce;
use crate::models::Flash;
use crate::routes::context::PageContext;
use crate::state::AppState;

const MAX_CONTENT_LENGTH: usize = 1500;
const MAX_NAME_LENGTH: usize = 100;

#[derive(Template, WebTemplate)]
#[template(path = "testimonials.html")]
pub struct TestimonialsTemplate {
    pub ctx: PageContext,
    pub testimonials: Vec<Testimonial>,
    pub form: TestimonialForm,
    pub errors: ValidationErrors,
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
}

struct ValidTestimonial<'a> {
    author_name: &'a str,
    author_title: Option<&'a str>,
    content: &'a str,
    rating: Rating,
}

impl TestimonialForm {
    fn validate(&self) -> std::result::Result<ValidTestimonial<'_>, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let author_name = self.author_name.trim();
        if author_name.is_empty() {
            errors.add("author_name", "Name is required");
        } else if author_name.chars().count() > MAX_NAME_LENGTH {
            errors.add(
                "author_name",
                format!("Name must be at most {MAX_NAME_LENGTH} characters"),
            );
        }
        let content = self.content.trim();
        if content.is_empty() {
            errors.add("content", "Tell us about your experience");
        } else if content.chars().count() > MAX_CONTENT_LENGTH {
            errors.add(
                "content",
                format!("Please keep it under {MAX_CONTENT_LENGTH} characters"),
            );
        }
        let rating = self
            .rating
            .trim()
            .parse::<i32>()
            .ok()
            .and_then(|r| Rating::new(r).ok());
        if rating.is_none() {
            errors.add("rating", "Choose a rating from 1 to 5");
        }

        match rating {
            Some(rating) if errors.is_empty() => Ok(ValidTestimonial {
                author_name,
                author_title: Some(self.author_title.trim()).filter(|t| !t.is_empty()),
                content,
                rating,
            }),
            _ => Err(errors),
        }
    }
}

/// Approved testimonials and the submission form.
///
/// # Errors
///
/// Returns an error if the query fails.
#[instrument(skip_all)]
pub async fn index(State(state): State<AppState>, ctx: PageContext) -> Result<impl IntoResponse> {
    let testimonials = TestimonialRepository::new(state.pool()).approved().await?;
    Ok(TestimonialsTemplate {
        ctx,
        testimonials,
        form: TestimonialForm::default(),
        errors: ValidationErrors::new(),
    })
}

/// Submit a testimonial for moderation.
///
/// # Errors
///
/// Returns an error if the insert fails.
#[instrument(skip_all)]
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
    CspNonce(nonce): CspNonce,
    Form(form): Form<TestimonialForm>,
) -> Result<Response> {
    let repo = TestimonialRepository::new(state.pool());
    let valid = match form.validate() {
        Ok(valid) => valid,
        Err(errors) => {
            let testimonials = repo.approved().await?;
            let ctx = PageContext::build(&state, Some(&session), nonce).await;
            return Ok(TestimonialsTemplate {
                ctx,
                testimonials,
                form,
                errors,
            }
            .into_response());
        }
    };

    repo.create(valid.author_name, valid.author_title, valid.content, valid.rating)
        .await?;
    tracing::info!(rating = valid.rating.get(), "Testimonial submitted");

    Flash::success("Thank you! Your testimonial will appear once it has been reviewed.")
        .push(&session)
        .await?;
    Ok(Redirect::to("/testimonials").into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_testimonial() {
        let form = TestimonialForm {
            author_name: " Priya ".to_owned(),
            author_title: String::new(),
            content: "The wedding cake was perfect.".to_owned(),
            rating: "5".to_owned(),
        };
        let valid = form.validate().unwrap();
        assert_eq!(valid.author_name, "Priya");
        assert_eq!(valid.author_title, None);
        assert_eq!(valid.rating.get(), 5);
    }

    #[test]
    fn test_out_of_range_rating_rejected() {
        let form = TestimonialForm {
            author_name: "Sam".to_owned(),
            author_title: String::new(),
            content: "Great".to_owned(),
            rating: "9".to_owned(),
        };
        let errors = form.validate().err().unwrap();
        assert!(errors.has("rating"));
        assert!(!errors.has("content"));
    }
}
