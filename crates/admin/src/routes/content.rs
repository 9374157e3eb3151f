//! Site content: announcement bar, home page hero slides and markdown pages.

use std::collections::BTreeMap;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use hearth_core::AnnouncementId;
use hearth_core::models::{Announcement, ContentPage, HeroSlide};
use hearth_core::slug::{is_valid_slug, slugify};
use hearth_core::validation::ValidationErrors;

use crate::db::ContentRepository;
use crate::db::content::SlideInput;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{CspNonce, RequireAdminAuth, RequireEditor};
use crate::models::Flash;
use crate::routes::context::PageContext;
use crate::state::AppState;

const MAX_SLIDES: usize = 10;
const DATETIME_LOCAL_FORMAT: &str = "%Y-%m-%dT%H:%M";

fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

fn is_link(value: &str) -> bool {
    value.starts_with('/') || value.starts_with("https://") || value.starts_with("http://")
}

// =============================================================================
// Announcements
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct AnnouncementForm {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub link_url: String,
    /// `datetime-local` value, read as UTC.
    #[serde(default)]
    pub starts_at: String,
    #[serde(default)]
    pub ends_at: String,
}

/// Validated announcement fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAnnouncement {
    pub message: String,
    pub link_url: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
}

fn parse_datetime(raw: &str) -> std::result::Result<Option<DateTime<Utc>>, ()> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    NaiveDateTime::parse_from_str(raw, DATETIME_LOCAL_FORMAT)
        .map(|dt| Some(dt.and_utc()))
        .map_err(|_| ())
}

impl AnnouncementForm {
    /// # Errors
    ///
    /// Returns a message for the first problem found.
    pub fn parse(&self) -> std::result::Result<ParsedAnnouncement, String> {
        let message = self.message.trim();
        if message.is_empty() {
            return Err("Announcement text is required".to_owned());
        }
        let link_url = optional(&self.link_url);
        if link_url.as_deref().is_some_and(|l| !is_link(l)) {
            return Err("Link must be a site path or web address".to_owned());
        }
        let starts_at =
            parse_datetime(&self.starts_at).map_err(|()| "Start time is not valid".to_owned())?;
        let ends_at =
            parse_datetime(&self.ends_at).map_err(|()| "End time is not valid".to_owned())?;
        if let (Some(start), Some(end)) = (starts_at, ends_at)
            && end <= start
        {
            return Err("The announcement must end after it starts".to_owned());
        }

        Ok(ParsedAnnouncement {
            message: message.to_owned(),
            link_url,
            starts_at,
            ends_at,
        })
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "content/announcements.html")]
pub struct AnnouncementsTemplate {
    pub ctx: PageContext,
    pub announcements: Vec<Announcement>,
    pub now: DateTime<Utc>,
}

impl AnnouncementsTemplate {
    fn is_live(&self, announcement: &Announcement) -> bool {
        announcement.is_live(self.now)
    }
}

/// GET /content/announcements
#[instrument(skip_all)]
async fn announcements(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    ctx: PageContext,
) -> Result<AnnouncementsTemplate> {
    let announcements = ContentRepository::new(state.pool()).announcements().await?;
    Ok(AnnouncementsTemplate {
        ctx,
        announcements,
        now: Utc::now(),
    })
}

/// POST /content/announcements
#[instrument(skip_all)]
async fn create_announcement(
    RequireEditor(admin): RequireEditor,
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<AnnouncementForm>,
) -> Result<Response> {
    let flash = match form.parse() {
        Ok(parsed) => {
            let announcement = ContentRepository::new(state.pool())
                .create_announcement(
                    &parsed.message,
                    parsed.link_url.as_deref(),
                    parsed.starts_at,
                    parsed.ends_at,
                )
                .await?;
            tracing::info!(admin_id = %admin.id, announcement_id = %announcement.id, "Announcement created");
            Flash::success("Announcement published")
        }
        Err(message) => Flash::error(message),
    };

    flash.push(&session).await?;
    Ok(Redirect::to("/content/announcements").into_response())
}

/// POST /content/announcements/{id}/toggle
#[instrument(skip_all, fields(announcement_id = %id))]
async fn toggle_announcement(
    RequireEditor(_admin): RequireEditor,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<AnnouncementId>,
) -> Result<Response> {
    let active = ContentRepository::new(state.pool())
        .toggle_announcement(id)
        .await?;
    let message = if active {
        "Announcement switched on"
    } else {
        "Announcement switched off"
    };
    Flash::success(message).push(&session).await?;
    Ok(Redirect::to("/content/announcements").into_response())
}

/// POST /content/announcements/{id}/delete
#[instrument(skip_all, fields(announcement_id = %id))]
async fn delete_announcement(
    RequireEditor(admin): RequireEditor,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<AnnouncementId>,
) -> Result<Response> {
    ContentRepository::new(state.pool())
        .delete_announcement(id)
        .await?;
    tracing::info!(admin_id = %admin.id, "Announcement deleted");

    Flash::success("Announcement deleted").push(&session).await?;
    Ok(Redirect::to("/content/announcements").into_response())
}

// =============================================================================
// Hero slides
// =============================================================================

/// Editable slide row. Field names in the form are `slide-{index}-{field}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlideFields {
    pub title: String,
    pub subtitle: String,
    pub image_url: String,
    pub cta_label: String,
    pub cta_url: String,
    pub remove: bool,
}

impl SlideFields {
    fn from_slide(slide: &HeroSlide) -> Self {
        Self {
            title: slide.title.clone(),
            subtitle: slide.subtitle.clone().unwrap_or_default(),
            image_url: slide.image_url.clone(),
            cta_label: slide.cta_label.clone().unwrap_or_default(),
            cta_url: slide.cta_url.clone().unwrap_or_default(),
            remove: false,
        }
    }

    fn is_blank(&self) -> bool {
        [
            &self.title,
            &self.subtitle,
            &self.image_url,
            &self.cta_label,
            &self.cta_url,
        ]
        .iter()
        .all(|f| f.trim().is_empty())
    }
}

/// Group `slide-{index}-{field}` pairs into rows, in index order.
fn group_slide_fields(pairs: &[(String, String)]) -> Vec<SlideFields> {
    let mut rows: BTreeMap<usize, SlideFields> = BTreeMap::new();
    for (key, value) in pairs {
        let Some(rest) = key.strip_prefix("slide-") else {
            continue;
        };
        let Some((index, field)) = rest.split_once('-') else {
            continue;
        };
        let Ok(index) = index.parse::<usize>() else {
            continue;
        };
        let row = rows.entry(index).or_default();
        match field {
            "title" => row.title.clone_from(value),
            "subtitle" => row.subtitle.clone_from(value),
            "image_url" => row.image_url.clone_from(value),
            "cta_label" => row.cta_label.clone_from(value),
            "cta_url" => row.cta_url.clone_from(value),
            "remove" => row.remove = true,
            _ => {}
        }
    }
    rows.into_values().collect()
}

/// Turn the submitted rows into the new slide set.
///
/// Blank rows and rows marked for removal are dropped.
///
/// # Errors
///
/// Returns every row problem, keyed `slide-{n}` by 1-based position.
pub fn parse_slides(
    pairs: &[(String, String)],
) -> std::result::Result<Vec<SlideInput>, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let mut slides = Vec::new();

    let rows = group_slide_fields(pairs)
        .into_iter()
        .filter(|r| !r.remove && !r.is_blank());
    for (n, row) in (1..).zip(rows) {
        let title = row.title.trim();
        let image_url = row.image_url.trim();
        let cta_label = optional(&row.cta_label);
        let cta_url = optional(&row.cta_url);

        if title.is_empty() {
            errors.add("slides", format!("Slide {n} needs a title"));
        }
        if image_url.is_empty() || !is_link(image_url) {
            errors.add("slides", format!("Slide {n} needs an image"));
        }
        if cta_label.is_some() != cta_url.is_some() {
            errors.add(
                "slides",
                format!("Slide {n}: give the button both a label and a link"),
            );
        }
        if cta_url.as_deref().is_some_and(|u| !is_link(u)) {
            errors.add(
                "slides",
                format!("Slide {n}: button link must be a site path or web address"),
            );
        }

        slides.push(SlideInput {
            title: title.to_owned(),
            subtitle: optional(&row.subtitle),
            image_url: image_url.to_owned(),
            cta_label,
            cta_url,
        });
    }

    if slides.len() > MAX_SLIDES {
        errors.add("slides", format!("Use at most {MAX_SLIDES} slides"));
    }
    errors.into_result()?;
    Ok(slides)
}

#[derive(Template, WebTemplate)]
#[template(path = "content/hero_slides.html")]
pub struct HeroSlidesTemplate {
    pub ctx: PageContext,
    /// Existing rows plus one blank row for adding a slide.
    pub rows: Vec<SlideFields>,
    pub errors: ValidationErrors,
}

impl HeroSlidesTemplate {
    fn new(ctx: PageContext, mut rows: Vec<SlideFields>, errors: ValidationErrors) -> Self {
        if rows.len() < MAX_SLIDES {
            rows.push(SlideFields::default());
        }
        Self {
            ctx,
            rows,
            errors,
        }
    }
}

/// GET /content/hero-slides
#[instrument(skip_all)]
async fn hero_slides(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    ctx: PageContext,
) -> Result<HeroSlidesTemplate> {
    let slides = ContentRepository::new(state.pool()).hero_slides().await?;
    let rows = slides.iter().map(SlideFields::from_slide).collect();
    Ok(HeroSlidesTemplate::new(ctx, rows, ValidationErrors::new()))
}

/// POST /content/hero-slides
///
/// Saves every slide at once. The old set stays in place unless the whole
/// replacement succeeds.
#[instrument(skip_all)]
async fn save_hero_slides(
    RequireEditor(admin): RequireEditor,
    State(state): State<AppState>,
    session: Session,
    CspNonce(nonce): CspNonce,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Response> {
    match parse_slides(&pairs) {
        Ok(slides) => {
            ContentRepository::new(state.pool())
                .replace_hero_slides(&slides)
                .await?;
            tracing::info!(admin_id = %admin.id, count = slides.len(), "Hero slides saved");

            Flash::success(format!("Saved {} slides", slides.len()))
                .push(&session)
                .await?;
            Ok(Redirect::to("/content/hero-slides").into_response())
        }
        Err(errors) => {
            let rows = group_slide_fields(&pairs)
                .into_iter()
                .filter(|r| !r.remove && !r.is_blank())
                .collect();
            let ctx =
                PageContext::build(&state, Some(&session), nonce, "/content/hero-slides").await;
            Ok(HeroSlidesTemplate::new(ctx, rows, errors).into_response())
        }
    }
}

// =============================================================================
// Pages
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct NewPageQuery {
    pub slug: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body_markdown: String,
    pub is_published: Option<String>,
}

#[derive(Template, WebTemplate)]
#[template(path = "content/pages.html")]
pub struct PagesTemplate {
    pub ctx: PageContext,
    pub pages: Vec<ContentPage>,
}

#[derive(Template, WebTemplate)]
#[template(path = "content/page_form.html")]
pub struct PageFormTemplate {
    pub ctx: PageContext,
    pub slug: String,
    pub form: PageForm,
    pub is_new: bool,
    pub error: Option<String>,
}

/// GET /content/pages
///
/// `?slug=` jumps to the editor for that page, creating it on first save.
#[instrument(skip_all)]
async fn pages(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    ctx: PageContext,
    Query(query): Query<NewPageQuery>,
) -> Result<Response> {
    if let Some(raw) = query.slug.as_deref() {
        let slug = slugify(raw);
        if !slug.is_empty() {
            return Ok(Redirect::to(&format!("/content/pages/{slug}")).into_response());
        }
    }
    let pages = ContentRepository::new(state.pool()).pages().await?;
    Ok(PagesTemplate { ctx, pages }.into_response())
}

/// GET /content/pages/{slug}
#[instrument(skip_all, fields(slug = %slug))]
async fn edit_page(
    RequireEditor(_admin): RequireEditor,
    State(state): State<AppState>,
    ctx: PageContext,
    Path(slug): Path<String>,
) -> Result<PageFormTemplate> {
    if !is_valid_slug(&slug) {
        return Err(AppError::NotFound(format!("page {slug}")));
    }
    let page = ContentRepository::new(state.pool()).page(&slug).await?;
    let is_new = page.is_none();
    let form = page.map_or_else(PageForm::default, |p| PageForm {
        title: p.title,
        body_markdown: p.body_markdown,
        is_published: p.is_published.then(|| "on".to_owned()),
    });

    Ok(PageFormTemplate {
        ctx,
        slug,
        form,
        is_new,
        error: None,
    })
}

/// POST /content/pages/{slug}
#[instrument(skip_all, fields(slug = %slug))]
async fn save_page(
    RequireEditor(admin): RequireEditor,
    State(state): State<AppState>,
    session: Session,
    CspNonce(nonce): CspNonce,
    Path(slug): Path<String>,
    Form(form): Form<PageForm>,
) -> Result<Response> {
    if !is_valid_slug(&slug) {
        return Err(AppError::NotFound(format!("page {slug}")));
    }
    let title = form.title.trim();
    if title.is_empty() {
        let path = format!("/content/pages/{slug}");
        let ctx = PageContext::build(&state, Some(&session), nonce, &path).await;
        return Ok(PageFormTemplate {
            ctx,
            slug,
            form,
            is_new: false,
            error: Some("Title is required".to_owned()),
        }
        .into_response());
    }

    let page = ContentRepository::new(state.pool())
        .save_page(
            &slug,
            title,
            &form.body_markdown,
            form.is_published.is_some(),
        )
        .await?;
    tracing::info!(admin_id = %admin.id, published = page.is_published, "Page saved");

    Flash::success(format!("Saved {}", page.title))
        .push(&session)
        .await?;
    Ok(Redirect::to(&format!("/content/pages/{slug}")).into_response())
}

/// Build the content router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/content/announcements",
            get(announcements).post(create_announcement),
        )
        .route(
            "/content/announcements/{id}/toggle",
            post(toggle_announcement),
        )
        .route(
            "/content/announcements/{id}/delete",
            post(delete_announcement),
        )
        .route(
            "/content/hero-slides",
            get(hero_slides).post(save_hero_slides),
        )
        .route("/content/pages", get(pages))
        .route("/content/pages/{slug}", get(edit_page).post(save_page))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn test_announcement_dates() {
        let form = AnnouncementForm {
            message: "Closed Monday for the holiday".to_owned(),
            link_url: String::new(),
            starts_at: "2026-12-24T09:00".to_owned(),
            ends_at: "2026-12-26T18:00".to_owned(),
        };
        let parsed = form.parse().unwrap();
        assert_eq!(
            parsed.starts_at.unwrap().to_rfc3339(),
            "2026-12-24T09:00:00+00:00"
        );

        let backwards = AnnouncementForm {
            ends_at: "2026-12-20T18:00".to_owned(),
            ..form
        };
        assert!(backwards.parse().is_err());
    }

    #[test]
    fn test_announcement_rejects_script_links() {
        let form = AnnouncementForm {
            message: "Hi".to_owned(),
            link_url: "javascript:alert(1)".to_owned(),
            ..AnnouncementForm::default()
        };
        assert!(form.parse().is_err());
    }

    #[test]
    fn test_slides_keep_index_order_and_drop_blank_rows() {
        let submitted = pairs(&[
            ("slide-1-title", "Autumn loaves"),
            ("slide-1-image_url", "https://i.ibb.co/b.jpg"),
            ("slide-0-title", "Wedding cakes"),
            ("slide-0-image_url", "https://i.ibb.co/a.jpg"),
            ("slide-0-cta_label", "Enquire"),
            ("slide-0-cta_url", "/custom-cake"),
            ("slide-2-title", ""),
            ("slide-2-image_url", ""),
        ]);
        let slides = parse_slides(&submitted).unwrap();
        assert_eq!(slides.len(), 2);
        assert_eq!(slides[0].title, "Wedding cakes");
        assert_eq!(slides[0].cta_url.as_deref(), Some("/custom-cake"));
        assert_eq!(slides[1].title, "Autumn loaves");
        assert_eq!(slides[1].cta_label, None);
    }

    #[test]
    fn test_removed_slides_are_dropped() {
        let submitted = pairs(&[
            ("slide-0-title", "Old"),
            ("slide-0-image_url", "https://i.ibb.co/a.jpg"),
            ("slide-0-remove", "on"),
        ]);
        assert!(parse_slides(&submitted).unwrap().is_empty());
    }

    #[test]
    fn test_slide_errors() {
        let submitted = pairs(&[
            ("slide-0-title", "No image"),
            ("slide-0-cta_label", "Shop"),
        ]);
        let errors = parse_slides(&submitted).unwrap_err();
        assert!(errors.has("slides"));
        assert!(errors.len() >= 2);
    }
}
