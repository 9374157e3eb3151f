//! Markdown rendering for CMS pages.
//!
//! Pages are edited in the back office and stored as markdown. Raw HTML in the
//! source is escaped, so a page body can never inject markup or scripts.

use comrak::{Options, markdown_to_html};

use hearth_core::models::ContentPage;

/// A published page ready for the template.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub slug: String,
    pub title: String,
    pub content_html: String,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<ContentPage> for RenderedPage {
    fn from(page: ContentPage) -> Self {
        Self {
            content_html: render_markdown(&page.body_markdown),
            slug: page.slug,
            title: page.title,
            updated_at: page.updated_at,
        }
    }
}

/// Render GitHub-flavoured markdown with raw HTML escaped.
#[must_use]
pub fn render_markdown(source: &str) -> String {
    let mut options = Options::default();
    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options.extension.header_ids = Some(String::new());
    options.render.escape = true;

    markdown_to_html(source, &options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renders_gfm() {
        let html = render_markdown("## Hours\n\n| Day | Open |\n|-----|------|\n| Mon | 8am |\n");
        assert!(html.contains("<h2"));
        assert!(html.contains("<table>"));
    }

    #[test]
    fn test_raw_html_is_escaped() {
        let html = render_markdown("<script>alert(1)</script>");
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }
}
