//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// First `max_chars` characters of a long text, cut at a word boundary.
///
/// Usage in templates: `{{ request.design_description|excerpt(80) }}`
#[askama::filter_fn]
pub fn excerpt(
    value: impl Display,
    _env: &dyn askama::Values,
    max_chars: usize,
) -> askama::Result<String> {
    Ok(shorten(&value.to_string(), max_chars))
}

fn shorten(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= max_chars {
        return text.to_owned();
    }
    let cut: String = text.chars().take(max_chars).collect();
    let cut = cut
        .rfind(char::is_whitespace)
        .filter(|&i| i > 0)
        .and_then(|i| cut.get(..i))
        .unwrap_or(&cut);
    format!("{}…", cut.trim_end_matches(|c: char| c.is_whitespace() || c == ','))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shorten() {
        assert_eq!(shorten("  Two tiers  ", 20), "Two tiers");
        assert_eq!(
            shorten("Three tiers, lemon sponge and fresh flowers", 20),
            "Three tiers, lemon…"
        );
        assert_eq!(shorten("Chocolatefudgecakewithganache", 9), "Chocolate…");
    }
}
