//! URL slugs for products, categories and pages.

/// Lowercase ASCII letters and digits joined by single hyphens.
///
/// Anything else is a separator, so `"Rye & Caraway Loaf"` becomes
/// `"rye-caraway-loaf"`. Returns an empty string when nothing usable remains.
#[must_use]
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_hyphen = false;

    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

/// Whether `slug` is already in canonical form.
#[must_use]
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty() && slugify(slug) == slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Rye & Caraway Loaf"), "rye-caraway-loaf");
        assert_eq!(slugify("  Pain au Chocolat!! "), "pain-au-chocolat");
        assert_eq!(slugify("Crème brûlée"), "cr-me-br-l-e");
        assert_eq!(slugify("---"), "");
    }

    #[test]
    fn test_is_valid_slug() {
        assert!(is_valid_slug("about"));
        assert!(is_valid_slug("gluten-free-2"));
        assert!(!is_valid_slug("About"));
        assert!(!is_valid_slug("a--b"));
        assert!(!is_valid_slug(""));
    }
}
