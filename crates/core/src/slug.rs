//! URL slugs for catalog items.

/// Turn a title into a URL slug.
///
/// Keeps ASCII letters and digits (lowercased), collapses every run of
/// whitespace, hyphens and underscores into a single `-`, and drops anything
/// else. Leading and trailing hyphens are trimmed.
///
/// ```
/// use wardrobe_core::slug::slugify;
///
/// assert_eq!(slugify("Linen Shirt (Blue)"), "linen-shirt-blue");
/// ```
#[must_use]
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;

    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else if c.is_whitespace() || c == '-' || c == '_' {
            pending_dash = true;
        }
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Summer Dress"), "summer-dress");
        assert_eq!(slugify("  Wool -- Coat__2026 "), "wool-coat-2026");
        assert_eq!(slugify("Tee's & Tops!"), "tees-tops");
        assert_eq!(slugify("Café Noir"), "caf-noir");
        assert_eq!(slugify("---"), "");
    }
}
