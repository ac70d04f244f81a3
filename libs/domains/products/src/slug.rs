//! URL slugs derived from product names.

/// Lowercase alphanumerics, collapse whitespace/`-`/`_` runs into one `-`,
/// drop everything else.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;

    for c in name.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(c.to_lowercase());
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
    fn test_slugify_simple() {
        assert_eq!(slugify("Widget"), "widget");
        assert_eq!(slugify("Super Widget"), "super-widget");
        assert_eq!(slugify("Rook Ceph"), "rook-ceph");
    }

    #[test]
    fn test_slugify_collapses_separators() {
        assert_eq!(slugify("  Hello,  World! "), "hello-world");
        assert_eq!(slugify("a - b__c"), "a-b-c");
        assert_eq!(slugify("--edge--"), "edge");
    }

    #[test]
    fn test_slugify_drops_punctuation() {
        assert_eq!(slugify("Widget's Best"), "widgets-best");
        assert_eq!(slugify("50% off!"), "50-off");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_slugify_unicode() {
        assert_eq!(slugify("Crème Brûlée"), "crème-brûlée");
    }
}
