pub mod ip;
pub mod password;
pub mod url_validator;

/// Slugs: 3-50 chars of `[A-Za-z0-9_-]`, matched case-sensitively.
pub fn is_valid_slug(slug: &str) -> bool {
    (3..=50).contains(&slug.len())
        && slug
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

/// Application path names that can never be claimed as slugs.
///
/// Checked at creation time only; the resolver itself has no notion of
/// reserved words.
pub const RESERVED_SLUGS: &[&str] = &[
    "auth",
    "dashboard",
    "profile",
    "settings",
    "privacy",
    "terms",
    "sitemap",
    "accessibility",
    "cookies",
    "about",
    "contact",
    "blog",
    "careers",
    "help",
    "status",
    "docs",
    "api",
    "admin",
    "health",
];

pub fn is_reserved_slug(slug: &str) -> bool {
    let lowered = slug.to_lowercase();
    RESERVED_SLUGS.contains(&lowered.as_str())
}

/// Generate a random alphanumeric slug of the given length.
pub fn generate_slug(length: usize) -> String {
    use std::iter;

    let chars = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

    iter::repeat_with(|| chars[rand::random_range(0..chars.len())] as char)
        .take(length)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_slug() {
        assert!(is_valid_slug("abc123"));
        assert!(is_valid_slug("my-link_1"));
        assert!(is_valid_slug("abc"));
        assert!(!is_valid_slug("ab"));
        assert!(!is_valid_slug(&"a".repeat(51)));
        assert!(!is_valid_slug("has space"));
        assert!(!is_valid_slug("emoji🙂"));
        assert!(!is_valid_slug("slash/part"));
        assert!(!is_valid_slug(""));
    }

    #[test]
    fn test_is_reserved_slug() {
        assert!(is_reserved_slug("admin"));
        assert!(is_reserved_slug("Dashboard"));
        assert!(is_reserved_slug("API"));
        assert!(!is_reserved_slug("admin2"));
        assert!(!is_reserved_slug("abc123"));
    }

    #[test]
    fn test_generate_slug() {
        let slug = generate_slug(6);
        assert_eq!(slug.len(), 6);
        assert!(is_valid_slug(&slug));

        // collisions over a handful of draws would indicate a broken RNG
        let other = generate_slug(16);
        assert_ne!(generate_slug(16), other);
    }
}
