//! Built-in string formats. Empty strings are never checked here; presence
//! is the `required` constraint's job.

use regex::Regex;
use std::sync::LazyLock;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+\-]+@[a-zA-Z0-9.\-]+\.[a-zA-Z]{2,}$").expect("valid regex")
});

static URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://[^\s/$.?#].[^\s]*$").expect("valid regex"));

static PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\d\s+\-().]+$").expect("valid regex"));

static SLUG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("valid regex"));

pub fn is_email(value: &str) -> bool {
    EMAIL.is_match(value)
}

pub fn is_url(value: &str) -> bool {
    URL.is_match(value)
}

pub fn is_phone(value: &str) -> bool {
    PHONE.is_match(value)
}

pub fn is_slug(value: &str) -> bool {
    SLUG.is_match(value)
}

/// Hyphenated form only: 36 characters, hyphens at 8, 13, 18 and 23.
pub fn is_uuid(value: &str) -> bool {
    value.len() == 36
        && value.bytes().enumerate().all(|(i, b)| match i {
            8 | 13 | 18 | 23 => b == b'-',
            _ => b.is_ascii_hexdigit(),
        })
}

/// 26 characters of Crockford base32 that decode to a 128-bit value.
pub fn is_ulid(value: &str) -> bool {
    value.len() == 26 && ulid::Ulid::from_string(value).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email() {
        assert!(is_email("ada@example.com"));
        assert!(is_email("first.last+tag@sub.example.org"));
        assert!(!is_email("ada@example"));
        assert!(!is_email("ada example.com"));
    }

    #[test]
    fn url() {
        assert!(is_url("https://example.com/path?q=1"));
        assert!(is_url("http://localhost:8080"));
        assert!(!is_url("ftp://example.com"));
        assert!(!is_url("https://"));
    }

    #[test]
    fn phone() {
        assert!(is_phone("+1 (555) 123-4567"));
        assert!(!is_phone("call me"));
    }

    #[test]
    fn slug() {
        assert!(is_slug("hello-world-2"));
        assert!(!is_slug("Hello-World"));
        assert!(!is_slug("trailing-"));
    }

    #[test]
    fn uuid() {
        assert!(is_uuid("67e55044-10b1-426f-9247-bb680e5fe0c8"));
        assert!(!is_uuid("67e5504410b1426f9247bb680e5fe0c8"));
        assert!(!is_uuid("67e55044-10b1-426f-9247-bb680e5fe0cz"));
    }

    #[test]
    fn ulid() {
        assert!(is_ulid("01ARZ3NDEKTSV4RRFFQ69G5FAV"));
        assert!(is_ulid(&::ulid::Ulid::new().to_string()));
        assert!(!is_ulid("01ARZ3NDEKTSV4RRFFQ69G5FA"));
        assert!(!is_ulid("01ARZ3NDEKTSV4RRFFQ69G5FAU"));
    }
}
