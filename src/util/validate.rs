// Input validation for contact and signup forms.

use std::sync::LazyLock;

use regex::Regex;

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"));

// Kenyan mobile numbers: +2547XXXXXXXX, 07XXXXXXXX, and the 1-prefixed ranges.
static PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\+254|0)[17]\d{8}$").expect("valid phone pattern"));

pub fn is_valid_email(email: &str) -> bool {
    EMAIL.is_match(email)
}

pub fn is_valid_phone(phone: &str) -> bool {
    PHONE.is_match(phone)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email() {
        assert!(is_valid_email("kesnnur@gmail.com"));
        assert!(is_valid_email("a.b+c@chapter.ac.ke"));
        assert!(!is_valid_email("no-at-sign.com"));
        assert!(!is_valid_email("two words@example.com"));
        assert!(!is_valid_email("user@nodot"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn test_phone() {
        assert!(is_valid_phone("+254791296924"));
        assert!(is_valid_phone("0712345678"));
        assert!(is_valid_phone("0110345678"));
        assert!(!is_valid_phone("0812345678"));
        assert!(!is_valid_phone("+25479129692"));
        assert!(!is_valid_phone("254791296924"));
        assert!(!is_valid_phone("07123456789"));
    }
}
