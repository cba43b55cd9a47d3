//! Validation primitives shared by the form rules.

use once_cell::sync::Lazy;
use regex::Regex;

// Same shape the portal has always accepted: local@domain.tld, case-insensitive
pub static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}$").expect("Failed to compile email regex")
});

/// Empty or whitespace only.
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

/// Length is counted in characters, not bytes.
pub fn meets_min_length(value: &str, min: usize) -> bool {
    value.chars().count() >= min
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_emails() {
        let valid_cases = vec![
            "patient@healthcard.com",
            "Dr.Ana+work@clinic.example.org",
            "ADMIN@HEALTHCARD.COM",
        ];

        for email in valid_cases {
            assert!(is_valid_email(email), "Valid email {} was rejected !", email);
        }
    }

    #[test]
    fn test_invalid_emails() {
        let invalid_cases = vec![
            "",
            "patient",
            "patient@",
            "@healthcard.com",
            "patient@healthcard",
            "patient@healthcard.c",
            "pat ient@healthcard.com",
        ];

        for email in invalid_cases {
            assert!(!is_valid_email(email), "Invalid email {} was accepted !", email);
        }
    }

    #[test]
    fn test_blank() {
        assert!(is_blank(""));
        assert!(is_blank("  \t"));
        assert!(!is_blank(" x "));
    }

    #[test]
    fn test_min_length_counts_chars() {
        assert!(meets_min_length("secret", 6));
        assert!(!meets_min_length("short", 6));
        assert!(meets_min_length("éééééé", 6), "Multi-byte characters were miscounted");
    }
}
