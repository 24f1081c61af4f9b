//! ISBN-10 / ISBN-13 check digit validation

use once_cell::sync::Lazy;
use regex::Regex;

static PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^ISBN(?:-1[03])?:?\s*").expect("valid ISBN prefix regex"));

static CANONICAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:\d{13}|\d{9}[\dX])$").expect("valid ISBN regex"));

/// Strip the optional `ISBN`, `ISBN-10` or `ISBN-13` prefix and every
/// separator, leaving the bare token
pub fn normalize_isbn(subject: &str) -> String {
    PREFIX
        .replace(subject.trim(), "")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

/// Compute the expected check character for the leading digits
/// (9 digits for ISBN-10, 12 for ISBN-13)
fn check_char(digits: &[u32]) -> char {
    if digits.len() == 9 {
        let sum: u32 = digits
            .iter()
            .rev()
            .enumerate()
            .map(|(i, d)| (i as u32 + 2) * d)
            .sum();
        match 11 - (sum % 11) {
            10 => 'X',
            11 => '0',
            check => char::from_digit(check, 10).unwrap_or('?'),
        }
    } else {
        let sum: u32 = digits
            .iter()
            .enumerate()
            .map(|(i, d)| (1 + 2 * (i as u32 % 2)) * d)
            .sum();
        match 10 - (sum % 10) {
            10 => '0',
            check => char::from_digit(check, 10).unwrap_or('?'),
        }
    }
}

/// True iff `subject` is a well-formed ISBN-10 or ISBN-13 whose last
/// character equals the computed check digit. Never panics.
pub fn is_valid_isbn(subject: &str) -> bool {
    let token = normalize_isbn(subject);
    if !CANONICAL.is_match(&token) {
        return false;
    }

    let mut chars: Vec<char> = token.chars().collect();
    let Some(last) = chars.pop() else {
        return false;
    };
    let digits: Option<Vec<u32>> = chars.iter().map(|c| c.to_digit(10)).collect();

    match digits {
        Some(digits) => check_char(&digits) == last,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_isbn13_valid() {
        assert!(is_valid_isbn("9783897225831"));
        assert!(is_valid_isbn("9783827315526"));
        assert!(is_valid_isbn("9780201633610"));
        assert!(is_valid_isbn("978-3-89722-583-1"));
        assert!(is_valid_isbn("ISBN-13: 978-0-201-63361-0"));
    }

    #[test]
    fn test_isbn13_flipped_digit() {
        assert!(!is_valid_isbn("9783897225832"));
        assert!(!is_valid_isbn("9780201633612"));
    }

    #[test]
    fn test_isbn10_valid() {
        assert!(is_valid_isbn("0201633612"));
        assert!(is_valid_isbn("0-306-40615-2"));
        assert!(is_valid_isbn("ISBN 316148410X"));
        assert!(is_valid_isbn("ISBN-10: 080442957X"));
    }

    #[test]
    fn test_isbn10_invalid() {
        assert!(!is_valid_isbn("0201633613"));
        assert!(!is_valid_isbn("3161484100"));
        // lower-case check character is not canonical
        assert!(!is_valid_isbn("316148410x"));
    }

    #[test]
    fn test_wrong_length() {
        assert!(!is_valid_isbn("020163361"));
        assert!(!is_valid_isbn("978038753406"));
        assert!(!is_valid_isbn("97838972258311"));
    }

    #[test]
    fn test_malformed_input() {
        assert!(!is_valid_isbn(""));
        assert!(!is_valid_isbn("ISBN"));
        assert!(!is_valid_isbn("abcdefghij"));
        assert!(!is_valid_isbn("X201633612"));
        assert!(!is_valid_isbn("\u{1F4DA}"));
    }

    #[test]
    fn test_normalize_isbn() {
        assert_eq!(normalize_isbn("978-3-89722-583-1"), "9783897225831");
        assert_eq!(normalize_isbn("ISBN-10: 0 201 63361 2"), "0201633612");
    }
}
