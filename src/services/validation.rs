//! Domain format checks run before anything touches storage.

use once_cell::sync::Lazy;
use regex::Regex;

/// Script-aware author format: an optional bracketed CJK nationality
/// prefix, then Han or Latin characters, spaces, and middle dots.
static AUTHOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:\[\p{Han}+\]\s+)?[\p{Han}\p{Latin}\s·]+$").expect("author regex")
});

static PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^1[345789]\d{9}$").expect("phone regex"));

/// Validate an ISBN-10 or ISBN-13 checksum. Separators (dashes and
/// spaces) are ignored.
pub fn is_valid_isbn(isbn: &str) -> bool {
    let compact: String = isbn.chars().filter(|c| *c != '-' && *c != ' ').collect();
    match compact.len() {
        10 => is_valid_isbn10(&compact),
        13 => is_valid_isbn13(&compact),
        _ => false,
    }
}

/// Mod-11 weighted checksum; 'X' in the final position counts as 10.
fn is_valid_isbn10(isbn: &str) -> bool {
    let mut sum = 0u32;
    for (i, c) in isbn.chars().enumerate() {
        let digit = if i == 9 && c == 'X' {
            10
        } else {
            match c.to_digit(10) {
                Some(d) => d,
                None => return false,
            }
        };
        sum += digit * (10 - i as u32);
    }
    sum % 11 == 0
}

/// Mod-10 checksum with alternating 1/3 weights.
fn is_valid_isbn13(isbn: &str) -> bool {
    let mut sum = 0u32;
    for (i, c) in isbn.chars().enumerate() {
        let digit = match c.to_digit(10) {
            Some(d) => d,
            None => return false,
        };
        sum += if i % 2 == 0 { digit } else { digit * 3 };
    }
    sum % 10 == 0
}

pub fn is_valid_author(author: &str) -> bool {
    AUTHOR_RE.is_match(author)
}

pub fn is_valid_phone(phone: &str) -> bool {
    PHONE_RE.is_match(phone)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn isbn10_checksum() {
        assert!(is_valid_isbn("0306406152"));
        assert!(is_valid_isbn("0-306-40615-2"));
        // 'X' check digit is worth 10
        assert!(is_valid_isbn("097522980X"));
        assert!(!is_valid_isbn("0306406153"));
        assert!(!is_valid_isbn("030640615X"));
    }

    #[test]
    fn isbn13_checksum() {
        assert!(is_valid_isbn("9780134685991"));
        assert!(is_valid_isbn("978-0-13-468599-1"));
        assert!(!is_valid_isbn("9780134685990"));
    }

    #[test]
    fn isbn_rejects_wrong_lengths_and_garbage() {
        assert!(!is_valid_isbn(""));
        assert!(!is_valid_isbn("12345"));
        assert!(!is_valid_isbn("abcdefghij"));
        assert!(!is_valid_isbn("97801346859911"));
    }

    #[test]
    fn author_formats() {
        assert!(is_valid_author("Robert C Martin"));
        assert!(is_valid_author("鲁迅"));
        assert!(is_valid_author("[美] 唐纳德·克努特"));
        assert!(is_valid_author("安托万·德·圣-埃克苏佩里".replace('-', "·").as_str()));
        assert!(!is_valid_author("author_42"));
        assert!(!is_valid_author(""));
    }

    #[test]
    fn phone_formats() {
        assert!(is_valid_phone("13812345678"));
        assert!(is_valid_phone("19912345678"));
        assert!(!is_valid_phone("12012345678"));
        assert!(!is_valid_phone("2381234567"));
        assert!(!is_valid_phone("138123456789"));
    }
}
