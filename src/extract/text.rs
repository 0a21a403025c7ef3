// src/extract/text.rs
// Plain-text uploads: lossy UTF-8 decode plus the character budget

use super::{ExtractionOutcome, limit};

/// Warning for a text upload that decodes to nothing but whitespace
pub const NO_READABLE_TEXT: &str = "file contains no readable text";

/// Decode `bytes` as UTF-8, replacing invalid sequences, then apply the budget
pub fn decode_text(bytes: &[u8], filename: &str, max_chars: usize) -> ExtractionOutcome {
    let decoded = String::from_utf8_lossy(bytes);
    // Replacement characters alone are not readable content
    if decoded
        .chars()
        .all(|c| c.is_whitespace() || c == char::REPLACEMENT_CHARACTER)
    {
        return ExtractionOutcome::failed(NO_READABLE_TEXT);
    }

    let limited = limit(&decoded, max_chars);
    let outcome = ExtractionOutcome::extracted(limited.text);
    if limited.truncated {
        outcome.with_truncation(filename, max_chars)
    } else {
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_utf8_passes_through() {
        let outcome = decode_text("status of ticket 42?".as_bytes(), "a.txt", 100);
        assert_eq!(outcome.text.as_deref(), Some("status of ticket 42?"));
        assert_eq!(outcome.warning, None);
        assert!(!outcome.truncated);
    }

    #[test]
    fn test_invalid_bytes_are_tolerated() {
        let bytes = [b'o', b'k', 0xFF, 0xFE, b'!'];
        let outcome = decode_text(&bytes, "a.txt", 100);
        let text = outcome.text.unwrap();
        assert!(text.starts_with("ok"));
        assert!(text.ends_with('!'));
    }

    #[test]
    fn test_long_text_is_truncated_with_warning() {
        let body = "y".repeat(50);
        let outcome = decode_text(body.as_bytes(), "long.txt", 10);
        assert_eq!(
            outcome.text.as_deref(),
            Some("yyyyyyyyyy[...truncated at 10 chars]")
        );
        assert!(outcome.truncated);
        assert_eq!(
            outcome.warning.as_deref(),
            Some("file \"long.txt\" truncated at 10 characters")
        );
    }

    #[test]
    fn test_whitespace_only_is_unreadable() {
        let outcome = decode_text(b" \n\t ", "blank.txt", 100);
        assert_eq!(outcome.text, None);
        assert_eq!(outcome.warning.as_deref(), Some(NO_READABLE_TEXT));
    }

    #[test]
    fn test_garbage_only_is_unreadable() {
        let outcome = decode_text(&[0xFF, 0xFE, 0xFD], "bin.txt", 100);
        assert_eq!(outcome.text, None);
    }
}
