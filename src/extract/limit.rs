// src/extract/limit.rs
// Character-budget enforcement for text sent to the classifier

/// Text after applying a character budget
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limited {
    pub text: String,
    pub truncated: bool,
}

/// Marker appended to text cut at `max_chars`
pub fn truncation_marker(max_chars: usize) -> String {
    format!("[...truncated at {max_chars} chars]")
}

/// Cap `text` at `max_chars` Unicode scalar values.
///
/// Text within budget is returned unchanged. Longer text keeps its first
/// `max_chars` characters followed by [`truncation_marker`]. Not idempotent:
/// apply once per text.
pub fn limit(text: &str, max_chars: usize) -> Limited {
    match text.char_indices().nth(max_chars) {
        None => Limited {
            text: text.to_string(),
            truncated: false,
        },
        Some((cut, _)) => {
            let mut out = String::with_capacity(cut + 32);
            out.push_str(&text[..cut]);
            out.push_str(&truncation_marker(max_chars));
            Limited {
                text: out,
                truncated: true,
            }
        }
    }
}
