// src/extract/mod.rs
// Text extraction from uploads: PDF page walk and lossy plain-text decode

pub mod limit;
pub mod pdf;
pub mod text;

pub use limit::{Limited, limit, truncation_marker};
pub use pdf::{PageReader, Pages, PdfExtractPages, PdfTextExtractor};

/// Warning used when an upload yields no text and no more specific cause is known
pub const UNSUPPORTED_FORMAT: &str = "unsupported format";

/// Result of pulling text out of an upload.
///
/// `text` is `None` when nothing usable came out (the caller falls back).
/// `warning` is a non-fatal note; it may accompany text (truncation) or
/// explain the missing text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionOutcome {
    pub text: Option<String>,
    pub warning: Option<String>,
    pub truncated: bool,
}

impl ExtractionOutcome {
    pub fn extracted(text: String) -> Self {
        Self {
            text: Some(text),
            warning: None,
            truncated: false,
        }
    }

    pub fn failed(warning: impl Into<String>) -> Self {
        Self {
            text: None,
            warning: Some(warning.into()),
            truncated: false,
        }
    }

    /// Mark as cut at the budget, recording a warning that names the file
    pub fn with_truncation(mut self, filename: &str, max_chars: usize) -> Self {
        self.truncated = true;
        self.warning = Some(truncation_warning(filename, max_chars));
        self
    }
}

/// Warning attached to a file whose text was cut at the budget
pub fn truncation_warning(filename: &str, max_chars: usize) -> String {
    format!("file \"{filename}\" truncated at {max_chars} characters")
}

/// How an upload is read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Text,
}

impl DocumentKind {
    /// PDF if either the extension or the declared MIME type says so
    pub fn detect(filename: &str, mime: &str) -> Self {
        let is_pdf_ext = filename.to_ascii_lowercase().ends_with(".pdf");
        let is_pdf_mime = crate::upload::essence(mime) == "application/pdf";
        if is_pdf_ext || is_pdf_mime {
            DocumentKind::Pdf
        } else {
            DocumentKind::Text
        }
    }
}
