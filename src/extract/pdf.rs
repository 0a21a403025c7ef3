// src/extract/pdf.rs
// PDF text extraction with a per-document character budget

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, warn};

use super::ExtractionOutcome;
use crate::error::{Result, TriageError};

/// Warning returned when no page carries extractable text
pub const SCANNED_PDF_WARNING: &str = "could not extract text; PDF may be a scanned image";

/// Pages of an opened PDF, in document order. Text is extracted as each item is pulled.
pub type Pages<'a> = Box<dyn Iterator<Item = Result<String>> + 'a>;

/// Opens a PDF and hands out its pages lazily
pub trait PageReader: Send + Sync {
    fn pages<'a>(&self, pdf_bytes: &'a [u8]) -> Result<Pages<'a>>;
}

/// Page reader backed by lopdf for parsing and pdf-extract for page text
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfExtractPages;

impl PageReader for PdfExtractPages {
    fn pages<'a>(&self, pdf_bytes: &'a [u8]) -> Result<Pages<'a>> {
        let mut doc = lopdf::Document::load_mem(pdf_bytes)
            .map_err(|e| TriageError::MalformedDocument(e.to_string()))?;
        if doc.is_encrypted() {
            doc.decrypt("")
                .map_err(|e| TriageError::MalformedDocument(e.to_string()))?;
        }

        let numbers: Vec<u32> = doc.get_pages().keys().copied().collect();
        Ok(Box::new(numbers.into_iter().map(move |number| {
            let mut text = String::new();
            {
                let mut output = pdf_extract::PlainTextOutput::new(&mut text);
                pdf_extract::output_doc_page(&doc, &mut output, number).map_err(|e| {
                    TriageError::MalformedDocument(format!("page {number}: {e}"))
                })?;
            }
            Ok(text)
        })))
    }
}

/// Flags the blocking page walk to stop once the awaiting request is gone
struct CancelOnDrop(Arc<AtomicBool>);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.store(true, Ordering::Relaxed);
    }
}

/// Ends the page sequence early once cancelled
struct UntilCancelled<'a> {
    pages: Pages<'a>,
    cancelled: &'a AtomicBool,
}

impl Iterator for UntilCancelled<'_> {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cancelled.load(Ordering::Relaxed) {
            None
        } else {
            self.pages.next()
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.pages.size_hint().1)
    }
}

/// Walks PDF pages accumulating text up to a character budget
#[derive(Clone)]
pub struct PdfTextExtractor {
    reader: Arc<dyn PageReader>,
}

impl Default for PdfTextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfTextExtractor {
    pub fn new() -> Self {
        Self::with_reader(Arc::new(PdfExtractPages))
    }

    pub fn with_reader(reader: Arc<dyn PageReader>) -> Self {
        Self { reader }
    }

    /// Extract up to `max_chars` characters from `pdf_bytes`.
    ///
    /// Parsing runs on the blocking pool and pulls pages only while budget
    /// is left. If this future is dropped, the walk stops before the next
    /// page. A malformed document (or a parser panic) yields no text and an
    /// `error reading PDF` warning.
    pub async fn extract(
        &self,
        pdf_bytes: Vec<u8>,
        filename: &str,
        max_chars: usize,
    ) -> ExtractionOutcome {
        let reader = Arc::clone(&self.reader);
        let cancelled = Arc::new(AtomicBool::new(false));
        let _guard = CancelOnDrop(Arc::clone(&cancelled));
        let name = filename.to_string();

        let parsed = tokio::task::spawn_blocking(move || {
            let pages = UntilCancelled {
                pages: reader.pages(&pdf_bytes)?,
                cancelled: &cancelled,
            };
            accumulate_pages(pages, &name, max_chars)
        })
        .await;

        match parsed {
            Ok(Ok(outcome)) => {
                debug!(filename, truncated = outcome.truncated, "PDF parsed");
                outcome
            }
            Ok(Err(e)) => {
                warn!(filename, error = %e, "PDF parse failed");
                ExtractionOutcome::failed(format!("error reading PDF: {}", cause_of(&e)))
            }
            Err(join_err) => {
                warn!(filename, error = %join_err, "PDF parser aborted");
                let cause = if join_err.is_panic() {
                    "parser panicked".to_string()
                } else {
                    join_err.to_string()
                };
                ExtractionOutcome::failed(format!("error reading PDF: {cause}"))
            }
        }
    }
}

fn cause_of(err: &TriageError) -> String {
    match err {
        TriageError::MalformedDocument(cause) => cause.clone(),
        other => other.to_string(),
    }
}

/// Accumulate page text in order until `max_chars` is spent.
///
/// Pages are pulled one at a time and never after the budget is gone,
/// except for a single lookahead page when the budget ends exactly on a
/// page boundary. Whitespace-only pages are skipped without consuming
/// budget. The page that overflows contributes only the prefix that fits.
/// When text had to be dropped, a marker naming the file is appended and
/// the outcome is flagged as truncated.
pub fn accumulate_pages<I>(pages: I, filename: &str, max_chars: usize) -> Result<ExtractionOutcome>
where
    I: IntoIterator<Item = Result<String>>,
{
    let mut pages = pages.into_iter();
    let mut remaining = max_chars;
    let mut content = String::new();
    let mut cut = false;

    while remaining > 0 {
        let Some(page) = pages.next() else {
            break;
        };
        let page = page?;
        if page.trim().is_empty() {
            continue;
        }

        let page_chars = page.chars().count();
        if page_chars > remaining {
            content.extend(page.chars().take(remaining));
            cut = true;
            break;
        }
        content.push_str(&page);
        remaining -= page_chars;
    }

    if remaining == 0 && !cut {
        // Budget ended on a page boundary: anything readable after it was dropped
        cut = match pages.next() {
            None => false,
            Some(next) => !next?.trim().is_empty() || pages.size_hint().1 != Some(0),
        };
    }

    let content = content.trim();
    if content.is_empty() {
        return Ok(ExtractionOutcome::failed(SCANNED_PDF_WARNING));
    }

    if cut {
        let text = format!("{content}[...File \"{filename}\" truncated at {max_chars} characters]");
        return Ok(ExtractionOutcome::extracted(text).with_truncation(filename, max_chars));
    }

    Ok(ExtractionOutcome::extracted(content.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::AtomicUsize;

    fn pages(texts: &[&str]) -> Vec<Result<String>> {
        texts.iter().map(|s| Ok(s.to_string())).collect()
    }

    fn walk(texts: &[&str], filename: &str, max_chars: usize) -> ExtractionOutcome {
        accumulate_pages(pages(texts), filename, max_chars).unwrap()
    }

    /// Page reader returning canned pages and counting how many were pulled
    struct CannedPages {
        texts: Vec<String>,
        pulled: Arc<AtomicUsize>,
    }

    impl CannedPages {
        fn new(texts: &[&str]) -> Self {
            Self {
                texts: texts.iter().map(|s| s.to_string()).collect(),
                pulled: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    impl PageReader for CannedPages {
        fn pages<'a>(&self, _pdf_bytes: &'a [u8]) -> Result<Pages<'a>> {
            let pulled = Arc::clone(&self.pulled);
            Ok(Box::new(self.texts.clone().into_iter().map(move |text| {
                pulled.fetch_add(1, Ordering::SeqCst);
                Ok(text)
            })))
        }
    }

    struct PanickingReader;

    impl PageReader for PanickingReader {
        fn pages<'a>(&self, _pdf_bytes: &'a [u8]) -> Result<Pages<'a>> {
            panic!("bad xref table");
        }
    }

    /// Second page fails to decode
    struct BrokenSecondPage;

    impl PageReader for BrokenSecondPage {
        fn pages<'a>(&self, _pdf_bytes: &'a [u8]) -> Result<Pages<'a>> {
            Ok(Box::new(
                vec![
                    Ok("first".to_string()),
                    Err(TriageError::MalformedDocument("page 2: bad stream".into())),
                ]
                .into_iter(),
            ))
        }
    }

    /// Build a PDF with one page per entry; an empty entry yields a page with no text
    fn make_test_pdf(page_texts: &[&str]) -> Vec<u8> {
        use lopdf::dictionary;
        use lopdf::{Document, Object, Stream};

        let mut doc = Document::with_version("1.4");
        let pages_id = doc.new_object_id();

        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => font_id,
            },
        });

        let mut kids: Vec<Object> = Vec::new();
        for text in page_texts {
            let content = if text.is_empty() {
                String::new()
            } else {
                format!("BT /F1 12 Tf 100 700 Td ({text}) Tj ET")
            };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
                "Contents" => content_id,
                "Resources" => resources_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buf = Vec::new();
        doc.save_to(&mut buf).unwrap();
        buf
    }

    // ============================================================================
    // Page walk
    // ============================================================================

    #[test]
    fn test_empty_pages_are_skipped() {
        let outcome = walk(&["", "hello world", ""], "a.pdf", 100);
        assert_eq!(outcome.text.as_deref(), Some("hello world"));
        assert_eq!(outcome.warning, None);
        assert!(!outcome.truncated);
    }

    #[test]
    fn test_all_blank_pages_reports_scanned() {
        let outcome = walk(&["", "  \n\t", ""], "scan.pdf", 100);
        assert_eq!(outcome.text, None);
        assert_eq!(outcome.warning.as_deref(), Some(SCANNED_PDF_WARNING));
    }

    #[test]
    fn test_no_pages_reports_scanned() {
        let outcome = walk(&[], "empty.pdf", 100);
        assert_eq!(outcome.warning.as_deref(), Some(SCANNED_PDF_WARNING));
    }

    #[test]
    fn test_overflowing_page_contributes_prefix_and_stops() {
        let outcome = walk(&["abcdef", "ghijkl", "never"], "r.pdf", 8);
        let text = outcome.text.unwrap();
        assert!(text.starts_with("abcdefgh[...File \"r.pdf\" truncated at 8 characters]"));
        assert!(!text.contains("never"));
        assert!(outcome.truncated);
        assert_eq!(
            outcome.warning.as_deref(),
            Some("file \"r.pdf\" truncated at 8 characters")
        );
    }

    #[test]
    fn test_blank_pages_do_not_consume_budget() {
        let outcome = walk(&["   ", "abc", "\n\n", "de"], "r.pdf", 5);
        // Budget exactly spent by the two text pages, nothing dropped
        assert_eq!(outcome.text.as_deref(), Some("abcde"));
        assert!(!outcome.truncated);
    }

    #[test]
    fn test_leftover_page_after_exact_budget_is_truncation() {
        let outcome = walk(&["abc", "", "de", "fgh"], "r.pdf", 5);
        let text = outcome.text.unwrap();
        assert!(text.starts_with("abcde[...File"));
        assert!(!text.contains("fgh"));
        assert!(outcome.truncated);
    }

    #[test]
    fn test_exact_budget_with_trailing_blank_pages() {
        let outcome = walk(&["", "hello world", ""], "a.pdf", 11);
        assert_eq!(outcome.text.as_deref(), Some("hello world"));
        assert_eq!(outcome.warning, None);
    }

    #[test]
    fn test_budget_counts_characters() {
        let outcome = walk(&["ãããã", "éééé"], "u.pdf", 6);
        let text = outcome.text.unwrap();
        assert!(text.starts_with("ããããéé["));
    }

    #[test]
    fn test_surrounding_whitespace_trimmed() {
        let outcome = walk(&["\n  first ", "second  \n"], "t.pdf", 1000);
        assert_eq!(outcome.text.as_deref(), Some("first second"));
    }

    // ============================================================================
    // Async extraction
    // ============================================================================

    #[tokio::test]
    async fn test_extract_uses_reader_pages() {
        let extractor =
            PdfTextExtractor::with_reader(Arc::new(CannedPages::new(&["", "hello world", ""])));
        for budget in [11, 50] {
            let outcome = extractor.extract(b"%PDF".to_vec(), "a.pdf", budget).await;
            assert_eq!(outcome.text.as_deref(), Some("hello world"));
            assert_eq!(outcome.warning, None);
        }
    }

    #[tokio::test]
    async fn test_malformed_pdf_reports_error() {
        let extractor = PdfTextExtractor::new();
        let outcome = extractor.extract(b"not a pdf".to_vec(), "bad.pdf", 100).await;
        assert_eq!(outcome.text, None);
        assert!(outcome.warning.unwrap().starts_with("error reading PDF: "));
    }

    #[tokio::test]
    async fn test_parser_panic_reports_error() {
        let extractor = PdfTextExtractor::with_reader(Arc::new(PanickingReader));
        let outcome = extractor.extract(b"%PDF".to_vec(), "bad.pdf", 100).await;
        assert_eq!(outcome.text, None);
        assert_eq!(
            outcome.warning.as_deref(),
            Some("error reading PDF: parser panicked")
        );
    }

    #[tokio::test]
    async fn test_real_pdf_with_blank_page() {
        let pdf = make_test_pdf(&["", "Hello from page two", ""]);
        let outcome = PdfTextExtractor::new().extract(pdf, "mixed.pdf", 10_000).await;
        let text = outcome.text.expect("text page should be extracted");
        assert!(text.contains("Hello"), "got: {text}");
        assert!(!outcome.truncated);
    }

    #[test]
    fn test_pdf_extract_reader_splits_pages() {
        let pdf = make_test_pdf(&["First", "Second"]);
        let pages: Vec<String> = PdfExtractPages
            .pages(&pdf)
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(pages.len(), 2);
        assert!(pages[1].contains("Second"));
    }

    #[tokio::test]
    async fn test_pages_after_overflow_are_never_read() {
        let reader = Arc::new(CannedPages::new(&["abcdefghij", "second", "third", "fourth"]));
        let extractor = PdfTextExtractor::with_reader(reader.clone());

        let outcome = extractor.extract(b"%PDF".to_vec(), "big.pdf", 5).await;

        assert!(outcome.truncated);
        assert_eq!(reader.pulled.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_exact_budget_reads_one_page_ahead() {
        let reader = Arc::new(CannedPages::new(&["abcde", "more", "and more", "even more"]));
        let extractor = PdfTextExtractor::with_reader(reader.clone());

        let outcome = extractor.extract(b"%PDF".to_vec(), "big.pdf", 5).await;

        assert!(outcome.truncated);
        assert!(outcome.text.unwrap().starts_with("abcde[...File"));
        assert_eq!(reader.pulled.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_blank_lookahead_with_pages_left_is_truncation() {
        let outcome = walk(&["abc", "  ", "def"], "r.pdf", 3);
        assert!(outcome.truncated);
    }

    #[tokio::test]
    async fn test_page_error_reports_error() {
        let extractor = PdfTextExtractor::with_reader(Arc::new(BrokenSecondPage));
        let outcome = extractor.extract(b"%PDF".to_vec(), "bad.pdf", 100).await;
        assert_eq!(outcome.text, None);
        assert_eq!(
            outcome.warning.as_deref(),
            Some("error reading PDF: page 2: bad stream")
        );
    }
}
