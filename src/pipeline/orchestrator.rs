// src/pipeline/orchestrator.rs
// Request flow: validate, extract, fall back or classify, attach warnings, log

use std::sync::Arc;

use tracing::{debug, error, instrument};

use super::logger::{ClassificationLogger, Source};
use crate::classify::{ClassificationGateway, ClassificationResult, Classifier};
use crate::config::Settings;
use crate::error::{Result, TriageError};
use crate::extract::text::decode_text;
use crate::extract::{DocumentKind, ExtractionOutcome, PdfTextExtractor, limit};
use crate::upload::UploadValidator;

/// A file received from a client
#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(
        filename: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }
}

#[derive(Clone)]
pub struct ClassificationOrchestrator {
    max_chars: usize,
    validator: UploadValidator,
    pdf: PdfTextExtractor,
    gateway: ClassificationGateway,
    logger: ClassificationLogger,
}

impl ClassificationOrchestrator {
    pub fn new(
        max_chars: usize,
        validator: UploadValidator,
        pdf: PdfTextExtractor,
        gateway: ClassificationGateway,
        logger: ClassificationLogger,
    ) -> Self {
        Self {
            max_chars,
            validator,
            pdf,
            gateway,
            logger,
        }
    }

    /// Wire every stage from settings around the given classifier
    pub fn from_settings(settings: &Settings, classifier: Arc<dyn Classifier>) -> Self {
        Self::new(
            settings.max_chars,
            UploadValidator::from_settings(settings),
            PdfTextExtractor::new(),
            ClassificationGateway::new(
                classifier,
                settings.classify_timeout,
                settings.classify_max_in_flight,
            ),
            ClassificationLogger::default(),
        )
    }

    pub fn with_logger(mut self, logger: ClassificationLogger) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_pdf_extractor(mut self, pdf: PdfTextExtractor) -> Self {
        self.pdf = pdf;
        self
    }

    pub fn validator(&self) -> &UploadValidator {
        &self.validator
    }

    /// Classify pasted text. Blank input is rejected; there is no fallback.
    #[instrument(skip_all, fields(request_id = %request_id))]
    pub async fn classify_text(
        &self,
        request_id: &str,
        text: &str,
    ) -> Result<ClassificationResult> {
        if text.trim().is_empty() {
            return Err(TriageError::EmptyInput);
        }

        let limited = limit(text, self.max_chars);
        let input_bytes = limited.text.len();
        let result = self
            .delegate(request_id, Source::Text, input_bytes, limited.text)
            .await?;

        self.logger.record(
            request_id,
            Source::Text,
            input_bytes,
            &result,
            None,
            limited.truncated,
        );
        Ok(result)
    }

    /// Classify an uploaded file.
    ///
    /// Rejected uploads are never read. Uploads with no readable text get
    /// the fallback result instead of a provider call.
    #[instrument(skip_all, fields(request_id = %request_id, filename = %upload.filename))]
    pub async fn classify_file(
        &self,
        request_id: &str,
        upload: Upload,
    ) -> Result<ClassificationResult> {
        let Upload {
            filename,
            content_type,
            bytes,
        } = upload;
        self.validator.validate(&filename, &content_type, &bytes)?;

        let input_bytes = bytes.len();
        let outcome = self.extract(&filename, &content_type, bytes).await;
        let ExtractionOutcome {
            text,
            warning,
            truncated,
        } = outcome;

        let Some(text) = text else {
            debug!(warning = ?warning, "No readable text, using fallback");
            let result = ClassificationResult::fallback(warning.as_deref());
            self.logger.record(
                request_id,
                Source::File,
                input_bytes,
                &result,
                warning.as_deref(),
                truncated,
            );
            return Ok(result);
        };

        let mut result = self
            .delegate(request_id, Source::File, input_bytes, text)
            .await?;
        if let Some(w) = &warning {
            result.push_warning(w.clone());
        }

        self.logger.record(
            request_id,
            Source::File,
            input_bytes,
            &result,
            warning.as_deref(),
            truncated,
        );
        Ok(result)
    }

    async fn extract(&self, filename: &str, content_type: &str, bytes: Vec<u8>) -> ExtractionOutcome {
        match DocumentKind::detect(filename, content_type) {
            DocumentKind::Pdf => self.pdf.extract(bytes, filename, self.max_chars).await,
            DocumentKind::Text => decode_text(&bytes, filename, self.max_chars),
        }
    }

    async fn delegate(
        &self,
        request_id: &str,
        source: Source,
        input_bytes: usize,
        text: String,
    ) -> Result<ClassificationResult> {
        let chars = text.chars().count();
        self.gateway.classify(text).await.inspect_err(|e| {
            error!(
                request_id,
                source = ?source,
                input_bytes,
                chars,
                provider = self.gateway.provider_name(),
                error = %e,
                "Classification failed"
            );
        })
    }
}
