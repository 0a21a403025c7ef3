// src/classify/gemini/client.rs
// Gemini generateContent client (non-streaming, JSON response mode, single attempt)

use async_trait::async_trait;
use std::time::Instant;
use tracing::{debug, instrument, warn};

use super::types::{GeminiContent, GeminiRequest, GeminiResponse, GenerationConfig};
use crate::classify::prompt::SYSTEM_PROMPT;
use crate::classify::{ClassificationResult, Classifier};
use crate::error::{Result, TriageError};

pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Longest provider error body kept in an error message
const MAX_ERROR_BODY: usize = 300;

/// Header carrying the API key, which keeps it out of request URLs
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Classifier backed by the Gemini API
pub struct GeminiClassifier {
    api_key: String,
    model: String,
    base_url: String,
    client: reqwest::Client,
}

impl GeminiClassifier {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: GEMINI_API_BASE.to_string(),
            client,
        }
    }

    /// Point at another endpoint root (used against a mock server)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn build_request(text: &str) -> GeminiRequest {
        GeminiRequest {
            contents: vec![GeminiContent::user(text)],
            system_instruction: Some(GeminiContent::system(SYSTEM_PROMPT)),
            generation_config: GenerationConfig {
                response_mime_type: "application/json".into(),
                temperature: Some(0.2),
            },
        }
    }
}

#[async_trait]
impl Classifier for GeminiClassifier {
    #[instrument(skip(self, text), fields(model = %self.model, chars = text.chars().count()))]
    async fn classify(&self, text: &str) -> Result<ClassificationResult> {
        let start = Instant::now();
        let url = format!("{}/{}:generateContent", self.base_url, self.model);

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, self.api_key.as_str())
            .json(&Self::build_request(text))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            warn!(model = %self.model, status = status.as_u16(), "Gemini request failed");
            return Err(TriageError::ClassificationProvider(format!(
                "Gemini API error {}: {}",
                status.as_u16(),
                shorten(&body)
            )));
        }

        let data: GeminiResponse = serde_json::from_str(&body).map_err(|e| {
            TriageError::ClassificationProvider(format!("failed to parse Gemini response: {e}"))
        })?;

        if let Some(usage) = &data.usage_metadata {
            debug!(
                model = %self.model,
                prompt_tokens = usage.prompt_token_count,
                completion_tokens = usage.candidates_token_count.unwrap_or(0),
                total_tokens = usage.total_token_count,
                duration_ms = start.elapsed().as_millis() as u64,
                "Gemini usage"
            );
        }

        let Some(raw) = data.first_text() else {
            let reason = data
                .prompt_feedback
                .and_then(|f| f.block_reason)
                .or_else(|| data.candidates.first().and_then(|c| c.finish_reason.clone()))
                .unwrap_or_else(|| "no candidates".to_string());
            return Err(TriageError::ClassificationProvider(format!(
                "Gemini returned no text ({reason})"
            )));
        };

        ClassificationResult::from_provider_json(&raw)
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}

fn shorten(body: &str) -> &str {
    match body.char_indices().nth(MAX_ERROR_BODY) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}
