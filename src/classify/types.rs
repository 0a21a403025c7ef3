// src/classify/types.rs
// Classification record returned to callers

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, TriageError};

/// Top-level outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Category {
    Productive,
    Unproductive,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Productive => "productive",
            Self::Unproductive => "unproductive",
        }
    }
}

impl TryFrom<String> for Category {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        match value.trim().to_lowercase().as_str() {
            "productive" => Ok(Self::Productive),
            "unproductive" => Ok(Self::Unproductive),
            other => Err(format!("unknown category '{other}'")),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Finer-grained reason tag. Unrecognized tags read as `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Subtype {
    Status,
    Support,
    Attachment,
    Question,
    Greeting,
    Spam,
    Other,
}

impl Subtype {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Status => "status",
            Self::Support => "support",
            Self::Attachment => "attachment",
            Self::Question => "question",
            Self::Greeting => "greeting",
            Self::Spam => "spam",
            Self::Other => "other",
        }
    }
}

impl From<String> for Subtype {
    fn from(value: String) -> Self {
        match value.trim().to_lowercase().as_str() {
            "status" => Self::Status,
            "support" => Self::Support,
            "attachment" => Self::Attachment,
            "question" => Self::Question,
            "greeting" => Self::Greeting,
            "spam" => Self::Spam,
            _ => Self::Other,
        }
    }
}

impl fmt::Display for Subtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Confidence used for the locally synthesized fallback
pub const FALLBACK_CONFIDENCE: f64 = 0.4;
pub const FALLBACK_SUMMARY: &str = "file not automatically readable";
pub const EXTRACTION_FAILED_REASON: &str = "text extraction failed";
pub const FALLBACK_REPLY: &str = "I couldn't read the file you sent. Could you resend it as a \
searchable PDF or paste the text into the body of your message?";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub category: Category,
    pub subtype: Subtype,
    pub confidence: f64,
    pub summary: String,
    #[serde(default)]
    pub reasons: Vec<String>,
    pub suggested_reply: String,
}

impl ClassificationResult {
    /// Parse the provider's JSON payload, tolerating a Markdown code fence
    pub fn from_provider_json(raw: &str) -> Result<Self> {
        let body = strip_code_fence(raw);
        let parsed: Self = serde_json::from_str(body).map_err(|e| {
            TriageError::ClassificationProvider(format!("malformed classification JSON: {e}"))
        })?;
        Ok(parsed.normalized())
    }

    /// Clamp confidence into [0, 1]; NaN becomes 0
    pub fn normalized(mut self) -> Self {
        self.confidence = if self.confidence.is_nan() {
            0.0
        } else {
            self.confidence.clamp(0.0, 1.0)
        };
        self
    }

    /// Fixed low-confidence result for uploads with no readable text
    pub fn fallback(warning: Option<&str>) -> Self {
        Self {
            category: Category::Unproductive,
            subtype: Subtype::Other,
            confidence: FALLBACK_CONFIDENCE,
            summary: FALLBACK_SUMMARY.to_string(),
            reasons: vec![
                EXTRACTION_FAILED_REASON.to_string(),
                warning
                    .unwrap_or(crate::extract::UNSUPPORTED_FORMAT)
                    .to_string(),
            ],
            suggested_reply: FALLBACK_REPLY.to_string(),
        }
    }

    /// Append an extraction warning as the last reason
    pub fn push_warning(&mut self, warning: impl Into<String>) {
        self.reasons.push(warning.into());
    }

    /// Whether any reason mentions truncation (case-insensitive)
    pub fn reasons_mention_truncation(&self) -> bool {
        self.reasons.join(" ").to_lowercase().contains("truncated")
    }
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop an optional language tag on the opening line
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
