// src/config/env.rs
// Environment-based configuration - single source of truth for all env vars

use std::collections::BTreeSet;
use std::str::FromStr;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::{Result, TriageError};

/// Default character budget forwarded to the classifier
pub const DEFAULT_MAX_CHARS: usize = 10_000;
/// Default upload ceiling in megabytes
pub const DEFAULT_MAX_UPLOAD_MB: u64 = 5;
/// Default whole-request timeout
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 20;
/// Default provider call timeout (must not exceed the request timeout)
pub const DEFAULT_CLASSIFY_TIMEOUT_SECS: u64 = 15;
/// Default number of provider calls allowed in flight at once
pub const DEFAULT_CLASSIFY_MAX_IN_FLIGHT: usize = 8;
/// Default Gemini model
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash-001";
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8000;

const DEFAULT_ALLOWED_MIME: &[&str] = &["text/plain", "application/pdf"];
const DEFAULT_ALLOWED_EXT: &[&str] = &[".txt", ".pdf"];

const BYTES_PER_MB: u64 = 1024 * 1024;

/// Process-wide configuration, built once at startup and shared read-only
#[derive(Debug, Clone)]
pub struct Settings {
    /// Gemini API key (GEMINI_API_KEY)
    pub gemini_api_key: String,
    /// Gemini model name (GEMINI_MODEL)
    pub gemini_model: String,
    /// Character budget for text sent to the classifier (MAX_CHARS)
    pub max_chars: usize,
    /// Upload ceiling in megabytes (MAX_UPLOAD_MB)
    pub max_upload_mb: u64,
    /// Whole-request timeout (REQUEST_TIMEOUT_S)
    pub request_timeout: Duration,
    /// Provider call timeout (CLASSIFY_TIMEOUT_S)
    pub classify_timeout: Duration,
    /// Worker pool size for provider calls (CLASSIFY_MAX_IN_FLIGHT)
    pub classify_max_in_flight: usize,
    /// Origins allowed by the CORS layer (ALLOWED_ORIGINS)
    pub allowed_origins: Vec<String>,
    /// Accepted upload MIME types (ALLOWED_MIME)
    pub allowed_mime: BTreeSet<String>,
    /// Accepted upload extensions, lowercase with leading dot (ALLOWED_EXT)
    pub allowed_ext: BTreeSet<String>,
    /// Bind host (TRIAGE_HOST)
    pub host: String,
    /// Bind port (TRIAGE_PORT)
    pub port: u16,
}

impl Settings {
    /// Defaults for everything except the provider credential
    pub fn new(gemini_api_key: impl Into<String>) -> Self {
        Self {
            gemini_api_key: gemini_api_key.into(),
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            max_chars: DEFAULT_MAX_CHARS,
            max_upload_mb: DEFAULT_MAX_UPLOAD_MB,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            classify_timeout: Duration::from_secs(DEFAULT_CLASSIFY_TIMEOUT_SECS),
            classify_max_in_flight: DEFAULT_CLASSIFY_MAX_IN_FLIGHT,
            allowed_origins: Vec::new(),
            allowed_mime: DEFAULT_ALLOWED_MIME.iter().map(|s| s.to_string()).collect(),
            allowed_ext: DEFAULT_ALLOWED_EXT.iter().map(|s| s.to_string()).collect(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }

    /// Load settings from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings from an arbitrary key lookup (the environment in production)
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("GEMINI_API_KEY")
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| TriageError::Config("GEMINI_API_KEY is not set".to_string()))?;

        let mut settings = Self::new(api_key.trim());

        if let Some(model) = lookup("GEMINI_MODEL").filter(|m| !m.trim().is_empty()) {
            settings.gemini_model = model.trim().to_string();
        }
        settings.max_chars = parse_or(&lookup, "MAX_CHARS", DEFAULT_MAX_CHARS);
        settings.max_upload_mb = parse_or(&lookup, "MAX_UPLOAD_MB", DEFAULT_MAX_UPLOAD_MB);
        settings.request_timeout = Duration::from_secs(parse_or(
            &lookup,
            "REQUEST_TIMEOUT_S",
            DEFAULT_REQUEST_TIMEOUT_SECS,
        ));
        settings.classify_timeout = Duration::from_secs(parse_or(
            &lookup,
            "CLASSIFY_TIMEOUT_S",
            DEFAULT_CLASSIFY_TIMEOUT_SECS,
        ));
        settings.classify_max_in_flight =
            parse_or(&lookup, "CLASSIFY_MAX_IN_FLIGHT", DEFAULT_CLASSIFY_MAX_IN_FLIGHT);

        if let Some(raw) = lookup("ALLOWED_ORIGINS") {
            settings.allowed_origins = split_list(&raw);
        }
        if let Some(raw) = lookup("ALLOWED_MIME") {
            let mime: BTreeSet<String> = split_list(&raw)
                .into_iter()
                .map(|m| m.to_ascii_lowercase())
                .collect();
            if !mime.is_empty() {
                settings.allowed_mime = mime;
            }
        }
        if let Some(raw) = lookup("ALLOWED_EXT") {
            let ext: BTreeSet<String> = split_list(&raw)
                .into_iter()
                .map(|e| normalize_extension(&e))
                .collect();
            if !ext.is_empty() {
                settings.allowed_ext = ext;
            }
        }

        if let Some(host) = lookup("TRIAGE_HOST").filter(|h| !h.trim().is_empty()) {
            settings.host = host.trim().to_string();
        }
        settings.port = parse_or(&lookup, "TRIAGE_PORT", DEFAULT_PORT);

        debug!(
            model = %settings.gemini_model,
            max_chars = settings.max_chars,
            max_upload_mb = settings.max_upload_mb,
            origins = settings.allowed_origins.len(),
            "Settings loaded"
        );

        Ok(settings)
    }

    /// Upload ceiling in bytes
    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_mb.saturating_mul(BYTES_PER_MB)
    }

    /// Check invariants that cannot be expressed in the types
    pub fn validate(&self) -> ConfigValidation {
        let mut validation = ConfigValidation::new();

        if self.gemini_api_key.trim().is_empty() {
            validation.add_error("GEMINI_API_KEY is empty");
        }
        if self.max_chars == 0 {
            validation.add_error("MAX_CHARS must be greater than zero");
        }
        if self.max_upload_mb == 0 {
            validation.add_error("MAX_UPLOAD_MB must be greater than zero");
        }
        if self.request_timeout.is_zero() {
            validation.add_error("REQUEST_TIMEOUT_S must be greater than zero");
        }
        if self.classify_timeout.is_zero() {
            validation.add_error("CLASSIFY_TIMEOUT_S must be greater than zero");
        }
        // Provider work must never outlive the request that awaits it
        if self.classify_timeout > self.request_timeout {
            validation.add_error(format!(
                "CLASSIFY_TIMEOUT_S ({}s) must not exceed REQUEST_TIMEOUT_S ({}s)",
                self.classify_timeout.as_secs(),
                self.request_timeout.as_secs()
            ));
        }
        if self.classify_max_in_flight == 0 {
            validation.add_error("CLASSIFY_MAX_IN_FLIGHT must be greater than zero");
        }
        if self.allowed_mime.is_empty() || self.allowed_ext.is_empty() {
            validation.add_error("ALLOWED_MIME and ALLOWED_EXT must not be empty");
        }
        if self.allowed_origins.iter().any(|o| o == "*") {
            validation.add_warning("ALLOWED_ORIGINS contains '*'; any origin may call the API");
        }

        validation
    }
}

/// Parse a value from the lookup, falling back to the default on absence or parse failure
fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => {
            // Tolerate trailing comments and whitespace (`KEY=5 # MB`)
            let clean = raw.split('#').next().unwrap_or("").trim();
            match clean.parse::<T>() {
                Ok(parsed) => parsed,
                Err(_) => {
                    warn!(key, value = %raw, "Unparseable config value, using default");
                    default
                }
            }
        }
        None => default,
    }
}

/// Split a comma-separated list, dropping empty entries
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Lowercase an extension and make sure it starts with a dot
pub fn normalize_extension(ext: &str) -> String {
    let lower = ext.trim().to_ascii_lowercase();
    if lower.starts_with('.') {
        lower
    } else {
        format!(".{lower}")
    }
}

/// Configuration validation result
#[derive(Debug)]
pub struct ConfigValidation {
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl Default for ConfigValidation {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigValidation {
    pub fn new() -> Self {
        Self {
            warnings: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    pub fn add_error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    /// Format as a human-readable report
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        if !self.errors.is_empty() {
            lines.push("Errors:".to_string());
            for err in &self.errors {
                lines.push(format!("  - {}", err));
            }
        }

        if !self.warnings.is_empty() {
            lines.push("Warnings:".to_string());
            for warning in &self.warnings {
                lines.push(format!("  - {}", warning));
            }
        }

        lines.join("\n")
    }
}
