// src/upload.rs
// Upload validation: type, emptiness and size, checked before any extraction

use std::collections::BTreeSet;

use crate::config::Settings;
use crate::error::{Result, TriageError};

/// Allowed types and size ceiling for uploaded files
#[derive(Debug, Clone)]
pub struct UploadValidator {
    allowed_mime: BTreeSet<String>,
    allowed_ext: BTreeSet<String>,
    max_upload_mb: u64,
}

impl UploadValidator {
    pub fn new(
        allowed_mime: BTreeSet<String>,
        allowed_ext: BTreeSet<String>,
        max_upload_mb: u64,
    ) -> Self {
        Self {
            allowed_mime,
            allowed_ext,
            max_upload_mb,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.allowed_mime.clone(),
            settings.allowed_ext.clone(),
            settings.max_upload_mb,
        )
    }

    pub fn max_upload_mb(&self) -> u64 {
        self.max_upload_mb
    }

    /// Byte ceiling derived from the megabyte limit
    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }

    /// Run every check in order, stopping at the first failure
    pub fn validate(&self, filename: &str, declared_mime: &str, bytes: &[u8]) -> Result<()> {
        self.check_type(filename, declared_mime)?;
        self.check_payload(bytes.len() as u64)
    }

    /// Both the declared MIME type and the extension must be allowed
    pub fn check_type(&self, filename: &str, declared_mime: &str) -> Result<()> {
        let mime_ok = self.allowed_mime.contains(&essence(declared_mime));
        let ext_ok = extension(filename).is_some_and(|ext| self.allowed_ext.contains(&ext));
        if mime_ok && ext_ok {
            Ok(())
        } else {
            Err(TriageError::UnsupportedType)
        }
    }

    pub fn check_payload(&self, byte_len: u64) -> Result<()> {
        if byte_len == 0 {
            return Err(TriageError::EmptyPayload);
        }
        if byte_len > self.max_upload_bytes() {
            return Err(TriageError::PayloadTooLarge {
                limit_mb: self.max_upload_mb,
            });
        }
        Ok(())
    }
}

/// Lowercased extension with leading dot, taken from the last path component.
///
/// Dotfiles (`.env`) have no extension.
pub fn extension(filename: &str) -> Option<String> {
    let name = filename.rsplit(['/', '\\']).next().unwrap_or("");
    match name.rfind('.') {
        None | Some(0) => None,
        Some(idx) => Some(name[idx..].to_ascii_lowercase()),
    }
}

/// MIME type without parameters, lowercased (`Text/Plain; charset=utf-8` -> `text/plain`)
pub fn essence(mime: &str) -> String {
    mime.split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase()
}
