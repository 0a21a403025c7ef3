// src/classify/gemini/mod.rs
// Google Gemini classifier

mod client;
pub mod types;

pub use client::{GEMINI_API_BASE, GeminiClassifier};
