// src/lib.rs
// Triage - classify messages and documents as productive or unproductive

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod classify;
pub mod config;
pub mod error;
pub mod extract;
pub mod http;
pub mod pipeline;
pub mod upload;
pub mod web;

pub use error::{Result, TriageError};
