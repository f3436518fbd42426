//! critiq - LLM-powered code audit service
//!
//! Uploaded source files are routed through a sequence of narrow LLM
//! analysis stages, merged into a single audit report, and returned with a
//! corrected version of the code. Outbound completions go through a
//! rotating pool of API keys so a single rate-limited key does not stall
//! the batch.

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod scan;
pub mod server;

pub use client::{CompletionBackend, CompletionHandle, GroqBackend, RotatingClient, RotationConfig};
pub use config::Settings;
pub use error::{Error, Result};
pub use pipeline::{review_code, FileReview};
