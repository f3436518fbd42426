//! Application settings
//!
//! Loaded from environment variables with sensible defaults. A `.env` file
//! in the working directory is honored when present.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Default Groq-compatible chat-completions endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Base name for API key discovery (`GROQ_API_KEY`, `GROQ_API_KEY_0`, ...)
pub const KEY_ENV_BASE: &str = "GROQ_API_KEY";

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    // Server settings
    pub host: String,
    pub port: u16,
    pub log_level: String,

    // Model settings
    pub model: String,
    pub temperature: f32,
    pub base_url: String,

    // Rotation settings
    pub retries_per_key: u32,
    pub cooldown_seconds: f64,

    // File extensions accepted for analysis (lowercase, no leading dot)
    pub extensions: Vec<String>,

    // Folder names excluded from analysis; None means the built-in list
    pub skip_folders: Option<Vec<String>>,
}

impl Settings {
    /// Load settings from environment variables with defaults
    pub fn load() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let settings = Self {
            host: env_or_default("HOST", "0.0.0.0"),
            port: parse_env("PORT", 8000)?,
            log_level: env_or_default("LOG_LEVEL", "info"),

            model: env_or_default("MODEL", "openai/gpt-oss-20b"),
            temperature: parse_env("TEMPERATURE", 0.0)?,
            base_url: env_or_default("GROQ_BASE_URL", DEFAULT_BASE_URL),

            retries_per_key: parse_env("MAX_RETRIES_PER_KEY", 1)?,
            cooldown_seconds: parse_env("COOLDOWN_SECONDS", 5.0)?,

            extensions: split_list(&env_or_default("ANALYZE_EXTENSIONS", "py,sql"))
                .into_iter()
                .map(|ext| ext.trim_start_matches('.').to_lowercase())
                .collect(),

            skip_folders: env::var("SKIP_FOLDERS").ok().map(|raw| split_list(&raw)),
        };

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(Error::Config("PORT cannot be 0".to_string()));
        }
        if !self.temperature.is_finite() || !(0.0..=2.0).contains(&self.temperature) {
            return Err(Error::Config(format!(
                "TEMPERATURE must be between 0 and 2, got {}",
                self.temperature
            )));
        }
        if !self.cooldown_seconds.is_finite() || self.cooldown_seconds < 0.0 {
            return Err(Error::Config(format!(
                "COOLDOWN_SECONDS must be >= 0, got {}",
                self.cooldown_seconds
            )));
        }
        if self.extensions.is_empty() {
            return Err(Error::Config(
                "ANALYZE_EXTENSIONS must name at least one extension".to_string(),
            ));
        }
        Ok(())
    }

    /// Cooldown between a detected rate limit and the next attempt
    pub fn cooldown(&self) -> Duration {
        Duration::from_secs_f64(self.cooldown_seconds)
    }

    /// Get the server address string
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// True if a file with the given name has an analyzable extension
    pub fn is_analyzable(&self, filename: &str) -> bool {
        match filename.rsplit_once('.') {
            Some((_, ext)) => {
                let ext = ext.to_lowercase();
                self.extensions.iter().any(|e| *e == ext)
            }
            None => false,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            log_level: "info".to_string(),
            model: "openai/gpt-oss-20b".to_string(),
            temperature: 0.0,
            base_url: DEFAULT_BASE_URL.to_string(),
            retries_per_key: 1,
            cooldown_seconds: 5.0,
            extensions: vec!["py".to_string(), "sql".to_string()],
            skip_folders: None,
        }
    }
}

/// Helper to get an environment variable with a default
fn env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| Error::Config(format!("invalid {} value: {:?}", key, raw))),
        Err(_) => Ok(default),
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
