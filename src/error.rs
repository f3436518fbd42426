//! Error types for the audit service.
//!
//! The taxonomy matters to the rotation client: `RateLimited` is the only
//! transient class, `KeysExhausted` is the terminal per-call condition, and
//! everything else propagates to the caller unchanged.

use thiserror::Error;

/// Main error type for critiq operations
#[derive(Debug, Error)]
pub enum Error {
    /// No usable API keys at construction time. Fatal: nothing can succeed.
    #[error("no usable API keys: {0}")]
    NoKeys(String),

    /// Provider rejected the request as rate limited (HTTP 429)
    #[error("provider rate limited the request (429 Too Many Requests): {message}")]
    RateLimited { message: String },

    /// Every key in the pool was rate limited during a single call.
    /// Carries the triggering rate-limit error as its cause.
    #[error("all {keys} API key(s) have been rate limited; wait and retry later")]
    KeysExhausted {
        keys: usize,
        #[source]
        source: Option<Box<Error>>,
    },

    /// Authentication failed (401/403). Not a rotation trigger.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Provider returned a non-success status outside the classes above
    #[error("provider returned status {status}: {message}")]
    Api { status: u16, message: String },

    /// HTTP transport failure
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Response body could not be interpreted
    #[error("response error: {0}")]
    Response(String),

    /// Invalid or inconsistent configuration
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// True for the terminal all-keys-exhausted condition, so batch drivers
    /// can stop cleanly instead of treating it as a per-file failure.
    pub fn is_keys_exhausted(&self) -> bool {
        matches!(self, Error::KeysExhausted { .. })
    }
}

/// Result type alias for critiq operations
pub type Result<T> = std::result::Result<T, Error>;
