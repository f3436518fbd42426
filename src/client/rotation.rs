//! API key rotation
//!
//! Owns an ordered pool of API keys and a cursor into it. Each call
//! dispatches through a handle bound to the active key; on a rate-limit
//! failure the cursor advances and the handle is rebuilt for the next key,
//! until the pool is exhausted. Any other failure propagates immediately.
//!
//! One call is expected to run to completion before the next begins: the
//! `&mut self` receivers make the cursor/handle mutation explicit, and
//! callers that share an instance must serialize access around it.

use crate::client::transport::{CompletionBackend, CompletionHandle};
use crate::config::{sanitize_keys, Settings};
use crate::error::{Error, Result};
use std::time::Duration;

/// Fixed parameters for the rotation client
#[derive(Debug, Clone)]
pub struct RotationConfig {
    /// Model identifier sent with every request
    pub model: String,

    /// Sampling temperature sent with every request
    pub temperature: f32,

    /// Per-key retry allowance. Only widens the attempt budget
    /// (`keys * (retries_per_key + 1)`); rotation still happens on the
    /// first rate-limit detection for a key, never in place.
    pub retries_per_key: u32,

    /// Pause between a detected rate limit and the next attempt
    pub cooldown: Duration,
}

impl RotationConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            model: settings.model.clone(),
            temperature: settings.temperature,
            retries_per_key: settings.retries_per_key,
            cooldown: settings.cooldown(),
        }
    }
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

/// Completion client that rotates across a pool of API keys on rate limits
pub struct RotatingClient<B: CompletionBackend> {
    backend: B,
    config: RotationConfig,
    keys: Vec<String>,
    cursor: usize,
    handle: Box<dyn CompletionHandle>,
}

impl<B: CompletionBackend> std::fmt::Debug for RotatingClient<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RotatingClient")
            .field("config", &self.config)
            .field("keys", &self.keys.len())
            .field("cursor", &self.cursor)
            .finish_non_exhaustive()
    }
}

impl<B: CompletionBackend> RotatingClient<B> {
    /// Create a client from an explicit key list.
    ///
    /// Keys are trimmed, unquoted, deduplicated, and must leave a non-empty
    /// pool; the first key's handle is built eagerly.
    pub fn new(backend: B, config: RotationConfig, keys: Vec<String>) -> Result<Self> {
        let keys = sanitize_keys(keys);
        if keys.is_empty() {
            return Err(Error::NoKeys(
                "key list is empty after trimming and deduplication".to_string(),
            ));
        }

        let handle = backend.bind(&keys[0], &config.model, config.temperature);

        tracing::info!(
            keys = keys.len(),
            model = %config.model,
            "rotation client initialized"
        );

        Ok(Self {
            backend,
            config,
            keys,
            cursor: 0,
            handle,
        })
    }

    /// Create a client with keys discovered from the environment
    /// (`base`, `base_0`, `base_1`, ...).
    pub fn from_env(backend: B, config: RotationConfig, base: &str) -> Result<Self> {
        let keys = crate::config::discover_from_env(base);
        if keys.is_empty() {
            return Err(Error::NoKeys(format!(
                "set {base} (or {base}_0, {base}_1, ...) in the environment"
            )));
        }
        Self::new(backend, config, keys)
    }

    /// Number of keys in the pool
    pub fn key_count(&self) -> usize {
        self.keys.len()
    }

    /// Index of the active key
    pub fn current_index(&self) -> usize {
        self.cursor
    }

    /// Human-readable label for the active key, used in logs
    pub fn key_label(&self) -> String {
        format!("key {} of {}", self.cursor + 1, self.keys.len())
    }

    /// Advance to the next key and rebuild the bound handle.
    /// Returns false when the cursor is already at the last key.
    fn rotate(&mut self) -> bool {
        let next = self.cursor + 1;
        if next >= self.keys.len() {
            return false;
        }
        self.cursor = next;
        self.rebind();
        tracing::info!(label = %self.key_label(), "rotated to next API key");
        true
    }

    /// Return to the first key, e.g. between independent batches of work
    pub fn reset(&mut self) {
        self.cursor = 0;
        self.rebind();
    }

    fn rebind(&mut self) {
        self.handle = self.backend.bind(
            &self.keys[self.cursor],
            &self.config.model,
            self.config.temperature,
        );
    }

    /// Run one prompt, rotating keys on rate limits.
    ///
    /// Returns on the first successful dispatch. Non-rate-limit failures
    /// propagate unchanged without rotation. A rate limit on the last key
    /// yields [`Error::KeysExhausted`] chained to the triggering error.
    pub async fn invoke(&mut self, prompt: &str) -> Result<String> {
        let budget = self.keys.len() * (self.config.retries_per_key as usize + 1);
        let mut attempts = 0usize;
        let mut last_rate_limit: Option<Error> = None;

        while attempts < budget {
            match self.handle.complete(prompt).await {
                Ok(text) => return Ok(text),
                Err(err) => {
                    if !is_rate_limit_error(&err) {
                        return Err(err);
                    }

                    attempts += 1;
                    tracing::warn!(
                        label = %self.key_label(),
                        attempt = attempts,
                        budget,
                        error = %err,
                        "rate limit hit"
                    );

                    if !self.rotate() {
                        tracing::error!(
                            keys = self.keys.len(),
                            "every API key in the pool has been rate limited"
                        );
                        return Err(Error::KeysExhausted {
                            keys: self.keys.len(),
                            source: Some(Box::new(err)),
                        });
                    }

                    last_rate_limit = Some(err);
                    tokio::time::sleep(self.config.cooldown).await;
                }
            }
        }

        // Safety net; the loop math means the exhaustion path above fires first
        Err(Error::KeysExhausted {
            keys: self.keys.len(),
            source: last_rate_limit.map(Box::new),
        })
    }
}

/// Textual rate-limit classification.
///
/// A failure counts as a rate limit when its rendered text contains "429",
/// "too many requests", or both "rate" and "limit" (which also covers the
/// compound "rate_limit"/"ratelimit" forms), case-insensitively. The test
/// is applied to the error itself and to every cause in its `source()`
/// chain, so wrapped provider errors are still recognized.
pub fn is_rate_limit_error(err: &(dyn std::error::Error + 'static)) -> bool {
    let mut current: Option<&(dyn std::error::Error + 'static)> = Some(err);

    while let Some(e) = current {
        let text = e.to_string().to_lowercase();
        if text.contains("429")
            || text.contains("too many requests")
            || (text.contains("rate") && text.contains("limit"))
        {
            return true;
        }
        current = e.source();
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::{Outcome, ScriptedBackend};
    use std::fmt;

    fn config() -> RotationConfig {
        RotationConfig {
            model: "test-model".to_string(),
            temperature: 0.0,
            retries_per_key: 0,
            cooldown: Duration::ZERO,
        }
    }

    fn keys(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn rate_limited() -> Outcome {
        Outcome::RateLimited("Rate limit reached for this key".to_string())
    }

    #[test]
    fn test_construction_rejects_empty_pool() {
        let backend = ScriptedBackend::new(vec![]);
        let err = RotatingClient::new(backend, config(), vec![]).unwrap_err();
        assert!(matches!(err, Error::NoKeys(_)));

        // Blank and quote-only values do not count as keys
        let backend = ScriptedBackend::new(vec![]);
        let err =
            RotatingClient::new(backend, config(), keys(&["   ", "\"\""])).unwrap_err();
        assert!(matches!(err, Error::NoKeys(_)));
    }

    #[test]
    fn test_construction_binds_first_key_eagerly() {
        let backend = ScriptedBackend::new(vec![]);
        let probe = backend.clone();
        let client = RotatingClient::new(backend, config(), keys(&["a", "b"])).unwrap();

        assert_eq!(client.current_index(), 0);
        assert_eq!(client.key_label(), "key 1 of 2");
        assert_eq!(probe.bound_keys(), vec!["a"]);
    }

    #[tokio::test]
    async fn test_first_success_makes_exactly_one_dispatch() {
        let backend = ScriptedBackend::new(vec![Outcome::Text("done".to_string())]);
        let probe = backend.clone();
        let mut client = RotatingClient::new(backend, config(), keys(&["a", "b"])).unwrap();

        let text = client.invoke("prompt").await.unwrap();

        assert_eq!(text, "done");
        assert_eq!(probe.dispatch_count(), 1);
        assert_eq!(client.current_index(), 0);
    }

    #[tokio::test]
    async fn test_non_rate_limit_error_propagates_without_rotation() {
        let backend =
            ScriptedBackend::new(vec![Outcome::Auth("invalid api key".to_string())]);
        let probe = backend.clone();
        let mut client = RotatingClient::new(backend, config(), keys(&["a", "b"])).unwrap();

        let err = client.invoke("prompt").await.unwrap_err();

        assert!(matches!(err, Error::Auth(_)));
        assert_eq!(probe.dispatch_count(), 1);
        assert_eq!(client.current_index(), 0);
        // Only the eager construction bind happened
        assert_eq!(probe.bound_keys(), vec!["a"]);
    }

    #[tokio::test]
    async fn test_exhaustion_rotates_through_pool_in_order() {
        let backend =
            ScriptedBackend::new(vec![rate_limited(), rate_limited(), rate_limited()]);
        let probe = backend.clone();
        let mut client =
            RotatingClient::new(backend, config(), keys(&["a", "b", "c"])).unwrap();

        let err = client.invoke("prompt").await.unwrap_err();

        // Budget is 3 * (0 + 1) = 3: one dispatch per key, in pool order
        assert_eq!(probe.dispatch_count(), 3);
        assert_eq!(probe.bound_keys(), vec!["a", "b", "c"]);

        match err {
            Error::KeysExhausted { keys: 3, source } => {
                let source = source.expect("exhaustion carries the triggering error");
                assert!(matches!(*source, Error::RateLimited { .. }));
            }
            other => panic!("expected KeysExhausted, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_rotates_on_first_rate_limit_detection() {
        // retries_per_key = 1 widens the budget to 4 but must not cause
        // in-place retries: the first rate limit on key "a" moves straight
        // to key "b".
        let backend =
            ScriptedBackend::new(vec![rate_limited(), Outcome::Text("ok".to_string())]);
        let probe = backend.clone();
        let mut cfg = config();
        cfg.retries_per_key = 1;
        let mut client = RotatingClient::new(backend, cfg, keys(&["a", "b"])).unwrap();

        let text = client.invoke("prompt").await.unwrap();

        assert_eq!(text, "ok");
        assert_eq!(probe.dispatch_count(), 2);
        assert_eq!(probe.bound_keys(), vec!["a", "b"]);
        assert_eq!(client.current_index(), 1);
    }

    #[tokio::test]
    async fn test_exhaustion_occurs_within_budget() {
        // Budget 2 * (1 + 1) = 4, but a two-key pool exhausts after two
        // rate limits; exhaustion must fire at or before the bound.
        let backend = ScriptedBackend::new(vec![rate_limited(), rate_limited()]);
        let probe = backend.clone();
        let mut cfg = config();
        cfg.retries_per_key = 1;
        let mut client = RotatingClient::new(backend, cfg, keys(&["a", "b"])).unwrap();

        let err = client.invoke("prompt").await.unwrap_err();

        assert!(err.is_keys_exhausted());
        assert_eq!(probe.dispatch_count(), 2);
    }

    #[tokio::test]
    async fn test_reset_returns_to_first_key() {
        let backend = ScriptedBackend::new(vec![
            rate_limited(),
            Outcome::Text("first".to_string()),
            Outcome::Text("second".to_string()),
        ]);
        let probe = backend.clone();
        let mut client = RotatingClient::new(backend, config(), keys(&["a", "b"])).unwrap();

        client.invoke("prompt").await.unwrap();
        assert_eq!(client.current_index(), 1);

        client.reset();
        assert_eq!(client.current_index(), 0);

        client.invoke("prompt").await.unwrap();
        // Binds: a (construction), b (rotation), a (reset); no new bind on
        // the post-reset invoke since the handle is already active
        assert_eq!(probe.bound_keys(), vec!["a", "b", "a"]);
        assert_eq!(client.current_index(), 0);
    }

    #[tokio::test]
    async fn test_dedup_shrinks_pool_and_budget() {
        let backend = ScriptedBackend::new(vec![rate_limited(), rate_limited()]);
        let probe = backend.clone();
        let mut client =
            RotatingClient::new(backend, config(), keys(&["a", "a", "b"])).unwrap();

        assert_eq!(client.key_count(), 2);
        let err = client.invoke("prompt").await.unwrap_err();

        assert!(err.is_keys_exhausted());
        assert_eq!(probe.dispatch_count(), 2);
    }

    // -- classifier ---------------------------------------------------------

    #[derive(Debug)]
    struct TextError {
        text: String,
        cause: Option<Box<TextError>>,
    }

    impl TextError {
        fn new(text: &str) -> Self {
            Self {
                text: text.to_string(),
                cause: None,
            }
        }

        fn with_cause(text: &str, cause: TextError) -> Self {
            Self {
                text: text.to_string(),
                cause: Some(Box::new(cause)),
            }
        }
    }

    impl fmt::Display for TextError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}", self.text)
        }
    }

    impl std::error::Error for TextError {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            self.cause
                .as_deref()
                .map(|c| c as &(dyn std::error::Error + 'static))
        }
    }

    #[test]
    fn test_classifier_matches_status_code_text() {
        assert!(is_rate_limit_error(&TextError::new(
            "Error code: 429 - request rejected"
        )));
    }

    #[test]
    fn test_classifier_matches_too_many_requests_any_case() {
        assert!(is_rate_limit_error(&TextError::new("Too Many Requests")));
        assert!(is_rate_limit_error(&TextError::new("TOO MANY REQUESTS")));
    }

    #[test]
    fn test_classifier_matches_rate_and_limit_tokens() {
        assert!(is_rate_limit_error(&TextError::new(
            "rate limit exceeded for model"
        )));
        assert!(is_rate_limit_error(&TextError::new("rate_limit_exceeded")));
        assert!(is_rate_limit_error(&TextError::new("RateLimitError")));
    }

    #[test]
    fn test_classifier_walks_cause_chain() {
        let err = TextError::with_cause(
            "request to upstream failed",
            TextError::with_cause(
                "transport failed",
                TextError::new("server said: too many requests"),
            ),
        );
        assert!(is_rate_limit_error(&err));
    }

    #[test]
    fn test_classifier_rejects_unrelated_errors() {
        assert!(!is_rate_limit_error(&TextError::new("connection refused")));
        assert!(!is_rate_limit_error(&TextError::with_cause(
            "request failed",
            TextError::new("invalid api key"),
        )));
        // One token alone is not enough
        assert!(!is_rate_limit_error(&TextError::new("limit reached")));
        assert!(!is_rate_limit_error(&TextError::new("first rate observed")));
    }
}
