//! Configuration Module
//!
//! Application settings and API key discovery.

pub mod keys;
pub mod settings;

pub use keys::{discover_from_env, discover_keys, sanitize_keys};
pub use settings::{Settings, DEFAULT_BASE_URL, KEY_ENV_BASE};
