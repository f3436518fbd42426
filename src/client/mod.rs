//! Client Module
//!
//! Key rotation and the completion transport it dispatches through.

pub mod rotation;
pub mod transport;

#[cfg(test)]
pub mod testing;

pub use rotation::{is_rate_limit_error, RotatingClient, RotationConfig};
pub use transport::{CompletionBackend, CompletionHandle, GroqBackend};
