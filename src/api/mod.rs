//! API Module
//!
//! Chat completion wire types.

pub mod completion;

pub use completion::{Choice, CompletionRequest, CompletionResponse, Message, Usage};
