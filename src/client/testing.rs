//! Scripted completion backend for unit tests.
//!
//! Outcomes are consumed in order across all bound handles, which mirrors
//! how the rotation client makes exactly one dispatch at a time.

use crate::client::transport::{CompletionBackend, CompletionHandle};
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// One scripted dispatch result
#[derive(Debug, Clone)]
pub enum Outcome {
    Text(String),
    RateLimited(String),
    Auth(String),
}

/// Backend whose handles replay a fixed script of outcomes
#[derive(Clone)]
pub struct ScriptedBackend {
    script: Arc<Mutex<VecDeque<Outcome>>>,
    bound: Arc<Mutex<Vec<String>>>,
    prompts: Arc<Mutex<Vec<String>>>,
    dispatches: Arc<AtomicUsize>,
}

impl ScriptedBackend {
    pub fn new(script: Vec<Outcome>) -> Self {
        Self {
            script: Arc::new(Mutex::new(script.into())),
            bound: Arc::new(Mutex::new(Vec::new())),
            prompts: Arc::new(Mutex::new(Vec::new())),
            dispatches: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Keys bound so far, in bind order (construction, rotations, resets)
    pub fn bound_keys(&self) -> Vec<String> {
        self.bound.lock().unwrap().clone()
    }

    /// Prompts dispatched so far, in dispatch order
    pub fn seen_prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    /// Total dispatch attempts across all handles
    pub fn dispatch_count(&self) -> usize {
        self.dispatches.load(Ordering::SeqCst)
    }
}

impl CompletionBackend for ScriptedBackend {
    fn bind(&self, api_key: &str, _model: &str, _temperature: f32) -> Box<dyn CompletionHandle> {
        self.bound.lock().unwrap().push(api_key.to_string());
        Box::new(ScriptedHandle {
            script: Arc::clone(&self.script),
            prompts: Arc::clone(&self.prompts),
            dispatches: Arc::clone(&self.dispatches),
        })
    }
}

struct ScriptedHandle {
    script: Arc<Mutex<VecDeque<Outcome>>>,
    prompts: Arc<Mutex<Vec<String>>>,
    dispatches: Arc<AtomicUsize>,
}

#[async_trait]
impl CompletionHandle for ScriptedHandle {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.dispatches.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());

        match self.script.lock().unwrap().pop_front() {
            Some(Outcome::Text(text)) => Ok(text),
            Some(Outcome::RateLimited(message)) => Err(Error::RateLimited { message }),
            Some(Outcome::Auth(message)) => Err(Error::Auth(message)),
            None => Ok("unscripted completion".to_string()),
        }
    }
}
