//! Test generators — fake `TextGenerator` implementations for tests.

use std::sync::Mutex;

use async_trait::async_trait;
use taleforge_genai::{Error, GenerationRequest, TextGenerator};

/// A generator that returns a fixed text and records every request it
/// receives.
pub struct ScriptedGenerator {
    text: String,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedGenerator {
    /// Creates a generator that always returns `text`.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Returns a snapshot of all requests seen so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, Error> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(self.text.clone())
    }
}

/// A generator whose provider call always fails.
#[derive(Debug)]
pub struct FailingGenerator;

#[async_trait]
impl TextGenerator for FailingGenerator {
    async fn generate(&self, _request: &GenerationRequest) -> Result<String, Error> {
        Err(Error::Api {
            status: 503,
            message: "upstream unavailable".to_owned(),
        })
    }
}

/// A generator with no credential configured.
#[derive(Debug)]
pub struct UnconfiguredGenerator;

#[async_trait]
impl TextGenerator for UnconfiguredGenerator {
    async fn generate(&self, _request: &GenerationRequest) -> Result<String, Error> {
        Err(Error::NoApiKey)
    }
}
