//! In-memory completion providers (testing only)

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::ClaimError;
use crate::{CompletionPrompt, CompletionProvider};

/// Replays canned responses in order; the last one repeats once exhausted.
#[derive(Debug)]
pub struct ScriptedCompletion {
    responses: Vec<String>,
    delay: Option<Duration>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedCompletion {
    pub fn new(responses: Vec<&str>) -> Self {
        Self {
            responses: responses.into_iter().map(str::to_string).collect(),
            delay: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Shared counter of `complete` calls, readable after the fake is moved.
    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl CompletionProvider for ScriptedCompletion {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, _prompt: &CompletionPrompt) -> Result<String, ClaimError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.responses
            .get(n)
            .or_else(|| self.responses.last())
            .cloned()
            .ok_or(ClaimError::EmptyResponse)
    }
}

/// Provider whose every call fails at the transport level.
#[derive(Debug, Default, Clone, Copy)]
pub struct FailingCompletion;

#[async_trait]
impl CompletionProvider for FailingCompletion {
    fn name(&self) -> &str {
        "failing"
    }

    async fn complete(&self, _prompt: &CompletionPrompt) -> Result<String, ClaimError> {
        Err(ClaimError::Http("connection reset by peer".to_string()))
    }
}
