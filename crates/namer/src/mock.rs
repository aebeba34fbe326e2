//! Scripted [`CompletionClient`] for tests.

use crate::client::{Completion, CompletionClient, CompletionRequest};
use crate::error::Result;
use crate::models::Usage;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

type Responder = dyn Fn(&CompletionRequest) -> Result<String> + Send + Sync;

/// Answers every prompt by calling a closure, optionally after a delay.
///
/// Token usage is faked as the whitespace-separated word counts of the
/// prompt and reply.
pub struct MockClient {
    responder: Box<Responder>,
    latency: Option<Duration>,
    calls: AtomicUsize,
}
impl MockClient {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&CompletionRequest) -> Result<String> + Send + Sync + 'static,
    {
        Self { responder: Box::new(responder), latency: None, calls: AtomicUsize::new(0) }
    }

    /// Replies with the same text to every prompt.
    pub fn replying(reply: impl Into<String>) -> Self {
        let reply = reply.into();
        Self::new(move |_| Ok(reply.clone()))
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Number of prompts received so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionClient for MockClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        let content = (self.responder)(request)?;
        let usage = Usage {
            prompt_tokens: request.prompt.split_whitespace().count() as u64,
            completion_tokens: content.split_whitespace().count() as u64,
        };
        Ok(Completion { content, usage })
    }
}
