//! Scripted backend for exercising the exchange flow without a network

use async_trait::async_trait;
use chrono::Local;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use super::traits::AgentBackend;
use crate::agents::{AgentCategory, AgentResponse};
use crate::input::ImagePayload;
use crate::utils::MedicoreError;

/// Replays queued results in order, recording what it was sent
pub struct ScriptedBackend {
    replies: Mutex<VecDeque<Result<AgentResponse, MedicoreError>>>,
    sent: Mutex<Vec<(String, Option<ImagePayload>)>>,
    calls: AtomicUsize,
    latency: Duration,
}

impl ScriptedBackend {
    pub fn new(replies: Vec<Result<AgentResponse, MedicoreError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            sent: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            latency: Duration::ZERO,
        }
    }

    /// Hold each dispatch open for `latency`
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn sent(&self) -> Vec<(String, Option<ImagePayload>)> {
        self.sent.lock().unwrap().clone()
    }
}

/// A bare response for `category`
pub fn reply(category: AgentCategory, content: &str) -> AgentResponse {
    AgentResponse {
        category,
        reasoning: format!("Routed to {}", category),
        content: content.to_string(),
        payload: None,
        timestamp: Local::now(),
    }
}

#[async_trait]
impl AgentBackend for ScriptedBackend {
    async fn dispatch(
        &self,
        text: &str,
        image: Option<&ImagePayload>,
    ) -> Result<AgentResponse, MedicoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.sent
            .lock()
            .unwrap()
            .push((text.to_string(), image.cloned()));

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(MedicoreError::Network("script exhausted".to_string())))
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
