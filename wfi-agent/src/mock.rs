//! A scripted [`Llm`] for tests.

use std::collections::VecDeque;

use async_trait::async_trait;
use tokio::sync::Mutex;
use wfi_core::{ChatRequest, ChatResponse, CoreError, Llm};

/// An [`Llm`] that replays a fixed script of responses.
///
/// Each call to [`chat`](Llm::chat) pops the next scripted entry. Running
/// past the end of the script fails with [`CoreError::Llm`]. Requests are
/// recorded and can be inspected with [`requests`](MockLlm::requests).
pub struct MockLlm {
    script: Mutex<VecDeque<wfi_core::Result<ChatResponse>>>,
    seen: Mutex<Vec<ChatRequest>>,
}

impl MockLlm {
    /// Create a mock replaying the given responses in order.
    pub fn new(script: Vec<wfi_core::Result<ChatResponse>>) -> Self {
        Self { script: Mutex::new(script.into()), seen: Mutex::new(Vec::new()) }
    }

    /// A mock scripted with a single plain-text response.
    pub fn text(text: impl Into<String>) -> Self {
        Self::new(vec![Ok(ChatResponse { content: text.into(), tool_calls: Vec::new() })])
    }

    /// The requests this mock has received so far.
    pub async fn requests(&self) -> Vec<ChatRequest> {
        self.seen.lock().await.clone()
    }
}

#[async_trait]
impl Llm for MockLlm {
    fn name(&self) -> &str {
        "mock"
    }

    async fn chat(&self, request: ChatRequest) -> wfi_core::Result<ChatResponse> {
        self.seen.lock().await.push(request);
        match self.script.lock().await.pop_front() {
            Some(response) => response,
            None => Err(CoreError::Llm {
                provider: "mock".into(),
                message: "script exhausted".into(),
            }),
        }
    }
}
