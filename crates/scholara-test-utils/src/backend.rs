use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use scholara_llm::backend::{LlmBackend, LlmError, LlmRequest, LlmResponse};

enum Reply {
    Text(String),
    Fail(String),
    Gated(String, Arc<Notify>),
}

/// An `LlmBackend` that answers from a queue of scripted replies and
/// remembers every prompt it was sent. An exhausted queue answers with
/// `LlmError::Unavailable`.
pub struct ScriptedBackend {
    model: String,
    replies: Mutex<VecDeque<Reply>>,
    prompts: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self {
            model: "scripted".to_string(),
            replies: Mutex::new(VecDeque::new()),
            prompts: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_reply(self, text: impl Into<String>) -> Self {
        self.push_reply(text);
        self
    }

    pub fn push_reply(&self, text: impl Into<String>) {
        self.replies.lock().unwrap().push_back(Reply::Text(text.into()));
    }

    pub fn push_failure(&self, message: impl Into<String>) {
        self.replies.lock().unwrap().push_back(Reply::Fail(message.into()));
    }

    /// Queue a reply that is held back until the returned gate is notified.
    pub fn push_gated_reply(&self, text: impl Into<String>) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.replies.lock().unwrap().push_back(Reply::Gated(text.into(), Arc::clone(&gate)));
        gate
    }

    /// Number of `complete` calls that have started.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    /// Wait until at least `n` calls have started.
    pub async fn wait_for_calls(&self, n: usize) {
        while self.calls() < n {
            tokio::task::yield_now().await;
        }
    }
}

impl Default for ScriptedBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LlmBackend for ScriptedBackend {
    async fn complete(&self, req: LlmRequest) -> Result<LlmResponse, LlmError> {
        let prompt = req.messages.iter().map(|m| m.content.as_str()).collect::<Vec<_>>().join("\n");
        self.prompts.lock().unwrap().push(prompt);
        let reply = self.replies.lock().unwrap().pop_front();
        self.calls.fetch_add(1, Ordering::SeqCst);

        let content = match reply {
            Some(Reply::Text(t)) => t,
            Some(Reply::Fail(msg)) => return Err(LlmError::ApiError { status: 503, message: msg }),
            Some(Reply::Gated(t, gate)) => {
                gate.notified().await;
                t
            }
            None => return Err(LlmError::Unavailable("scripted replies exhausted".to_string())),
        };

        Ok(LlmResponse {
            content,
            model: self.model.clone(),
            prompt_tokens: 0,
            completion_tokens: 0,
        })
    }

    fn model_id(&self) -> &str {
        &self.model
    }

    fn is_local(&self) -> bool {
        true
    }

    fn max_context_tokens(&self) -> usize {
        128_000
    }
}
