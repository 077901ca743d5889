//! LLM router. Selects a backend per research task and audits every call.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::audit::{AuditLog, LlmAuditEntry};
use crate::backend::{
    AnthropicBackend, LlmBackend, LlmError, LlmRequest, LlmResponse, OllamaBackend,
    OpenAiBackend, OpenAiCompatibleBackend,
};

/// The three purposes the language model serves. They share one request
/// shape; the task only drives routing and auditing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LlmTask {
    Summarize,
    Hypothesize,
    VerifyClaim,
}

impl LlmTask {
    pub fn as_str(&self) -> &'static str {
        match self {
            LlmTask::Summarize   => "summarize",
            LlmTask::Hypothesize => "hypothesize",
            LlmTask::VerifyClaim => "verify_claim",
        }
    }
}

/// Routing policy controlling which backend serves each task.
#[derive(Debug, Clone)]
pub struct RoutingPolicy {
    /// If true, every call goes to `local_backend`.
    pub local_only_mode: bool,
    /// Backend name used when no task override applies.
    pub default_backend: String,
    /// Backend name used in local-only mode.
    pub local_backend: String,
    /// Per-task backend names, e.g. a cheaper model for summaries.
    pub task_backends: HashMap<LlmTask, String>,
}

impl Default for RoutingPolicy {
    fn default() -> Self {
        Self {
            local_only_mode: false,
            default_backend: "openai".to_string(),
            local_backend: "ollama".to_string(),
            task_backends: HashMap::new(),
        }
    }
}

/// Routes LLM requests to backends by task.
pub struct LlmRouter {
    backends: HashMap<String, Arc<dyn LlmBackend>>,
    policy: RoutingPolicy,
    audit: AuditLog,
}

impl LlmRouter {
    pub fn new(policy: RoutingPolicy) -> Self {
        Self { backends: HashMap::new(), policy, audit: AuditLog::default() }
    }

    pub fn with_audit_capacity(mut self, capacity: usize) -> Self {
        self.audit = AuditLog::new(capacity);
        self
    }

    pub fn register_backend(&mut self, name: impl Into<String>, backend: Arc<dyn LlmBackend>) {
        self.backends.insert(name.into(), backend);
    }

    pub fn backend_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.backends.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn audit(&self) -> &AuditLog {
        &self.audit
    }

    /// Route a request: select the backend for `task`, execute, audit.
    pub async fn route(&self, task: LlmTask, req: LlmRequest) -> Result<LlmResponse, LlmError> {
        let (name, backend) = self.select_backend(task)?;

        tracing::info!(
            task = task.as_str(),
            backend = name,
            model = backend.model_id(),
            is_local = backend.is_local(),
            "LLM request routed"
        );

        let t0 = Instant::now();
        let result = backend.complete(req).await;
        let latency_ms = t0.elapsed().as_millis() as u64;

        let entry = match &result {
            Ok(resp) => LlmAuditEntry::new(
                task.as_str().to_string(),
                resp.model.clone(),
                name.to_string(),
                resp.prompt_tokens,
                resp.completion_tokens,
                &resp.content,
                latency_ms,
                true,
            ),
            Err(e) => {
                tracing::warn!(task = task.as_str(), backend = name, error = %e, "LLM request failed");
                LlmAuditEntry::new(
                    task.as_str().to_string(),
                    backend.model_id().to_string(),
                    name.to_string(),
                    0,
                    0,
                    "",
                    latency_ms,
                    false,
                )
            }
        };
        self.audit.record(entry);

        result
    }

    fn select_backend(&self, task: LlmTask) -> Result<(&str, &Arc<dyn LlmBackend>), LlmError> {
        if self.policy.local_only_mode {
            let name = self.policy.local_backend.as_str();
            let b = self.backends.get(name).ok_or_else(|| {
                LlmError::Unavailable("Local backend not configured".to_string())
            })?;
            if !b.is_local() {
                return Err(LlmError::PolicyBlocked(format!(
                    "local-only mode but backend '{}' is remote",
                    name
                )));
            }
            return Ok((name, b));
        }

        let name = self
            .policy
            .task_backends
            .get(&task)
            .map(String::as_str)
            .unwrap_or(self.policy.default_backend.as_str());

        self.backends
            .get(name)
            .map(|b| (name, b))
            .ok_or_else(|| LlmError::Unavailable(format!("Backend '{}' not configured", name)))
    }
}

// ── Construction from configuration ──────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    OpenAi,
    OpenAiCompatible,
    Ollama,
    Anthropic,
}

#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub name: String,
    pub kind: BackendKind,
    pub model: String,
    pub api_key: Option<SecretString>,
    pub base_url: Option<String>,
}

/// Build a router from backend descriptions. Backends that need a key and
/// have none are skipped with a warning.
pub fn build_router(configs: Vec<BackendConfig>, policy: RoutingPolicy) -> LlmRouter {
    let mut router = LlmRouter::new(policy);

    for cfg in configs {
        let backend: Arc<dyn LlmBackend> = match cfg.kind {
            BackendKind::OpenAi => {
                let Some(key) = cfg.api_key else {
                    tracing::warn!(backend = %cfg.name, "OpenAI backend has no API key; skipped");
                    continue;
                };
                let b = OpenAiBackend::new(key, cfg.model);
                match cfg.base_url {
                    Some(url) => Arc::new(b.with_base_url(url)),
                    None => Arc::new(b),
                }
            }
            BackendKind::Anthropic => {
                let Some(key) = cfg.api_key else {
                    tracing::warn!(backend = %cfg.name, "Anthropic backend has no API key; skipped");
                    continue;
                };
                let b = AnthropicBackend::new(key, cfg.model);
                match cfg.base_url {
                    Some(url) => Arc::new(b.with_base_url(url)),
                    None => Arc::new(b),
                }
            }
            BackendKind::OpenAiCompatible => {
                let Some(url) = cfg.base_url else {
                    tracing::warn!(backend = %cfg.name, "OpenAI-compatible backend has no base_url; skipped");
                    continue;
                };
                Arc::new(OpenAiCompatibleBackend::new(url, cfg.model, cfg.api_key))
            }
            BackendKind::Ollama => {
                let url = cfg.base_url.unwrap_or_else(|| "http://localhost:11434".to_string());
                Arc::new(OllamaBackend::new(url, cfg.model))
            }
        };
        tracing::debug!(backend = %cfg.name, model = backend.model_id(), "LLM backend registered");
        router.register_backend(cfg.name, backend);
    }

    router
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct Fixed {
        model: &'static str,
        local: bool,
    }

    #[async_trait]
    impl LlmBackend for Fixed {
        async fn complete(&self, _req: LlmRequest) -> Result<LlmResponse, LlmError> {
            Ok(LlmResponse {
                content: format!("from {}", self.model),
                model: self.model.to_string(),
                prompt_tokens: 1,
                completion_tokens: 2,
            })
        }
        fn model_id(&self) -> &str { self.model }
        fn is_local(&self) -> bool { self.local }
        fn max_context_tokens(&self) -> usize { 1024 }
    }

    fn router(policy: RoutingPolicy) -> LlmRouter {
        let mut r = LlmRouter::new(policy);
        r.register_backend("openai", Arc::new(Fixed { model: "gpt-4", local: false }));
        r.register_backend("ollama", Arc::new(Fixed { model: "llama3", local: true }));
        r
    }

    #[tokio::test]
    async fn test_task_override_wins() {
        let mut policy = RoutingPolicy::default();
        policy.task_backends.insert(LlmTask::Summarize, "ollama".into());
        let r = router(policy);

        let s = r.route(LlmTask::Summarize, LlmRequest::prompt("x")).await.unwrap();
        let h = r.route(LlmTask::Hypothesize, LlmRequest::prompt("x")).await.unwrap();
        assert_eq!(s.model, "llama3");
        assert_eq!(h.model, "gpt-4");
    }

    #[tokio::test]
    async fn test_calls_are_audited() {
        let r = router(RoutingPolicy::default());
        r.route(LlmTask::VerifyClaim, LlmRequest::prompt("x")).await.unwrap();
        let entries = r.audit().recent(5);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].task, "verify_claim");
        assert_eq!(entries[0].backend, "openai");
        assert!(entries[0].succeeded);
    }

    #[tokio::test]
    async fn test_local_only_rejects_remote_local_backend() {
        let policy = RoutingPolicy {
            local_only_mode: true,
            local_backend: "openai".into(),
            ..Default::default()
        };
        let r = router(policy);
        assert!(matches!(
            r.route(LlmTask::Summarize, LlmRequest::prompt("x")).await,
            Err(LlmError::PolicyBlocked(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_backend_is_unavailable() {
        let r = LlmRouter::new(RoutingPolicy::default());
        assert!(matches!(
            r.route(LlmTask::Summarize, LlmRequest::prompt("x")).await,
            Err(LlmError::Unavailable(_))
        ));
    }

    #[test]
    fn test_build_router_skips_keyless_remote() {
        let r = build_router(
            vec![
                BackendConfig {
                    name: "openai".into(),
                    kind: BackendKind::OpenAi,
                    model: "gpt-4".into(),
                    api_key: None,
                    base_url: None,
                },
                BackendConfig {
                    name: "ollama".into(),
                    kind: BackendKind::Ollama,
                    model: "llama3:8b".into(),
                    api_key: None,
                    base_url: None,
                },
            ],
            RoutingPolicy::default(),
        );
        assert_eq!(r.backend_names(), vec!["ollama"]);
    }
}
