//! Configuration loading for Scholara.
//! Reads scholara.toml from the current directory or the path in the
//! SCHOLARA_CONFIG env var. API keys may come from the file or from the
//! environment (a `.env` file is loaded first by the binary).

use std::collections::HashMap;
use std::path::Path;

use secrecy::SecretString;
use serde::Deserialize;

use scholara_llm::router::{BackendConfig, BackendKind, RoutingPolicy};
use scholara_llm::{AnalystOptions, LlmTask};

pub const OPENAI_KEY_ENV: &str = "SCHOLARA_OPENAI_API_KEY";
pub const ANTHROPIC_KEY_ENV: &str = "SCHOLARA_ANTHROPIC_API_KEY";
pub const COMPAT_KEY_ENV: &str = "SCHOLARA_COMPAT_API_KEY";
pub const CORE_KEY_ENV: &str = "SCHOLARA_CORE_API_KEY";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub literature: LiteratureConfig,
    pub funding: FundingConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16    { 3001 }

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: default_host(), port: default_port() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_backend_name")]
    pub default_backend: String,
    #[serde(default)]
    pub local_only: bool,
    #[serde(default = "default_local_backend")]
    pub local_backend: String,
    /// Task name (`summarize`, `hypothesize`, `verify_claim`) → backend name.
    #[serde(default)]
    pub task_backends: HashMap<String, String>,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Accept the older free-text layout when a completion has no JSON.
    #[serde(default = "bool_true")]
    pub legacy_text_fallback: bool,
    #[serde(default = "default_backends")]
    pub backends: Vec<LlmBackendEntry>,
}

fn default_backend_name()  -> String { "openai".to_string() }
fn default_local_backend() -> String { "ollama".to_string() }
fn default_temperature()   -> f32    { 0.7 }
fn default_max_tokens()    -> u32    { 2048 }
fn bool_true()             -> bool   { true }

fn default_backends() -> Vec<LlmBackendEntry> {
    vec![LlmBackendEntry {
        name: "openai".to_string(),
        kind: LlmBackendKind::OpenAi,
        model: "gpt-4o-mini".to_string(),
        base_url: None,
        api_key: None,
    }]
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            default_backend: default_backend_name(),
            local_only: false,
            local_backend: default_local_backend(),
            task_backends: HashMap::new(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            legacy_text_fallback: true,
            backends: default_backends(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LlmBackendKind {
    #[serde(rename = "openai")]
    OpenAi,
    #[serde(rename = "openai_compatible")]
    OpenAiCompatible,
    Ollama,
    Anthropic,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmBackendEntry {
    pub name: String,
    pub kind: LlmBackendKind,
    pub model: String,
    #[serde(default)]
    pub base_url: Option<String>,
    /// Falls back to the kind's environment variable when absent.
    #[serde(default)]
    pub api_key: Option<String>,
}

fn secret(value: Option<&String>, env_var: Option<&str>) -> Option<SecretString> {
    value
        .cloned()
        .or_else(|| env_var.and_then(|v| std::env::var(v).ok()))
        .filter(|v| !v.trim().is_empty())
        .map(SecretString::from)
}

fn parse_task(name: &str) -> Option<LlmTask> {
    match name {
        "summarize" | "summary" => Some(LlmTask::Summarize),
        "hypothesize" | "hypotheses" => Some(LlmTask::Hypothesize),
        "verify_claim" | "verify" => Some(LlmTask::VerifyClaim),
        _ => None,
    }
}

impl LlmConfig {
    pub fn routing_policy(&self) -> anyhow::Result<RoutingPolicy> {
        let mut task_backends = HashMap::new();
        for (task, backend) in &self.task_backends {
            let Some(task) = parse_task(task) else {
                anyhow::bail!("Unknown LLM task '{}' in [llm.task_backends]", task);
            };
            task_backends.insert(task, backend.clone());
        }
        Ok(RoutingPolicy {
            local_only_mode: self.local_only,
            default_backend: self.default_backend.clone(),
            local_backend: self.local_backend.clone(),
            task_backends,
        })
    }

    pub fn backend_configs(&self) -> Vec<BackendConfig> {
        self.backends
            .iter()
            .map(|b| {
                let (kind, key_env) = match b.kind {
                    LlmBackendKind::OpenAi => (BackendKind::OpenAi, Some(OPENAI_KEY_ENV)),
                    LlmBackendKind::OpenAiCompatible => (BackendKind::OpenAiCompatible, Some(COMPAT_KEY_ENV)),
                    LlmBackendKind::Ollama => (BackendKind::Ollama, None),
                    LlmBackendKind::Anthropic => (BackendKind::Anthropic, Some(ANTHROPIC_KEY_ENV)),
                };
                BackendConfig {
                    name: b.name.clone(),
                    kind,
                    model: b.model.clone(),
                    api_key: secret(b.api_key.as_ref(), key_env),
                    base_url: b.base_url.clone(),
                }
            })
            .collect()
    }

    pub fn analyst_options(&self) -> AnalystOptions {
        AnalystOptions {
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            legacy_text_fallback: self.legacy_text_fallback,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum LiteratureSourceKind {
    #[serde(rename = "core")]
    Core,
    #[serde(rename = "crossref")]
    CrossRef,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LiteratureConfig {
    #[serde(default = "default_source")]
    pub source: LiteratureSourceKind,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    #[serde(default = "bool_true")]
    pub fetch_full_text: bool,
    #[serde(default)]
    pub base_url: Option<String>,
    /// Contact address sent to CrossRef's polite pool.
    #[serde(default)]
    pub crossref_mailto: Option<String>,
    #[serde(default)]
    pub core_api_key: Option<String>,
}

fn default_source()      -> LiteratureSourceKind { LiteratureSourceKind::Core }
fn default_max_results() -> usize                { 10 }

impl Default for LiteratureConfig {
    fn default() -> Self {
        Self {
            source: default_source(),
            max_results: default_max_results(),
            fetch_full_text: true,
            base_url: None,
            crossref_mailto: None,
            core_api_key: None,
        }
    }
}

impl LiteratureConfig {
    pub fn core_key(&self) -> Option<SecretString> {
        secret(self.core_api_key.as_ref(), Some(CORE_KEY_ENV))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FundingConfig {
    /// Matches scoring below this (0–100) are dropped.
    #[serde(default)]
    pub min_match_score: u8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    /// Hosts added to the outbound allowlist.
    #[serde(default)]
    pub allowed_domains: Vec<String>,
    #[serde(default = "default_audit_capacity")]
    pub audit_capacity: usize,
}

fn default_audit_capacity() -> usize { 1000 }

impl Default for SecurityConfig {
    fn default() -> Self {
        Self { allowed_domains: Vec::new(), audit_capacity: default_audit_capacity() }
    }
}


impl Config {
    /// Load configuration from scholara.toml.
    /// Checks SCHOLARA_CONFIG env var first, then current directory.
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("SCHOLARA_CONFIG")
            .unwrap_or_else(|_| "scholara.toml".to_string());

        if !Path::new(&path).exists() {
            anyhow::bail!(
                "Config file not found: {}\n\
                 Copy scholara.example.toml to scholara.toml and edit it.",
                path
            );
        }

        let content = std::fs::read_to_string(&path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.llm.routing_policy()?;
        Ok(config)
    }
}
