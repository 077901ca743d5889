use reqwest::{Client, ClientBuilder};
use std::collections::HashSet;
use std::time::Duration;
use url::Url;
use crate::error::ScholaraError;

/// An HTTP client that only issues requests to approved hosts.
/// Literature and metadata clients go through this; anything else is refused
/// before a connection is attempted.
#[derive(Debug, Clone)]
pub struct SandboxClient {
    client: Client,
    allowlist: HashSet<String>,
}

/// Hosts every Scholara deployment needs.
pub const DEFAULT_ALLOWED_DOMAINS: &[&str] = &[
    "api.core.ac.uk",          // CORE literature search
    "core.ac.uk",              // CORE full-text downloads
    "api.crossref.org",        // CrossRef
    "doi.org",                 // DOI resolver
    "api.openai.com",          // OpenAI
    "api.anthropic.com",       // Anthropic
    "localhost",               // Ollama / local services
    "127.0.0.1",
];

impl SandboxClient {
    pub fn new() -> Result<Self, ScholaraError> {
        Self::with_timeout(Duration::from_secs(30))
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, ScholaraError> {
        let allowlist = DEFAULT_ALLOWED_DOMAINS.iter().map(|d| d.to_string()).collect();

        let client = ClientBuilder::new()
            .timeout(timeout)
            .user_agent(concat!("Scholara/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ScholaraError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, allowlist })
    }

    /// Appends an exact hostname to the allowlist.
    pub fn allow_domain(&mut self, domain: &str) {
        self.allowlist.insert(domain.to_string());
    }

    /// Validates if a URL is permitted under the current sandbox policy.
    pub fn is_allowed(&self, url: &str) -> bool {
        if let Ok(parsed) = Url::parse(url) {
            if let Some(host) = parsed.host_str() {
                // Exact match or a subdomain of an allowed domain
                return self
                    .allowlist
                    .iter()
                    .any(|allowed| host == allowed || host.ends_with(&format!(".{}", allowed)));
            }
        }
        false
    }

    fn check(&self, url: &str) -> Result<(), ScholaraError> {
        if self.is_allowed(url) {
            Ok(())
        } else {
            Err(ScholaraError::SecurityError(format!(
                "Network capabilities capped: domain not in allowlist for URL {}",
                url
            )))
        }
    }

    pub fn get(&self, url: &str) -> Result<reqwest::RequestBuilder, ScholaraError> {
        self.check(url)?;
        Ok(self.client.get(url))
    }

    pub fn post(&self, url: &str) -> Result<reqwest::RequestBuilder, ScholaraError> {
        self.check(url)?;
        Ok(self.client.post(url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_allowlist() {
        let c = SandboxClient::new().unwrap();
        assert!(c.is_allowed("https://api.core.ac.uk/v3/search/works"));
        assert!(c.is_allowed("http://localhost:11434/v1/chat/completions"));
        assert!(!c.is_allowed("https://evil.example.com/"));
        assert!(!c.is_allowed("not a url"));
    }

    #[test]
    fn test_subdomain_and_extension() {
        let mut c = SandboxClient::new().unwrap();
        assert!(c.is_allowed("https://www.doi.org/10.1/x"));
        assert!(c.get("https://library.example.org/x").is_err());
        c.allow_domain("library.example.org");
        assert!(c.get("https://library.example.org/x").is_ok());
    }

    #[test]
    fn test_refusal_is_a_security_error() {
        let c = SandboxClient::new().unwrap();
        let err = c.post("https://evil.example.com/upload").unwrap_err();
        assert!(matches!(err, ScholaraError::SecurityError(_)));
        assert!(err.to_string().contains("evil.example.com"));
    }
}
