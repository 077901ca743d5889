//! Shared application state for the web server.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{info, warn};

use scholara_common::sandbox::SandboxClient;
use scholara_common::{seed, IdGenerator};
use scholara_ingestion::sources::core::CoreClient;
use scholara_ingestion::sources::crossref::CrossRefClient;
use scholara_ingestion::{LibraryOptions, LiteratureSource, ResearchLibrary};
use scholara_llm::router::build_router;
use scholara_llm::Analyst;
use scholara_store::{EntityStore, FundingMatcher, ResearchEvent, ResearchService};

use crate::config::{Config, LiteratureSourceKind};

/// Shared state injected into every Axum handler.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ResearchService>,
}

impl AppState {
    pub fn new(service: Arc<ResearchService>) -> Self {
        Self { service }
    }

    /// Wire the service from configuration: LLM backends, the literature
    /// source, and the seeded store.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let policy = config.llm.routing_policy()?;
        let router = build_router(config.llm.backend_configs(), policy)
            .with_audit_capacity(config.security.audit_capacity);
        if router.backend_names().is_empty() {
            warn!("No LLM backend is available; analysis operations will fail");
        }
        let analyst = Analyst::new(Arc::new(router), config.llm.analyst_options());

        let mut http = SandboxClient::new()?;
        for domain in &config.security.allowed_domains {
            http.allow_domain(domain);
        }

        let lit = &config.literature;
        let source: Arc<dyn LiteratureSource> = match (lit.source, lit.core_key()) {
            (LiteratureSourceKind::Core, Some(key)) => {
                let client = CoreClient::new(http, key);
                Arc::new(match &lit.base_url {
                    Some(url) => client.with_base_url(url),
                    None => client,
                })
            }
            (kind, _) => {
                if kind == LiteratureSourceKind::Core {
                    warn!("CORE selected but no API key is set; using CrossRef");
                }
                let mut client = CrossRefClient::new(http);
                if kind == LiteratureSourceKind::CrossRef {
                    if let Some(url) = &lit.base_url {
                        client = client.with_base_url(url);
                    }
                }
                if let Some(mailto) = &lit.crossref_mailto {
                    client = client.with_mailto(mailto);
                }
                Arc::new(client)
            }
        };
        info!(source = source.name(), "Literature source configured");

        let ids = Arc::new(IdGenerator::new());
        let library = ResearchLibrary::new(
            source,
            Arc::clone(&ids),
            LibraryOptions { max_results: lit.max_results, fetch_full_text: lit.fetch_full_text },
        );
        let matcher = FundingMatcher::new(seed::funding_opportunities(), config.funding.min_match_score);

        let service = ResearchService::new(EntityStore::from_seed(), analyst, library, matcher, ids);
        Ok(Self::new(Arc::new(service)))
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ResearchEvent> {
        self.service.subscribe()
    }
}

pub type SharedState = Arc<AppState>;
