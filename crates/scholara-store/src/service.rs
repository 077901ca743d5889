//! Research operations over the entity store.
//!
//! Every network-backed operation follows the same lifecycle: mark its own
//! status loading and take a request token, read its inputs, release the
//! lock, call the adapter, then re-take the lock and apply the result only
//! if no newer request for the same key has started.
//!
//! Operations on an existing entity look it up before taking a token. A
//! request for a missing paper or claim fails without touching the status
//! board, so client-chosen ids cannot grow it.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, error, info, instrument};

use scholara_common::{
    Claim, Evidence, FundingOpportunity, Hypothesis, IdGenerator, Paper, PaperDraft, SearchFilters,
    VerificationStatus,
};
use scholara_ingestion::dedup::normalise_doi;
use scholara_ingestion::{search_local, ResearchLibrary};
use scholara_llm::audit::LlmAuditEntry;
use scholara_llm::{AnalysisError, Analyst};

use crate::epoch::{RequestEpochs, RequestToken};
use crate::events::ResearchEvent;
use crate::funding::{filter_funding, FundingMatcher, FundingQuery};
use crate::graph::{hypothesis_graph, paper_mind_map};
use crate::status::{
    FailureCause, OperationError, OperationKey, OperationKind, OperationOutcome, OperationStatus,
    StatusBoard, StatusEntry,
};
use crate::store::{EntityStore, StoreError, StoreSnapshot};

pub const DEFAULT_HYPOTHESIS_CONFIDENCE: f64 = 0.85;
pub const DEFAULT_EVIDENCE_CONFIDENCE: f64 = 0.8;
pub const VERIFICATION_SOURCE: &str = "Literature Analysis";

const EVENT_CAPACITY: usize = 256;

pub type OperationResult<T> = Result<OperationOutcome<T>, OperationError>;

#[derive(Debug, Default)]
struct ResearchState {
    store: EntityStore,
    epochs: RequestEpochs,
    status: StatusBoard,
}

pub struct ResearchService {
    state: RwLock<ResearchState>,
    analyst: Analyst,
    library: ResearchLibrary,
    matcher: FundingMatcher,
    ids: Arc<IdGenerator>,
    events: broadcast::Sender<ResearchEvent>,
}

fn analysis_error(kind: OperationKind, e: AnalysisError) -> OperationError {
    let cause = match e {
        AnalysisError::Llm(_) => FailureCause::ServiceUnavailable,
        AnalysisError::Parse(_) => FailureCause::MalformedResponse,
    };
    OperationError::new(kind, cause, e.to_string())
}

fn store_error(kind: OperationKind, e: StoreError) -> OperationError {
    let cause = match e {
        StoreError::NotFound { .. } => FailureCause::NotFound,
        StoreError::Duplicate { .. } | StoreError::Orphan { .. } => FailureCause::Integrity,
    };
    OperationError::new(kind, cause, e.to_string())
}

fn not_found(kind: OperationKind, what: &str, id: &str) -> OperationError {
    OperationError::new(kind, FailureCause::NotFound, format!("{what} '{id}' not found"))
}

impl ResearchService {
    pub fn new(
        store: EntityStore,
        analyst: Analyst,
        library: ResearchLibrary,
        matcher: FundingMatcher,
        ids: Arc<IdGenerator>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            state: RwLock::new(ResearchState { store, ..Default::default() }),
            analyst,
            library,
            matcher,
            ids,
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ResearchEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: ResearchEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    // ── Lifecycle ───────────────────────────────────────────────────────────

    async fn begin(&self, key: OperationKey) -> RequestToken {
        let mut state = self.state.write().await;
        state.status.set(key.clone(), OperationStatus::Loading { since: Utc::now() });
        state.epochs.begin(key)
    }

    /// Record a failure and hand the error back. A stale request leaves the
    /// status alone; the newer request owns it.
    async fn fail<T>(&self, token: &RequestToken, err: OperationError) -> Result<T, OperationError> {
        {
            let mut state = self.state.write().await;
            if state.epochs.is_current(token) {
                state.status.set(token.key().clone(), OperationStatus::failed(&err));
                state.epochs.finish(token);
            }
        }
        self.reject(token.key().target.as_deref().unwrap_or("-"), err)
    }

    /// Log and broadcast a failure. Called directly when the target is
    /// missing, before any request token is taken.
    fn reject<T>(&self, target: &str, err: OperationError) -> Result<T, OperationError> {
        error!(
            operation = err.kind.as_str(),
            target = target,
            cause = ?err.cause,
            error = %err.detail,
            "{}",
            err.message
        );
        self.emit(ResearchEvent::OperationFailed { operation: err.kind, message: err.message, cause: err.cause });
        Err(err)
    }

    /// Apply a result under the write lock if `token` is still current.
    async fn commit<T>(
        &self,
        token: &RequestToken,
        apply: impl FnOnce(&mut EntityStore) -> Result<(T, Vec<ResearchEvent>), OperationError>,
    ) -> OperationResult<T> {
        let mut state = self.state.write().await;
        if !state.epochs.is_current(token) {
            debug!(
                operation = token.key().kind.as_str(),
                target = token.key().target.as_deref().unwrap_or("-"),
                "Discarding response from a superseded request"
            );
            return Ok(OperationOutcome::Superseded);
        }
        match apply(&mut state.store) {
            Ok((value, events)) => {
                state.status.set(token.key().clone(), OperationStatus::Succeeded { at: Utc::now() });
                state.epochs.finish(token);
                drop(state);
                for event in events {
                    self.emit(event);
                }
                Ok(OperationOutcome::Applied(value))
            }
            Err(err) => {
                drop(state);
                self.fail(token, err).await
            }
        }
    }

    async fn read_paper(&self, kind: OperationKind, id: &str) -> Result<Paper, OperationError> {
        self.state
            .read()
            .await
            .store
            .paper(id)
            .cloned()
            .ok_or_else(|| not_found(kind, "paper", id))
    }

    // ── Papers ──────────────────────────────────────────────────────────────

    /// Create a paper from the upload form, attach full text when the
    /// literature service has it, and select it.
    #[instrument(skip(self, draft))]
    pub async fn upload_paper(&self, draft: PaperDraft) -> OperationResult<Paper> {
        const KIND: OperationKind = OperationKind::UploadPaper;
        let id = self.ids.next_id();
        let token = self.begin(OperationKey::new(KIND, id.clone())).await;

        let paper = draft.into_paper(id, Utc::now());
        let paper = self.library.enrich(paper).await;

        self.commit(&token, |store| {
            store.insert_paper(paper.clone()).map_err(|e| store_error(KIND, e))?;
            store.set_current_paper(Some(&paper.id)).map_err(|e| store_error(KIND, e))?;
            info!(paper_id = %paper.id, title = %paper.title, "Paper uploaded");
            let events = vec![
                ResearchEvent::PaperAdded { paper_id: paper.id.clone(), title: paper.title.clone() },
                ResearchEvent::CurrentPaperChanged { paper_id: Some(paper.id.clone()) },
            ];
            Ok((paper, events))
        })
        .await
    }

    /// Import a paper by DOI and select it. A DOI already held selects the
    /// existing paper instead of adding a second copy.
    #[instrument(skip(self))]
    pub async fn add_paper_by_doi(&self, doi: &str) -> OperationResult<Paper> {
        const KIND: OperationKind = OperationKind::AddPaperByDoi;
        let token = self.begin(OperationKey::new(KIND, normalise_doi(doi))).await;

        let paper = match self.library.import_doi(doi).await {
            Ok(Some(p)) => p,
            Ok(None) => return self.fail(&token, not_found(KIND, "DOI", doi)).await,
            Err(e) => {
                return self
                    .fail(&token, OperationError::new(KIND, FailureCause::ServiceUnavailable, format!("{e:#}")))
                    .await
            }
        };

        self.commit(&token, |store| {
            let added = store.merge_papers(vec![paper.clone()]);
            let wanted = paper.doi.as_deref().map(normalise_doi);
            let held = store
                .papers()
                .iter()
                .find(|p| p.id == paper.id || (wanted.is_some() && p.doi.as_deref().map(normalise_doi) == wanted))
                .cloned()
                .ok_or_else(|| not_found(KIND, "paper", &paper.id))?;
            store.set_current_paper(Some(&held.id)).map_err(|e| store_error(KIND, e))?;

            let mut events = Vec::new();
            if added > 0 {
                events.push(ResearchEvent::PaperAdded { paper_id: held.id.clone(), title: held.title.clone() });
            }
            events.push(ResearchEvent::CurrentPaperChanged { paper_id: Some(held.id.clone()) });
            Ok((held, events))
        })
        .await
    }

    /// Remote literature search. Results not already held are appended to
    /// the paper collection; the search results themselves are returned.
    #[instrument(skip(self, filters))]
    pub async fn search_papers(&self, query: &str, filters: &SearchFilters) -> OperationResult<Vec<Paper>> {
        const KIND: OperationKind = OperationKind::SearchPapers;
        let token = self.begin(OperationKey::global(KIND)).await;

        let found = match self.library.search(query, filters).await {
            Ok(found) => found,
            Err(e) => {
                return self
                    .fail(&token, OperationError::new(KIND, FailureCause::ServiceUnavailable, format!("{e:#}")))
                    .await
            }
        };

        let query = query.to_string();
        self.commit(&token, move |store| {
            let added = store.merge_papers(found.clone());
            let events = if added > 0 { vec![ResearchEvent::PapersMerged { added, query }] } else { Vec::new() };
            Ok((found, events))
        })
        .await
    }

    pub async fn select_paper(&self, id: Option<&str>) -> Result<(), StoreError> {
        self.state.write().await.store.set_current_paper(id)?;
        self.emit(ResearchEvent::CurrentPaperChanged { paper_id: id.map(String::from) });
        Ok(())
    }

    /// Rank held papers against a query (title hits weigh double).
    pub async fn search_local(&self, query: &str) -> Vec<Paper> {
        let state = self.state.read().await;
        search_local(state.store.papers(), query).into_iter().cloned().collect()
    }

    // ── Analysis ────────────────────────────────────────────────────────────

    /// Summarise a paper: writes summary, key findings and mind map, and
    /// selects the paper.
    #[instrument(skip(self))]
    pub async fn generate_summary(&self, paper_id: &str) -> OperationResult<Paper> {
        const KIND: OperationKind = OperationKind::GenerateSummary;
        let paper = match self.read_paper(KIND, paper_id).await {
            Ok(p) => p,
            Err(e) => return self.reject(paper_id, e),
        };
        let token = self.begin(OperationKey::new(KIND, paper_id)).await;

        let parsed = match self.analyst.summarize(&paper).await {
            Ok(p) => p,
            Err(e) => return self.fail(&token, analysis_error(KIND, e)).await,
        };
        debug!(format = ?parsed.format, "Summary parsed");
        let draft = parsed.value;

        self.commit(&token, |store| {
            let current = store.paper(paper_id).cloned().ok_or_else(|| not_found(KIND, "paper", paper_id))?;
            let mut updated = Paper {
                summary: Some(draft.summary),
                key_findings: Some(draft.key_findings),
                ..current
            };
            updated.mind_map = Some(paper_mind_map(&updated));
            store.replace_paper(updated.clone()).map_err(|e| store_error(KIND, e))?;
            store.set_current_paper(Some(paper_id)).map_err(|e| store_error(KIND, e))?;

            let findings = updated.key_findings.as_ref().map_or(0, Vec::len);
            let events = vec![
                ResearchEvent::SummaryGenerated { paper_id: paper_id.to_string(), key_findings: findings },
                ResearchEvent::CurrentPaperChanged { paper_id: Some(paper_id.to_string()) },
            ];
            Ok((updated, events))
        })
        .await
    }

    /// Generate hypotheses for a paper and append them.
    #[instrument(skip(self))]
    pub async fn generate_hypothesis(&self, paper_id: &str) -> OperationResult<Vec<Hypothesis>> {
        const KIND: OperationKind = OperationKind::GenerateHypothesis;
        let paper = match self.read_paper(KIND, paper_id).await {
            Ok(p) => p,
            Err(e) => return self.reject(paper_id, e),
        };
        let token = self.begin(OperationKey::new(KIND, paper_id)).await;

        let drafts = match self.analyst.hypothesize(&paper).await {
            Ok(p) => p.value,
            Err(e) => return self.fail(&token, analysis_error(KIND, e)).await,
        };

        let millis = self.ids.next_millis();
        let now = Utc::now();
        let batch: Vec<Hypothesis> = drafts
            .into_iter()
            .enumerate()
            .map(|(i, d)| {
                let evidence = d
                    .evidence
                    .into_iter()
                    .enumerate()
                    .map(|(j, e)| {
                        Evidence::new(
                            format!("ev-{i}-{j}"),
                            e.text,
                            e.source.unwrap_or_else(|| paper.title.clone()),
                            e.confidence.unwrap_or(DEFAULT_EVIDENCE_CONFIDENCE),
                        )
                    })
                    .collect();
                let mut h = Hypothesis {
                    id: format!("hyp-{millis}-{i}"),
                    paper_id: paper.id.clone(),
                    statement: d.statement,
                    confidence: d.confidence.unwrap_or(DEFAULT_HYPOTHESIS_CONFIDENCE),
                    supporting_evidence: evidence,
                    knowledge_graph_data: None,
                    generated: now,
                };
                h.knowledge_graph_data = Some(hypothesis_graph(&h, &paper));
                h
            })
            .collect();

        self.commit(&token, |store| {
            store.insert_hypotheses(batch.clone()).map_err(|e| store_error(KIND, e))?;
            info!(paper_id, n = batch.len(), "Hypotheses generated");
            let events = vec![ResearchEvent::HypothesesGenerated {
                paper_id: paper_id.to_string(),
                hypothesis_ids: batch.iter().map(|h| h.id.clone()).collect(),
            }];
            Ok((batch, events))
        })
        .await
    }

    /// Record a new, unverified claim against a hypothesis.
    #[instrument(skip(self, statement))]
    pub async fn add_claim(&self, hypothesis_id: &str, statement: &str) -> Result<Claim, OperationError> {
        const KIND: OperationKind = OperationKind::AddClaim;
        let statement = statement.trim();
        if statement.is_empty() {
            let err = OperationError::new(KIND, FailureCause::Integrity, "claim statement is empty");
            return self.reject(hypothesis_id, err);
        }
        if self.state.read().await.store.hypothesis(hypothesis_id).is_none() {
            let err = OperationError::new(
                KIND,
                FailureCause::Integrity,
                format!("hypothesis '{hypothesis_id}' does not exist"),
            );
            return self.reject(hypothesis_id, err);
        }

        // Keyed by the fresh claim id: concurrent adds never supersede each other.
        let id = format!("claim-{}", self.ids.next_millis());
        let token = self.begin(OperationKey::new(KIND, id.clone())).await;
        let claim = Claim {
            id,
            hypothesis_id: hypothesis_id.to_string(),
            statement: statement.to_string(),
            verification_status: VerificationStatus::Unverified,
            supporting_evidence: Vec::new(),
            confidence: 0.0,
            references: None,
        };

        self.commit(&token, |store| {
            store.insert_claim(claim.clone()).map_err(|e| store_error(KIND, e))?;
            let event = ResearchEvent::ClaimAdded {
                claim_id: claim.id.clone(),
                hypothesis_id: claim.hypothesis_id.clone(),
            };
            Ok((claim, vec![event]))
        })
        .await?
        .applied()
        .ok_or_else(|| OperationError::new(KIND, FailureCause::Integrity, "claim insert was superseded"))
    }

    /// Verify a claim: overwrites status, confidence and evidence. Id and
    /// hypothesis link are untouched.
    #[instrument(skip(self))]
    pub async fn verify_claim(&self, claim_id: &str) -> OperationResult<Claim> {
        const KIND: OperationKind = OperationKind::VerifyClaim;
        let claim = self.state.read().await.store.claim(claim_id).cloned();
        let Some(claim) = claim else {
            return self.reject(claim_id, not_found(KIND, "claim", claim_id));
        };
        let token = self.begin(OperationKey::new(KIND, claim_id)).await;

        let result = match self.analyst.verify(&claim).await {
            Ok(p) => p.value,
            Err(e) => return self.fail(&token, analysis_error(KIND, e)).await,
        };

        let millis = self.ids.next_millis();
        let evidence: Vec<Evidence> = result
            .evidence
            .into_iter()
            .enumerate()
            .map(|(j, e)| {
                Evidence::new(
                    format!("ev-{millis}-{j}"),
                    e.text,
                    e.source.unwrap_or_else(|| VERIFICATION_SOURCE.to_string()),
                    e.confidence.unwrap_or(DEFAULT_EVIDENCE_CONFIDENCE),
                )
            })
            .collect();

        self.commit(&token, |store| {
            let current = store.claim(claim_id).cloned().ok_or_else(|| not_found(KIND, "claim", claim_id))?;
            let updated = Claim {
                verification_status: result.status,
                confidence: scholara_common::confidence::clamp_unit(result.confidence),
                supporting_evidence: evidence,
                ..current
            };
            store.replace_claim(updated.clone()).map_err(|e| store_error(KIND, e))?;
            let event = ResearchEvent::ClaimVerified {
                claim_id: claim_id.to_string(),
                status: updated.verification_status,
                confidence: updated.confidence,
            };
            Ok((updated, vec![event]))
        })
        .await
    }

    // ── Funding ─────────────────────────────────────────────────────────────

    /// Rank the funding catalogue against a paper and replace the funding
    /// collection with the matches.
    #[instrument(skip(self))]
    pub async fn find_funding(&self, paper_id: &str) -> OperationResult<Vec<FundingOpportunity>> {
        const KIND: OperationKind = OperationKind::FindFunding;
        let paper = match self.read_paper(KIND, paper_id).await {
            Ok(p) => p,
            Err(e) => return self.reject(paper_id, e),
        };
        let token = self.begin(OperationKey::global(KIND)).await;

        let matches = self.matcher.rank(&paper);

        self.commit(&token, |store| {
            store.set_funding(matches.clone()).map_err(|e| store_error(KIND, e))?;
            let event = ResearchEvent::FundingMatched { paper_id: paper_id.to_string(), matches: matches.len() };
            Ok((matches, vec![event]))
        })
        .await
    }

    pub async fn filter_funding(&self, query: &FundingQuery) -> Vec<FundingOpportunity> {
        filter_funding(self.state.read().await.store.funding(), query)
    }

    // ── Reads ───────────────────────────────────────────────────────────────

    pub async fn snapshot(&self) -> StoreSnapshot {
        self.state.read().await.store.snapshot()
    }

    pub async fn paper(&self, id: &str) -> Option<Paper> {
        self.state.read().await.store.paper(id).cloned()
    }

    pub async fn papers(&self) -> Vec<Paper> {
        self.state.read().await.store.papers().to_vec()
    }

    /// `None` when the paper does not exist.
    pub async fn hypotheses_for(&self, paper_id: &str) -> Option<Vec<Hypothesis>> {
        let state = self.state.read().await;
        state.store.paper(paper_id)?;
        Some(state.store.hypotheses_for(paper_id).cloned().collect())
    }

    /// `None` when the hypothesis does not exist.
    pub async fn claims_for(&self, hypothesis_id: &str) -> Option<Vec<Claim>> {
        let state = self.state.read().await;
        state.store.hypothesis(hypothesis_id)?;
        Some(state.store.claims_for(hypothesis_id).cloned().collect())
    }

    pub async fn claim(&self, id: &str) -> Option<Claim> {
        self.state.read().await.store.claim(id).cloned()
    }

    pub async fn status(&self, key: &OperationKey) -> OperationStatus {
        self.state.read().await.status.get(key)
    }

    pub async fn statuses(&self) -> Vec<StatusEntry> {
        self.state.read().await.status.entries()
    }

    /// Operation keys with a request still in flight.
    pub async fn requests_in_flight(&self) -> usize {
        self.state.read().await.epochs.in_flight()
    }

    pub fn recent_llm_calls(&self, n: usize) -> Vec<LlmAuditEntry> {
        self.analyst.router().audit().recent(n)
    }
}
