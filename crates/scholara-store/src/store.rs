//! The entity store: papers, hypotheses, claims, funding opportunities and
//! the current-paper selection.
//!
//! Every mutation validates ids and references before touching any
//! collection, so a rejected call leaves the store exactly as it was.

use std::collections::HashSet;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use scholara_common::{seed, Claim, FundingOpportunity, Hypothesis, Paper};
use scholara_ingestion::dedup::{check_duplicate, DedupResult};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    #[error("{kind} '{id}' already exists")]
    Duplicate { kind: &'static str, id: String },

    #[error("{kind} '{id}' references missing {parent} '{parent_id}'")]
    Orphan {
        kind: &'static str,
        id: String,
        parent: &'static str,
        parent_id: String,
    },

    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },
}

const PAPER: &str = "paper";
const HYPOTHESIS: &str = "hypothesis";
const CLAIM: &str = "claim";
const FUNDING: &str = "funding opportunity";

/// Serialisable view of the whole store.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoreSnapshot {
    pub papers: Vec<Paper>,
    pub hypotheses: Vec<Hypothesis>,
    pub claims: Vec<Claim>,
    pub funding_opportunities: Vec<FundingOpportunity>,
    pub current_paper: Option<Paper>,
}

#[derive(Debug, Clone, Default)]
pub struct EntityStore {
    papers: Vec<Paper>,
    hypotheses: Vec<Hypothesis>,
    claims: Vec<Claim>,
    funding: Vec<FundingOpportunity>,
    current_paper: Option<String>,
}

fn unique_ids<'a>(kind: &'static str, ids: impl IntoIterator<Item = &'a str>) -> Result<(), StoreError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(StoreError::Duplicate { kind, id: id.to_string() });
        }
    }
    Ok(())
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The demo data set: three papers, two hypotheses, two claims and the
    /// funding catalogue.
    pub fn from_seed() -> Self {
        Self {
            papers: seed::papers(),
            hypotheses: seed::hypotheses(),
            claims: seed::claims(),
            funding: seed::funding_opportunities(),
            current_paper: None,
        }
    }

    // ── Reads ───────────────────────────────────────────────────────────────

    pub fn papers(&self) -> &[Paper] {
        &self.papers
    }

    pub fn paper(&self, id: &str) -> Option<&Paper> {
        self.papers.iter().find(|p| p.id == id)
    }

    pub fn hypotheses(&self) -> &[Hypothesis] {
        &self.hypotheses
    }

    pub fn hypothesis(&self, id: &str) -> Option<&Hypothesis> {
        self.hypotheses.iter().find(|h| h.id == id)
    }

    pub fn hypotheses_for<'a>(&'a self, paper_id: &'a str) -> impl Iterator<Item = &'a Hypothesis> + 'a {
        self.hypotheses.iter().filter(move |h| h.paper_id == paper_id)
    }

    pub fn claims(&self) -> &[Claim] {
        &self.claims
    }

    pub fn claim(&self, id: &str) -> Option<&Claim> {
        self.claims.iter().find(|c| c.id == id)
    }

    pub fn claims_for<'a>(&'a self, hypothesis_id: &'a str) -> impl Iterator<Item = &'a Claim> + 'a {
        self.claims.iter().filter(move |c| c.hypothesis_id == hypothesis_id)
    }

    pub fn funding(&self) -> &[FundingOpportunity] {
        &self.funding
    }

    pub fn current_paper(&self) -> Option<&Paper> {
        self.current_paper.as_deref().and_then(|id| self.paper(id))
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            papers: self.papers.clone(),
            hypotheses: self.hypotheses.clone(),
            claims: self.claims.clone(),
            funding_opportunities: self.funding.clone(),
            current_paper: self.current_paper().cloned(),
        }
    }

    // ── Inserts ─────────────────────────────────────────────────────────────

    pub fn insert_paper(&mut self, paper: Paper) -> Result<(), StoreError> {
        if self.paper(&paper.id).is_some() {
            return Err(StoreError::Duplicate { kind: PAPER, id: paper.id });
        }
        self.papers.push(paper);
        Ok(())
    }

    /// All-or-nothing: one bad hypothesis rejects the whole batch.
    pub fn insert_hypotheses(&mut self, batch: Vec<Hypothesis>) -> Result<(), StoreError> {
        unique_ids(HYPOTHESIS, batch.iter().map(|h| h.id.as_str()))?;
        for h in &batch {
            if self.hypothesis(&h.id).is_some() {
                return Err(StoreError::Duplicate { kind: HYPOTHESIS, id: h.id.clone() });
            }
            self.check_paper_ref(h)?;
        }
        self.hypotheses.extend(batch);
        Ok(())
    }

    pub fn insert_claim(&mut self, claim: Claim) -> Result<(), StoreError> {
        if self.claim(&claim.id).is_some() {
            return Err(StoreError::Duplicate { kind: CLAIM, id: claim.id });
        }
        self.check_hypothesis_ref(&claim)?;
        self.claims.push(claim);
        Ok(())
    }

    /// Append papers not already held (same id or same DOI). Returns how
    /// many were added.
    pub fn merge_papers(&mut self, incoming: Vec<Paper>) -> usize {
        let mut added = 0;
        for paper in incoming {
            match check_duplicate(&paper, &self.papers) {
                DedupResult::DuplicateId(_) | DedupResult::DuplicateDoi(_) => {
                    debug!(paper_id = %paper.id, "Skipping paper already in the store");
                }
                other => {
                    if let DedupResult::ProbableDuplicate { existing_id, distance } = other {
                        debug!(paper_id = %paper.id, %existing_id, distance, "Near-identical title already stored");
                    }
                    self.papers.push(paper);
                    added += 1;
                }
            }
        }
        added
    }

    // ── Replacements ────────────────────────────────────────────────────────

    pub fn replace_paper(&mut self, paper: Paper) -> Result<(), StoreError> {
        let slot = self
            .papers
            .iter_mut()
            .find(|p| p.id == paper.id)
            .ok_or_else(|| StoreError::NotFound { kind: PAPER, id: paper.id.clone() })?;
        *slot = paper;
        Ok(())
    }

    pub fn replace_claim(&mut self, claim: Claim) -> Result<(), StoreError> {
        self.check_hypothesis_ref(&claim)?;
        let slot = self
            .claims
            .iter_mut()
            .find(|c| c.id == claim.id)
            .ok_or_else(|| StoreError::NotFound { kind: CLAIM, id: claim.id.clone() })?;
        *slot = claim;
        Ok(())
    }

    // ── Bulk setters ────────────────────────────────────────────────────────

    /// Replace the paper collection. Rejected when a held hypothesis would
    /// lose its paper. A selection whose paper is gone is cleared.
    pub fn set_papers(&mut self, papers: Vec<Paper>) -> Result<(), StoreError> {
        unique_ids(PAPER, papers.iter().map(|p| p.id.as_str()))?;
        let ids: HashSet<&str> = papers.iter().map(|p| p.id.as_str()).collect();
        if let Some(h) = self.hypotheses.iter().find(|h| !ids.contains(h.paper_id.as_str())) {
            return Err(orphan_hypothesis(h));
        }
        if self.current_paper.as_deref().is_some_and(|id| !ids.contains(id)) {
            self.current_paper = None;
        }
        self.papers = papers;
        Ok(())
    }

    /// Replace the hypothesis collection. Every hypothesis must name a held
    /// paper and no held claim may lose its hypothesis.
    pub fn set_hypotheses(&mut self, hypotheses: Vec<Hypothesis>) -> Result<(), StoreError> {
        unique_ids(HYPOTHESIS, hypotheses.iter().map(|h| h.id.as_str()))?;
        for h in &hypotheses {
            self.check_paper_ref(h)?;
        }
        let ids: HashSet<&str> = hypotheses.iter().map(|h| h.id.as_str()).collect();
        if let Some(c) = self.claims.iter().find(|c| !ids.contains(c.hypothesis_id.as_str())) {
            return Err(orphan_claim(c));
        }
        self.hypotheses = hypotheses;
        Ok(())
    }

    pub fn set_claims(&mut self, claims: Vec<Claim>) -> Result<(), StoreError> {
        unique_ids(CLAIM, claims.iter().map(|c| c.id.as_str()))?;
        for c in &claims {
            self.check_hypothesis_ref(c)?;
        }
        self.claims = claims;
        Ok(())
    }

    pub fn set_funding(&mut self, funding: Vec<FundingOpportunity>) -> Result<(), StoreError> {
        unique_ids(FUNDING, funding.iter().map(|f| f.id.as_str()))?;
        self.funding = funding;
        Ok(())
    }

    pub fn set_current_paper(&mut self, id: Option<&str>) -> Result<(), StoreError> {
        match id {
            Some(id) if self.paper(id).is_none() => {
                Err(StoreError::NotFound { kind: PAPER, id: id.to_string() })
            }
            _ => {
                self.current_paper = id.map(String::from);
                Ok(())
            }
        }
    }

    // ── Reference checks ────────────────────────────────────────────────────

    fn check_paper_ref(&self, h: &Hypothesis) -> Result<(), StoreError> {
        match self.paper(&h.paper_id) {
            Some(_) => Ok(()),
            None => Err(orphan_hypothesis(h)),
        }
    }

    fn check_hypothesis_ref(&self, c: &Claim) -> Result<(), StoreError> {
        match self.hypothesis(&c.hypothesis_id) {
            Some(_) => Ok(()),
            None => Err(orphan_claim(c)),
        }
    }
}

fn orphan_hypothesis(h: &Hypothesis) -> StoreError {
    StoreError::Orphan { kind: HYPOTHESIS, id: h.id.clone(), parent: PAPER, parent_id: h.paper_id.clone() }
}

fn orphan_claim(c: &Claim) -> StoreError {
    StoreError::Orphan { kind: CLAIM, id: c.id.clone(), parent: HYPOTHESIS, parent_id: c.hypothesis_id.clone() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn hypothesis(id: &str, paper_id: &str) -> Hypothesis {
        let mut h = seed::hypotheses().remove(0);
        h.id = id.into();
        h.paper_id = paper_id.into();
        h
    }

    #[test]
    fn test_seed_counts() {
        let s = EntityStore::from_seed();
        assert_eq!(s.papers().len(), 3);
        assert_eq!(s.hypotheses().len(), 2);
        assert_eq!(s.claims().len(), 2);
        assert_eq!(s.funding().len(), 4);
        assert!(s.current_paper().is_none());
    }

    #[test]
    fn test_insert_paper_rejects_duplicate_id() {
        let mut s = EntityStore::from_seed();
        let dup = s.papers()[0].clone();
        assert_eq!(
            s.insert_paper(dup),
            Err(StoreError::Duplicate { kind: PAPER, id: "demo".into() })
        );
        assert_eq!(s.papers().len(), 3);
    }

    #[test]
    fn test_hypothesis_batch_is_all_or_nothing() {
        let mut s = EntityStore::from_seed();
        let batch = vec![hypothesis("h-ok", "demo"), hypothesis("h-bad", "missing")];
        assert!(matches!(s.insert_hypotheses(batch), Err(StoreError::Orphan { .. })));
        assert_eq!(s.hypotheses().len(), 2);

        let batch = vec![hypothesis("h1", "demo"), hypothesis("h1", "demo")];
        assert!(matches!(s.insert_hypotheses(batch), Err(StoreError::Duplicate { .. })));

        s.insert_hypotheses(vec![hypothesis("h1", "paper2")]).unwrap();
        assert_eq!(s.hypotheses_for("paper2").count(), 1);
    }

    #[test]
    fn test_orphan_claim_rejected() {
        let mut s = EntityStore::from_seed();
        let mut c = s.claims()[0].clone();
        c.id = "new".into();
        c.hypothesis_id = "nope".into();
        assert_eq!(
            s.insert_claim(c),
            Err(StoreError::Orphan {
                kind: CLAIM,
                id: "new".into(),
                parent: HYPOTHESIS,
                parent_id: "nope".into()
            })
        );
    }

    #[test]
    fn test_set_papers_protects_hypotheses() {
        let mut s = EntityStore::from_seed();
        assert!(matches!(s.set_papers(Vec::new()), Err(StoreError::Orphan { .. })));

        s.set_current_paper(Some("paper3")).unwrap();
        let keep: Vec<Paper> = s.papers().iter().filter(|p| p.id != "paper3").cloned().collect();
        s.set_papers(keep).unwrap();
        assert!(s.current_paper().is_none());
    }

    #[test]
    fn test_set_hypotheses_protects_claims() {
        let mut s = EntityStore::from_seed();
        assert!(matches!(s.set_hypotheses(Vec::new()), Err(StoreError::Orphan { .. })));
        s.set_claims(Vec::new()).unwrap();
        s.set_hypotheses(Vec::new()).unwrap();
        assert!(s.hypotheses().is_empty());
    }

    #[test]
    fn test_merge_skips_id_and_doi_duplicates() {
        let mut s = EntityStore::from_seed();
        let mut same_doi = s.papers()[0].clone();
        same_doi.id = "core-1".into();
        same_doi.title = "A different title entirely".into();
        let same_id = s.papers()[1].clone();
        let mut fresh = s.papers()[2].clone();
        fresh.id = "core-2".into();
        fresh.doi = Some("10.9999/new".into());
        fresh.title = "Ocean acidification and shellfish".into();

        assert_eq!(s.merge_papers(vec![same_doi, same_id, fresh]), 1);
        assert_eq!(s.papers().len(), 4);
        assert_eq!(s.merge_papers(Vec::new()), 0);
    }

    #[test]
    fn test_replace_claim_keeps_position() {
        let mut s = EntityStore::from_seed();
        let mut c = s.claims()[1].clone();
        c.confidence = 0.1;
        s.replace_claim(c).unwrap();
        assert_eq!(s.claims()[1].confidence, 0.1);

        let mut ghost = s.claims()[0].clone();
        ghost.id = "ghost".into();
        assert!(matches!(s.replace_claim(ghost), Err(StoreError::NotFound { .. })));
    }

    #[test]
    fn test_current_paper_must_exist() {
        let mut s = EntityStore::from_seed();
        assert!(s.set_current_paper(Some("missing")).is_err());
        s.set_current_paper(Some("demo")).unwrap();
        assert_eq!(s.current_paper().map(|p| p.id.as_str()), Some("demo"));
        s.set_current_paper(None).unwrap();
        assert!(s.snapshot().current_paper.is_none());
    }
}
