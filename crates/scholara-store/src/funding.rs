//! Funding matching: ranks the catalogue against a paper's text.

use std::cmp::Reverse;

use serde::Deserialize;

use scholara_common::{FundingOpportunity, Paper};

/// Words shorter than this are ignored when matching keywords and titles.
const MIN_WORD_LEN: usize = 4;

const KEYWORD_WEIGHT: f64 = 0.7;
const TITLE_WEIGHT: f64 = 0.3;

#[derive(Debug, Clone)]
pub struct FundingMatcher {
    catalogue: Vec<FundingOpportunity>,
    min_score: u8,
}

fn significant_words(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() >= MIN_WORD_LEN)
        .map(str::to_lowercase)
        .collect()
}

/// Share of `words` present in `haystack`; 0 when there are none.
fn coverage(words: &[String], haystack: &str) -> f64 {
    if words.is_empty() {
        return 0.0;
    }
    let hits = words.iter().filter(|w| haystack.contains(w.as_str())).count();
    hits as f64 / words.len() as f64
}

impl FundingMatcher {
    pub fn new(catalogue: Vec<FundingOpportunity>, min_score: u8) -> Self {
        Self { catalogue, min_score }
    }

    /// 0–100. Keywords count fully when the whole phrase appears in the
    /// paper and partially by their significant words otherwise; the
    /// opportunity title contributes the rest.
    pub fn score(&self, opportunity: &FundingOpportunity, paper_text: &str) -> u8 {
        let keyword_score = if opportunity.keywords.is_empty() {
            0.0
        } else {
            opportunity
                .keywords
                .iter()
                .map(|k| {
                    let k = k.to_lowercase();
                    if paper_text.contains(&k) {
                        1.0
                    } else {
                        coverage(&significant_words(&k), paper_text)
                    }
                })
                .sum::<f64>()
                / opportunity.keywords.len() as f64
        };
        let title_score = coverage(&significant_words(&opportunity.title), paper_text);

        let raw = 100.0 * (KEYWORD_WEIGHT * keyword_score + TITLE_WEIGHT * title_score);
        raw.round().clamp(0.0, 100.0) as u8
    }

    /// Catalogue entries scoring at least the minimum, best first; equal
    /// scores are ordered by the earlier deadline.
    pub fn rank(&self, paper: &Paper) -> Vec<FundingOpportunity> {
        let text = paper.searchable_text().to_lowercase();
        let mut matches: Vec<FundingOpportunity> = self
            .catalogue
            .iter()
            .map(|o| FundingOpportunity { match_score: self.score(o, &text), ..o.clone() })
            .filter(|o| o.match_score >= self.min_score)
            .collect();
        matches.sort_by_key(|o| (Reverse(o.match_score), o.deadline));
        matches
    }
}

/// Browse filter over the funding collection.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FundingQuery {
    /// Case-insensitive match on title, organization, description or keywords.
    pub term: Option<String>,
    /// Lower bound of the advertised amount must be at least this.
    pub min_amount: Option<f64>,
    pub max_match_score: Option<u8>,
}

impl FundingQuery {
    pub fn matches(&self, o: &FundingOpportunity) -> bool {
        if let Some(term) = self.term.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            if !o.mentions(term) {
                return false;
            }
        }
        if let Some(min) = self.min_amount {
            if !o.min_amount().is_some_and(|a| a >= min) {
                return false;
            }
        }
        if let Some(max) = self.max_match_score {
            if o.match_score > max {
                return false;
            }
        }
        true
    }
}

pub fn filter_funding(funding: &[FundingOpportunity], query: &FundingQuery) -> Vec<FundingOpportunity> {
    funding.iter().filter(|o| query.matches(o)).cloned().collect()
}
