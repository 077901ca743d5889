//! The language-model side of the research operations: build the prompt,
//! route it, parse the completion.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, instrument};

use scholara_common::{Claim, Paper};

use crate::backend::{LlmError, LlmRequest};
use crate::parse::{
    parse_hypotheses, parse_summary, parse_verification, HypothesisDraft, ParseError, Parsed,
    SummaryDraft, VerificationDraft,
};
use crate::prompt;
use crate::router::{LlmRouter, LlmTask};

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Llm(#[from] LlmError),
    #[error("malformed model response: {0}")]
    Parse(#[from] ParseError),
}

#[derive(Debug, Clone)]
pub struct AnalystOptions {
    pub temperature: f32,
    pub max_tokens: u32,
    /// Accept the marked-text layout when a completion has no JSON object.
    pub legacy_text_fallback: bool,
}

impl Default for AnalystOptions {
    fn default() -> Self {
        Self { temperature: 0.7, max_tokens: 2048, legacy_text_fallback: true }
    }
}

pub struct Analyst {
    router: Arc<LlmRouter>,
    options: AnalystOptions,
}

impl Analyst {
    pub fn new(router: Arc<LlmRouter>, options: AnalystOptions) -> Self {
        Self { router, options }
    }

    pub fn router(&self) -> &Arc<LlmRouter> {
        &self.router
    }

    async fn ask(&self, task: LlmTask, prompt: String) -> Result<String, LlmError> {
        let req = LlmRequest::prompt(prompt)
            .with_temperature(self.options.temperature)
            .with_max_tokens(self.options.max_tokens);
        let resp = self.router.route(task, req).await?;
        debug!(task = task.as_str(), chars = resp.content.len(), "completion received");
        Ok(resp.content)
    }

    #[instrument(skip(self, paper), fields(paper_id = %paper.id))]
    pub async fn summarize(&self, paper: &Paper) -> Result<Parsed<SummaryDraft>, AnalysisError> {
        let text = self.ask(LlmTask::Summarize, prompt::summary_prompt(paper)).await?;
        Ok(parse_summary(&text, self.options.legacy_text_fallback)?)
    }

    #[instrument(skip(self, paper), fields(paper_id = %paper.id))]
    pub async fn hypothesize(
        &self,
        paper: &Paper,
    ) -> Result<Parsed<Vec<HypothesisDraft>>, AnalysisError> {
        let text = self.ask(LlmTask::Hypothesize, prompt::hypothesis_prompt(paper)).await?;
        Ok(parse_hypotheses(&text, self.options.legacy_text_fallback)?)
    }

    #[instrument(skip(self, claim), fields(claim_id = %claim.id))]
    pub async fn verify(&self, claim: &Claim) -> Result<Parsed<VerificationDraft>, AnalysisError> {
        let text = self.ask(LlmTask::VerifyClaim, prompt::verification_prompt(claim)).await?;
        Ok(parse_verification(&text, self.options.legacy_text_fallback)?)
    }
}
