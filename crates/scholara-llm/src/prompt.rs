//! Prompt builders for the three research tasks.
//!
//! Each prompt asks for a fixed-shape JSON object (see `parse`). The legacy
//! marker format is described as a fallback so models that ignore the JSON
//! instruction still produce something the marker parser understands.

use scholara_common::{Claim, Paper};

/// Full text is cut to this many characters before it goes into a prompt.
pub const MAX_FULL_TEXT_CHARS: usize = 12_000;

fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((i, _)) => &text[..i],
        None => text,
    }
}

fn paper_header(paper: &Paper) -> String {
    let mut out = format!(
        "Title: {}\nAuthors: {}\nAbstract: {}\n",
        paper.title,
        paper.authors.join(", "),
        paper.abstract_text.as_deref().unwrap_or("(not available)"),
    );
    if let Some(journal) = &paper.journal {
        out.push_str(&format!("Journal: {} ({})\n", journal, paper.year));
    }
    out
}

pub fn summary_prompt(paper: &Paper) -> String {
    let mut prompt = String::from(
        "Please analyze this research paper and provide:\n\
         1. A concise summary of the main findings and implications\n\
         2. A list of key findings (maximum 5 points)\n\n\
         Respond with a single JSON object of the form\n\
         {\"summary\": \"...\", \"key_findings\": [\"...\", \"...\"]}\n\
         If you cannot produce JSON, write the summary, then a blank line, then a line\n\
         \"Key Findings:\" followed by one finding per line.\n\n",
    );
    prompt.push_str(&paper_header(paper));
    if let Some(full) = &paper.full_text {
        prompt.push_str("Full Text: ");
        prompt.push_str(truncate_chars(full, MAX_FULL_TEXT_CHARS));
        prompt.push('\n');
    }
    prompt
}

pub fn hypothesis_prompt(paper: &Paper) -> String {
    let mut prompt = String::from(
        "Based on this research paper, generate 3 novel research hypotheses that:\n\
         1. Build upon the paper's findings\n\
         2. Suggest new directions for research\n\
         3. Include supporting evidence from the paper\n\n\
         Respond with a single JSON object of the form\n\
         {\"hypotheses\": [{\"statement\": \"...\", \"confidence\": 0.0-1.0,\n\
           \"evidence\": [{\"text\": \"...\", \"source\": \"...\", \"confidence\": 0.0-1.0}]}]}\n\
         If you cannot produce JSON, start each hypothesis with \"Hypothesis N:\" and list its\n\
         evidence under a \"Supporting Evidence:\" heading, one item per line.\n\n",
    );
    prompt.push_str(&paper_header(paper));
    if let Some(summary) = &paper.summary {
        prompt.push_str(&format!("Summary: {}\n", summary));
    }
    if let Some(findings) = paper.key_findings.as_ref().filter(|f| !f.is_empty()) {
        prompt.push_str("Key Findings:\n");
        prompt.push_str(&findings.join("\n"));
        prompt.push('\n');
    }
    prompt
}

pub fn verification_prompt(claim: &Claim) -> String {
    format!(
        "Please verify this scientific claim and provide evidence:\n\
         \"{}\"\n\n\
         Analyze the claim and:\n\
         1. Determine if it is supported by existing research\n\
         2. Provide specific evidence supporting or contradicting the claim\n\
         3. Assign a verification status (verified, partially verified, disputed, or unverified)\n\
         4. Include confidence level and sources\n\n\
         Respond with a single JSON object of the form\n\
         {{\"status\": \"verified|partially verified|disputed|unverified\", \"confidence\": 0.0-1.0,\n\
           \"evidence\": [{{\"text\": \"...\", \"source\": \"...\", \"confidence\": 0.0-1.0}}]}}\n\
         If you cannot produce JSON, write \"Status: ...\" and \"Confidence: ...\" lines followed by\n\
         an \"Evidence:\" heading with one item per line.\n",
        claim.statement
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use scholara_common::PaperDraft;

    fn paper() -> Paper {
        PaperDraft {
            title: "Coral bleaching".into(),
            authors: "A One, B Two".into(),
            abstract_text: "Reefs are warming.".into(),
            ..Default::default()
        }
        .into_paper("1".into(), Utc::now())
    }

    #[test]
    fn test_summary_prompt_has_paper_fields() {
        let p = summary_prompt(&paper());
        assert!(p.contains("Title: Coral bleaching"));
        assert!(p.contains("Authors: A One, B Two"));
        assert!(p.contains("\"key_findings\""));
        assert!(!p.contains("Full Text:"));
    }

    #[test]
    fn test_full_text_is_truncated() {
        let mut p = paper();
        p.full_text = Some("x".repeat(MAX_FULL_TEXT_CHARS + 500));
        let prompt = summary_prompt(&p);
        assert!(prompt.len() < MAX_FULL_TEXT_CHARS + 2_000);
    }

    #[test]
    fn test_hypothesis_prompt_includes_findings() {
        let mut p = paper();
        p.key_findings = Some(vec!["Heat kills coral".into()]);
        let prompt = hypothesis_prompt(&p);
        assert!(prompt.contains("Key Findings:\nHeat kills coral"));
    }
}
