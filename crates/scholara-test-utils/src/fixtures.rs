//! Sample entities and canned model completions.

use chrono::Utc;

use scholara_common::{Claim, Paper, PaperDraft, VerificationStatus};

pub fn paper(id: &str, title: &str) -> Paper {
    PaperDraft {
        title: title.to_string(),
        authors: "Jane Doe, John Smith".to_string(),
        year: "2023".to_string(),
        journal: "Nature Biotechnology".to_string(),
        abstract_text: format!("We study {title}."),
        ..Default::default()
    }
    .into_paper(id.to_string(), Utc::now())
}

pub fn draft(title: &str) -> PaperDraft {
    PaperDraft {
        title: title.to_string(),
        authors: "Jane Doe".to_string(),
        year: "2022".to_string(),
        abstract_text: "Gene editing in epithelial cells.".to_string(),
        ..Default::default()
    }
}

pub fn claim(id: &str, hypothesis_id: &str, statement: &str) -> Claim {
    Claim {
        id: id.to_string(),
        hypothesis_id: hypothesis_id.to_string(),
        statement: statement.to_string(),
        verification_status: VerificationStatus::Unverified,
        supporting_evidence: Vec::new(),
        confidence: 0.5,
        references: None,
    }
}

pub const MARKED_SUMMARY: &str = "The paper shows improved Cas9 specificity.\n\n\
Key Findings:\n\
1. Variant with 90% fewer off-target edits\n\
• CFTR correction in epithelial cells\n\
- Improved lipid nanoparticle delivery\n";

pub const JSON_SUMMARY: &str = r#"{"summary": "Reefs lose cover under heat stress.",
 "key_findings": ["Bleaching doubles above 1.5C", "Recovery takes a decade"]}"#;

pub const MARKED_HYPOTHESES: &str = "Hypothesis 1: Cas9 variants can correct DMD mutations.\n\n\
Supporting Evidence:\n\
- 90% fewer off-target edits\n\
- Similar gene structure to CFTR\n\n\
Hypothesis 2: Lipid nanoparticles reach CNS neurons.\n\
Confidence: 70%\n\n\
Supporting Evidence:\n\
- Membrane penetration in epithelial cells\n";

pub const MARKED_VERIFICATION: &str = "Status: Partially Verified\n\
Confidence: 0.64\n\n\
Evidence:\n\
- Liu et al. replicated the reduction\n\
- Sequencing showed fewer edits\n";

pub const JSON_VERIFICATION: &str = r#"{"status": "verified", "confidence": 0.91,
 "evidence": [{"text": "Replicated in two labs", "source": "J Mol Biol 2023"}]}"#;
