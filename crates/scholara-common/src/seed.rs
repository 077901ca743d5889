//! Demo data set loaded into a fresh store. Restarting the service returns
//! the store to exactly this state.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use crate::entities::{Claim, Evidence, FundingOpportunity, Hypothesis, Paper, VerificationStatus};

const CRISPR_TITLE: &str = "Novel Insights into CRISPR-Cas9 Mechanisms and Applications";

fn day(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).single().unwrap_or_default()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub fn papers() -> Vec<Paper> {
    vec![
        Paper {
            id: "demo".into(),
            title: CRISPR_TITLE.into(),
            authors: strings(&["Jane Doe", "John Smith", "Emily Johnson"]),
            journal: Some("Nature Biotechnology".into()),
            year: 2023,
            doi: Some("10.1038/s41587-023-1234-5".into()),
            abstract_text: Some(
                "CRISPR-Cas9 technology has revolutionized genome editing. This study explores new \
                 mechanisms of the CRISPR-Cas9 system and its applications in treating genetic disorders."
                    .into(),
            ),
            full_text: None,
            summary: Some(
                "This paper presents research on CRISPR-Cas9 mechanisms, revealing how the system \
                 interacts with various DNA structures. The authors demonstrate improved specificity \
                 and reduced off-target effects through a modification of the Cas9 protein, and \
                 correct mutations associated with cystic fibrosis in human cell lines."
                    .into(),
            ),
            key_findings: Some(strings(&[
                "Discovery of a new Cas9 variant with 90% reduced off-target effects",
                "Successful correction of CFTR mutations in human epithelial cell lines",
                "Novel mechanism for Cas9-DNA interaction that enhances specificity",
                "Development of an improved delivery system for in vivo applications",
            ])),
            uploaded: day(2023, 12, 15),
            mind_map: None,
            knowledge_graph: None,
        },
        Paper {
            id: "paper2".into(),
            title: "Machine Learning Approaches to Predict Protein-Ligand Interactions".into(),
            authors: strings(&["Robert Chen", "Sarah Williams"]),
            journal: Some("Journal of Computational Chemistry".into()),
            year: 2023,
            doi: Some("10.1002/jcc.26782".into()),
            abstract_text: Some(
                "This study applies deep learning techniques to predict protein-ligand interactions \
                 with unprecedented accuracy, potentially accelerating drug discovery."
                    .into(),
            ),
            full_text: None,
            summary: None,
            key_findings: None,
            uploaded: day(2023, 11, 10),
            mind_map: None,
            knowledge_graph: None,
        },
        Paper {
            id: "paper3".into(),
            title: "Climate Change Impact on Coral Reef Ecosystems".into(),
            authors: strings(&["Maria Rodriguez", "David Kim", "Lisa Wong"]),
            journal: Some("Nature Climate Change".into()),
            year: 2023,
            doi: Some("10.1038/s41558-023-1678-2".into()),
            abstract_text: Some(
                "A comprehensive analysis of how rising ocean temperatures and acidification are \
                 affecting coral reef ecosystems worldwide."
                    .into(),
            ),
            full_text: None,
            summary: None,
            key_findings: None,
            uploaded: day(2023, 10, 5),
            mind_map: None,
            knowledge_graph: None,
        },
    ]
}

pub fn hypotheses() -> Vec<Hypothesis> {
    vec![
        Hypothesis {
            id: "demo".into(),
            paper_id: "demo".into(),
            statement: "The modified Cas9 variant can be effectively applied to correct mutations in \
                        the DMD gene responsible for Duchenne muscular dystrophy with minimal \
                        off-target effects."
                .into(),
            confidence: 0.85,
            supporting_evidence: vec![
                Evidence::new(
                    "ev1",
                    "The modified Cas9 showed 90% reduction in off-target effects across all tested cell lines.",
                    format!("Figure 3, {CRISPR_TITLE}"),
                    0.92,
                ),
                Evidence::new(
                    "ev2",
                    "Similar gene structures between CFTR and DMD suggest comparable editing efficiency.",
                    "Previous study: Zhang et al., 2022",
                    0.78,
                ),
                Evidence::new(
                    "ev3",
                    "In vitro experiments with DMD gene fragments showed successful editing.",
                    format!("Supplementary Data, {CRISPR_TITLE}"),
                    0.88,
                ),
            ],
            knowledge_graph_data: None,
            generated: day(2023, 12, 16),
        },
        Hypothesis {
            id: "hyp2".into(),
            paper_id: "demo".into(),
            statement: "The delivery system developed in this study could be adapted for targeting \
                        neurons in the central nervous system to treat neurodegenerative disorders."
                .into(),
            confidence: 0.72,
            supporting_evidence: vec![
                Evidence::new(
                    "ev4",
                    "The delivery system successfully penetrated membrane barriers in epithelial cells.",
                    format!("Figure 5, {CRISPR_TITLE}"),
                    0.85,
                ),
                Evidence::new(
                    "ev5",
                    "The lipid nanoparticle composition is similar to those used in previous CNS delivery studies.",
                    "Related study: Brown et al., 2021",
                    0.65,
                ),
            ],
            knowledge_graph_data: None,
            generated: day(2023, 12, 16),
        },
    ]
}

pub fn claims() -> Vec<Claim> {
    vec![
        Claim {
            id: "demo".into(),
            hypothesis_id: "demo".into(),
            statement: "The modified Cas9 variant reduces off-target effects by 90% compared to standard Cas9."
                .into(),
            verification_status: VerificationStatus::Verified,
            supporting_evidence: vec![
                Evidence::new(
                    "ev6",
                    "Multiple assays confirmed 88-92% reduction in off-target effects across all tested cell lines.",
                    format!("Figure 3, {CRISPR_TITLE}"),
                    0.95,
                ),
                Evidence::new(
                    "ev7",
                    "Whole-genome sequencing showed significantly fewer unintended edits.",
                    format!("Table 2, {CRISPR_TITLE}"),
                    0.92,
                ),
            ],
            confidence: 0.93,
            references: None,
        },
        Claim {
            id: "claim2".into(),
            hypothesis_id: "demo".into(),
            statement: "The modified Cas9 can successfully correct DMD gene mutations in human cells.".into(),
            verification_status: VerificationStatus::PartiallyVerified,
            supporting_evidence: vec![
                Evidence::new(
                    "ev9",
                    "The modified Cas9 corrected DMD mutations in vitro in isolated DNA fragments.",
                    format!("Supplementary Data, {CRISPR_TITLE}"),
                    0.87,
                ),
                Evidence::new(
                    "ev10",
                    "Limited cell culture tests showed successful editing in some cell lines.",
                    "Unpublished data referenced in discussion",
                    0.62,
                ),
            ],
            confidence: 0.74,
            references: None,
        },
    ]
}

/// The funding catalogue that funding matching ranks against.
pub fn funding_opportunities() -> Vec<FundingOpportunity> {
    vec![
        FundingOpportunity {
            id: "fund1".into(),
            title: "Innovative Gene Editing Technologies for Genetic Disorders".into(),
            organization: "National Institutes of Health (NIH)".into(),
            amount: "$1,500,000 - $2,500,000".into(),
            deadline: date(2024, 5, 15),
            description: "Supports research developing novel gene editing technologies for the \
                          treatment of genetic disorders, with emphasis on specificity, efficiency \
                          and delivery systems."
                .into(),
            eligibility: "Academic institutions, non-profit research organizations, and small businesses.".into(),
            url: "https://www.nih.gov/funding/opportunities".into(),
            match_score: 95,
            keywords: strings(&["CRISPR", "gene editing", "genetic disorders", "delivery systems"]),
        },
        FundingOpportunity {
            id: "fund2".into(),
            title: "Translational Research in Genetic Medicine".into(),
            organization: "Howard Hughes Medical Institute (HHMI)".into(),
            amount: "$750,000 - $1,250,000".into(),
            deadline: date(2024, 3, 30),
            description: "Supports research that bridges basic science discoveries and clinical \
                          applications in genetic medicine."
                .into(),
            eligibility: "Independent investigators at research institutions.".into(),
            url: "https://www.hhmi.org/programs".into(),
            match_score: 87,
            keywords: strings(&["translational research", "genetic medicine", "clinical applications"]),
        },
        FundingOpportunity {
            id: "fund3".into(),
            title: "Next-Generation Genomic Technologies".into(),
            organization: "Chan Zuckerberg Initiative".into(),
            amount: "$500,000 - $1,000,000".into(),
            deadline: date(2024, 6, 15),
            description: "Supports new technologies that enable novel or improved approaches to \
                          understanding, diagnosing, and treating disease."
                .into(),
            eligibility: "Research institutions worldwide.".into(),
            url: "https://chanzuckerberg.com/science/programs-resources".into(),
            match_score: 82,
            keywords: strings(&["genomic technologies", "disease treatment", "innovation"]),
        },
        FundingOpportunity {
            id: "fund4".into(),
            title: "Breakthrough Technologies for Rare Diseases".into(),
            organization: "Bill & Melinda Gates Foundation".into(),
            amount: "$300,000 - $800,000".into(),
            deadline: date(2024, 4, 20),
            description: "Supports technologies for diagnosing and treating rare genetic diseases \
                          that could scale globally."
                .into(),
            eligibility: "Global research organizations and institutions.".into(),
            url: "https://www.gatesfoundation.org/funding".into(),
            match_score: 78,
            keywords: strings(&["rare diseases", "genetic disorders", "global health"]),
        },
    ]
}
