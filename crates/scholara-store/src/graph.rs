//! Graph data derived from entities: a knowledge graph per hypothesis and a
//! mind map per summarised paper.

use std::collections::HashSet;

use scholara_common::entities::{
    GraphLink, GraphNode, GraphNodeKind, KnowledgeGraphData, MindMapData, MindMapEdge, MindMapNode,
};
use scholara_common::{Hypothesis, Paper};

const MAX_CONCEPTS: usize = 6;
const MAX_LABEL_CHARS: usize = 80;

fn shorten(text: &str) -> String {
    match text.char_indices().nth(MAX_LABEL_CHARS) {
        Some((i, _)) => format!("{}…", text[..i].trim_end()),
        None => text.to_string(),
    }
}

fn node(id: impl Into<String>, name: impl Into<String>, kind: GraphNodeKind, value: u32) -> GraphNode {
    GraphNode { id: id.into(), name: name.into(), kind, value }
}

fn link(source: &str, target: &str, value: u32, label: &str) -> GraphLink {
    GraphLink { source: source.to_string(), target: target.to_string(), value, label: Some(label.to_string()) }
}

/// Technical terms in a statement: tokens with two or more capitals or a
/// mix of letters and digits ("CRISPR-Cas9", "DMD", "CFTR").
pub fn concept_terms(statement: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    statement
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric() && c != '-'))
        .filter(|w| {
            let capitals = w.chars().filter(|c| c.is_uppercase()).count();
            let digits = w.chars().any(|c| c.is_ascii_digit());
            let letters = w.chars().any(|c| c.is_alphabetic());
            letters && (capitals >= 2 || digits)
        })
        .filter(|w| seen.insert(w.to_lowercase()))
        .take(MAX_CONCEPTS)
        .map(String::from)
        .collect()
}

/// Hypothesis at the centre; the source paper and its authors, the
/// supporting evidence, and technical terms from the statement around it.
pub fn hypothesis_graph(h: &Hypothesis, paper: &Paper) -> KnowledgeGraphData {
    // Hypothesis and paper ids may coincide, so node ids carry their kind.
    let hyp_id = format!("hypothesis:{}", h.id);
    let paper_id = format!("paper:{}", paper.id);

    let mut nodes = vec![node(&hyp_id, shorten(&h.statement), GraphNodeKind::Hypothesis, 30)];
    let mut links = Vec::new();

    nodes.push(node(&paper_id, shorten(&paper.title), GraphNodeKind::Paper, 12));
    links.push(link(&paper_id, &hyp_id, 3, "inspires"));

    for (i, author) in paper.authors.iter().enumerate() {
        let id = format!("author:{}:{i}", paper.id);
        links.push(link(&id, &paper_id, 2, "wrote"));
        nodes.push(node(id, author, GraphNodeKind::Author, 8));
    }

    for ev in &h.supporting_evidence {
        let id = format!("evidence:{}", ev.id);
        let weight = ((ev.confidence * 5.0).round() as u32).max(1);
        links.push(link(&id, &hyp_id, weight, "supports"));
        nodes.push(node(id, shorten(&ev.text), GraphNodeKind::Evidence, 10 + weight));
    }

    for term in concept_terms(&h.statement) {
        let id = format!("concept:{}", term.to_lowercase());
        links.push(link(&hyp_id, &id, 4, "involves"));
        nodes.push(node(id, term, GraphNodeKind::Concept, 20));
    }

    KnowledgeGraphData { nodes, links }
}

/// Title at the root with the summary and one branch per key finding.
pub fn paper_mind_map(paper: &Paper) -> MindMapData {
    let mut nodes = vec![MindMapNode {
        id: "root".to_string(),
        text: paper.title.clone(),
        kind: Some("paper".to_string()),
    }];
    let mut edges = Vec::new();

    if let Some(summary) = &paper.summary {
        nodes.push(MindMapNode { id: "summary".into(), text: shorten(summary), kind: Some("summary".into()) });
        edges.push(MindMapEdge { from: "root".into(), to: "summary".into(), label: Some("summarised as".into()) });
    }

    for (i, finding) in paper.key_findings.iter().flatten().enumerate() {
        let id = format!("finding-{}", i + 1);
        nodes.push(MindMapNode { id: id.clone(), text: finding.clone(), kind: Some("finding".into()) });
        edges.push(MindMapEdge { from: "root".into(), to: id, label: Some("finds".into()) });
    }

    MindMapData { nodes, edges }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scholara_common::seed;

    #[test]
    fn test_concept_terms() {
        let terms = concept_terms("The modified Cas9 can correct DMD mutations; DMD is like CFTR.");
        assert_eq!(terms, vec!["Cas9", "DMD", "CFTR"]);
    }

    #[test]
    fn test_hypothesis_graph_links_resolve() {
        let paper = seed::papers().remove(0);
        let h = seed::hypotheses().remove(0);
        let g = hypothesis_graph(&h, &paper);

        let ids: HashSet<&str> = g.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids.len(), g.nodes.len());
        assert!(g.links.iter().all(|l| ids.contains(l.source.as_str()) && ids.contains(l.target.as_str())));
        assert_eq!(g.nodes.iter().filter(|n| n.kind == GraphNodeKind::Evidence).count(), 3);
        assert_eq!(g.nodes.iter().filter(|n| n.kind == GraphNodeKind::Author).count(), 3);
    }

    #[test]
    fn test_mind_map_has_branch_per_finding() {
        let paper = seed::papers().remove(0);
        let m = paper_mind_map(&paper);
        assert_eq!(m.nodes.len(), 1 + 1 + 4);
        assert_eq!(m.edges.len(), 5);
        assert!(m.edges.iter().all(|e| e.from == "root"));
    }
}
