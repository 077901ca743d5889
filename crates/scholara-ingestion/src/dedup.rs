//! Deduplication of incoming papers against the papers already held.

use scholara_common::Paper;

/// Result of a deduplication check.
#[derive(Debug, PartialEq)]
pub enum DedupResult {
    /// Paper is new: add it.
    New,
    /// Same id as an existing record.
    DuplicateId(String),
    /// Same DOI as an existing record.
    DuplicateDoi(String),
    /// Same year and a near-identical title (SimHash distance ≤ `TITLE_HAMMING_MAX`).
    ProbableDuplicate { existing_id: String, distance: u32 },
}

impl DedupResult {
    pub fn is_new(&self) -> bool {
        matches!(self, DedupResult::New)
    }
}

pub const TITLE_HAMMING_MAX: u32 = 3;

/// `https://doi.org/10.1/ABC` and `doi:10.1/abc` normalise to `10.1/abc`.
pub fn normalise_doi(doi: &str) -> String {
    let d = doi.trim().to_lowercase();
    let d = d
        .strip_prefix("https://doi.org/")
        .or_else(|| d.strip_prefix("http://doi.org/"))
        .or_else(|| d.strip_prefix("https://dx.doi.org/"))
        .or_else(|| d.strip_prefix("doi:"))
        .unwrap_or(&d);
    d.trim().to_string()
}

/// Staged check:
/// Stage 1: id exact match
/// Stage 2: DOI match after normalisation
/// Stage 3: title SimHash within the same year
pub fn check_duplicate<'a>(incoming: &Paper, existing: impl IntoIterator<Item = &'a Paper>) -> DedupResult {
    let incoming_doi = incoming.doi.as_deref().map(normalise_doi);
    let incoming_hash = simhash(&incoming.title);
    let mut probable = None;

    for p in existing {
        if p.id == incoming.id {
            return DedupResult::DuplicateId(p.id.clone());
        }
        if let (Some(a), Some(b)) = (&incoming_doi, p.doi.as_deref()) {
            if !a.is_empty() && *a == normalise_doi(b) {
                return DedupResult::DuplicateDoi(a.clone());
            }
        }
        if probable.is_none() && p.year == incoming.year {
            let distance = hamming_distance(incoming_hash, simhash(&p.title));
            if distance <= TITLE_HAMMING_MAX {
                probable = Some(DedupResult::ProbableDuplicate { existing_id: p.id.clone(), distance });
            }
        }
    }

    probable.unwrap_or(DedupResult::New)
}

/// Compute a 64-bit SimHash of text for approximate deduplication.
/// Empty (or all stop-word) text hashes to 0 and never matches.
pub fn simhash(text: &str) -> u64 {
    let normalised = text.to_lowercase();
    let words: Vec<&str> = normalised
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty() && !STOP_WORDS.contains(w))
        .collect();

    let mut v: [i64; 64] = [0; 64];
    for word in &words {
        let hash = fnv64(word.as_bytes());
        for (i, slot) in v.iter_mut().enumerate() {
            if (hash >> i) & 1 == 1 {
                *slot += 1;
            } else {
                *slot -= 1;
            }
        }
    }

    v.iter()
        .enumerate()
        .filter(|(_, count)| **count > 0)
        .fold(0u64, |acc, (i, _)| acc | (1u64 << i))
}

/// FNV-1a 64-bit hash.
fn fnv64(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 14695981039346656037;
    for &byte in bytes {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(1099511628211);
    }
    hash
}

/// Hamming distance between two fingerprints. Zero fingerprints are
/// treated as infinitely far apart.
pub fn hamming_distance(a: u64, b: u64) -> u32 {
    if a == 0 || b == 0 {
        return u32::MAX;
    }
    (a ^ b).count_ones()
}

/// Stop words to exclude from SimHash computation.
const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "in", "of", "to", "is", "was",
    "for", "on", "with", "this", "that", "are", "were", "be", "been",
    "by", "from", "we", "our", "their", "which", "also",
];

#[cfg(test)]
mod tests {
    use super::*;
    use scholara_common::seed;

    #[test]
    fn test_doi_normalisation() {
        assert_eq!(normalise_doi("https://doi.org/10.1038/ABC"), "10.1038/abc");
        assert_eq!(normalise_doi(" doi:10.1/x "), "10.1/x");
        assert_eq!(normalise_doi("10.1/x"), "10.1/x");
    }

    #[test]
    fn test_duplicate_by_id_and_doi() {
        let existing = seed::papers();
        let mut p = existing[0].clone();
        assert_eq!(check_duplicate(&p, &existing), DedupResult::DuplicateId("demo".into()));

        p.id = "other".into();
        p.doi = p.doi.map(|d| format!("https://doi.org/{}", d.to_uppercase()));
        assert!(matches!(check_duplicate(&p, &existing), DedupResult::DuplicateDoi(_)));
    }

    #[test]
    fn test_probable_duplicate_by_title() {
        let existing = seed::papers();
        let mut p = existing[0].clone();
        p.id = "other".into();
        p.doi = None;
        p.title = p.title.to_uppercase();
        assert!(matches!(
            check_duplicate(&p, &existing),
            DedupResult::ProbableDuplicate { ref existing_id, .. } if existing_id == "demo"
        ));

        p.year += 1;
        assert!(check_duplicate(&p, &existing).is_new());
    }

    #[test]
    fn test_different_titles_far_apart() {
        let t1 = "CRISPR-Cas9 mechanisms and applications";
        let t2 = "Climate change effects on marine ecosystems";
        assert!(hamming_distance(simhash(t1), simhash(t2)) > TITLE_HAMMING_MAX);
        assert_eq!(hamming_distance(simhash(""), simhash("")), u32::MAX);
    }
}
