//*** START FILE: src/types/corpus.rs ***//
use serde::{Deserialize, Serialize};

/// One translation option for a source sentence.
///
/// `original_column` and `original_index` record where the candidate came from
/// in the corpus file. They are never rewritten by shuffling or ranking.
/// Candidates typed in by hand during a session have no provenance.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub text: String,
    pub header: Option<String>,
    pub original_column: Option<usize>,
    pub original_index: Option<usize>,
}

impl Candidate {
    pub fn from_corpus(text: &str, header: &str, original_index: usize) -> Self {
        Candidate {
            text: text.to_string(),
            header: Some(header.to_string()),
            // id and source text occupy the first two columns
            original_column: Some(original_index + 2),
            original_index: Some(original_index),
        }
    }

    pub fn hand_added(text: &str) -> Self {
        Candidate {
            text: text.to_string(),
            header: None,
            original_column: None,
            original_index: None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RankedCandidate {
    pub rank: usize,
    #[serde(flatten)]
    pub candidate: Candidate,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SourceSentence {
    pub id: String,
    pub source_text: String,
    pub translations: Vec<Candidate>,
}

/// Ranks `candidates` by their position: the first gets rank 1.
///
/// Always rebuilt from the full order so ranks stay dense after any mix of
/// reorders, insertions and deletions.
pub fn rank_in_order(candidates: &[Candidate]) -> Vec<RankedCandidate> {
    candidates
        .iter()
        .enumerate()
        .map(|(position, candidate)| RankedCandidate {
            rank: position + 1,
            candidate: candidate.clone(),
        })
        .collect()
}
//*** END FILE: src/types/corpus.rs ***//
