//*** START FILE: src/types/session.rs ***//
use serde::{Deserialize, Serialize, Serializer};

use super::corpus::{Candidate, RankedCandidate, SourceSentence};

/// A sampled sentence as presented within one session.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionSentence {
    pub id: String,
    pub source_text: String,
    pub original_translations: Vec<Candidate>,
    /// Random permutation drawn when the session started; fixed afterwards.
    pub shuffled_translations: Vec<Candidate>,
    /// None until the user leaves the sentence for the first time. An empty
    /// snapshot means every candidate was deleted.
    #[serde(default, serialize_with = "serialize_rankings")]
    pub rankings: Option<Vec<RankedCandidate>>,
}

// Stored logs always carry an array, never null
fn serialize_rankings<S>(rankings: &Option<Vec<RankedCandidate>>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    rankings.as_deref().unwrap_or_default().serialize(serializer)
}

impl SessionSentence {
    pub fn new(source: &SourceSentence, shuffled_translations: Vec<Candidate>) -> Self {
        SessionSentence {
            id: source.id.clone(),
            source_text: source.source_text.clone(),
            original_translations: source.translations.clone(),
            shuffled_translations,
            rankings: None,
        }
    }

    /// The snapshot taken when the sentence was last left, empty if never.
    pub fn ranked(&self) -> &[RankedCandidate] {
        self.rankings.as_deref().unwrap_or_default()
    }

    /// Order to show when the sentence is (re)opened: the last snapshot if
    /// there is one, the session shuffle otherwise.
    pub fn working_order(&self) -> Vec<Candidate> {
        match &self.rankings {
            None => self.shuffled_translations.clone(),
            Some(rankings) => {
                let mut ranked = rankings.clone();
                ranked.sort_by_key(|r| r.rank);
                ranked.into_iter().map(|r| r.candidate).collect()
            }
        }
    }
}

/// A submitted batch of ranked sentences. Never mutated once logged.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub session_id: i64,
    pub timestamp: String,
    pub sentences: Vec<SessionSentence>,
}

impl Session {
    pub fn sentence_ids(&self) -> impl Iterator<Item = &str> {
        self.sentences.iter().map(|s| s.id.as_str())
    }
}

//*** END FILE: src/types/session.rs ***//
