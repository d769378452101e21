//*** START FILE: src/annotation_log.rs ***//
//! Append-only record of submitted sessions.

use tracing::info;

use crate::error::Result;
use crate::store::{progress_io, KeyValueStore};
use crate::types::corpus::RankedCandidate;
use crate::types::session::Session;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotationLog {
    sessions: Vec<Session>,
}

impl AnnotationLog {
    pub fn new(sessions: Vec<Session>) -> Self {
        AnnotationLog { sessions }
    }

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Sentences summed over all sessions.
    pub fn total_annotations(&self) -> usize {
        self.sessions.iter().map(|s| s.sentences.len()).sum()
    }

    pub fn last_session_id(&self) -> Option<i64> {
        self.sessions.iter().map(|s| s.session_id).max()
    }

    /// Most recent non-empty ranking submitted for `sentence_id`.
    pub fn latest_rankings(&self, sentence_id: &str) -> Option<&[RankedCandidate]> {
        self.sessions
            .iter()
            .rev()
            .flat_map(|s| s.sentences.iter())
            .filter(|s| s.id == sentence_id)
            .map(|s| s.ranked())
            .find(|ranked| !ranked.is_empty())
    }

    /// Persists the log with `session` appended, then appends in memory.
    pub fn append(&mut self, session: Session, store: &mut dyn KeyValueStore) -> Result<()> {
        let mut next = self.sessions.clone();
        next.push(session);
        progress_io::save_annotation_log(store, &next)?;
        self.sessions = next;
        Ok(())
    }

    pub fn clear(&mut self, store: &mut dyn KeyValueStore) -> Result<()> {
        progress_io::save_annotation_log(store, &[])?;
        self.sessions.clear();
        info!("Annotation log cleared");
        Ok(())
    }
}

//*** END FILE: src/annotation_log.rs ***//
