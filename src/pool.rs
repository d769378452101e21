//*** START FILE: src/pool.rs ***//
//! Sentence pool: the corpus plus the ids that already have a submitted ranking.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::Result;
use crate::store::{progress_io, KeyValueStore};
use crate::types::corpus::SourceSentence;
use crate::types::session::Session;

/// Ids included in at least one submitted session.
///
/// Serialized as a plain list in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct CompletedSet {
    order: Vec<String>,
    members: HashSet<String>,
}

impl CompletedSet {
    pub fn contains(&self, id: &str) -> bool {
        self.members.contains(id)
    }

    /// Returns false if the id was already present.
    pub fn insert(&mut self, id: &str) -> bool {
        if self.members.insert(id.to_string()) {
            self.order.push(id.to_string());
            true
        } else {
            false
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }
}

impl From<Vec<String>> for CompletedSet {
    fn from(ids: Vec<String>) -> Self {
        let mut set = CompletedSet::default();
        for id in &ids {
            set.insert(id);
        }
        set
    }
}

impl From<CompletedSet> for Vec<String> {
    fn from(set: CompletedSet) -> Self {
        set.order
    }
}

impl<'a> FromIterator<&'a str> for CompletedSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut set = CompletedSet::default();
        for id in iter {
            set.insert(id);
        }
        set
    }
}

#[derive(Debug, Default, Clone)]
pub struct PoolManager {
    corpus: Vec<SourceSentence>,
    completed: CompletedSet,
}

impl PoolManager {
    pub fn new(corpus: Vec<SourceSentence>, completed: CompletedSet) -> Self {
        PoolManager { corpus, completed }
    }

    /// Replaces the corpus. Completed ids are kept: ids are stable strings,
    /// so a reloaded corpus sees earlier progress.
    pub fn load(&mut self, corpus: Vec<SourceSentence>) {
        info!("Corpus loaded: {} sentences", corpus.len());
        self.corpus = corpus;
    }

    pub fn corpus(&self) -> &[SourceSentence] {
        &self.corpus
    }

    pub fn completed(&self) -> &CompletedSet {
        &self.completed
    }

    /// Corpus sentences without a submitted ranking, in corpus order.
    pub fn available(&self) -> Vec<&SourceSentence> {
        self.corpus
            .iter()
            .filter(|s| !self.completed.contains(&s.id))
            .collect()
    }

    pub fn has_available(&self) -> bool {
        self.corpus.iter().any(|s| !self.completed.contains(&s.id))
    }

    /// Adds `ids` to the completed set and persists it. Already-present ids
    /// are ignored. Memory is only updated after the write succeeds.
    pub fn mark_completed<'a, I>(&mut self, ids: I, store: &mut dyn KeyValueStore) -> Result<usize>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut next = self.completed.clone();
        let added = ids.into_iter().filter(|id| next.insert(id)).count();
        if added == 0 {
            return Ok(0);
        }
        progress_io::save_completed(store, &next)?;
        self.completed = next;
        Ok(added)
    }

    /// Clears all progress.
    pub fn reset(&mut self, store: &mut dyn KeyValueStore) -> Result<()> {
        let empty = CompletedSet::default();
        progress_io::save_completed(store, &empty)?;
        self.completed = empty;
        info!("Completed set cleared");
        Ok(())
    }

    /// Empties the completed set in memory only, matching what
    /// [`reconcile`](Self::reconcile) derives from an empty log.
    pub fn discard_completed(&mut self) {
        self.completed = CompletedSet::default();
    }

    /// Re-derives the completed set from the annotation log.
    ///
    /// The log is written before the completed set, so after an interrupted
    /// submit the log is the authority. Returns true if anything changed.
    pub fn reconcile(&mut self, log: &[Session], store: &mut dyn KeyValueStore) -> Result<bool> {
        let derived: CompletedSet = log.iter().flat_map(Session::sentence_ids).collect();
        if derived == self.completed {
            return Ok(false);
        }
        warn!(
            "Completed set ({} ids) disagrees with annotation log ({} ids); rebuilding from log",
            self.completed.len(),
            derived.len()
        );
        progress_io::save_completed(store, &derived)?;
        self.completed = derived;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::types::corpus::Candidate;

    fn corpus(n: usize) -> Vec<SourceSentence> {
        (1..=n)
            .map(|i| SourceSentence {
                id: format!("s{}", i),
                source_text: format!("source {}", i),
                translations: vec![Candidate::from_corpus("t", "h", 0)],
            })
            .collect()
    }

    fn ids(sentences: &[&SourceSentence]) -> Vec<String> {
        sentences.iter().map(|s| s.id.clone()).collect()
    }

    #[test]
    fn available_filters_completed_and_keeps_corpus_order() {
        let mut store = MemoryStore::new();
        let mut pool = PoolManager::new(corpus(5), CompletedSet::default());
        pool.mark_completed(["s4", "s2"], &mut store).unwrap();
        assert_eq!(ids(&pool.available()), vec!["s1", "s3", "s5"]);
    }

    #[test]
    fn mark_completed_is_idempotent() {
        let mut store = MemoryStore::new();
        let mut pool = PoolManager::new(corpus(3), CompletedSet::default());
        assert_eq!(pool.mark_completed(["s1", "s2"], &mut store).unwrap(), 2);
        let after_first = pool.completed().clone();
        assert_eq!(pool.mark_completed(["s1", "s2"], &mut store).unwrap(), 0);
        assert_eq!(pool.completed(), &after_first);
        assert_eq!(progress_io::load_completed(&store).unwrap(), after_first);
    }

    #[test]
    fn failed_write_leaves_memory_untouched() {
        let mut store = MemoryStore::with_quota(0);
        let mut pool = PoolManager::new(corpus(2), CompletedSet::default());
        let err = pool.mark_completed(["s1"], &mut store).unwrap_err();
        assert!(err.is_persistence());
        assert!(pool.completed().is_empty());
        assert_eq!(pool.available().len(), 2);
    }

    #[test]
    fn load_keeps_progress_for_matching_ids() {
        let mut store = MemoryStore::new();
        let mut pool = PoolManager::new(corpus(3), CompletedSet::default());
        pool.mark_completed(["s1"], &mut store).unwrap();
        pool.load(corpus(4));
        assert_eq!(ids(&pool.available()), vec!["s2", "s3", "s4"]);
    }

    #[test]
    fn reset_makes_whole_corpus_available() {
        let mut store = MemoryStore::new();
        let mut pool = PoolManager::new(corpus(3), CompletedSet::default());
        pool.mark_completed(["s1", "s2", "s3"], &mut store).unwrap();
        assert!(!pool.has_available());
        pool.reset(&mut store).unwrap();
        assert_eq!(pool.available().len(), 3);
        assert!(progress_io::load_completed(&store).unwrap().is_empty());
    }

    #[test]
    fn discarded_set_reconciles_with_empty_log_as_unchanged() {
        let mut store = MemoryStore::new();
        let mut pool = PoolManager::new(corpus(4), CompletedSet::default());
        pool.mark_completed(["s1", "s2"], &mut store).unwrap();
        pool.discard_completed();
        assert_eq!(pool.available().len(), 4);
        assert!(!pool.reconcile(&[], &mut store).unwrap());
    }

    #[test]
    fn completed_set_deserializes_duplicates_once() {
        let set: CompletedSet = serde_json::from_str(r#"["a","b","a"]"#).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["a", "b"]);
    }
}
//*** END FILE: src/pool.rs ***//
