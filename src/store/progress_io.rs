//*** START FILE: src/store/progress_io.rs ***//
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{KeyValueStore, ANNOTATIONS_KEY, COMPLETED_KEY, CORPUS_KEY};
use crate::error::{Error, Result};
use crate::pool::CompletedSet;
use crate::types::session::Session;

fn save_json<T: Serialize + ?Sized>(store: &mut dyn KeyValueStore, key: &str, value: &T) -> Result<()> {
    let encoded = serde_json::to_string(value).map_err(|e| Error::persistence(key, e))?;
    store.set(key, &encoded)
}

fn load_json<T: DeserializeOwned + Default>(store: &dyn KeyValueStore, key: &str) -> Result<T> {
    match store.get(key)? {
        Some(raw) => serde_json::from_str(&raw).map_err(|source| Error::Decode {
            key: key.to_string(),
            source,
        }),
        None => Ok(T::default()),
    }
}

/// Saves the raw corpus text exactly as it was imported.
pub fn save_corpus_text(store: &mut dyn KeyValueStore, csv_text: &str) -> Result<()> {
    store.set(CORPUS_KEY, csv_text)
}

pub fn load_corpus_text(store: &dyn KeyValueStore) -> Result<Option<String>> {
    store.get(CORPUS_KEY)
}

pub fn save_completed(store: &mut dyn KeyValueStore, completed: &CompletedSet) -> Result<()> {
    save_json(store, COMPLETED_KEY, completed)
}

/// Loads the completed set; a missing key is an empty set.
pub fn load_completed(store: &dyn KeyValueStore) -> Result<CompletedSet> {
    load_json(store, COMPLETED_KEY)
}

pub fn save_annotation_log(store: &mut dyn KeyValueStore, sessions: &[Session]) -> Result<()> {
    save_json(store, ANNOTATIONS_KEY, sessions)
}

/// Loads every submitted session; a missing key is an empty log.
pub fn load_annotation_log(store: &dyn KeyValueStore) -> Result<Vec<Session>> {
    load_json(store, ANNOTATIONS_KEY)
}

/// Removes all three keys.
pub fn clear_all(store: &mut dyn KeyValueStore) -> Result<()> {
    store.remove(COMPLETED_KEY)?;
    store.remove(ANNOTATIONS_KEY)?;
    store.remove(CORPUS_KEY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::types::corpus::{rank_in_order, Candidate, SourceSentence};
    use crate::types::session::SessionSentence;

    fn sample_session() -> Session {
        let source = SourceSentence {
            id: "s1".to_string(),
            source_text: "Guten Morgen".to_string(),
            translations: vec![
                Candidate::from_corpus("Good morning", "mt", 0),
                Candidate::from_corpus("Morning", "human", 1),
            ],
        };
        let shuffled = vec![source.translations[1].clone(), source.translations[0].clone()];
        let mut sentence = SessionSentence::new(&source, shuffled.clone());
        let mut live = shuffled;
        live.push(Candidate::hand_added("Hello"));
        sentence.rankings = Some(rank_in_order(&live));
        Session {
            session_id: 1_700_000_000_000,
            timestamp: "2024-01-01T00:00:00.000Z".to_string(),
            sentences: vec![sentence],
        }
    }

    #[test]
    fn annotation_log_round_trip() {
        let mut store = MemoryStore::new();
        let log = vec![sample_session()];
        save_annotation_log(&mut store, &log).unwrap();
        assert_eq!(load_annotation_log(&store).unwrap(), log);
    }

    #[test]
    fn completed_set_round_trip_keeps_order() {
        let mut store = MemoryStore::new();
        let mut completed = CompletedSet::default();
        completed.insert("b");
        completed.insert("a");
        completed.insert("c");
        save_completed(&mut store, &completed).unwrap();
        assert_eq!(store.get(COMPLETED_KEY).unwrap().as_deref(), Some(r#"["b","a","c"]"#));
        assert_eq!(load_completed(&store).unwrap(), completed);
    }

    #[test]
    fn missing_keys_load_as_empty() {
        let store = MemoryStore::new();
        assert!(load_completed(&store).unwrap().is_empty());
        assert!(load_annotation_log(&store).unwrap().is_empty());
        assert_eq!(load_corpus_text(&store).unwrap(), None);
    }

    #[test]
    fn corrupt_log_is_a_decode_error() {
        let mut store = MemoryStore::new();
        store.set(ANNOTATIONS_KEY, "{not json").unwrap();
        let err = load_annotation_log(&store).unwrap_err();
        assert!(matches!(err, Error::Decode { .. }));
    }

    #[test]
    fn ranked_candidates_serialize_flat_with_camel_case() {
        let session = sample_session();
        let json = serde_json::to_value(&session).unwrap();
        let first_rank = &json["sentences"][0]["rankings"][0];
        assert_eq!(first_rank["rank"], 1);
        assert_eq!(first_rank["originalIndex"], 1);
        assert_eq!(first_rank["header"], "human");
        let added = &json["sentences"][0]["rankings"][2];
        assert!(added["originalIndex"].is_null());
        assert!(json["sessionId"].is_i64());
    }
}
//*** END FILE: src/store/progress_io.rs ***//
