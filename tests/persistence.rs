use std::fs;

use translation_ranker::export::ExportKind;
use translation_ranker::store::{progress_io, FileStore, KeyValueStore, MemoryStore, COMPLETED_KEY, CORPUS_KEY};
use translation_ranker::types::corpus::{rank_in_order, SourceSentence};
use translation_ranker::types::session::{Session, SessionSentence};
use translation_ranker::{Annotator, Config};

const CSV: &str = "id,source,A,B\n1,eins,one,uno\n2,zwei,two,dos\n3,drei,three,tres\n";

fn finish_session<S: KeyValueStore>(annotator: &mut Annotator<S>) {
    let len = annotator.active_session().unwrap().len();
    for _ in 0..len {
        annotator.move_candidate(1, 0).unwrap();
        annotator.advance().unwrap();
    }
    annotator.submit().unwrap();
}

#[test]
fn progress_survives_reopening_the_store() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        data_dir: dir.path().to_path_buf(),
        sample_size: 2,
        ..Config::default()
    };

    let first_session = {
        let mut a = Annotator::from_config(FileStore::open(&config.data_dir).unwrap(), &config).unwrap();
        a.import_corpus(CSV).unwrap();
        finish_session(&mut a);
        a.log().sessions()[0].clone()
    };
    assert_eq!(fs::read_to_string(dir.path().join(CORPUS_KEY)).unwrap(), CSV);

    let mut a = Annotator::from_config(FileStore::open(&config.data_dir).unwrap(), &config).unwrap();
    assert_eq!(a.stats().completed, 2);
    assert_eq!(a.log().sessions(), std::slice::from_ref(&first_session));

    a.start_session();
    let remaining = &a.active_session().unwrap().sentences()[0].id;
    assert!(first_session.sentence_ids().all(|id| id != remaining));

    finish_session(&mut a);
    assert!(a.log().sessions()[1].session_id > first_session.session_id);
}

#[test]
fn completed_set_is_rebuilt_from_the_log() {
    let mut store = MemoryStore::new();
    progress_io::save_corpus_text(&mut store, CSV).unwrap();
    let corpus = translation_ranker::parsing::parse_csv_to_corpus(CSV).unwrap();
    let sentence = |s: &SourceSentence| {
        let mut sentence = SessionSentence::new(s, s.translations.clone());
        sentence.rankings = Some(rank_in_order(&s.translations));
        sentence
    };
    let session = Session {
        session_id: 42,
        timestamp: "2025-01-01T00:00:00.000Z".to_string(),
        sentences: vec![sentence(&corpus[0]), sentence(&corpus[2])],
    };
    // log written, completed set never updated
    progress_io::save_annotation_log(&mut store, &[session]).unwrap();

    let a = Annotator::open(store, 5, "pw").unwrap();
    let completed: Vec<&str> = a.pool().completed().iter().collect();
    assert_eq!(completed, vec!["1", "3"]);
    assert_eq!(a.store().get(COMPLETED_KEY).unwrap().as_deref(), Some(r#"["1","3"]"#));
}

#[test]
fn exports_are_written_with_dated_names() {
    let dir = tempfile::tempdir().unwrap();
    let mut a = Annotator::open(MemoryStore::new(), 3, "pw").unwrap();
    a.import_corpus(CSV).unwrap();
    finish_session(&mut a);

    let annotations = a.export_to(ExportKind::Annotations, dir.path()).unwrap();
    let name = annotations.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("all-translation-annotations-") && name.ends_with(".json"));
    let doc: serde_json::Value = serde_json::from_str(&fs::read_to_string(&annotations).unwrap()).unwrap();
    assert_eq!(doc["totalSessions"], 1);
    assert_eq!(doc["totalAnnotations"], 3);

    let snapshot = a.export_to(ExportKind::Snapshot, dir.path()).unwrap();
    let doc: serde_json::Value = serde_json::from_str(&fs::read_to_string(&snapshot).unwrap()).unwrap();
    assert_eq!(doc["totalSentences"], 3);
    assert_eq!(doc["sentences"][0]["sentenceIndex"], 1);

    let corpus = a.export_to(ExportKind::Corpus, dir.path()).unwrap();
    assert!(corpus.ends_with("original-translation-data.csv"));
    assert_eq!(fs::read_to_string(corpus).unwrap(), CSV);
}
