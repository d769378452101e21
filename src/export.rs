//*** START FILE: src/export.rs ***//
//! Export documents: the full annotation log, a per-sentence snapshot, and
//! the raw corpus file.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::annotation_log::AnnotationLog;
use crate::error::{Error, Result};
use crate::types::corpus::{rank_in_order, Candidate, RankedCandidate, SourceSentence};
use crate::types::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    /// Every submitted session
    Annotations,
    /// Current corpus with the latest ranking per sentence
    Snapshot,
    /// The corpus CSV as imported
    Corpus,
}

impl ExportKind {
    pub fn file_name(&self, now: DateTime<Utc>) -> String {
        let date = now.format("%Y-%m-%d");
        match self {
            ExportKind::Annotations => format!("all-translation-annotations-{}.json", date),
            ExportKind::Snapshot => format!("translation-annotations-{}.json", date),
            ExportKind::Corpus => "original-translation-data.csv".to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationExport {
    pub export_timestamp: String,
    pub total_sessions: usize,
    /// Sentences summed across sessions
    pub total_annotations: usize,
    pub sessions: Vec<Session>,
}

impl AnnotationExport {
    pub fn from_log(log: &AnnotationLog, now: DateTime<Utc>) -> Result<Self> {
        if log.is_empty() {
            return Err(Error::NothingToExport("no annotations have been submitted yet".to_string()));
        }
        Ok(AnnotationExport {
            export_timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            total_sessions: log.len(),
            total_annotations: log.total_annotations(),
            sessions: log.sessions().to_vec(),
        })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotSentence {
    pub id: String,
    /// 1-based position in the corpus
    pub sentence_index: usize,
    pub source_text: String,
    pub original_translations: Vec<Candidate>,
    pub rankings: Vec<RankedCandidate>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotExport {
    pub timestamp: String,
    pub total_sentences: usize,
    pub sentences: Vec<SnapshotSentence>,
}

impl SnapshotExport {
    /// Sentences without a submitted ranking get the identity ranking of
    /// their original candidate order.
    pub fn build(corpus: &[SourceSentence], log: &AnnotationLog, now: DateTime<Utc>) -> Result<Self> {
        if corpus.is_empty() {
            return Err(Error::NothingToExport("no corpus loaded".to_string()));
        }
        let sentences = corpus
            .iter()
            .enumerate()
            .map(|(index, sentence)| SnapshotSentence {
                id: sentence.id.clone(),
                sentence_index: index + 1,
                source_text: sentence.source_text.clone(),
                original_translations: sentence.translations.clone(),
                rankings: log
                    .latest_rankings(&sentence.id)
                    .map(<[RankedCandidate]>::to_vec)
                    .unwrap_or_else(|| rank_in_order(&sentence.translations)),
            })
            .collect();
        Ok(SnapshotExport {
            timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            total_sentences: corpus.len(),
            sentences,
        })
    }
}

/// Writes `contents` to `dir/file_name`, creating `dir` if needed.
pub fn write_export(dir: &Path, file_name: &str, contents: &str) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(file_name);
    fs::write(&path, contents)?;
    info!("Exported {} bytes to {}", contents.len(), path.display());
    Ok(path)
}

//*** END FILE: src/export.rs ***//
