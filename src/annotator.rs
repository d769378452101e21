//*** START FILE: src/annotator.rs ***//
//! The annotator: one explicit state object tying the pool, the session
//! controller, the annotation log and the store together.
//!
//! Adapters hold an `Annotator` and call its operations; they learn about
//! changes through [`Annotator::subscribe`].

use std::path::{Path, PathBuf};

use chrono::Utc;
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::access::{AccessGate, Mode};
use crate::annotation_log::AnnotationLog;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::events::{AnnotatorEvent, EventBus};
use crate::export::{write_export, AnnotationExport, ExportKind, SnapshotExport};
use crate::parsing::parse_csv_to_corpus;
use crate::pool::PoolManager;
use crate::session::{ActiveSession, ControllerState, SessionController, StartOutcome, SubmitOutcome};
use crate::store::{progress_io, KeyValueStore};
use crate::types::session::SessionSentence;

/// Owner dashboard numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressStats {
    pub total_sentences: usize,
    pub completed: usize,
    pub remaining: usize,
    pub total_sessions: usize,
    pub total_annotations: usize,
}

pub struct Annotator<S: KeyValueStore> {
    store: S,
    pool: PoolManager,
    log: AnnotationLog,
    controller: SessionController,
    access: AccessGate,
    events: EventBus,
}

impl<S: KeyValueStore> Annotator<S> {
    /// Restores corpus and progress from `store`.
    ///
    /// If the completed set disagrees with the annotation log (a submit
    /// interrupted between its two writes) it is rebuilt from the log.
    pub fn open(mut store: S, sample_size: usize, owner_password: &str) -> Result<Self> {
        let corpus = match progress_io::load_corpus_text(&store)? {
            Some(text) => parse_csv_to_corpus(&text)?,
            None => Vec::new(),
        };
        let completed = progress_io::load_completed(&store)?;
        let log = AnnotationLog::new(progress_io::load_annotation_log(&store)?);

        let mut pool = PoolManager::new(corpus, completed);
        if pool.reconcile(log.sessions(), &mut store)? {
            warn!("Progress rebuilt from {} logged sessions", log.len());
        }
        info!(
            "Opened annotator: {} sentences, {} completed, {} sessions logged",
            pool.corpus().len(),
            pool.completed().len(),
            log.len()
        );

        let controller =
            SessionController::new(sample_size).with_last_session_id(log.last_session_id().unwrap_or(0));
        Ok(Annotator {
            store,
            pool,
            log,
            controller,
            access: AccessGate::new(owner_password),
            events: EventBus::default(),
        })
    }

    pub fn from_config(store: S, config: &Config) -> Result<Self> {
        Self::open(store, config.sample_size, &config.owner_password)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AnnotatorEvent> {
        self.events.subscribe()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn pool(&self) -> &PoolManager {
        &self.pool
    }

    pub fn log(&self) -> &AnnotationLog {
        &self.log
    }

    pub fn state(&self) -> ControllerState {
        self.controller.state()
    }

    pub fn active_session(&self) -> Option<&ActiveSession> {
        self.controller.active()
    }

    pub fn current_sentence(&self) -> Option<&SessionSentence> {
        self.controller.current_sentence()
    }

    pub fn can_submit(&self) -> bool {
        self.controller.can_submit()
    }

    pub fn mode(&self) -> Mode {
        self.access.mode()
    }

    pub fn has_corpus(&self) -> bool {
        !self.pool.corpus().is_empty()
    }

    pub fn stats(&self) -> ProgressStats {
        let total = self.pool.corpus().len();
        let remaining = self.pool.available().len();
        ProgressStats {
            total_sentences: total,
            completed: total - remaining,
            remaining,
            total_sessions: self.log.len(),
            total_annotations: self.log.total_annotations(),
        }
    }

    /// Parses and stores a new corpus. On a parse or write error nothing
    /// changes. In user mode a session starts right away.
    pub fn import_corpus(&mut self, csv_text: &str) -> Result<usize> {
        let corpus = parse_csv_to_corpus(csv_text)?;
        progress_io::save_corpus_text(&mut self.store, csv_text)?;

        let count = corpus.len();
        self.controller.abandon();
        self.pool.load(corpus);
        self.events.emit(AnnotatorEvent::CorpusLoaded { sentences: count });

        if self.access.mode() == Mode::User {
            self.start_session();
        }
        Ok(count)
    }

    /// Draws a fresh session, replacing any running one.
    pub fn start_session(&mut self) -> StartOutcome {
        let outcome = self.controller.start_new_session(&self.pool);
        self.announce_start(&outcome);
        outcome
    }

    fn announce_start(&mut self, outcome: &StartOutcome) {
        match outcome {
            StartOutcome::Started { size } => {
                self.events.emit(AnnotatorEvent::SessionStarted { size: *size });
                self.announce_position();
            }
            StartOutcome::AllComplete => {
                let completed = self.pool.completed().len();
                self.events.emit(AnnotatorEvent::AllComplete { completed });
            }
        }
    }

    fn announce_position(&mut self) {
        if let Some(active) = self.controller.active() {
            let event = AnnotatorEvent::SentenceChanged {
                position: active.position(),
                id: active.current().id.clone(),
            };
            self.events.emit(event);
        }
    }

    fn announce_interaction(&mut self) {
        if let Some(active) = self.controller.active() {
            let changed = AnnotatorEvent::RankingChanged {
                id: active.current().id.clone(),
            };
            let progress = AnnotatorEvent::InteractionRecorded {
                interacted: active.interacted_count(),
                total: active.len(),
            };
            self.events.emit(changed);
            self.events.emit(progress);
        }
    }

    pub fn advance(&mut self) -> Result<bool> {
        let moved = self.controller.advance()?;
        if moved {
            self.announce_position();
        }
        Ok(moved)
    }

    pub fn retreat(&mut self) -> Result<bool> {
        let moved = self.controller.retreat()?;
        if moved {
            self.announce_position();
        }
        Ok(moved)
    }

    fn after_edit(&mut self, changed: bool) -> bool {
        if changed {
            self.announce_interaction();
        }
        changed
    }

    /// Text changes to the candidate list are an owner action; users only
    /// reorder.
    fn require_owner(&self) -> Result<()> {
        if self.access.mode() == Mode::Owner {
            Ok(())
        } else {
            warn!("Candidate text edit refused outside owner mode");
            Err(Error::Unauthorized)
        }
    }

    pub fn move_candidate(&mut self, from: usize, to: usize) -> Result<bool> {
        let changed = self.controller.move_candidate(from, to)?;
        Ok(self.after_edit(changed))
    }

    pub fn add_candidate(&mut self, text: &str) -> Result<bool> {
        self.require_owner()?;
        let changed = self.controller.add_candidate(text)?;
        Ok(self.after_edit(changed))
    }

    pub fn edit_candidate(&mut self, index: usize, text: &str) -> Result<bool> {
        self.require_owner()?;
        let changed = self.controller.edit_candidate(index, text)?;
        Ok(self.after_edit(changed))
    }

    pub fn delete_candidate(&mut self, index: usize) -> Result<bool> {
        self.require_owner()?;
        let changed = self.controller.delete_candidate(index)?;
        Ok(self.after_edit(changed))
    }

    /// Empties the candidate list of the current sentence.
    pub fn clear_candidates(&mut self) -> Result<bool> {
        self.require_owner()?;
        let changed = self.controller.clear_candidates()?;
        Ok(self.after_edit(changed))
    }

    /// Accepts the current order as the user's ranking without moving anything.
    pub fn confirm_order(&mut self) -> Result<()> {
        self.controller.record_interaction()?;
        self.announce_interaction();
        Ok(())
    }

    pub fn submit(&mut self) -> Result<SubmitOutcome> {
        let outcome = self
            .controller
            .submit(&mut self.pool, &mut self.log, &mut self.store)?;
        self.events.emit(AnnotatorEvent::SessionSubmitted {
            session_id: outcome.session_id,
            sentences: outcome.sentences,
        });
        self.announce_start(&outcome.next);
        Ok(outcome)
    }

    /// Serialized export document.
    pub fn export_document(&self, kind: ExportKind) -> Result<String> {
        let now = Utc::now();
        let encode = |e: serde_json::Error| Error::Io(std::io::Error::new(std::io::ErrorKind::Other, e));
        match kind {
            ExportKind::Annotations => {
                let doc = AnnotationExport::from_log(&self.log, now)?;
                serde_json::to_string_pretty(&doc).map_err(encode)
            }
            ExportKind::Snapshot => {
                let doc = SnapshotExport::build(self.pool.corpus(), &self.log, now)?;
                serde_json::to_string_pretty(&doc).map_err(encode)
            }
            ExportKind::Corpus => progress_io::load_corpus_text(&self.store)?
                .ok_or_else(|| Error::NothingToExport("no corpus data found".to_string())),
        }
    }

    /// Writes the export for `kind` into `dir` and returns the file path.
    pub fn export_to(&self, kind: ExportKind, dir: &Path) -> Result<PathBuf> {
        let contents = self.export_document(kind)?;
        write_export(dir, &kind.file_name(Utc::now()), &contents)
    }

    /// Forgets all rankings but keeps the corpus.
    ///
    /// The log goes first so an interruption resolves to "reset" when the
    /// completed set is rebuilt from the log on the next open.
    pub fn reset_progress(&mut self) -> Result<()> {
        self.log.clear(&mut self.store)?;
        if let Err(e) = self.pool.reset(&mut self.store) {
            // the stored log is already empty, so the next open derives an
            // empty completed set; memory follows it now
            warn!("Completed set not cleared in store: {}", e);
            self.pool.discard_completed();
            self.controller.abandon();
            return Err(e);
        }
        self.controller.abandon();
        self.events.emit(AnnotatorEvent::ProgressReset);
        if self.access.mode() == Mode::User {
            self.start_session();
        }
        Ok(())
    }

    /// Removes corpus, progress and annotations.
    pub fn reset_all(&mut self) -> Result<()> {
        self.log.clear(&mut self.store)?;
        self.pool.reset(&mut self.store)?;
        progress_io::clear_all(&mut self.store)?;
        self.pool.load(Vec::new());
        self.controller.abandon();
        info!("All data removed");
        self.events.emit(AnnotatorEvent::DataReset);
        Ok(())
    }

    pub fn authenticate(&mut self, attempt: &str) -> Result<()> {
        self.access.authenticate(attempt)?;
        self.events.emit(AnnotatorEvent::ModeChanged { mode: Mode::Owner });
        Ok(())
    }

    /// Switching back to user mode resumes annotating if nothing is running.
    pub fn switch_mode(&mut self, mode: Mode) -> Result<()> {
        self.access.switch_mode(mode)?;
        self.events.emit(AnnotatorEvent::ModeChanged { mode });
        if mode == Mode::User && self.controller.state() == ControllerState::Idle && self.has_corpus() {
            self.start_session();
        }
        Ok(())
    }
}

//*** END FILE: src/annotator.rs ***//
