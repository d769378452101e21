//*** START FILE: src/session/controller.rs ***//
use std::collections::HashSet;

use chrono::{SecondsFormat, Utc};
use rand::Rng;
use tracing::{debug, info};

use super::board::RankingBoard;
use super::sampling::{sample_sentences, shuffle_candidates};
use crate::annotation_log::AnnotationLog;
use crate::error::{Error, Result};
use crate::pool::PoolManager;
use crate::store::KeyValueStore;
use crate::types::session::{Session, SessionSentence};

pub const DEFAULT_SAMPLE_SIZE: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Idle,
    SessionActive,
    /// Nothing left to annotate; no session exists
    AllComplete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    Started { size: usize },
    AllComplete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitOutcome {
    pub session_id: i64,
    pub sentences: usize,
    /// What happened after the submit: the next session or the end
    pub next: StartOutcome,
}

/// One sampled batch being ranked.
#[derive(Debug, Clone)]
pub struct ActiveSession {
    sentences: Vec<SessionSentence>,
    cursor: usize,
    board: RankingBoard,
    interacted: HashSet<String>,
    /// Set once the session made it into the log, so a retried submit
    /// does not append it twice
    logged: Option<Session>,
}

impl ActiveSession {
    fn new(sentences: Vec<SessionSentence>) -> Self {
        let board = RankingBoard::new(sentences[0].working_order());
        ActiveSession {
            sentences,
            cursor: 0,
            board,
            interacted: HashSet::new(),
            logged: None,
        }
    }

    pub fn sentences(&self) -> &[SessionSentence] {
        &self.sentences
    }

    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.sentences.len()
    }

    pub fn current(&self) -> &SessionSentence {
        &self.sentences[self.cursor]
    }

    pub fn board(&self) -> &RankingBoard {
        &self.board
    }

    pub fn interacted_count(&self) -> usize {
        self.interacted.len()
    }

    pub fn has_interacted(&self, id: &str) -> bool {
        self.interacted.contains(id)
    }

    pub fn is_last(&self) -> bool {
        self.cursor + 1 == self.sentences.len()
    }

    fn snapshot(&mut self) {
        self.sentences[self.cursor].rankings = Some(self.board.rankings());
    }

    fn move_to(&mut self, position: usize) -> bool {
        self.snapshot();
        if position == self.cursor || position >= self.sentences.len() {
            return false;
        }
        debug!("Cursor {} -> {}", self.cursor, position);
        self.cursor = position;
        self.board = RankingBoard::new(self.sentences[position].working_order());
        true
    }

    fn touch(&mut self) {
        let id = self.sentences[self.cursor].id.clone();
        self.interacted.insert(id);
    }
}

/// Draws sessions from the pool and walks the user through them.
#[derive(Debug)]
pub struct SessionController {
    sample_size: usize,
    state: ControllerState,
    active: Option<ActiveSession>,
    last_session_id: i64,
}

impl SessionController {
    pub fn new(sample_size: usize) -> Self {
        SessionController {
            sample_size: sample_size.max(1),
            state: ControllerState::Idle,
            active: None,
            last_session_id: 0,
        }
    }

    pub fn sample_size(&self) -> usize {
        self.sample_size
    }

    /// Session ids continue above `id` (normally the newest logged one).
    pub fn with_last_session_id(mut self, id: i64) -> Self {
        self.last_session_id = id;
        self
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn active(&self) -> Option<&ActiveSession> {
        self.active.as_ref()
    }

    pub fn current_sentence(&self) -> Option<&SessionSentence> {
        self.active.as_ref().map(ActiveSession::current)
    }

    pub fn start_new_session(&mut self, pool: &PoolManager) -> StartOutcome {
        self.start_new_session_with(pool, &mut rand::thread_rng())
    }

    pub fn start_new_session_with<R: Rng + ?Sized>(&mut self, pool: &PoolManager, rng: &mut R) -> StartOutcome {
        let available = pool.available();
        if available.is_empty() {
            info!("No unannotated sentences left");
            self.active = None;
            self.state = ControllerState::AllComplete;
            return StartOutcome::AllComplete;
        }

        let sentences: Vec<SessionSentence> = sample_sentences(&available, self.sample_size, rng)
            .into_iter()
            .map(|source| SessionSentence::new(source, shuffle_candidates(&source.translations, rng)))
            .collect();
        let size = sentences.len();

        info!("Session started with {} of {} available sentences", size, available.len());
        self.active = Some(ActiveSession::new(sentences));
        self.state = ControllerState::SessionActive;
        StartOutcome::Started { size }
    }

    /// Drops the running session without recording anything.
    pub fn abandon(&mut self) {
        if self.active.take().is_some() {
            debug!("Active session abandoned");
        }
        self.state = ControllerState::Idle;
    }

    fn active_mut(&mut self) -> Result<&mut ActiveSession> {
        self.active.as_mut().ok_or(Error::NoActiveSession)
    }

    /// Moves one sentence forward. Returns false at the last sentence.
    pub fn advance(&mut self) -> Result<bool> {
        let active = self.active_mut()?;
        let target = active.cursor + 1;
        Ok(active.move_to(target))
    }

    /// Moves one sentence back. Returns false at the first sentence.
    pub fn retreat(&mut self) -> Result<bool> {
        let active = self.active_mut()?;
        match active.cursor.checked_sub(1) {
            Some(target) => Ok(active.move_to(target)),
            None => {
                active.snapshot();
                Ok(false)
            }
        }
    }

    /// Marks the current sentence as handled by the user.
    pub fn record_interaction(&mut self) -> Result<()> {
        self.active_mut()?.touch();
        Ok(())
    }

    fn edit_board<F>(&mut self, edit: F) -> Result<bool>
    where
        F: FnOnce(&mut RankingBoard) -> bool,
    {
        let active = self.active_mut()?;
        let changed = edit(&mut active.board);
        if changed {
            active.touch();
        }
        Ok(changed)
    }

    pub fn move_candidate(&mut self, from: usize, to: usize) -> Result<bool> {
        self.edit_board(|b| b.move_candidate(from, to))
    }

    pub fn add_candidate(&mut self, text: &str) -> Result<bool> {
        self.edit_board(|b| b.add_candidate(text))
    }

    pub fn edit_candidate(&mut self, index: usize, text: &str) -> Result<bool> {
        self.edit_board(|b| b.edit_candidate(index, text))
    }

    pub fn delete_candidate(&mut self, index: usize) -> Result<bool> {
        self.edit_board(|b| b.delete_candidate(index))
    }

    pub fn clear_candidates(&mut self) -> Result<bool> {
        self.edit_board(RankingBoard::clear)
    }

    /// True once every sentence of the session has been interacted with.
    pub fn can_submit(&self) -> bool {
        self.active
            .as_ref()
            .map_or(false, |a| a.interacted.len() == a.sentences.len())
    }

    fn next_session_id(&mut self) -> i64 {
        let id = Utc::now().timestamp_millis().max(self.last_session_id.saturating_add(1));
        self.last_session_id = id;
        id
    }

    /// Logs the session, marks its sentences completed, and moves on.
    ///
    /// The log is written first and the completed set second. If either
    /// write fails the session stays active and can be submitted again.
    pub fn submit(
        &mut self,
        pool: &mut PoolManager,
        log: &mut AnnotationLog,
        store: &mut dyn KeyValueStore,
    ) -> Result<SubmitOutcome> {
        let pending = {
            let active = self.active.as_ref().ok_or(Error::NoActiveSession)?;
            if active.interacted.len() != active.sentences.len() {
                return Err(Error::IncompleteSession {
                    interacted: active.interacted.len(),
                    total: active.sentences.len(),
                });
            }
            active.logged.clone()
        };

        let session = match pending {
            Some(session) => session,
            None => {
                let session_id = self.next_session_id();
                let active = self.active_mut()?;
                active.snapshot();
                let session = Session {
                    session_id,
                    timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
                    sentences: active.sentences.clone(),
                };
                log.append(session.clone(), store)?;
                active.logged = Some(session.clone());
                session
            }
        };

        pool.mark_completed(session.sentence_ids(), store)?;
        info!(
            "Session {} submitted with {} sentences",
            session.session_id,
            session.sentences.len()
        );

        self.active = None;
        self.state = ControllerState::Idle;
        let next = self.start_new_session(pool);
        Ok(SubmitOutcome {
            session_id: session.session_id,
            sentences: session.sentences.len(),
            next,
        })
    }
}

impl Default for SessionController {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::CompletedSet;
    use crate::store::test_support::FailingStore;
    use crate::store::MemoryStore;
    use crate::types::corpus::{Candidate, SourceSentence};

    fn corpus(n: usize) -> Vec<SourceSentence> {
        (1..=n)
            .map(|i| SourceSentence {
                id: format!("s{}", i),
                source_text: format!("source {}", i),
                translations: (0..3)
                    .map(|c| Candidate::from_corpus(&format!("s{} t{}", i, c), "h", c))
                    .collect(),
            })
            .collect()
    }

    fn touch_all(controller: &mut SessionController) {
        let len = controller.active().unwrap().len();
        for _ in 0..len {
            controller.move_candidate(0, 2).unwrap();
            controller.advance().unwrap();
        }
    }

    #[test]
    fn empty_pool_goes_straight_to_all_complete() {
        let pool = PoolManager::default();
        let mut controller = SessionController::default();
        assert_eq!(controller.start_new_session(&pool), StartOutcome::AllComplete);
        assert_eq!(controller.state(), ControllerState::AllComplete);
        assert!(controller.current_sentence().is_none());
    }

    #[test]
    fn cursor_is_clamped_at_both_ends() {
        let pool = PoolManager::new(corpus(3), CompletedSet::default());
        let mut controller = SessionController::default();
        controller.start_new_session(&pool);

        assert!(!controller.retreat().unwrap());
        assert!(controller.advance().unwrap());
        assert!(controller.advance().unwrap());
        assert!(!controller.advance().unwrap());
        assert_eq!(controller.active().unwrap().position(), 2);
    }

    #[test]
    fn leaving_a_sentence_snapshots_and_revisiting_restores_order() {
        let pool = PoolManager::new(corpus(2), CompletedSet::default());
        let mut controller = SessionController::default();
        controller.start_new_session(&pool);

        controller.move_candidate(2, 0).unwrap();
        let live: Vec<Candidate> = controller.active().unwrap().board().candidates().to_vec();
        controller.advance().unwrap();

        let first = &controller.active().unwrap().sentences()[0];
        let ranked: Vec<&Candidate> = first.ranked().iter().map(|r| &r.candidate).collect();
        assert_eq!(ranked, live.iter().collect::<Vec<_>>());
        assert_eq!(first.ranked().iter().map(|r| r.rank).collect::<Vec<_>>(), vec![1, 2, 3]);

        controller.retreat().unwrap();
        assert_eq!(controller.active().unwrap().board().candidates(), live.as_slice());
    }

    #[test]
    fn emptied_board_stays_empty_after_revisit() {
        let mut store = MemoryStore::new();
        let mut pool = PoolManager::new(corpus(2), CompletedSet::default());
        let mut log = AnnotationLog::default();
        let mut controller = SessionController::default();
        controller.start_new_session(&pool);

        assert!(controller.clear_candidates().unwrap());
        controller.advance().unwrap();
        controller.record_interaction().unwrap();
        controller.retreat().unwrap();
        assert!(controller.active().unwrap().board().is_empty());

        controller.advance().unwrap();
        controller.retreat().unwrap();
        assert!(controller.active().unwrap().board().is_empty());

        let first_id = controller.active().unwrap().sentences()[0].id.clone();
        controller.submit(&mut pool, &mut log, &mut store).unwrap();
        let logged = &log.sessions()[0].sentences[0];
        assert_eq!(logged.id, first_id);
        assert_eq!(logged.rankings, Some(Vec::new()));
    }

    #[test]
    fn deleting_one_by_one_matches_clear() {
        let pool = PoolManager::new(corpus(2), CompletedSet::default());
        let mut controller = SessionController::default();
        controller.start_new_session(&pool);

        while controller.delete_candidate(0).unwrap() {}
        controller.advance().unwrap();
        controller.retreat().unwrap();
        assert!(controller.active().unwrap().board().is_empty());
        assert_eq!(controller.active().unwrap().interacted_count(), 1);
    }

    #[test]
    fn submit_requires_every_sentence_touched() {
        let mut store = MemoryStore::new();
        let mut pool = PoolManager::new(corpus(3), CompletedSet::default());
        let mut log = AnnotationLog::default();
        let mut controller = SessionController::default();
        controller.start_new_session(&pool);

        controller.move_candidate(0, 1).unwrap();
        let err = controller.submit(&mut pool, &mut log, &mut store).unwrap_err();
        assert!(matches!(err, Error::IncompleteSession { interacted: 1, total: 3 }));
        assert_eq!(controller.state(), ControllerState::SessionActive);
        assert!(log.is_empty());
        assert!(pool.completed().is_empty());
    }

    #[test]
    fn no_op_move_does_not_count_but_explicit_interaction_does() {
        let pool = PoolManager::new(corpus(1), CompletedSet::default());
        let mut controller = SessionController::default();
        controller.start_new_session(&pool);

        assert!(!controller.move_candidate(1, 1).unwrap());
        assert!(!controller.can_submit());
        controller.record_interaction().unwrap();
        assert!(controller.can_submit());
    }

    #[test]
    fn failed_completed_write_retries_without_duplicate_log_entry() {
        let mut store = FailingStore::new();
        store.fail_on(Some(crate::store::COMPLETED_KEY));
        let mut pool = PoolManager::new(corpus(2), CompletedSet::default());
        let mut log = AnnotationLog::default();
        let mut controller = SessionController::default();
        controller.start_new_session(&pool);
        touch_all(&mut controller);

        let err = controller.submit(&mut pool, &mut log, &mut store).unwrap_err();
        assert!(err.is_persistence());
        assert_eq!(log.len(), 1);
        assert!(pool.completed().is_empty());
        assert_eq!(controller.state(), ControllerState::SessionActive);

        store.fail_on(None);
        let outcome = controller.submit(&mut pool, &mut log, &mut store).unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(outcome.session_id, log.sessions()[0].session_id);
        assert_eq!(outcome.next, StartOutcome::AllComplete);
        assert_eq!(pool.completed().len(), 2);
    }

    #[test]
    fn failed_log_write_changes_nothing() {
        let mut store = FailingStore::new();
        store.fail_on(Some(crate::store::ANNOTATIONS_KEY));
        let mut pool = PoolManager::new(corpus(2), CompletedSet::default());
        let mut log = AnnotationLog::default();
        let mut controller = SessionController::default();
        controller.start_new_session(&pool);
        touch_all(&mut controller);

        assert!(controller.submit(&mut pool, &mut log, &mut store).is_err());
        assert!(log.is_empty());
        assert!(pool.completed().is_empty());
        assert!(controller.can_submit());
    }

    #[test]
    fn session_id_saturates_at_the_top() {
        let mut controller = SessionController::default().with_last_session_id(i64::MAX);
        assert_eq!(controller.next_session_id(), i64::MAX);
        assert_eq!(controller.next_session_id(), i64::MAX);
    }

    #[test]
    fn session_ids_are_strictly_increasing() {
        let mut controller = SessionController::default().with_last_session_id(i64::MAX - 10);
        let a = controller.next_session_id();
        let b = controller.next_session_id();
        assert!(b > a);
    }
}
//*** END FILE: src/session/controller.rs ***//
