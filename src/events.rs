//*** START FILE: src/events.rs ***//
//! Change notifications published by the annotator.
//!
//! Adapters (the egui window, the CLI) subscribe and redraw or report; state
//! mutation never touches presentation directly.

use serde::Serialize;
use tokio::sync::broadcast;

use crate::access::Mode;

/// Buffered events per subscriber before the oldest are dropped
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum AnnotatorEvent {
    CorpusLoaded { sentences: usize },
    SessionStarted { size: usize },
    /// Cursor moved to `position` (zero-based) within the session
    SentenceChanged { position: usize, id: String },
    /// The live order of the current sentence changed
    RankingChanged { id: String },
    InteractionRecorded { interacted: usize, total: usize },
    SessionSubmitted { session_id: i64, sentences: usize },
    /// No unannotated sentence remains
    AllComplete { completed: usize },
    ProgressReset,
    DataReset,
    ModeChanged { mode: Mode },
}

/// Fan-out of [`AnnotatorEvent`]s over a `tokio::sync::broadcast` channel.
///
/// Sending and `try_recv` are synchronous, so the GUI drains its receiver
/// once per frame without a runtime.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<AnnotatorEvent>,
    capacity: usize,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Receives every event emitted after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<AnnotatorEvent> {
        self.tx.subscribe()
    }

    /// Returns the number of subscribers that received the event; zero when
    /// nobody is listening.
    pub fn emit(&self, event: AnnotatorEvent) -> usize {
        self.tx.send(event).unwrap_or(0)
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

/// Takes every event currently buffered in `rx`.
///
/// Events lost to a full buffer are skipped; a closed channel ends the drain.
pub fn drain(rx: &mut broadcast::Receiver<AnnotatorEvent>) -> Vec<AnnotatorEvent> {
    let mut events = Vec::new();
    loop {
        match rx.try_recv() {
            Ok(event) => events.push(event),
            Err(broadcast::error::TryRecvError::Lagged(missed)) => {
                tracing::warn!("Event subscriber lagged, {} events dropped", missed);
            }
            Err(_) => break,
        }
    }
    events
}

//*** END FILE: src/events.rs ***//
