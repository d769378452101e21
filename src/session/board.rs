//*** START FILE: src/session/board.rs ***//
use crate::types::corpus::{rank_in_order, Candidate, RankedCandidate};

/// Live candidate order of the sentence currently on screen.
///
/// Every mutator returns whether the order actually changed; only real
/// changes count as an interaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RankingBoard {
    candidates: Vec<Candidate>,
}

impl RankingBoard {
    pub fn new(candidates: Vec<Candidate>) -> Self {
        RankingBoard { candidates }
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Moves the candidate at `from` so it ends up at `to`.
    pub fn move_candidate(&mut self, from: usize, to: usize) -> bool {
        if from >= self.candidates.len() || to >= self.candidates.len() || from == to {
            return false;
        }
        let moved = self.candidates.remove(from);
        self.candidates.insert(to, moved);
        true
    }

    /// Appends a hand-written candidate at the bottom.
    pub fn add_candidate(&mut self, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() {
            return false;
        }
        self.candidates.push(Candidate::hand_added(text));
        true
    }

    /// Replaces the text at `index`. Provenance is kept.
    pub fn edit_candidate(&mut self, index: usize, text: &str) -> bool {
        let text = text.trim();
        match self.candidates.get_mut(index) {
            Some(c) if !text.is_empty() && c.text != text => {
                c.text = text.to_string();
                true
            }
            _ => false,
        }
    }

    pub fn delete_candidate(&mut self, index: usize) -> bool {
        if index >= self.candidates.len() {
            return false;
        }
        self.candidates.remove(index);
        true
    }

    /// Removes every candidate. False when the board was already empty.
    pub fn clear(&mut self) -> bool {
        if self.candidates.is_empty() {
            return false;
        }
        self.candidates.clear();
        true
    }

    /// Fresh 1..k ranks for the current order.
    pub fn rankings(&self) -> Vec<RankedCandidate> {
        rank_in_order(&self.candidates)
    }
}

//*** END FILE: src/session/board.rs ***//
