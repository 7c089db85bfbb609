//! The conversation transcript: an append-only, strictly ordered turn log.
//!
//! There is exactly one writer (the turn engine) and the log lives for the
//! process lifetime. The model never sees the log directly — it sees
//! [`Transcript::model_view`], a filtered projection that hides empty turns
//! without removing them.

use crate::types::Turn;

/// Append-only conversation state.
#[derive(Debug, Default)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    /// Create an empty transcript.
    pub fn new() -> Self {
        Self { turns: Vec::new() }
    }

    /// Append a turn. Turns are immutable once appended; there is no API to
    /// mutate, reorder, or remove them.
    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// Number of retained turns, including any empty ones.
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// The full retained log, in append order.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// The model-facing projection: every retained turn that has content,
    /// in append order. Filtering never alters the retained log.
    pub fn model_view(&self) -> Vec<Turn> {
        self.turns
            .iter()
            .filter(|turn| turn.has_content())
            .cloned()
            .collect()
    }

    /// The most recently appended turn.
    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }
}
