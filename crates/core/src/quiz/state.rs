use std::collections::BTreeMap;

use crate::model::{Answer, WordRecord};

/// Where a quiz session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizPhase {
    Empty,
    InProgress,
    Complete,
}

/// Snapshot of one quiz attempt.
///
/// `answers` is keyed by word index; an absent key means the word has not
/// been answered. Only [`QuizEngine`](super::QuizEngine) mutates it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuizState {
    pub(crate) words: Vec<WordRecord>,
    pub(crate) current_index: usize,
    pub(crate) answers: BTreeMap<usize, Answer>,
    pub(crate) is_complete: bool,
}

impl QuizState {
    pub(crate) fn started(words: Vec<WordRecord>) -> Self {
        Self {
            words,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn words(&self) -> &[WordRecord] {
        &self.words
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    #[must_use]
    pub fn answers(&self) -> &BTreeMap<usize, Answer> {
        &self.answers
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.is_complete
    }

    #[must_use]
    pub fn current_word(&self) -> Option<&WordRecord> {
        self.words.get(self.current_index)
    }

    #[must_use]
    pub fn current_answer(&self) -> Option<&Answer> {
        self.answers.get(&self.current_index)
    }

    #[must_use]
    pub fn is_last_word(&self) -> bool {
        self.current_index + 1 == self.words.len()
    }

    #[must_use]
    pub fn phase(&self) -> QuizPhase {
        if self.is_complete {
            QuizPhase::Complete
        } else if self.words.is_empty() {
            QuizPhase::Empty
        } else {
            QuizPhase::InProgress
        }
    }

    #[must_use]
    pub fn progress(&self) -> QuizProgress {
        QuizProgress {
            current_index: self.current_index,
            total: self.words.len(),
            answered: self.answers.len(),
        }
    }
}

/// Aggregated view of quiz progress for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizProgress {
    pub current_index: usize,
    pub total: usize,
    pub answered: usize,
}

impl QuizProgress {
    /// Share of the session already passed, in percent. Zero for an empty session.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.current_index as f64 / self.total as f64 * 100.0
    }
}
