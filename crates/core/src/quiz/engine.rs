use crate::model::{Answer, WordRecord};

use super::results::{ResultsSummary, derive_results};
use super::selection::select_range;
use super::state::{QuizPhase, QuizProgress, QuizState};

/// In-memory state machine for one quiz attempt over a master catalog.
///
/// Operations never fail: bad ranges are clamped and calls that make no
/// sense in the current state are ignored. Answering and advancing are two
/// separate steps; answering never moves the cursor.
#[derive(Debug, Clone, Default)]
pub struct QuizEngine {
    catalog: Vec<WordRecord>,
    state: QuizState,
}

impl QuizEngine {
    #[must_use]
    pub fn new(catalog: Vec<WordRecord>) -> Self {
        Self {
            catalog,
            state: QuizState::default(),
        }
    }

    #[must_use]
    pub fn catalog(&self) -> &[WordRecord] {
        &self.catalog
    }

    /// Swap in a freshly loaded catalog. The running session keeps its own copy of its words.
    pub fn replace_catalog(&mut self, catalog: Vec<WordRecord>) {
        self.catalog = catalog;
    }

    #[must_use]
    pub fn state(&self) -> &QuizState {
        &self.state
    }

    /// Start a new session, discarding whatever was in progress.
    ///
    /// A non-empty `custom_words` list is used verbatim and the range is ignored.
    /// Otherwise the session covers catalog entries `[start_index, end_index)`.
    pub fn start_quiz(
        &mut self,
        start_index: i64,
        end_index: i64,
        custom_words: Option<Vec<WordRecord>>,
    ) {
        let words = match custom_words {
            Some(words) if !words.is_empty() => words,
            _ => select_range(&self.catalog, start_index, end_index),
        };
        self.state = QuizState::started(words);
    }

    /// Record the operator's answer for the current word.
    ///
    /// Re-answering before advancing overwrites the previous answer. Answering the
    /// last word completes the session. Returns `None` without touching state when
    /// the session is complete or there is no current word.
    pub fn answer_word(&mut self, known: bool) -> Option<&Answer> {
        if self.state.is_complete {
            return None;
        }
        let index = self.state.current_index;
        let word = self.state.words.get(index)?.clone();

        self.state.answers.insert(index, Answer::new(word, known));
        self.state.is_complete = self.state.is_last_word();
        self.state.answers.get(&index)
    }

    /// Advance to the next word, or complete the session when already at the end.
    pub fn go_to_next_word(&mut self) {
        if self.state.is_complete || self.state.current_index + 1 >= self.state.words.len() {
            self.state.is_complete = true;
            return;
        }
        self.state.current_index += 1;
    }

    pub fn reset_quiz(&mut self) {
        self.state = QuizState::default();
    }

    #[must_use]
    pub fn results(&self) -> ResultsSummary {
        derive_results(&self.state)
    }

    #[must_use]
    pub fn current_word(&self) -> Option<&WordRecord> {
        self.state.current_word()
    }

    #[must_use]
    pub fn current_answer(&self) -> Option<&Answer> {
        self.state.current_answer()
    }

    #[must_use]
    pub fn phase(&self) -> QuizPhase {
        self.state.phase()
    }

    #[must_use]
    pub fn progress(&self) -> QuizProgress {
        self.state.progress()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(i: usize) -> WordRecord {
        WordRecord::new(format!("en{i}"), format!("he{i}"), format!("desc{i}"))
    }

    fn catalog(n: usize) -> Vec<WordRecord> {
        (0..n).map(word).collect()
    }

    fn engine(n: usize) -> QuizEngine {
        QuizEngine::new(catalog(n))
    }

    #[test]
    fn new_engine_is_empty() {
        let engine = engine(3);
        assert_eq!(engine.phase(), QuizPhase::Empty);
        assert_eq!(engine.state(), &QuizState::default());
        assert_eq!(engine.catalog().len(), 3);
    }

    #[test]
    fn start_selects_half_open_range() {
        let mut engine = engine(10);
        engine.start_quiz(2, 5, None);

        assert_eq!(engine.state().words(), &catalog(10)[2..5]);
        assert_eq!(engine.state().current_index(), 0);
        assert!(engine.state().answers().is_empty());
        assert_eq!(engine.phase(), QuizPhase::InProgress);
    }

    #[test]
    fn start_with_inverted_range_is_empty_not_an_error() {
        let mut engine = engine(10);
        engine.start_quiz(7, 3, None);
        assert!(engine.state().words().is_empty());
        assert_eq!(engine.phase(), QuizPhase::Empty);
    }

    #[test]
    fn custom_words_override_range() {
        let mut engine = engine(20);
        let custom = vec![word(100), word(101)];
        engine.start_quiz(5, 10, Some(custom.clone()));
        assert_eq!(engine.state().words(), custom.as_slice());
    }

    #[test]
    fn empty_custom_words_fall_back_to_range() {
        let mut engine = engine(5);
        engine.start_quiz(1, 3, Some(Vec::new()));
        assert_eq!(engine.state().words(), &catalog(5)[1..3]);
    }

    #[test]
    fn start_does_not_touch_catalog() {
        let mut engine = engine(4);
        engine.start_quiz(0, 2, Some(vec![word(9)]));
        engine.answer_word(false);
        assert_eq!(engine.catalog(), catalog(4).as_slice());
    }

    #[test]
    fn start_discards_previous_session() {
        let mut engine = engine(5);
        engine.start_quiz(0, 2, None);
        engine.answer_word(true);
        engine.go_to_next_word();
        engine.answer_word(true);
        assert!(engine.state().is_complete());

        engine.start_quiz(2, 5, None);
        assert_eq!(engine.state().current_index(), 0);
        assert!(engine.state().answers().is_empty());
        assert!(!engine.state().is_complete());
    }

    #[test]
    fn answer_records_without_advancing() {
        let mut engine = engine(3);
        engine.start_quiz(0, 3, None);

        let answer = engine.answer_word(true).cloned().unwrap();
        assert_eq!(answer, Answer::new(word(0), true));
        assert_eq!(engine.state().current_index(), 0);
        assert!(!engine.state().is_complete());
    }

    #[test]
    fn re_answer_before_advancing_overwrites() {
        let mut engine = engine(3);
        engine.start_quiz(0, 3, None);
        engine.answer_word(true);
        engine.answer_word(false);

        assert_eq!(engine.state().answers().len(), 1);
        assert!(!engine.current_answer().unwrap().known);
    }

    #[test]
    fn single_word_session_completes_on_first_answer() {
        let mut engine = engine(4);
        engine.start_quiz(0, 1, None);
        engine.answer_word(true);
        assert!(engine.state().is_complete());
        assert_eq!(engine.phase(), QuizPhase::Complete);
    }

    #[test]
    fn answers_are_frozen_once_complete() {
        let mut engine = engine(1);
        engine.start_quiz(0, 1, None);
        engine.answer_word(false);

        assert!(engine.answer_word(true).is_none());
        assert!(!engine.state().answers()[&0].known);
    }

    #[test]
    fn answer_on_empty_session_is_a_no_op() {
        let mut engine = engine(0);
        engine.start_quiz(0, 5, None);
        assert!(engine.answer_word(true).is_none());
        assert!(engine.state().answers().is_empty());
    }

    #[test]
    fn next_is_monotonic_and_stops_at_last_word() {
        let mut engine = engine(3);
        engine.start_quiz(0, 3, None);

        let mut previous = engine.state().current_index();
        for _ in 0..6 {
            engine.go_to_next_word();
            let current = engine.state().current_index();
            assert!(current >= previous);
            previous = current;
        }
        assert_eq!(engine.state().current_index(), 2);
        assert!(engine.state().is_complete());
    }

    #[test]
    fn next_does_not_require_an_answer() {
        let mut engine = engine(3);
        engine.start_quiz(0, 3, None);
        engine.go_to_next_word();
        assert_eq!(engine.state().current_index(), 1);
        assert!(engine.state().answers().is_empty());
    }

    #[test]
    fn next_on_last_word_completes_without_moving() {
        let mut engine = engine(2);
        engine.start_quiz(0, 2, None);
        engine.go_to_next_word();
        assert!(!engine.state().is_complete());

        engine.go_to_next_word();
        assert!(engine.state().is_complete());
        assert_eq!(engine.state().current_index(), 1);
    }

    #[test]
    fn next_on_empty_session_completes() {
        let mut engine = engine(0);
        engine.go_to_next_word();
        assert!(engine.state().is_complete());
        assert_eq!(engine.state().current_index(), 0);
    }

    #[test]
    fn full_walkthrough_produces_results_in_order() {
        let mut engine = engine(5);
        engine.start_quiz(0, 5, None);

        let plan = [Some(true), Some(false), Some(true), None, Some(false)];
        for (idx, known) in plan.iter().enumerate() {
            if let Some(known) = known {
                engine.answer_word(*known);
            }
            if idx + 1 < plan.len() {
                engine.go_to_next_word();
            }
        }

        assert!(engine.state().is_complete());
        let results = engine.results();
        assert_eq!(results.total_words, 5);
        assert_eq!(results.known_words, 2);
        assert_eq!(results.unknown_words, 2);
        assert_eq!(results.unknown_words_list, vec![word(1), word(4)]);
    }

    #[test]
    fn reset_clears_everything_but_catalog() {
        let mut engine = engine(3);
        engine.start_quiz(0, 3, None);
        engine.answer_word(true);
        engine.go_to_next_word();
        engine.reset_quiz();

        assert_eq!(engine.state(), &QuizState::default());
        assert_eq!(engine.phase(), QuizPhase::Empty);
        assert_eq!(engine.catalog().len(), 3);
    }

    #[test]
    fn replacing_catalog_keeps_running_session() {
        let mut engine = engine(3);
        engine.start_quiz(0, 2, None);
        engine.replace_catalog(vec![word(50)]);

        assert_eq!(engine.state().words(), &catalog(3)[0..2]);
        engine.start_quiz(0, 10, None);
        assert_eq!(engine.state().words(), &[word(50)]);
    }

    #[test]
    fn progress_tracks_cursor() {
        let mut engine = engine(4);
        engine.start_quiz(0, 4, None);
        engine.answer_word(true);
        engine.go_to_next_word();

        let progress = engine.progress();
        assert_eq!(progress.current_index, 1);
        assert_eq!(progress.total, 4);
        assert_eq!(progress.answered, 1);
        assert!((progress.percent() - 25.0).abs() < f64::EPSILON);
    }
}
