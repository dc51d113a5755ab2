use crate::model::WordRecord;

use super::state::QuizState;

/// Aggregate outcome of a quiz session. Always derived, never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultsSummary {
    pub total_words: usize,
    pub known_words: usize,
    pub unknown_words: usize,
    /// Unknown words in original quiz order.
    pub unknown_words_list: Vec<WordRecord>,
}

impl ResultsSummary {
    /// Words in the session that never received an answer.
    #[must_use]
    pub fn unanswered(&self) -> usize {
        self.total_words
            .saturating_sub(self.known_words + self.unknown_words)
    }
}

/// Partition the recorded answers into known and unknown.
///
/// Unanswered words count toward neither bucket.
#[must_use]
pub fn derive_results(state: &QuizState) -> ResultsSummary {
    let mut known_words = 0_usize;
    let mut unknown_words_list = Vec::new();

    for answer in state.answers.values() {
        if answer.known {
            known_words += 1;
        } else {
            unknown_words_list.push(answer.word.clone());
        }
    }

    ResultsSummary {
        total_words: state.words.len(),
        known_words,
        unknown_words: unknown_words_list.len(),
        unknown_words_list,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Answer;

    fn word(i: usize) -> WordRecord {
        WordRecord::new(format!("en{i}"), format!("he{i}"), format!("desc{i}"))
    }

    #[test]
    fn empty_state_yields_zeroed_summary() {
        let summary = derive_results(&QuizState::default());
        assert_eq!(summary, ResultsSummary::default());
    }

    #[test]
    fn sparse_answers_are_partitioned_in_index_order() {
        let words: Vec<_> = (0..5).map(word).collect();
        let mut state = QuizState::started(words.clone());
        // inserted out of order on purpose
        for (idx, known) in [(4, false), (0, true), (2, true), (1, false)] {
            state.answers.insert(idx, Answer::new(words[idx].clone(), known));
        }

        let summary = derive_results(&state);

        assert_eq!(summary.total_words, 5);
        assert_eq!(summary.known_words, 2);
        assert_eq!(summary.unknown_words, 2);
        assert_eq!(summary.unknown_words_list, vec![word(1), word(4)]);
        assert_eq!(summary.unanswered(), 1);
    }
}
