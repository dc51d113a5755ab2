use tokio::sync::watch;
use vocab_core::model::{Answer, WordRecord};
use vocab_core::quiz::{QuizEngine, QuizPhase, QuizProgress, QuizState, ResultsSummary};

/// Owns the quiz engine and publishes every state change to observers.
pub struct QuizController {
    engine: QuizEngine,
    state_tx: watch::Sender<QuizState>,
}

impl QuizController {
    #[must_use]
    pub fn new(catalog: Vec<WordRecord>) -> Self {
        let engine = QuizEngine::new(catalog);
        let (state_tx, _) = watch::channel(engine.state().clone());
        Self { engine, state_tx }
    }

    #[must_use]
    pub fn catalog(&self) -> &[WordRecord] {
        self.engine.catalog()
    }

    pub fn replace_catalog(&mut self, catalog: Vec<WordRecord>) {
        self.engine.replace_catalog(catalog);
    }

    #[must_use]
    pub fn state(&self) -> &QuizState {
        self.engine.state()
    }

    /// Receiver that sees the latest state after every operation.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<QuizState> {
        self.state_tx.subscribe()
    }

    /// Quiz catalog entries `[start, end)`; out-of-range bounds are clamped.
    pub fn start_range(&mut self, start: i64, end: i64) {
        self.engine.start_quiz(start, end, None);
        tracing::debug!(start, end, words = self.engine.state().words().len(), "quiz started");
        self.publish();
    }

    /// Quiz a saved list verbatim. An empty list falls back to an empty range.
    pub fn start_custom(&mut self, words: Vec<WordRecord>) {
        self.engine.start_quiz(0, 0, Some(words));
        tracing::debug!(words = self.engine.state().words().len(), "custom quiz started");
        self.publish();
    }

    /// Answer the current word; `None` when there is nothing to answer.
    pub fn answer(&mut self, known: bool) -> Option<Answer> {
        let answer = self.engine.answer_word(known).cloned();
        if answer.is_some() {
            self.publish();
        }
        answer
    }

    pub fn next(&mut self) {
        self.engine.go_to_next_word();
        self.publish();
    }

    pub fn reset(&mut self) {
        self.engine.reset_quiz();
        self.publish();
    }

    #[must_use]
    pub fn results(&self) -> ResultsSummary {
        self.engine.results()
    }

    #[must_use]
    pub fn current_word(&self) -> Option<&WordRecord> {
        self.engine.current_word()
    }

    #[must_use]
    pub fn current_answer(&self) -> Option<&Answer> {
        self.engine.current_answer()
    }

    #[must_use]
    pub fn phase(&self) -> QuizPhase {
        self.engine.phase()
    }

    #[must_use]
    pub fn progress(&self) -> QuizProgress {
        self.engine.progress()
    }

    fn publish(&self) {
        self.state_tx.send_replace(self.engine.state().clone());
    }
}
