//! Quiz session engine: subset selection, the answer/advance state machine,
//! and results derived from it.

mod engine;
mod results;
mod selection;
mod state;

pub use engine::QuizEngine;
pub use results::{ResultsSummary, derive_results};
pub use selection::select_range;
pub use state::{QuizPhase, QuizProgress, QuizState};
