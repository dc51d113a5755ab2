//! Interactive terminal front end over the quiz controller and app services.

use std::io::Write;

use anyhow::Result;
use services::{
    AppServices, AuthUser, CatalogOrigin, FavoritesError, LoginRequest, QuizController,
    RegisterRequest,
};
use storage::repository::StorageError;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::watch;
use vocab_core::model::{FavoriteListId, WordRecord};
use vocab_core::quiz::{QuizPhase, QuizState};

use crate::command::{HELP, ShellCommand};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

pub struct Shell<W> {
    services: AppServices,
    quiz: QuizController,
    quiz_rx: watch::Receiver<QuizState>,
    user_rx: watch::Receiver<Option<AuthUser>>,
    bypass_cache: bool,
    out: W,
}

fn write_word(out: &mut impl Write, word: &WordRecord) -> std::io::Result<()> {
    if word.description.is_empty() {
        writeln!(out, "  {} - {}", word.english, word.hebrew)
    } else {
        writeln!(out, "  {} - {}  ({})", word.english, word.hebrew, word.description)
    }
}

impl<W: Write> Shell<W> {
    #[must_use]
    pub fn new(services: AppServices, bypass_cache: bool, out: W) -> Self {
        let quiz = QuizController::new(Vec::new());
        let quiz_rx = quiz.subscribe();
        let user_rx = services.identity().subscribe();
        Self {
            services,
            quiz,
            quiz_rx,
            user_rx,
            bypass_cache,
            out,
        }
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.out
    }

    /// Read commands until `quit` or end of input.
    ///
    /// # Errors
    ///
    /// Returns an error only when reading input or writing output fails.
    pub async fn run<R: AsyncBufRead + Unpin>(&mut self, input: R) -> Result<()> {
        writeln!(self.out, "Type `help` for the list of commands.")?;
        let mut lines = input.lines();
        loop {
            self.prompt()?;
            let Some(line) = lines.next_line().await? else {
                writeln!(self.out)?;
                break;
            };
            if line.trim().is_empty() {
                continue;
            }
            match line.parse::<ShellCommand>() {
                Ok(command) => {
                    if self.execute(command).await? == Flow::Quit {
                        break;
                    }
                }
                Err(err) => writeln!(self.out, "{err}")?,
            }
        }
        Ok(())
    }

    fn prompt(&mut self) -> Result<()> {
        let user = self
            .user_rx
            .borrow_and_update()
            .as_ref()
            .map(|user| format!("{} ", user.email))
            .unwrap_or_default();
        let progress = {
            let state = self.quiz_rx.borrow_and_update();
            match state.phase() {
                QuizPhase::Empty => String::new(),
                QuizPhase::InProgress => {
                    let progress = state.progress();
                    format!(
                        "[{}/{} {:.0}%] ",
                        progress.current_index + 1,
                        progress.total,
                        progress.percent()
                    )
                }
                QuizPhase::Complete => "[done] ".to_string(),
            }
        };
        write!(self.out, "{user}{progress}> ")?;
        self.out.flush()?;
        Ok(())
    }

    /// Load the word catalog and hand it to the quiz.
    ///
    /// # Errors
    ///
    /// Returns an error only when writing output fails.
    pub async fn load_catalog(&mut self) -> Result<()> {
        let loader = self.services.catalog();
        let loaded = loader.load(self.bypass_cache).await;
        let origin = match loaded.origin {
            CatalogOrigin::Source(index) => loader
                .sources()
                .get(index)
                .map(ToString::to_string)
                .unwrap_or_default(),
            CatalogOrigin::Fallback => "the built-in word set".to_string(),
        };
        writeln!(self.out, "Loaded {} words from {origin}.", loaded.words.len())?;
        self.quiz.replace_catalog(loaded.words);
        Ok(())
    }

    async fn execute(&mut self, command: ShellCommand) -> Result<Flow> {
        match command {
            ShellCommand::Help => writeln!(self.out, "{HELP}")?,
            ShellCommand::Catalog => self.load_catalog().await?,
            ShellCommand::Quiz { start, end } => self.start_range(start, end)?,
            ShellCommand::Know => self.answer(true)?,
            ShellCommand::DontKnow => self.answer(false)?,
            ShellCommand::Next => self.next()?,
            ShellCommand::Results => self.show_results()?,
            ShellCommand::Save { name } => self.save(name).await?,
            ShellCommand::Lists => self.lists().await?,
            ShellCommand::Show(id) => self.show_list(id).await?,
            ShellCommand::Replay(id) => self.replay(id).await?,
            ShellCommand::Delete(id) => self.delete(id).await?,
            ShellCommand::Register {
                email,
                password,
                first_name,
                last_name,
            } => {
                let request = RegisterRequest {
                    email,
                    password,
                    first_name,
                    last_name,
                };
                match self.services.identity().register(&request).await {
                    Ok(user) => self.greet(&user)?,
                    Err(err) => writeln!(self.out, "Could not register: {err}")?,
                }
            }
            ShellCommand::Login { email, password } => {
                let request = LoginRequest { email, password };
                match self.services.identity().login(&request).await {
                    Ok(user) => self.greet(&user)?,
                    Err(err) => writeln!(self.out, "Could not log in: {err}")?,
                }
            }
            ShellCommand::Logout => match self.services.identity().logout().await {
                Ok(()) => writeln!(self.out, "Signed out.")?,
                Err(err) => writeln!(self.out, "Signed out locally: {err}")?,
            },
            ShellCommand::WhoAmI => match self.services.identity().current_user() {
                Some(user) => match &user.display_name {
                    Some(name) => writeln!(self.out, "Signed in as {name} <{}>.", user.email)?,
                    None => writeln!(self.out, "Signed in as {}.", user.email)?,
                },
                None => writeln!(self.out, "Not signed in.")?,
            },
            ShellCommand::Reset => {
                self.quiz.reset();
                writeln!(self.out, "Quiz cleared.")?;
            }
            ShellCommand::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    fn greet(&mut self, user: &AuthUser) -> Result<()> {
        let name = user.display_name.as_deref().unwrap_or(&user.email);
        writeln!(self.out, "Welcome, {name}!")?;
        Ok(())
    }

    // ─── Quiz ──────────────────────────────────────────────────────────────

    fn start_range(&mut self, start: i64, end: i64) -> Result<()> {
        let size = self.quiz.catalog().len();
        let rejection = if start < 0 {
            Some("Start must be at least 0.".to_string())
        } else if end > i64::try_from(size).unwrap_or(i64::MAX) {
            Some(format!("End must not exceed {size}."))
        } else if start > end {
            Some("Start must not be greater than end.".to_string())
        } else {
            None
        };
        if let Some(reason) = rejection {
            writeln!(self.out, "{reason} The catalog has {size} words.")?;
            return Ok(());
        }

        self.quiz.start_range(start, end);
        self.show_current()
    }

    fn show_current(&mut self) -> Result<()> {
        match self.quiz.phase() {
            QuizPhase::Empty => writeln!(
                self.out,
                "No words in that range. The catalog has {} words.",
                self.quiz.catalog().len()
            )?,
            QuizPhase::Complete => self.show_results()?,
            QuizPhase::InProgress => {
                let progress = self.quiz.progress();
                if let Some(word) = self.quiz.current_word() {
                    writeln!(
                        self.out,
                        "Word {} of {}: {}",
                        progress.current_index + 1,
                        progress.total,
                        word.english
                    )?;
                    if !word.description.is_empty() {
                        writeln!(self.out, "  {}", word.description)?;
                    }
                    writeln!(self.out, "Do you know it? (know/dont)")?;
                }
            }
        }
        Ok(())
    }

    fn answer(&mut self, known: bool) -> Result<()> {
        let Some(answer) = self.quiz.answer(known) else {
            match self.quiz.phase() {
                QuizPhase::Complete => writeln!(self.out, "The quiz is over. Type `results`.")?,
                _ => writeln!(self.out, "No word to answer. Start with `quiz <start> <end>`.")?,
            }
            return Ok(());
        };

        writeln!(self.out, "{} = {}", answer.word.english, answer.word.hebrew)?;
        if self.quiz.phase() == QuizPhase::Complete {
            writeln!(self.out, "That was the last word.")?;
            self.show_results()?;
        } else {
            writeln!(self.out, "Type `next` to continue.")?;
        }
        Ok(())
    }

    fn next(&mut self) -> Result<()> {
        match self.quiz.phase() {
            QuizPhase::Empty => {
                writeln!(self.out, "No quiz in progress.")?;
            }
            QuizPhase::Complete => self.show_results()?,
            QuizPhase::InProgress => {
                if self.quiz.current_answer().is_none() {
                    writeln!(self.out, "Answer the current word first (know/dont).")?;
                    return Ok(());
                }
                self.quiz.next();
                self.show_current()?;
            }
        }
        Ok(())
    }

    fn show_results(&mut self) -> Result<()> {
        if self.quiz.phase() == QuizPhase::Empty {
            writeln!(self.out, "No quiz yet.")?;
            return Ok(());
        }

        let results = self.quiz.results();
        writeln!(
            self.out,
            "Results: {} words, {} known, {} unknown.",
            results.total_words, results.known_words, results.unknown_words
        )?;
        if results.unanswered() > 0 {
            writeln!(self.out, "  {} not answered yet.", results.unanswered())?;
        }

        if results.unknown_words_list.is_empty() {
            if results.known_words > 0 {
                writeln!(self.out, "You knew every word you answered.")?;
            }
            return Ok(());
        }

        writeln!(self.out, "Words to practice:")?;
        for word in &results.unknown_words_list {
            write_word(&mut self.out, word)?;
        }
        if self.quiz.phase() == QuizPhase::Complete {
            writeln!(self.out, "Type `save [name]` to keep these words.")?;
        }
        Ok(())
    }

    // ─── Saved lists ───────────────────────────────────────────────────────

    fn favorites_error(&mut self, err: &FavoritesError) -> Result<()> {
        tracing::debug!(%err, "saved list request failed");
        match err {
            FavoritesError::Storage(StorageError::NotFound) => {
                writeln!(self.out, "No saved list with that id.")?;
            }
            other => writeln!(self.out, "Error: {other}")?,
        }
        Ok(())
    }

    async fn save(&mut self, name: Option<String>) -> Result<()> {
        if self.quiz.phase() != QuizPhase::Complete {
            writeln!(self.out, "Finish the quiz before saving its words.")?;
            return Ok(());
        }

        let favorites = self.services.favorites();
        let name = name.unwrap_or_else(|| favorites.suggested_name());
        match favorites
            .save_unknown_words(&name, &self.quiz.results())
            .await
        {
            Ok(list) => writeln!(
                self.out,
                "Saved \"{}\" as #{} with {} words.",
                list.name(),
                list.id(),
                list.words().len()
            )?,
            Err(err) => self.favorites_error(&err)?,
        }
        Ok(())
    }

    async fn lists(&mut self) -> Result<()> {
        match self.services.favorites().list().await {
            Ok(lists) if lists.is_empty() => writeln!(self.out, "You have no saved lists.")?,
            Ok(lists) => {
                for list in &lists {
                    writeln!(
                        self.out,
                        "  #{}  {}  ({} words, saved {})",
                        list.id(),
                        list.name(),
                        list.words().len(),
                        list.created_at().format("%Y-%m-%d %H:%M")
                    )?;
                }
            }
            Err(err) => self.favorites_error(&err)?,
        }
        Ok(())
    }

    async fn show_list(&mut self, id: FavoriteListId) -> Result<()> {
        match self.services.favorites().get(id).await {
            Ok(Some(list)) => {
                writeln!(self.out, "{} ({} words):", list.name(), list.words().len())?;
                for word in list.words() {
                    write_word(&mut self.out, word)?;
                }
            }
            Ok(None) => writeln!(self.out, "No saved list with that id.")?,
            Err(err) => self.favorites_error(&err)?,
        }
        Ok(())
    }

    async fn replay(&mut self, id: FavoriteListId) -> Result<()> {
        match self.services.favorites().get(id).await {
            Ok(Some(list)) => {
                writeln!(self.out, "Replaying \"{}\".", list.name())?;
                self.quiz.start_custom(list.into_words());
                self.show_current()?;
            }
            Ok(None) => writeln!(self.out, "No saved list with that id.")?,
            Err(err) => self.favorites_error(&err)?,
        }
        Ok(())
    }

    async fn delete(&mut self, id: FavoriteListId) -> Result<()> {
        match self.services.favorites().delete(id).await {
            Ok(()) => writeln!(self.out, "Deleted list #{id}.")?,
            Err(err) => self.favorites_error(&err)?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use services::Clock;
    use vocab_core::time::fixed_now;

    async fn run_script(script: &str) -> String {
        let services = AppServices::in_memory(Clock::fixed(fixed_now()), Vec::new());
        let mut shell = Shell::new(services, false, Vec::new());
        shell.load_catalog().await.unwrap();
        shell.run(script.as_bytes()).await.unwrap();
        String::from_utf8(shell.into_output()).unwrap()
    }

    #[tokio::test]
    async fn quiz_requires_an_answer_before_next() {
        let out = run_script("quiz 0 2\nnext\ndont\nnext\nknow\nquit\n").await;

        assert!(out.contains("Loaded 3 words from the built-in word set."));
        assert!(out.contains("Word 1 of 2: apple"));
        assert!(out.contains("Answer the current word first"));
        assert!(out.contains("apple = תפוח"));
        assert!(out.contains("Word 2 of 2: book"));
        assert!(out.contains("That was the last word."));
        assert!(out.contains("Results: 2 words, 1 known, 1 unknown."));
        assert!(out.contains("[done] > "));
    }

    #[tokio::test]
    async fn empty_range_reports_catalog_size() {
        let out = run_script("quiz 1 1\nknow\nresults\n").await;
        assert!(out.contains("No words in that range. The catalog has 3 words."));
        assert!(out.contains("No word to answer."));
        assert!(out.contains("No quiz yet."));
    }

    #[tokio::test]
    async fn out_of_range_bounds_are_rejected() {
        let out = run_script("quiz -1 2\nquiz 0 9\nknow\n").await;
        assert!(out.contains("Start must be at least 0. The catalog has 3 words."));
        assert!(out.contains("End must not exceed 3. The catalog has 3 words."));
        assert!(out.contains("No word to answer."));
        assert!(!out.contains("Word 1 of"));
    }

    #[tokio::test]
    async fn inverted_range_is_rejected() {
        let out = run_script("quiz 2 1\nresults\nquiz 1 3\n").await;
        assert!(out.contains("Start must not be greater than end. The catalog has 3 words."));
        assert!(out.contains("No quiz yet."));
        assert!(out.contains("Word 1 of 2: book"));
        assert!(out.contains("[1/2 0%] > "));
    }

    #[tokio::test]
    async fn save_list_and_replay_it() {
        let out = run_script(
            "quiz 0 3\ndont\nnext\nknow\nnext\ndont\n\
             save\n\
             register dana@example.com secret1 Dana Levi\n\
             save Week one\n\
             lists\nshow 1\nreplay 1\nwhoami\ndelete 1\nlists\nquit\n",
        )
        .await;

        assert!(out.contains("please log in to use saved lists"));
        assert!(out.contains("Welcome, Dana Levi!"));
        assert!(out.contains("Saved \"Week one\" as #1 with 2 words."));
        assert!(out.contains("#1  Week one  (2 words, saved 2023-11-14 22:13)"));
        assert!(out.contains("  cat - חתול"));
        assert!(out.contains("Replaying \"Week one\"."));
        assert!(out.contains("Word 1 of 2: apple"));
        assert!(out.contains("dana@example.com [1/2 0%] > "));
        assert!(out.contains("Signed in as Dana Levi <dana@example.com>."));
        assert!(out.contains("Deleted list #1."));
        assert!(out.contains("You have no saved lists."));
    }

    #[tokio::test]
    async fn default_list_name_and_missing_lists() {
        let out = run_script(
            "register dana@example.com secret1\n\
             quiz 0 1\ndont\nsave\nshow 42\ndelete 42\nlogout\nwhoami\n",
        )
        .await;

        assert!(out.contains("Saved \"Words - 2023-11-14\" as #1 with 1 words."));
        assert!(out.contains("No saved list with that id."));
        assert!(out.contains("Signed out."));
        assert!(out.contains("Not signed in."));
    }

    #[tokio::test]
    async fn bad_input_is_reported_not_fatal() {
        let out = run_script("fly\nquiz x 2\nlogin nobody@example.com secret1\nhelp\n").await;
        assert!(out.contains("unknown command: fly"));
        assert!(out.contains("not a whole number: x"));
        assert!(out.contains("Could not log in: wrong email or password"));
        assert!(out.contains("Commands:"));
    }
}
