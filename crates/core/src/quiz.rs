//! Sequential multiple-choice quiz over a fixed catalog.
//!
//! The engine is a small state machine per question:
//! select (any number of times) -> submit (reveals feedback) -> advance.
//! Advancing past the last question yields a [`QuizOutcome`] and the engine
//! becomes terminal.

use std::sync::Arc;

use thiserror::Error;

use crate::model::{OPTION_COUNT, Question, QuestionCatalog, ScorePercent};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Contract violations by the caller. None of them mutate engine state.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizError {
    #[error("no answer selected for the current question")]
    NoSelection,
    #[error("the current answer has not been submitted yet")]
    NotRevealed,
    #[error("the quiz is already finished")]
    Finished,
}

//
// ─── RESULT TYPES ──────────────────────────────────────────────────────────────
//

/// Feedback shown once an answer is submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerFeedback {
    pub question_index: usize,
    pub selected: usize,
    pub correct_index: usize,
    pub is_correct: bool,
    pub explanation: String,
}

/// Completion signal carrying the final tally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizOutcome {
    pub correct_count: usize,
    pub total_questions: usize,
    pub score: ScorePercent,
}

/// What `advance` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizStep {
    Next { question_index: usize },
    Finished(QuizOutcome),
}

/// Aggregated view of quiz progress, useful for UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizProgressView {
    pub question_number: usize,
    pub total: usize,
    pub answered: usize,
    pub correct_so_far: usize,
    pub percent_through: u8,
}

//
// ─── ENGINE ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone)]
pub struct QuizEngine {
    catalog: Arc<QuestionCatalog>,
    current: usize,
    selected: Option<usize>,
    revealed: bool,
    correct: usize,
    outcome: Option<QuizOutcome>,
}

impl QuizEngine {
    #[must_use]
    pub fn new(catalog: Arc<QuestionCatalog>) -> Self {
        Self {
            catalog,
            current: 0,
            selected: None,
            revealed: false,
            correct: 0,
            outcome: None,
        }
    }

    #[must_use]
    pub fn catalog(&self) -> &QuestionCatalog {
        &self.catalog
    }

    /// The question currently on screen, or `None` once finished.
    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        if self.is_finished() {
            return None;
        }
        self.catalog.get(self.current)
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    #[must_use]
    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    #[must_use]
    pub fn correct_count(&self) -> usize {
        self.correct
    }

    #[must_use]
    pub fn outcome(&self) -> Option<QuizOutcome> {
        self.outcome
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }

    /// Choose an option for the current question.
    ///
    /// Ignored after the answer is revealed, after the quiz finishes, or for
    /// an index outside the option range. Returns whether the choice was recorded.
    pub fn select_answer(&mut self, index: usize) -> bool {
        if self.is_finished() || self.revealed || index >= OPTION_COUNT {
            return false;
        }
        self.selected = Some(index);
        true
    }

    /// Reveal feedback for the selected option.
    ///
    /// The correct tally moves at most once per question; repeated calls
    /// before `advance` return the same feedback.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NoSelection` if nothing is selected and
    /// `QuizError::Finished` after the last question.
    pub fn submit(&mut self) -> Result<AnswerFeedback, QuizError> {
        let question = self.current_question().ok_or(QuizError::Finished)?;
        let selected = self.selected.ok_or(QuizError::NoSelection)?;
        let is_correct = question.is_correct(selected);
        let feedback = AnswerFeedback {
            question_index: self.current,
            selected,
            correct_index: question.correct_index(),
            is_correct,
            explanation: question.explanation().to_owned(),
        };

        if !self.revealed {
            self.revealed = true;
            if is_correct {
                self.correct += 1;
            }
        }

        Ok(feedback)
    }

    /// Move past a revealed question, finishing the quiz after the last one.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NotRevealed` before `submit` and
    /// `QuizError::Finished` once the outcome has been emitted.
    pub fn advance(&mut self) -> Result<QuizStep, QuizError> {
        if self.is_finished() {
            return Err(QuizError::Finished);
        }
        if !self.revealed {
            return Err(QuizError::NotRevealed);
        }

        let total = self.catalog.len();
        if self.current + 1 < total {
            self.current += 1;
            self.selected = None;
            self.revealed = false;
            return Ok(QuizStep::Next {
                question_index: self.current,
            });
        }

        let score = ScorePercent::from_tally(self.correct, total).ok_or(QuizError::Finished)?;
        let outcome = QuizOutcome {
            correct_count: self.correct,
            total_questions: total,
            score,
        };
        self.outcome = Some(outcome);
        Ok(QuizStep::Finished(outcome))
    }

    #[must_use]
    pub fn progress(&self) -> QuizProgressView {
        let total = self.catalog.len();
        let question_number = (self.current + 1).min(total);
        let answered = self.current + usize::from(self.revealed);
        let percent_through = ScorePercent::from_tally(question_number, total)
            .map_or(0, ScorePercent::value);
        QuizProgressView {
            question_number,
            total,
            answered,
            correct_so_far: self.correct,
            percent_through,
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> QuizEngine {
        QuizEngine::new(Arc::new(QuestionCatalog::earthquake()))
    }

    fn wrong_index(question: &Question) -> usize {
        (question.correct_index() + 1) % OPTION_COUNT
    }

    /// Answers every question, choosing correctly for the first `correct` of them.
    fn run(engine: &mut QuizEngine, correct: usize) -> QuizOutcome {
        let mut answered = 0;
        loop {
            let question = engine.current_question().unwrap();
            let choice = if answered < correct {
                question.correct_index()
            } else {
                wrong_index(question)
            };
            assert!(engine.select_answer(choice));
            engine.submit().unwrap();
            answered += 1;
            match engine.advance().unwrap() {
                QuizStep::Next { .. } => {}
                QuizStep::Finished(outcome) => return outcome,
            }
        }
    }

    #[test]
    fn perfect_run_scores_100() {
        let mut quiz = engine();
        let outcome = run(&mut quiz, 10);
        assert_eq!(outcome.score.value(), 100);
        assert_eq!(outcome.correct_count, 10);
        assert!(quiz.is_finished());
        assert!(quiz.current_question().is_none());
    }

    #[test]
    fn all_wrong_scores_0() {
        let outcome = run(&mut engine(), 0);
        assert_eq!(outcome.score.value(), 0);
    }

    #[test]
    fn seven_of_ten_scores_70() {
        let outcome = run(&mut engine(), 7);
        assert_eq!(outcome.correct_count, 7);
        assert_eq!(outcome.score.value(), 70);
    }

    #[test]
    fn submit_is_idempotent() {
        let mut quiz = engine();
        let correct = quiz.current_question().unwrap().correct_index();
        quiz.select_answer(correct);

        let first = quiz.submit().unwrap();
        let second = quiz.submit().unwrap();

        assert_eq!(first, second);
        assert!(first.is_correct);
        assert_eq!(quiz.correct_count(), 1);
    }

    #[test]
    fn submit_without_selection_is_rejected() {
        let mut quiz = engine();
        assert_eq!(quiz.submit().unwrap_err(), QuizError::NoSelection);
        assert!(!quiz.is_revealed());
        assert_eq!(quiz.correct_count(), 0);
    }

    #[test]
    fn advance_before_reveal_is_rejected() {
        let mut quiz = engine();
        quiz.select_answer(0);
        assert_eq!(quiz.advance().unwrap_err(), QuizError::NotRevealed);
        assert_eq!(quiz.current_index(), 0);
        assert_eq!(quiz.selected(), Some(0));
    }

    #[test]
    fn selection_is_ignored_after_reveal_or_out_of_range() {
        let mut quiz = engine();
        assert!(!quiz.select_answer(OPTION_COUNT));
        assert_eq!(quiz.selected(), None);

        quiz.select_answer(0);
        quiz.select_answer(3);
        assert_eq!(quiz.selected(), Some(3));

        quiz.submit().unwrap();
        assert!(!quiz.select_answer(1));
        assert_eq!(quiz.selected(), Some(3));
    }

    #[test]
    fn advancing_clears_selection_and_reveal() {
        let mut quiz = engine();
        quiz.select_answer(1);
        quiz.submit().unwrap();
        assert_eq!(quiz.advance().unwrap(), QuizStep::Next { question_index: 1 });
        assert_eq!(quiz.selected(), None);
        assert!(!quiz.is_revealed());
    }

    #[test]
    fn finished_engine_rejects_everything() {
        let mut quiz = engine();
        run(&mut quiz, 5);
        assert!(!quiz.select_answer(0));
        assert_eq!(quiz.submit().unwrap_err(), QuizError::Finished);
        assert_eq!(quiz.advance().unwrap_err(), QuizError::Finished);
        assert_eq!(quiz.outcome().unwrap().score.value(), 50);
    }

    #[test]
    fn progress_counts_revealed_answers() {
        let mut quiz = engine();
        let start = quiz.progress();
        assert_eq!(start.question_number, 1);
        assert_eq!(start.answered, 0);
        assert_eq!(start.percent_through, 10);

        let correct = quiz.current_question().unwrap().correct_index();
        quiz.select_answer(correct);
        quiz.submit().unwrap();
        let after = quiz.progress();
        assert_eq!(after.answered, 1);
        assert_eq!(after.correct_so_far, 1);
    }

    #[test]
    fn single_question_catalog_finishes_on_first_advance() {
        let question = QuestionCatalog::earthquake().get(0).unwrap().clone();
        let catalog = QuestionCatalog::new(vec![question]).unwrap();
        let mut quiz = QuizEngine::new(Arc::new(catalog));
        quiz.select_answer(1);
        quiz.submit().unwrap();
        let QuizStep::Finished(outcome) = quiz.advance().unwrap() else {
            panic!("expected the quiz to finish");
        };
        assert_eq!(outcome.score.value(), 100);
    }
}
