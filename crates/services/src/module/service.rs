use tokio::sync::watch;
use tracing::info;

use quake_core::Clock;
use quake_core::model::{ModuleSummary, Phase, Question, ScorePercent, SessionId};
use quake_core::quiz::{AnswerFeedback, QuizProgressView, QuizStep};

use crate::config::ModuleConfig;
use crate::error::ModuleError;
use super::session::ModuleSession;

/// Result of advancing past an answered question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleStep {
    NextQuestion { question_index: usize },
    Completed(ModuleSummary),
}

/// Drives a module session through `Learning -> Quiz -> Completed`.
///
/// Owns exactly one `ModuleSession` at a time. `restart` replaces it with a
/// fresh one; the discarded session's timer is cancelled with it.
pub struct ModuleService {
    config: ModuleConfig,
    clock: Clock,
    session: ModuleSession,
}

impl ModuleService {
    /// Open a new session in `Learning` and start its timer.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    #[must_use]
    pub fn start(config: ModuleConfig, clock: Clock) -> Self {
        let session = open_session(&config, clock);
        Self {
            config,
            clock,
            session,
        }
    }

    #[must_use]
    pub fn config(&self) -> &ModuleConfig {
        &self.config
    }

    #[must_use]
    pub fn session(&self) -> &ModuleSession {
        &self.session
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.session.phase()
    }

    #[must_use]
    pub fn elapsed_seconds(&self) -> u64 {
        self.session.elapsed_seconds()
    }

    #[must_use]
    pub fn subscribe_elapsed(&self) -> watch::Receiver<u64> {
        self.session.subscribe_elapsed()
    }

    #[must_use]
    pub fn final_score(&self) -> Option<ScorePercent> {
        self.session.final_score()
    }

    #[must_use]
    pub fn summary(&self) -> Option<&ModuleSummary> {
        self.session.summary()
    }

    /// Consume the content collaborator's ready signal.
    ///
    /// `false` leaves the session in `Learning`; `true` opens the quiz.
    ///
    /// # Errors
    ///
    /// Returns `ModuleError::WrongPhase` outside `Learning`.
    pub fn complete_learning(&mut self, all_acknowledged: bool) -> Result<Phase, ModuleError> {
        let phase = self.session.phase();
        if phase != Phase::Learning {
            return Err(ModuleError::WrongPhase {
                expected: Phase::Learning,
                actual: phase,
            });
        }
        if !all_acknowledged {
            return Ok(Phase::Learning);
        }

        self.session.begin_quiz(self.config.catalog.clone())?;
        info!(session = %self.session.id(), "learning complete; quiz started");
        Ok(Phase::Quiz)
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.session.quiz().and_then(|quiz| quiz.current_question())
    }

    #[must_use]
    pub fn quiz_progress(&self) -> Option<QuizProgressView> {
        self.session.quiz().map(|quiz| quiz.progress())
    }

    /// Returns whether the selection was recorded (see `QuizEngine::select_answer`).
    ///
    /// # Errors
    ///
    /// Returns `ModuleError::WrongPhase` outside `Quiz`.
    pub fn select_answer(&mut self, index: usize) -> Result<bool, ModuleError> {
        Ok(self.session.quiz_mut()?.select_answer(index))
    }

    /// # Errors
    ///
    /// Returns `ModuleError::WrongPhase` outside `Quiz`, or the quiz's own
    /// contract error when nothing is selected.
    pub fn submit_answer(&mut self) -> Result<AnswerFeedback, ModuleError> {
        Ok(self.session.quiz_mut()?.submit()?)
    }

    /// Move to the next question, or complete the session after the last one.
    ///
    /// # Errors
    ///
    /// Returns `ModuleError::WrongPhase` outside `Quiz`, or
    /// `QuizError::NotRevealed` before the current answer is submitted.
    pub fn advance(&mut self) -> Result<ModuleStep, ModuleError> {
        let step = self.session.quiz_mut()?.advance()?;
        match step {
            QuizStep::Next { question_index } => Ok(ModuleStep::NextQuestion { question_index }),
            QuizStep::Finished(outcome) => {
                let summary = self.session.complete(outcome, self.clock.now())?;
                info!(
                    session = %summary.session_id,
                    score = summary.final_score.value(),
                    elapsed_seconds = summary.elapsed_seconds,
                    "module completed"
                );
                Ok(ModuleStep::Completed(summary))
            }
        }
    }

    /// Discard the current session and open a new one in `Learning`.
    pub fn restart(&mut self) -> SessionId {
        let previous = self.session.id();
        self.session = open_session(&self.config, self.clock);
        info!(%previous, session = %self.session.id(), "module restarted");
        self.session.id()
    }
}

fn open_session(config: &ModuleConfig, clock: Clock) -> ModuleSession {
    ModuleSession::open(config.learner_name.clone(), clock.now(), config.tick_period)
}

impl std::fmt::Debug for ModuleService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleService")
            .field("session", &self.session)
            .field("questions", &self.config.catalog.len())
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use quake_core::quiz::QuizError;
    use quake_core::time::fixed_clock;

    fn service() -> ModuleService {
        ModuleService::start(ModuleConfig::earthquake(), fixed_clock())
    }

    #[tokio::test]
    async fn starts_in_learning_without_score() {
        let module = service();
        assert_eq!(module.phase(), Phase::Learning);
        assert_eq!(module.elapsed_seconds(), 0);
        assert!(module.final_score().is_none());
        assert!(module.current_question().is_none());
    }

    #[tokio::test]
    async fn unready_signal_keeps_learning() {
        let mut module = service();
        assert_eq!(module.complete_learning(false).unwrap(), Phase::Learning);
        assert_eq!(module.phase(), Phase::Learning);
    }

    #[tokio::test]
    async fn quiz_operations_rejected_while_learning() {
        let mut module = service();
        let expected = ModuleError::WrongPhase {
            expected: Phase::Quiz,
            actual: Phase::Learning,
        };
        assert_eq!(module.select_answer(0).unwrap_err(), expected);
        assert_eq!(module.submit_answer().unwrap_err(), expected);
        assert_eq!(module.advance().unwrap_err(), expected);
        assert_eq!(module.phase(), Phase::Learning);
    }

    #[tokio::test]
    async fn learning_cannot_be_completed_twice() {
        let mut module = service();
        module.complete_learning(true).unwrap();
        assert_eq!(
            module.complete_learning(true).unwrap_err(),
            ModuleError::WrongPhase {
                expected: Phase::Learning,
                actual: Phase::Quiz,
            }
        );
    }

    #[tokio::test]
    async fn quiz_contract_errors_pass_through_without_changing_phase() {
        let mut module = service();
        module.complete_learning(true).unwrap();

        assert_eq!(
            module.submit_answer().unwrap_err(),
            ModuleError::Quiz(QuizError::NoSelection)
        );
        module.select_answer(0).unwrap();
        assert_eq!(
            module.advance().unwrap_err(),
            ModuleError::Quiz(QuizError::NotRevealed)
        );
        assert_eq!(module.phase(), Phase::Quiz);
        assert_eq!(module.quiz_progress().unwrap().question_number, 1);
    }

    #[tokio::test]
    async fn restart_mints_new_session() {
        let mut module = service();
        let first = module.session().id();
        module.complete_learning(true).unwrap();

        let second = module.restart();
        assert_ne!(first, second);
        assert_eq!(module.phase(), Phase::Learning);
    }
}
