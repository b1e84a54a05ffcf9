use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use quake_core::model::{ModuleSummary, Phase, QuestionCatalog, ScorePercent, SessionId};
use quake_core::quiz::{QuizEngine, QuizOutcome};

use crate::error::ModuleError;
use crate::timer::SessionTimer;

enum Stage {
    Learning,
    Quiz(QuizEngine),
    Completed(ModuleSummary),
}

/// One run of the module, from first open to completion.
///
/// The final score only exists inside the `Completed` stage, so a score can
/// never be observed in any other phase. Dropping the session cancels its
/// timer.
pub struct ModuleSession {
    id: SessionId,
    learner_name: Option<String>,
    timer: SessionTimer,
    stage: Stage,
}

impl ModuleSession {
    /// Open a session in `Learning` with its timer already running.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub(crate) fn open(
        learner_name: Option<String>,
        started_at: DateTime<Utc>,
        tick_period: Duration,
    ) -> Self {
        Self {
            id: SessionId::new_v4(),
            learner_name,
            timer: SessionTimer::start(started_at, tick_period),
            stage: Stage::Learning,
        }
    }

    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    #[must_use]
    pub fn learner_name(&self) -> Option<&str> {
        self.learner_name.as_deref()
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        match self.stage {
            Stage::Learning => Phase::Learning,
            Stage::Quiz(_) => Phase::Quiz,
            Stage::Completed(_) => Phase::Completed,
        }
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.timer.started_at()
    }

    #[must_use]
    pub fn elapsed_seconds(&self) -> u64 {
        match &self.stage {
            Stage::Completed(summary) => summary.elapsed_seconds,
            _ => self.timer.elapsed_seconds(),
        }
    }

    #[must_use]
    pub fn subscribe_elapsed(&self) -> watch::Receiver<u64> {
        self.timer.subscribe()
    }

    #[must_use]
    pub fn final_score(&self) -> Option<ScorePercent> {
        self.summary().map(|summary| summary.final_score)
    }

    #[must_use]
    pub fn summary(&self) -> Option<&ModuleSummary> {
        match &self.stage {
            Stage::Completed(summary) => Some(summary),
            _ => None,
        }
    }

    #[must_use]
    pub fn quiz(&self) -> Option<&QuizEngine> {
        match &self.stage {
            Stage::Quiz(engine) => Some(engine),
            _ => None,
        }
    }

    pub(crate) fn quiz_mut(&mut self) -> Result<&mut QuizEngine, ModuleError> {
        let actual = self.phase();
        match &mut self.stage {
            Stage::Quiz(engine) => Ok(engine),
            _ => Err(ModuleError::WrongPhase {
                expected: Phase::Quiz,
                actual,
            }),
        }
    }

    /// `Learning -> Quiz`.
    pub(crate) fn begin_quiz(&mut self, catalog: Arc<QuestionCatalog>) -> Result<(), ModuleError> {
        self.expect_phase(Phase::Learning)?;
        self.stage = Stage::Quiz(QuizEngine::new(catalog));
        Ok(())
    }

    /// `Quiz -> Completed`. Stops the timer and freezes elapsed time.
    pub(crate) fn complete(
        &mut self,
        outcome: QuizOutcome,
        completed_at: DateTime<Utc>,
    ) -> Result<ModuleSummary, ModuleError> {
        self.expect_phase(Phase::Quiz)?;
        let elapsed_seconds = self.timer.stop();
        let summary = ModuleSummary {
            session_id: self.id,
            learner_name: self.learner_name.clone(),
            started_at: self.timer.started_at(),
            completed_at,
            elapsed_seconds,
            correct_count: outcome.correct_count,
            total_questions: outcome.total_questions,
            final_score: outcome.score,
        };
        self.stage = Stage::Completed(summary.clone());
        Ok(summary)
    }

    fn expect_phase(&self, expected: Phase) -> Result<(), ModuleError> {
        let actual = self.phase();
        if actual == expected {
            Ok(())
        } else {
            Err(ModuleError::WrongPhase { expected, actual })
        }
    }
}

impl std::fmt::Debug for ModuleSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleSession")
            .field("id", &self.id)
            .field("phase", &self.phase())
            .field("elapsed_seconds", &self.elapsed_seconds())
            .field("final_score", &self.final_score())
            .finish_non_exhaustive()
    }
}
