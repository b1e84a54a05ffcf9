use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::ids::SessionId;

//
// ─── PHASE ─────────────────────────────────────────────────────────────────────
//

/// The three mutually exclusive stages of a module session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Learning,
    Quiz,
    Completed,
}

impl Phase {
    /// Module progress bar value for this phase.
    #[must_use]
    pub fn progress_percent(self) -> u8 {
        match self {
            Phase::Learning => 0,
            Phase::Quiz => 50,
            Phase::Completed => 100,
        }
    }

    #[must_use]
    pub fn is_active(self) -> bool {
        !matches!(self, Phase::Completed)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Learning => "learning",
            Phase::Quiz => "quiz",
            Phase::Completed => "completed",
        };
        f.write_str(name)
    }
}

//
// ─── SCORE ─────────────────────────────────────────────────────────────────────
//

/// Integer percentage score in `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ScorePercent(u8);

impl ScorePercent {
    /// `round(100 * correct / total)` with halves rounding up.
    ///
    /// Returns `None` when `total` is zero or `correct > total`.
    #[must_use]
    pub fn from_tally(correct: usize, total: usize) -> Option<Self> {
        if total == 0 || correct > total {
            return None;
        }
        let correct = correct as u64;
        let total = total as u64;
        let rounded = (200 * correct + total) / (2 * total);
        u8::try_from(rounded).ok().map(Self)
    }

    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }
}

impl fmt::Display for ScorePercent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

//
// ─── SUMMARY ───────────────────────────────────────────────────────────────────
//

/// What a completed session hands to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleSummary {
    pub session_id: SessionId,
    pub learner_name: Option<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub elapsed_seconds: u64,
    pub correct_count: usize,
    pub total_questions: usize,
    pub final_score: ScorePercent,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_rounds_half_up() {
        assert_eq!(ScorePercent::from_tally(1, 8).unwrap().value(), 13);
        assert_eq!(ScorePercent::from_tally(1, 3).unwrap().value(), 33);
        assert_eq!(ScorePercent::from_tally(2, 3).unwrap().value(), 67);
        assert_eq!(ScorePercent::from_tally(7, 10).unwrap().value(), 70);
    }

    #[test]
    fn score_bounds() {
        assert_eq!(ScorePercent::from_tally(0, 10).unwrap().value(), 0);
        assert_eq!(ScorePercent::from_tally(10, 10).unwrap().value(), 100);
        assert!(ScorePercent::from_tally(0, 0).is_none());
        assert!(ScorePercent::from_tally(11, 10).is_none());
    }

    #[test]
    fn score_matches_definition_for_every_tally() {
        for total in 1..=20_usize {
            for correct in 0..=total {
                let expected = (100.0 * correct as f64 / total as f64 + 0.5).floor() as u8;
                assert_eq!(
                    ScorePercent::from_tally(correct, total).unwrap().value(),
                    expected,
                    "{correct}/{total}"
                );
            }
        }
    }

    #[test]
    fn progress_tracks_phase() {
        assert_eq!(Phase::Learning.progress_percent(), 0);
        assert_eq!(Phase::Quiz.progress_percent(), 50);
        assert_eq!(Phase::Completed.progress_percent(), 100);
        assert!(!Phase::Completed.is_active());
        assert_eq!(ScorePercent::from_tally(4, 5).unwrap().to_string(), "80%");
    }
}
