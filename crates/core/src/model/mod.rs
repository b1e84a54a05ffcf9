mod ids;
mod learning;
mod live_event;
mod question;
mod session;

pub use ids::{EventId, ParseIdError, SessionId};
pub use learning::{EARTHQUAKE_SECTIONS, LearningChecklist, LearningError, LearningSection};
pub use live_event::{LiveEvent, LiveEventError, MagnitudeClass};
pub use question::{CatalogError, OPTION_COUNT, Question, QuestionCatalog, QuestionError};
pub use session::{ModuleSummary, Phase, ScorePercent};
