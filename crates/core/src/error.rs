use thiserror::Error;

use crate::model::{CatalogError, LearningError, LiveEventError, QuestionError};
use crate::quiz::QuizError;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Quiz(#[from] QuizError),
    #[error(transparent)]
    Learning(#[from] LearningError),
    #[error(transparent)]
    LiveEvent(#[from] LiveEventError),
}
