use thiserror::Error;

use crate::models::question::QuestionId;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("question {0} already has an answer")]
    AlreadyAnswered(QuestionId),
}
