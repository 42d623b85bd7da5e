use thiserror::Error;

use moca_core::models::question::QuestionId;

#[derive(Debug, Error)]
pub enum InstrumentError {
    #[error("unknown instrument: {0}")]
    UnknownInstrument(String),

    #[error("answer package is missing questions {missing:?}")]
    IncompletePackage { missing: Vec<QuestionId> },

    #[error("catalog error: {0}")]
    Catalog(String),
}
