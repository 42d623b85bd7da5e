use thiserror::Error;

use moca_capture::error::CaptureError;
use moca_core::error::CoreError;
use moca_instruments::error::InstrumentError;
use moca_storage::error::StorageError;

#[derive(Debug, Error)]
pub enum FlowError {
    /// The catalog has no question at this position. Fatal for the session.
    #[error("question not found at position {0}")]
    QuestionNotFound(usize),

    #[error("cannot {action} while {state}")]
    InvalidState {
        action: &'static str,
        state: &'static str,
    },

    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Instrument(#[from] InstrumentError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("invalid flow configuration: {0}")]
    Config(String),
}
