use thiserror::Error;

use moca_core::models::question::QuestionKind;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("{kind:?} question does not accept {input} input")]
    UnsupportedInput {
        kind: QuestionKind,
        input: &'static str,
    },

    #[error("field {index} is out of range (question has {arity} fields)")]
    FieldOutOfRange { index: usize, arity: usize },

    #[error("choice {index} is out of range (question has {options} options)")]
    ChoiceOutOfRange { index: usize, options: usize },

    #[error("pointer position ({x}, {y}) is not a finite number")]
    InvalidPoint { x: f32, y: f32 },

    #[error("failed to encode drawing: {0}")]
    Encode(String),
}

#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("microphone unavailable: {0}")]
    Unavailable(String),

    #[error("recorder is not recording")]
    NotRecording,

    #[error("audio stream error: {0}")]
    Stream(String),

    #[error("failed to encode recording: {0}")]
    Encode(#[from] hound::Error),
}
