use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("test not found: {id}")]
    NotFound { id: String },

    #[error("{operation} returned HTTP {status}")]
    Status { operation: &'static str, status: u16 },

    #[error("{operation} failed: {message}")]
    Transport {
        operation: &'static str,
        message: String,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid store configuration: {0}")]
    Config(String),

    #[error("request task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl StorageError {
    pub(crate) fn from_ureq(operation: &'static str, err: ureq::Error) -> Self {
        match err {
            ureq::Error::StatusCode(status) => StorageError::Status { operation, status },
            other => StorageError::Transport {
                operation,
                message: other.to_string(),
            },
        }
    }
}
