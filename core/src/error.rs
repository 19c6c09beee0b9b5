use thiserror::Error;

#[derive(Error, Debug)]
pub enum GameError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No valid save found")]
    SaveNotFound,

    #[error("Save data corrupt: {reason}")]
    SaveCorrupt { reason: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type GameResult<T> = Result<T, GameError>;
