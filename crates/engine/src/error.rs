//! Error types for the engine crate

use thiserror::Error;

use crate::types::PieceId;

/// Failure of one pipeline reduction
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("search cancelled")]
    Cancelled,

    #[error("task {index} panicked: {message}")]
    WorkerPanicked { index: usize, message: String },

    #[error("worker pool is shut down")]
    Disconnected,

    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Failure of a search call (game over is not an error)
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("piece queue is empty")]
    EmptyQueue,

    #[error("piece id {0} is not in the catalog")]
    UnknownPiece(PieceId),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

/// Invalid search configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{var}={value:?} is not a valid value")]
    InvalidValue { var: &'static str, value: String },

    #[error("lookahead must be between 1 and {max}, got {value}")]
    Lookahead { value: usize, max: usize },

    #[error("{0} must be at least 1")]
    Zero(&'static str),

    #[error("weight {0} is not finite")]
    NonFiniteWeight(&'static str),

    #[error("cannot read weights file {path}: {source}")]
    WeightsIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed weights file {path}: {source}")]
    WeightsFormat {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}
