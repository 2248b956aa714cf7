//! Subcue Error Definitions
//!
//! Defines error types used throughout the engine. Steady-state playback
//! never fails; errors only surface from the settings persistence layer.

use thiserror::Error;

/// Engine error types
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Engine result type
pub type EngineResult<T> = Result<T, EngineError>;
