//! Error types for conveyor.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConveyorError>;

#[derive(Debug, Error)]
pub enum ConveyorError {
    /// Malformed or out-of-range configuration. Raised before any task starts.
    #[error("config error: {0}")]
    Config(String),

    /// File I/O or thread creation failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A producer or consumer task panicked; surfaced at join.
    #[error("worker '{0}' panicked")]
    Worker(String),
}

impl ConveyorError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
