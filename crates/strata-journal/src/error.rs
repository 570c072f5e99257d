use std::io;

/// Errors produced by the journal.
#[derive(Debug, thiserror::Error)]
pub enum JournalError {
    /// I/O error during WAL operations.
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Too many transcripts await application.
    #[error("journal saturated: {limit} transcripts pending")]
    Saturated { limit: usize },

    /// The journal has been closed and accepts no further transcripts.
    #[error("journal is closed")]
    Closed,
}

/// Convenience alias used throughout the journal crate.
pub type Result<T> = std::result::Result<T, JournalError>;
