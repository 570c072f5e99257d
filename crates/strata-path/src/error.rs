//! Error types for route operations.

use strata_store::DepotError;
use thiserror::Error;

/// Errors that can occur while parsing or resolving routes.
#[derive(Debug, Clone, Error)]
pub enum PathError {
    /// The route text is malformed.
    #[error("invalid route {route:?}: {reason}")]
    InvalidRoute { route: String, reason: String },

    /// A component of the route names no entry.
    #[error("no such entry: {0}")]
    NotFound(String),

    /// An intermediate component is not a directory.
    #[error("not a directory: {0}")]
    NotADirectory(String),

    /// The depot failed while walking the route.
    #[error("depot error: {0}")]
    Depot(#[from] DepotError),
}

/// Convenience type alias for route operations.
pub type Result<T> = std::result::Result<T, PathError>;
