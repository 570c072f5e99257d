use strata_gear::{ErrorKind, GearError};
use strata_journal::JournalError;
use strata_path::PathError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WallError {
    #[error(transparent)]
    Gear(#[from] GearError),

    #[error(transparent)]
    Journal(#[from] JournalError),

    #[error("invalid route: {0}")]
    Route(#[from] PathError),

    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),
}

impl WallError {
    /// Classify the failure; gear errors keep their own kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Gear(e) => e.kind(),
            Self::Journal(_) => ErrorKind::External,
            Self::Route(_) | Self::Config(_) => ErrorKind::Invalid,
        }
    }
}

pub type WallResult<T> = Result<T, WallError>;
