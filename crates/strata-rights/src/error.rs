use std::fmt;

use strata_types::Subject;

/// Errors raised by rights checks.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RightsError {
    /// The subject's role does not permit the requested action.
    #[error("{subject} may not {action}: {reason}")]
    Denied {
        subject: Subject,
        action: String,
        reason: String,
    },
}

impl RightsError {
    pub fn denied(subject: Subject, action: impl fmt::Display, reason: impl Into<String>) -> Self {
        Self::Denied {
            subject,
            action: action.to_string(),
            reason: reason.into(),
        }
    }
}

impl PartialEq for RightsError {
    fn eq(&self, other: &Self) -> bool {
        // Compare by display representation for test convenience.
        self.to_string() == other.to_string()
    }
}

impl Eq for RightsError {}
