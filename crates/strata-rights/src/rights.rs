use std::fmt;

use strata_store::ObjectBlock;
use strata_types::{Operation, Subject};
use tracing::debug;

use crate::config::RightsConfig;
use crate::error::RightsError;
use crate::role::Role;

/// Kind of non-closing access to an object's contents.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => write!(f, "read"),
            Self::Write => write!(f, "write"),
        }
    }
}

/// Permission checks consulted before any context mutation.
pub trait Rights: Send + Sync {
    /// May the session close the object with `operation`?
    fn operate(&self, block: &ObjectBlock, operation: Operation) -> Result<(), RightsError>;

    /// May the session read or write the object's contents?
    fn access(&self, block: &ObjectBlock, access: Access) -> Result<(), RightsError>;
}

/// Role-based rights for a single session subject.
///
/// - discard and store: always allowed
/// - destroy: owner only
/// - read: owner, or a delegate with read permission
/// - write: owner, or a delegate with write permission
#[derive(Clone, Debug)]
pub struct SubjectRights {
    subject: Subject,
    config: RightsConfig,
}

impl SubjectRights {
    pub fn new(subject: Subject, config: RightsConfig) -> Self {
        Self { subject, config }
    }

    pub fn subject(&self) -> &Subject {
        &self.subject
    }
}

impl Rights for SubjectRights {
    fn operate(&self, block: &ObjectBlock, operation: Operation) -> Result<(), RightsError> {
        if self.config.permissive {
            return Ok(());
        }
        match operation {
            Operation::Discard | Operation::Store => Ok(()),
            Operation::Destroy => {
                let role = Role::of(block, &self.subject);
                if role == Role::Owner {
                    Ok(())
                } else {
                    debug!(subject = %self.subject, %role, "destroy denied");
                    Err(RightsError::denied(
                        self.subject,
                        operation,
                        format!("only the owner may destroy, subject is {role}"),
                    ))
                }
            }
        }
    }

    fn access(&self, block: &ObjectBlock, access: Access) -> Result<(), RightsError> {
        if self.config.permissive {
            return Ok(());
        }
        let role = Role::of(block, &self.subject);
        let allowed = match access {
            Access::Read => role.may_read(),
            Access::Write => role.may_write(),
        };
        if allowed {
            Ok(())
        } else {
            debug!(subject = %self.subject, %role, %access, "access denied");
            Err(RightsError::denied(
                self.subject,
                access,
                format!("missing {access} permission as {role}"),
            ))
        }
    }
}
