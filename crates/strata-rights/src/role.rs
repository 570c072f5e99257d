use std::fmt;

use strata_store::ObjectBlock;
use strata_types::{Permissions, Subject};

/// The relationship between a subject and an object.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    /// The subject owns the object.
    Owner,
    /// The subject holds an access record granting these permissions.
    Delegate(Permissions),
    /// The subject has no relationship with the object.
    Vacuum,
}

impl Role {
    /// Derive `subject`'s role on the object described by `block`.
    pub fn of(block: &ObjectBlock, subject: &Subject) -> Self {
        if block.owner == *subject {
            return Self::Owner;
        }
        match block.permissions.iter().find(|(s, _)| s == subject) {
            Some((_, permissions)) if *permissions != Permissions::NONE => {
                Self::Delegate(*permissions)
            }
            _ => Self::Vacuum,
        }
    }

    pub fn may_read(&self) -> bool {
        match self {
            Self::Owner => true,
            Self::Delegate(permissions) => permissions.read,
            Self::Vacuum => false,
        }
    }

    pub fn may_write(&self) -> bool {
        match self {
            Self::Owner => true,
            Self::Delegate(permissions) => permissions.write,
            Self::Vacuum => false,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Owner => write!(f, "owner"),
            Self::Delegate(_) => write!(f, "delegate"),
            Self::Vacuum => write!(f, "vacuum"),
        }
    }
}
