//! Rights layer for Strata.
//!
//! Every mutating entry point consults the rights layer before touching an
//! object's context. A subject's [`Role`] on an object is derived from the
//! object block's owner and access records; [`SubjectRights`] maps roles to
//! allowed closing operations and content accesses.
//!
//! # Quick Start
//!
//! ```rust
//! use strata_rights::{Access, Rights, RightsConfig, SubjectRights};
//! use strata_store::ObjectBlock;
//! use strata_types::{Genre, Operation, Subject};
//!
//! let owner = Subject::ephemeral();
//! let rights = SubjectRights::new(owner, RightsConfig::default());
//! let block = ObjectBlock::new(Genre::File, owner);
//! assert!(rights.operate(&block, Operation::Destroy).is_ok());
//! assert!(rights.access(&block, Access::Write).is_ok());
//! ```

pub mod config;
pub mod error;
pub mod rights;
pub mod role;

pub use config::RightsConfig;
pub use error::RightsError;
pub use rights::{Access, Rights, SubjectRights};
pub use role::Role;
