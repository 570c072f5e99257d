//! Foundation types for Strata.
//!
//! This crate provides the identity and addressing types shared by every
//! other Strata crate: where objects live, who is accessing them, and which
//! closing operation an accessor asked for.
//!
//! # Key Types
//!
//! - [`Address`] - Stable address of a mutable object block
//! - [`ContentId`] - Content-addressed identifier (BLAKE3 hash)
//! - [`Location`] - Address plus revision selector
//! - [`Subject`] - Principal performing accesses
//! - [`Identifier`] - Generation-checked actor handle
//! - [`Operation`] - Closing operation with precedence ordering

pub mod address;
pub mod error;
pub mod genre;
pub mod identifier;
pub mod location;
pub mod operation;
pub mod subject;

pub use address::{Address, ContentId};
pub use error::TypeError;
pub use genre::Genre;
pub use identifier::Identifier;
pub use location::{Location, Revision};
pub use operation::Operation;
pub use subject::{Permissions, Subject};
