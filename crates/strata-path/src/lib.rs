//! Route handling for Strata.
//!
//! Routes are the human-readable names of objects; locations are where the
//! depot actually holds them. This crate turns one into the other.
//!
//! # Modules
//!
//! - [`error`] -- Error types for route operations
//! - [`route`] -- [`Route`] parsing, validation and rebasing
//! - [`shrub`] -- [`Shrub`], the bounded resolution cache
//! - [`resolver`] -- [`Resolver`], walking directory blocks from the root

pub mod error;
pub mod resolver;
pub mod route;
pub mod shrub;

pub use error::{PathError, Result};
pub use resolver::Resolver;
pub use route::{validate_component, Route};
pub use shrub::{Shrub, ShrubConfig};
