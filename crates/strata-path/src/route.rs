//! Absolute, slash-separated routes naming objects from the root directory.
//!
//! Valid components:
//! - Must be non-empty
//! - Must not be `.` or `..`
//! - Must not contain `/` or NUL
//! - Must be at most 255 bytes long

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{PathError, Result};

/// Longest accepted component, in bytes.
pub const MAX_COMPONENT_LEN: usize = 255;

/// Validate a single route component (a directory entry name).
///
/// # Examples
///
/// ```
/// use strata_path::route::validate_component;
///
/// assert!(validate_component("notes.txt").is_ok());
/// assert!(validate_component("").is_err());
/// assert!(validate_component("..").is_err());
/// ```
pub fn validate_component(name: &str) -> Result<()> {
    let reason = if name.is_empty() {
        Some("component must not be empty".to_string())
    } else if name == "." || name == ".." {
        Some(format!("component must not be {name:?}"))
    } else if name.contains('/') {
        Some("component must not contain '/'".to_string())
    } else if name.contains('\0') {
        Some("component must not contain NUL".to_string())
    } else if name.len() > MAX_COMPONENT_LEN {
        Some(format!("component exceeds {MAX_COMPONENT_LEN} bytes"))
    } else {
        None
    };
    match reason {
        Some(reason) => Err(PathError::InvalidRoute {
            route: name.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}

/// Human-readable position of an object, from the root directory.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Route {
    components: Vec<String>,
}

impl Route {
    /// The root directory `/`.
    pub fn root() -> Self {
        Self {
            components: Vec::new(),
        }
    }

    /// Parse an absolute route such as `/docs/notes.txt`.
    pub fn parse(text: &str) -> Result<Self> {
        let rest = text.strip_prefix('/').ok_or_else(|| PathError::InvalidRoute {
            route: text.to_string(),
            reason: "route must be absolute".into(),
        })?;
        if rest.is_empty() {
            return Ok(Self::root());
        }
        let mut components = Vec::new();
        for component in rest.split('/') {
            validate_component(component).map_err(|e| match e {
                PathError::InvalidRoute { reason, .. } => PathError::InvalidRoute {
                    route: text.to_string(),
                    reason,
                },
                other => other,
            })?;
            components.push(component.to_string());
        }
        Ok(Self { components })
    }

    pub fn is_root(&self) -> bool {
        self.components.is_empty()
    }

    pub fn components(&self) -> &[String] {
        &self.components
    }

    /// Route of entry `name` inside this directory route.
    pub fn child(&self, name: &str) -> Result<Self> {
        validate_component(name)?;
        let mut components = self.components.clone();
        components.push(name.to_string());
        Ok(Self { components })
    }

    /// The enclosing directory, or `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        let (_, init) = self.components.split_last()?;
        Some(Self {
            components: init.to_vec(),
        })
    }

    /// The final component, or `None` for the root.
    pub fn name(&self) -> Option<&str> {
        self.components.last().map(String::as_str)
    }

    /// Returns `true` if this route equals `base` or lies beneath it.
    pub fn derives(&self, base: &Route) -> bool {
        self.components.starts_with(&base.components)
    }

    /// Replace the `from` prefix of this route with `to`.
    ///
    /// Returns `None` if this route does not derive from `from`.
    pub fn rebase(&self, from: &Route, to: &Route) -> Option<Self> {
        if !self.derives(from) {
            return None;
        }
        let mut components = to.components.clone();
        components.extend_from_slice(&self.components[from.components.len()..]);
        Some(Self { components })
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.components.is_empty() {
            return write!(f, "/");
        }
        for component in &self.components {
            write!(f, "/{component}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Route({self})")
    }
}

impl FromStr for Route {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
