use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::error::TypeError;

/// Revision selector for a mutable object block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Revision {
    /// Whatever revision is the latest at the time of the pull.
    Any,
    /// One specific revision.
    Exact(u64),
}

impl Revision {
    /// Returns `true` if a block at revision `number` satisfies this selector.
    pub fn matches(&self, number: u64) -> bool {
        match self {
            Self::Any => true,
            Self::Exact(n) => *n == number,
        }
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => write!(f, "any"),
            Self::Exact(n) => write!(f, "#{n}"),
        }
    }
}

impl FromStr for Revision {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "any" {
            return Ok(Self::Any);
        }
        let digits = s.strip_prefix('#').unwrap_or(s);
        digits
            .parse::<u64>()
            .map(Self::Exact)
            .map_err(|_| TypeError::InvalidRevision(s.to_string()))
    }
}

/// Resolved, addressable position of an object in the store.
///
/// Distinct from the human-readable route: two routes may resolve to the
/// same location, and a route may resolve to a different location over
/// time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Location {
    pub address: Address,
    pub revision: Revision,
}

impl Location {
    pub fn new(address: Address, revision: Revision) -> Self {
        Self { address, revision }
    }

    /// Location of the latest revision at `address`.
    pub fn latest(address: Address) -> Self {
        Self::new(address, Revision::Any)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.address.short_hex(), self.revision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn any_matches_every_revision() {
        assert!(Revision::Any.matches(0));
        assert!(Revision::Any.matches(42));
        assert!(Revision::Exact(3).matches(3));
        assert!(!Revision::Exact(3).matches(4));
    }

    #[test]
    fn revision_parses_display_form() {
        assert_eq!("any".parse::<Revision>().unwrap(), Revision::Any);
        assert_eq!("#7".parse::<Revision>().unwrap(), Revision::Exact(7));
        assert_eq!("7".parse::<Revision>().unwrap(), Revision::Exact(7));
        assert!("seven".parse::<Revision>().is_err());
    }

    #[test]
    fn location_display_is_compact() {
        let address = Address::derive(b"loc");
        let display = Location::new(address, Revision::Exact(2)).to_string();
        assert_eq!(display, format!("{}@#2", address.short_hex()));
    }

    #[test]
    fn latest_locations_of_same_address_are_equal() {
        let address = Address::derive(b"dedup");
        assert_eq!(Location::latest(address), Location::latest(address));
    }

    #[test]
    fn serde_roundtrip() {
        let location = Location::new(Address::derive(b"serde"), Revision::Exact(9));
        let json = serde_json::to_string(&location).unwrap();
        let parsed: Location = serde_json::from_str(&json).unwrap();
        assert_eq!(location, parsed);
    }
}
