use std::fmt;

use serde::{Deserialize, Serialize};

/// The kind of filesystem object a block represents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Genre {
    File,
    Directory,
    Link,
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File => write!(f, "file"),
            Self::Directory => write!(f, "directory"),
            Self::Link => write!(f, "link"),
        }
    }
}
