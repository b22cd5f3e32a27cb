use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Evolution class of a research object.
///
/// LIVE objects accept content changes. SNAPSHOT and ARCHIVED objects are
/// frozen copies of a LIVE object and never change class again.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EvoType {
    Live,
    Snapshot,
    Archived,
}

impl EvoType {
    /// Returns `true` for SNAPSHOT and ARCHIVED.
    pub fn is_immutable(&self) -> bool {
        !matches!(self, EvoType::Live)
    }
}

impl Default for EvoType {
    fn default() -> Self {
        EvoType::Live
    }
}

impl fmt::Display for EvoType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EvoType::Live => "LIVE",
            EvoType::Snapshot => "SNAPSHOT",
            EvoType::Archived => "ARCHIVED",
        };
        f.write_str(s)
    }
}

impl FromStr for EvoType {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "LIVE" => Ok(EvoType::Live),
            "SNAPSHOT" => Ok(EvoType::Snapshot),
            "ARCHIVED" | "ARCHIVE" => Ok(EvoType::Archived),
            _ => Err(TypeError::UnknownEvoType(s.to_string())),
        }
    }
}
