//! Hard fork versions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A network hard fork version.
///
/// Only ever compared: feature gates are expressed as "at or after fork N".
/// Which fork enables which rule is configuration, not hard-coded here.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct HardFork(pub u8);

impl HardFork {
    /// Returns true if this fork is `gate` or later.
    pub fn at_least(self, gate: HardFork) -> bool {
        self >= gate
    }
}

impl fmt::Display for HardFork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "hf{}", self.0)
    }
}

impl From<u8> for HardFork {
    fn from(v: u8) -> Self {
        HardFork(v)
    }
}
